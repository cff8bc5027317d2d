//! Round state and core gameplay actions
//!
//! Everything needed to resume a round lives here and serializes as one
//! snapshot, RNG position included.

use glam::Vec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::phase::{GamePhase, PhaseMachine};
use super::session::{PingOutcome, PingSession};
use super::setup::RoundSetup;
use crate::consts::TARGET_MARGIN;
use crate::geometry::{
    Direction, PhantomTarget, Target, calculate_proximity, generate_target_position,
};
use crate::hints::{Hint, generate_hint, should_show_hint};
use crate::persistence::{self, Store, keys};
use crate::scoring::{ScoreInput, ScoreResult, calculate_score};
use crate::unlocks::{CheatCode, CheatFlags};

/// RNG state wrapper for serialization
///
/// Each draw site gets a fresh generator on the next stream so the sequence
/// is reproducible from `(seed, stream)` alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    pub fn next_rng(&mut self) -> Pcg32 {
        let rng = Pcg32::new(self.seed, self.stream);
        self.stream += 1;
        rng
    }
}

/// Outcome of a submitted guess
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub guess: Vec2,
    /// Proximity before boon scaling
    pub raw_proximity: u8,
    /// Proximity used for scoring
    pub proximity: u8,
    pub elapsed_seconds: f32,
    pub score: ScoreResult,
}

/// A phantom as the renderer should draw it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhantomView {
    pub phantom: PhantomTarget,
    /// Drawn as a known decoy
    pub marked: bool,
}

/// Complete round state (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundState {
    /// Round seed for reproducibility
    pub seed: u64,
    rng_state: RngState,
    pub setup: RoundSetup,
    /// Live real target (mechanics mutate it)
    pub target: Target,
    pub phantoms: Vec<PhantomTarget>,
    phase: PhaseMachine,
    session: PingSession,
    /// A hint was shown this round
    pub hint_used: bool,
    /// Set once the guess is submitted
    pub outcome: Option<RoundOutcome>,
    /// Outcome already folded into progress and high scores
    #[serde(default)]
    recorded: bool,
}

impl RoundState {
    /// Start a round: place the target and any phantoms
    pub fn new(setup: RoundSetup, seed: u64) -> Self {
        let session = PingSession::new(setup.effects.pings, setup.effects.replays);
        let mut state = Self {
            seed,
            rng_state: RngState::new(seed),
            target: Target::new(Vec2::ZERO, setup.target_size),
            phantoms: Vec::new(),
            phase: PhaseMachine::new(),
            session,
            hint_used: false,
            outcome: None,
            recorded: false,
            setup,
        };
        state.place_targets();
        state
    }

    fn place_targets(&mut self) {
        let mut rng = self.rng_state.next_rng();
        let bounds = self.setup.bounds;
        self.target =
            generate_target_position(&mut rng, bounds, self.setup.target_size, TARGET_MARGIN);
        self.phantoms = self.setup.mechanic.place_phantoms(&mut rng, bounds, &self.target);
        log::info!(
            "Round start: chapter {} level {:?}, target size {:.0}, {} phantom(s)",
            self.setup.chapter,
            self.setup.level.map(|l| l.level),
            self.setup.target_size,
            self.phantoms.len()
        );
    }

    #[inline]
    pub fn phase(&self) -> GamePhase {
        self.phase.phase()
    }

    pub fn final_guess(&self) -> Option<Vec2> {
        self.phase.final_guess()
    }

    pub fn session(&self) -> &PingSession {
        &self.session
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Emit a ping; only legal while pinging
    pub fn ping(&mut self, pos: Vec2, timestamp: f64) -> Option<PingOutcome> {
        if self.is_over() || self.phase() != GamePhase::Pinging {
            return None;
        }
        let mut rng = self.rng_state.next_rng();
        self.session.handle_ping(
            &mut rng,
            pos,
            &mut self.target,
            &self.setup.mechanic,
            self.setup.bounds,
            timestamp,
        )
    }

    /// Re-hear ping `index` as it sounded when emitted
    pub fn replay(&mut self, index: usize) -> Option<Direction> {
        if self.is_over() {
            return None;
        }
        self.session.handle_replay_ping(index)
    }

    pub fn place_final_guess(&mut self) -> bool {
        !self.is_over() && self.phase.place_final_guess()
    }

    /// Canvas click; sets the guess while placing
    pub fn click(&mut self, pos: Vec2) -> bool {
        !self.is_over() && self.phase.click(pos)
    }

    pub fn reposition(&mut self) -> bool {
        !self.is_over() && self.phase.reposition()
    }

    pub fn back_to_pinging(&mut self) -> bool {
        !self.is_over() && self.phase.back_to_pinging(self.session.has_pings())
    }

    /// Hints are offered once enough of a finite budget is spent
    pub fn hint_available(&self) -> bool {
        if !self.setup.hints_enabled || self.is_over() || self.session.last_ping().is_none() {
            return false;
        }
        match self.session.total_pings() {
            Some(total) => should_show_hint(self.session.pings_used(), total),
            None => false,
        }
    }

    /// Reveal a hint for the latest ping; marks the round as hinted
    pub fn take_hint(&mut self) -> Option<Hint> {
        if !self.hint_available() {
            return None;
        }
        let last = self.session.last_ping()?.position;
        self.hint_used = true;
        Some(generate_hint(last, &self.target, self.setup.bounds))
    }

    /// Score the confirmed guess; `None` unless confirming
    pub fn submit(&mut self, elapsed_seconds: f32) -> Option<RoundOutcome> {
        if self.is_over() {
            return None;
        }
        let guess = self.phase.confirmed_guess()?;
        let effects = &self.setup.effects;

        let raw_proximity = calculate_proximity(
            guess,
            self.target.center(),
            self.setup.bounds.max_proximity_distance(),
        );
        let proximity = (raw_proximity as f32 * effects.proximity_multiplier)
            .round()
            .clamp(0.0, 100.0) as u8;

        let input = ScoreInput {
            proximity,
            pings_used: self.session.pings_used(),
            total_pings: self.session.total_pings(),
            elapsed_seconds,
            chapter: self.setup.chapter,
            replays_used: self.session.replays_used(),
            replays_unspent: self.session.replays_remaining().unspent(),
            hint_used: self.hint_used,
            boon_active: self.setup.boon_active(),
            time_penalty_multiplier: effects.time_penalty_multiplier,
            difficulty: self.setup.difficulty,
        };
        let score = calculate_score(&input);
        log::info!(
            "Guess submitted: proximity {} -> {} points ({})",
            proximity,
            score.total,
            score.rank.as_str()
        );

        let outcome = RoundOutcome {
            guess,
            raw_proximity,
            proximity,
            elapsed_seconds,
            score,
        };
        self.outcome = Some(outcome);
        Some(outcome)
    }

    /// Hand out the outcome for bookkeeping exactly once
    pub fn take_unrecorded_outcome(&mut self) -> Option<RoundOutcome> {
        if self.recorded {
            return None;
        }
        let outcome = self.outcome?;
        self.recorded = true;
        Some(outcome)
    }

    /// Same setup, fresh target, cleared phase and budgets
    pub fn restart(&mut self) {
        self.phase.reset();
        self.session.reset();
        self.hint_used = false;
        self.outcome = None;
        self.recorded = false;
        self.place_targets();
    }

    /// Move on to a new setup (next level or a different custom config)
    pub fn advance(&mut self, setup: RoundSetup) {
        self.session = PingSession::new(setup.effects.pings, setup.effects.replays);
        self.setup = setup;
        self.restart();
    }

    /// The live target, when the reveal cheat is on
    pub fn revealed_target(&self, cheats: &CheatFlags) -> Option<&Target> {
        cheats
            .is_active(CheatCode::RevealTarget)
            .then_some(&self.target)
    }

    pub fn visible_phantoms(&self) -> Vec<PhantomView> {
        let marked = self.setup.effects.phantom_visibility;
        self.phantoms
            .iter()
            .map(|&phantom| PhantomView { phantom, marked })
            .collect()
    }

    /// Snapshot an in-progress round (best effort)
    pub fn save_snapshot<S: Store + ?Sized>(&self, store: &mut S) -> bool {
        persistence::save(store, keys::ROUND_SNAPSHOT, self)
    }

    /// Resume a snapshotted round, if one exists and is readable
    pub fn load_snapshot<S: Store + ?Sized>(store: &S) -> Option<Self> {
        persistence::load(store, keys::ROUND_SNAPSHOT)
    }

    pub fn clear_snapshot<S: Store + ?Sized>(store: &mut S) {
        store.remove(keys::ROUND_SNAPSHOT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chapters::get_level_config;
    use crate::persistence::MemoryStore;
    use crate::settings::Settings;
    use crate::sim::{PingBudget, ReplayBudget};

    fn level_round(level: u32, seed: u64) -> RoundState {
        RoundState::new(RoundSetup::for_level(level, &[] as &[&str], &Settings::default()), seed)
    }

    #[test]
    fn test_new_round_places_target() {
        let round = level_round(1, 12345);
        assert_eq!(round.phase(), GamePhase::Pinging);
        assert_eq!(round.target.size, get_level_config(1, 1).target_size);
        assert!(round.phantoms.is_empty());
        assert_eq!(round.session().pings_remaining(), PingBudget::Limited(5));
    }

    #[test]
    fn test_phantom_chapter_places_decoys() {
        let round = level_round(31, 7);
        assert!(!round.phantoms.is_empty());
        assert!(round.visible_phantoms().iter().all(|p| !p.marked));
    }

    #[test]
    fn test_place_click_submit_flow() {
        let mut round = level_round(1, 99);
        let center = round.target.center();
        assert!(round.ping(Vec2::new(10.0, 10.0), 0.0).is_some());
        assert!(round.place_final_guess());
        assert!(round.ping(Vec2::new(20.0, 20.0), 1.0).is_none());
        assert!(round.click(center));
        assert_eq!(round.phase(), GamePhase::Confirming);
        assert_eq!(round.final_guess(), Some(center));

        let outcome = round.submit(5.0).expect("confirmed guess scores");
        assert_eq!(outcome.proximity, 100);
        assert!(outcome.score.breakdown.perfect_hit > 0);
        assert!(round.is_over());
        assert!(round.submit(5.0).is_none());
        assert!(!round.click(center));
    }

    #[test]
    fn test_submit_ignored_while_pinging() {
        let mut round = level_round(1, 1);
        assert!(round.submit(3.0).is_none());
        assert!(!round.is_over());
    }

    #[test]
    fn test_back_to_pinging_after_budget_spent() {
        let mut round = level_round(1, 5);
        for i in 0..5 {
            assert!(round.ping(Vec2::new(50.0 * i as f32, 40.0), i as f64).is_some());
        }
        assert!(round.ping(Vec2::ZERO, 9.0).is_none());
        assert!(round.place_final_guess());
        assert!(!round.back_to_pinging());
        assert_eq!(round.phase(), GamePhase::Placing);
    }

    #[test]
    fn test_outcome_recorded_once_per_round() {
        let mut round = level_round(1, 5);
        assert!(round.take_unrecorded_outcome().is_none());
        round.ping(Vec2::ZERO, 0.0);
        round.place_final_guess();
        round.click(Vec2::new(100.0, 100.0));
        round.submit(10.0);
        assert!(round.take_unrecorded_outcome().is_some());
        assert!(round.take_unrecorded_outcome().is_none());
        assert!(round.outcome.is_some());

        round.restart();
        round.ping(Vec2::ZERO, 0.0);
        round.place_final_guess();
        round.click(Vec2::new(100.0, 100.0));
        round.submit(10.0);
        assert!(round.take_unrecorded_outcome().is_some());
    }

    #[test]
    fn test_restart_clears_stale_guess() {
        let mut round = level_round(1, 5);
        round.ping(Vec2::ZERO, 0.0);
        round.place_final_guess();
        round.click(Vec2::new(100.0, 100.0));
        round.submit(10.0);
        let old_target = round.target;

        round.restart();
        assert_eq!(round.phase(), GamePhase::Pinging);
        assert_eq!(round.final_guess(), None);
        assert!(round.session().history().is_empty());
        assert_eq!(round.session().pings_used(), 0);
        assert!(round.outcome.is_none());
        assert_ne!(round.target, old_target);
    }

    #[test]
    fn test_advance_uses_new_budgets() {
        let mut round = level_round(1, 5);
        round.ping(Vec2::ZERO, 0.0);
        round.advance(RoundSetup::for_level(10, &[] as &[&str], &Settings::default()));
        assert_eq!(round.session().pings_remaining(), PingBudget::Limited(2));
        assert_eq!(round.target.size, 70.0);
    }

    #[test]
    fn test_replay_after_target_moves() {
        // Chapter 3: moving target, two replays
        let mut round = level_round(21, 2024);
        let click = Vec2::new(400.0, 300.0);
        let first = round.ping(click, 0.0).expect("ping");
        let snapshot = round.session().history()[0].target_center;
        round.ping(Vec2::new(100.0, 100.0), 1.0);
        round.ping(Vec2::new(700.0, 500.0), 2.0);
        assert_ne!(round.target.center(), snapshot);

        let replayed = round.replay(0).expect("replay");
        assert_eq!(replayed, first.echo);
        assert_eq!(round.session().replays_remaining(), ReplayBudget::Limited(1));
    }

    #[test]
    fn test_hints_unlock_after_threshold() {
        let mut round = level_round(1, 8);
        assert!(round.take_hint().is_none());
        round.ping(Vec2::new(10.0, 10.0), 0.0);
        round.ping(Vec2::new(20.0, 10.0), 1.0);
        assert!(!round.hint_available());
        round.ping(Vec2::new(30.0, 10.0), 2.0);
        assert!(round.hint_available());
        assert!(round.take_hint().is_some());
        assert!(round.hint_used);
    }

    #[test]
    fn test_hints_disabled_in_settings() {
        let settings = Settings {
            hints_enabled: false,
            ..Settings::default()
        };
        let mut round = RoundState::new(RoundSetup::for_level(1, &[] as &[&str], &settings), 8);
        for i in 0..5 {
            round.ping(Vec2::new(10.0 * i as f32, 10.0), i as f64);
        }
        assert!(round.take_hint().is_none());
    }

    #[test]
    fn test_reveal_cheat() {
        let round = level_round(1, 3);
        let mut cheats = CheatFlags::new();
        assert!(round.revealed_target(&cheats).is_none());
        cheats.activate("show_target");
        assert_eq!(round.revealed_target(&cheats), Some(&round.target));
    }

    #[test]
    fn test_ghost_sight_marks_phantoms() {
        let setup = RoundSetup::for_level(31, &["ghost_sight"], &Settings::default());
        let round = RoundState::new(setup, 77);
        assert!(round.visible_phantoms().iter().all(|p| p.marked));
    }

    #[test]
    fn test_snapshot_resume_is_deterministic() {
        let mut store = MemoryStore::new();
        let mut round = level_round(41, 31337);
        round.ping(Vec2::new(200.0, 200.0), 0.0);
        assert!(round.save_snapshot(&mut store));

        let mut resumed = RoundState::load_snapshot(&store).expect("snapshot");
        assert_eq!(resumed, round);
        let a = round.ping(Vec2::new(500.0, 100.0), 1.0).map(|o| o.echo);
        let b = resumed.ping(Vec2::new(500.0, 100.0), 1.0).map(|o| o.echo);
        assert_eq!(a, b);
        assert_eq!(resumed.target, round.target);

        RoundState::clear_snapshot(&mut store);
        assert!(RoundState::load_snapshot(&store).is_none());
    }

    #[test]
    fn test_same_seed_same_round() {
        let a = level_round(45, 4242);
        let b = level_round(45, 4242);
        assert_eq!(a.target, b.target);
        assert_eq!(a.phantoms, b.phantoms);
    }
}
