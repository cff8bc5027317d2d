//! Ping and replay bookkeeping for a single round
//!
//! Every ping stores a copy of the target center as it was at ping time.
//! Replays derive their echo from that copy, never from the live target,
//! so a target that later shrinks or drifts still replays the original echo.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::chapters::{Mechanic, MechanicEffect};
use crate::geometry::{Direction, GameBounds, Target, get_direction};

/// Ping allowance for a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PingBudget {
    Limited(u32),
    Unlimited,
}

/// Replay allowance: `-1` unlimited, absent disabled, `N` finite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayBudget {
    #[default]
    Disabled,
    Unlimited,
    Limited(u32),
}

impl ReplayBudget {
    /// Decode the stored sentinel form
    pub fn from_sentinel(value: Option<i32>) -> Self {
        match value {
            None => ReplayBudget::Disabled,
            Some(n) if n < 0 => ReplayBudget::Unlimited,
            Some(n) => ReplayBudget::Limited(n as u32),
        }
    }

    pub fn to_sentinel(self) -> Option<i32> {
        match self {
            ReplayBudget::Disabled => None,
            ReplayBudget::Unlimited => Some(-1),
            ReplayBudget::Limited(n) => Some(n.min(i32::MAX as u32) as i32),
        }
    }

    /// Replays still available right now
    pub fn can_replay(self) -> bool {
        match self {
            ReplayBudget::Disabled => false,
            ReplayBudget::Unlimited => true,
            ReplayBudget::Limited(n) => n > 0,
        }
    }

    /// Unspent finite replays (0 for unlimited or disabled)
    pub fn unspent(self) -> u32 {
        match self {
            ReplayBudget::Limited(n) => n,
            _ => 0,
        }
    }
}

/// One emitted ping
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PingRecord {
    /// Where the player clicked
    pub position: Vec2,
    /// Target center at the moment of the ping
    pub target_center: Vec2,
    /// Wall-clock time supplied by the caller (ms)
    pub timestamp: f64,
    pub is_replayed: bool,
}

impl PingRecord {
    /// Echo direction from the ping to the target as it was when pinged
    pub fn echo(&self) -> Direction {
        get_direction(self.position, self.target_center)
    }
}

/// Result of a successful ping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PingOutcome {
    pub index: usize,
    pub echo: Direction,
    pub effect: MechanicEffect,
}

/// Ping history and budgets for the current round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PingSession {
    initial_pings: PingBudget,
    initial_replays: ReplayBudget,
    history: Vec<PingRecord>,
    pings_remaining: PingBudget,
    pings_used: u32,
    replays_remaining: ReplayBudget,
    replays_used: u32,
}

impl PingSession {
    pub fn new(pings: PingBudget, replays: ReplayBudget) -> Self {
        Self {
            initial_pings: pings,
            initial_replays: replays,
            history: Vec::new(),
            pings_remaining: pings,
            pings_used: 0,
            replays_remaining: replays,
            replays_used: 0,
        }
    }

    pub fn history(&self) -> &[PingRecord] {
        &self.history
    }

    pub fn last_ping(&self) -> Option<&PingRecord> {
        self.history.last()
    }

    pub fn pings_used(&self) -> u32 {
        self.pings_used
    }

    pub fn pings_remaining(&self) -> PingBudget {
        self.pings_remaining
    }

    /// Total budget this round started with (None when unlimited)
    pub fn total_pings(&self) -> Option<u32> {
        match self.initial_pings {
            PingBudget::Limited(n) => Some(n),
            PingBudget::Unlimited => None,
        }
    }

    pub fn has_pings(&self) -> bool {
        match self.pings_remaining {
            PingBudget::Limited(n) => n > 0,
            PingBudget::Unlimited => true,
        }
    }

    pub fn replays_remaining(&self) -> ReplayBudget {
        self.replays_remaining
    }

    pub fn replays_used(&self) -> u32 {
        self.replays_used
    }

    pub fn initial_replays(&self) -> ReplayBudget {
        self.initial_replays
    }

    /// Record a ping at `pos` and apply the chapter mechanic to the live target
    ///
    /// Returns `None` without touching any state when the budget is spent.
    pub fn handle_ping<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        pos: Vec2,
        target: &mut Target,
        mechanic: &Mechanic,
        bounds: GameBounds,
        timestamp: f64,
    ) -> Option<PingOutcome> {
        if !self.has_pings() {
            log::debug!("Ping rejected: budget exhausted");
            return None;
        }

        let record = PingRecord {
            position: pos,
            target_center: target.center(),
            timestamp,
            is_replayed: false,
        };
        self.history.push(record);

        if let PingBudget::Limited(n) = &mut self.pings_remaining {
            *n -= 1;
        }
        self.pings_used += 1;

        let effect = mechanic.apply_on_ping(rng, target, bounds);
        log::debug!(
            "Ping #{} at ({:.0}, {:.0}): distance {:.1}, effect {:?}",
            self.pings_used,
            pos.x,
            pos.y,
            record.echo().distance,
            effect
        );

        Some(PingOutcome {
            index: self.history.len() - 1,
            echo: record.echo(),
            effect,
        })
    }

    /// Replay the echo of ping `index` from its stored snapshot
    ///
    /// The same ping may be replayed repeatedly until the budget runs out.
    pub fn handle_replay_ping(&mut self, index: usize) -> Option<Direction> {
        if !self.replays_remaining.can_replay() {
            log::debug!("Replay rejected: {:?}", self.replays_remaining);
            return None;
        }
        let record = self.history.get_mut(index)?;
        record.is_replayed = true;
        let echo = record.echo();

        if let ReplayBudget::Limited(n) = &mut self.replays_remaining {
            *n -= 1;
        }
        self.replays_used += 1;
        log::debug!("Replayed ping #{} ({} used)", index + 1, self.replays_used);

        Some(echo)
    }

    /// Fresh budgets and empty history for a new round
    pub fn reset(&mut self) {
        *self = Self::new(self.initial_pings, self.initial_replays);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chapters::{Drift, Shrink};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn target() -> Target {
        Target::new(Vec2::new(300.0, 200.0), 100.0)
    }

    /// Ping from the origin with no mechanic in the default arena
    fn plain_ping(
        session: &mut PingSession,
        rng: &mut Pcg32,
        t: &mut Target,
        timestamp: f64,
    ) -> Option<PingOutcome> {
        session.handle_ping(rng, Vec2::ZERO, t, &Mechanic::None, GameBounds::default(), timestamp)
    }

    #[test]
    fn test_ping_decrements_budget() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut session = PingSession::new(PingBudget::Limited(2), ReplayBudget::Disabled);
        let mut t = target();
        let out = plain_ping(&mut session, &mut rng, &mut t, 0.0).expect("ping accepted");
        assert_eq!(out.index, 0);
        assert_eq!(session.pings_remaining(), PingBudget::Limited(1));
        assert_eq!(session.pings_used(), 1);
        assert_eq!(session.history()[0].target_center, Vec2::new(350.0, 250.0));
    }

    #[test]
    fn test_exhausted_budget_leaves_state_unchanged() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut session = PingSession::new(PingBudget::Limited(1), ReplayBudget::Disabled);
        let mut t = target();
        let bounds = GameBounds::default();
        session.handle_ping(&mut rng, Vec2::ZERO, &mut t, &Mechanic::None, bounds, 0.0);
        let before = session.clone();
        assert!(
            session
                .handle_ping(&mut rng, Vec2::ONE, &mut t, &Mechanic::None, bounds, 1.0)
                .is_none()
        );
        assert_eq!(session, before);
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.pings_used(), 1);
    }

    #[test]
    fn test_unlimited_pings_never_run_out() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut session = PingSession::new(PingBudget::Unlimited, ReplayBudget::Disabled);
        let mut t = target();
        for i in 0..25 {
            assert!(plain_ping(&mut session, &mut rng, &mut t, i as f64).is_some());
        }
        assert_eq!(session.pings_used(), 25);
        assert_eq!(session.pings_remaining(), PingBudget::Unlimited);
    }

    #[test]
    fn test_replay_uses_snapshot_not_live_target() {
        let mut rng = Pcg32::seed_from_u64(42);
        let mut session = PingSession::new(PingBudget::Limited(3), ReplayBudget::Limited(5));
        let mut t = target();
        let mechanic = Mechanic::Combined {
            shrink: Shrink { amount: 10.0, min_size: 40.0 },
            drift: Drift { distance: 80.0 },
            phantom_count: 0,
        };
        let click = Vec2::new(50.0, 50.0);
        let first = session
            .handle_ping(&mut rng, click, &mut t, &mechanic, GameBounds::default(), 0.0)
            .expect("ping accepted");
        assert_ne!(t.center(), Vec2::new(350.0, 250.0));

        let replay = session.handle_replay_ping(0).expect("replay accepted");
        assert_eq!(replay, first.echo);
        assert_eq!(replay, get_direction(click, Vec2::new(350.0, 250.0)));
        assert!(session.history()[0].is_replayed);
    }

    #[test]
    fn test_replay_budget_and_bounds() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut session = PingSession::new(PingBudget::Limited(3), ReplayBudget::Limited(2));
        let mut t = target();
        plain_ping(&mut session, &mut rng, &mut t, 0.0);

        assert!(session.handle_replay_ping(3).is_none());
        assert_eq!(session.replays_used(), 0);
        assert!(session.handle_replay_ping(0).is_some());
        assert!(session.handle_replay_ping(0).is_some());
        assert!(session.handle_replay_ping(0).is_none());
        assert_eq!(session.replays_remaining(), ReplayBudget::Limited(0));
        assert_eq!(session.replays_used(), 2);
    }

    #[test]
    fn test_replays_disabled() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut session = PingSession::new(PingBudget::Limited(3), ReplayBudget::Disabled);
        let mut t = target();
        plain_ping(&mut session, &mut rng, &mut t, 0.0);
        assert!(session.handle_replay_ping(0).is_none());
    }

    #[test]
    fn test_reset_restores_budgets() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut session = PingSession::new(PingBudget::Limited(3), ReplayBudget::Unlimited);
        let mut t = target();
        plain_ping(&mut session, &mut rng, &mut t, 0.0);
        session.handle_replay_ping(0);
        session.reset();
        assert_eq!(session, PingSession::new(PingBudget::Limited(3), ReplayBudget::Unlimited));
    }

    #[test]
    fn test_sentinel_round_trip_values() {
        assert_eq!(ReplayBudget::from_sentinel(Some(-1)), ReplayBudget::Unlimited);
        assert_eq!(ReplayBudget::from_sentinel(None), ReplayBudget::Disabled);
        assert_eq!(ReplayBudget::from_sentinel(Some(3)), ReplayBudget::Limited(3));
        assert_eq!(ReplayBudget::Unlimited.to_sentinel(), Some(-1));
    }
}
