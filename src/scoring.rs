//! Round scoring
//!
//! Nine components (base, proximity, ping efficiency, early guess, speed,
//! perfect hit, boon, replay conservation, time penalty) are summed, scaled
//! by the difficulty and hint multipliers, and clamped at zero. All weights
//! are named constants so balance can change without touching the formula.

use serde::{Deserialize, Serialize};

use crate::settings::DifficultyMode;

/// Flat points for finishing a round
pub const BASE_SCORE: f32 = 100.0;
/// Points per proximity percent
pub const PROXIMITY_POINTS_PER_PERCENT: f32 = 5.0;
/// Points per unused ping
pub const PING_EFFICIENCY_PER_PING: f32 = 40.0;
/// Flat bonus for guessing with pings still banked
pub const EARLY_GUESS_BONUS: f32 = 75.0;
/// Speed bonus steps: (elapsed seconds strictly below, bonus)
pub const SPEED_BONUS_STEPS: [(f32, f32); 3] = [(10.0, 150.0), (20.0, 100.0), (30.0, 50.0)];
/// Proximity at or above which the perfect-hit bonus applies
pub const PERFECT_HIT_PROXIMITY: u8 = 95;
pub const PERFECT_HIT_BONUS: f32 = 250.0;
/// Flat bonus while a boon is active
pub const BOON_BONUS: f32 = 50.0;
/// Points per unused finite replay
pub const REPLAY_CONSERVATION_PER_REPLAY: f32 = 25.0;
/// Penalty points per elapsed second (before boon scaling)
pub const TIME_PENALTY_PER_SECOND: f32 = 2.0;
/// Score multiplier after a hint was used
pub const HINT_MULTIPLIER: f32 = 0.85;

pub const NORMAL_MULTIPLIER: f32 = 1.0;
pub const CHALLENGE_MULTIPLIER: f32 = 1.5;

/// Minimum score to advance in normal mode
pub const NORMAL_ADVANCE_SCORE: u32 = 500;
/// Minimum score to advance in challenge mode
pub const CHALLENGE_ADVANCE_SCORE: u32 = 700;
/// Minimum rank to advance in either mode
pub const ADVANCE_RANK: Rank = Rank::B;

/// Letter rank, ordered worst to best
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rank {
    F,
    D,
    C,
    B,
    A,
    S,
}

/// Rank breakpoints: (minimum total, rank), best first
pub const RANK_THRESHOLDS: [(u32, Rank); 5] = [
    (1100, Rank::S),
    (850, Rank::A),
    (500, Rank::B),
    (300, Rank::C),
    (150, Rank::D),
];

impl Rank {
    pub fn from_score(total: u32) -> Self {
        RANK_THRESHOLDS
            .iter()
            .find(|(min, _)| total >= *min)
            .map(|&(_, rank)| rank)
            .unwrap_or(Rank::F)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::S => "S",
            Rank::A => "A",
            Rank::B => "B",
            Rank::C => "C",
            Rank::D => "D",
            Rank::F => "F",
        }
    }
}

impl DifficultyMode {
    pub fn score_multiplier(&self) -> f32 {
        match self {
            DifficultyMode::Normal => NORMAL_MULTIPLIER,
            DifficultyMode::Challenge => CHALLENGE_MULTIPLIER,
        }
    }

    pub fn advance_score(&self) -> u32 {
        match self {
            DifficultyMode::Normal => NORMAL_ADVANCE_SCORE,
            DifficultyMode::Challenge => CHALLENGE_ADVANCE_SCORE,
        }
    }
}

/// Raw telemetry from a finished round
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreInput {
    /// 0..=100, after any boon multiplier
    pub proximity: u8,
    pub pings_used: u32,
    /// Ping budget (None when unlimited)
    pub total_pings: Option<u32>,
    pub elapsed_seconds: f32,
    pub chapter: u32,
    pub replays_used: u32,
    /// Finite replays still unspent (0 for unlimited/disabled)
    pub replays_unspent: u32,
    pub hint_used: bool,
    pub boon_active: bool,
    pub time_penalty_multiplier: f32,
    pub difficulty: DifficultyMode,
}

/// Named score components
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub base: u32,
    pub proximity_bonus: u32,
    pub ping_efficiency: u32,
    pub early_guess: u32,
    pub speed_bonus: u32,
    pub perfect_hit: u32,
    pub boon_bonus: u32,
    pub replay_conservation: u32,
    pub time_penalty: u32,
    pub difficulty_multiplier: f32,
    pub hint_multiplier: f32,
}

impl ScoreBreakdown {
    /// Sum of positive components before multipliers
    pub fn positive_total(&self) -> u32 {
        self.base
            + self.proximity_bonus
            + self.ping_efficiency
            + self.early_guess
            + self.speed_bonus
            + self.perfect_hit
            + self.boon_bonus
            + self.replay_conservation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub total: u32,
    pub breakdown: ScoreBreakdown,
    pub rank: Rank,
}

impl ScoreResult {
    /// Whether this result clears the bar for the next level
    pub fn can_advance(&self, difficulty: DifficultyMode) -> bool {
        self.rank >= ADVANCE_RANK && self.total >= difficulty.advance_score()
    }
}

fn speed_bonus(elapsed: f32) -> f32 {
    SPEED_BONUS_STEPS
        .iter()
        .find(|(limit, _)| elapsed < *limit)
        .map(|&(_, bonus)| bonus)
        .unwrap_or(0.0)
}

pub fn calculate_score(input: &ScoreInput) -> ScoreResult {
    let unused_pings = input
        .total_pings
        .map(|total| total.saturating_sub(input.pings_used))
        .unwrap_or(0);
    let elapsed = input.elapsed_seconds.max(0.0);
    let proximity = input.proximity.min(100);

    let breakdown = ScoreBreakdown {
        base: BASE_SCORE as u32,
        proximity_bonus: (proximity as f32 * PROXIMITY_POINTS_PER_PERCENT).round() as u32,
        ping_efficiency: (unused_pings as f32 * PING_EFFICIENCY_PER_PING) as u32,
        early_guess: if unused_pings > 0 { EARLY_GUESS_BONUS as u32 } else { 0 },
        speed_bonus: speed_bonus(elapsed) as u32,
        perfect_hit: if input.proximity >= PERFECT_HIT_PROXIMITY {
            PERFECT_HIT_BONUS as u32
        } else {
            0
        },
        boon_bonus: if input.boon_active { BOON_BONUS as u32 } else { 0 },
        replay_conservation: (input.replays_unspent as f32 * REPLAY_CONSERVATION_PER_REPLAY) as u32,
        time_penalty: (elapsed * TIME_PENALTY_PER_SECOND * input.time_penalty_multiplier.max(0.0))
            .round() as u32,
        difficulty_multiplier: input.difficulty.score_multiplier(),
        hint_multiplier: if input.hint_used { HINT_MULTIPLIER } else { 1.0 },
    };

    let net = breakdown.positive_total() as f32 - breakdown.time_penalty as f32;
    let total = (net * breakdown.difficulty_multiplier * breakdown.hint_multiplier)
        .max(0.0)
        .round() as u32;
    let rank = Rank::from_score(total);

    log::debug!(
        "Chapter {} score: {} ({}) from {:?}",
        input.chapter,
        total,
        rank.as_str(),
        breakdown
    );

    ScoreResult {
        total,
        breakdown,
        rank,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> ScoreInput {
        ScoreInput {
            proximity: 80,
            pings_used: 3,
            total_pings: Some(5),
            elapsed_seconds: 15.0,
            chapter: 1,
            replays_used: 0,
            replays_unspent: 0,
            hint_used: false,
            boon_active: false,
            time_penalty_multiplier: 1.0,
            difficulty: DifficultyMode::Normal,
        }
    }

    #[test]
    fn test_components() {
        let result = calculate_score(&input());
        let b = result.breakdown;
        assert_eq!(b.base, 100);
        assert_eq!(b.proximity_bonus, 400);
        assert_eq!(b.ping_efficiency, 80);
        assert_eq!(b.early_guess, 75);
        assert_eq!(b.speed_bonus, 100);
        assert_eq!(b.perfect_hit, 0);
        assert_eq!(b.time_penalty, 30);
        // 100 + 400 + 80 + 75 + 100 - 30
        assert_eq!(result.total, 725);
        assert_eq!(result.rank, Rank::B);
        assert!(result.can_advance(DifficultyMode::Normal));
    }

    #[test]
    fn test_challenge_multiplier() {
        let mut i = input();
        i.difficulty = DifficultyMode::Challenge;
        let result = calculate_score(&i);
        assert_eq!(result.total, 1088);
        assert_eq!(result.rank, Rank::A);
    }

    #[test]
    fn test_perfect_hit_and_bonuses() {
        let mut i = input();
        i.proximity = 100;
        i.boon_active = true;
        i.replays_unspent = 2;
        let b = calculate_score(&i).breakdown;
        assert_eq!(b.perfect_hit, PERFECT_HIT_BONUS as u32);
        assert_eq!(b.boon_bonus, 50);
        assert_eq!(b.replay_conservation, 50);
    }

    #[test]
    fn test_clamped_to_zero() {
        let mut i = input();
        i.proximity = 0;
        i.pings_used = 5;
        i.elapsed_seconds = 600.0;
        let result = calculate_score(&i);
        assert_eq!(result.total, 0);
        assert_eq!(result.rank, Rank::F);
    }

    #[test]
    fn test_hint_reduces_score() {
        let mut i = input();
        let without = calculate_score(&i).total;
        i.hint_used = true;
        let with = calculate_score(&i).total;
        assert!(with < without);
    }

    #[test]
    fn test_time_penalty_multiplier() {
        let mut i = input();
        i.time_penalty_multiplier = 0.5;
        assert_eq!(calculate_score(&i).breakdown.time_penalty, 15);
    }

    #[test]
    fn test_advance_thresholds() {
        let b_normal = ScoreResult {
            total: 600,
            breakdown: ScoreBreakdown::default(),
            rank: Rank::B,
        };
        assert!(b_normal.can_advance(DifficultyMode::Normal));
        assert!(!b_normal.can_advance(DifficultyMode::Challenge));
    }

    #[test]
    fn test_rank_steps() {
        assert_eq!(Rank::from_score(0), Rank::F);
        assert_eq!(Rank::from_score(150), Rank::D);
        assert_eq!(Rank::from_score(499), Rank::C);
        assert_eq!(Rank::from_score(500), Rank::B);
        assert_eq!(Rank::from_score(850), Rank::A);
        assert_eq!(Rank::from_score(1100), Rank::S);
    }
}
