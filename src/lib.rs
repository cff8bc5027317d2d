//! Echolocate - find a hidden target by listening to its echoes
//!
//! Core modules:
//! - `geometry`: Target/phantom placement, direction and proximity math
//! - `sim`: Round simulation (phase machine, ping/replay session, mechanics)
//! - `chapters`: Chapter table, per-level parameters, special mechanics
//! - `boons`: Modifier cards and effect composition
//! - `scoring`: Round scoring and ranks
//! - `hints`: Proximity/direction hints
//! - `unlocks`: Cheat flags and chapter gating
//! - `progress`: Persisted chapter statistics
//! - `echo`: Pan/gain/pitch cues for the audio layer
//! - `persistence`: Key-value store abstraction
//! - `campaign`: Facade tying progression, unlocks and persistence together

pub mod boons;
pub mod campaign;
pub mod chapters;
pub mod echo;
pub mod geometry;
pub mod highscores;
pub mod hints;
pub mod persistence;
pub mod platform;
pub mod progress;
pub mod scoring;
pub mod settings;
pub mod sim;
pub mod unlocks;

pub use campaign::Campaign;
pub use geometry::{Direction, GameBounds, PhantomTarget, Position, Target};
pub use highscores::HighScores;
pub use settings::{DifficultyMode, Settings};

/// Game configuration constants
pub mod consts {
    /// Default arena dimensions
    pub const ARENA_WIDTH: u32 = 800;
    pub const ARENA_HEIGHT: u32 = 600;

    /// Margin kept between a freshly placed target and the arena edge
    pub const TARGET_MARGIN: f32 = 50.0;
    /// Margin used when a moving target is relocated (always 50, independent of TARGET_MARGIN)
    pub const MOVE_CLAMP_MARGIN: f32 = 50.0;

    /// Minimum center-to-center distance between real target and phantoms
    pub const PHANTOM_MIN_DISTANCE: f32 = 150.0;
    /// Placement attempts per phantom before the slot is dropped
    pub const PHANTOM_MAX_ATTEMPTS: u32 = 50;

    /// Proximity falls to 0 at (arena diagonal * PROXIMITY_DAMPING)
    pub const PROXIMITY_DAMPING: f32 = 0.5;

    /// Ping-to-target distance under which the hint says "very close"
    pub const HINT_CLOSE_RADIUS: f32 = 150.0;
    /// Fraction of the ping budget that must be spent before hints appear
    pub const HINT_THRESHOLD: f32 = 0.6;

    /// Mechanic defaults when a chapter leaves them unspecified
    pub const DEFAULT_SHRINK_AMOUNT: f32 = 3.0;
    pub const DEFAULT_MIN_TARGET_SIZE: f32 = 40.0;
    pub const DEFAULT_MOVE_DISTANCE: f32 = 30.0;
    pub const DEFAULT_PHANTOM_COUNT: u32 = 2;

    /// Levels per chapter (level 10 is the boss)
    pub const LEVELS_PER_CHAPTER: u32 = 10;
}

