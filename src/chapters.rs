//! Chapter table, per-level parameters and special target mechanics
//!
//! Levels are numbered globally from 1. Each chapter spans ten levels and the
//! tenth is a boss level with a tighter ping budget and smaller target.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::geometry::{GameBounds, PhantomTarget, Target, generate_phantom_targets};
use crate::sim::ReplayBudget;

/// Chapter-wide target behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialMechanic {
    #[default]
    None,
    ShrinkingTarget,
    MovingTarget,
    PhantomTargets,
    CombinedChallenge,
}

/// Sparse tuning block for a chapter's mechanic; unset fields use defaults
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MechanicDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shrink_amount: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_target_size: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub move_distance: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phantom_count: Option<u32>,
}

impl MechanicDetails {
    pub const EMPTY: Self = Self {
        shrink_amount: None,
        min_target_size: None,
        move_distance: None,
        phantom_count: None,
    };

    fn shrink(&self) -> Shrink {
        Shrink {
            amount: self.shrink_amount.unwrap_or(DEFAULT_SHRINK_AMOUNT),
            min_size: self.min_target_size.unwrap_or(DEFAULT_MIN_TARGET_SIZE),
        }
    }

    fn movement(&self) -> Drift {
        Drift {
            distance: self.move_distance.unwrap_or(DEFAULT_MOVE_DISTANCE),
        }
    }

    fn phantoms(&self) -> u32 {
        self.phantom_count.unwrap_or(DEFAULT_PHANTOM_COUNT)
    }
}

/// Shrink the target by `amount` per ping, never below `min_size`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shrink {
    pub amount: f32,
    pub min_size: f32,
}

/// Relocate the target `distance` along a random angle per ping
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Drift {
    pub distance: f32,
}

/// A chapter mechanic with its parameters resolved
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Mechanic {
    #[default]
    None,
    Shrink(Shrink),
    Move(Drift),
    Phantom { count: u32 },
    Combined {
        shrink: Shrink,
        drift: Drift,
        phantom_count: u32,
    },
}

/// What a ping did to the live target
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MechanicEffect {
    pub resized: Option<f32>,
    pub moved: Option<Vec2>,
}

impl Mechanic {
    pub fn resolve(kind: SpecialMechanic, details: &MechanicDetails) -> Self {
        match kind {
            SpecialMechanic::None => Mechanic::None,
            SpecialMechanic::ShrinkingTarget => Mechanic::Shrink(details.shrink()),
            SpecialMechanic::MovingTarget => Mechanic::Move(details.movement()),
            SpecialMechanic::PhantomTargets => Mechanic::Phantom {
                count: details.phantoms(),
            },
            SpecialMechanic::CombinedChallenge => Mechanic::Combined {
                shrink: details.shrink(),
                drift: details.movement(),
                phantom_count: details.phantoms(),
            },
        }
    }

    fn shrink(&self) -> Option<Shrink> {
        match *self {
            Mechanic::Shrink(s) | Mechanic::Combined { shrink: s, .. } => Some(s),
            _ => None,
        }
    }

    fn drift(&self) -> Option<Drift> {
        match *self {
            Mechanic::Move(d) | Mechanic::Combined { drift: d, .. } => Some(d),
            _ => None,
        }
    }

    /// Number of decoys this mechanic places (0 when it has none)
    pub fn phantom_count(&self) -> u32 {
        match *self {
            Mechanic::Phantom { count } => count,
            Mechanic::Combined { phantom_count, .. } => phantom_count,
            _ => 0,
        }
    }

    /// Apply per-ping side effects to the live target: shrink first, then move
    pub fn apply_on_ping<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        target: &mut Target,
        bounds: GameBounds,
    ) -> MechanicEffect {
        let mut effect = MechanicEffect::default();

        if let Some(shrink) = self.shrink() {
            target.size = (target.size - shrink.amount).max(shrink.min_size);
            effect.resized = Some(target.size);
        }

        if let Some(drift) = self.drift() {
            let angle = rng.random_range(0.0..std::f32::consts::TAU);
            let displaced = target.center() + Vec2::new(angle.cos(), angle.sin()) * drift.distance;
            let max = bounds.size() - Vec2::splat(target.size + MOVE_CLAMP_MARGIN);
            target.position = Vec2::new(
                clamp_axis(displaced.x, MOVE_CLAMP_MARGIN, max.x),
                clamp_axis(displaced.y, MOVE_CLAMP_MARGIN, max.y),
            );
            effect.moved = Some(target.position);
        }

        effect
    }

    /// Fresh decoys for a newly placed target (empty for non-phantom mechanics)
    pub fn place_phantoms<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        bounds: GameBounds,
        real: &Target,
    ) -> Vec<PhantomTarget> {
        match self.phantom_count() {
            0 => Vec::new(),
            count => generate_phantom_targets(rng, bounds, real, count, PHANTOM_MIN_DISTANCE),
        }
    }
}

/// `f32::clamp` panics when min > max, which a tiny arena can produce
#[inline]
fn clamp_axis(value: f32, min: f32, max: f32) -> f32 {
    value.min(max).max(min)
}

/// One of the fixed campaign chapters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChapterConfig {
    pub id: u32,
    pub name: &'static str,
    pub base_pings: u32,
    pub target_size: f32,
    pub special_mechanic: SpecialMechanic,
    pub mechanic_details: MechanicDetails,
    pub replays_available: ReplayBudget,
}

impl ChapterConfig {
    pub fn mechanic(&self) -> Mechanic {
        Mechanic::resolve(self.special_mechanic, &self.mechanic_details)
    }

    /// First global level of this chapter
    pub fn first_level(&self) -> u32 {
        (self.id - 1) * LEVELS_PER_CHAPTER + 1
    }
}

pub const CHAPTERS: [ChapterConfig; 5] = [
    ChapterConfig {
        id: 1,
        name: "First Echoes",
        base_pings: 5,
        target_size: 120.0,
        special_mechanic: SpecialMechanic::None,
        mechanic_details: MechanicDetails::EMPTY,
        replays_available: ReplayBudget::Unlimited,
    },
    ChapterConfig {
        id: 2,
        name: "Fading Signal",
        base_pings: 6,
        target_size: 110.0,
        special_mechanic: SpecialMechanic::ShrinkingTarget,
        mechanic_details: MechanicDetails {
            shrink_amount: Some(5.0),
            min_target_size: Some(40.0),
            move_distance: None,
            phantom_count: None,
        },
        replays_available: ReplayBudget::Limited(3),
    },
    ChapterConfig {
        id: 3,
        name: "Drifting Source",
        base_pings: 6,
        target_size: 110.0,
        special_mechanic: SpecialMechanic::MovingTarget,
        mechanic_details: MechanicDetails {
            shrink_amount: None,
            min_target_size: None,
            move_distance: Some(40.0),
            phantom_count: None,
        },
        replays_available: ReplayBudget::Limited(2),
    },
    ChapterConfig {
        id: 4,
        name: "Phantom Chorus",
        base_pings: 7,
        target_size: 100.0,
        special_mechanic: SpecialMechanic::PhantomTargets,
        mechanic_details: MechanicDetails {
            shrink_amount: None,
            min_target_size: None,
            move_distance: None,
            phantom_count: Some(3),
        },
        replays_available: ReplayBudget::Limited(1),
    },
    ChapterConfig {
        id: 5,
        name: "Convergence",
        base_pings: 8,
        target_size: 100.0,
        special_mechanic: SpecialMechanic::CombinedChallenge,
        mechanic_details: MechanicDetails {
            shrink_amount: Some(3.0),
            min_target_size: Some(40.0),
            move_distance: Some(25.0),
            phantom_count: Some(2),
        },
        replays_available: ReplayBudget::Disabled,
    },
];

pub const TOTAL_CHAPTERS: u32 = CHAPTERS.len() as u32;

/// Look up a chapter, clamping out-of-range ids into 1..=TOTAL_CHAPTERS
pub fn chapter(id: u32) -> &'static ChapterConfig {
    let index = id.clamp(1, TOTAL_CHAPTERS) - 1;
    &CHAPTERS[index as usize]
}

/// Chapter containing a global level; levels past the end clamp to the last chapter
pub fn get_chapter_from_level(level: u32) -> u32 {
    let level = level.max(1);
    ((level - 1) / LEVELS_PER_CHAPTER + 1).min(TOTAL_CHAPTERS)
}

/// Position of a global level within its chapter (1..=10)
#[inline]
pub fn level_in_chapter(level: u32) -> u32 {
    (level.max(1) - 1) % LEVELS_PER_CHAPTER + 1
}

/// Difficulty tier of a level within its chapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyTier {
    Easy,
    Medium,
    Hard,
    Boss,
}

impl DifficultyTier {
    pub fn for_level_in_chapter(level_in_chapter: u32) -> Self {
        match level_in_chapter {
            0..=3 => DifficultyTier::Easy,
            4..=7 => DifficultyTier::Medium,
            8..=9 => DifficultyTier::Hard,
            _ => DifficultyTier::Boss,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyTier::Easy => "easy",
            DifficultyTier::Medium => "medium",
            DifficultyTier::Hard => "hard",
            DifficultyTier::Boss => "boss",
        }
    }
}

/// Static sizing and budget numbers for one level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub chapter: u32,
    /// Global level number
    pub level: u32,
    pub level_in_chapter: u32,
    pub pings: u32,
    pub target_size: f32,
    pub difficulty: DifficultyTier,
}

impl LevelConfig {
    pub fn is_boss(&self) -> bool {
        self.difficulty == DifficultyTier::Boss
    }
}

/// Ping floor for regular levels
pub const MIN_PINGS: u32 = 3;
/// Ping floor on boss levels
pub const MIN_BOSS_PINGS: u32 = 2;
/// Target size floor for regular levels
pub const MIN_TARGET_SIZE: f32 = 60.0;
/// Target size floor on boss levels
pub const MIN_BOSS_TARGET_SIZE: f32 = 50.0;
/// Target shrinks this much per level within a chapter
pub const TARGET_SHRINK_PER_LEVEL: f32 = 4.0;
/// Extra target reduction on the boss level
pub const BOSS_TARGET_REDUCTION: f32 = 10.0;

/// Derive ping budget, target size and tier for `level` of `chapter_id`
///
/// `level` may be global or chapter-local; only its position within a
/// ten-level block matters.
pub fn get_level_config(chapter_id: u32, level: u32) -> LevelConfig {
    let config = chapter(chapter_id);
    let lic = level_in_chapter(level);
    let difficulty = DifficultyTier::for_level_in_chapter(lic);

    let mut pings = config.base_pings.saturating_sub(lic / 3).max(MIN_PINGS);
    let mut target_size =
        (config.target_size - lic as f32 * TARGET_SHRINK_PER_LEVEL).max(MIN_TARGET_SIZE);

    if difficulty == DifficultyTier::Boss {
        pings = pings.saturating_sub(1).max(MIN_BOSS_PINGS);
        target_size = (target_size - BOSS_TARGET_REDUCTION).max(MIN_BOSS_TARGET_SIZE);
    }

    LevelConfig {
        chapter: config.id,
        level: if level > LEVELS_PER_CHAPTER {
            level
        } else {
            config.first_level() + lic - 1
        },
        level_in_chapter: lic,
        pings,
        target_size,
        difficulty,
    }
}
