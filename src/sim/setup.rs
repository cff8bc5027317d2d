//! Everything a round needs before the first ping
//!
//! Built either from a campaign level or from a custom configuration handed
//! over by the share/import layer.

use serde::{Deserialize, Serialize};

use super::session::{PingBudget, ReplayBudget};
use crate::boons::{DerivedEffects, apply_boon_effects};
use crate::chapters::{
    LevelConfig, Mechanic, MechanicDetails, SpecialMechanic, chapter, get_chapter_from_level,
    get_level_config,
};
use crate::consts::TARGET_MARGIN;
use crate::geometry::GameBounds;
use crate::settings::{DifficultyMode, Settings};

/// Smallest target a custom round may use
pub const MIN_CUSTOM_TARGET_SIZE: f32 = 20.0;
/// Smallest arena side a custom round may use
pub const MIN_CUSTOM_ARENA: u32 = 200;

/// Custom-mode configuration as exchanged with share codes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomConfig {
    /// Ping budget; `None` means unlimited
    pub pings: Option<u32>,
    pub target_size: f32,
    pub special_mechanic: SpecialMechanic,
    pub mechanic_details: MechanicDetails,
    /// `-1` unlimited, `None` disabled, `N` finite
    pub replays: Option<i32>,
    pub boons: Vec<String>,
    pub bounds: GameBounds,
}

impl Default for CustomConfig {
    fn default() -> Self {
        Self {
            pings: Some(5),
            target_size: 100.0,
            special_mechanic: SpecialMechanic::None,
            mechanic_details: MechanicDetails::default(),
            replays: Some(-1),
            boons: Vec::new(),
            bounds: GameBounds::default(),
        }
    }
}

/// Resolved parameters for one round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSetup {
    /// Campaign level config; `None` for custom rounds
    pub level: Option<LevelConfig>,
    pub chapter: u32,
    pub bounds: GameBounds,
    /// Target diameter after boon scaling
    pub target_size: f32,
    pub mechanic: Mechanic,
    pub effects: DerivedEffects,
    pub boons: Vec<String>,
    pub difficulty: DifficultyMode,
    pub hints_enabled: bool,
}

impl RoundSetup {
    /// Campaign round for global `level`
    pub fn for_level<S: AsRef<str>>(level: u32, boons: &[S], settings: &Settings) -> Self {
        let chapter_id = get_chapter_from_level(level);
        let config = chapter(chapter_id);
        let level_config = get_level_config(chapter_id, level);
        let effects = apply_boon_effects(
            PingBudget::Limited(level_config.pings),
            config.replays_available,
            boons,
        );

        Self {
            level: Some(level_config),
            chapter: chapter_id,
            bounds: GameBounds::default(),
            target_size: level_config.target_size * effects.radius_multiplier,
            mechanic: config.mechanic(),
            effects,
            boons: known_boons(boons),
            difficulty: settings.difficulty,
            hints_enabled: settings.hints_enabled,
        }
    }

    /// Custom round; out-of-range values are pulled back to playable ones
    pub fn from_custom(custom: &CustomConfig, settings: &Settings) -> Self {
        let bounds = GameBounds::new(
            custom.bounds.width.max(MIN_CUSTOM_ARENA),
            custom.bounds.height.max(MIN_CUSTOM_ARENA),
        );
        let pings = match custom.pings {
            Some(n) => PingBudget::Limited(n.max(1)),
            None => PingBudget::Unlimited,
        };
        let replays = ReplayBudget::from_sentinel(custom.replays);
        let effects = apply_boon_effects(pings, replays, &custom.boons);

        let max_size = bounds.width.min(bounds.height) as f32 - 2.0 * TARGET_MARGIN;
        let target_size = (custom.target_size * effects.radius_multiplier)
            .min(max_size)
            .max(MIN_CUSTOM_TARGET_SIZE);

        Self {
            level: None,
            chapter: 0,
            bounds,
            target_size,
            mechanic: Mechanic::resolve(custom.special_mechanic, &custom.mechanic_details),
            effects,
            boons: known_boons(&custom.boons),
            difficulty: settings.difficulty,
            hints_enabled: settings.hints_enabled,
        }
    }

    pub fn is_custom(&self) -> bool {
        self.level.is_none()
    }

    pub fn boon_active(&self) -> bool {
        !self.boons.is_empty()
    }
}

fn known_boons<S: AsRef<str>>(ids: &[S]) -> Vec<String> {
    ids.iter()
        .map(AsRef::as_ref)
        .filter(|id| crate::boons::boon(id).is_some())
        .map(str::to_string)
        .collect()
}
