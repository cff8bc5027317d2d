//! Game settings and preferences
//!
//! Persisted separately from campaign progress.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::persistence::{self, Store, keys};
use crate::sim::CustomConfig;

/// Scoring difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyMode {
    #[default]
    Normal,
    Challenge,
}

impl DifficultyMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyMode::Normal => "Normal",
            DifficultyMode::Challenge => "Challenge",
        }
    }

}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown difficulty mode {0:?}")]
pub struct UnknownDifficulty(pub String);

impl FromStr for DifficultyMode {
    type Err = UnknownDifficulty;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "normal" => Ok(DifficultyMode::Normal),
            "challenge" | "hard" => Ok(DifficultyMode::Challenge),
            _ => Err(UnknownDifficulty(s.to_string())),
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub difficulty: DifficultyMode,
    /// Offer hints once enough of the ping budget is spent
    pub hints_enabled: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Echo volume (0.0 - 1.0)
    pub echo_volume: f32,
    /// Mute when window loses focus
    pub mute_on_blur: bool,

    // === Accessibility ===
    /// Reduced motion (no ping ripples)
    pub reduced_motion: bool,
    /// High contrast mode
    pub high_contrast: bool,

    /// Last custom-mode configuration the player ran
    pub last_custom: Option<CustomConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: DifficultyMode::Normal,
            hints_enabled: true,

            master_volume: 0.8,
            echo_volume: 1.0,
            mute_on_blur: true,

            reduced_motion: false,
            high_contrast: false,

            last_custom: None,
        }
    }
}

impl Settings {
    /// Effective echo gain (0 when muted by volume)
    pub fn effective_volume(&self) -> f32 {
        (self.master_volume * self.echo_volume).clamp(0.0, 1.0)
    }

    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_echo_volume(&mut self, vol: f32) {
        self.echo_volume = vol.clamp(0.0, 1.0);
    }

    /// Load settings, falling back to defaults
    pub fn load<S: Store + ?Sized>(store: &S) -> Self {
        persistence::load_or_default(store, keys::SETTINGS)
    }

    /// Save settings (best effort)
    pub fn save<S: Store + ?Sized>(&self, store: &mut S) {
        if persistence::save(store, keys::SETTINGS, self) {
            log::info!("Settings saved");
        }
    }
}
