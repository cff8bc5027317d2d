//! Echo cue parameters for the audio layer
//!
//! Stereo pan, gain and pitch derived from a ping's `Direction`. The audio
//! layer turns these into an oscillator + panner + gain graph; no sound is
//! produced here.

use serde::{Deserialize, Serialize};

use crate::geometry::{Direction, GameBounds};

/// Pitch of an echo from a target level with the ping
pub const BASE_PITCH_HZ: f32 = 440.0;
/// Maximum pitch shift (fraction of base) for a target straight above/below
pub const PITCH_RANGE: f32 = 0.5;
/// Quietest echo, so a far target is still audible
pub const MIN_GAIN: f32 = 0.08;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EchoCue {
    /// -1.0 (hard left) to 1.0 (hard right)
    pub pan: f32,
    /// MIN_GAIN..=1.0 before master volume
    pub gain: f32,
    pub pitch_hz: f32,
}

impl EchoCue {
    pub fn from_direction(dir: &Direction, bounds: GameBounds) -> Self {
        let diagonal = bounds.diagonal();
        let falloff = if diagonal > 0.0 {
            1.0 - (dir.distance / diagonal).min(1.0)
        } else {
            1.0
        };
        // Screen y grows downward: a target above the ping has negative vertical_ratio
        let pitch = BASE_PITCH_HZ * (1.0 - dir.vertical_ratio * PITCH_RANGE);
        Self {
            pan: dir.horizontal_ratio.clamp(-1.0, 1.0),
            gain: falloff.max(MIN_GAIN),
            pitch_hz: pitch,
        }
    }

    /// Scale gain by the player's volume setting
    pub fn with_volume(mut self, volume: f32) -> Self {
        self.gain *= volume.clamp(0.0, 1.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::get_direction;
    use glam::Vec2;

    #[test]
    fn test_target_right_pans_right() {
        let dir = get_direction(Vec2::new(100.0, 300.0), Vec2::new(500.0, 300.0));
        let cue = EchoCue::from_direction(&dir, GameBounds::default());
        assert!((cue.pan - 1.0).abs() < 1e-6);
        assert!((cue.pitch_hz - BASE_PITCH_HZ).abs() < 1e-3);
    }

    #[test]
    fn test_target_above_raises_pitch() {
        let dir = get_direction(Vec2::new(400.0, 500.0), Vec2::new(400.0, 100.0));
        let cue = EchoCue::from_direction(&dir, GameBounds::default());
        assert!(cue.pitch_hz > BASE_PITCH_HZ);
        assert!(cue.pan.abs() < 1e-6);
    }

    #[test]
    fn test_gain_falls_with_distance() {
        let bounds = GameBounds::default();
        let near_dir = get_direction(Vec2::ZERO, Vec2::new(50.0, 0.0));
        let far_dir = get_direction(Vec2::ZERO, Vec2::new(800.0, 600.0));
        let near = EchoCue::from_direction(&near_dir, bounds);
        let far = EchoCue::from_direction(&far_dir, bounds);
        assert!(near.gain > far.gain);
        assert_eq!(far.gain, MIN_GAIN);
        assert_eq!(near.with_volume(0.0).gain, 0.0);
    }
}
