//! Hints derived from the most recent ping
//!
//! Close pings get a "very close" nudge; otherwise the hint names the
//! dominant axis toward the target. Screen y grows downward.

use serde::{Deserialize, Serialize};

use crate::consts::{HINT_CLOSE_RADIUS, HINT_THRESHOLD};
use crate::geometry::{GameBounds, Position, Target, get_direction};

/// Cardinal direction on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Heading {
    Left,
    Right,
    Up,
    Down,
}

impl Heading {
    pub fn as_str(&self) -> &'static str {
        match self {
            Heading::Left => "left",
            Heading::Right => "right",
            Heading::Up => "up",
            Heading::Down => "down",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Hint {
    /// Last ping landed within the close radius
    VeryClose { distance: f32 },
    /// Move along the dominant axis
    Direction {
        heading: Heading,
        /// Raw angle in radians for an arrow cue
        angle: f32,
        /// Distance as a fraction of the arena diagonal (0..=1)
        remoteness: f32,
    },
}

impl Hint {
    pub fn message(&self) -> String {
        match self {
            Hint::VeryClose { .. } => "You're very close!".to_string(),
            Hint::Direction { heading, .. } => format!("Try further {}", heading.as_str()),
        }
    }
}

/// Hint from the last ping position toward the live target
pub fn generate_hint(last_ping: Position, target: &Target, bounds: GameBounds) -> Hint {
    let dir = get_direction(last_ping, target.center());
    if dir.distance < HINT_CLOSE_RADIUS {
        return Hint::VeryClose {
            distance: dir.distance,
        };
    }

    let delta = target.center() - last_ping;
    let heading = if delta.x.abs() >= delta.y.abs() {
        if delta.x >= 0.0 { Heading::Right } else { Heading::Left }
    } else if delta.y >= 0.0 {
        Heading::Down
    } else {
        Heading::Up
    };

    let diagonal = bounds.diagonal();
    let remoteness = if diagonal > 0.0 {
        (dir.distance / diagonal).min(1.0)
    } else {
        1.0
    };

    Hint::Direction {
        heading,
        angle: dir.angle,
        remoteness,
    }
}

/// Hints unlock once 60% of the ping budget is spent
pub fn should_show_hint(pings_used: u32, total_pings: u32) -> bool {
    pings_used >= (total_pings as f32 * HINT_THRESHOLD).floor() as u32
}
