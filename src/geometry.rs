//! Arena geometry: target placement, phantom decoys, direction and proximity
//!
//! Positions are arena-local with the origin at the top-left corner and y
//! growing downward. A target is a circle inscribed in the square whose
//! top-left corner is `position` and whose side is `size`.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::{PHANTOM_MAX_ATTEMPTS, PROXIMITY_DAMPING, TARGET_MARGIN};

/// A 2D point in arena coordinates
pub type Position = Vec2;

/// Arena dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameBounds {
    pub width: u32,
    pub height: u32,
}

impl Default for GameBounds {
    fn default() -> Self {
        Self {
            width: crate::consts::ARENA_WIDTH,
            height: crate::consts::ARENA_HEIGHT,
        }
    }
}

impl GameBounds {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    /// Length of the arena diagonal
    pub fn diagonal(&self) -> f32 {
        self.size().length()
    }

    /// Distance at which a guess scores zero proximity
    pub fn max_proximity_distance(&self) -> f32 {
        self.diagonal() * PROXIMITY_DAMPING
    }
}

/// The real hidden target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Target {
    /// Top-left corner of the bounding square
    pub position: Position,
    /// Diameter
    pub size: f32,
}

impl Target {
    pub fn new(position: Position, size: f32) -> Self {
        Self { position, size }
    }

    /// Center of the target circle
    #[inline]
    pub fn center(&self) -> Position {
        get_target_center(self)
    }

    /// Whether a point falls inside the target circle
    pub fn contains(&self, point: Position) -> bool {
        self.center().distance(point) <= self.size / 2.0
    }
}

/// A decoy rendered exactly like the real target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhantomTarget {
    pub id: u32,
    pub target: Target,
}

impl PhantomTarget {
    /// Phantoms are never the real target
    pub const IS_REAL: bool = false;

    #[inline]
    pub fn center(&self) -> Position {
        self.target.center()
    }
}

/// Direction and distance from one point to another
///
/// This is what the audio layer consumes for panning and pitch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Direction {
    /// Angle in radians, `atan2(dy, dx)`
    pub angle: f32,
    /// Unit vector x component (0 when distance is 0)
    pub horizontal_ratio: f32,
    /// Unit vector y component (0 when distance is 0)
    pub vertical_ratio: f32,
    pub distance: f32,
}

/// Center of a target: `position + size / 2` on both axes
#[inline]
pub fn get_target_center(target: &Target) -> Position {
    target.position + Vec2::splat(target.size / 2.0)
}

/// Sample one axis of a placement range, collapsing to `margin` when the
/// arena cannot fit the target
fn sample_axis<R: Rng + ?Sized>(rng: &mut R, extent: f32, size: f32, margin: f32) -> f32 {
    let max = extent - size - margin;
    if max <= margin {
        if max < margin {
            log::warn!(
                "Degenerate arena axis: extent={} size={} margin={}",
                extent,
                size,
                margin
            );
        }
        return margin;
    }
    rng.random_range(margin..=max)
}

/// Place a target of `size` uniformly so it stays `margin` away from every edge
///
/// The caller guarantees `2 * margin + size <= bounds` on both axes; when that
/// does not hold the position collapses onto the margin.
pub fn generate_target_position<R: Rng + ?Sized>(
    rng: &mut R,
    bounds: GameBounds,
    size: f32,
    margin: f32,
) -> Target {
    let x = sample_axis(rng, bounds.width as f32, size, margin);
    let y = sample_axis(rng, bounds.height as f32, size, margin);
    Target::new(Vec2::new(x, y), size)
}

/// Place up to `count` phantoms that keep `min_distance` from the real target
/// and from each other
///
/// Each slot gets `PHANTOM_MAX_ATTEMPTS` tries; a slot that cannot be placed
/// is dropped, so the result may be shorter than `count`.
pub fn generate_phantom_targets<R: Rng + ?Sized>(
    rng: &mut R,
    bounds: GameBounds,
    real: &Target,
    count: u32,
    min_distance: f32,
) -> Vec<PhantomTarget> {
    let real_center = real.center();
    let mut phantoms: Vec<PhantomTarget> = Vec::with_capacity(count as usize);

    for slot in 0..count {
        let mut placed = None;
        for _ in 0..PHANTOM_MAX_ATTEMPTS {
            let candidate = generate_target_position(rng, bounds, real.size, TARGET_MARGIN);
            let center = candidate.center();
            let clear_of_real = center.distance(real_center) >= min_distance;
            let clear_of_others = phantoms
                .iter()
                .all(|p| center.distance(p.center()) >= min_distance);
            if clear_of_real && clear_of_others {
                placed = Some(candidate);
                break;
            }
        }

        match placed {
            Some(target) => phantoms.push(PhantomTarget {
                id: phantoms.len() as u32 + 1,
                target,
            }),
            None => log::warn!(
                "Dropped phantom slot {} after {} attempts",
                slot,
                PHANTOM_MAX_ATTEMPTS
            ),
        }
    }

    phantoms
}

/// Direction from `from` toward `to`
pub fn get_direction(from: Position, to: Position) -> Direction {
    let delta = to - from;
    let distance = delta.length();
    let (horizontal_ratio, vertical_ratio) = if distance > 0.0 {
        (delta.x / distance, delta.y / distance)
    } else {
        (0.0, 0.0)
    };
    Direction {
        angle: delta.y.atan2(delta.x),
        horizontal_ratio,
        vertical_ratio,
        distance,
    }
}

/// Proximity score 0..=100: 100 on an exact hit, 0 at or past `max_distance`
pub fn calculate_proximity(guess: Position, target: Position, max_distance: f32) -> u8 {
    let distance = guess.distance(target);
    if max_distance <= 0.0 {
        return if distance == 0.0 { 100 } else { 0 };
    }
    let raw = (100.0 - 100.0 * distance / max_distance).max(0.0);
    raw.round().min(100.0) as u8
}
