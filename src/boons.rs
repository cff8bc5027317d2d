//! Boon cards and effect composition
//!
//! A boon carries a sparse effect. Active boons fold into a fixed-shape
//! accumulator whose identities are 0 (additive), 1 (multiplicative) and
//! false (flags), so the derived configuration does not depend on order.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::persistence::{self, Store, keys};
use crate::sim::{PingBudget, ReplayBudget};

/// Offer category; at most one boon per archetype is offered at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    Precision,
    Efficiency,
    Adaptability,
}

impl Archetype {
    pub const ALL: [Archetype; 3] = [
        Archetype::Precision,
        Archetype::Efficiency,
        Archetype::Adaptability,
    ];
}

/// Sparse set of effect deltas
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoonEffect {
    pub extra_pings: Option<i32>,
    pub extra_replays: Option<i32>,
    pub proximity_multiplier: Option<f32>,
    pub radius_multiplier: Option<f32>,
    pub time_penalty_multiplier: Option<f32>,
    pub phantom_visibility: Option<bool>,
    pub show_trail: Option<bool>,
}

impl BoonEffect {
    const NONE: Self = Self {
        extra_pings: None,
        extra_replays: None,
        proximity_multiplier: None,
        radius_multiplier: None,
        time_penalty_multiplier: None,
        phantom_visibility: None,
        show_trail: None,
    };
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boon {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub archetype: Archetype,
    /// Chapter that must be fully completed before this boon is offered
    pub unlock_chapter: u32,
    pub effect: BoonEffect,
}

pub const BOONS: [Boon; 9] = [
    Boon {
        id: "echo_lens",
        name: "Echo Lens",
        description: "Proximity counts for 10% more",
        archetype: Archetype::Precision,
        unlock_chapter: 1,
        effect: BoonEffect {
            proximity_multiplier: Some(1.1),
            ..BoonEffect::NONE
        },
    },
    Boon {
        id: "wide_aperture",
        name: "Wide Aperture",
        description: "Targets are 20% larger",
        archetype: Archetype::Precision,
        unlock_chapter: 2,
        effect: BoonEffect {
            radius_multiplier: Some(1.2),
            ..BoonEffect::NONE
        },
    },
    Boon {
        id: "ghost_sight",
        name: "Ghost Sight",
        description: "Phantom targets are marked",
        archetype: Archetype::Precision,
        unlock_chapter: 4,
        effect: BoonEffect {
            phantom_visibility: Some(true),
            ..BoonEffect::NONE
        },
    },
    Boon {
        id: "extra_ping",
        name: "Extra Ping",
        description: "One more ping every level",
        archetype: Archetype::Efficiency,
        unlock_chapter: 1,
        effect: BoonEffect {
            extra_pings: Some(1),
            ..BoonEffect::NONE
        },
    },
    Boon {
        id: "second_listen",
        name: "Second Listen",
        description: "Two more replays every level",
        archetype: Archetype::Efficiency,
        unlock_chapter: 2,
        effect: BoonEffect {
            extra_replays: Some(2),
            ..BoonEffect::NONE
        },
    },
    Boon {
        id: "steady_clock",
        name: "Steady Clock",
        description: "Time penalty halved",
        archetype: Archetype::Efficiency,
        unlock_chapter: 3,
        effect: BoonEffect {
            time_penalty_multiplier: Some(0.5),
            ..BoonEffect::NONE
        },
    },
    Boon {
        id: "breadcrumbs",
        name: "Breadcrumbs",
        description: "Previous pings leave a trail",
        archetype: Archetype::Adaptability,
        unlock_chapter: 1,
        effect: BoonEffect {
            show_trail: Some(true),
            ..BoonEffect::NONE
        },
    },
    Boon {
        id: "deep_reserve",
        name: "Deep Reserve",
        description: "Two more pings, proximity counts 10% less",
        archetype: Archetype::Adaptability,
        unlock_chapter: 3,
        effect: BoonEffect {
            extra_pings: Some(2),
            proximity_multiplier: Some(0.9),
            ..BoonEffect::NONE
        },
    },
    Boon {
        id: "calm_mind",
        name: "Calm Mind",
        description: "One more replay and a gentler clock",
        archetype: Archetype::Adaptability,
        unlock_chapter: 4,
        effect: BoonEffect {
            extra_replays: Some(1),
            time_penalty_multiplier: Some(0.75),
            ..BoonEffect::NONE
        },
    },
];

/// Look up a boon by id
pub fn boon(id: &str) -> Option<&'static Boon> {
    BOONS.iter().find(|b| b.id == id)
}

/// Round configuration after folding in active boons
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedEffects {
    pub pings: PingBudget,
    pub replays: ReplayBudget,
    pub proximity_multiplier: f32,
    pub radius_multiplier: f32,
    pub time_penalty_multiplier: f32,
    pub phantom_visibility: bool,
    pub show_trail: bool,
}

impl DerivedEffects {
    /// No boons applied
    pub fn identity(pings: PingBudget, replays: ReplayBudget) -> Self {
        apply_boon_effects(pings, replays, &[] as &[&str])
    }
}

#[derive(Debug, Clone, Copy)]
struct Accumulator {
    extra_pings: i32,
    extra_replays: i32,
    proximity: f32,
    radius: f32,
    time_penalty: f32,
    phantom_visibility: bool,
    show_trail: bool,
}

impl Accumulator {
    const IDENTITY: Self = Self {
        extra_pings: 0,
        extra_replays: 0,
        proximity: 1.0,
        radius: 1.0,
        time_penalty: 1.0,
        phantom_visibility: false,
        show_trail: false,
    };

    fn fold(mut self, effect: &BoonEffect) -> Self {
        self.extra_pings += effect.extra_pings.unwrap_or(0);
        self.extra_replays += effect.extra_replays.unwrap_or(0);
        self.proximity *= effect.proximity_multiplier.unwrap_or(1.0);
        self.radius *= effect.radius_multiplier.unwrap_or(1.0);
        self.time_penalty *= effect.time_penalty_multiplier.unwrap_or(1.0);
        self.phantom_visibility |= effect.phantom_visibility.unwrap_or(false);
        self.show_trail |= effect.show_trail.unwrap_or(false);
        self
    }
}

/// `base + delta`, saturating into `floor..=u32::MAX`
fn offset_budget(base: u32, delta: i32, floor: u32) -> u32 {
    (i64::from(base) + i64::from(delta)).clamp(i64::from(floor), i64::from(u32::MAX)) as u32
}

/// Fold `active` boon ids over the base budgets
///
/// Pings floor at 1 and finite replays at 0. Unlimited budgets ignore
/// additive deltas and disabled replays stay disabled. Unknown ids are skipped.
pub fn apply_boon_effects<S: AsRef<str>>(
    base_pings: PingBudget,
    base_replays: ReplayBudget,
    active: &[S],
) -> DerivedEffects {
    let acc = active
        .iter()
        .filter_map(|id| {
            let found = boon(id.as_ref());
            if found.is_none() {
                log::warn!("Ignoring unknown boon id {:?}", id.as_ref());
            }
            found
        })
        .fold(Accumulator::IDENTITY, |acc, b| acc.fold(&b.effect));

    let pings = match base_pings {
        PingBudget::Limited(n) => PingBudget::Limited(offset_budget(n, acc.extra_pings, 1)),
        PingBudget::Unlimited => PingBudget::Unlimited,
    };
    let replays = match base_replays {
        ReplayBudget::Limited(n) => ReplayBudget::Limited(offset_budget(n, acc.extra_replays, 0)),
        other => other,
    };

    DerivedEffects {
        pings,
        replays,
        proximity_multiplier: acc.proximity,
        radius_multiplier: acc.radius,
        time_penalty_multiplier: acc.time_penalty,
        phantom_visibility: acc.phantom_visibility,
        show_trail: acc.show_trail,
    }
}

/// Boons that may be offered: unlock chapter completed, or the override is on
pub fn available_boons<F>(chapter_completed: F, unlock_all: bool) -> Vec<&'static Boon>
where
    F: Fn(u32) -> bool,
{
    BOONS
        .iter()
        .filter(|b| unlock_all || chapter_completed(b.unlock_chapter))
        .collect()
}

/// Draw at most one offer per archetype, skipping boons already active
pub fn draw_offers<R, S>(
    rng: &mut R,
    available: &[&'static Boon],
    active: &[S],
) -> Vec<&'static Boon>
where
    R: Rng + ?Sized,
    S: AsRef<str>,
{
    Archetype::ALL
        .iter()
        .filter_map(|&archetype| {
            let candidates: Vec<&'static Boon> = available
                .iter()
                .copied()
                .filter(|b| b.archetype == archetype)
                .filter(|b| !active.iter().any(|a| a.as_ref() == b.id))
                .collect();
            candidates.choose(&mut *rng).copied()
        })
        .collect()
}

/// Free boon changes per run before the swap cheat is needed
pub const FREE_SWAPS: u32 = 1;

/// The run's boon pick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoonLoadout {
    active: Option<String>,
    swaps_used: u32,
}

impl BoonLoadout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore the saved pick and swap count
    ///
    /// A pick whose id no longer exists is cleared; the swap count is kept.
    pub fn load<S: Store + ?Sized>(store: &S) -> Self {
        let mut loadout: Self = persistence::load_or_default(store, keys::BOON_LOADOUT);
        if let Some(id) = loadout.active.take() {
            match boon(&id) {
                Some(b) => loadout.active = Some(b.id.to_string()),
                None => log::warn!("Saved boon {:?} no longer exists, clearing", id),
            }
        }
        loadout
    }

    pub fn save<S: Store + ?Sized>(&self, store: &mut S) {
        persistence::save(store, keys::BOON_LOADOUT, self);
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Active ids in the form `apply_boon_effects` takes
    pub fn active_ids(&self) -> Vec<&str> {
        self.active.as_deref().into_iter().collect()
    }

    pub fn swaps_used(&self) -> u32 {
        self.swaps_used
    }

    pub fn can_swap(&self, unlimited_swaps: bool) -> bool {
        self.active.is_none() || unlimited_swaps || self.swaps_used < FREE_SWAPS
    }

    /// Pick `id`; replacing an existing pick counts as a swap
    pub fn choose(&mut self, id: &str, unlimited_swaps: bool) -> bool {
        let Some(b) = boon(id) else {
            return false;
        };
        if self.active.as_deref() == Some(b.id) {
            return true;
        }
        if !self.can_swap(unlimited_swaps) {
            return false;
        }
        if self.active.is_some() {
            self.swaps_used += 1;
        }
        log::info!("Boon selected: {}", b.name);
        self.active = Some(b.id.to_string());
        true
    }
}
