//! Turn phases of a round
//!
//! `Pinging` -> `Placing` -> `Confirming`, with `Confirming -> Placing`
//! (reposition) and `Placing -> Pinging` (only while pings remain). Illegal
//! requests are ignored and reported as `false`; nothing here panics.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Current turn phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    /// Emitting pings
    #[default]
    Pinging,
    /// Waiting for the player to click the final guess
    Placing,
    /// A guess is on the board, awaiting submit or reposition
    Confirming,
}

/// Phase plus the pending final guess
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseMachine {
    phase: GamePhase,
    final_guess: Option<Vec2>,
}

impl PhaseMachine {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Pending guess (set only while confirming)
    #[inline]
    pub fn final_guess(&self) -> Option<Vec2> {
        self.final_guess
    }

    /// "Place final guess": enter placing from pinging (no-op if already placing)
    pub fn place_final_guess(&mut self) -> bool {
        match self.phase {
            GamePhase::Pinging => {
                self.phase = GamePhase::Placing;
                self.final_guess = None;
                true
            }
            GamePhase::Placing => true,
            GamePhase::Confirming => false,
        }
    }

    /// Canvas click while placing sets the guess and auto-advances to confirming
    pub fn click(&mut self, pos: Vec2) -> bool {
        if self.phase != GamePhase::Placing {
            return false;
        }
        self.final_guess = Some(pos);
        self.phase = GamePhase::Confirming;
        true
    }

    /// Discard the pending guess and return to placing
    pub fn reposition(&mut self) -> bool {
        if self.phase != GamePhase::Confirming {
            return false;
        }
        self.final_guess = None;
        self.phase = GamePhase::Placing;
        true
    }

    /// Leave placing to ping again, only while pings remain
    pub fn back_to_pinging(&mut self, pings_remain: bool) -> bool {
        if self.phase != GamePhase::Placing || !pings_remain {
            return false;
        }
        self.phase = GamePhase::Pinging;
        true
    }

    /// The guess ready for scoring, if the player is confirming
    pub fn confirmed_guess(&self) -> Option<Vec2> {
        match self.phase {
            GamePhase::Confirming => self.final_guess,
            _ => None,
        }
    }

    /// Back to pinging with no guess; call on every round restart/advance
    pub fn reset(&mut self) {
        self.phase = GamePhase::Pinging;
        self.final_guess = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_then_click_confirms() {
        let mut pm = PhaseMachine::new();
        assert_eq!(pm.phase(), GamePhase::Pinging);
        assert!(pm.place_final_guess());
        assert_eq!(pm.phase(), GamePhase::Placing);
        assert!(pm.click(Vec2::new(120.0, 80.0)));
        assert_eq!(pm.phase(), GamePhase::Confirming);
        assert_eq!(pm.final_guess(), Some(Vec2::new(120.0, 80.0)));
        assert_eq!(pm.confirmed_guess(), Some(Vec2::new(120.0, 80.0)));
    }

    #[test]
    fn test_reposition_clears_guess() {
        let mut pm = PhaseMachine::new();
        pm.place_final_guess();
        pm.click(Vec2::new(1.0, 2.0));
        assert!(pm.reposition());
        assert_eq!(pm.phase(), GamePhase::Placing);
        assert_eq!(pm.final_guess(), None);
        assert_eq!(pm.confirmed_guess(), None);
    }

    #[test]
    fn test_click_ignored_while_pinging() {
        let mut pm = PhaseMachine::new();
        assert!(!pm.click(Vec2::new(5.0, 5.0)));
        assert_eq!(pm.phase(), GamePhase::Pinging);
        assert_eq!(pm.final_guess(), None);
        assert!(!pm.reposition());
    }

    #[test]
    fn test_back_to_pinging_needs_budget() {
        let mut pm = PhaseMachine::new();
        pm.place_final_guess();
        assert!(!pm.back_to_pinging(false));
        assert_eq!(pm.phase(), GamePhase::Placing);
        assert!(pm.back_to_pinging(true));
        assert_eq!(pm.phase(), GamePhase::Pinging);
    }

    #[test]
    fn test_reset_clears_stale_guess() {
        let mut pm = PhaseMachine::new();
        pm.place_final_guess();
        pm.click(Vec2::new(9.0, 9.0));
        pm.reset();
        assert_eq!(pm, PhaseMachine::new());
    }
}
