//! High score leaderboard system
//!
//! Tracks the top 10 round scores across the campaign.

use serde::{Deserialize, Serialize};

use crate::persistence::{self, Store, keys};
use crate::scoring::Rank;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u32,
    pub chapter: u32,
    /// Global level (0 for custom rounds)
    pub level: u32,
    pub rank: Rank,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// High score leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u32) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Add an entry if it qualifies
    /// Returns the rank achieved (1-indexed) or None if it didn't qualify
    pub fn add(&mut self, entry: HighScoreEntry) -> Option<usize> {
        if !self.qualifies(entry.score) {
            return None;
        }

        // Sorted descending; ties keep the older entry first
        let pos = self.entries.iter().position(|e| entry.score > e.score);
        let place = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);

        Some(place)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }

    pub fn load<S: Store + ?Sized>(store: &S) -> Self {
        let scores: Self = persistence::load_or_default(store, keys::HIGH_SCORES);
        log::info!("Loaded {} high scores", scores.entries.len());
        scores
    }

    pub fn save<S: Store + ?Sized>(&self, store: &mut S) {
        if persistence::save(store, keys::HIGH_SCORES, self) {
            log::debug!("High scores saved ({} entries)", self.entries.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(score: u32) -> HighScoreEntry {
        HighScoreEntry {
            score,
            chapter: 1,
            level: 1,
            rank: Rank::from_score(score),
            timestamp: 0.0,
        }
    }

    #[test]
    fn test_sorted_insert() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add(entry(500)), Some(1));
        assert_eq!(scores.add(entry(900)), Some(1));
        assert_eq!(scores.add(entry(700)), Some(2));
        let order: Vec<u32> = scores.entries.iter().map(|e| e.score).collect();
        assert_eq!(order, vec![900, 700, 500]);
        assert_eq!(scores.top_score(), Some(900));
    }

    #[test]
    fn test_zero_never_qualifies() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add(entry(0)), None);
        assert!(scores.is_empty());
    }

    #[test]
    fn test_full_board_truncates() {
        let mut scores = HighScores::new();
        for s in 1..=MAX_HIGH_SCORES as u32 {
            scores.add(entry(s * 100));
        }
        assert!(!scores.qualifies(100));
        assert_eq!(scores.add(entry(50)), None);
        assert_eq!(scores.add(entry(550)), Some(6));
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.entries.last().map(|e| e.score), Some(200));
    }
}
