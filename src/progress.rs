//! Persisted per-chapter statistics and the campaign save pointer

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::chapters::{TOTAL_CHAPTERS, get_chapter_from_level, level_in_chapter};
use crate::consts::LEVELS_PER_CHAPTER;
use crate::persistence::{self, Store, keys};

/// Progress through one chapter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChapterStats {
    /// Highest level (1..=10) cleared; never decreases
    pub levels_completed: u32,
    pub best_score: u32,
    pub avg_score: f32,
    pub total_pings: u32,
    /// Seconds spent across all rounds
    pub total_time: f32,
    pub rounds_played: u32,
    pub completed: bool,
}

impl ChapterStats {
    fn record_round(&mut self, score: u32, pings_used: u32, elapsed_seconds: f32) {
        let played = self.rounds_played as f32;
        self.avg_score = (self.avg_score * played + score as f32) / (played + 1.0);
        self.rounds_played += 1;
        self.best_score = self.best_score.max(score);
        self.total_pings += pings_used;
        self.total_time += elapsed_seconds.max(0.0);
    }

    fn complete(&mut self, level_in_chapter: u32) {
        self.levels_completed = self.levels_completed.max(level_in_chapter);
        self.completed = self.levels_completed >= LEVELS_PER_CHAPTER;
    }
}

/// All chapter stats plus the level the player would continue from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressBook {
    chapters: BTreeMap<u32, ChapterStats>,
    current_level: u32,
}

impl Default for ProgressBook {
    fn default() -> Self {
        Self {
            chapters: BTreeMap::new(),
            current_level: 1,
        }
    }
}

impl ProgressBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stats for `chapter` (empty stats if never played)
    pub fn stats(&self, chapter: u32) -> ChapterStats {
        self.chapters.get(&chapter).cloned().unwrap_or_default()
    }

    pub fn is_completed(&self, chapter: u32) -> bool {
        self.chapters.get(&chapter).is_some_and(|s| s.completed)
    }

    /// Any round played or level cleared in `chapter`
    pub fn has_progress(&self, chapter: u32) -> bool {
        self.chapters
            .get(&chapter)
            .is_some_and(|s| s.rounds_played > 0 || s.levels_completed > 0)
    }

    /// Global level the save pointer sits on
    pub fn current_level(&self) -> u32 {
        self.current_level.max(1)
    }

    /// Move the save pointer forward (never backward)
    pub fn advance_to(&mut self, level: u32) {
        let last = TOTAL_CHAPTERS * LEVELS_PER_CHAPTER;
        self.current_level = self.current_level.max(level.min(last));
    }

    /// Fold one finished round into its chapter's stats
    pub fn record_round(&mut self, level: u32, score: u32, pings_used: u32, elapsed_seconds: f32) {
        let chapter = get_chapter_from_level(level);
        self.chapters
            .entry(chapter)
            .or_default()
            .record_round(score, pings_used, elapsed_seconds);
    }

    /// Mark `level` cleared and move the save pointer past it
    ///
    /// Returns true when this clear finished the chapter for the first time.
    pub fn complete_level(&mut self, level: u32) -> bool {
        let chapter = get_chapter_from_level(level);
        let stats = self.chapters.entry(chapter).or_default();
        let was_completed = stats.completed;
        stats.complete(level_in_chapter(level));
        let newly_completed = stats.completed && !was_completed;
        if newly_completed {
            log::info!("Chapter {} completed", chapter);
        }
        self.advance_to(level + 1);
        newly_completed
    }

    pub fn load<S: Store + ?Sized>(store: &S) -> Self {
        persistence::load_or_default(store, keys::PROGRESS)
    }

    pub fn save<S: Store + ?Sized>(&self, store: &mut S) {
        persistence::save(store, keys::PROGRESS, self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_record_round_stats() {
        let mut book = ProgressBook::new();
        book.record_round(3, 600, 4, 12.0);
        book.record_round(4, 400, 5, 8.0);
        let s = book.stats(1);
        assert_eq!(s.rounds_played, 2);
        assert_eq!(s.best_score, 600);
        assert_eq!(s.avg_score, 500.0);
        assert_eq!(s.total_pings, 9);
        assert_eq!(s.total_time, 20.0);
        assert_eq!(s.levels_completed, 0);
        assert!(book.has_progress(1));
        assert!(!book.has_progress(2));
    }

    #[test]
    fn test_levels_completed_is_monotonic() {
        let mut book = ProgressBook::new();
        book.complete_level(5);
        book.complete_level(2);
        assert_eq!(book.stats(1).levels_completed, 5);
        assert_eq!(book.current_level(), 6);
    }

    #[test]
    fn test_chapter_completion_reported_once() {
        let mut book = ProgressBook::new();
        assert!(!book.complete_level(9));
        assert!(book.complete_level(10));
        assert!(!book.complete_level(10));
        assert!(book.is_completed(1));
        assert_eq!(book.current_level(), 11);
    }

    #[test]
    fn test_pointer_clamps_to_last_level() {
        let mut book = ProgressBook::new();
        book.complete_level(50);
        assert_eq!(book.current_level(), 50);
        assert!(book.is_completed(5));
    }

    #[test]
    fn test_persist_round_trip() {
        let mut store = MemoryStore::new();
        let mut book = ProgressBook::new();
        book.record_round(12, 700, 3, 9.5);
        book.complete_level(12);
        book.save(&mut store);
        assert_eq!(ProgressBook::load(&store), book);
    }

    #[test]
    fn test_corrupt_save_starts_fresh() {
        let mut store = MemoryStore::new();
        store.insert(keys::PROGRESS, "[1,2,3]");
        assert_eq!(ProgressBook::load(&store), ProgressBook::new());
    }
}
