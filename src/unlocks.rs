//! Cheat flags and chapter gating
//!
//! Flags are toggled by typing a code (matched case-insensitively) and stay
//! on across sessions until deactivated.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::chapters::get_chapter_from_level;
use crate::persistence::{self, Store, keys};
use crate::progress::ProgressBook;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CheatCode {
    /// Every chapter playable
    UnlockAll,
    /// Swap the run's boon any number of times
    UnlimitedSwaps,
    /// Show the real target during a round
    RevealTarget,
    /// Every boon offered regardless of chapter completion
    UnlockAllBoons,
}

impl CheatCode {
    pub const ALL: [CheatCode; 4] = [
        CheatCode::UnlockAll,
        CheatCode::UnlimitedSwaps,
        CheatCode::RevealTarget,
        CheatCode::UnlockAllBoons,
    ];

    /// The code the player types
    pub fn code(&self) -> &'static str {
        match self {
            CheatCode::UnlockAll => "UNLOCK_ALL",
            CheatCode::UnlimitedSwaps => "BOON_SWAP",
            CheatCode::RevealTarget => "SHOW_TARGET",
            CheatCode::UnlockAllBoons => "ALL_BOONS",
        }
    }

    /// Exact, case-insensitive match against the known codes
    pub fn from_code(input: &str) -> Option<Self> {
        let input = input.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(input))
    }
}

/// Active cheat flags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheatFlags {
    active: BTreeSet<CheatCode>,
}

impl CheatFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self, cheat: CheatCode) -> bool {
        self.active.contains(&cheat)
    }

    pub fn active(&self) -> impl Iterator<Item = CheatCode> + '_ {
        self.active.iter().copied()
    }

    /// Turn on the cheat named by `input`
    pub fn activate(&mut self, input: &str) -> Option<CheatCode> {
        let cheat = CheatCode::from_code(input)?;
        if self.active.insert(cheat) {
            log::info!("Cheat activated: {}", cheat.code());
        }
        Some(cheat)
    }

    /// Turn off the cheat named by `input`
    pub fn deactivate(&mut self, input: &str) -> Option<CheatCode> {
        let cheat = CheatCode::from_code(input)?;
        if self.active.remove(&cheat) {
            log::info!("Cheat deactivated: {}", cheat.code());
        }
        Some(cheat)
    }

    pub fn load<S: Store + ?Sized>(store: &S) -> Self {
        persistence::load_or_default(store, keys::CHEATS)
    }

    pub fn save<S: Store + ?Sized>(&self, store: &mut S) {
        persistence::save(store, keys::CHEATS, self);
    }
}

/// Whether `chapter` can be played
///
/// Chapter 1 always is. Any later chapter is open if UNLOCK_ALL is on, the
/// previous chapter is completed, the player already has progress in it, or
/// the save pointer already sits in it or beyond.
pub fn is_chapter_unlocked(chapter: u32, cheats: &CheatFlags, progress: &ProgressBook) -> bool {
    if chapter <= 1 {
        return true;
    }
    cheats.is_active(CheatCode::UnlockAll)
        || progress.is_completed(chapter - 1)
        || progress.has_progress(chapter)
        || get_chapter_from_level(progress.current_level()) >= chapter
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_code_matching() {
        assert_eq!(CheatCode::from_code("unlock_all"), Some(CheatCode::UnlockAll));
        assert_eq!(CheatCode::from_code("  Show_Target "), Some(CheatCode::RevealTarget));
        assert_eq!(CheatCode::from_code("UNLOCK"), None);
        assert_eq!(CheatCode::from_code("UNLOCK_ALL!"), None);
    }

    #[test]
    fn test_flags_persist_until_deactivated() {
        let mut store = MemoryStore::new();
        let mut flags = CheatFlags::new();
        assert_eq!(flags.activate("all_boons"), Some(CheatCode::UnlockAllBoons));
        flags.save(&mut store);

        let mut reloaded = CheatFlags::load(&store);
        assert!(reloaded.is_active(CheatCode::UnlockAllBoons));
        reloaded.deactivate("ALL_BOONS");
        reloaded.save(&mut store);
        assert!(!CheatFlags::load(&store).is_active(CheatCode::UnlockAllBoons));
    }

    #[test]
    fn test_unknown_code_changes_nothing() {
        let mut flags = CheatFlags::new();
        assert_eq!(flags.activate("iddqd"), None);
        assert_eq!(flags, CheatFlags::new());
    }

    #[test]
    fn test_chapter_two_waits_for_chapter_one() {
        let cheats = CheatFlags::new();
        let mut progress = ProgressBook::new();
        assert!(is_chapter_unlocked(1, &cheats, &progress));
        assert!(!is_chapter_unlocked(2, &cheats, &progress));

        for level in 1..=9 {
            progress.complete_level(level);
        }
        assert!(!is_chapter_unlocked(2, &cheats, &progress));
        progress.complete_level(10);
        assert!(progress.is_completed(1));
        assert!(is_chapter_unlocked(2, &cheats, &progress));
        assert!(!is_chapter_unlocked(3, &cheats, &progress));
    }

    #[test]
    fn test_unlock_all_opens_last_chapter() {
        let mut cheats = CheatFlags::new();
        let progress = ProgressBook::new();
        assert!(!is_chapter_unlocked(5, &cheats, &progress));
        cheats.activate("UNLOCK_ALL");
        assert!(is_chapter_unlocked(5, &cheats, &progress));
        cheats.deactivate("unlock_all");
        assert!(!is_chapter_unlocked(5, &cheats, &progress));
        cheats.activate("UNLOCK_ALL");
        assert!(is_chapter_unlocked(5, &cheats, &progress));
    }

    #[test]
    fn test_existing_progress_keeps_chapter_open() {
        let cheats = CheatFlags::new();
        let mut progress = ProgressBook::new();
        // Progress in chapter 3 (e.g. played while a cheat was on)
        progress.record_round(21, 400, 4, 30.0);
        assert_eq!(progress.current_level(), 1);
        assert!(is_chapter_unlocked(3, &cheats, &progress));
        assert!(!progress.is_completed(2));
    }

    #[test]
    fn test_save_pointer_opens_chapter() {
        let cheats = CheatFlags::new();
        let mut progress = ProgressBook::new();
        progress.advance_to(31);
        assert!(is_chapter_unlocked(4, &cheats, &progress));
        assert!(is_chapter_unlocked(2, &cheats, &progress));
        assert!(!is_chapter_unlocked(5, &cheats, &progress));
    }
}
