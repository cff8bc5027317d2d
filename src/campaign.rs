//! Campaign facade
//!
//! Owns the injected store and every persisted structure, and runs the
//! between-round flow: unlock checks, boon offers, starting rounds and
//! recording their results. Every write is best effort.

use rand::Rng;

use crate::boons::{self, Boon, BoonLoadout};
use crate::chapters::get_chapter_from_level;
use crate::highscores::{HighScoreEntry, HighScores};
use crate::persistence::Store;
use crate::platform;
use crate::progress::ProgressBook;
use crate::settings::Settings;
use crate::sim::{CustomConfig, RoundSetup, RoundState};
use crate::unlocks::{self, CheatCode, CheatFlags};

/// What finishing a round changed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundReport {
    pub total: u32,
    /// Cleared the rank/score bar for the next level
    pub advanced: bool,
    /// This clear completed the chapter for the first time
    pub chapter_completed: bool,
    /// Leaderboard place (1-indexed) if the score made it
    pub high_score_place: Option<usize>,
    /// Level the player continues from
    pub next_level: u32,
}

pub struct Campaign<S: Store> {
    store: S,
    pub progress: ProgressBook,
    pub cheats: CheatFlags,
    pub settings: Settings,
    pub high_scores: HighScores,
    loadout: BoonLoadout,
}

impl<S: Store> Campaign<S> {
    /// Load everything from `store`, defaulting whatever is missing or corrupt
    pub fn load(store: S) -> Self {
        Self {
            progress: ProgressBook::load(&store),
            cheats: CheatFlags::load(&store),
            settings: Settings::load(&store),
            high_scores: HighScores::load(&store),
            loadout: BoonLoadout::load(&store),
            store,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn current_level(&self) -> u32 {
        self.progress.current_level()
    }

    pub fn is_chapter_unlocked(&self, chapter: u32) -> bool {
        unlocks::is_chapter_unlocked(chapter, &self.cheats, &self.progress)
    }

    /// Type a cheat code; persisted immediately
    pub fn enter_cheat(&mut self, code: &str) -> Option<CheatCode> {
        let cheat = self.cheats.activate(code)?;
        self.cheats.save(&mut self.store);
        Some(cheat)
    }

    pub fn remove_cheat(&mut self, code: &str) -> Option<CheatCode> {
        let cheat = self.cheats.deactivate(code)?;
        self.cheats.save(&mut self.store);
        Some(cheat)
    }

    pub fn available_boons(&self) -> Vec<&'static Boon> {
        let progress = &self.progress;
        boons::available_boons(
            |chapter| progress.is_completed(chapter),
            self.cheats.is_active(CheatCode::UnlockAllBoons),
        )
    }

    /// Up to one offer per archetype, never the boon already picked
    pub fn boon_offers<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<&'static Boon> {
        boons::draw_offers(rng, &self.available_boons(), &self.loadout.active_ids())
    }

    pub fn active_boon(&self) -> Option<&str> {
        self.loadout.active()
    }

    /// Pick an available boon for the run
    pub fn choose_boon(&mut self, id: &str) -> bool {
        if !self.available_boons().iter().any(|b| b.id == id) {
            return false;
        }
        let unlimited = self.cheats.is_active(CheatCode::UnlimitedSwaps);
        if !self.loadout.choose(id, unlimited) {
            return false;
        }
        self.loadout.save(&mut self.store);
        true
    }

    /// Start a campaign round; `None` while the level's chapter is locked
    pub fn start_level(&self, level: u32, seed: u64) -> Option<RoundState> {
        let chapter = get_chapter_from_level(level);
        if !self.is_chapter_unlocked(chapter) {
            log::warn!("Chapter {} is locked", chapter);
            return None;
        }
        let setup = RoundSetup::for_level(level, &self.loadout.active_ids(), &self.settings);
        Some(RoundState::new(setup, seed))
    }

    /// Start a custom round and remember its configuration
    pub fn start_custom(&mut self, config: CustomConfig, seed: u64) -> RoundState {
        let setup = RoundSetup::from_custom(&config, &self.settings);
        self.settings.last_custom = Some(config);
        self.settings.save(&mut self.store);
        RoundState::new(setup, seed)
    }

    /// Record a submitted round
    ///
    /// `None` if it has no outcome yet or was already recorded.
    pub fn finish_round(&mut self, round: &mut RoundState) -> Option<RoundReport> {
        let outcome = round.take_unrecorded_outcome()?;
        let score = outcome.score;

        let (advanced, chapter_completed, level) = match round.setup.level {
            Some(level) => {
                self.progress.record_round(
                    level.level,
                    score.total,
                    round.session().pings_used(),
                    outcome.elapsed_seconds,
                );
                let advanced = score.can_advance(round.setup.difficulty);
                let completed = advanced && self.progress.complete_level(level.level);
                self.progress.save(&mut self.store);
                (advanced, completed, level.level)
            }
            None => (false, false, 0),
        };

        let high_score_place = self.high_scores.add(HighScoreEntry {
            score: score.total,
            chapter: round.setup.chapter,
            level,
            rank: score.rank,
            timestamp: platform::now_ms(),
        });
        if high_score_place.is_some() {
            self.high_scores.save(&mut self.store);
        }
        RoundState::clear_snapshot(&mut self.store);

        log::info!(
            "Round finished: {} points, advanced={}, next level {}",
            score.total,
            advanced,
            self.progress.current_level()
        );

        Some(RoundReport {
            total: score.total,
            advanced,
            chapter_completed,
            high_score_place,
            next_level: self.progress.current_level(),
        })
    }
}
