//! Echolocate entry point
//!
//! Natively this runs a seeded autopilot through chapter 1, guessing only
//! from what the echo cues would sound like. The web build drives the
//! library from its own host page.

#[cfg(not(target_arch = "wasm32"))]
mod autopilot {
    use glam::Vec2;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use echolocate::Campaign;
    use echolocate::chapters::chapter;
    use echolocate::echo::{BASE_PITCH_HZ, EchoCue, MIN_GAIN, PITCH_RANGE};
    use echolocate::geometry::GameBounds;
    use echolocate::sim::{GamePhase, RoundState};

    /// Attempts per level before the autopilot gives up
    const MAX_ATTEMPTS: u32 = 3;
    /// Pixel error added to each heard estimate
    const EAR_JITTER: f32 = 12.0;

    /// Where a cue heard at `from` places the source
    ///
    /// A cue at the gain floor only tells the direction, so the estimate
    /// is pushed half a diagonal out.
    fn hear(cue: &EchoCue, from: Vec2, bounds: GameBounds) -> Vec2 {
        let vertical = ((1.0 - cue.pitch_hz / BASE_PITCH_HZ) / PITCH_RANGE).clamp(-1.0, 1.0);
        let heading = Vec2::new(cue.pan, vertical).normalize_or_zero();
        let distance = if cue.gain > MIN_GAIN {
            (1.0 - cue.gain) * bounds.diagonal()
        } else {
            bounds.diagonal() * 0.5
        };
        (from + heading * distance).clamp(Vec2::ZERO, bounds.size())
    }

    /// Ping from the arena center, then from each estimate, and guess
    fn play_round<R: Rng>(round: &mut RoundState, rng: &mut R) -> Option<f32> {
        let bounds = round.setup.bounds;
        let mut listen_from = bounds.size() * 0.5;
        let mut estimate = listen_from;
        let mut clock = 0.0_f64;

        while round.session().has_pings() {
            let outcome = round.ping(listen_from, clock * 1000.0)?;
            let cue = EchoCue::from_direction(&outcome.echo, bounds);
            log::debug!(
                "Ping {} at ({:.0}, {:.0}): pan {:.2} gain {:.2} pitch {:.0}Hz",
                outcome.index,
                listen_from.x,
                listen_from.y,
                cue.pan,
                cue.gain,
                cue.pitch_hz
            );
            let jitter = Vec2::new(
                rng.random_range(-EAR_JITTER..=EAR_JITTER),
                rng.random_range(-EAR_JITTER..=EAR_JITTER),
            );
            estimate = hear(&cue, listen_from, bounds) + jitter;
            clock += 2.5;

            // Two pings are enough to settle on a still target
            if outcome.index >= 1 && estimate.distance(listen_from) < 40.0 {
                break;
            }
            listen_from = estimate;
        }

        if round.phase() == GamePhase::Pinging {
            round.place_final_guess();
        }
        round.click(estimate);
        let elapsed = clock as f32 + 3.0;
        round.submit(elapsed)?;
        Some(elapsed)
    }

    pub fn run(seed: u64) {
        let mut campaign = Campaign::load(echolocate::platform::default_store());
        let mut rng = Pcg32::seed_from_u64(seed);
        let config = chapter(1);
        log::info!("Autopilot: chapter {} \"{}\", seed {}", config.id, config.name, seed);

        let first = config.first_level();
        for level in first..first + echolocate::consts::LEVELS_PER_CHAPTER {
            let mut cleared = false;
            for attempt in 1..=MAX_ATTEMPTS {
                let round_seed = seed.wrapping_add(u64::from(level) * 31 + u64::from(attempt));
                let Some(mut round) = campaign.start_level(level, round_seed) else {
                    log::error!("Level {} is locked", level);
                    return;
                };
                if play_round(&mut round, &mut rng).is_none() {
                    log::warn!("Level {} attempt {} ended without a guess", level, attempt);
                    continue;
                }
                let Some(report) = campaign.finish_round(&mut round) else {
                    continue;
                };
                let rank = round.outcome.map(|o| o.score.rank.as_str()).unwrap_or("-");
                println!(
                    "level {:>2} attempt {}: {:>5} points, rank {}{}",
                    level,
                    attempt,
                    report.total,
                    rank,
                    if report.advanced { "" } else { " (retry)" }
                );
                if report.advanced {
                    cleared = true;
                    break;
                }
            }
            if !cleared {
                println!("Autopilot stalled on level {}", level);
                break;
            }
        }

        let stats = campaign.progress.stats(config.id);
        println!(
            "\nChapter {}: {} levels cleared, best {}, average {:.0} over {} rounds",
            config.id,
            stats.levels_completed,
            stats.best_score,
            stats.avg_score,
            stats.rounds_played
        );
        println!("Chapter 2 unlocked: {}", campaign.is_chapter_unlocked(2));
        println!("\nHigh scores:");
        for (i, entry) in campaign.high_scores.entries.iter().enumerate() {
            println!(
                "{:>2}. {:>5}  chapter {} level {:>2}  {}",
                i + 1,
                entry.score,
                entry.chapter,
                entry.level,
                entry.rank.as_str()
            );
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    echolocate::platform::init_logging();
    log::info!("Echolocate (native) starting...");

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<u64>().ok())
        .unwrap_or_else(|| echolocate::platform::now_ms() as u64);
    autopilot::run(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The host page calls into the library directly
}
