#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for dropping items onto the belt.

use std::time::Duration;

use log::debug;
use lost_and_found_core::{Command, Difficulty, Event, ItemSource, SessionState};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug, Default)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided seed for drop periods.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }
}

/// Pure system that emits one spawn command whenever the drop timer expires.
#[derive(Debug)]
pub struct Spawning {
    rng: ChaCha8Rng,
    elapsed: Duration,
    next_drop: Option<Duration>,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            elapsed: Duration::ZERO,
            next_drop: None,
        }
    }

    /// Simulated time at which the next item drops, once scheduled.
    #[must_use]
    pub fn next_drop(&self) -> Option<Duration> {
        self.next_drop
    }

    /// Forgets the drop timer so the next observed tick schedules a fresh one.
    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
        self.next_drop = None;
    }

    /// Consumes events and draws the next item from `source` when the timer
    /// expires.
    pub fn handle(
        &mut self,
        events: &[Event],
        state: SessionState,
        difficulty: &Difficulty,
        source: &mut impl ItemSource,
        out: &mut Vec<Command>,
    ) {
        if !matches!(state, SessionState::StartScreen | SessionState::Game) {
            return;
        }

        let mut advanced = false;
        for event in events {
            if let Event::TimeAdvanced { dt, .. } = event {
                self.elapsed = self.elapsed.saturating_add(*dt);
                advanced = true;
            }
        }
        if !advanced {
            return;
        }

        let Some(next_drop) = self.next_drop else {
            self.next_drop = Some(self.schedule(difficulty));
            return;
        };

        if self.elapsed >= next_drop {
            let kind = source.next_spawn_item();
            debug!("dropping {kind:?} at {:?}", self.elapsed);
            out.push(Command::SpawnItem { kind });
            self.next_drop = Some(self.schedule(difficulty));
        }
    }

    fn schedule(&mut self, difficulty: &Difficulty) -> Duration {
        let min = difficulty.scaled_min_drop_period();
        let max = difficulty.scaled_max_drop_period();
        let period = if min < max && max.is_finite() {
            self.rng.gen_range(min..=max)
        } else {
            min
        };
        let period = Duration::try_from_secs_f32(period.max(0.0)).unwrap_or(Duration::MAX);
        self.elapsed.saturating_add(period)
    }
}
