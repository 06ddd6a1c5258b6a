#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting enemy spawn commands.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use yogo_core::{Command, Direction, Event, RunPhase, SpawnOffset};

/// Smallest distance along each axis between the player and a fresh enemy.
const MIN_SPAWN_DISTANCE: i32 = 4;
/// Largest distance along each axis between the player and a fresh enemy.
const MAX_SPAWN_DISTANCE: i32 = 9;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    cadence_ticks: u64,
    rng_salt: u64,
}

impl Config {
    /// Creates a new configuration spawning once every `cadence_ticks` ticks.
    ///
    /// `rng_salt` is mixed into each level seed so the spawn stream is
    /// independent from the level generator's stream.
    #[must_use]
    pub const fn new(cadence_ticks: u64, rng_salt: u64) -> Self {
        Self {
            cadence_ticks,
            rng_salt,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(2, 0x9e37_79b9_7f4a_7c15)
    }
}

/// Pure system that deterministically emits spawn commands while a level is played.
#[derive(Debug)]
pub struct Spawning {
    cadence_ticks: u64,
    rng_salt: u64,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            cadence_ticks: config.cadence_ticks,
            rng_salt: config.rng_salt,
            rng: ChaCha8Rng::seed_from_u64(config.rng_salt),
        }
    }

    /// Consumes events and the upcoming tick index to emit spawn commands.
    ///
    /// A level start reseeds the spawn stream from the level seed, so a level
    /// replays identically regardless of what happened before it.
    pub fn handle(
        &mut self,
        events: &[Event],
        phase: RunPhase,
        upcoming_tick: u64,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            if let Event::LevelStarted { seed, .. } = event {
                self.rng = ChaCha8Rng::seed_from_u64(u64::from(seed.get()) ^ self.rng_salt);
            }
        }

        if phase != RunPhase::Playing || self.cadence_ticks == 0 {
            return;
        }

        if upcoming_tick % self.cadence_ticks == 0 {
            let offset = SpawnOffset {
                dx: self.next_distance(),
                dy: self.next_distance(),
            };
            let direction = Direction::from_index(self.rng.gen_range(0..4));
            out.push(Command::SpawnEnemy { offset, direction });
        }
    }

    fn next_distance(&mut self) -> i32 {
        let magnitude = self.rng.gen_range(MIN_SPAWN_DISTANCE..=MAX_SPAWN_DISTANCE);
        if self.rng.gen_bool(0.5) {
            magnitude
        } else {
            -magnitude
        }
    }
}
