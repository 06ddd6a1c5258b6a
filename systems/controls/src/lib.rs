#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Input translation system that turns sampled devices into world commands.
//!
//! Held keys become [`PlayerIntent`] flags, relative mouse motion feeds a
//! clamped virtual cursor that defines the aim, and firing is rate limited by
//! the tick index so the fire rate does not depend on the frame rate.

use glam::Vec2;
use yogo_core::{Command, PlayerIntent};

/// Input devices sampled for a single simulation step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputSample {
    /// Held movement and zoom intents.
    pub intent: PlayerIntent,
    /// Whether the fire key is held.
    pub fire_key: bool,
    /// Whether the fire mouse button is held.
    pub fire_button: bool,
    /// Cursor motion in pixels since the previous sample.
    pub cursor_delta: Vec2,
    /// Vertical scroll wheel offset.
    pub wheel: f32,
    /// Whether a new level was requested.
    pub abandon: bool,
}

impl InputSample {
    /// Copy of the sample that keeps only held state.
    ///
    /// Used for the extra simulation steps of a frame so that one-shot inputs
    /// apply once.
    #[must_use]
    pub fn held_only(&self) -> Self {
        Self {
            intent: self.intent,
            fire_key: self.fire_key,
            fire_button: self.fire_button,
            ..Self::default()
        }
    }
}

/// Configuration parameters required to construct the controls system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    key_fire_cadence: u64,
    button_fire_cadence: u64,
    cursor_limit: f32,
}

impl Config {
    /// Creates a configuration with fire cadences expressed in ticks and the
    /// half extent of the virtual cursor.
    #[must_use]
    pub const fn new(key_fire_cadence: u64, button_fire_cadence: u64, cursor_limit: f32) -> Self {
        Self {
            key_fire_cadence,
            button_fire_cadence,
            cursor_limit,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(5, 4, 100.0)
    }
}

/// Pure system that converts input samples into commands.
#[derive(Debug)]
pub struct Controls {
    config: Config,
    cursor: Vec2,
}

impl Controls {
    /// Creates a new controls system with a centred virtual cursor.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            cursor: Vec2::ZERO,
        }
    }

    /// Position of the virtual cursor relative to the player.
    #[must_use]
    pub fn cursor(&self) -> Vec2 {
        self.cursor
    }

    /// Aim heading in degrees derived from the virtual cursor.
    #[must_use]
    pub fn heading(&self) -> f32 {
        -self.cursor.y.atan2(self.cursor.x).to_degrees()
    }

    /// Translates the sample into commands for the tick about to run.
    pub fn handle(&mut self, sample: &InputSample, upcoming_tick: u64, out: &mut Vec<Command>) {
        let limit = self.config.cursor_limit;
        self.cursor =
            (self.cursor + sample.cursor_delta).clamp(Vec2::splat(-limit), Vec2::splat(limit));

        out.push(Command::SetIntent {
            intent: sample.intent,
        });
        out.push(Command::Aim {
            heading: self.heading(),
        });

        if sample.fire_key && is_due(upcoming_tick, self.config.key_fire_cadence) {
            out.push(Command::Fire);
        }
        if sample.fire_button && is_due(upcoming_tick, self.config.button_fire_cadence) {
            out.push(Command::Fire);
        }
        if sample.wheel != 0.0 {
            out.push(Command::ScrollZoom {
                offset: sample.wheel,
            });
        }
        if sample.abandon {
            out.push(Command::AbandonLevel);
        }
    }
}

impl Default for Controls {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

fn is_due(tick: u64, cadence: u64) -> bool {
    cadence != 0 && tick % cadence == 0
}
