#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Run lifecycle system deciding what happens after a level ends.

use std::fmt;

use yogo_core::{Command, Event, OBJECTIVE_MESSAGE};

/// Configuration parameters required to construct the lifecycle system.
#[derive(Clone, Copy, Debug, Default)]
pub struct Config {
    endless: bool,
}

impl Config {
    /// Creates a new configuration.
    ///
    /// With `endless` set, fatal deaths regenerate the level without asking
    /// the process to exit.
    #[must_use]
    pub const fn new(endless: bool) -> Self {
        Self { endless }
    }
}

/// Line the lifecycle wants shown to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Announcement {
    /// Flavour text describing a level transition.
    Message(&'static str),
    /// Score held after a transition that did not end the process.
    Score(u64),
}

impl fmt::Display for Announcement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message(message) => f.write_str(message),
            Self::Score(score) => write!(f, "Score: {score}"),
        }
    }
}

/// Pure system that reacts to level endings by requesting the next level.
#[derive(Debug)]
pub struct Lifecycle {
    endless: bool,
    exit_requested: bool,
    announcements: Vec<Announcement>,
}

impl Lifecycle {
    /// Creates a new lifecycle system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            endless: config.endless,
            exit_requested: false,
            announcements: Vec::new(),
        }
    }

    /// Consumes world events and emits the commands that start the next level.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::RunEnded { cause, score } => {
                    self.announcements.push(Announcement::Message(cause.message()));
                    if cause.is_fatal() && !self.endless {
                        log::info!("fatal {cause:?}, exit requested");
                        self.exit_requested = true;
                    } else {
                        self.announcements.push(Announcement::Score(*score));
                    }
                    out.push(Command::AdvanceLevel);
                }
                Event::ObjectiveReached { .. } => {
                    self.announcements.push(Announcement::Message(OBJECTIVE_MESSAGE));
                    out.push(Command::AdvanceLevel);
                }
                _ => {}
            }
        }
    }

    /// Reports whether a fatal death asked the process to stop.
    #[must_use]
    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    /// Removes and returns the announcements gathered since the last drain.
    pub fn drain_announcements(&mut self) -> Vec<Announcement> {
        std::mem::take(&mut self.announcements)
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
