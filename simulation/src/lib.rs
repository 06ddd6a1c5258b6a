#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-timestep driver wiring the world and its systems together.
//!
//! Every step runs the systems in a stable order: controls translate the
//! sampled input, spawning reacts to the previous step's events, the world
//! ticks once, and the lifecycle system follows up on whatever ended. Given
//! the same seed and the same inputs at the same tick indices, two
//! simulations therefore evolve identically.

use std::time::Duration;

use yogo_core::{Command, Event, LevelSeed};
use yogo_system_controls::Controls;
use yogo_system_lifecycle::{Announcement, Lifecycle};
use yogo_system_spawning::Spawning;
use yogo_world::{query, World};

pub use yogo_system_controls::InputSample;

/// Simulated time covered by a single step.
pub const SIM_DT: Duration = Duration::from_nanos(16_666_667);

/// Largest number of steps run for a single rendered frame.
pub const MAX_SUBSTEPS: u32 = 8;

/// Longest frame time accepted before clamping.
pub const MAX_FRAME_TIME: Duration = Duration::from_millis(250);

/// Configuration parameters required to construct the simulation.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    step: Duration,
    max_substeps: u32,
    max_frame_time: Duration,
    spawning: yogo_system_spawning::Config,
    controls: yogo_system_controls::Config,
    lifecycle: yogo_system_lifecycle::Config,
}

impl Config {
    /// Creates a configuration stepping the world by `step` with default system tuning.
    #[must_use]
    pub fn new(step: Duration) -> Self {
        Self {
            step,
            max_substeps: MAX_SUBSTEPS,
            max_frame_time: MAX_FRAME_TIME,
            spawning: yogo_system_spawning::Config::default(),
            controls: yogo_system_controls::Config::default(),
            lifecycle: yogo_system_lifecycle::Config::default(),
        }
    }

    /// Limits how many steps a single frame may run and how much frame time is accepted.
    #[must_use]
    pub fn with_frame_budget(mut self, max_substeps: u32, max_frame_time: Duration) -> Self {
        self.max_substeps = max_substeps;
        self.max_frame_time = max_frame_time;
        self
    }

    /// Overrides the spawning system configuration.
    #[must_use]
    pub fn with_spawning(mut self, spawning: yogo_system_spawning::Config) -> Self {
        self.spawning = spawning;
        self
    }

    /// Overrides the controls system configuration.
    #[must_use]
    pub fn with_controls(mut self, controls: yogo_system_controls::Config) -> Self {
        self.controls = controls;
        self
    }

    /// Overrides the lifecycle system configuration.
    #[must_use]
    pub fn with_lifecycle(mut self, lifecycle: yogo_system_lifecycle::Config) -> Self {
        self.lifecycle = lifecycle;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(SIM_DT)
    }
}

/// Owns the world and the systems that drive it.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    spawning: Spawning,
    controls: Controls,
    lifecycle: Lifecycle,
    dt: Duration,
    max_substeps: u32,
    max_frame_time: Duration,
    accumulator: Duration,
    queued_input: InputSample,
    pending_events: Vec<Event>,
}

impl Simulation {
    /// Creates a simulation and starts a run on the level generated from `seed`.
    #[must_use]
    pub fn new(config: Config, seed: LevelSeed) -> Self {
        let mut simulation = Self {
            world: World::new(),
            spawning: Spawning::new(config.spawning),
            controls: Controls::new(config.controls),
            lifecycle: Lifecycle::new(config.lifecycle),
            dt: config.step,
            max_substeps: config.max_substeps,
            max_frame_time: config.max_frame_time,
            accumulator: Duration::ZERO,
            queued_input: InputSample::default(),
            pending_events: Vec::new(),
        };
        let mut events = Vec::new();
        yogo_world::apply(&mut simulation.world, Command::StartRun { seed }, &mut events);
        simulation.pending_events = events;
        simulation
    }

    /// Provides read-only access to the authoritative world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Provides read-only access to the input translation state.
    #[must_use]
    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    /// Events produced by the most recent step.
    #[must_use]
    pub fn recent_events(&self) -> &[Event] {
        &self.pending_events
    }

    /// Reports whether a fatal death asked the process to stop.
    #[must_use]
    pub fn exit_requested(&self) -> bool {
        self.lifecycle.exit_requested()
    }

    /// Removes and returns the lines the lifecycle wants shown to the player.
    pub fn drain_announcements(&mut self) -> Vec<Announcement> {
        self.lifecycle.drain_announcements()
    }

    /// Accumulates real frame time and runs as many whole steps as it covers.
    ///
    /// One-shot inputs are queued until a step consumes them, so they apply
    /// exactly once even when a frame runs no step at all. Returns the number
    /// of steps that ran.
    pub fn advance(&mut self, frame_time: Duration, input: &InputSample) -> u32 {
        self.queue_input(input);
        self.accumulator = self
            .accumulator
            .saturating_add(frame_time.min(self.max_frame_time));

        let mut substeps = 0;
        while self.accumulator >= self.dt && substeps < self.max_substeps {
            let sample = self.queued_input;
            self.step(&sample);
            self.queued_input = sample.held_only();
            self.accumulator -= self.dt;
            substeps += 1;
        }

        if substeps == self.max_substeps && self.accumulator >= self.dt {
            log::debug!(
                "dropping {:?} of simulation backlog after {substeps} steps",
                self.accumulator
            );
            self.accumulator = Duration::ZERO;
        }

        substeps
    }

    /// Runs exactly one fixed step with the provided input.
    pub fn step(&mut self, input: &InputSample) {
        let tick = query::tick_index(&self.world);
        let phase = query::phase(&self.world);
        let mut commands = Vec::new();

        self.controls.handle(input, tick, &mut commands);
        self.spawning
            .handle(&self.pending_events, phase, tick, &mut commands);
        commands.push(Command::Tick { dt: self.dt });

        let mut events = Vec::new();
        self.execute(commands, &mut events);

        let mut follow_up = Vec::new();
        self.lifecycle.handle(&events, &mut follow_up);
        self.execute(follow_up, &mut events);

        self.pending_events = events;
    }

    fn execute(&mut self, commands: Vec<Command>, events: &mut Vec<Event>) {
        for command in commands {
            yogo_world::apply(&mut self.world, command, events);
        }
    }

    fn queue_input(&mut self, input: &InputSample) {
        let queued = &mut self.queued_input;
        queued.intent = input.intent;
        queued.fire_key = input.fire_key;
        queued.fire_button = input.fire_button;
        queued.cursor_delta += input.cursor_delta;
        queued.wheel += input.wheel;
        queued.abandon |= input.abandon;
    }
}
