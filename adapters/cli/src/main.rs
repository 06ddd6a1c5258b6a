#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the You Only Get One experience.

mod scene;
mod seed;

use std::{cell::Cell, rc::Rc};

use anyhow::{Context, Result};
use clap::Parser;
use yogo_core::LevelSeed;
use yogo_rendering::{Color, FrameControl, FrameInput, Presentation, RenderingBackend, Scene};
use yogo_rendering_macroquad::MacroquadBackend;
use yogo_simulation::{Config, InputSample, Simulation};
use yogo_system_lifecycle::Config as LifecycleConfig;
use yogo_world::query;

/// Top-down survival shooter: reach the green marker within a minute.
#[derive(Debug, Parser)]
#[command(name = "yogo", version)]
struct CliArgs {
    /// Seed of the first level; taken from the clock when omitted.
    #[arg(value_parser = seed::parse_seed, allow_negative_numbers = true)]
    seed: Option<LevelSeed>,
    /// Keep playing after fatal deaths instead of exiting.
    #[arg(long)]
    endless: bool,
    /// Synchronise presentation with the display refresh rate.
    #[arg(long)]
    vsync: bool,
    /// Print the frame rate once per second.
    #[arg(long)]
    show_fps: bool,
}

/// Entry point for the You Only Get One command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    let args = CliArgs::parse();

    let seed = args.seed.unwrap_or_else(seed::clock_seed);
    let config = Config::default().with_lifecycle(LifecycleConfig::new(args.endless));
    let mut simulation = Simulation::new(config, seed);
    println!("{}", query::welcome_banner(simulation.world()));
    log::info!("starting run with seed {seed}");

    let mut initial_scene = Scene::default();
    scene::refresh(simulation.world(), &mut initial_scene);
    let presentation = Presentation::new("You Only Get One", Color::BLACK, initial_scene);

    let final_score = Rc::new(Cell::new(0));
    let reported_score = Rc::clone(&final_score);

    MacroquadBackend::new()
        .with_vsync(args.vsync)
        .with_show_fps(args.show_fps)
        .run(presentation, move |frame_dt, input, scene| {
            if input.report_position {
                let position = query::player(simulation.world()).position;
                println!("Position: {}, {}", position.x, position.y);
            }

            let _steps = simulation.advance(frame_dt, &input_sample(input));
            for announcement in simulation.drain_announcements() {
                println!("{announcement}");
            }

            scene::refresh(simulation.world(), scene);
            reported_score.set(scene.hud.score);

            if simulation.exit_requested() {
                FrameControl::Exit
            } else {
                FrameControl::Continue
            }
        })
        .context("failed to run macroquad rendering backend")?;

    println!("Score: {}", final_score.get());
    Ok(())
}

fn input_sample(input: FrameInput) -> InputSample {
    InputSample {
        intent: input.intent,
        fire_key: input.fire_key,
        fire_button: input.fire_button,
        cursor_delta: input.cursor_delta,
        wheel: input.wheel,
        abandon: input.regenerate_level,
    }
}
