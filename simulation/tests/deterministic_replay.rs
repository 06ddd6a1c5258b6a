use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use glam::Vec2;
use yogo_core::{Event, LevelSeed, PlayerIntent, RunPhase, MAX_ENEMIES, MAX_PROJECTILES};
use yogo_simulation::{Config, InputSample, Simulation, SIM_DT};
use yogo_system_lifecycle::Config as LifecycleConfig;
use yogo_world::{query, World};

const SCRIPT_TICKS: u64 = 900;
const PACED_TICKS: u64 = 240;

#[test]
fn identical_inputs_replay_identically() {
    let first = replay(42, &scripted_inputs());
    let second = replay(42, &scripted_inputs());

    assert_eq!(first.len(), SCRIPT_TICKS as usize);
    assert_eq!(first, second, "replay diverged between runs");
}

#[test]
fn different_seeds_diverge() {
    let first = replay(42, &scripted_inputs());
    let second = replay(43, &scripted_inputs());

    assert_ne!(first, second);
}

#[test]
fn frame_pacing_does_not_change_the_outcome() {
    let steady = paced(42, &[SIM_DT]);
    let jittery = paced(
        42,
        &[
            Duration::from_millis(5),
            Duration::from_millis(30),
            Duration::from_micros(15_001),
            Duration::from_millis(70),
        ],
    );

    assert_eq!(steady.len(), PACED_TICKS as usize);
    assert!(jittery.len() > 10, "jittery frames must land on ticks");
    for (tick, fingerprint) in &jittery {
        let index = (*tick - 1) as usize;
        assert_eq!(steady[index], (*tick, *fingerprint), "diverged at tick {tick}");
    }
}

#[test]
fn invariants_hold_through_a_long_endless_session() {
    let config = Config::default().with_lifecycle(LifecycleConfig::new(true));
    let mut simulation = Simulation::new(config, LevelSeed::new(1234));
    let inputs = scripted_inputs();

    for tick in 0..SCRIPT_TICKS * 4 {
        let input = inputs[(tick % SCRIPT_TICKS) as usize];
        simulation.step(&input);
        assert_invariants(simulation.world());
        assert_eq!(query::phase(simulation.world()), RunPhase::Playing);
    }
    assert!(!simulation.exit_requested());
}

#[test]
fn level_transitions_follow_the_seed_chain() {
    let config = Config::default().with_lifecycle(LifecycleConfig::new(true));
    let mut simulation = Simulation::new(config, LevelSeed::new(77));
    let mut expected = query::run_metrics(simulation.world()).next_seed;
    let abandon = InputSample {
        abandon: true,
        ..InputSample::default()
    };

    for _ in 0..4 {
        simulation.step(&abandon);
        let started = simulation
            .recent_events()
            .iter()
            .find_map(|event| match event {
                Event::LevelStarted {
                    seed, next_seed, ..
                } => Some((*seed, *next_seed)),
                _ => None,
            })
            .expect("abandoning starts a new level");
        assert_eq!(started.0, expected);
        expected = started.1;
        simulation.step(&InputSample::default());
    }
}

fn replay(seed: u32, inputs: &[InputSample]) -> Vec<u64> {
    let mut simulation = Simulation::new(Config::default(), LevelSeed::new(seed));
    inputs
        .iter()
        .map(|input| {
            simulation.step(input);
            fingerprint(simulation.world())
        })
        .collect()
}

fn paced(seed: u32, frames: &[Duration]) -> Vec<(u64, u64)> {
    let mut simulation = Simulation::new(Config::default(), LevelSeed::new(seed));
    let held = InputSample {
        intent: PlayerIntent {
            east: true,
            ..PlayerIntent::default()
        },
        fire_key: true,
        ..InputSample::default()
    };

    let mut fingerprints = Vec::new();
    let mut frame = 0;
    while query::tick_index(simulation.world()) < PACED_TICKS {
        if simulation.advance(frames[frame % frames.len()], &held) > 0 {
            let world = simulation.world();
            fingerprints.push((query::tick_index(world), fingerprint(world)));
        }
        frame += 1;
    }
    fingerprints
}

fn scripted_inputs() -> Vec<InputSample> {
    (0..SCRIPT_TICKS)
        .map(|tick| {
            let leg = tick / 150;
            InputSample {
                intent: PlayerIntent {
                    north: leg % 4 == 0,
                    east: leg % 4 == 1,
                    south: leg % 4 == 2,
                    west: leg % 4 == 3,
                    ..PlayerIntent::default()
                },
                fire_key: tick % 3 != 0,
                fire_button: leg % 2 == 1,
                cursor_delta: Vec2::new((tick % 7) as f32 - 3.0, (tick % 5) as f32 - 2.0),
                ..InputSample::default()
            }
        })
        .collect()
}

fn fingerprint(world: &World) -> u64 {
    let mut hasher = DefaultHasher::new();
    let metrics = query::run_metrics(world);
    metrics.tick_index.hash(&mut hasher);
    metrics.score.hash(&mut hasher);
    metrics.active_seed.hash(&mut hasher);
    metrics.enemy_speed.to_bits().hash(&mut hasher);

    let player = query::player(world);
    player.position.x.to_bits().hash(&mut hasher);
    player.position.y.to_bits().hash(&mut hasher);
    player.heading.to_bits().hash(&mut hasher);

    for enemy in query::enemy_view(world).iter() {
        enemy.slot.hash(&mut hasher);
        enemy.position.x.to_bits().hash(&mut hasher);
        enemy.position.y.to_bits().hash(&mut hasher);
    }
    for projectile in query::projectile_view(world).iter() {
        projectile.slot.hash(&mut hasher);
        projectile.position.x.to_bits().hash(&mut hasher);
        projectile.position.y.to_bits().hash(&mut hasher);
    }
    hasher.finish()
}

fn assert_invariants(world: &World) {
    let grid = query::grid(world);
    let enemies = query::enemy_view(world);
    assert!(enemies.len() <= MAX_ENEMIES);
    for enemy in enemies.iter() {
        assert!(!grid.is_blocked_at(enemy.position.x, enemy.position.y));
    }

    let projectiles = query::projectile_view(world);
    assert!(projectiles.cursor() < MAX_PROJECTILES);
    assert!(projectiles.count() <= MAX_PROJECTILES);
    for projectile in projectiles.iter() {
        assert!(projectile.position.x.abs() < 100.0 && projectile.position.y.abs() < 100.0);
    }
}
