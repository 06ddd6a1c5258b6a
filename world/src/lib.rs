#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for You Only Get One.
//!
//! The world owns the occupancy grid, the building list, both entity pools,
//! the player and the run metadata. It is mutated exclusively through
//! [`apply`] and observed through the read-only functions in [`query`].

mod grid;
mod level;
mod pools;

use std::time::Duration;

use glam::Vec2;
use yogo_core::{
    Command, DeathCause, DespawnReason, Direction, EnemySlot, Event, LevelSeed, Objective,
    PlayerIntent, ProjectileSlot, RunPhase, SpawnOffset, BASE_ENEMY_SPEED, BASE_MOVEMENT_SPEED,
    DEFAULT_ALTITUDE, DIFFICULTY_RAMP_TICKS, ENEMY_HIT_EXTENT, ENEMY_LEASH, ENEMY_SPEED_RAMP,
    GRID_HALF_EXTENT, LEVEL_DURATION, MAX_ALTITUDE, MAX_ENEMIES, MAX_PROJECTILES, MIN_ALTITUDE,
    MUZZLE_OFFSET, OBJECTIVE_ENEMY_SPEED_FACTOR, OBJECTIVE_MOVEMENT_SPEED_FACTOR,
    PLAYER_HIT_EXTENT, PLAYER_SKIN, PLAYFIELD_LIMIT, PROJECTILE_SPEED, WELCOME_BANNER,
};

pub use grid::OccupancyGrid;
pub use level::{Building, LevelError};

use level::Layout;
use pools::{EnemyPool, ProjectileRing};

/// Divisor applied to scroll wheel offsets before they scale the altitude.
const SCROLL_ZOOM_DIVISOR: f32 = 1.1;

/// Divisor applied to the movement speed when zooming with held keys.
const KEY_ZOOM_DIVISOR: f32 = 10.0;

/// Player avatar and camera state.
#[derive(Clone, Debug)]
struct Player {
    position: Vec2,
    altitude: f32,
    heading: f32,
    intent: PlayerIntent,
}

impl Player {
    fn new() -> Self {
        Self {
            position: Vec2::ZERO,
            altitude: DEFAULT_ALTITUDE,
            heading: 0.0,
            intent: PlayerIntent::default(),
        }
    }

    /// Unit vector along the game plane that projectiles travel on when fired.
    fn aim(&self) -> Vec2 {
        let radians = (-self.heading).to_radians();
        Vec2::new(radians.cos(), radians.sin())
    }
}

/// Score, seeds and difficulty scalars carried across levels.
#[derive(Clone, Debug)]
struct RunState {
    phase: RunPhase,
    active_seed: LevelSeed,
    next_seed: LevelSeed,
    score: u64,
    enemy_speed: f32,
    initial_enemy_speed: f32,
    movement_speed: f32,
    tick_index: u64,
    elapsed: Duration,
}

impl RunState {
    fn new() -> Self {
        Self {
            phase: RunPhase::Idle,
            active_seed: LevelSeed::new(0),
            next_seed: LevelSeed::new(0),
            score: 0,
            enemy_speed: BASE_ENEMY_SPEED,
            initial_enemy_speed: BASE_ENEMY_SPEED,
            movement_speed: BASE_MOVEMENT_SPEED,
            tick_index: 0,
            elapsed: Duration::ZERO,
        }
    }

    fn award(&mut self, reward: f32) {
        self.score = self.score.saturating_add(reward.max(0.0).floor() as u64);
    }
}

/// Represents the authoritative You Only Get One world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    grid: OccupancyGrid,
    buildings: Vec<Building>,
    scratch_grid: OccupancyGrid,
    scratch_buildings: Vec<Building>,
    objective: Objective,
    enemies: EnemyPool,
    projectiles: ProjectileRing,
    player: Player,
    run: RunState,
}

impl World {
    /// Creates an idle world; issue [`Command::StartRun`] to generate the first level.
    #[must_use]
    pub fn new() -> Self {
        Self {
            banner: WELCOME_BANNER,
            grid: OccupancyGrid::new(),
            buildings: Vec::new(),
            scratch_grid: OccupancyGrid::new(),
            scratch_buildings: Vec::new(),
            objective: Objective {
                x: 0,
                y: 0,
                reward: 0.0,
            },
            enemies: EnemyPool::with_capacity(MAX_ENEMIES),
            projectiles: ProjectileRing::with_capacity(MAX_PROJECTILES),
            player: Player::new(),
            run: RunState::new(),
        }
    }

    fn start_level(&mut self, seed: LevelSeed, out_events: &mut Vec<Event>) {
        self.load_level(seed, level::generate, out_events);
    }

    /// Generates into the scratch buffers and swaps them in only on success, so a
    /// failed generation leaves the previous level untouched.
    fn load_level<G>(&mut self, seed: LevelSeed, generate: G, out_events: &mut Vec<Event>)
    where
        G: FnOnce(
            LevelSeed,
            f32,
            &mut OccupancyGrid,
            &mut Vec<Building>,
        ) -> Result<Layout, LevelError>,
    {
        let mut grid = std::mem::take(&mut self.scratch_grid);
        let mut buildings = std::mem::take(&mut self.scratch_buildings);
        let generated = generate(seed, self.run.initial_enemy_speed, &mut grid, &mut buildings);
        let layout = match generated {
            Ok(layout) => layout,
            Err(error) => {
                log::error!("{error}");
                self.scratch_grid = grid;
                self.scratch_buildings = buildings;
                return;
            }
        };
        self.scratch_grid = std::mem::replace(&mut self.grid, grid);
        self.scratch_buildings = std::mem::replace(&mut self.buildings, buildings);

        self.run.active_seed = seed;
        self.run.next_seed = layout.next_seed;
        self.run.elapsed = Duration::ZERO;
        self.run.phase = RunPhase::Playing;
        self.objective = layout.objective;
        self.enemies.kill_all();
        self.projectiles.kill_all();
        self.player.position = Vec2::ZERO;
        self.player.heading = 0.0;
        self.player.intent = PlayerIntent::default();

        log::info!(
            "level {seed} started, next seed {}, objective ({}, {}) worth {}",
            layout.next_seed,
            layout.objective.x,
            layout.objective.y,
            layout.objective.reward
        );
        out_events.push(Event::LevelStarted {
            seed,
            next_seed: layout.next_seed,
            objective: layout.objective,
        });
    }

    fn end_level(&mut self, cause: DeathCause, out_events: &mut Vec<Event>) {
        self.run.phase = RunPhase::Dead(cause);
        log::info!("level {} ended: {cause:?}", self.run.active_seed);
        out_events.push(Event::RunEnded {
            cause,
            score: self.run.score,
        });
    }

    fn is_playing(&self) -> bool {
        self.run.phase == RunPhase::Playing
    }

    fn steer(&mut self, seconds: f32) {
        let intent = self.player.intent;
        let step = self.run.movement_speed * seconds;
        let reach = step + PLAYER_SKIN;
        let Vec2 { x, y } = self.player.position;

        if intent.north && !self.grid.is_blocked_at(x, y - reach) {
            self.player.position.y -= step;
        }
        if intent.south && !self.grid.is_blocked_at(x, y + reach) {
            self.player.position.y += step;
        }
        if intent.west && !self.grid.is_blocked_at(x - reach, y) {
            self.player.position.x -= step;
        }
        if intent.east && !self.grid.is_blocked_at(x + reach, y) {
            self.player.position.x += step;
        }
        if intent.advance {
            let motion = self.player.aim() * step;
            if motion.y < 0.0 && !self.grid.is_blocked_at(x, y - reach) {
                self.player.position.y += motion.y;
            }
            if motion.y > 0.0 && !self.grid.is_blocked_at(x, y + reach) {
                self.player.position.y += motion.y;
            }
            if motion.x < 0.0 && !self.grid.is_blocked_at(x - reach, y) {
                self.player.position.x += motion.x;
            }
            if motion.x > 0.0 && !self.grid.is_blocked_at(x + reach, y) {
                self.player.position.x += motion.x;
            }
        }

        let zoom = self.player.altitude * self.run.movement_speed * seconds / KEY_ZOOM_DIVISOR;
        if intent.zoom_in {
            self.player.altitude -= zoom;
        }
        if intent.zoom_out {
            self.player.altitude += zoom;
        }
        self.player.altitude = self.player.altitude.clamp(MIN_ALTITUDE, MAX_ALTITUDE);
    }

    fn scroll_zoom(&mut self, offset: f32) {
        let factor = offset.abs() / SCROLL_ZOOM_DIVISOR;
        if factor <= f32::EPSILON {
            return;
        }
        let altitude = &mut self.player.altitude;
        if offset < 0.0 && *altitude < MAX_ALTITUDE {
            *altitude /= factor;
        } else if offset > 0.0 && *altitude > MIN_ALTITUDE {
            *altitude *= factor;
        }
        *altitude = altitude.clamp(MIN_ALTITUDE, MAX_ALTITUDE);
    }

    fn fire(&mut self, out_events: &mut Vec<Event>) {
        let muzzle = self.player.position + self.player.aim() * MUZZLE_OFFSET;
        if is_beyond(muzzle, PLAYFIELD_LIMIT) {
            log::trace!("muzzle at {muzzle} is outside the playfield");
            return;
        }
        if let Some(slot) = self.projectiles.fire(muzzle, -self.player.heading) {
            out_events.push(Event::ProjectileFired { slot });
        }
    }

    fn spawn_enemy(
        &mut self,
        offset: SpawnOffset,
        direction: Direction,
        out_events: &mut Vec<Event>,
    ) {
        let origin = Vec2::new(
            self.player.position.x.trunc(),
            self.player.position.y.trunc(),
        );
        let position = origin + Vec2::new(offset.dx as f32, offset.dy as f32);
        if self.grid.is_blocked_at(position.x, position.y) {
            log::trace!("spawn at {position} landed on a building");
            return;
        }
        match self.enemies.spawn(position, direction) {
            Some(slot) => out_events.push(Event::EnemySpawned { slot, direction }),
            None => {
                log::debug!("enemy pool saturated at {}", self.enemies.capacity());
                out_events.push(Event::EnemyPoolExhausted);
            }
        }
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let seconds = dt.as_secs_f32();
        self.steer(seconds);

        if is_beyond(self.player.position, GRID_HALF_EXTENT as f32) {
            self.end_level(DeathCause::FellOffEdge, out_events);
            return;
        }

        let tick = self.run.tick_index;
        if tick % DIFFICULTY_RAMP_TICKS == 0 {
            self.run.enemy_speed += ENEMY_SPEED_RAMP;
            log::debug!("enemy speed raised to {}", self.run.enemy_speed);
            out_events.push(Event::DifficultyRaised {
                enemy_speed: self.run.enemy_speed,
            });
        }
        self.run.tick_index = tick.saturating_add(1);
        out_events.push(Event::TimeAdvanced { dt, tick });

        self.run.elapsed = self.run.elapsed.saturating_add(dt);
        if self.run.elapsed > LEVEL_DURATION {
            self.end_level(DeathCause::TimeUp, out_events);
            return;
        }

        if let Some(cause) = self.advance_enemies(seconds, out_events) {
            self.end_level(cause, out_events);
            return;
        }
        if let Some(cause) = self.advance_projectiles(seconds, out_events) {
            self.end_level(cause, out_events);
            return;
        }

        let target = Vec2::new(self.objective.x as f32, self.objective.y as f32);
        let gap = (self.player.position - target).abs();
        if gap.x < 1.0 && gap.y < 1.0 {
            self.reach_objective(out_events);
        }
    }

    fn advance_enemies(&mut self, seconds: f32, out_events: &mut Vec<Event>) -> Option<DeathCause> {
        let travel = self.run.enemy_speed * seconds;
        let player = self.player.position;
        let grid = &self.grid;

        for (index, enemy) in self.enemies.slots_mut().iter_mut().enumerate() {
            if !enemy.alive {
                continue;
            }

            let (dx, dy) = enemy.direction.unit();
            enemy.position += Vec2::new(dx, dy) * travel;
            let offset = (enemy.position - player).abs();

            let despawn = if offset.x > ENEMY_LEASH || offset.y > ENEMY_LEASH {
                Some(DespawnReason::Strayed)
            } else if is_beyond(enemy.position, PLAYFIELD_LIMIT) {
                Some(DespawnReason::LeftPlayfield)
            } else if grid.is_blocked_at(enemy.position.x, enemy.position.y) {
                Some(DespawnReason::HitBuilding)
            } else {
                None
            };

            if let Some(reason) = despawn {
                enemy.alive = false;
                out_events.push(Event::EnemyDespawned {
                    slot: EnemySlot::new(index as u32),
                    reason,
                });
                // Later slots hold still for the rest of this tick.
                break;
            }

            if offset.x < ENEMY_HIT_EXTENT && offset.y < ENEMY_HIT_EXTENT {
                return Some(DeathCause::HuggedByEnemy);
            }
        }

        None
    }

    fn advance_projectiles(
        &mut self,
        seconds: f32,
        out_events: &mut Vec<Event>,
    ) -> Option<DeathCause> {
        let travel = PROJECTILE_SPEED * seconds;
        let player = self.player.position;
        let reward = self.run.initial_enemy_speed;
        let grid = &self.grid;
        let enemies = self.enemies.slots_mut();
        let run = &mut self.run;

        for (index, projectile) in self.projectiles.written_mut().iter_mut().enumerate() {
            if !projectile.alive {
                continue;
            }

            projectile.position += projectile.heading() * travel;
            let slot = ProjectileSlot::new(index as u32);
            if is_beyond(projectile.position, PLAYFIELD_LIMIT) {
                projectile.alive = false;
                out_events.push(Event::ProjectileExpired { slot });
                continue;
            }
            // A building hit expires the projectile but its collisions still resolve.
            if grid.is_blocked_at(projectile.position.x, projectile.position.y) {
                projectile.alive = false;
                out_events.push(Event::ProjectileExpired { slot });
            }

            let offset = (projectile.position - player).abs();
            if offset.x < PLAYER_HIT_EXTENT && offset.y < PLAYER_HIT_EXTENT {
                return Some(DeathCause::OwnBullet);
            }

            for (enemy_index, enemy) in enemies.iter_mut().enumerate() {
                if !enemy.alive {
                    continue;
                }
                let gap = (enemy.position - projectile.position).abs();
                if gap.x < ENEMY_HIT_EXTENT && gap.y < ENEMY_HIT_EXTENT {
                    enemy.alive = false;
                    projectile.alive = false;
                    run.award(reward);
                    out_events.push(Event::EnemyShot {
                        enemy: EnemySlot::new(enemy_index as u32),
                        projectile: slot,
                        reward,
                    });
                    break;
                }
            }

            projectile.alive_time += seconds;
        }

        None
    }

    fn reach_objective(&mut self, out_events: &mut Vec<Event>) {
        let reward = self.objective.reward;
        self.run.award(reward);
        self.run.initial_enemy_speed *= OBJECTIVE_ENEMY_SPEED_FACTOR;
        self.run.movement_speed *= OBJECTIVE_MOVEMENT_SPEED_FACTOR;
        self.run.phase = RunPhase::LevelComplete;
        log::info!(
            "objective of level {} reached, score {}",
            self.run.active_seed,
            self.run.score
        );
        out_events.push(Event::ObjectiveReached {
            reward,
            score: self.run.score,
        });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

fn is_beyond(position: Vec2, limit: f32) -> bool {
    position.x.abs() > limit || position.y.abs() > limit
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartRun { seed } => {
            world.run = RunState::new();
            world.player = Player::new();
            world.start_level(seed, out_events);
        }
        Command::AdvanceLevel => {
            if world.run.phase == RunPhase::Idle {
                log::warn!("ignoring level advance before a run started");
                return;
            }
            world.run.enemy_speed = world.run.initial_enemy_speed;
            let seed = world.run.next_seed;
            world.start_level(seed, out_events);
        }
        Command::SetIntent { intent } => {
            world.player.intent = intent;
        }
        Command::Aim { heading } => {
            world.player.heading = heading;
        }
        Command::Fire => {
            if world.is_playing() {
                world.fire(out_events);
            }
        }
        Command::ScrollZoom { offset } => {
            world.scroll_zoom(offset);
        }
        Command::SpawnEnemy { offset, direction } => {
            if world.is_playing() {
                world.spawn_enemy(offset, direction, out_events);
            }
        }
        Command::AbandonLevel => {
            if world.is_playing() {
                world.end_level(DeathCause::Abandoned, out_events);
            }
        }
        Command::PlacePlayer { x, z } => {
            world.player.position = Vec2::new(x, z);
        }
        Command::Tick { dt } => {
            if world.is_playing() {
                world.tick(dt, out_events);
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use glam::Vec2;
    use yogo_core::{Direction, EnemySlot, LevelSeed, Objective, ProjectileSlot, RunPhase};

    use super::{Building, OccupancyGrid, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the occupancy grid of the active level.
    #[must_use]
    pub fn grid(world: &World) -> &OccupancyGrid {
        &world.grid
    }

    /// Buildings generated for the active level.
    #[must_use]
    pub fn buildings(world: &World) -> &[Building] {
        &world.buildings
    }

    /// Objective of the active level.
    #[must_use]
    pub fn objective(world: &World) -> Objective {
        world.objective
    }

    /// Lifecycle phase of the active level.
    #[must_use]
    pub fn phase(world: &World) -> RunPhase {
        world.run.phase
    }

    /// Index of the next tick to be simulated.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.run.tick_index
    }

    /// Captures the player's position, camera and aim.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        PlayerSnapshot {
            position: world.player.position,
            altitude: world.player.altitude,
            heading: world.player.heading,
        }
    }

    /// Captures the score, seeds and difficulty scalars of the run.
    #[must_use]
    pub fn run_metrics(world: &World) -> RunMetrics {
        RunMetrics {
            phase: world.run.phase,
            active_seed: world.run.active_seed,
            next_seed: world.run.next_seed,
            score: world.run.score,
            enemy_speed: world.run.enemy_speed,
            initial_enemy_speed: world.run.initial_enemy_speed,
            movement_speed: world.run.movement_speed,
            tick_index: world.run.tick_index,
            elapsed: world.run.elapsed,
        }
    }

    /// Captures a read-only view of the live enemies ordered by slot.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        let snapshots = world
            .enemies
            .slots()
            .iter()
            .enumerate()
            .filter(|(_, enemy)| enemy.alive)
            .map(|(index, enemy)| EnemySnapshot {
                slot: EnemySlot::new(index as u32),
                position: enemy.position,
                direction: enemy.direction,
            })
            .collect();
        EnemyView {
            snapshots,
            capacity: world.enemies.capacity(),
        }
    }

    /// Captures a read-only view of the live projectiles ordered by slot.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        let ring = &world.projectiles;
        let snapshots = ring
            .written()
            .iter()
            .enumerate()
            .filter(|(_, projectile)| projectile.alive)
            .map(|(index, projectile)| ProjectileSnapshot {
                slot: ProjectileSlot::new(index as u32),
                position: projectile.position,
                angle: projectile.angle,
                alive_time: projectile.alive_time,
            })
            .collect();
        ProjectileView {
            snapshots,
            cursor: ring.cursor(),
            count: ring.count(),
            capacity: ring.capacity(),
        }
    }

    /// Reports whether the enemy occupying `slot` is alive.
    #[must_use]
    pub fn is_enemy_alive(world: &World, slot: EnemySlot) -> bool {
        world
            .enemies
            .slots()
            .get(slot.get() as usize)
            .map_or(false, |enemy| enemy.alive)
    }

    /// Reports whether the projectile occupying `slot` is alive.
    #[must_use]
    pub fn is_projectile_alive(world: &World, slot: ProjectileSlot) -> bool {
        world
            .projectiles
            .written()
            .get(slot.get() as usize)
            .map_or(false, |projectile| projectile.alive)
    }

    /// Number of live enemies.
    #[must_use]
    pub fn alive_enemy_count(world: &World) -> usize {
        world.enemies.alive_count()
    }

    /// Snapshot of the player's avatar and camera.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct PlayerSnapshot {
        /// Position on the game plane; `y` is the world `z` axis.
        pub position: Vec2,
        /// Camera altitude above the ground plane.
        pub altitude: f32,
        /// Aim heading in degrees.
        pub heading: f32,
    }

    /// Snapshot of the run-level bookkeeping.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct RunMetrics {
        /// Lifecycle phase of the active level.
        pub phase: RunPhase,
        /// Seed that generated the active level.
        pub active_seed: LevelSeed,
        /// Seed reserved for the following level.
        pub next_seed: LevelSeed,
        /// Accumulated score.
        pub score: u64,
        /// Current enemy speed.
        pub enemy_speed: f32,
        /// Baseline enemy speed of the run, which also weights rewards.
        pub initial_enemy_speed: f32,
        /// Player movement speed.
        pub movement_speed: f32,
        /// Index of the next tick to be simulated.
        pub tick_index: u64,
        /// Simulated time spent on the active level.
        pub elapsed: Duration,
    }

    /// Read-only snapshot describing all live enemies.
    #[derive(Clone, Debug)]
    pub struct EnemyView {
        snapshots: Vec<EnemySnapshot>,
        capacity: usize,
    }

    impl EnemyView {
        /// Iterator over the captured enemy snapshots in slot order.
        pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
            self.snapshots.iter()
        }

        /// Number of live enemies captured.
        #[must_use]
        pub fn len(&self) -> usize {
            self.snapshots.len()
        }

        /// Reports whether no enemy is alive.
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.snapshots.is_empty()
        }

        /// Capacity of the pool the snapshot was taken from.
        #[must_use]
        pub fn capacity(&self) -> usize {
            self.capacity
        }

        /// Consumes the view, returning the owned snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<EnemySnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single enemy.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct EnemySnapshot {
        /// Pool slot occupied by the enemy.
        pub slot: EnemySlot,
        /// Position on the game plane.
        pub position: Vec2,
        /// Drift direction chosen at spawn.
        pub direction: Direction,
    }

    /// Read-only snapshot describing all live projectiles and the ring state.
    #[derive(Clone, Debug)]
    pub struct ProjectileView {
        snapshots: Vec<ProjectileSnapshot>,
        cursor: usize,
        count: usize,
        capacity: usize,
    }

    impl ProjectileView {
        /// Iterator over the captured projectile snapshots in slot order.
        pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
            self.snapshots.iter()
        }

        /// Number of live projectiles captured.
        #[must_use]
        pub fn len(&self) -> usize {
            self.snapshots.len()
        }

        /// Reports whether no projectile is alive.
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.snapshots.is_empty()
        }

        /// Slot the next projectile will be written to.
        #[must_use]
        pub fn cursor(&self) -> usize {
            self.cursor
        }

        /// Number of slots that have been written at least once.
        #[must_use]
        pub fn count(&self) -> usize {
            self.count
        }

        /// Capacity of the ring.
        #[must_use]
        pub fn capacity(&self) -> usize {
            self.capacity
        }
    }

    /// Immutable representation of a single projectile.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct ProjectileSnapshot {
        /// Ring slot occupied by the projectile.
        pub slot: ProjectileSlot,
        /// Position on the game plane.
        pub position: Vec2,
        /// Travel angle in degrees.
        pub angle: f32,
        /// Seconds since the projectile was fired.
        pub alive_time: f32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yogo_core::CellCoord;

    const DT: Duration = Duration::from_micros(16_667);

    fn started(seed: u32) -> (World, Vec<Event>) {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::StartRun {
                seed: LevelSeed::new(seed),
            },
            &mut events,
        );
        (world, events)
    }

    fn cleared(seed: u32) -> World {
        let (mut world, _) = started(seed);
        world.grid.clear();
        world.objective = Objective {
            x: -80,
            y: -80,
            reward: 0.0,
        };
        world
    }

    #[test]
    fn idle_world_ignores_ticks() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(&mut world, Command::Tick { dt: DT }, &mut events);
        apply(&mut world, Command::AdvanceLevel, &mut events);
        assert!(events.is_empty());
        assert_eq!(query::phase(&world), RunPhase::Idle);
    }

    #[test]
    fn start_run_announces_level() {
        let (world, events) = started(42);
        let metrics = query::run_metrics(&world);
        assert_eq!(metrics.phase, RunPhase::Playing);
        assert_eq!(
            events,
            vec![Event::LevelStarted {
                seed: LevelSeed::new(42),
                next_seed: metrics.next_seed,
                objective: query::objective(&world),
            }]
        );
    }

    #[test]
    fn wall_blocks_eastward_motion() {
        let mut world = cleared(1);
        world.grid.occupy(CellCoord::at_world(1, 0).expect("cell"));
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SetIntent {
                intent: PlayerIntent {
                    east: true,
                    ..PlayerIntent::default()
                },
            },
            &mut events,
        );
        for _ in 0..600 {
            apply(&mut world, Command::Tick { dt: DT }, &mut events);
        }
        let player = query::player(&world);
        assert!(player.position.x <= 1.0 - PLAYER_SKIN);
        assert!(player.position.x > 0.5);
    }

    #[test]
    fn advancing_along_aim_stops_at_a_wall() {
        let mut world = cleared(1);
        for x in -2..=2 {
            world.grid.occupy(CellCoord::at_world(x, -2).expect("cell"));
        }
        let mut events = Vec::new();
        apply(&mut world, Command::Aim { heading: 90.0 }, &mut events);
        apply(
            &mut world,
            Command::SetIntent {
                intent: PlayerIntent {
                    advance: true,
                    ..PlayerIntent::default()
                },
            },
            &mut events,
        );
        apply(&mut world, Command::Tick { dt: DT }, &mut events);
        assert!(query::player(&world).position.y < 0.0);

        for _ in 0..60 {
            apply(&mut world, Command::Tick { dt: DT }, &mut events);
        }
        let position = query::player(&world).position;
        assert!(position.x.abs() < 1e-4);
        assert!(position.y >= -1.0 - 1e-4, "walked into the wall at {position}");
        assert!(position.y < -0.5);
        assert_eq!(query::phase(&world), RunPhase::Playing);
    }

    #[test]
    fn advancing_diagonally_slides_along_a_wall() {
        let mut world = cleared(1);
        for x in -4..=4 {
            world.grid.occupy(CellCoord::at_world(x, -2).expect("cell"));
        }
        let mut events = Vec::new();
        apply(&mut world, Command::Aim { heading: 45.0 }, &mut events);
        apply(
            &mut world,
            Command::SetIntent {
                intent: PlayerIntent {
                    advance: true,
                    ..PlayerIntent::default()
                },
            },
            &mut events,
        );
        for _ in 0..60 {
            apply(&mut world, Command::Tick { dt: DT }, &mut events);
        }
        let position = query::player(&world).position;
        assert!(position.y >= -1.0 - 1e-4);
        assert!(position.x > 2.0);
    }

    #[test]
    fn scroll_zoom_respects_limits() {
        let mut world = World::new();
        let mut events = Vec::new();
        for _ in 0..10 {
            apply(&mut world, Command::ScrollZoom { offset: 1.0 }, &mut events);
        }
        assert_eq!(query::player(&world).altitude, MIN_ALTITUDE);
        for _ in 0..100 {
            apply(&mut world, Command::ScrollZoom { offset: -1.0 }, &mut events);
        }
        assert_eq!(query::player(&world).altitude, MAX_ALTITUDE);
    }

    #[test]
    fn fire_writes_projectile_in_front_of_player() {
        let mut world = cleared(5);
        let mut events = Vec::new();
        apply(&mut world, Command::Aim { heading: -90.0 }, &mut events);
        apply(&mut world, Command::Fire, &mut events);
        assert_eq!(
            events,
            vec![Event::ProjectileFired {
                slot: ProjectileSlot::new(0)
            }]
        );
        let view = query::projectile_view(&world);
        let projectile = view.iter().next().expect("projectile");
        assert_eq!(projectile.angle, 90.0);
        assert!(projectile.position.x.abs() < 1e-6);
        assert!((projectile.position.y - MUZZLE_OFFSET).abs() < 1e-6);
    }

    #[test]
    fn spawns_on_buildings_are_dropped() {
        let mut world = cleared(5);
        world.grid.occupy(CellCoord::at_world(6, 6).expect("cell"));
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                offset: SpawnOffset { dx: 6, dy: 6 },
                direction: Direction::East,
            },
            &mut events,
        );
        assert!(events.is_empty());
        assert_eq!(query::alive_enemy_count(&world), 0);
    }

    #[test]
    fn enemies_walking_into_buildings_despawn() {
        let mut world = cleared(5);
        world.grid.occupy(CellCoord::at_world(7, 6).expect("cell"));
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                offset: SpawnOffset { dx: 6, dy: 6 },
                direction: Direction::East,
            },
            &mut events,
        );
        for _ in 0..120 {
            apply(&mut world, Command::Tick { dt: DT }, &mut events);
        }
        assert!(events.contains(&Event::EnemyDespawned {
            slot: EnemySlot::new(0),
            reason: DespawnReason::HitBuilding,
        }));
        assert_eq!(query::alive_enemy_count(&world), 0);
    }

    #[test]
    fn enemies_beyond_the_leash_despawn() {
        let mut world = cleared(5);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                offset: SpawnOffset { dx: 4, dy: 0 },
                direction: Direction::East,
            },
            &mut events,
        );
        apply(&mut world, Command::PlacePlayer { x: -40.0, z: 0.0 }, &mut events);
        apply(&mut world, Command::Tick { dt: DT }, &mut events);
        assert!(events.contains(&Event::EnemyDespawned {
            slot: EnemySlot::new(0),
            reason: DespawnReason::Strayed,
        }));
    }

    #[test]
    fn touching_an_enemy_ends_the_level() {
        let mut world = cleared(5);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                offset: SpawnOffset { dx: 4, dy: 0 },
                direction: Direction::West,
            },
            &mut events,
        );
        apply(&mut world, Command::PlacePlayer { x: 3.95, z: 0.0 }, &mut events);
        events.clear();
        apply(&mut world, Command::Tick { dt: DT }, &mut events);
        assert_eq!(
            query::phase(&world),
            RunPhase::Dead(DeathCause::HuggedByEnemy)
        );
        assert!(matches!(
            events.last(),
            Some(Event::RunEnded {
                cause: DeathCause::HuggedByEnemy,
                ..
            })
        ));
    }

    #[test]
    fn walking_into_own_projectile_ends_the_level() {
        let mut world = cleared(5);
        let mut events = Vec::new();
        apply(&mut world, Command::Fire, &mut events);
        apply(
            &mut world,
            Command::PlacePlayer {
                x: MUZZLE_OFFSET + PROJECTILE_SPEED * DT.as_secs_f32(),
                z: 0.0,
            },
            &mut events,
        );
        apply(&mut world, Command::Tick { dt: DT }, &mut events);
        assert_eq!(query::phase(&world), RunPhase::Dead(DeathCause::OwnBullet));
    }

    #[test]
    fn timer_expires_after_sixty_simulated_seconds() {
        let mut world = cleared(5);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(30),
            },
            &mut events,
        );
        assert_eq!(query::phase(&world), RunPhase::Playing);
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(30_001),
            },
            &mut events,
        );
        assert_eq!(query::phase(&world), RunPhase::Dead(DeathCause::TimeUp));
    }

    #[test]
    fn difficulty_ramps_on_tick_multiples() {
        let mut world = cleared(5);
        let mut events = Vec::new();
        for _ in 0..=DIFFICULTY_RAMP_TICKS {
            apply(&mut world, Command::Tick { dt: DT }, &mut events);
        }
        let raised: Vec<_> = events
            .iter()
            .filter(|event| matches!(event, Event::DifficultyRaised { .. }))
            .collect();
        assert_eq!(raised.len(), 2);
        assert_eq!(
            query::run_metrics(&world).enemy_speed,
            BASE_ENEMY_SPEED + 2.0 * ENEMY_SPEED_RAMP
        );
    }

    #[test]
    fn abandoning_keeps_score_and_advancing_resets_speed() {
        let mut world = cleared(5);
        let mut events = Vec::new();
        world.run.score = 12;
        apply(&mut world, Command::Tick { dt: DT }, &mut events);
        apply(&mut world, Command::AbandonLevel, &mut events);
        assert_eq!(query::phase(&world), RunPhase::Dead(DeathCause::Abandoned));
        let next_seed = query::run_metrics(&world).next_seed;

        apply(&mut world, Command::AdvanceLevel, &mut events);
        let metrics = query::run_metrics(&world);
        assert_eq!(metrics.active_seed, next_seed);
        assert_eq!(metrics.score, 12);
        assert_eq!(metrics.enemy_speed, metrics.initial_enemy_speed);
        assert_eq!(metrics.phase, RunPhase::Playing);
        assert_eq!(query::player(&world).position, Vec2::ZERO);
    }

    #[test]
    fn advancing_clears_entity_pools() {
        let mut world = cleared(5);
        let mut events = Vec::new();
        apply(&mut world, Command::Fire, &mut events);
        apply(
            &mut world,
            Command::SpawnEnemy {
                offset: SpawnOffset { dx: -4, dy: 4 },
                direction: Direction::North,
            },
            &mut events,
        );
        apply(&mut world, Command::AbandonLevel, &mut events);
        apply(&mut world, Command::AdvanceLevel, &mut events);
        assert!(query::enemy_view(&world).is_empty());
        assert!(query::projectile_view(&world).is_empty());
        assert_eq!(query::projectile_view(&world).cursor(), 1);
    }

    #[test]
    fn despawning_enemy_freezes_later_slots_for_the_tick() {
        let mut world = cleared(5);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                offset: SpawnOffset { dx: 4, dy: 0 },
                direction: Direction::East,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SpawnEnemy {
                offset: SpawnOffset { dx: -4, dy: 4 },
                direction: Direction::South,
            },
            &mut events,
        );
        apply(&mut world, Command::PlacePlayer { x: -28.0, z: 0.0 }, &mut events);
        events.clear();
        apply(&mut world, Command::Tick { dt: DT }, &mut events);

        assert!(events.contains(&Event::EnemyDespawned {
            slot: EnemySlot::new(0),
            reason: DespawnReason::Strayed,
        }));
        let view = query::enemy_view(&world).into_vec();
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].slot, EnemySlot::new(1));
        assert_eq!(view[0].position, Vec2::new(-4.0, 4.0));

        apply(&mut world, Command::Tick { dt: DT }, &mut events);
        let view = query::enemy_view(&world).into_vec();
        assert!(view[0].position.y > 4.0);
    }

    #[test]
    fn enemies_leaving_the_playfield_despawn() {
        let mut world = cleared(5);
        let mut events = Vec::new();
        apply(&mut world, Command::PlacePlayer { x: 95.0, z: 0.0 }, &mut events);
        apply(
            &mut world,
            Command::SpawnEnemy {
                offset: SpawnOffset { dx: 3, dy: 0 },
                direction: Direction::East,
            },
            &mut events,
        );
        events.clear();
        apply(&mut world, Command::Tick { dt: DT }, &mut events);
        assert!(events.contains(&Event::EnemyDespawned {
            slot: EnemySlot::new(0),
            reason: DespawnReason::LeftPlayfield,
        }));
        assert_eq!(query::alive_enemy_count(&world), 0);
    }

    #[test]
    fn projectiles_expire_at_the_playfield_edge() {
        let mut world = cleared(5);
        let mut events = Vec::new();
        apply(&mut world, Command::PlacePlayer { x: 97.7, z: 0.0 }, &mut events);
        apply(&mut world, Command::Fire, &mut events);
        assert!(query::is_projectile_alive(&world, ProjectileSlot::new(0)));
        events.clear();
        apply(&mut world, Command::Tick { dt: DT }, &mut events);
        assert_eq!(
            events
                .iter()
                .filter(|event| matches!(event, Event::ProjectileExpired { .. }))
                .count(),
            1
        );
        assert!(!query::is_projectile_alive(&world, ProjectileSlot::new(0)));
        assert_eq!(query::phase(&world), RunPhase::Playing);
    }

    #[test]
    fn projectile_hitting_a_building_still_kills_an_enemy_there() {
        let mut world = cleared(5);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                offset: SpawnOffset { dx: 4, dy: 0 },
                direction: Direction::North,
            },
            &mut events,
        );
        world.grid.occupy(CellCoord::at_world(4, 0).expect("cell"));
        apply(&mut world, Command::PlacePlayer { x: 3.7, z: 0.0 }, &mut events);
        apply(&mut world, Command::Fire, &mut events);
        let score = query::run_metrics(&world).score;
        events.clear();
        apply(&mut world, Command::Tick { dt: DT }, &mut events);

        assert!(events.contains(&Event::ProjectileExpired {
            slot: ProjectileSlot::new(0)
        }));
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::EnemyShot { .. })));
        assert_eq!(query::run_metrics(&world).score, score + 1);
    }

    #[test]
    fn alive_time_accumulates_per_tick() {
        let mut world = cleared(5);
        let mut events = Vec::new();
        apply(&mut world, Command::Fire, &mut events);
        apply(&mut world, Command::Tick { dt: DT }, &mut events);
        apply(&mut world, Command::Tick { dt: DT }, &mut events);
        let view = query::projectile_view(&world);
        let projectile = view.iter().next().expect("projectile");
        assert!((projectile.alive_time - 2.0 * DT.as_secs_f32()).abs() < 1e-6);
    }

    #[test]
    fn full_enemy_pool_drops_spawns() {
        let mut world = cleared(5);
        let mut events = Vec::new();
        for _ in 0..=MAX_ENEMIES {
            apply(
                &mut world,
                Command::SpawnEnemy {
                    offset: SpawnOffset { dx: 5, dy: 5 },
                    direction: Direction::South,
                },
                &mut events,
            );
        }
        assert_eq!(query::alive_enemy_count(&world), MAX_ENEMIES);
        assert_eq!(events.last(), Some(&Event::EnemyPoolExhausted));
        assert_eq!(
            events
                .iter()
                .filter(|event| matches!(event, Event::EnemySpawned { .. }))
                .count(),
            MAX_ENEMIES
        );
    }

    #[test]
    fn failed_generation_keeps_the_previous_level() {
        let (mut world, _) = started(5);
        let grid = query::grid(&world).clone();
        let buildings = query::buildings(&world).to_vec();
        let metrics = query::run_metrics(&world);
        let mut events = Vec::new();

        world.load_level(
            metrics.next_seed,
            |seed, _, scratch_grid, scratch_buildings| {
                scratch_grid.clear();
                scratch_buildings.clear();
                Err(LevelError::NoObjectiveCell { seed })
            },
            &mut events,
        );

        assert!(events.is_empty());
        assert_eq!(query::grid(&world), &grid);
        assert_eq!(query::buildings(&world), buildings.as_slice());
        assert_eq!(query::run_metrics(&world), metrics);

        apply(&mut world, Command::AdvanceLevel, &mut events);
        assert_eq!(query::run_metrics(&world).active_seed, metrics.next_seed);
        assert_ne!(query::grid(&world), &grid);
    }
}
