#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the You Only Get One engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Instructions banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "You Only Get One\n\n\
The aim of this game is to fight your way through the red squares to the objective \
marker indicated by the green line. You only get one minute.\n\n\
Controls (classic):\n\tmouse: aim\n\tleft-click: shoot\n\tright-click: move forward\n\tscroll: zoom\n\
Controls (casual):\n\tWASD: movement\n\tmouse: aim\n\tspace: shoot\n\tscroll/shift/ctrl: zoom\n\
R to generate a new level\nQ to print your position\nE to release/recapture mouse\nESC to exit\n";

/// Half extent of the square world. World coordinates span `[-GRID_HALF_EXTENT, GRID_HALF_EXTENT)`.
pub const GRID_HALF_EXTENT: i32 = 100;

/// Number of cells along each edge of the occupancy grid.
pub const GRID_CELLS: u32 = 200;

/// Number of building draws performed by the level generator.
pub const NUM_BUILDINGS: usize = 2048;

/// Capacity of the enemy pool.
pub const MAX_ENEMIES: usize = 4096;

/// Capacity of the projectile ring.
pub const MAX_PROJECTILES: usize = 4096;

/// Projectile velocity magnitude in world units per second.
pub const PROJECTILE_SPEED: f32 = 8.0;

/// Enemy speed at the start of a fresh run, in world units per second.
pub const BASE_ENEMY_SPEED: f32 = 1.0;

/// Player speed at the start of a fresh run, in world units per second.
pub const BASE_MOVEMENT_SPEED: f32 = 4.0;

/// Enemy speed added every [`DIFFICULTY_RAMP_TICKS`] ticks.
pub const ENEMY_SPEED_RAMP: f32 = 0.5;

/// Number of ticks between enemy speed increments.
pub const DIFFICULTY_RAMP_TICKS: u64 = 500;

/// Multiplier applied to the run's baseline enemy speed after reaching an objective.
pub const OBJECTIVE_ENEMY_SPEED_FACTOR: f32 = 1.5;

/// Multiplier applied to the player's movement speed after reaching an objective.
pub const OBJECTIVE_MOVEMENT_SPEED_FACTOR: f32 = 1.075;

/// Entities beyond this absolute coordinate have left the playfield.
pub const PLAYFIELD_LIMIT: f32 = 98.0;

/// Enemies further than this from the player along either axis are reaped.
pub const ENEMY_LEASH: f32 = 32.0;

/// Half extent of the enemy hit box used for projectile and player contact.
pub const ENEMY_HIT_EXTENT: f32 = 0.1;

/// Half extent of the player hit box used for projectile contact.
pub const PLAYER_HIT_EXTENT: f32 = 0.075;

/// Offset at which the player's collision skin probes the grid.
pub const PLAYER_SKIN: f32 = 0.15;

/// Distance in front of the player at which projectiles spawn.
pub const MUZZLE_OFFSET: f32 = 0.25;

/// Duration a level may last before the run ends.
pub const LEVEL_DURATION: Duration = Duration::from_secs(60);

/// Camera altitude used when a run starts.
pub const DEFAULT_ALTITUDE: f32 = 8.0;

/// Lowest camera altitude reachable by zooming.
pub const MIN_ALTITUDE: f32 = 4.0;

/// Highest camera altitude reachable by zooming.
pub const MAX_ALTITUDE: f32 = 128.0;

/// Deterministic seed identifying a generated level.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct LevelSeed(u32);

impl LevelSeed {
    /// Creates a new level seed from its raw value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the raw seed value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl From<i32> for LevelSeed {
    /// Reinterprets a signed command-line seed bit-for-bit.
    fn from(value: i32) -> Self {
        Self(value as u32)
    }
}

impl std::fmt::Display for LevelSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cardinal drift directions available to enemies.
///
/// The game plane uses `x` for columns and `y` for rows; rows grow towards the
/// bottom of the screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward increasing `x`.
    East,
    /// Movement toward increasing `y`.
    South,
    /// Movement toward decreasing `x`.
    West,
    /// Movement toward decreasing `y`.
    North,
}

impl Direction {
    /// All directions ordered by their spawn index.
    pub const ALL: [Direction; 4] = [
        Direction::East,
        Direction::South,
        Direction::West,
        Direction::North,
    ];

    /// Maps a spawn index in `0..4` to a direction, wrapping larger values.
    #[must_use]
    pub const fn from_index(index: u32) -> Self {
        Self::ALL[(index % 4) as usize]
    }

    /// Unit step along the game plane for this direction.
    #[must_use]
    pub const fn unit(self) -> (f32, f32) {
        match self {
            Self::East => (1.0, 0.0),
            Self::South => (0.0, 1.0),
            Self::West => (-1.0, 0.0),
            Self::North => (0.0, -1.0),
        }
    }
}

/// Slot of an enemy within the fixed-capacity enemy pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemySlot(u32);

impl EnemySlot {
    /// Creates a new enemy slot with the provided index.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric index of the slot.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Slot of a projectile within the projectile ring.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileSlot(u32);

impl ProjectileSlot {
    /// Creates a new projectile slot with the provided index.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric index of the slot.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row indices.
///
/// Indices are offset by [`GRID_HALF_EXTENT`] so world coordinate `-100`
/// maps to index `0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Resolves the cell containing a world-space point, if it lies on the grid.
    #[must_use]
    pub fn containing(x: f32, y: f32) -> Option<Self> {
        let column = x.floor() as i64 + i64::from(GRID_HALF_EXTENT);
        let row = y.floor() as i64 + i64::from(GRID_HALF_EXTENT);
        let bound = i64::from(GRID_CELLS);
        if (0..bound).contains(&column) && (0..bound).contains(&row) {
            Some(Self::new(column as u32, row as u32))
        } else {
            None
        }
    }

    /// Resolves the cell anchored at integer world coordinates.
    #[must_use]
    pub fn at_world(x: i32, y: i32) -> Option<Self> {
        Self::containing(x as f32, y as f32)
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// World-space `x` coordinate of the cell's lower corner.
    #[must_use]
    pub const fn world_x(&self) -> i32 {
        self.column as i32 - GRID_HALF_EXTENT
    }

    /// World-space `y` coordinate of the cell's lower corner.
    #[must_use]
    pub const fn world_y(&self) -> i32 {
        self.row as i32 - GRID_HALF_EXTENT
    }
}

/// Target cell that ends the current level when the player reaches it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    /// World-space `x` coordinate of the objective.
    pub x: i32,
    /// World-space `y` coordinate of the objective.
    pub y: i32,
    /// Score awarded on arrival, fixed when the objective is placed.
    pub reward: f32,
}

/// Reasons a level ends without reaching the objective.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeathCause {
    /// The player left the world bounds.
    FellOffEdge,
    /// The level timer expired.
    TimeUp,
    /// An enemy touched the player.
    HuggedByEnemy,
    /// The player walked into one of their own projectiles.
    OwnBullet,
    /// The player asked for a new level.
    Abandoned,
}

impl DeathCause {
    /// Line printed when the run transitions because of this cause.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::FellOffEdge => {
                "You fell off the edge and died. Maybe that wasn't such a bad thing."
            }
            Self::TimeUp => "Time is up. Disappointing.",
            Self::HuggedByEnemy => {
                "You gave that square a hug. He gave you a hug. Now you are dead. Congratulations."
            }
            Self::OwnBullet => "You just ran right into your own bullet. You cheating bastard.",
            Self::Abandoned => "Creating new level. Wuss...",
        }
    }

    /// Reports whether this cause ends the run rather than just the level.
    #[must_use]
    pub const fn is_fatal(self) -> bool {
        !matches!(self, Self::Abandoned)
    }
}

/// Line printed when the player reaches the objective.
pub const OBJECTIVE_MESSAGE: &str =
    "You got to the objective. Your parents will finally be proud of you.";

/// Reasons an enemy is removed from the pool without being shot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DespawnReason {
    /// The enemy drifted too far from the player.
    Strayed,
    /// The enemy left the playfield.
    LeftPlayfield,
    /// The enemy walked into a building.
    HitBuilding,
}

/// Lifecycle phase of the current level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RunPhase {
    /// No level has been generated yet.
    Idle,
    /// The level is being simulated.
    Playing,
    /// The player reached the objective and awaits the next level.
    LevelComplete,
    /// The level ended for the provided reason and awaits the next level.
    Dead(DeathCause),
}

/// Held intents sampled from the input devices for a single tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerIntent {
    /// Move toward decreasing `y` (W).
    pub north: bool,
    /// Move toward increasing `y` (S).
    pub south: bool,
    /// Move toward decreasing `x` (A).
    pub west: bool,
    /// Move toward increasing `x` (D).
    pub east: bool,
    /// Move along the aim direction (right mouse button).
    pub advance: bool,
    /// Lower the camera (left shift).
    pub zoom_in: bool,
    /// Raise the camera (left control).
    pub zoom_out: bool,
}

/// Integer spawn offset relative to the player's truncated position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SpawnOffset {
    /// Offset along `x`.
    pub dx: i32,
    /// Offset along `y`.
    pub dy: i32,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Starts a fresh run on the level generated from the provided seed.
    StartRun {
        /// Seed of the first level.
        seed: LevelSeed,
    },
    /// Regenerates the world from the seed captured when the current level started.
    AdvanceLevel,
    /// Replaces the held intents consumed by the next tick.
    SetIntent {
        /// Intents sampled for the tick.
        intent: PlayerIntent,
    },
    /// Points the player's aim.
    Aim {
        /// Aim heading in degrees, measured clockwise on screen from `+x`.
        heading: f32,
    },
    /// Fires a projectile from the player's muzzle along the current aim.
    Fire,
    /// Zooms the camera using a scroll wheel offset.
    ScrollZoom {
        /// Vertical wheel offset; positive values zoom in.
        offset: f32,
    },
    /// Activates the first free enemy slot near the player.
    SpawnEnemy {
        /// Offset from the player's truncated position.
        offset: SpawnOffset,
        /// Fixed drift direction for the enemy.
        direction: Direction,
    },
    /// Ends the current level on request.
    AbandonLevel,
    /// Moves the player to the provided game-plane position.
    PlacePlayer {
        /// Target `x` coordinate.
        x: f32,
        /// Target `y` coordinate on the game plane.
        z: f32,
    },
    /// Advances the simulation by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that a freshly generated level became active.
    LevelStarted {
        /// Seed that generated the level.
        seed: LevelSeed,
        /// Seed reserved for the following level.
        next_seed: LevelSeed,
        /// Objective placed on the level.
        objective: Objective,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
        /// Index of the tick that was simulated.
        tick: u64,
    },
    /// Confirms that an enemy was activated.
    EnemySpawned {
        /// Slot occupied by the enemy.
        slot: EnemySlot,
        /// Direction the enemy will drift in.
        direction: Direction,
    },
    /// Reports that a spawn request was dropped because the pool is full.
    EnemyPoolExhausted,
    /// Reports that an enemy left the pool without being shot.
    EnemyDespawned {
        /// Slot that was released.
        slot: EnemySlot,
        /// Reason the enemy was removed.
        reason: DespawnReason,
    },
    /// Reports that a projectile destroyed an enemy.
    EnemyShot {
        /// Slot of the destroyed enemy.
        enemy: EnemySlot,
        /// Slot of the projectile that hit it.
        projectile: ProjectileSlot,
        /// Score awarded for the kill.
        reward: f32,
    },
    /// Confirms that a projectile was written into the ring.
    ProjectileFired {
        /// Slot written by the ring cursor.
        slot: ProjectileSlot,
    },
    /// Reports that a projectile left the playfield or struck a building.
    ProjectileExpired {
        /// Slot of the projectile that was deactivated.
        slot: ProjectileSlot,
    },
    /// Reports that the enemy speed ramped up.
    DifficultyRaised {
        /// Enemy speed after the increment.
        enemy_speed: f32,
    },
    /// Reports that the level ended without reaching the objective.
    RunEnded {
        /// Reason the level ended.
        cause: DeathCause,
        /// Score held when the level ended.
        score: u64,
    },
    /// Reports that the player reached the objective.
    ObjectiveReached {
        /// Score awarded for the objective.
        reward: f32,
        /// Score after the award.
        score: u64,
    },
}
