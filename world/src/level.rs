//! Seeded level generation: buildings, occupancy and objective placement.

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use yogo_core::{CellCoord, LevelSeed, Objective, GRID_HALF_EXTENT, NUM_BUILDINGS};

use crate::grid::OccupancyGrid;

/// Cells with both coordinates inside this radius stay free for the player to spawn.
const SPAWN_RESERVE: i32 = 5;

/// Objectives must lie strictly inside this radius on both axes.
const OBJECTIVE_LIMIT: i32 = 90;

/// Random objective draws attempted before falling back to a scan.
const OBJECTIVE_ATTEMPTS: usize = 65_536;

/// Errors raised while generating a level.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LevelError {
    /// Every candidate objective position was covered by buildings.
    #[error("no free 2x2 block is available for the objective of level {seed}")]
    NoObjectiveCell {
        /// Seed of the level that could not be completed.
        seed: LevelSeed,
    },
}

/// Axis-aligned building box standing on the ground plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Building {
    /// Lower `x` corner of the footprint.
    pub x: f32,
    /// Lower `y` corner of the footprint.
    pub y: f32,
    /// Upper `x` corner of the footprint.
    pub x_end: f32,
    /// Upper `y` corner of the footprint.
    pub y_end: f32,
    /// Height of the box, at least one unit.
    pub height: f32,
}

/// Output of a single generator run.
#[derive(Debug)]
pub(crate) struct Layout {
    pub(crate) next_seed: LevelSeed,
    pub(crate) objective: Objective,
}

/// Rebuilds `grid` and `buildings` for `seed` and places the objective.
///
/// The seed for the following level is drawn before any building so that the
/// seed chain does not depend on how many buildings were generated.
pub(crate) fn generate(
    seed: LevelSeed,
    objective_weight: f32,
    grid: &mut OccupancyGrid,
    buildings: &mut Vec<Building>,
) -> Result<Layout, LevelError> {
    let mut rng = ChaCha8Rng::seed_from_u64(u64::from(seed.get()));
    let next_seed = LevelSeed::new(rng.next_u32());

    grid.clear();
    buildings.clear();

    for _ in 0..NUM_BUILDINGS {
        let x: i32 = rng.gen_range(-GRID_HALF_EXTENT..GRID_HALF_EXTENT);
        let y: i32 = rng.gen_range(-GRID_HALF_EXTENT..GRID_HALF_EXTENT);
        let size: u32 = rng.gen_range(1..=19);
        let side = footprint_side(size);

        if overlaps_spawn_reserve(x, side) && overlaps_spawn_reserve(y, side) {
            continue;
        }

        let x_end = (x + side).min(GRID_HALF_EXTENT);
        let y_end = (y + side).min(GRID_HALF_EXTENT);
        for cell_y in y..y_end {
            for cell_x in x..x_end {
                if let Some(cell) = CellCoord::at_world(cell_x, cell_y) {
                    grid.occupy(cell);
                }
            }
        }

        buildings.push(Building {
            x: x as f32,
            y: y as f32,
            x_end: x_end as f32,
            y_end: y_end as f32,
            height: size as f32,
        });
    }

    let (x, y) = place_objective(&mut rng, grid).ok_or(LevelError::NoObjectiveCell { seed })?;
    let objective = Objective {
        x,
        y,
        reward: (x.abs() + y.abs()) as f32 * objective_weight,
    };

    log::debug!(
        "generated level {seed}: {} buildings, {} occupied cells, objective at ({x}, {y})",
        buildings.len(),
        grid.occupied_count()
    );

    Ok(Layout {
        next_seed,
        objective,
    })
}

fn footprint_side(size: u32) -> i32 {
    if size > 15 {
        4
    } else if size > 10 {
        2
    } else {
        1
    }
}

fn overlaps_spawn_reserve(start: i32, side: i32) -> bool {
    start < SPAWN_RESERVE && start + side > -SPAWN_RESERVE + 1
}

fn place_objective(rng: &mut ChaCha8Rng, grid: &OccupancyGrid) -> Option<(i32, i32)> {
    for _ in 0..OBJECTIVE_ATTEMPTS {
        let x: i32 = rng.gen_range(-GRID_HALF_EXTENT..GRID_HALF_EXTENT);
        let y: i32 = rng.gen_range(-GRID_HALF_EXTENT..GRID_HALF_EXTENT);
        if is_valid_objective(grid, x, y) {
            return Some((x, y));
        }
    }

    log::warn!("objective draws exhausted, scanning for a free block");
    let limit = OBJECTIVE_LIMIT - 1;
    (-limit..=limit)
        .flat_map(|y| (-limit..=limit).map(move |x| (x, y)))
        .find(|&(x, y)| is_valid_objective(grid, x, y))
}

/// Reports whether `(x, y)` may hold the objective.
///
/// The objective quad covers the cells anchored at `x - 1..=x` and `y - 1..=y`.
pub(crate) fn is_valid_objective(grid: &OccupancyGrid, x: i32, y: i32) -> bool {
    if x.abs() >= OBJECTIVE_LIMIT || y.abs() >= OBJECTIVE_LIMIT {
        return false;
    }

    [(x, y), (x - 1, y), (x, y - 1), (x - 1, y - 1)]
        .into_iter()
        .all(|(cell_x, cell_y)| {
            CellCoord::at_world(cell_x, cell_y).map_or(false, |cell| !grid.is_occupied(cell))
        })
}
