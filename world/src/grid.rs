//! Dense occupancy grid answering every building collision query.

use yogo_core::{CellCoord, GRID_CELLS};

/// Boolean occupancy map covering the whole playfield.
///
/// A cell is occupied when any building footprint covers it. Lookups that
/// fall outside the grid report the cell as free so that the player can walk
/// off the edge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OccupancyGrid {
    columns: u32,
    rows: u32,
    cells: Vec<bool>,
}

impl OccupancyGrid {
    /// Creates an empty grid spanning the whole playfield.
    #[must_use]
    pub fn new() -> Self {
        Self::with_dimensions(GRID_CELLS, GRID_CELLS)
    }

    pub(crate) fn with_dimensions(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![false; capacity],
        }
    }

    /// Marks every cell as free.
    pub(crate) fn clear(&mut self) {
        self.cells.fill(false);
    }

    /// Marks the provided cell as covered by a building.
    pub(crate) fn occupy(&mut self, cell: CellCoord) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = true;
            }
        }
    }

    /// Reports whether the provided cell is covered by a building.
    #[must_use]
    pub fn is_occupied(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or(false)
    }

    /// Reports whether the world-space point lies on a building cell.
    #[must_use]
    pub fn is_blocked_at(&self, x: f32, y: f32) -> bool {
        CellCoord::containing(x, y).map_or(false, |cell| self.is_occupied(cell))
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| **cell).count()
    }

    /// Iterates over every occupied cell in row-major order.
    pub fn occupied_cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        let columns = self.columns;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, occupied)| **occupied)
            .map(move |(index, _)| {
                let index = index as u32;
                CellCoord::new(index % columns, index / columns)
            })
    }

    /// Dimensions of the grid expressed as columns and rows.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    pub(crate) fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

impl Default for OccupancyGrid {
    fn default() -> Self {
        Self::new()
    }
}
