/// Grid: the cell-type matrix of a loaded level.
///
/// ## Layers
///
/// Two layers, like a save point and a working copy:
///   - `base`  — the level as loaded. **Never mutated** after construction.
///   - `cells` — the effective state (base + player edits).
///
/// All mutations go through `set_cell()`, which returns the `CellMutation`
/// the host needs to stay in sync. `reset()` copies `base` back over
/// `cells` and reports every cell that changed.
///
/// Coordinates are `(row, col)`, row-major, `(0, 0)` top-left.

use log::error;

use super::cell::CellType;
use crate::error::GridError;

pub const DEFAULT_ROWS: usize = 12;
pub const DEFAULT_COLS: usize = 16;

/// One changed cell. The only channel through which a host learns about
/// grid edits.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CellMutation {
    pub row: usize,
    pub col: usize,
    pub old: CellType,
    pub new: CellType,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct GridDims {
    pub rows: usize,
    pub cols: usize,
}

impl Default for GridDims {
    fn default() -> Self {
        GridDims { rows: DEFAULT_ROWS, cols: DEFAULT_COLS }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    base: Vec<Vec<CellType>>,
    cells: Vec<Vec<CellType>>,
    rows: usize,
    cols: usize,
}

impl Grid {
    /// Build from already-validated rows. Every row must have the same length.
    pub(crate) fn from_rows(rows: Vec<Vec<CellType>>) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        debug_assert!(rows.iter().all(|r| r.len() == width));
        Grid { base: rows.clone(), cells: rows, rows: height, cols: width }
    }

    /// An all-empty grid.
    pub fn empty(dims: GridDims) -> Self {
        Grid::from_rows(vec![vec![CellType::Empty; dims.cols]; dims.rows])
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn dims(&self) -> GridDims {
        GridDims { rows: self.rows, cols: self.cols }
    }

    #[inline]
    pub fn in_bounds(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    /// Checked lookup for rule code: `None` off the grid.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<CellType> {
        self.cells.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Strict lookup: off-grid access is an error, never wrapped or clamped.
    pub fn cell_at(&self, row: usize, col: usize) -> Result<CellType, GridError> {
        self.get(row, col).ok_or(GridError::OutOfBounds {
            row,
            col,
            rows: self.rows,
            cols: self.cols,
        })
    }

    /// Write one cell. Returns the mutation, or `None` when nothing changed.
    ///
    /// Callers validate coordinates first. An off-grid write is a logic
    /// error: it asserts in debug builds and is logged and skipped in release.
    pub fn set_cell(&mut self, row: usize, col: usize, ty: CellType) -> Option<CellMutation> {
        if !self.in_bounds(row, col) {
            debug_assert!(false, "set_cell({row}, {col}) outside {}x{} grid", self.rows, self.cols);
            error!("set_cell({row}, {col}) outside {}x{} grid; ignored", self.rows, self.cols);
            return None;
        }
        let old = self.cells[row][col];
        if old == ty {
            return None;
        }
        self.cells[row][col] = ty;
        Some(CellMutation { row, col, old, new: ty })
    }

    /// Restore the loaded layout, reporting each cell that was reverted.
    pub fn reset(&mut self) -> Vec<CellMutation> {
        let mut mutations = vec![];
        for (row, (cur, base)) in self.cells.iter_mut().zip(&self.base).enumerate() {
            for (col, (cell, &orig)) in cur.iter_mut().zip(base).enumerate() {
                if *cell != orig {
                    mutations.push(CellMutation { row, col, old: *cell, new: orig });
                    *cell = orig;
                }
            }
        }
        mutations
    }

    /// Row-major iteration over `(row, col, cell)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, CellType)> + '_ {
        self.cells.iter().enumerate().flat_map(|(row, r)| {
            r.iter().enumerate().map(move |(col, &cell)| (row, col, cell))
        })
    }
}
