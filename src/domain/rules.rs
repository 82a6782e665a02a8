/// Movement and stardust rules — truth-table driven.
///
/// Pure functions over the grid and a player position, with no side effects.
/// Each returns an outcome describing what *would* happen; `sim::step`
/// applies it. Every coordinate is bounds-checked before it is read, and an
/// off-grid target always resolves to the inert outcome.
///
/// ## Horizontal (Left / Right)
/// ┌──────────────────────────┬──────────────┬──────────────────┐
/// │ Condition                 │ Outcome      │ Notes            │
/// ├──────────────────────────┼──────────────┼──────────────────┤
/// │ Dest column off the grid  │ Edge         │ nothing changes  │
/// │ Dest cell Empty           │ Step         │ face travel dir  │
/// │ Dest cell portal          │ Portal       │ step, then reset │
/// │ Otherwise                 │ Blocked      │ turn in place    │
/// └──────────────────────────┴──────────────┴──────────────────┘
///
/// ## Fall (every tick)
/// ┌──────────────────────────┬──────────────┐
/// │ Condition                 │ Outcome      │
/// ├──────────────────────────┼──────────────┤
/// │ Already on last row       │ OffMap       │
/// │ Below Empty               │ Drop         │
/// │ Otherwise                 │ Stay         │
/// └──────────────────────────┴──────────────┘
///
/// ## Place / Destroy (facing cell, or the cell below for the Down flavour)
/// ┌──────────────────────────────────────────┬──────────┐
/// │ Target                                     │ Outcome  │
/// ├──────────────────────────────────────────┼──────────┤
/// │ Off the grid                               │ Inert    │
/// │ Empty                                      │ Place    │
/// │ Blue / Destroyable / Green stardust        │ Remove   │
/// │ Anything else                              │ Inert    │
/// └──────────────────────────────────────────┴──────────┘
///
/// ## Raise
/// ┌──────────────────────────────────────────┬──────────┐
/// │ Condition (priority order)                 │ Outcome  │
/// ├──────────────────────────────────────────┼──────────┤
/// │ Below is GreenStardust                     │ Retract  │
/// │ Below non-Empty AND above Empty            │ Climb    │
/// │ Otherwise (incl. top/bottom row)           │ Inert    │
/// └──────────────────────────────────────────┴──────────┘
///
/// Climb moves the player first and then stamps the vacated cell; the
/// stamped cell is the one the player stood in, not the one below it.

use super::cell::CellType;
use super::grid::Grid;
use super::player::Position;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveOutcome {
    /// Target is off the grid.
    Edge,
    /// Target is on the grid but not enterable.
    Blocked,
    Step(Position),
    /// Stepped onto a portal at this position; the player is reset.
    Portal(Position),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FallOutcome {
    Stay,
    Drop(Position),
    OffMap,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ActionOutcome {
    Inert,
    Place(Position),
    Remove(Position),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RaiseOutcome {
    Inert,
    Retract(Position),
    Climb { to: Position, stamp: Position },
}

fn neighbour_col(col: usize, left: bool) -> Option<usize> {
    if left { col.checked_sub(1) } else { col.checked_add(1) }
}

// ── Movement ──

pub fn horizontal(grid: &Grid, at: Position, left: bool) -> MoveOutcome {
    let Some(col) = neighbour_col(at.col, left) else { return MoveOutcome::Edge };
    let Some(target) = grid.get(at.row, col) else { return MoveOutcome::Edge };
    let dest = Position::new(at.row, col);
    if target.is_passable() {
        MoveOutcome::Step(dest)
    } else if target.is_portal() {
        MoveOutcome::Portal(dest)
    } else {
        MoveOutcome::Blocked
    }
}

pub fn fall(grid: &Grid, at: Position) -> FallOutcome {
    let below = at.row + 1;
    if below >= grid.rows() {
        return FallOutcome::OffMap;
    }
    match grid.get(below, at.col) {
        Some(cell) if cell.is_passable() => FallOutcome::Drop(Position::new(below, at.col)),
        _ => FallOutcome::Stay,
    }
}

// ── Stardust actions ──

/// The cell a Place/Destroy action addresses, if it lies on the grid.
pub fn facing_cell(grid: &Grid, at: Position, facing_left: bool, down: bool) -> Option<Position> {
    let col = neighbour_col(at.col, facing_left)?;
    let row = if down { at.row + 1 } else { at.row };
    grid.in_bounds(row, col).then_some(Position::new(row, col))
}

pub fn place_or_destroy(grid: &Grid, at: Position, facing_left: bool, down: bool) -> ActionOutcome {
    let Some(target) = facing_cell(grid, at, facing_left, down) else {
        return ActionOutcome::Inert;
    };
    match grid.get(target.row, target.col) {
        Some(CellType::Empty) => ActionOutcome::Place(target),
        Some(cell) if cell.is_removable() => ActionOutcome::Remove(target),
        _ => ActionOutcome::Inert,
    }
}

pub fn raise(grid: &Grid, at: Position) -> RaiseOutcome {
    let below = Position::new(at.row + 1, at.col);
    let Some(under) = grid.get(below.row, below.col) else { return RaiseOutcome::Inert };

    if under == CellType::GreenStardust {
        return RaiseOutcome::Retract(below);
    }
    if under == CellType::Empty {
        return RaiseOutcome::Inert;
    }
    let Some(above_row) = at.row.checked_sub(1) else { return RaiseOutcome::Inert };
    match grid.get(above_row, at.col) {
        Some(CellType::Empty) => RaiseOutcome::Climb {
            to: Position::new(above_row, at.col),
            stamp: at,
        },
        _ => RaiseOutcome::Inert,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::GridDims;

    fn grid_with(cells: &[(usize, usize, CellType)]) -> Grid {
        let mut g = Grid::empty(GridDims::default());
        for &(r, c, t) in cells {
            g.set_cell(r, c, t);
        }
        g
    }

    #[test]
    fn horizontal_truth_table() {
        let g = grid_with(&[
            (5, 4, CellType::PermanentStardust),
            (5, 6, CellType::ExitPortal),
        ]);
        let at = Position::new(5, 5);
        assert_eq!(horizontal(&g, at, true), MoveOutcome::Blocked);
        assert_eq!(horizontal(&g, at, false), MoveOutcome::Portal(Position::new(5, 6)));
        assert_eq!(horizontal(&g, Position::new(0, 0), true), MoveOutcome::Edge);
        assert_eq!(horizontal(&g, Position::new(0, 15), false), MoveOutcome::Edge);
        assert_eq!(horizontal(&g, Position::new(0, 3), false), MoveOutcome::Step(Position::new(0, 4)));
    }

    #[test]
    fn every_solid_type_blocks_movement() {
        for &ty in CellType::all() {
            if ty.is_passable() || ty.is_portal() {
                continue;
            }
            let g = grid_with(&[(1, 1, ty)]);
            assert_eq!(horizontal(&g, Position::new(1, 0), false), MoveOutcome::Blocked, "{ty:?}");
        }
    }

    #[test]
    fn fall_truth_table() {
        let g = grid_with(&[(4, 2, CellType::Fallwall)]);
        assert_eq!(fall(&g, Position::new(3, 2)), FallOutcome::Stay);
        assert_eq!(fall(&g, Position::new(2, 2)), FallOutcome::Drop(Position::new(3, 2)));
        assert_eq!(fall(&g, Position::new(11, 0)), FallOutcome::OffMap);
    }

    #[test]
    fn facing_cell_respects_both_axes() {
        let g = Grid::empty(GridDims::default());
        assert_eq!(facing_cell(&g, Position::new(3, 3), true, false), Some(Position::new(3, 2)));
        assert_eq!(facing_cell(&g, Position::new(3, 3), false, true), Some(Position::new(4, 4)));
        assert_eq!(facing_cell(&g, Position::new(3, 0), true, false), None);
        assert_eq!(facing_cell(&g, Position::new(11, 3), false, true), None);
    }

    #[test]
    fn place_or_destroy_truth_table() {
        let g = grid_with(&[
            (2, 3, CellType::DestroyableStardust),
            (2, 1, CellType::StarBlock),
        ]);
        let at = Position::new(2, 2);
        assert_eq!(place_or_destroy(&g, at, false, false), ActionOutcome::Remove(Position::new(2, 3)));
        assert_eq!(place_or_destroy(&g, at, true, false), ActionOutcome::Inert);
        assert_eq!(place_or_destroy(&g, at, false, true), ActionOutcome::Place(Position::new(3, 3)));
    }

    #[test]
    fn raise_truth_table() {
        let g = grid_with(&[
            (6, 1, CellType::GreenStardust),
            (6, 2, CellType::PermanentStardust),
            (6, 3, CellType::PermanentStardust),
            (4, 3, CellType::StarBlock),
        ]);
        assert_eq!(raise(&g, Position::new(5, 1)), RaiseOutcome::Retract(Position::new(6, 1)));
        assert_eq!(
            raise(&g, Position::new(5, 2)),
            RaiseOutcome::Climb { to: Position::new(4, 2), stamp: Position::new(5, 2) }
        );
        // blocked above
        assert_eq!(raise(&g, Position::new(5, 3)), RaiseOutcome::Inert);
        // nothing below
        assert_eq!(raise(&g, Position::new(2, 5)), RaiseOutcome::Inert);
        // bottom row has no cell below
        assert_eq!(raise(&g, Position::new(11, 5)), RaiseOutcome::Inert);
    }

    #[test]
    fn raise_on_top_row_is_inert() {
        let g = grid_with(&[(1, 0, CellType::PermanentStardust)]);
        assert_eq!(raise(&g, Position::new(0, 0)), RaiseOutcome::Inert);
    }
}
