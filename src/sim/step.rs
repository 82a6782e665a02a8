/// The step function: advances a loaded world by one tick.
///
/// Processing order:
///   1. Intent resolution (already debounced by the session)
///   2. Gravity resolution (every tick, never debounced)
///
/// Legality comes from `rules::*` (pure); this module performs the writes.
/// Grid writes go through `Grid::set_cell()` so every change yields exactly
/// one `CellMutation`. The player is written only here.

use log::debug;

use crate::domain::cell::CellType;
use crate::domain::intent::Intent;
use crate::domain::rules::{self, ActionOutcome, FallOutcome, MoveOutcome, RaiseOutcome};
use super::event::{CellMutation, Teleport, TickReport};
use super::world::World;

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut World, intent: Option<Intent>) -> TickReport {
    let mut mutations: Vec<CellMutation> = Vec::new();
    let mut teleport = None;

    match intent {
        Some(Intent::MoveLeft) => resolve_move(world, true, &mut teleport),
        Some(Intent::MoveRight) => resolve_move(world, false, &mut teleport),
        Some(Intent::PlaceOrDestroy) => resolve_action(world, false, &mut mutations),
        Some(Intent::PlaceOrDestroyDown) => resolve_action(world, true, &mut mutations),
        Some(Intent::RaiseGreenStardust) => resolve_raise(world, &mut mutations),
        None => {}
    }
    resolve_gravity(world, &mut teleport);

    TickReport {
        position: world.player.position(),
        facing_left: world.player.facing_left(),
        mutations,
        teleport,
        accepted: intent.is_some(),
    }
}

// ══════════════════════════════════════════════════════════════
// Horizontal movement
// ══════════════════════════════════════════════════════════════

fn resolve_move(world: &mut World, left: bool, teleport: &mut Option<Teleport>) {
    match rules::horizontal(&world.grid, world.player.position(), left) {
        MoveOutcome::Edge => {}
        MoveOutcome::Blocked => world.player.face(left),
        MoveOutcome::Step(dest) => {
            world.player.set_col(dest.col);
            world.player.face(left);
        }
        MoveOutcome::Portal(dest) => {
            world.player.set_col(dest.col);
            world.player.face(left);
            let reset = world.spawns.portal_reset;
            debug!("portal at ({}, {}); reset to ({}, {})", dest.row, dest.col, reset.row, reset.col);
            world.player.teleport_to(reset);
            *teleport = Some(Teleport::PortalReset);
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Place / destroy
// ══════════════════════════════════════════════════════════════

fn resolve_action(world: &mut World, down: bool, mutations: &mut Vec<CellMutation>) {
    let p = &world.player;
    let (pos, ty) = match rules::place_or_destroy(&world.grid, p.position(), p.facing_left(), down) {
        ActionOutcome::Inert => return,
        ActionOutcome::Place(pos) => (pos, CellType::BlueStardust),
        ActionOutcome::Remove(pos) => (pos, CellType::Empty),
    };
    mutations.extend(world.grid.set_cell(pos.row, pos.col, ty));
}

// ══════════════════════════════════════════════════════════════
// Raise / retract green stardust
// ══════════════════════════════════════════════════════════════

fn resolve_raise(world: &mut World, mutations: &mut Vec<CellMutation>) {
    match rules::raise(&world.grid, world.player.position()) {
        RaiseOutcome::Inert => {}
        RaiseOutcome::Retract(below) => {
            mutations.extend(world.grid.set_cell(below.row, below.col, CellType::Empty));
        }
        RaiseOutcome::Climb { to, stamp } => {
            // Move first, then stamp the vacated cell.
            world.player.set_row(to.row);
            mutations.extend(world.grid.set_cell(stamp.row, stamp.col, CellType::GreenStardust));
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Gravity
// ══════════════════════════════════════════════════════════════

fn resolve_gravity(world: &mut World, teleport: &mut Option<Teleport>) {
    match rules::fall(&world.grid, world.player.position()) {
        FallOutcome::Stay => {}
        FallOutcome::Drop(dest) => world.player.set_row(dest.row),
        FallOutcome::OffMap => {
            let recovery = world.spawns.fall_recovery;
            debug!("fell off the map; recover at ({}, {})", recovery.row, recovery.col);
            world.player.teleport_to(recovery);
            *teleport = Some(Teleport::FellOffMap);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::Grid;
    use crate::domain::player::{PlayerState, Position};
    use crate::sim::level::Spawns;

    /// Empty 12x16 world with a permanent floor on row 10 and the player at `at`.
    fn world_at(at: (usize, usize), cells: &[(usize, usize, CellType)]) -> World {
        let mut rows = vec![vec![CellType::Empty; 16]; 12];
        rows[10] = vec![CellType::PermanentStardust; 16];
        for &(r, c, t) in cells {
            rows[r][c] = t;
        }
        World::new(Grid::from_rows(rows), PlayerState::new(at.into()), Spawns::default(), at.into())
    }

    #[test]
    fn move_onto_empty_updates_position_and_facing() {
        let mut w = world_at((9, 5), &[]);
        let r = step(&mut w, Some(Intent::MoveLeft));
        assert_eq!(r.position, Position::new(9, 4));
        assert!(r.facing_left);
        assert!(r.accepted);
        let r = step(&mut w, Some(Intent::MoveRight));
        assert_eq!(r.position, Position::new(9, 5));
        assert!(!r.facing_left);
    }

    #[test]
    fn wall_blocks_but_turns_player() {
        let mut w = world_at((9, 5), &[(9, 4, CellType::StarBlock)]);
        let r = step(&mut w, Some(Intent::MoveLeft));
        assert_eq!(r.position, Position::new(9, 5));
        assert!(r.facing_left);
        assert!(r.mutations.is_empty());
    }

    #[test]
    fn edge_changes_nothing() {
        let mut w = world_at((9, 0), &[]);
        let r = step(&mut w, Some(Intent::MoveLeft));
        assert_eq!(r.position, Position::new(9, 0));
        assert!(!r.facing_left);
    }

    #[test]
    fn portal_resets_to_fixed_coordinate() {
        let mut w = world_at((9, 5), &[(9, 4, CellType::ExitPortal)]);
        let r = step(&mut w, Some(Intent::MoveLeft));
        assert_eq!(r.teleport, Some(Teleport::PortalReset));
        // (2, 4) has nothing below, so gravity already pulls one row.
        assert_eq!(r.position, Position::new(3, 4));
    }

    #[test]
    fn falls_one_row_per_tick_until_floor() {
        let mut w = world_at((6, 3), &[]);
        for row in 7..=9 {
            assert_eq!(step(&mut w, None).position, Position::new(row, 3));
        }
        let r = step(&mut w, None);
        assert_eq!(r.position, Position::new(9, 3));
        assert!(!r.accepted);
    }

    #[test]
    fn falling_off_last_row_recovers() {
        let mut w = world_at((11, 3), &[]);
        let r = step(&mut w, None);
        assert_eq!(r.teleport, Some(Teleport::FellOffMap));
        assert_eq!(r.position, Position::new(2, 7));
    }

    #[test]
    fn place_then_destroy_round_trip() {
        let mut w = world_at((9, 5), &[]);
        let r = step(&mut w, Some(Intent::PlaceOrDestroy));
        assert_eq!(
            r.mutations,
            vec![CellMutation { row: 9, col: 6, old: CellType::Empty, new: CellType::BlueStardust }]
        );
        let r = step(&mut w, Some(Intent::PlaceOrDestroy));
        assert_eq!(
            r.mutations,
            vec![CellMutation { row: 9, col: 6, old: CellType::BlueStardust, new: CellType::Empty }]
        );
    }

    #[test]
    fn place_down_targets_diagonal_below() {
        let mut w = world_at((8, 5), &[(9, 5, CellType::PermanentStardust)]);
        let r = step(&mut w, Some(Intent::PlaceOrDestroyDown));
        assert_eq!(r.mutations.len(), 1);
        assert_eq!((r.mutations[0].row, r.mutations[0].col), (9, 6));
        assert_eq!(w.grid.get(9, 6), Some(CellType::BlueStardust));
    }

    #[test]
    fn inert_targets_do_nothing() {
        let mut w = world_at((9, 5), &[(9, 6, CellType::PurpleStarWall)]);
        let r = step(&mut w, Some(Intent::PlaceOrDestroy));
        assert!(r.mutations.is_empty());
        assert_eq!(w.grid.get(9, 6), Some(CellType::PurpleStarWall));
    }

    #[test]
    fn raise_climbs_then_retracts() {
        let mut w = world_at((9, 5), &[]);
        let r = step(&mut w, Some(Intent::RaiseGreenStardust));
        assert_eq!(r.position, Position::new(8, 5));
        assert_eq!(
            r.mutations,
            vec![CellMutation { row: 9, col: 5, old: CellType::Empty, new: CellType::GreenStardust }]
        );

        // Retracting does not move the player; gravity then drops them
        // into the cleared cell in the same tick.
        let r = step(&mut w, Some(Intent::RaiseGreenStardust));
        assert_eq!(
            r.mutations,
            vec![CellMutation { row: 9, col: 5, old: CellType::GreenStardust, new: CellType::Empty }]
        );
        assert_eq!(r.position, Position::new(9, 5));
    }

    #[test]
    fn raise_with_blocked_head_is_inert() {
        let mut w = world_at((9, 5), &[(8, 5, CellType::Fallwall)]);
        let r = step(&mut w, Some(Intent::RaiseGreenStardust));
        assert_eq!(r.position, Position::new(9, 5));
        assert!(r.mutations.is_empty());
    }
}
