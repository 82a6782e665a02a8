/// Cell semantics, the grid, the player and the pure movement rules.

pub mod cell;
pub mod grid;
pub mod intent;
pub mod player;
pub mod rules;
