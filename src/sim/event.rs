/// What a tick reports back to the host.
/// The presentation layer consumes these for redraws and sound.

pub use crate::domain::grid::CellMutation;
use crate::domain::player::Position;

/// Why the player was relocated this tick.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Teleport {
    /// Walked onto a portal; sent to the level's reset point.
    PortalReset,
    /// Dropped past the last row; sent to the recovery point.
    FellOffMap,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickReport {
    pub position: Position,
    pub facing_left: bool,
    pub mutations: Vec<CellMutation>,
    /// Last relocation this tick, if any.
    pub teleport: Option<Teleport>,
    /// Whether the submitted intent was applied (false when debounced or absent).
    pub accepted: bool,
}
