//! Stardust: a tile-based puzzle-platformer level simulator.
//!
//! The crate is the rules core only. A host loads a level into a
//! [`Session`], feeds it one [`Intent`] per tick, and redraws from the
//! [`TickReport`] it gets back. Drawing, input polling and sound live in
//! the host (see the `stardust` binary).

pub mod config;
pub mod domain;
pub mod error;
pub mod sim;

pub use config::{GameConfig, RulesConfig};
pub use domain::cell::CellType;
pub use domain::grid::{CellMutation, Grid, GridDims};
pub use domain::intent::Intent;
pub use domain::player::{PlayerState, Position};
pub use error::{GridError, IntentError, LevelError, SessionError};
pub use sim::event::{Teleport, TickReport};
pub use sim::level::{ParsedLevel, Spawns};
pub use sim::world::{LevelState, Session, World};
