/// Error types for level loading, grid access and the session boundary.
///
/// In-game rule violations (walking into a wall, destroying a permanent
/// block) are never errors; they resolve to no-ops inside the rules.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Level data could not be turned into a grid. The load is aborted and no
/// partial grid is installed.
#[derive(Debug, Error, Clone)]
pub enum LevelError {
    #[error("malformed level: row {row} has {found} cells, expected {expected}")]
    RowLength { row: usize, found: usize, expected: usize },

    #[error("malformed level: invalid character {ch:?} at row {row}, column {col}")]
    InvalidChar { row: usize, col: usize, ch: char },

    #[error("malformed level: found {found} rows, expected {expected}")]
    RowCount { found: usize, expected: usize },

    #[error("malformed level: row {row} is blank")]
    BlankRow { row: usize },

    #[error("{which} spawn ({row}, {col}) lies outside the grid")]
    Spawn { which: &'static str, row: usize, col: usize },

    #[error("could not read level file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: Arc<std::io::Error>,
    },
}

impl LevelError {
    /// True for every variant caused by bad level content rather than I/O
    /// or spawn settings.
    pub fn is_malformed(&self) -> bool {
        !matches!(self, LevelError::Io { .. } | LevelError::Spawn { .. })
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    #[error("cell ({row}, {col}) is outside the {rows}x{cols} grid")]
    OutOfBounds { row: usize, col: usize, rows: usize, cols: usize },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IntentError {
    #[error("unrecognized intent tag {0:?}")]
    Unrecognized(String),
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    #[error("no level is loaded")]
    NotReady,
}
