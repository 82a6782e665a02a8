/// Level loader.
///
/// ## Sources (priority order):
///   1. Level file given on the command line
///   2. `level` path from `config.toml`
///   3. Built-in embedded level
///
/// ## Level format:
///   ```text
///   2222222222222222
///   2000300000000042
///   ...
///   ```
///
/// Exactly `rows` lines of exactly `cols` characters. No header, footer or
/// checksum. Each line is trimmed before it is read and trailing blank lines
/// are ignored. Anything else that does not fit is rejected outright; rows
/// are never padded or truncated.
///
/// ## Cell legend (digit = `CellType` ordinal):
///   '0' = Empty                 '1' = Destroyable stardust
///   '2' = Permanent stardust    '3' = Entry portal (spawn)
///   '4' = Exit portal           '5' = Warp pocket
///   '6' = Purple star wall      '7' = Star block
///   '8' = Fallwall              '9' = Blue stardust
///
/// Green stardust (ordinal 10) has no single-digit code; it only appears
/// when raised during play.

use std::path::Path;
use std::sync::Arc;

use log::debug;

use crate::domain::cell::CellType;
use crate::domain::grid::{Grid, GridDims};
use crate::domain::player::Position;
use crate::error::LevelError;

/// Spawn used when a level has no entry portal.
pub const DEFAULT_SPAWN: Position = Position::new(2, 4);
/// Where a portal sends the player.
pub const PORTAL_RESET: Position = Position::new(2, 4);
/// Where a player who drops off the bottom row reappears.
pub const FALL_RECOVERY: Position = Position::new(2, 7);

/// Fixed per-level coordinates used by the recovery paths.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Spawns {
    pub default_spawn: Position,
    pub portal_reset: Position,
    pub fall_recovery: Position,
}

impl Default for Spawns {
    fn default() -> Self {
        Spawns {
            default_spawn: DEFAULT_SPAWN,
            portal_reset: PORTAL_RESET,
            fall_recovery: FALL_RECOVERY,
        }
    }
}

impl Spawns {
    /// Every spawn must land on the grid.
    pub fn validate(&self, dims: GridDims) -> Result<(), LevelError> {
        let named = [
            ("default", self.default_spawn),
            ("portal_reset", self.portal_reset),
            ("fall_recovery", self.fall_recovery),
        ];
        for (which, pos) in named {
            if pos.row >= dims.rows || pos.col >= dims.cols {
                return Err(LevelError::Spawn { which, row: pos.row, col: pos.col });
            }
        }
        Ok(())
    }
}

/// A successfully parsed level.
#[derive(Clone, Debug)]
pub struct ParsedLevel {
    pub grid: Grid,
    /// First entry portal in row-major order.
    pub entry: Option<Position>,
}

impl ParsedLevel {
    /// Entry portal if present, else [`DEFAULT_SPAWN`].
    pub fn spawn(&self) -> Position {
        self.spawn_or(DEFAULT_SPAWN)
    }

    pub fn spawn_or(&self, fallback: Position) -> Position {
        self.entry.unwrap_or(fallback)
    }
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Parse level text into a grid of the given dimensions.
pub fn parse(raw: &str, dims: GridDims) -> Result<ParsedLevel, LevelError> {
    let mut lines: Vec<&str> = raw.lines().map(str::trim).collect();
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    if lines.len() != dims.rows {
        return Err(LevelError::RowCount { found: lines.len(), expected: dims.rows });
    }

    let mut rows = Vec::with_capacity(dims.rows);
    let mut entry = None;

    for (r, line) in lines.iter().enumerate() {
        if line.is_empty() {
            return Err(LevelError::BlankRow { row: r });
        }
        let mut row = Vec::with_capacity(dims.cols);
        for (c, ch) in line.chars().enumerate() {
            let cell = CellType::from_digit(ch)
                .ok_or(LevelError::InvalidChar { row: r, col: c, ch })?;
            if cell == CellType::EntryPortal && entry.is_none() {
                entry = Some(Position::new(r, c));
            }
            row.push(cell);
        }
        if row.len() != dims.cols {
            return Err(LevelError::RowLength { row: r, found: row.len(), expected: dims.cols });
        }
        rows.push(row);
    }

    Ok(ParsedLevel { grid: Grid::from_rows(rows), entry })
}

/// Read and parse a level file.
pub fn load_level_file(path: &Path, dims: GridDims) -> Result<ParsedLevel, LevelError> {
    let text = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
        path: path.to_path_buf(),
        source: Arc::new(source),
    })?;
    debug!("read level file {} ({} bytes)", path.display(), text.len());
    parse(&text, dims)
}

// ══════════════════════════════════════════════════════════════
// Embedded fallback level
// ══════════════════════════════════════════════════════════════

/// Level 01, used when no level file is configured or found.
pub fn embedded_level() -> &'static str {
    EMBEDDED_01
}

const EMBEDDED_01: &str = "\
2222222222222222
2000000000000002
2000300000000042
2222222011122222
2000000000000002
2000050000000002
2000000122222002
2000000000000002
2006000000700082
2222220000022222
2000000000000002
2222222002222222
";
