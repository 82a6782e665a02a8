/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use std::collections::BTreeMap;
use std::path::PathBuf;

use log::warn;
use serde::Deserialize;

use crate::domain::grid::{GridDims, DEFAULT_COLS, DEFAULT_ROWS};
use crate::domain::intent::Intent;
use crate::domain::player::Position;
use crate::sim::level::{Spawns, DEFAULT_SPAWN, FALL_RECOVERY, PORTAL_RESET};

// ── Public Config Structs ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub rules: RulesConfig,
    pub tick_rate_ms: u64,
    pub keys: KeyConfig,
    pub gamepad: GamepadConfig,
    /// Level file to load; `None` means the embedded level.
    pub level_path: Option<PathBuf>,
}

/// Everything the core needs to run a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RulesConfig {
    pub dims: GridDims,
    pub move_delay_ms: u64,
    pub spawns: Spawns,
}

impl Default for RulesConfig {
    fn default() -> Self {
        RulesConfig {
            dims: GridDims::default(),
            move_delay_ms: default_move_delay(),
            spawns: Spawns::default(),
        }
    }
}

/// Keyboard bindings: key names per intent, plus the two modifiers that
/// turn the action key into its Down / Raise flavours.
#[derive(Clone, Debug)]
pub struct KeyConfig {
    pub bindings: Vec<(Intent, Vec<String>)>,
    pub modifier_up: Vec<String>,
    pub modifier_down: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub action: Vec<String>,
    pub restart: Vec<String>,
    pub quit: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    grid: TomlGrid,
    #[serde(default)]
    spawns: TomlSpawns,
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    keys: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    modifiers: TomlModifiers,
    #[serde(default)]
    gamepad: TomlGamepad,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_move_delay")]
    move_delay_ms: u64,
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlGrid {
    #[serde(default = "default_rows")]
    rows: usize,
    #[serde(default = "default_cols")]
    cols: usize,
}

#[derive(Deserialize, Debug)]
struct TomlSpawns {
    #[serde(default = "default_spawn")]
    default: [usize; 2],
    #[serde(default = "default_portal_reset")]
    portal_reset: [usize; 2],
    #[serde(default = "default_fall_recovery")]
    fall_recovery: [usize; 2],
}

#[derive(Deserialize, Debug, Default)]
struct TomlGeneral {
    #[serde(default)]
    level: Option<String>,
}

#[derive(Deserialize, Debug)]
struct TomlModifiers {
    #[serde(default = "default_mod_up")]
    up: Vec<String>,
    #[serde(default = "default_mod_down")]
    down: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_pad_action")]
    action: Vec<String>,
    #[serde(default = "default_pad_restart")]
    restart: Vec<String>,
    #[serde(default = "default_pad_quit")]
    quit: Vec<String>,
}

// ── Defaults ──

fn default_move_delay() -> u64 { 200 }
fn default_tick_rate() -> u64 { 75 }
fn default_rows() -> usize { DEFAULT_ROWS }
fn default_cols() -> usize { DEFAULT_COLS }
fn default_spawn() -> [usize; 2] { [DEFAULT_SPAWN.row, DEFAULT_SPAWN.col] }
fn default_portal_reset() -> [usize; 2] { [PORTAL_RESET.row, PORTAL_RESET.col] }
fn default_fall_recovery() -> [usize; 2] { [FALL_RECOVERY.row, FALL_RECOVERY.col] }

fn default_mod_up() -> Vec<String> { vec!["Up".into(), "w".into(), "W".into()] }
fn default_mod_down() -> Vec<String> { vec!["Down".into(), "s".into(), "S".into()] }

fn default_pad_action() -> Vec<String> { vec!["A".into(), "X".into()] }
fn default_pad_restart() -> Vec<String> { vec!["Start".into()] }
fn default_pad_quit() -> Vec<String> { vec!["Select".into()] }

fn default_key_bindings() -> Vec<(Intent, Vec<String>)> {
    vec![
        (Intent::MoveLeft, vec!["Left".into(), "a".into(), "A".into()]),
        (Intent::MoveRight, vec!["Right".into(), "d".into(), "D".into()]),
        (Intent::PlaceOrDestroy, vec!["Space".into()]),
        (Intent::PlaceOrDestroyDown, vec!["x".into(), "X".into()]),
        (Intent::RaiseGreenStardust, vec!["c".into(), "C".into()]),
    ]
}

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming { move_delay_ms: default_move_delay(), tick_rate_ms: default_tick_rate() }
    }
}

impl Default for TomlGrid {
    fn default() -> Self {
        TomlGrid { rows: default_rows(), cols: default_cols() }
    }
}

impl Default for TomlSpawns {
    fn default() -> Self {
        TomlSpawns {
            default: default_spawn(),
            portal_reset: default_portal_reset(),
            fall_recovery: default_fall_recovery(),
        }
    }
}

impl Default for TomlModifiers {
    fn default() -> Self {
        TomlModifiers { up: default_mod_up(), down: default_mod_down() }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            action: default_pad_action(),
            restart: default_pad_restart(),
            quit: default_pad_quit(),
        }
    }
}

fn position(pair: [usize; 2]) -> Position {
    Position::new(pair[0], pair[1])
}

// ── Loading ──

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default(), &[])
    }
}

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        GameConfig::from_toml(toml_cfg, &search_dirs)
    }

    /// Parse config text directly. Relative level paths resolve against CWD.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        let toml_cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(GameConfig::from_toml(toml_cfg, &[]))
    }

    fn from_toml(cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let dims = GridDims { rows: cfg.grid.rows, cols: cfg.grid.cols };
        let spawns = Spawns {
            default_spawn: position(cfg.spawns.default),
            portal_reset: position(cfg.spawns.portal_reset),
            fall_recovery: position(cfg.spawns.fall_recovery),
        };

        let level_path = cfg.general.level.and_then(|level| resolve_level(&level, search_dirs));

        GameConfig {
            rules: RulesConfig { dims, move_delay_ms: cfg.timing.move_delay_ms, spawns },
            tick_rate_ms: cfg.timing.tick_rate_ms,
            keys: KeyConfig {
                bindings: resolve_bindings(cfg.keys),
                modifier_up: cfg.modifiers.up,
                modifier_down: cfg.modifiers.down,
            },
            gamepad: GamepadConfig {
                action: cfg.gamepad.action,
                restart: cfg.gamepad.restart,
                quit: cfg.gamepad.quit,
            },
            level_path,
        }
    }
}

/// Resolve the configured level against the candidate dirs, then as given.
/// A file that is found nowhere falls back to the embedded level.
fn resolve_level(level: &str, search_dirs: &[PathBuf]) -> Option<PathBuf> {
    let path = PathBuf::from(level);
    let found = if path.is_absolute() {
        path.is_file().then_some(path)
    } else {
        search_dirs.iter()
            .map(|d| d.join(level))
            .find(|p| p.is_file())
            .or_else(|| path.is_file().then_some(path))
    };
    if found.is_none() {
        warn!("config.toml [general]: level {level:?} not found; using the embedded level");
    }
    found
}

/// Overlay `[keys]` entries on the defaults. Unknown intent tags are
/// reported and skipped.
fn resolve_bindings(overrides: BTreeMap<String, Vec<String>>) -> Vec<(Intent, Vec<String>)> {
    let mut bindings = default_key_bindings();
    for (tag, keys) in overrides {
        match tag.parse::<Intent>() {
            Ok(intent) => {
                if let Some(slot) = bindings.iter_mut().find(|(i, _)| *i == intent) {
                    slot.1 = keys;
                }
            }
            Err(e) => warn!("config.toml [keys]: {e}; ignored"),
        }
    }
    bindings
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        warn!("config.toml parse error: {e}; using default settings");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    warn!("could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = GameConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.rules, RulesConfig::default());
        assert_eq!(cfg.rules.move_delay_ms, 200);
        assert_eq!(cfg.rules.dims, GridDims { rows: 12, cols: 16 });
        assert_eq!(cfg.tick_rate_ms, 75);
        assert_eq!(cfg.level_path, None);
        assert_eq!(cfg.keys.bindings.len(), Intent::ALL.len());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::from_toml_str(
            "[timing]\nmove_delay_ms = 120\n\n[spawns]\nfall_recovery = [1, 1]\n",
        )
        .unwrap();
        assert_eq!(cfg.rules.move_delay_ms, 120);
        assert_eq!(cfg.tick_rate_ms, 75);
        assert_eq!(cfg.rules.spawns.fall_recovery, Position::new(1, 1));
        assert_eq!(cfg.rules.spawns.portal_reset, PORTAL_RESET);
    }

    #[test]
    fn key_overrides_and_unknown_tags() {
        let cfg = GameConfig::from_toml_str(
            "[keys]\nmove_left = [\"j\"]\nteleport = [\"t\"]\n",
        )
        .unwrap();
        let left = cfg.keys.bindings.iter().find(|(i, _)| *i == Intent::MoveLeft).unwrap();
        assert_eq!(left.1, vec!["j".to_string()]);
        assert_eq!(cfg.keys.bindings.len(), Intent::ALL.len());
    }

    #[test]
    fn level_path_is_kept() {
        let cfg = GameConfig::from_toml_str("[general]\nlevel = \"levels/01\"\n").unwrap();
        assert_eq!(cfg.level_path, Some(PathBuf::from("levels/01")));
    }

    #[test]
    fn missing_level_falls_back_to_embedded() {
        let cfg = GameConfig::from_toml_str("[general]\nlevel = \"levels/nope\"\n").unwrap();
        assert_eq!(cfg.level_path, None);

        let dir = tempfile::tempdir().unwrap();
        let absent = dir.path().join("absent");
        assert_eq!(resolve_level(&absent.to_string_lossy(), &[]), None);
    }

    #[test]
    fn level_found_in_search_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("07"), "0").unwrap();
        let dirs = vec![dir.path().to_path_buf()];
        assert_eq!(resolve_level("07", &dirs), Some(dir.path().join("07")));
    }

    #[test]
    fn bad_toml_is_an_error() {
        assert!(GameConfig::from_toml_str("[timing\n").is_err());
    }
}
