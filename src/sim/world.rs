/// Session: the single owner of one level's mutable state.
///
/// ## Readiness
///
/// A session starts `NotLoaded`. `load_level*` either installs a complete
/// `World` (`Loaded`) or records the error (`Failed`); a half-parsed grid
/// is never installed. `tick()` refuses to run unless `Loaded`.
///
/// ## Clock
///
/// Hosts pass elapsed milliseconds into every `tick()`. Intents are accepted
/// at most once per `move_delay_ms`; extra intents inside the window are
/// dropped, not queued. Gravity ignores the window and runs every tick.

use std::path::Path;

use log::{debug, trace, warn};

use crate::config::RulesConfig;
use crate::domain::grid::{CellMutation, Grid};
use crate::domain::intent::Intent;
use crate::domain::player::{PlayerState, Position};
use crate::error::{LevelError, SessionError};
use super::event::TickReport;
use super::level::{self, ParsedLevel, Spawns};
use super::step;

/// Grid, player and spawn points of a loaded level.
#[derive(Clone, Debug)]
pub struct World {
    pub grid: Grid,
    pub player: PlayerState,
    pub spawns: Spawns,
    /// Where the player started (entry portal or default spawn).
    pub spawn: Position,
}

impl World {
    pub fn new(grid: Grid, player: PlayerState, spawns: Spawns, spawn: Position) -> Self {
        World { grid, player, spawns, spawn }
    }
}

#[derive(Debug)]
pub enum LevelState {
    NotLoaded,
    Loaded(World),
    Failed(LevelError),
}

/// Debounce gate for intents.
#[derive(Clone, Copy, Debug, Default)]
struct MoveClock {
    now_ms: u64,
    last_accepted: Option<u64>,
}

impl MoveClock {
    fn advance(&mut self, elapsed_ms: u64) {
        self.now_ms = self.now_ms.saturating_add(elapsed_ms);
    }

    fn ready(&self, delay_ms: u64) -> bool {
        self.last_accepted.map_or(true, |t| self.now_ms - t >= delay_ms)
    }

    fn accept(&mut self) {
        self.last_accepted = Some(self.now_ms);
    }
}

#[derive(Debug)]
pub struct Session {
    rules: RulesConfig,
    state: LevelState,
    clock: MoveClock,
}

// ── Construction / loading ──

impl Session {
    pub fn new(rules: RulesConfig) -> Self {
        Session { rules, state: LevelState::NotLoaded, clock: MoveClock::default() }
    }

    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    /// Parse and install a level from text.
    pub fn load_level(&mut self, raw: &str) -> Result<(), LevelError> {
        let parsed = level::parse(raw, self.rules.dims);
        self.install(parsed)
    }

    /// Read, parse and install a level file.
    pub fn load_level_file(&mut self, path: &Path) -> Result<(), LevelError> {
        let parsed = level::load_level_file(path, self.rules.dims);
        self.install(parsed)
    }

    fn install(&mut self, parsed: Result<ParsedLevel, LevelError>) -> Result<(), LevelError> {
        let built = parsed.and_then(|level| {
            self.rules.spawns.validate(self.rules.dims)?;
            Ok(level)
        });
        let level = match built {
            Ok(level) => level,
            Err(e) => {
                warn!("level load failed: {e}");
                self.state = LevelState::Failed(e.clone());
                return Err(e);
            }
        };

        let spawn = level.spawn_or(self.rules.spawns.default_spawn);
        if level.entry.is_none() {
            debug!("no entry portal; spawning at default ({}, {})", spawn.row, spawn.col);
        }
        self.state = LevelState::Loaded(World::new(
            level.grid,
            PlayerState::new(spawn),
            self.rules.spawns,
            spawn,
        ));
        self.clock = MoveClock::default();
        debug!("level loaded; player at ({}, {})", spawn.row, spawn.col);
        Ok(())
    }
}

// ── Tick ──

impl Session {
    /// Advance the session by `elapsed_ms` and apply `intent` if the
    /// debounce window allows it. Gravity runs regardless.
    pub fn tick(&mut self, elapsed_ms: u64, intent: Option<Intent>) -> Result<TickReport, SessionError> {
        let LevelState::Loaded(world) = &mut self.state else {
            return Err(SessionError::NotReady);
        };

        self.clock.advance(elapsed_ms);
        let gated = match intent {
            Some(i) if self.clock.ready(self.rules.move_delay_ms) => {
                self.clock.accept();
                Some(i)
            }
            Some(i) => {
                trace!("dropped {i} inside move delay window");
                None
            }
            None => None,
        };

        Ok(step::step(world, gated))
    }

    /// Restore the level as loaded and respawn the player.
    pub fn restart(&mut self) -> Result<Vec<CellMutation>, SessionError> {
        let LevelState::Loaded(world) = &mut self.state else {
            return Err(SessionError::NotReady);
        };
        let mutations = world.grid.reset();
        world.player = PlayerState::new(world.spawn);
        self.clock = MoveClock::default();
        debug!("level restarted; {} cells restored", mutations.len());
        Ok(mutations)
    }
}

// ── Queries ──

impl Session {
    pub fn state(&self) -> &LevelState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, LevelState::Loaded(_))
    }

    pub fn world(&self) -> Option<&World> {
        match &self.state {
            LevelState::Loaded(world) => Some(world),
            _ => None,
        }
    }

    pub fn grid(&self) -> Option<&Grid> {
        self.world().map(|w| &w.grid)
    }

    pub fn player(&self) -> Option<&PlayerState> {
        self.world().map(|w| &w.player)
    }

    /// Spawn point of the loaded level.
    pub fn level_spawn(&self) -> Option<Position> {
        self.world().map(|w| w.spawn)
    }

    pub fn spawns(&self) -> &Spawns {
        &self.rules.spawns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cell::CellType;
    use crate::sim::event::Teleport;

    /// Straight corridor on row 2 from the entry portal to the exit portal.
    const CORRIDOR: &str = "\
2222222222222222
2000000000000002
2030000000000042
2222222222222222
2000000000000002
2000000000000002
2000000000000002
2000000000000002
2000000000000002
2000000000000002
2000000000000002
2222222222222222
";

    fn loaded() -> Session {
        let mut s = Session::new(RulesConfig::default());
        s.load_level(level::embedded_level()).unwrap();
        s
    }

    #[test]
    fn tick_before_load_is_not_ready() {
        let mut s = Session::new(RulesConfig::default());
        assert!(matches!(s.state(), LevelState::NotLoaded));
        assert_eq!(s.tick(16, Some(Intent::MoveLeft)), Err(SessionError::NotReady));
        assert_eq!(s.restart(), Err(SessionError::NotReady));
    }

    #[test]
    fn failed_load_installs_nothing() {
        let mut s = loaded();
        let err = s.load_level("0000\n").unwrap_err();
        assert!(err.is_malformed());
        assert!(matches!(s.state(), LevelState::Failed(LevelError::RowCount { .. })));
        assert!(s.grid().is_none());
        assert_eq!(s.tick(16, None), Err(SessionError::NotReady));
    }

    #[test]
    fn load_spawns_on_entry_portal() {
        let s = loaded();
        assert_eq!(s.player().map(PlayerState::position), Some(Position::new(2, 4)));
        assert_eq!(s.level_spawn(), Some(Position::new(2, 4)));
    }

    #[test]
    fn debounce_drops_second_intent() {
        let mut s = loaded();
        let first = s.tick(0, Some(Intent::MoveRight)).unwrap();
        assert!(first.accepted);
        assert_eq!(first.position, Position::new(2, 5));

        let second = s.tick(150, Some(Intent::MoveRight)).unwrap();
        assert!(!second.accepted);
        assert_eq!(second.position, Position::new(2, 5));

        let third = s.tick(50, Some(Intent::MoveRight)).unwrap();
        assert!(third.accepted);
        assert_eq!(third.position, Position::new(2, 6));
    }

    #[test]
    fn gravity_ignores_debounce() {
        let mut s = loaded();
        // (2, 7) sits over the gap at (3, 7).
        s.tick(0, Some(Intent::MoveRight)).unwrap();
        s.tick(200, Some(Intent::MoveRight)).unwrap();
        let r = s.tick(200, Some(Intent::MoveRight)).unwrap();
        assert_eq!(r.position, Position::new(3, 7));
        let r = s.tick(1, None).unwrap();
        assert_eq!(r.position, Position::new(4, 7));
    }

    #[test]
    fn restart_restores_cells_and_player() {
        let mut s = loaded();
        let placed = s.tick(0, Some(Intent::PlaceOrDestroy)).unwrap();
        assert_eq!(placed.mutations.len(), 1);
        s.tick(200, Some(Intent::MoveLeft)).unwrap();

        let restored = s.restart().unwrap();
        assert_eq!(restored.len(), 1);
        assert_eq!(restored[0].new, CellType::Empty);
        assert_eq!(s.player().map(PlayerState::position), Some(Position::new(2, 4)));
        assert_eq!(s.grid().and_then(|g| g.get(2, 5)), Some(CellType::Empty));
    }

    #[test]
    fn portal_reset_uses_configured_coordinate() {
        let mut rules = RulesConfig::default();
        rules.spawns.portal_reset = Position::new(1, 1);
        let mut s = Session::new(rules);
        s.load_level(CORRIDOR).unwrap();
        // Walk right along row 2 to the exit portal at (2, 14).
        let mut report = None;
        for i in 0..20 {
            let r = s.tick(if i == 0 { 0 } else { 200 }, Some(Intent::MoveRight)).unwrap();
            if r.teleport == Some(Teleport::PortalReset) {
                report = Some(r);
                break;
            }
        }
        let r = report.expect("reached the exit portal");
        // (1, 1) is over (2, 1), which is empty, so gravity pulls one row.
        assert_eq!(r.position, Position::new(2, 1));
    }

    #[test]
    fn bad_spawn_config_fails_load() {
        let mut rules = RulesConfig::default();
        rules.spawns.fall_recovery = Position::new(40, 0);
        let mut s = Session::new(rules);
        let err = s.load_level(level::embedded_level()).unwrap_err();
        assert!(matches!(err, LevelError::Spawn { which: "fall_recovery", .. }));
        assert!(!s.is_ready());
    }
}
