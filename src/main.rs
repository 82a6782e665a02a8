/// Entry point and game loop.

mod ui;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use log::{debug, error, info};

use stardust::sim::level;
use stardust::{GameConfig, Intent, Session};
use ui::controls::{self, Controls};
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::{Renderer, Scene};
use ui::sound::{sfx_for, SoundEngine};

const FRAME_SLEEP: Duration = Duration::from_millis(5);
const LOG_FILE: &str = "stardust.log";

const KEYS_RESTART: &[KeyCode] = &[KeyCode::F(2)];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc];

fn main() {
    init_logging();

    let mut config = GameConfig::load();
    if let Some(arg) = std::env::args_os().nth(1) {
        config.level_path = Some(PathBuf::from(arg));
    }

    // Load before touching the terminal so errors print normally.
    let mut session = Session::new(config.rules);
    let (loaded, title) = match &config.level_path {
        Some(path) => (session.load_level_file(path), level_title(path)),
        None => (session.load_level(level::embedded_level()), "01".to_string()),
    };
    if let Err(e) = loaded {
        error!("{e}");
        eprintln!("Could not start: {e}");
        std::process::exit(1);
    }
    info!("level {title} loaded");

    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut session, &mut renderer, sound.as_ref(), &config, title);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        error!("game loop aborted: {e}");
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Stardust!");
}

/// Route `log` output to a file; the terminal is in raw mode while playing.
/// `RUST_LOG` overrides the default `warn` filter.
fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("warn");
    match File::create(LOG_FILE) {
        Ok(file) => {
            env_logger::Builder::from_env(env)
                .target(env_logger::Target::Pipe(Box::new(file)))
                .init();
        }
        Err(e) => eprintln!("Logging disabled: cannot create {LOG_FILE}: {e}"),
    }
}

fn level_title(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn game_loop(
    session: &mut Session,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
    title: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    let controls = Controls::from_config(&config.keys);

    let (grid, player) = match session.world() {
        Some(w) => (&w.grid, &w.player),
        None => return Err(stardust::SessionError::NotReady.into()),
    };
    let mut scene = Scene::new(grid, player, title);

    let tick_rate = Duration::from_millis(config.tick_rate_ms);
    let mut last_tick = Instant::now();
    let mut pending_action: Option<Intent> = None;

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() || kb.any_pressed(KEYS_QUIT) || gp.quit_pressed() {
            break;
        }

        if kb.any_pressed(KEYS_RESTART) || gp.restart_pressed() {
            let restored = session.restart()?;
            scene.apply_mutations(&restored);
            if let Some(p) = session.player() {
                scene.place_player(p);
            }
            scene.set_message("Level restarted");
            pending_action = None;
        }

        scene.set_pad_connected(gp.connected);

        let signals = controls.sample(&kb, &gp);
        if let Some(action) = controls::action_intent(&signals) {
            pending_action = Some(action);
        }

        if last_tick.elapsed() >= tick_rate {
            let elapsed = last_tick.elapsed().as_millis() as u64;
            last_tick = Instant::now();

            let intent = pending_action.or_else(|| controls::translate(&signals));
            let report = session.tick(elapsed, intent)?;
            if report.accepted && pending_action.is_some() {
                debug!("accepted pending {intent:?}");
                pending_action = None;
            }

            scene.apply(&report);
            scene.tick_message();
            if let (Some(sfx), Some(effect)) = (sound, sfx_for(&report)) {
                sfx.play(effect);
            }
        }

        renderer.render(&scene)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}
