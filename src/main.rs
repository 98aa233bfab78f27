use std::error::Error;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use thiserror::Error;
use tracing::{Level, debug, warn};

use snek::config::{
    BoundaryMode, ConfigError, FileConfig, PaletteChoice, Visuals, VisualsPatch,
};
use snek::game::GameOver;
use snek::session::{GameOverHook, Mount, Session, SessionOptions};
use snek::terminal_runtime::{TerminalMount, install_panic_hook};

/// Poll timeout between frames; roughly one display refresh.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);
/// Step applied by the live tuning keys.
const TUNING_STEP: f64 = 0.01;

#[derive(Debug, Parser)]
#[command(version, about = "Grid Snake with a smoothly interpolated body")]
struct Cli {
    /// End the game at the grid edge instead of wrapping around.
    #[arg(long)]
    wall: bool,

    /// Bar width as a fraction of the cell size (0.48 to 0.64).
    #[arg(long)]
    thickness: Option<f64>,

    /// Corner rounding factor (0.28 to 0.50).
    #[arg(long)]
    corner: Option<f64>,

    /// Draw whole-cell steps without sub-tick interpolation.
    #[arg(long)]
    reduced_motion: bool,

    #[arg(long, value_enum)]
    theme: Option<PaletteChoice>,

    /// Fixed seed for food placement.
    #[arg(long)]
    seed: Option<u64>,

    /// JSON settings file; command-line flags take precedence.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write logs to this file instead of stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[arg(long, default_value_t = Level::WARN)]
    log_level: Level,
}

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to install logger: {0}")]
    Logging(String),
    #[error("game session could not start; see log for details")]
    SessionUnavailable,
}

/// Keys handled by the host rather than the game.
#[derive(Debug, Clone, Copy, PartialEq)]
enum HostCommand {
    Quit,
    Restart,
    TogglePause,
    Thickness(f64),
    Corner(f64),
    ToggleReducedMotion,
}

fn main() -> Result<(), AppError> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let file_config = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let options = session_options(&cli, file_config);

    install_panic_hook();
    run(options)
}

fn init_logging(cli: &Cli) -> Result<(), AppError> {
    let builder = tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false);

    let installed = match &cli.log_file {
        Some(path) => {
            let file = File::create(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(io::stderr).try_init(),
    };
    installed.map_err(|error| AppError::Logging(error.to_string()))
}

fn session_options(cli: &Cli, file: FileConfig) -> SessionOptions {
    let boundary = if cli.wall {
        BoundaryMode::Wall
    } else {
        file.boundary
    };
    let visuals = file.visuals.patched(VisualsPatch {
        thickness: cli.thickness,
        corner: cli.corner,
        reduced_motion: cli.reduced_motion.then_some(true),
    });

    SessionOptions {
        boundary,
        visuals,
        palette: cli.theme.unwrap_or(file.theme).palette(),
        seed: cli.seed.or(file.seed),
    }
}

fn run(options: SessionOptions) -> Result<(), AppError> {
    let mut mount = TerminalMount::new();
    let mut session = start_session(&mut mount, options)?;

    loop {
        if let Some(scene) = session.frame(Instant::now()) {
            mount.present(scene)?;
        }

        if !event::poll(FRAME_INTERVAL)? {
            continue;
        }

        match event::read()? {
            Event::Key(key) => match host_command(&key) {
                Some(HostCommand::Quit) => break,
                Some(HostCommand::Restart) => {
                    debug!("restarting game");
                    session.dispose();
                    session = start_session(&mut mount, options)?;
                }
                Some(command) => apply_tuning(&mut session, command),
                None => {
                    session.handle_key(&key);
                }
            },
            Event::Resize(..) => match mount.viewport() {
                Ok(viewport) => {
                    session.resize(viewport);
                    mount.present(session.scene())?;
                }
                Err(error) => warn!(%error, "ignoring resize"),
            },
            _ => {}
        }
    }

    session.dispose();
    Ok(())
}

fn start_session(mount: &mut TerminalMount, options: SessionOptions) -> Result<Session, AppError> {
    Session::start(mount, options, Some(game_over_hook()), Instant::now())
        .ok_or(AppError::SessionUnavailable)
}

fn game_over_hook() -> GameOverHook {
    Box::new(|report: &GameOver| -> Result<(), Box<dyn Error>> {
        debug!(
            score = report.score,
            ticks = report.ticks,
            length = report.length,
            reason = ?report.reason,
            "game over"
        );
        Ok(())
    })
}

fn host_command(key: &KeyEvent) -> Option<HostCommand> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(HostCommand::Quit);
    }

    let command = match key.code {
        KeyCode::Char('q') | KeyCode::Esc => HostCommand::Quit,
        KeyCode::Enter => HostCommand::Restart,
        KeyCode::Char('p') | KeyCode::Char(' ') => HostCommand::TogglePause,
        KeyCode::Char('[') => HostCommand::Thickness(-TUNING_STEP),
        KeyCode::Char(']') => HostCommand::Thickness(TUNING_STEP),
        KeyCode::Char('-') => HostCommand::Corner(-TUNING_STEP),
        KeyCode::Char('=') => HostCommand::Corner(TUNING_STEP),
        KeyCode::Char('m') => HostCommand::ToggleReducedMotion,
        _ => return None,
    };
    Some(command)
}

fn apply_tuning(session: &mut Session, command: HostCommand) {
    let current: Visuals = session.state().visuals;
    let patch = match command {
        HostCommand::TogglePause => {
            session.toggle_pause();
            return;
        }
        HostCommand::Thickness(delta) => VisualsPatch {
            thickness: Some(current.thickness + delta),
            ..VisualsPatch::default()
        },
        HostCommand::Corner(delta) => VisualsPatch {
            corner: Some(current.corner + delta),
            ..VisualsPatch::default()
        },
        HostCommand::ToggleReducedMotion => VisualsPatch {
            reduced_motion: Some(!current.reduced_motion),
            ..VisualsPatch::default()
        },
        HostCommand::Quit | HostCommand::Restart => return,
    };
    session.set_visuals(patch);
}
