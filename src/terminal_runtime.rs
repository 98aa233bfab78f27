use std::io;
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};

use crossterm::cursor::{Hide, Show};
use crossterm::event::{
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{
    self, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::config::Viewport;
use crate::scene::Scene;
use crate::session::{Mount, MountError, hook_panic_is_caught};
use crate::terminal_canvas::SceneWidget;

/// Asks the terminal to tag key events as press, repeat or release.
const KEYBOARD_FLAGS: KeyboardEnhancementFlags = KeyboardEnhancementFlags::REPORT_EVENT_TYPES;

/// Set while [`KEYBOARD_FLAGS`] are pushed, so cleanup pops them exactly once.
static KEYBOARD_ENHANCED: AtomicBool = AtomicBool::new(false);

/// Concrete terminal type used by the runtime.
pub type AppTerminal = Terminal<CrosstermBackend<io::Stdout>>;

/// Terminal mount: raw mode + alternate screen, acquired on demand.
///
/// On drop, this type restores terminal state best-effort.
#[derive(Default)]
pub struct TerminalMount {
    terminal: Option<AppTerminal>,
}

impl TerminalMount {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws `scene` over the whole terminal.
    pub fn present(&mut self, scene: &Scene) -> io::Result<()> {
        let Some(terminal) = self.terminal.as_mut() else {
            return Err(io::Error::other("terminal surface not prepared"));
        };
        terminal.draw(|frame| frame.render_widget(SceneWidget::new(scene), frame.area()))?;
        Ok(())
    }
}

impl Mount for TerminalMount {
    fn viewport(&self) -> Result<Viewport, MountError> {
        let (columns, rows) = terminal::size().map_err(|error| MountError::Invalid {
            reason: format!("cannot query terminal size: {error}"),
        })?;
        Ok(Viewport::from_terminal_cells(columns, rows))
    }

    /// Enters raw mode, switches to the alternate screen, requests key
    /// release reporting where supported, and creates a ratatui terminal.
    /// A second call keeps the existing surface.
    fn prepare_surface(&mut self) -> Result<(), MountError> {
        if self.terminal.is_some() {
            return Ok(());
        }

        enable_raw_mode()?;

        let mut stdout = io::stdout();
        if let Err(error) = execute!(stdout, EnterAlternateScreen, Hide) {
            let _ = disable_raw_mode();
            return Err(error.into());
        }
        if let Err(error) = push_keyboard_enhancement(&mut stdout) {
            let _ = cleanup_terminal_best_effort();
            return Err(error.into());
        }

        let backend = CrosstermBackend::new(stdout);
        match Terminal::new(backend) {
            Ok(terminal) => {
                self.terminal = Some(terminal);
                Ok(())
            }
            Err(error) => {
                let _ = cleanup_terminal_best_effort();
                Err(error.into())
            }
        }
    }
}

impl Drop for TerminalMount {
    fn drop(&mut self) {
        if self.terminal.take().is_some() {
            let _ = cleanup_terminal_best_effort();
        }
    }
}

/// Restores the terminal before the default panic report is printed.
///
/// Panics raised inside a game-over hook are caught and logged by the
/// session, which keeps running; those leave the terminal untouched.
pub fn install_panic_hook() {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        if hook_panic_is_caught() {
            return;
        }
        let _ = cleanup_terminal_best_effort();
        default_hook(panic_info);
    }));
}

/// Without event types, terminals report releases as presses or not at all.
fn push_keyboard_enhancement(stdout: &mut io::Stdout) -> io::Result<()> {
    if !matches!(terminal::supports_keyboard_enhancement(), Ok(true)) {
        return Ok(());
    }
    execute!(stdout, PushKeyboardEnhancementFlags(KEYBOARD_FLAGS))?;
    KEYBOARD_ENHANCED.store(true, Ordering::SeqCst);
    Ok(())
}

fn cleanup_terminal_best_effort() -> io::Result<()> {
    let mut stdout = io::stdout();
    if KEYBOARD_ENHANCED.swap(false, Ordering::SeqCst) {
        let _ = execute!(stdout, PopKeyboardEnhancementFlags);
    }
    let _ = disable_raw_mode();
    execute!(stdout, Show, LeaveAlternateScreen)
}
