//! Composition root: owns the game state, input buffer, loop and scene for
//! one game, and exposes the controls a host drives.

use std::any::Any;
use std::cell::Cell;
use std::error::Error;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use crossterm::event::KeyEvent;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{
    BoundaryMode, GridSize, Palette, Viewport, Visuals, VisualsPatch, PALETTE_DARK, STEP,
};
use crate::game::{GameOver, GameState, TickOutcome};
use crate::game_loop::{FixedStepLoop, LoopHooks};
use crate::input::{InputBuffer, KeyDisposition};
use crate::renderer;
use crate::scene::Scene;

/// Where a session draws.
pub trait Mount {
    /// Resolves the area the session renders into.
    fn viewport(&self) -> Result<Viewport, MountError>;

    /// Acquires the drawing surface. Called once, before the first frame.
    fn prepare_surface(&mut self) -> Result<(), MountError>;
}

#[derive(Debug, Error)]
pub enum MountError {
    #[error("mount target {0} not found")]
    Missing(String),
    #[error("mount target is invalid: {reason}")]
    Invalid { reason: String },
    #[error("drawing surface unavailable: {0}")]
    Surface(#[from] io::Error),
}

/// Called once when the game ends. Errors and panics are logged and
/// otherwise ignored; see [`hook_panic_is_caught`].
pub type GameOverHook = Box<dyn FnMut(&GameOver) -> Result<(), Box<dyn Error>>>;

/// Settings fixed at session start.
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub boundary: BoundaryMode,
    pub visuals: Visuals,
    pub palette: &'static Palette,
    /// Fixed seed for food placement; entropy when `None`.
    pub seed: Option<u64>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            boundary: BoundaryMode::default(),
            visuals: Visuals::default(),
            palette: &PALETTE_DARK,
            seed: None,
        }
    }
}

thread_local! {
    static HOOK_GUARDED: Cell<bool> = const { Cell::new(false) };
}

/// True while this thread runs a game-over hook whose panic the session
/// catches. Process panic hooks check it so they leave the terminal alone
/// for a panic the game survives.
#[must_use]
pub fn hook_panic_is_caught() -> bool {
    HOOK_GUARDED.with(Cell::get)
}

struct GameOverNotifier {
    hook: Option<GameOverHook>,
    notified: bool,
}

impl GameOverNotifier {
    fn notify(&mut self, report: &GameOver) {
        if self.notified {
            return;
        }
        self.notified = true;

        let Some(hook) = self.hook.as_mut() else {
            return;
        };
        HOOK_GUARDED.with(|guarded| guarded.set(true));
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| hook(report)));
        HOOK_GUARDED.with(|guarded| guarded.set(false));

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(error)) => warn!(%error, "game-over hook failed"),
            Err(payload) => warn!(message = panic_message(&*payload), "game-over hook panicked"),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

/// A running game bound to a mount.
pub struct Session {
    state: GameState,
    input: InputBuffer,
    scene: Scene,
    viewport: Viewport,
    palette: &'static Palette,
    game_loop: FixedStepLoop,
    notifier: GameOverNotifier,
    disposed: bool,
}

impl Session {
    /// Starts a session on `mount`.
    ///
    /// Returns `None`, after logging a warning, when the mount target cannot
    /// be resolved or its drawing surface cannot be acquired.
    pub fn start<M: Mount + ?Sized>(
        mount: &mut M,
        options: SessionOptions,
        on_game_over: Option<GameOverHook>,
        now: Instant,
    ) -> Option<Self> {
        let viewport = match resolve_viewport(mount) {
            Ok(viewport) => viewport,
            Err(error) => {
                warn!(%error, "session not started: mount target unavailable");
                return None;
            }
        };
        if let Err(error) = mount.prepare_surface() {
            warn!(%error, "session not started: no drawing surface");
            return None;
        }

        let bounds = GridSize::from_viewport(viewport);
        let state = match options.seed {
            Some(seed) => {
                let mut state = GameState::new_with_seed(bounds, options.boundary, seed);
                state.visuals = options.visuals;
                state
            }
            None => GameState::new(bounds, options.boundary, options.visuals),
        };

        info!(
            cols = bounds.cols,
            rows = bounds.rows,
            boundary = ?options.boundary,
            palette = options.palette.name,
            "session started"
        );

        let mut session = Self {
            state,
            input: InputBuffer::new(),
            scene: Scene::new(),
            viewport,
            palette: options.palette,
            game_loop: FixedStepLoop::start(STEP, now),
            notifier: GameOverNotifier {
                hook: on_game_over,
                notified: false,
            },
            disposed: false,
        };
        session.redraw();
        Some(session)
    }

    /// Feeds a key event to the input buffer.
    pub fn handle_key(&mut self, key: &KeyEvent) -> KeyDisposition {
        if self.disposed {
            return KeyDisposition::Ignored;
        }
        self.input.capture(key)
    }

    /// Runs one display frame and returns the scene to present.
    ///
    /// Returns `None` once the session has been disposed.
    pub fn frame(&mut self, now: Instant) -> Option<&Scene> {
        if self.disposed {
            return None;
        }

        let mut hooks = FrameHooks {
            state: &mut self.state,
            input: &mut self.input,
            scene: &mut self.scene,
            viewport: self.viewport,
            palette: self.palette,
            notifier: &mut self.notifier,
        };
        self.game_loop.frame(now, &mut hooks)?;
        Some(&self.scene)
    }

    /// Updates visual tuning; the next frame picks it up.
    pub fn set_visuals(&mut self, patch: VisualsPatch) {
        self.state.visuals.apply(patch);
    }

    /// Refits the game to a new viewport and redraws immediately.
    pub fn resize(&mut self, viewport: Viewport) {
        if self.disposed || viewport.is_empty() {
            return;
        }

        self.viewport = viewport;
        let bounds = GridSize::from_viewport(viewport);
        if bounds != self.state.bounds() {
            debug!(cols = bounds.cols, rows = bounds.rows, "grid resized");
            self.state.resize(bounds);
        }
        self.redraw();
    }

    pub fn toggle_pause(&mut self) {
        if !self.disposed {
            self.state.toggle_pause();
        }
    }

    /// Stops the loop and detaches input. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.game_loop.canceller().cancel();
        self.input.dispose();
        info!(
            score = self.state.score,
            ticks = self.state.tick_count,
            "session disposed"
        );
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Most recently rendered scene.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    fn redraw(&mut self) {
        draw(&mut self.scene, &self.state, 0.0, self.viewport, self.palette);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn resolve_viewport<M: Mount + ?Sized>(mount: &M) -> Result<Viewport, MountError> {
    let viewport = mount.viewport()?;
    if viewport.is_empty() {
        return Err(MountError::Invalid {
            reason: format!("empty viewport {}x{}", viewport.width, viewport.height),
        });
    }
    Ok(viewport)
}

fn draw(scene: &mut Scene, state: &GameState, alpha: f64, viewport: Viewport, palette: &Palette) {
    renderer::render(scene, state, alpha, viewport, palette);
    renderer::render_overlay(scene, state, palette);
}

struct FrameHooks<'a> {
    state: &'a mut GameState,
    input: &'a mut InputBuffer,
    scene: &'a mut Scene,
    viewport: Viewport,
    palette: &'static Palette,
    notifier: &'a mut GameOverNotifier,
}

impl LoopHooks for FrameHooks<'_> {
    fn is_paused(&self) -> bool {
        self.state.is_paused()
    }

    fn tick(&mut self) {
        if let TickOutcome::Ended(_) = self.state.tick(self.input) {
            if let Some(report) = self.state.game_over() {
                self.notifier.notify(&report);
            }
        }
    }

    fn render(&mut self, alpha: f64) {
        draw(self.scene, self.state, alpha, self.viewport, self.palette);
    }
}
