//! Fixed-timestep driver: wall-clock frames in, whole ticks and an
//! interpolation fraction out.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::config::MAX_CATCH_UP_STEPS;

/// Callbacks the loop drives once per frame.
pub trait LoopHooks {
    /// Paused frames skip ticks and render at `alpha = 0`.
    fn is_paused(&self) -> bool {
        false
    }

    /// Advances the simulation by exactly one fixed step.
    fn tick(&mut self);

    /// Draws the current state; `alpha` is in `[0, 1)`.
    fn render(&mut self, alpha: f64);
}

/// Shared cancellation flag for a [`FixedStepLoop`].
///
/// Clones observe the same flag; cancelling any of them stops the loop.
#[derive(Debug, Clone, Default)]
pub struct LoopCanceller {
    cancelled: Rc<Cell<bool>>,
}

impl LoopCanceller {
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

/// What one frame did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub ticks: u32,
    pub alpha: f64,
}

/// Accumulator-based fixed-step loop.
#[derive(Debug)]
pub struct FixedStepLoop {
    step: Duration,
    max_delta: Duration,
    accumulator: Duration,
    previous: Instant,
    canceller: LoopCanceller,
}

impl FixedStepLoop {
    /// Starts a loop whose first frame measures from `now`.
    #[must_use]
    pub fn start(step: Duration, now: Instant) -> Self {
        let step = step.max(Duration::from_millis(1));
        Self {
            step,
            max_delta: step * MAX_CATCH_UP_STEPS,
            accumulator: Duration::ZERO,
            previous: now,
            canceller: LoopCanceller::default(),
        }
    }

    /// Handle that stops this loop.
    #[must_use]
    pub fn canceller(&self) -> LoopCanceller {
        self.canceller.clone()
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.canceller.is_cancelled()
    }

    /// Runs one display frame. Returns `None` once cancelled.
    pub fn frame<H: LoopHooks + ?Sized>(
        &mut self,
        now: Instant,
        hooks: &mut H,
    ) -> Option<FrameReport> {
        if self.is_cancelled() {
            return None;
        }

        let delta = now.saturating_duration_since(self.previous);
        self.previous = now;

        if hooks.is_paused() {
            hooks.render(0.0);
            return Some(FrameReport {
                ticks: 0,
                alpha: 0.0,
            });
        }

        self.accumulator += delta.min(self.max_delta);

        let mut ticks = 0;
        while self.accumulator >= self.step {
            hooks.tick();
            self.accumulator -= self.step;
            ticks += 1;
            if self.is_cancelled() {
                return None;
            }
        }

        let alpha = self.accumulator.as_secs_f64() / self.step.as_secs_f64();
        hooks.render(alpha);

        Some(FrameReport { ticks, alpha })
    }
}
