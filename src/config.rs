use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ratatui::style::Color;
use serde::Deserialize;
use thiserror::Error;

/// Logical pixels per grid cell.
pub const CELL_SIZE: f64 = 24.0;

/// Simulation ticks per second.
pub const TICK_HZ: u64 = 10;

/// Fixed simulation step.
pub const STEP: Duration = Duration::from_millis(1000 / TICK_HZ);

/// Largest frame delta, in whole steps, the loop will simulate at once.
pub const MAX_CATCH_UP_STEPS: u32 = 5;

/// Smallest grid edge, in cells, regardless of viewport size.
pub const MIN_GRID_CELLS: u16 = 4;

/// Random draws attempted before food placement falls back to a scan.
pub const FOOD_SPAWN_ATTEMPTS: usize = 50;

/// Maximum number of direction changes held between ticks.
pub const INPUT_QUEUE_CAPACITY: usize = 2;

/// Body cells trailing the head when a session starts.
pub const INITIAL_BODY_LEN: usize = 2;

/// Logical pixels covered by one terminal column.
pub const TERMINAL_COLUMN_PX: f64 = 12.0;

/// Logical pixels covered by one terminal row.
pub const TERMINAL_ROW_PX: f64 = 24.0;

pub const DEFAULT_THICKNESS: f64 = 0.56;
pub const THICKNESS_RANGE: (f64, f64) = (0.48, 0.64);
pub const DEFAULT_CORNER: f64 = 0.38;
pub const CORNER_RANGE: (f64, f64) = (0.28, 0.50);

/// Food marker edge as a fraction of the cell.
pub const FOOD_SIZE_FACTOR: f64 = 0.5;
/// Food marker corner rounding as a fraction of the marker edge.
pub const FOOD_ROUNDING_FACTOR: f64 = 0.25;

pub const HUD_PADDING_PX: f64 = 6.0;

/// Logical grid dimensions passed through the game as a named type.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct GridSize {
    pub cols: u16,
    pub rows: u16,
}

impl GridSize {
    /// Returns the total number of cells in the grid.
    #[must_use]
    pub fn total_cells(self) -> usize {
        usize::from(self.cols) * usize::from(self.rows)
    }

    /// Derives the grid that fits a viewport, never smaller than 4×4.
    #[must_use]
    pub fn from_viewport(viewport: Viewport) -> Self {
        Self {
            cols: cells_along(viewport.width),
            rows: cells_along(viewport.height),
        }
    }

    /// Board extent in logical pixels.
    #[must_use]
    pub fn pixel_span(self) -> (f64, f64) {
        (
            f64::from(self.cols) * CELL_SIZE,
            f64::from(self.rows) * CELL_SIZE,
        )
    }
}

fn cells_along(pixels: f64) -> u16 {
    let cells = if pixels.is_finite() && pixels > 0.0 {
        (pixels / CELL_SIZE).floor().min(f64::from(u16::MAX))
    } else {
        0.0
    };

    (cells as u16).max(MIN_GRID_CELLS)
}

/// Host area the session renders into, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    /// Converts a terminal area measured in cells into logical pixels.
    #[must_use]
    pub fn from_terminal_cells(columns: u16, rows: u16) -> Self {
        Self {
            width: f64::from(columns) * TERMINAL_COLUMN_PX,
            height: f64::from(rows) * TERMINAL_ROW_PX,
        }
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// What happens when the head leaves the grid.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryMode {
    /// Leaving one edge re-enters at the opposite edge.
    #[default]
    Wrap,
    /// Leaving the grid ends the game.
    Wall,
}

/// Live-tunable rendering parameters.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Visuals {
    /// Bar width as a fraction of the cell size.
    pub thickness: f64,
    /// Corner rounding factor relative to the cell size.
    pub corner: f64,
    /// Snap to whole cells instead of interpolating between ticks.
    pub reduced_motion: bool,
}

impl Default for Visuals {
    fn default() -> Self {
        Self {
            thickness: DEFAULT_THICKNESS,
            corner: DEFAULT_CORNER,
            reduced_motion: false,
        }
    }
}

impl Visuals {
    /// Applies the fields present in `patch`, clamping into supported ranges.
    pub fn apply(&mut self, patch: VisualsPatch) {
        if let Some(thickness) = patch.thickness.filter(|value| value.is_finite()) {
            self.thickness = thickness.clamp(THICKNESS_RANGE.0, THICKNESS_RANGE.1);
        }
        if let Some(corner) = patch.corner.filter(|value| value.is_finite()) {
            self.corner = corner.clamp(CORNER_RANGE.0, CORNER_RANGE.1);
        }
        if let Some(reduced_motion) = patch.reduced_motion {
            self.reduced_motion = reduced_motion;
        }
    }

    /// Returns a copy with `patch` applied.
    #[must_use]
    pub fn patched(mut self, patch: VisualsPatch) -> Self {
        self.apply(patch);
        self
    }
}

/// Partial visual update; `None` fields are left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VisualsPatch {
    pub thickness: Option<f64>,
    pub corner: Option<f64>,
    pub reduced_motion: Option<bool>,
}

/// Colours used by every drawn element.
#[derive(Debug)]
pub struct Palette {
    pub name: &'static str,
    pub background: Color,
    pub grid: Color,
    pub head: Color,
    pub body: Color,
    pub food: Color,
    pub hud: Color,
    pub overlay_title: Color,
    pub overlay_text: Color,
}

pub const PALETTE_DARK: Palette = Palette {
    name: "dark",
    background: Color::Rgb(12, 14, 18),
    grid: Color::Rgb(38, 40, 44),
    head: Color::Rgb(0x64, 0xff, 0xda),
    body: Color::Rgb(0x27, 0xc8, 0xa9),
    food: Color::Rgb(0xff, 0x63, 0x84),
    hud: Color::Rgb(217, 217, 217),
    overlay_title: Color::Rgb(0xff, 0x63, 0x84),
    overlay_text: Color::Rgb(235, 235, 235),
};

pub const PALETTE_LIGHT: Palette = Palette {
    name: "light",
    background: Color::Rgb(250, 250, 250),
    grid: Color::Rgb(230, 230, 230),
    head: Color::Rgb(0x1d, 0xb9, 0x9a),
    body: Color::Rgb(0x27, 0xc8, 0xa9),
    food: Color::Rgb(0xff, 0x63, 0x84),
    hud: Color::Rgb(64, 64, 64),
    overlay_title: Color::Rgb(0xd0, 0x3a, 0x5c),
    overlay_text: Color::Rgb(32, 32, 32),
};

/// Palette selector usable from the command line and config files.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PaletteChoice {
    #[default]
    Dark,
    Light,
}

impl PaletteChoice {
    #[must_use]
    pub fn palette(self) -> &'static Palette {
        match self {
            Self::Dark => &PALETTE_DARK,
            Self::Light => &PALETTE_LIGHT,
        }
    }
}

/// Options read from an optional JSON settings file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub boundary: BoundaryMode,
    pub visuals: Visuals,
    pub theme: PaletteChoice,
    pub seed: Option<u64>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl FileConfig {
    /// Loads settings from `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        let mut config: Self = serde_json::from_str(raw)?;
        // Route file values through the same clamping as live updates.
        config.visuals = Visuals::default().patched(VisualsPatch {
            thickness: Some(config.visuals.thickness),
            corner: Some(config.visuals.corner),
            reduced_motion: Some(config.visuals.reduced_motion),
        });
        Ok(config)
    }
}
