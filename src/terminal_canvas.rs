//! Paints a [`Scene`] through ratatui's braille [`Canvas`].
//!
//! The canvas bounds are measured in dots (2x4 per terminal cell), so every
//! dot has an exact integer coordinate. Scene pixels are scaled onto that dot
//! grid by the shapes below. Consecutive commands of one colour share a canvas
//! layer; a colour change starts a new layer, so a later command owns every
//! cell it touches. Text is printed as canvas labels and sits above all dots.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::symbols::Marker;
use ratatui::text::Line as TextLine;
use ratatui::widgets::canvas::{Canvas, Context, Line, Painter, Shape};
use ratatui::widgets::{Clear, Widget};
use unicode_width::UnicodeWidthStr;

use crate::scene::{DrawCommand, Path, Point, Scene, Stroke, TextAlign};

const DOTS_PER_CELL_X: u16 = 2;
const DOTS_PER_CELL_Y: u16 = 4;
/// Quadratic segments are flattened into this many pieces.
const CURVE_STEPS: usize = 8;

/// Widget that draws a scene scaled to fill its area.
#[derive(Debug, Clone, Copy)]
pub struct SceneWidget<'a> {
    scene: &'a Scene,
}

impl<'a> SceneWidget<'a> {
    #[must_use]
    pub fn new(scene: &'a Scene) -> Self {
        Self { scene }
    }
}

impl Widget for SceneWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = area.intersection(buf.area);
        if area.is_empty() || self.scene.width() <= 0.0 || self.scene.height() <= 0.0 {
            return;
        }

        let grid = DotGrid::new(area, self.scene);
        let background = self.scene.commands().iter().find_map(|command| match command {
            DrawCommand::Clear { color, .. } => Some(*color),
            _ => None,
        });
        if background.is_some() {
            Clear.render(area, buf);
        }

        Canvas::default()
            .marker(Marker::Braille)
            .background_color(background.unwrap_or(Color::Reset))
            .x_bounds([0.0, f64::from(grid.columns - 1)])
            .y_bounds([0.0, f64::from(grid.rows - 1)])
            .paint(|ctx| paint_commands(ctx, grid, self.scene))
            .render(area, buf);
    }
}

fn paint_commands(ctx: &mut Context<'_>, grid: DotGrid, scene: &Scene) {
    let mut layer_color = None;
    for command in scene.commands() {
        match command {
            DrawCommand::Clear { .. } => {}
            DrawCommand::Line { from, to, color } => {
                let (Some(from), Some(to)) = (grid.dot_at(*from), grid.dot_at(*to)) else {
                    continue;
                };
                start_layer(ctx, &mut layer_color, *color);
                let (x1, y1) = grid.canvas_point(from);
                let (x2, y2) = grid.canvas_point(to);
                ctx.draw(&Line::new(x1, y1, x2, y2, *color));
            }
            DrawCommand::StrokePath { path, stroke } => {
                start_layer(ctx, &mut layer_color, stroke.color);
                ctx.draw(&ThickStroke {
                    grid,
                    path,
                    stroke: *stroke,
                });
            }
            DrawCommand::FillCircle {
                center,
                radius,
                color,
            } => {
                start_layer(ctx, &mut layer_color, *color);
                ctx.draw(&Disc {
                    grid,
                    center: *center,
                    radius: *radius,
                    color: *color,
                });
            }
            DrawCommand::FillRoundedRect {
                origin,
                size,
                radius,
                color,
            } => {
                start_layer(ctx, &mut layer_color, *color);
                ctx.draw(&RoundedBox {
                    grid,
                    origin: *origin,
                    size: *size,
                    radius: radius.clamp(0.0, size.x.min(size.y) / 2.0),
                    color: *color,
                });
            }
            DrawCommand::Text {
                at,
                text,
                color,
                align,
            } => {
                if let Some((x, y)) = grid.label_at(*at, text, *align) {
                    let style = Style::default().fg(*color);
                    ctx.print(x, y, TextLine::styled(text.clone(), style));
                }
            }
        }
    }
}

fn start_layer(ctx: &mut Context<'_>, layer_color: &mut Option<Color>, color: Color) {
    if layer_color.is_some_and(|current| current != color) {
        ctx.layer();
    }
    *layer_color = Some(color);
}

/// Mapping from scene pixels to the canvas dot grid.
#[derive(Debug, Clone, Copy)]
struct DotGrid {
    /// Logical pixels per dot.
    dot_width: f64,
    dot_height: f64,
    /// Logical pixels per terminal cell.
    cell_width: f64,
    cell_height: f64,
    columns: u32,
    rows: u32,
    area_width: u16,
    area_height: u16,
}

impl DotGrid {
    fn new(area: Rect, scene: &Scene) -> Self {
        let columns = u32::from(area.width) * u32::from(DOTS_PER_CELL_X);
        let rows = u32::from(area.height) * u32::from(DOTS_PER_CELL_Y);

        Self {
            dot_width: scene.width() / f64::from(columns),
            dot_height: scene.height() / f64::from(rows),
            cell_width: scene.width() / f64::from(area.width),
            cell_height: scene.height() / f64::from(area.height),
            columns,
            rows,
            area_width: area.width,
            area_height: area.height,
        }
    }

    /// Canvas coordinates of a dot; canvas y grows upwards.
    fn canvas_point(&self, (column, row): (u32, u32)) -> (f64, f64) {
        (f64::from(column), f64::from(self.rows - 1 - row))
    }

    fn dot_center(&self, column: u32, row: u32) -> Point {
        Point::new(
            (f64::from(column) + 0.5) * self.dot_width,
            (f64::from(row) + 0.5) * self.dot_height,
        )
    }

    fn dot_at(&self, point: Point) -> Option<(u32, u32)> {
        if !point.x.is_finite() || !point.y.is_finite() || point.x < 0.0 || point.y < 0.0 {
            return None;
        }
        // The far edges belong to the last dot.
        if point.x > self.dot_width * f64::from(self.columns)
            || point.y > self.dot_height * f64::from(self.rows)
        {
            return None;
        }
        let column = ((point.x / self.dot_width).floor() as u32).min(self.columns - 1);
        let row = ((point.y / self.dot_height).floor() as u32).min(self.rows - 1);
        Some((column, row))
    }

    /// Paints every dot inside `[min, max]` whose centre passes `inside`.
    fn paint_where(
        &self,
        painter: &mut Painter<'_, '_>,
        (min, max): (Point, Point),
        color: Color,
        inside: impl Fn(Point) -> bool,
    ) {
        let Some((first_column, last_column)) =
            dot_range(min.x, max.x, self.dot_width, self.columns)
        else {
            return;
        };
        let Some((first_row, last_row)) = dot_range(min.y, max.y, self.dot_height, self.rows) else {
            return;
        };

        for row in first_row..=last_row {
            for column in first_column..=last_column {
                if !inside(self.dot_center(column, row)) {
                    continue;
                }
                let (x, y) = self.canvas_point((column, row));
                if let Some((x, y)) = painter.get_point(x, y) {
                    painter.paint(x, y, color);
                }
            }
        }
    }

    /// Canvas position whose label lands on the terminal cell under `at`.
    ///
    /// Labels are placed by scaling canvas bounds onto `area - 1` cells and
    /// truncating, so the middle of the target cell is used.
    fn label_at(&self, at: Point, text: &str, align: TextAlign) -> Option<(f64, f64)> {
        if !at.x.is_finite() || !at.y.is_finite() || at.y < 0.0 {
            return None;
        }
        let row = (at.y / self.cell_height).floor();
        if row >= f64::from(self.area_height) {
            return None;
        }

        let mut column = (at.x / self.cell_width).floor();
        if align == TextAlign::Center {
            column -= (text.width() / 2) as f64;
        }
        let column = column.clamp(0.0, f64::from(self.area_width - 1));

        let right = f64::from(self.columns - 1);
        let top = f64::from(self.rows - 1);
        let x = match self.area_width {
            1 => 0.0,
            width => ((column + 0.5) * right / f64::from(width - 1)).min(right),
        };
        let y = match self.area_height {
            1 => top,
            height => (top - (row + 0.5) * top / f64::from(height - 1)).max(0.0),
        };
        Some((x, y))
    }
}

/// A path stroked with round caps and joins.
struct ThickStroke<'s> {
    grid: DotGrid,
    path: &'s Path,
    stroke: Stroke,
}

impl Shape for ThickStroke<'_> {
    fn draw(&self, painter: &mut Painter) {
        let radius = self.stroke.width / 2.0;
        for (from, to) in self.path.flatten(CURVE_STEPS) {
            let reach = (
                Point::new(from.x.min(to.x) - radius, from.y.min(to.y) - radius),
                Point::new(from.x.max(to.x) + radius, from.y.max(to.y) + radius),
            );
            self.grid.paint_where(painter, reach, self.stroke.color, |dot| {
                distance_to_segment(dot, from, to) <= radius
            });
        }
    }
}

struct Disc {
    grid: DotGrid,
    center: Point,
    radius: f64,
    color: Color,
}

impl Shape for Disc {
    fn draw(&self, painter: &mut Painter) {
        let reach = Point::new(self.radius, self.radius);
        self.grid.paint_where(
            painter,
            (self.center - reach, self.center + reach),
            self.color,
            |dot| dot.distance(self.center) <= self.radius,
        );
    }
}

struct RoundedBox {
    grid: DotGrid,
    origin: Point,
    size: Point,
    radius: f64,
    color: Color,
}

impl Shape for RoundedBox {
    fn draw(&self, painter: &mut Painter) {
        self.grid.paint_where(
            painter,
            (self.origin, self.origin + self.size),
            self.color,
            |dot| inside_rounded_rect(dot, self.origin, self.size, self.radius),
        );
    }
}

/// Inclusive range of dots overlapping `[min, max]`, clamped to the grid.
fn dot_range(min: f64, max: f64, dot: f64, count: u32) -> Option<(u32, u32)> {
    if !min.is_finite() || !max.is_finite() || max < 0.0 || count == 0 {
        return None;
    }
    let last = f64::from(count - 1);
    let first = (min / dot).floor().max(0.0);
    if first > last {
        return None;
    }
    let end = (max / dot).floor().min(last);
    Some((first as u32, end as u32))
}

fn distance_to_segment(point: Point, from: Point, to: Point) -> f64 {
    let segment = to - from;
    let length_squared = segment.x * segment.x + segment.y * segment.y;
    if length_squared <= f64::EPSILON {
        return point.distance(from);
    }
    let offset = point - from;
    let t = ((offset.x * segment.x + offset.y * segment.y) / length_squared).clamp(0.0, 1.0);
    point.distance(from + segment * t)
}

fn inside_rounded_rect(point: Point, origin: Point, size: Point, radius: f64) -> bool {
    let max = origin + size;
    if point.x < origin.x || point.x > max.x || point.y < origin.y || point.y > max.y {
        return false;
    }
    let nearest = Point::new(
        point.x.clamp(origin.x + radius, max.x - radius),
        point.y.clamp(origin.y + radius, max.y - radius),
    );
    point.distance(nearest) <= radius
}
