//! Display list the renderer draws into and the terminal canvas paints from.
//!
//! Coordinates are logical pixels with the origin at the top-left corner and
//! `y` growing downwards.

use std::ops::{Add, Mul, Sub};

use ratatui::style::Color;

/// Point or vector in logical pixel space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (other - self).length()
    }

    /// Linear interpolation towards `other`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        self + (other - self) * t
    }

    /// Unit vector in the same direction, or zero for a zero vector.
    #[must_use]
    pub fn normalized(self) -> Self {
        let length = self.length();
        if length <= f64::EPSILON {
            Self::default()
        } else {
            self * (1.0 / length)
        }
    }

    /// z-component of the cross product.
    #[must_use]
    pub fn cross(self, other: Self) -> f64 {
        self.x * other.y - self.y * other.x
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

/// One step of a path outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathOp {
    MoveTo(Point),
    LineTo(Point),
    QuadTo { control: Point, to: Point },
}

/// Open path built from line and quadratic segments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    ops: Vec<PathOp>,
}

impl Path {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, point: Point) {
        self.ops.push(PathOp::MoveTo(point));
    }

    pub fn line_to(&mut self, point: Point) {
        self.ops.push(PathOp::LineTo(point));
    }

    pub fn quad_to(&mut self, control: Point, to: Point) {
        self.ops.push(PathOp::QuadTo { control, to });
    }

    #[must_use]
    pub fn ops(&self) -> &[PathOp] {
        &self.ops
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Returns a copy moved by `offset`.
    #[must_use]
    pub fn translated(&self, offset: Point) -> Self {
        let ops = self
            .ops
            .iter()
            .map(|op| match *op {
                PathOp::MoveTo(point) => PathOp::MoveTo(point + offset),
                PathOp::LineTo(point) => PathOp::LineTo(point + offset),
                PathOp::QuadTo { control, to } => PathOp::QuadTo {
                    control: control + offset,
                    to: to + offset,
                },
            })
            .collect();
        Self { ops }
    }

    /// Approximates the path with straight segments.
    ///
    /// Each quadratic is split into `quad_steps` pieces.
    #[must_use]
    pub fn flatten(&self, quad_steps: usize) -> Vec<(Point, Point)> {
        let steps = quad_steps.max(1);
        let mut segments = Vec::new();
        let mut cursor: Option<Point> = None;

        for op in &self.ops {
            match *op {
                PathOp::MoveTo(point) => cursor = Some(point),
                PathOp::LineTo(point) => {
                    if let Some(from) = cursor {
                        segments.push((from, point));
                    }
                    cursor = Some(point);
                }
                PathOp::QuadTo { control, to } => {
                    if let Some(from) = cursor {
                        let mut previous = from;
                        for step in 1..=steps {
                            let t = step as f64 / steps as f64;
                            let next = quadratic_point(from, control, to, t);
                            segments.push((previous, next));
                            previous = next;
                        }
                    }
                    cursor = Some(to);
                }
            }
        }

        segments
    }

    /// Axis-aligned bounds of every point and control point.
    #[must_use]
    pub fn bounds(&self) -> Option<(Point, Point)> {
        let mut points = self.ops.iter().flat_map(|op| match *op {
            PathOp::MoveTo(point) | PathOp::LineTo(point) => [Some(point), None],
            PathOp::QuadTo { control, to } => [Some(control), Some(to)],
        });
        let first = points.find_map(|point| point)?;

        Some(points.flatten().fold((first, first), |(min, max), point| {
            (
                Point::new(min.x.min(point.x), min.y.min(point.y)),
                Point::new(max.x.max(point.x), max.y.max(point.y)),
            )
        }))
    }
}

fn quadratic_point(from: Point, control: Point, to: Point, t: f64) -> Point {
    let a = from.lerp(control, t);
    let b = control.lerp(to, t);
    a.lerp(b, t)
}

/// Horizontal anchoring for text.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TextAlign {
    Left,
    Center,
}

/// Stroke parameters. Caps and joins are always round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub width: f64,
    pub color: Color,
}

/// A single drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear {
        width: f64,
        height: f64,
        color: Color,
    },
    /// Hairline segment.
    Line {
        from: Point,
        to: Point,
        color: Color,
    },
    StrokePath {
        path: Path,
        stroke: Stroke,
    },
    FillCircle {
        center: Point,
        radius: f64,
        color: Color,
    },
    FillRoundedRect {
        origin: Point,
        size: Point,
        radius: f64,
        color: Color,
    },
    Text {
        at: Point,
        text: String,
        color: Color,
        align: TextAlign,
    },
}

/// Ordered list of drawing commands for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    width: f64,
    height: f64,
    commands: Vec<DrawCommand>,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops all commands and starts a frame of the given size.
    pub fn clear(&mut self, width: f64, height: f64, color: Color) {
        self.width = width;
        self.height = height;
        self.commands.clear();
        self.commands.push(DrawCommand::Clear {
            width,
            height,
            color,
        });
    }

    pub fn line(&mut self, from: Point, to: Point, color: Color) {
        self.commands.push(DrawCommand::Line { from, to, color });
    }

    pub fn stroke_path(&mut self, path: Path, stroke: Stroke) {
        if !path.is_empty() {
            self.commands.push(DrawCommand::StrokePath { path, stroke });
        }
    }

    pub fn fill_circle(&mut self, center: Point, radius: f64, color: Color) {
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            color,
        });
    }

    pub fn fill_rounded_rect(&mut self, origin: Point, size: Point, radius: f64, color: Color) {
        self.commands.push(DrawCommand::FillRoundedRect {
            origin,
            size,
            radius,
            color,
        });
    }

    pub fn text(&mut self, at: Point, text: impl Into<String>, color: Color, align: TextAlign) {
        self.commands.push(DrawCommand::Text {
            at,
            text: text.into(),
            color,
            align,
        });
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Text of every text command, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}
