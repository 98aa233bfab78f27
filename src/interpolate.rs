//! Sub-tick geometry: turns discrete cells into a continuous snake bar.
//!
//! Everything here is a pure function of the game state and `alpha`, the
//! fraction of the current tick that has elapsed.

use crate::config::{BoundaryMode, CELL_SIZE};
use crate::game::GameState;
use crate::scene::{Path, Point};
use crate::snake::Position;

/// Points closer than this are treated as the same point.
const POINT_EPSILON: f64 = 1e-6;

/// Turns with a smaller normalised cross product are drawn straight.
const COLINEAR_EPSILON: f64 = 1e-3;

/// Pixel centre of a grid cell.
#[must_use]
pub fn cell_center(position: Position) -> Point {
    Point::new(
        f64::from(position.x) * CELL_SIZE + CELL_SIZE / 2.0,
        f64::from(position.y) * CELL_SIZE + CELL_SIZE / 2.0,
    )
}

/// Shortest signed delta on an axis that wraps every `span` pixels.
#[must_use]
pub fn wrap_delta(delta: f64, span: f64) -> f64 {
    if span <= 0.0 {
        return delta;
    }

    let half = span / 2.0;
    if delta > half {
        delta - span
    } else if delta < -half {
        delta + span
    } else {
        delta
    }
}

/// Interpolates from `previous` to `current` along the shortest wrapped path.
///
/// The result may lie outside the board while crossing an edge.
#[must_use]
pub fn lerp_wrapped(previous: Point, current: Point, alpha: f64, span: Point) -> Point {
    let delta = current - previous;
    previous
        + Point::new(
            wrap_delta(delta.x, span.x),
            wrap_delta(delta.y, span.y),
        ) * alpha
}

/// Shifts points by whole board spans so consecutive points are adjacent.
pub fn unwrap_polyline(points: &mut [Point], span: Point) {
    for index in 1..points.len() {
        let anchor = points[index - 1];
        let delta = points[index] - anchor;
        points[index] = anchor
            + Point::new(
                wrap_delta(delta.x, span.x),
                wrap_delta(delta.y, span.y),
            );
    }
}

/// Removes consecutive duplicate points.
#[must_use]
pub fn dedup_points(points: Vec<Point>) -> Vec<Point> {
    let mut unique: Vec<Point> = Vec::with_capacity(points.len());
    for point in points {
        match unique.last() {
            Some(last) if last.distance(point) <= POINT_EPSILON => {}
            _ => unique.push(point),
        }
    }
    unique
}

/// Total length of a polyline.
#[must_use]
pub fn polyline_length(points: &[Point]) -> f64 {
    points
        .windows(2)
        .map(|pair| pair[0].distance(pair[1]))
        .sum()
}

/// Keeps the first `target` pixels of a polyline, cutting the last segment.
#[must_use]
pub fn trim_polyline(points: &[Point], target: f64) -> Vec<Point> {
    let Some(&first) = points.first() else {
        return Vec::new();
    };

    let mut trimmed = vec![first];
    let mut remaining = target.max(0.0);
    for pair in points.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        let length = from.distance(to);
        if length <= remaining {
            trimmed.push(to);
            remaining -= length;
            continue;
        }
        if remaining > POINT_EPSILON {
            trimmed.push(from.lerp(to, remaining / length));
        }
        break;
    }

    trimmed
}

/// Builds a path through `points`, blending each turn with a quadratic.
///
/// The blend radius is `max_radius`, further capped at half of each
/// adjacent segment so blends never overlap.
#[must_use]
pub fn rounded_path(points: &[Point], max_radius: f64) -> Path {
    let mut path = Path::new();
    let Some((&first, rest)) = points.split_first() else {
        return path;
    };
    path.move_to(first);

    for window in points.windows(3) {
        let (before, corner, after) = (window[0], window[1], window[2]);
        let incoming = corner - before;
        let outgoing = after - corner;
        let (in_dir, out_dir) = (incoming.normalized(), outgoing.normalized());

        if in_dir.cross(out_dir).abs() < COLINEAR_EPSILON {
            path.line_to(corner);
            continue;
        }

        let radius = max_radius
            .min(incoming.length() / 2.0)
            .min(outgoing.length() / 2.0)
            .max(0.0);
        path.line_to(corner - in_dir * radius);
        path.quad_to(corner, corner + out_dir * radius);
    }

    if let Some(&last) = rest.last() {
        path.line_to(last);
    }
    path
}

/// Continuous shape of the snake for one rendered frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SnakeBar {
    /// Head first; already trimmed and unwrapped across board edges.
    pub points: Vec<Point>,
    pub path: Path,
    pub head: Point,
    pub width: f64,
    pub target_length: f64,
}

impl SnakeBar {
    /// Whole-board offsets at which the bar must also be drawn to show the
    /// parts that crossed an edge. Always includes the zero offset.
    #[must_use]
    pub fn wrap_offsets(&self, span: Point, mode: BoundaryMode) -> Vec<Point> {
        if mode == BoundaryMode::Wall {
            return vec![Point::default()];
        }

        let Some((min, max)) = self.path.bounds() else {
            return vec![Point::default()];
        };
        let margin = self.width / 2.0;
        let (min, max) = (
            Point::new(min.x.min(self.head.x) - margin, min.y.min(self.head.y) - margin),
            Point::new(max.x.max(self.head.x) + margin, max.y.max(self.head.y) + margin),
        );

        let mut offsets = Vec::new();
        for oy in [-span.y, 0.0, span.y] {
            for ox in [-span.x, 0.0, span.x] {
                let overlaps_x = max.x + ox > 0.0 && min.x + ox < span.x;
                let overlaps_y = max.y + oy > 0.0 && min.y + oy < span.y;
                if (ox == 0.0 && oy == 0.0) || (overlaps_x && overlaps_y) {
                    offsets.push(Point::new(ox, oy));
                }
            }
        }
        offsets
    }
}

/// Computes the snake bar at sub-tick fraction `alpha`.
///
/// The traced chain is the interpolated head, the current body, and the
/// previous tail unless the last tick grew. Its nominal length is
/// `(alpha + full links) × cell`; the tail is trimmed by `alpha × cell`
/// unless the snake grew, so the bar lengthens instead of sliding.
#[must_use]
pub fn snake_bar(state: &GameState, alpha: f64) -> SnakeBar {
    let alpha = effective_alpha(state, alpha);
    let (span_x, span_y) = state.bounds().pixel_span();
    let span = Point::new(span_x, span_y);
    let snake = &state.snake;

    let (previous_head, previous_tail) = match &state.previous {
        Some(previous) => (previous.head, previous.tail()),
        None => (snake.head(), snake.tail()),
    };

    let head = lerp_wrapped(
        cell_center(previous_head),
        cell_center(snake.head()),
        alpha,
        span,
    );

    let mut chain = Vec::with_capacity(snake.len() + 1);
    chain.push(head);
    chain.extend(snake.body().iter().map(|cell| cell_center(*cell)));
    if !state.grew_last_tick {
        chain.push(cell_center(previous_tail));
    }
    let full_links = (chain.len() - 1).saturating_sub(1);

    unwrap_polyline(&mut chain, span);
    let chain = dedup_points(chain);

    let nominal = (alpha + full_links as f64) * CELL_SIZE;
    let target_length = if state.grew_last_tick {
        nominal
    } else {
        nominal - alpha * CELL_SIZE
    };

    let points = trim_polyline(&chain, target_length);
    let path = rounded_path(&points, state.visuals.corner * CELL_SIZE / 2.0);

    SnakeBar {
        head: points.first().copied().unwrap_or(head),
        points,
        path,
        width: state.visuals.thickness * CELL_SIZE,
        target_length,
    }
}

/// `alpha` as the renderer uses it: clamped, and zero in reduced-motion mode.
#[must_use]
pub fn effective_alpha(state: &GameState, alpha: f64) -> f64 {
    if state.visuals.reduced_motion || !alpha.is_finite() {
        0.0
    } else {
        alpha.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{BoundaryMode, GridSize, CELL_SIZE};
    use crate::game::{GameState, SnakeSnapshot};
    use crate::scene::{PathOp, Point};
    use crate::snake::{Position, Snake};

    use super::{
        cell_center, lerp_wrapped, polyline_length, rounded_path, snake_bar, trim_polyline,
        unwrap_polyline, wrap_delta,
    };

    const TEN: GridSize = GridSize { cols: 10, rows: 10 };
    const SPAN: Point = Point::new(240.0, 240.0);

    fn moving_state(cells: &[(i32, i32)], previous: &[(i32, i32)]) -> GameState {
        let mut state = GameState::new_with_seed(TEN, BoundaryMode::Wrap, 1);
        state.snake = Snake::from_cells(cells.iter().map(|&(x, y)| Position::new(x, y)).collect())
            .expect("non-empty cells");
        let previous: Vec<_> = previous.iter().map(|&(x, y)| Position::new(x, y)).collect();
        state.previous = Some(SnakeSnapshot {
            head: previous[0],
            body: previous[1..].to_vec(),
        });
        state
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn cell_centers_are_half_a_cell_in() {
        assert_eq!(cell_center(Position::new(0, 0)), Point::new(12.0, 12.0));
        assert_eq!(cell_center(Position::new(2, 1)), Point::new(60.0, 36.0));
    }

    #[test]
    fn wrap_delta_prefers_short_way_round() {
        assert_eq!(wrap_delta(24.0, 240.0), 24.0);
        assert_eq!(wrap_delta(-216.0, 240.0), 24.0);
        assert_eq!(wrap_delta(216.0, 240.0), -24.0);
    }

    #[test]
    fn interpolation_across_edge_leaves_the_board() {
        let from = cell_center(Position::new(9, 3));
        let to = cell_center(Position::new(0, 3));

        let halfway = lerp_wrapped(from, to, 0.5, SPAN);

        assert!(approx(halfway.x, 240.0));
        assert!(approx(halfway.y, from.y));
    }

    #[test]
    fn unwrap_keeps_neighbours_adjacent() {
        let mut points = vec![
            cell_center(Position::new(0, 3)),
            cell_center(Position::new(9, 3)),
            cell_center(Position::new(8, 3)),
        ];

        unwrap_polyline(&mut points, SPAN);

        assert!(approx(points[1].x, -12.0));
        assert!(approx(points[2].x, -36.0));
    }

    #[test]
    fn trim_cuts_the_final_partial_segment() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
        ];

        let trimmed = trim_polyline(&points, 15.0);

        assert_eq!(trimmed.len(), 3);
        assert!(approx(trimmed[2].y, 5.0));
        assert!(approx(polyline_length(&trimmed), 15.0));
    }

    #[test]
    fn corner_radius_is_capped_by_short_segments() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, 40.0),
        ];

        let path = rounded_path(&points, 10.0);

        assert_eq!(
            path.ops()[1],
            PathOp::LineTo(Point::new(2.0, 0.0)),
            "radius limited to half of the 4px segment"
        );
        assert_eq!(
            path.ops()[2],
            PathOp::QuadTo {
                control: Point::new(4.0, 0.0),
                to: Point::new(4.0, 2.0),
            }
        );
    }

    #[test]
    fn straight_runs_have_no_blends() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(24.0, 0.0),
            Point::new(48.0, 0.0),
        ];

        let path = rounded_path(&points, 5.0);

        assert!(path
            .ops()
            .iter()
            .all(|op| !matches!(op, PathOp::QuadTo { .. })));
    }

    #[test]
    fn bar_length_stays_constant_while_sliding() {
        let state = moving_state(&[(6, 5), (5, 5), (4, 5)], &[(5, 5), (4, 5), (3, 5)]);

        for alpha in [0.0, 0.25, 0.5, 0.9] {
            let bar = snake_bar(&state, alpha);
            assert!(approx(bar.target_length, 2.0 * CELL_SIZE));
            assert!(approx(polyline_length(&bar.points), 2.0 * CELL_SIZE));
            assert!(approx(bar.head.x, 132.0 + CELL_SIZE * alpha));
        }
    }

    #[test]
    fn growth_lengthens_instead_of_sliding() {
        let mut state = moving_state(
            &[(6, 5), (5, 5), (4, 5), (3, 5)],
            &[(5, 5), (4, 5), (3, 5)],
        );
        state.grew_last_tick = true;

        let start = snake_bar(&state, 0.0);
        let later = snake_bar(&state, 0.5);

        assert!(approx(polyline_length(&start.points), 2.0 * CELL_SIZE));
        assert!(approx(polyline_length(&later.points), 2.5 * CELL_SIZE));
        assert_eq!(later.points.last(), start.points.last());
    }

    #[test]
    fn reduced_motion_snaps_to_tick_start() {
        let mut state = moving_state(&[(6, 5), (5, 5)], &[(5, 5), (4, 5)]);
        state.visuals.reduced_motion = true;

        assert_eq!(snake_bar(&state, 0.7), snake_bar(&state, 0.0));
    }

    #[test]
    fn bar_crossing_edge_is_continuous_and_drawn_twice() {
        let state = moving_state(&[(0, 3), (9, 3), (8, 3)], &[(9, 3), (8, 3), (7, 3)]);

        let bar = snake_bar(&state, 0.5);

        assert!(approx(bar.head.x, 240.0));
        assert!(approx(polyline_length(&bar.points), 2.0 * CELL_SIZE));
        let offsets = bar.wrap_offsets(SPAN, BoundaryMode::Wrap);
        assert!(offsets.contains(&Point::new(0.0, 0.0)));
        assert!(offsets.contains(&Point::new(-240.0, 0.0)));
    }

    #[test]
    fn missing_snapshot_renders_current_cells() {
        let mut state = moving_state(&[(6, 5), (5, 5)], &[(5, 5), (4, 5)]);
        state.previous = None;

        let bar = snake_bar(&state, 0.6);

        assert_eq!(bar.head, cell_center(Position::new(6, 5)));
        assert!(approx(polyline_length(&bar.points), CELL_SIZE));
    }
}
