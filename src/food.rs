use std::collections::HashSet;

use rand::Rng;

use crate::config::{GridSize, FOOD_SPAWN_ATTEMPTS};
use crate::snake::{Position, Snake};

/// Picks a free cell for food, or `None` when the snake fills the board.
///
/// Uniform random draws are tried first; once they all collide the grid is
/// scanned in row-major order, so placement always terminates.
#[must_use]
pub fn spawn_position<R: Rng + ?Sized>(
    rng: &mut R,
    bounds: GridSize,
    snake: &Snake,
) -> Option<Position> {
    let occupied: HashSet<Position> = snake.cells().collect();
    if occupied.len() >= bounds.total_cells() {
        return None;
    }

    let cols = i32::from(bounds.cols);
    let rows = i32::from(bounds.rows);

    for _ in 0..FOOD_SPAWN_ATTEMPTS {
        let candidate = Position::new(rng.gen_range(0..cols), rng.gen_range(0..rows));
        if !occupied.contains(&candidate) {
            return Some(candidate);
        }
    }

    first_free_cell(bounds, &occupied)
}

fn first_free_cell(bounds: GridSize, occupied: &HashSet<Position>) -> Option<Position> {
    (0..i32::from(bounds.rows))
        .flat_map(|y| (0..i32::from(bounds.cols)).map(move |x| Position::new(x, y)))
        .find(|position| !occupied.contains(position))
}
