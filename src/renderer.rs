use crate::config::{
    GridSize, Palette, Viewport, CELL_SIZE, FOOD_ROUNDING_FACTOR, FOOD_SIZE_FACTOR,
};
use crate::game::{GameState, GameStatus};
use crate::interpolate::snake_bar;
use crate::scene::{Point, Scene, Stroke};
use crate::snake::Position;
use crate::ui::hud::render_hud;
use crate::ui::menu::{render_game_over_menu, render_pause_menu};

/// Renders the board, the snake bar and the HUD from immutable state.
///
/// Redrawing with the same state and `alpha` produces the same scene.
pub fn render(
    scene: &mut Scene,
    state: &GameState,
    alpha: f64,
    viewport: Viewport,
    palette: &Palette,
) {
    scene.clear(viewport.width, viewport.height, palette.background);

    render_grid(scene, state.bounds(), palette);
    if let Some(food) = state.food {
        render_food(scene, food, palette);
    }
    render_snake(scene, state, alpha, palette);
    render_hud(scene, state, palette);
}

/// Draws the pause or game-over overlay on top of a rendered board.
pub fn render_overlay(scene: &mut Scene, state: &GameState, palette: &Palette) {
    match state.status {
        GameStatus::Paused => render_pause_menu(scene, state.bounds(), palette),
        GameStatus::Ended => {
            if let Some(game_over) = state.game_over() {
                render_game_over_menu(scene, state.bounds(), &game_over, palette);
            }
        }
        GameStatus::Running => {}
    }
}

fn render_grid(scene: &mut Scene, bounds: GridSize, palette: &Palette) {
    let (width, height) = bounds.pixel_span();

    for column in 0..=bounds.cols {
        let x = f64::from(column) * CELL_SIZE;
        scene.line(Point::new(x, 0.0), Point::new(x, height), palette.grid);
    }
    for row in 0..=bounds.rows {
        let y = f64::from(row) * CELL_SIZE;
        scene.line(Point::new(0.0, y), Point::new(width, y), palette.grid);
    }
}

fn render_food(scene: &mut Scene, food: Position, palette: &Palette) {
    let size = CELL_SIZE * FOOD_SIZE_FACTOR;
    let inset = (CELL_SIZE - size) / 2.0;
    let origin = Point::new(
        f64::from(food.x) * CELL_SIZE + inset,
        f64::from(food.y) * CELL_SIZE + inset,
    );

    scene.fill_rounded_rect(
        origin,
        Point::new(size, size),
        size * FOOD_ROUNDING_FACTOR,
        palette.food,
    );
}

fn render_snake(scene: &mut Scene, state: &GameState, alpha: f64, palette: &Palette) {
    let bar = snake_bar(state, alpha);
    let (width, height) = state.bounds().pixel_span();
    let stroke = Stroke {
        width: bar.width,
        color: palette.body,
    };

    for offset in bar.wrap_offsets(Point::new(width, height), state.boundary()) {
        scene.stroke_path(bar.path.translated(offset), stroke);
        scene.fill_circle(bar.head + offset, bar.width / 2.0, palette.head);
    }
}
