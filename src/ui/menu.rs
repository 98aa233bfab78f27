use unicode_width::UnicodeWidthStr;

use crate::config::{GridSize, Palette, TERMINAL_COLUMN_PX, TERMINAL_ROW_PX};
use crate::game::{DeathReason, GameOver};
use crate::scene::{Point, Scene, TextAlign};

/// Draws the pause notice centred on the board.
pub fn render_pause_menu(scene: &mut Scene, bounds: GridSize, palette: &Palette) {
    render_popup(
        scene,
        bounds,
        palette,
        "PAUSED",
        &["[P]/[Space] Resume".to_owned(), "[Q] Quit".to_owned()],
    );
}

/// Draws the game-over summary centred on the board.
pub fn render_game_over_menu(
    scene: &mut Scene,
    bounds: GridSize,
    game_over: &GameOver,
    palette: &Palette,
) {
    let cause = match game_over.reason {
        DeathReason::WallCollision => "Cause: hit wall",
        DeathReason::SelfCollision => "Cause: hit yourself",
    };
    let lines = [
        format!("Score: {}", game_over.score),
        format!("Length: {}", game_over.length),
        cause.to_owned(),
        String::new(),
        "[Enter] Play Again".to_owned(),
        "[Q] Quit".to_owned(),
    ];

    render_popup(scene, bounds, palette, "GAME OVER", &lines);
}

fn render_popup(
    scene: &mut Scene,
    bounds: GridSize,
    palette: &Palette,
    title: &str,
    lines: &[String],
) {
    let (board_width, board_height) = bounds.pixel_span();
    let center_x = board_width / 2.0;
    let row_count = lines.len() + 2;
    let height = row_count as f64 * TERMINAL_ROW_PX;
    let top = ((board_height - height) / 2.0).max(0.0);

    let widest = lines
        .iter()
        .map(|line| line.width())
        .chain(std::iter::once(title.width()))
        .max()
        .unwrap_or(0);
    let width = ((widest + 4) as f64 * TERMINAL_COLUMN_PX).min(board_width);

    scene.fill_rounded_rect(
        Point::new(center_x - width / 2.0, top),
        Point::new(width, height),
        TERMINAL_COLUMN_PX,
        palette.background,
    );

    scene.text(
        Point::new(center_x, top + TERMINAL_ROW_PX / 2.0),
        title,
        palette.overlay_title,
        TextAlign::Center,
    );
    for (index, line) in lines.iter().enumerate() {
        if line.is_empty() {
            continue;
        }
        let y = top + (index as f64 + 1.5) * TERMINAL_ROW_PX;
        scene.text(
            Point::new(center_x, y),
            line.as_str(),
            palette.overlay_text,
            TextAlign::Center,
        );
    }
}
