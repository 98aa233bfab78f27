use crate::config::{Palette, HUD_PADDING_PX, TERMINAL_ROW_PX};
use crate::game::GameState;
use crate::scene::{Point, Scene, TextAlign};

/// Vertical distance between HUD lines; one terminal row.
const HUD_LINE_HEIGHT_PX: f64 = TERMINAL_ROW_PX;

/// Text lines shown in the heads-up overlay.
#[must_use]
pub fn hud_lines(state: &GameState) -> [String; 3] {
    [
        format!("Score: {}", state.score),
        format!("Tick: {}", state.tick_count),
        format!("Len: {}", state.snake.len()),
    ]
}

/// Draws score, tick count and length in the top-left corner.
pub fn render_hud(scene: &mut Scene, state: &GameState, palette: &Palette) {
    for (index, line) in hud_lines(state).into_iter().enumerate() {
        let y = HUD_PADDING_PX + index as f64 * HUD_LINE_HEIGHT_PX;
        scene.text(
            Point::new(HUD_PADDING_PX, y),
            line,
            palette.hud,
            TextAlign::Left,
        );
    }
}
