use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{BoundaryMode, GridSize, Visuals, INITIAL_BODY_LEN};
use crate::food::spawn_position;
use crate::input::{Direction, InputBuffer};
use crate::snake::{Position, Snake};

/// Current high-level gameplay state.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum GameStatus {
    Running,
    Paused,
    /// Terminal: no tick mutates the state afterwards.
    Ended,
}

/// Why a game ended.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DeathReason {
    WallCollision,
    SelfCollision,
}

/// Snake cells as they were at the start of the latest tick.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SnakeSnapshot {
    pub head: Position,
    pub body: Vec<Position>,
}

impl SnakeSnapshot {
    #[must_use]
    pub fn of(snake: &Snake) -> Self {
        Self {
            head: snake.head(),
            body: snake.body().iter().copied().collect(),
        }
    }

    /// Returns the last cell (the head for a body-less snapshot).
    #[must_use]
    pub fn tail(&self) -> Position {
        self.body.last().copied().unwrap_or(self.head)
    }
}

/// What one call to [`GameState::tick`] did.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TickOutcome {
    /// Not running; nothing changed.
    Skipped,
    Moved { ate: bool },
    /// This tick ended the game. Reported once per game.
    Ended(DeathReason),
}

/// Summary handed to the game-over hook.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct GameOver {
    pub score: u32,
    pub ticks: u64,
    pub length: usize,
    pub reason: DeathReason,
}

/// Complete mutable game state for one session.
#[derive(Debug, Clone)]
pub struct GameState {
    pub snake: Snake,
    pub food: Option<Position>,
    pub heading: Direction,
    pub pending_growth: u32,
    pub score: u32,
    pub tick_count: u64,
    pub status: GameStatus,
    pub death_reason: Option<DeathReason>,
    /// Cells at the start of the latest tick, read by the renderer.
    pub previous: Option<SnakeSnapshot>,
    /// Whether the latest tick kept the tail in place.
    pub grew_last_tick: bool,
    pub visuals: Visuals,
    boundary: BoundaryMode,
    bounds: GridSize,
    rng: StdRng,
}

impl GameState {
    /// Creates a state seeded from system entropy.
    #[must_use]
    pub fn new(bounds: GridSize, boundary: BoundaryMode, visuals: Visuals) -> Self {
        Self::with_rng(bounds, boundary, visuals, StdRng::from_entropy())
    }

    /// Creates a deterministic state for tests and reproducible simulations.
    #[must_use]
    pub fn new_with_seed(bounds: GridSize, boundary: BoundaryMode, seed: u64) -> Self {
        Self::with_rng(
            bounds,
            boundary,
            Visuals::default(),
            StdRng::seed_from_u64(seed),
        )
    }

    fn with_rng(
        bounds: GridSize,
        boundary: BoundaryMode,
        visuals: Visuals,
        mut rng: StdRng,
    ) -> Self {
        debug_assert!(bounds.cols > 0 && bounds.rows > 0);

        let start = Position::new(i32::from(bounds.cols / 2), i32::from(bounds.rows / 2));
        let snake = Snake::new(start, Direction::Right, INITIAL_BODY_LEN, bounds, boundary);
        let food = spawn_position(&mut rng, bounds, &snake);

        Self {
            snake,
            food,
            heading: Direction::Right,
            pending_growth: 0,
            score: 0,
            tick_count: 0,
            status: GameStatus::Running,
            death_reason: None,
            previous: None,
            grew_last_tick: false,
            visuals,
            boundary,
            bounds,
            rng,
        }
    }

    #[must_use]
    pub fn bounds(&self) -> GridSize {
        self.bounds
    }

    #[must_use]
    pub fn boundary(&self) -> BoundaryMode {
        self.boundary
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.status == GameStatus::Paused
    }

    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.status == GameStatus::Ended
    }

    /// Summary of an ended game.
    #[must_use]
    pub fn game_over(&self) -> Option<GameOver> {
        let reason = self.death_reason?;
        Some(GameOver {
            score: self.score,
            ticks: self.tick_count,
            length: self.snake.len(),
            reason,
        })
    }

    /// Advances simulation by one gameplay tick.
    pub fn tick(&mut self, input: &mut InputBuffer) -> TickOutcome {
        if self.status != GameStatus::Running {
            return TickOutcome::Skipped;
        }

        self.previous = Some(SnakeSnapshot::of(&self.snake));

        if let Some(next) = input.consume_next_dir(self.heading) {
            self.heading = next;
        }

        let candidate = self.snake.head().step(self.heading);
        let next_head = match self.boundary {
            BoundaryMode::Wrap => candidate.wrapped(self.bounds),
            BoundaryMode::Wall if !candidate.is_within_bounds(self.bounds) => {
                return self.end(DeathReason::WallCollision);
            }
            BoundaryMode::Wall => candidate,
        };

        if self.snake.body_occupies(next_head) {
            return self.end(DeathReason::SelfCollision);
        }

        let grow = self.pending_growth > 0;
        if grow {
            self.pending_growth -= 1;
        }
        self.snake.advance(next_head, grow);
        self.grew_last_tick = grow;

        let ate = self.food == Some(next_head);
        if ate {
            self.score += 1;
            self.pending_growth += 1;
            self.food = spawn_position(&mut self.rng, self.bounds, &self.snake);
        }

        self.tick_count += 1;
        TickOutcome::Moved { ate }
    }

    fn end(&mut self, reason: DeathReason) -> TickOutcome {
        // Previous equals current so the final frame does not slide.
        self.previous = Some(SnakeSnapshot::of(&self.snake));
        self.grew_last_tick = false;
        self.status = GameStatus::Ended;
        self.death_reason = Some(reason);
        self.tick_count += 1;
        tracing::debug!(
            ?reason,
            score = self.score,
            ticks = self.tick_count,
            "game ended"
        );
        TickOutcome::Ended(reason)
    }

    /// Flips between running and paused; an ended game stays ended.
    pub fn toggle_pause(&mut self) {
        self.status = match self.status {
            GameStatus::Running => GameStatus::Paused,
            GameStatus::Paused => GameStatus::Running,
            GameStatus::Ended => GameStatus::Ended,
        };
    }

    /// Moves the game onto a grid of new dimensions.
    ///
    /// Every stored coordinate is wrapped or clamped into the new bounds
    /// according to the boundary policy.
    pub fn resize(&mut self, bounds: GridSize) {
        if bounds == self.bounds {
            return;
        }

        let mode = self.boundary;
        self.bounds = bounds;
        self.snake.refit(bounds, mode);
        if let Some(previous) = &mut self.previous {
            previous.head = previous.head.fitted(bounds, mode);
            for cell in &mut previous.body {
                *cell = cell.fitted(bounds, mode);
            }
        }

        self.food = match self.food.map(|food| food.fitted(bounds, mode)) {
            Some(food) if !self.snake.occupies(food) => Some(food),
            _ => spawn_position(&mut self.rng, bounds, &self.snake),
        };
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{BoundaryMode, GridSize};
    use crate::input::{Direction, InputBuffer};
    use crate::snake::{Position, Snake};

    use super::{DeathReason, GameState, GameStatus, SnakeSnapshot, TickOutcome};

    const TEN: GridSize = GridSize { cols: 10, rows: 10 };

    fn place(state: &mut GameState, cells: &[(i32, i32)], heading: Direction) {
        state.snake = Snake::from_cells(cells.iter().map(|&(x, y)| Position::new(x, y)).collect())
            .expect("non-empty cells");
        state.heading = heading;
    }

    #[test]
    fn new_state_starts_centered_heading_right() {
        let state = GameState::new_with_seed(TEN, BoundaryMode::Wrap, 1);

        assert_eq!(state.snake.head(), Position::new(5, 5));
        assert_eq!(state.heading, Direction::Right);
        assert_eq!(state.status, GameStatus::Running);
        let food = state.food.expect("food spawned");
        assert!(!state.snake.occupies(food));
    }

    #[test]
    fn eating_grows_on_the_following_tick() {
        let mut state = GameState::new_with_seed(TEN, BoundaryMode::Wrap, 4);
        let mut input = InputBuffer::new();
        place(&mut state, &[(5, 5), (4, 5)], Direction::Right);
        state.food = Some(Position::new(6, 5));

        let outcome = state.tick(&mut input);

        assert_eq!(outcome, TickOutcome::Moved { ate: true });
        assert_eq!(state.snake.head(), Position::new(6, 5));
        assert_eq!(state.score, 1);
        assert_eq!(state.pending_growth, 1);
        assert_eq!(state.snake.len(), 2);
        assert!(!state.grew_last_tick);
        let food = state.food.expect("new food spawned");
        assert!(!state.snake.occupies(food));

        state.food = None;
        state.tick(&mut input);

        assert_eq!(state.snake.len(), 3);
        assert_eq!(state.pending_growth, 0);
        assert!(state.grew_last_tick);
    }

    #[test]
    fn previous_snapshot_is_taken_before_moving() {
        let mut state = GameState::new_with_seed(TEN, BoundaryMode::Wrap, 5);
        let mut input = InputBuffer::new();
        place(&mut state, &[(5, 5), (4, 5), (3, 5)], Direction::Right);
        state.food = None;

        state.tick(&mut input);

        assert_eq!(
            state.previous,
            Some(SnakeSnapshot {
                head: Position::new(5, 5),
                body: vec![Position::new(4, 5), Position::new(3, 5)],
            })
        );
        assert_eq!(state.tick_count, 1);
    }

    #[test]
    fn wrap_mode_reenters_at_opposite_edge() {
        let mut state = GameState::new_with_seed(TEN, BoundaryMode::Wrap, 6);
        let mut input = InputBuffer::new();
        place(&mut state, &[(9, 2), (8, 2)], Direction::Right);
        state.food = None;

        state.tick(&mut input);
        assert_eq!(state.snake.head(), Position::new(0, 2));

        input.push(Direction::Up);
        state.tick(&mut input);
        state.tick(&mut input);
        state.tick(&mut input);
        assert_eq!(state.snake.head(), Position::new(0, 9));
        assert_eq!(state.status, GameStatus::Running);
    }

    #[test]
    fn wall_mode_ends_and_freezes_position() {
        let mut state = GameState::new_with_seed(TEN, BoundaryMode::Wall, 2);
        let mut input = InputBuffer::new();
        place(&mut state, &[(9, 5), (8, 5)], Direction::Right);

        let outcome = state.tick(&mut input);

        assert_eq!(outcome, TickOutcome::Ended(DeathReason::WallCollision));
        assert_eq!(state.status, GameStatus::Ended);
        assert_eq!(state.snake.head(), Position::new(9, 5));
        let previous = state.previous.as_ref().expect("snapshot recorded");
        assert_eq!(previous.head, state.snake.head());
        assert_eq!(previous.body, vec![Position::new(8, 5)]);
    }

    #[test]
    fn snake_collision_with_self_ends_game() {
        let mut state =
            GameState::new_with_seed(GridSize { cols: 6, rows: 6 }, BoundaryMode::Wrap, 3);
        let mut input = InputBuffer::new();
        place(
            &mut state,
            &[(2, 2), (1, 2), (1, 3), (2, 3), (3, 3), (3, 2)],
            Direction::Right,
        );

        let outcome = state.tick(&mut input);

        assert_eq!(outcome, TickOutcome::Ended(DeathReason::SelfCollision));
        assert_eq!(state.death_reason, Some(DeathReason::SelfCollision));
    }

    #[test]
    fn ended_state_is_terminal() {
        let mut state = GameState::new_with_seed(TEN, BoundaryMode::Wall, 2);
        let mut input = InputBuffer::new();
        place(&mut state, &[(9, 5)], Direction::Right);

        state.tick(&mut input);
        let ticks = state.tick_count;
        input.push(Direction::Up);

        assert_eq!(state.tick(&mut input), TickOutcome::Skipped);
        assert_eq!(state.tick_count, ticks);
        state.toggle_pause();
        assert_eq!(state.status, GameStatus::Ended);
    }

    #[test]
    fn reversing_input_is_ignored() {
        let mut state = GameState::new_with_seed(TEN, BoundaryMode::Wrap, 8);
        let mut input = InputBuffer::new();
        place(&mut state, &[(5, 5), (4, 5)], Direction::Right);
        state.food = None;

        input.push(Direction::Left);
        state.tick(&mut input);

        assert_eq!(state.heading, Direction::Right);
        assert_eq!(state.snake.head(), Position::new(6, 5));
    }

    #[test]
    fn paused_state_does_not_tick() {
        let mut state = GameState::new_with_seed(TEN, BoundaryMode::Wrap, 9);
        let mut input = InputBuffer::new();
        let head = state.snake.head();

        state.toggle_pause();

        assert_eq!(state.tick(&mut input), TickOutcome::Skipped);
        assert_eq!(state.snake.head(), head);
        state.toggle_pause();
        assert_eq!(state.status, GameStatus::Running);
    }

    #[test]
    fn filling_the_board_removes_food_without_ending() {
        let mut state =
            GameState::new_with_seed(GridSize { cols: 4, rows: 4 }, BoundaryMode::Wrap, 10);
        let mut input = InputBuffer::new();
        // Fifteen cells in a serpentine; the only free cell is (0, 3) and the
        // pending growth keeps the tail, so eating fills the board.
        place(
            &mut state,
            &[
                (1, 3),
                (2, 3),
                (3, 3),
                (3, 2),
                (2, 2),
                (1, 2),
                (0, 2),
                (0, 1),
                (1, 1),
                (2, 1),
                (3, 1),
                (3, 0),
                (2, 0),
                (1, 0),
                (0, 0),
            ],
            Direction::Left,
        );
        state.food = Some(Position::new(0, 3));
        state.pending_growth = 1;

        let outcome = state.tick(&mut input);

        assert_eq!(outcome, TickOutcome::Moved { ate: true });
        assert_eq!(state.food, None);
        assert_eq!(state.status, GameStatus::Running);
    }

    #[test]
    fn resize_wraps_coordinates_into_new_bounds() {
        let mut state =
            GameState::new_with_seed(GridSize { cols: 20, rows: 15 }, BoundaryMode::Wrap, 11);
        place(&mut state, &[(16, 10), (15, 10), (14, 10)], Direction::Right);
        state.food = Some(Position::new(19, 14));

        state.resize(GridSize { cols: 10, rows: 8 });

        let bounds = state.bounds();
        assert!(state.snake.cells().all(|cell| cell.is_within_bounds(bounds)));
        assert!(state.snake.body().contains(&Position::new(5, 2)));
        let food = state.food.expect("food kept or respawned");
        assert!(food.is_within_bounds(bounds));
        assert!(!state.snake.occupies(food));
    }

    #[test]
    fn resize_clamps_coordinates_in_wall_mode() {
        let mut state =
            GameState::new_with_seed(GridSize { cols: 20, rows: 15 }, BoundaryMode::Wall, 12);
        place(&mut state, &[(16, 10), (15, 10)], Direction::Right);

        state.resize(GridSize { cols: 10, rows: 8 });

        assert_eq!(state.snake.head(), Position::new(9, 7));
    }
}
