use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use snek::config::{BoundaryMode, GridSize};
use snek::game::{GameState, TickOutcome};
use snek::input::{Direction, InputBuffer};
use snek::interpolate::{polyline_length, snake_bar};

const SEEDS: u64 = 200;
const MAX_TICKS: u64 = 1500;
const BOARD: GridSize = GridSize { cols: 6, rows: 5 };
const DIRECTIONS: [Direction; 4] = [
    Direction::Up,
    Direction::Down,
    Direction::Left,
    Direction::Right,
];
const ALPHAS: [f64; 4] = [0.0, 0.25, 0.5, 0.9];

fn assert_board_consistent(state: &GameState, context: &str) {
    for cell in state.snake.cells() {
        assert!(cell.is_within_bounds(BOARD), "{context}: {cell:?} off the board");
    }
    if let Some(food) = state.food {
        assert!(food.is_within_bounds(BOARD), "{context}: food {food:?} off the board");
        assert!(!state.snake.occupies(food), "{context}: food {food:?} under the snake");
    }
    if !state.is_ended() {
        let distinct: HashSet<_> = state.snake.cells().collect();
        assert_eq!(distinct.len(), state.snake.len(), "{context}: snake overlaps itself");
    }
}

fn assert_bar_matches_target(state: &GameState, context: &str) {
    for alpha in ALPHAS {
        let bar = snake_bar(state, alpha);
        let drawn = polyline_length(&bar.points);
        assert!(
            (drawn - bar.target_length).abs() < 1e-4,
            "{context}: alpha {alpha} drew {drawn}, wanted {}",
            bar.target_length
        );
    }
}

fn play(seed: u64, boundary: BoundaryMode) {
    let mut state = GameState::new_with_seed(BOARD, boundary, seed);
    let mut input = InputBuffer::new();
    let mut steering = StdRng::seed_from_u64(seed ^ 0x5EED);

    assert_board_consistent(&state, "start");
    assert_bar_matches_target(&state, "start");

    for tick in 0..MAX_TICKS {
        let context = format!("{boundary:?} seed {seed} tick {tick}");
        if steering.gen_bool(0.3) {
            input.push(DIRECTIONS[steering.gen_range(0..DIRECTIONS.len())]);
        }

        let length = state.snake.len();
        let pending = state.pending_growth;
        let outcome = state.tick(&mut input);

        match outcome {
            TickOutcome::Moved { .. } => {
                let grew = pending > 0;
                assert_eq!(state.grew_last_tick, grew, "{context}");
                assert_eq!(state.snake.len(), length + usize::from(grew), "{context}");
            }
            TickOutcome::Ended(_) => assert_eq!(state.snake.len(), length, "{context}"),
            TickOutcome::Skipped => panic!("{context}: running game skipped a tick"),
        }
        assert_eq!(state.tick_count, tick + 1, "{context}");
        assert_board_consistent(&state, &context);
        assert_bar_matches_target(&state, &context);

        if state.is_ended() {
            return;
        }
    }
}

#[test]
fn random_play_keeps_wrapped_boards_consistent() {
    for seed in 0..SEEDS {
        play(seed, BoundaryMode::Wrap);
    }
}

#[test]
fn random_play_keeps_walled_boards_consistent() {
    for seed in 0..SEEDS {
        play(seed, BoundaryMode::Wall);
    }
}
