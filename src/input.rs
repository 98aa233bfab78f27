use std::collections::VecDeque;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::config::INPUT_QUEUE_CAPACITY;

/// Canonical movement directions for snake input.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Returns the opposite direction.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Grid step for one move in this direction (y grows downwards).
    #[must_use]
    pub fn unit_vector(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }
}

/// Returns whether a direction change is legal (no immediate 180° turns).
#[must_use]
pub fn direction_change_is_valid(current: Direction, next: Direction) -> bool {
    next != current.opposite()
}

/// Maps arrow keys and WASD to directions.
#[must_use]
pub fn direction_for_key(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Up | KeyCode::Char('w' | 'W') => Some(Direction::Up),
        KeyCode::Down | KeyCode::Char('s' | 'S') => Some(Direction::Down),
        KeyCode::Left | KeyCode::Char('a' | 'A') => Some(Direction::Left),
        KeyCode::Right | KeyCode::Char('d' | 'D') => Some(Direction::Right),
        _ => None,
    }
}

/// Whether the host should keep processing a key after capture.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum KeyDisposition {
    /// The key steers the snake; the host must not act on it.
    Consumed,
    /// Not a steering key, or input is detached.
    Ignored,
}

/// Bounded queue of pending direction changes, drained once per tick.
///
/// Capture happens whenever the host delivers a key event; the tick is the
/// only consumer, so the queue is the single hand-off point between input
/// and simulation.
#[derive(Debug, Clone)]
pub struct InputBuffer {
    queue: VecDeque<Direction>,
    attached: bool,
}

impl Default for InputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            queue: VecDeque::with_capacity(INPUT_QUEUE_CAPACITY),
            attached: true,
        }
    }

    /// Records a raw key event.
    pub fn capture(&mut self, key: &KeyEvent) -> KeyDisposition {
        if !self.attached {
            return KeyDisposition::Ignored;
        }
        let Some(direction) = direction_for_key(key.code) else {
            return KeyDisposition::Ignored;
        };

        match key.kind {
            KeyEventKind::Press => {
                self.push(direction);
                KeyDisposition::Consumed
            }
            // Auto-repeat still belongs to the game, it just never queues.
            KeyEventKind::Repeat => KeyDisposition::Consumed,
            KeyEventKind::Release => KeyDisposition::Ignored,
        }
    }

    /// Queues a direction unless the queue is full or it repeats the last entry.
    pub fn push(&mut self, direction: Direction) {
        if !self.attached || self.queue.len() >= INPUT_QUEUE_CAPACITY {
            return;
        }
        if self.queue.back() == Some(&direction) {
            return;
        }
        self.queue.push_back(direction);
    }

    /// Returns at most one direction to apply this tick.
    ///
    /// Entries equal to `current` or its opposite are discarded while
    /// scanning from the front.
    pub fn consume_next_dir(&mut self, current: Direction) -> Option<Direction> {
        while let Some(next) = self.queue.pop_front() {
            if next == current || !direction_change_is_valid(current, next) {
                continue;
            }
            return Some(next);
        }
        None
    }

    /// Detaches from input and drops anything buffered. Safe to repeat.
    pub fn dispose(&mut self) {
        self.attached = false;
        self.queue.clear();
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};

    use crate::config::INPUT_QUEUE_CAPACITY;

    use super::{direction_change_is_valid, Direction, InputBuffer, KeyDisposition};

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn opposite_direction_is_correct() {
        assert_eq!(Direction::Up.opposite(), Direction::Down);
        assert_eq!(Direction::Down.opposite(), Direction::Up);
        assert_eq!(Direction::Left.opposite(), Direction::Right);
        assert_eq!(Direction::Right.opposite(), Direction::Left);
    }

    #[test]
    fn direction_change_rejects_reverse() {
        assert!(!direction_change_is_valid(Direction::Up, Direction::Down));
        assert!(!direction_change_is_valid(Direction::Right, Direction::Left));
        assert!(direction_change_is_valid(Direction::Up, Direction::Left));
        assert!(direction_change_is_valid(Direction::Up, Direction::Right));
    }

    #[test]
    fn opposite_input_is_never_returned() {
        let mut input = InputBuffer::new();
        input.push(Direction::Left);

        assert_eq!(input.consume_next_dir(Direction::Right), None);
        assert!(input.is_empty());
    }

    #[test]
    fn one_direction_per_tick_in_queue_order() {
        let mut input = InputBuffer::new();
        input.push(Direction::Up);
        input.push(Direction::Left);

        assert_eq!(input.consume_next_dir(Direction::Right), Some(Direction::Up));
        assert_eq!(input.consume_next_dir(Direction::Up), Some(Direction::Left));
        assert_eq!(input.consume_next_dir(Direction::Left), None);
    }

    #[test]
    fn invalid_front_entries_are_skipped() {
        let mut input = InputBuffer::new();
        input.push(Direction::Right);
        input.push(Direction::Down);

        assert_eq!(
            input.consume_next_dir(Direction::Right),
            Some(Direction::Down)
        );
    }

    #[test]
    fn queue_is_bounded_and_drops_duplicates() {
        let mut input = InputBuffer::new();
        input.push(Direction::Up);
        input.push(Direction::Up);
        assert_eq!(input.len(), 1);

        input.push(Direction::Left);
        input.push(Direction::Down);
        assert_eq!(input.len(), INPUT_QUEUE_CAPACITY);
        assert_eq!(input.consume_next_dir(Direction::Right), Some(Direction::Up));
        assert_eq!(input.consume_next_dir(Direction::Up), Some(Direction::Left));
    }

    #[test]
    fn capture_maps_arrows_and_wasd() {
        let mut input = InputBuffer::new();

        let disposition = input.capture(&key(KeyCode::Char('w'), KeyEventKind::Press));
        assert_eq!(disposition, KeyDisposition::Consumed);
        let disposition = input.capture(&key(KeyCode::Left, KeyEventKind::Press));
        assert_eq!(disposition, KeyDisposition::Consumed);

        assert_eq!(input.consume_next_dir(Direction::Right), Some(Direction::Up));
        assert_eq!(input.consume_next_dir(Direction::Up), Some(Direction::Left));
    }

    #[test]
    fn auto_repeat_is_consumed_but_not_queued() {
        let mut input = InputBuffer::new();

        let disposition = input.capture(&key(KeyCode::Up, KeyEventKind::Repeat));

        assert_eq!(disposition, KeyDisposition::Consumed);
        assert!(input.is_empty());
    }

    #[test]
    fn key_releases_are_neither_consumed_nor_queued() {
        let mut input = InputBuffer::new();

        let press = input.capture(&key(KeyCode::Left, KeyEventKind::Press));
        let release = input.capture(&key(KeyCode::Left, KeyEventKind::Release));

        assert_eq!(press, KeyDisposition::Consumed);
        assert_eq!(release, KeyDisposition::Ignored);
        assert_eq!(input.len(), 1);
    }

    #[test]
    fn non_direction_keys_are_left_to_the_host() {
        let mut input = InputBuffer::new();

        let disposition = input.capture(&key(KeyCode::Char('p'), KeyEventKind::Press));

        assert_eq!(disposition, KeyDisposition::Ignored);
        assert!(input.is_empty());
    }

    #[test]
    fn dispose_clears_and_detaches_repeatedly() {
        let mut input = InputBuffer::new();
        input.push(Direction::Up);

        input.dispose();
        input.dispose();

        assert!(input.is_empty());
        assert!(!input.is_attached());
        assert_eq!(
            input.capture(&key(KeyCode::Down, KeyEventKind::Press)),
            KeyDisposition::Ignored
        );
        assert_eq!(input.consume_next_dir(Direction::Right), None);
    }
}
