use std::collections::VecDeque;

use crate::config::{BoundaryMode, GridSize};
use crate::input::Direction;

/// Grid position in logical cell coordinates.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns true when the position lies inside the bounds.
    #[must_use]
    pub fn is_within_bounds(self, bounds: GridSize) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.x < i32::from(bounds.cols)
            && self.y < i32::from(bounds.rows)
    }

    /// Returns this position wrapped into bounds on both axes.
    #[must_use]
    pub fn wrapped(self, bounds: GridSize) -> Self {
        Self {
            x: self.x.rem_euclid(i32::from(bounds.cols)),
            y: self.y.rem_euclid(i32::from(bounds.rows)),
        }
    }

    /// Returns this position clamped to the nearest in-bounds cell.
    #[must_use]
    pub fn clamped(self, bounds: GridSize) -> Self {
        Self {
            x: self.x.clamp(0, i32::from(bounds.cols) - 1),
            y: self.y.clamp(0, i32::from(bounds.rows) - 1),
        }
    }

    /// Brings the position into bounds under the given boundary policy.
    #[must_use]
    pub fn fitted(self, bounds: GridSize, mode: BoundaryMode) -> Self {
        match mode {
            BoundaryMode::Wrap => self.wrapped(bounds),
            BoundaryMode::Wall => self.clamped(bounds),
        }
    }

    /// The neighbouring cell in `direction`, unbounded.
    #[must_use]
    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.unit_vector();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Snake cells: a distinguished head plus the body, head-adjacent first.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Snake {
    head: Position,
    body: VecDeque<Position>,
}

impl Snake {
    /// Creates a snake at `head` with `body_len` cells trailing behind it.
    #[must_use]
    pub fn new(
        head: Position,
        heading: Direction,
        body_len: usize,
        bounds: GridSize,
        mode: BoundaryMode,
    ) -> Self {
        let mut body = VecDeque::with_capacity(body_len);
        let mut cursor = head;
        for _ in 0..body_len {
            cursor = cursor.step(heading.opposite()).fitted(bounds, mode);
            if cursor == head || body.contains(&cursor) {
                break;
            }
            body.push_back(cursor);
        }

        Self { head, body }
    }

    /// Creates a snake from explicit cells (first is the head).
    ///
    /// Returns `None` for an empty list.
    #[must_use]
    pub fn from_cells(cells: Vec<Position>) -> Option<Self> {
        let mut body = VecDeque::from(cells);
        let head = body.pop_front()?;
        Some(Self { head, body })
    }

    #[must_use]
    pub fn head(&self) -> Position {
        self.head
    }

    #[must_use]
    pub fn body(&self) -> &VecDeque<Position> {
        &self.body
    }

    /// Iterates head first, then body towards the tail.
    pub fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        std::iter::once(self.head).chain(self.body.iter().copied())
    }

    /// Returns the last cell (the head for a body-less snake).
    #[must_use]
    pub fn tail(&self) -> Position {
        self.body.back().copied().unwrap_or(self.head)
    }

    /// Head plus body.
    #[must_use]
    pub fn len(&self) -> usize {
        1 + self.body.len()
    }

    /// A snake always has a head.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns true if any cell, head included, occupies `position`.
    #[must_use]
    pub fn occupies(&self, position: Position) -> bool {
        self.head == position || self.body.contains(&position)
    }

    /// Returns true if a body cell (not the head) occupies `position`.
    #[must_use]
    pub fn body_occupies(&self, position: Position) -> bool {
        self.body.contains(&position)
    }

    /// Moves the head to `next_head`, keeping the old tail when `grow` is set.
    pub fn advance(&mut self, next_head: Position, grow: bool) {
        self.body.push_front(self.head);
        if !grow {
            let _ = self.body.pop_back();
        }
        self.head = next_head;
    }

    /// Re-fits every cell into new bounds.
    pub fn refit(&mut self, bounds: GridSize, mode: BoundaryMode) {
        self.head = self.head.fitted(bounds, mode);
        for cell in &mut self.body {
            *cell = cell.fitted(bounds, mode);
        }
    }
}
