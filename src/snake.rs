//! Snake body: a deque of cells, head first.

use crate::grid::Cell;
use std::collections::VecDeque;

pub const SPAWN_LENGTH: usize = 3;

/// Snake body, head first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snake {
    body: VecDeque<Cell>,
}

impl Snake {
    /// Horizontal snake of [`SPAWN_LENGTH`] cells with its head on `head`, tail trailing left.
    pub fn spawn(head: Cell) -> Self {
        let body = (0..SPAWN_LENGTH as i32)
            .map(|i| head.offset(-i, 0))
            .collect();
        Self { body }
    }

    pub fn from_cells(cells: impl IntoIterator<Item = Cell>) -> Self {
        Self {
            body: cells.into_iter().collect(),
        }
    }

    pub fn head(&self) -> Option<Cell> {
        self.body.front().copied()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn cells(&self) -> impl ExactSizeIterator<Item = &Cell> {
        self.body.iter()
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.body.contains(&cell)
    }

    /// True if `cell` is on the body as it stands now, tail included.
    pub fn self_intersects(&self, cell: Cell) -> bool {
        self.contains(cell)
    }

    /// Moves the head to `new_head`; the tail stays put when the snake `grew`.
    pub fn advance(&mut self, new_head: Cell, grew: bool) {
        self.body.push_front(new_head);
        if !grew {
            self.body.pop_back();
        }
    }

    /// Whether any two body cells coincide.
    pub fn has_duplicates(&self) -> bool {
        let mut seen = std::collections::HashSet::with_capacity(self.body.len());
        !self.body.iter().all(|c| seen.insert(*c))
    }
}
