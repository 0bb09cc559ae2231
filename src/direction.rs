//! Directions and the two-slot turn queue.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Turns buffered between ticks.
pub const QUEUE_CAPACITY: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// Unit vector (dx, dy); y grows downwards.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    pub fn from_delta(dx: i32, dy: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.delta() == (dx, dy))
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    pub fn is_opposite(self, other: Self) -> bool {
        self.opposite() == other
    }
}

/// FIFO of pending turns. Each entry is checked against the one before it (or the active
/// direction) so the snake can never reverse into itself, even with two quick key presses.
#[derive(Debug, Clone, Default)]
pub struct DirectionQueue {
    pending: VecDeque<Direction>,
}

impl DirectionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `next` unless it repeats or reverses the last queued (or `active`) direction, or
    /// the queue is full. Returns whether it was queued.
    pub fn request(&mut self, active: Direction, next: Direction) -> bool {
        let last = self.pending.back().copied().unwrap_or(active);
        if next == last || next.is_opposite(last) {
            return false;
        }
        if self.pending.len() >= QUEUE_CAPACITY {
            return false;
        }
        self.pending.push_back(next);
        true
    }

    pub fn pop(&mut self) -> Option<Direction> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Direction> {
        self.pending.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reversal_is_dropped() {
        let mut q = DirectionQueue::new();
        assert!(!q.request(Direction::Right, Direction::Left));
        assert!(q.is_empty());
    }

    #[test]
    fn repeat_is_dropped() {
        let mut q = DirectionQueue::new();
        assert!(!q.request(Direction::Right, Direction::Right));
        assert!(q.request(Direction::Right, Direction::Up));
        assert!(!q.request(Direction::Right, Direction::Up));
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn checks_against_last_queued_entry() {
        let mut q = DirectionQueue::new();
        assert!(q.request(Direction::Right, Direction::Up));
        // Left is legal after Up even though it reverses the active Right.
        assert!(q.request(Direction::Right, Direction::Left));
        assert_eq!(q.pop(), Some(Direction::Up));
        assert_eq!(q.pop(), Some(Direction::Left));
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn capacity_is_two() {
        let mut q = DirectionQueue::new();
        assert!(q.request(Direction::Right, Direction::Up));
        assert!(q.request(Direction::Right, Direction::Left));
        assert!(!q.request(Direction::Right, Direction::Down));
        assert_eq!(q.len(), QUEUE_CAPACITY);
    }

    #[test]
    fn from_delta_round_trip() {
        assert_eq!(Direction::from_delta(1, 0), Some(Direction::Right));
        assert_eq!(Direction::from_delta(0, -1), Some(Direction::Up));
        assert_eq!(Direction::from_delta(1, 1), None);
    }
}
