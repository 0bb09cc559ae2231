//! Board geometry: cells, wrap/bounds, random cells.

use crate::rng::SessionRng;
use crate::sampling::{Sampled, sample_until};
use serde::{Deserialize, Serialize};

/// Attempts `random_empty_cell` makes before giving up.
pub const EMPTY_CELL_ATTEMPTS: usize = 400;

/// Returned by `random_empty_cell` when the board looks full.
pub const FALLBACK_CELL: Cell = Cell::new(1, 1);

/// One board square. Signed so that `head + direction` may step off the board before bounds
/// are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Square N×N board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    pub size: i32,
}

impl Grid {
    pub const fn new(size: i32) -> Self {
        Self { size }
    }

    /// Center cell; the snake spawns here.
    pub fn center(&self) -> Cell {
        let c = self.size / 2;
        Cell::new(c, c)
    }

    pub fn contains(&self, cell: Cell) -> bool {
        (0..self.size).contains(&cell.x) && (0..self.size).contains(&cell.y)
    }

    /// Wraps `cell` onto the board, or returns `None` when wrapping is off and the cell lies
    /// outside it.
    pub fn wrap_or_reject(&self, cell: Cell, wrap: bool) -> Option<Cell> {
        if wrap {
            Some(Cell::new(
                cell.x.rem_euclid(self.size),
                cell.y.rem_euclid(self.size),
            ))
        } else if self.contains(cell) {
            Some(cell)
        } else {
            None
        }
    }

    pub fn random_cell(&self, rng: &mut SessionRng) -> Cell {
        Cell::new(
            rng.random_range(0..self.size),
            rng.random_range(0..self.size),
        )
    }

    /// Uniform cell for which `occupied` is false, or [`FALLBACK_CELL`] after
    /// [`EMPTY_CELL_ATTEMPTS`] misses.
    pub fn random_empty_cell(
        &self,
        rng: &mut SessionRng,
        mut occupied: impl FnMut(Cell) -> bool,
    ) -> Cell {
        let sampled = sample_until(
            EMPTY_CELL_ATTEMPTS,
            || self.random_cell(rng),
            |cell| !occupied(*cell),
            FALLBACK_CELL,
        );
        if let Sampled::Fallback(cell) = sampled {
            tracing::debug!(size = self.size, "no empty cell found, using fallback");
            return cell;
        }
        sampled.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_reduces_both_axes() {
        let grid = Grid::new(18);
        assert_eq!(grid.wrap_or_reject(Cell::new(18, 9), true), Some(Cell::new(0, 9)));
        assert_eq!(grid.wrap_or_reject(Cell::new(-1, -1), true), Some(Cell::new(17, 17)));
        assert_eq!(grid.wrap_or_reject(Cell::new(5, 5), true), Some(Cell::new(5, 5)));
    }

    #[test]
    fn no_wrap_rejects_out_of_bounds() {
        let grid = Grid::new(18);
        assert_eq!(grid.wrap_or_reject(Cell::new(18, 9), false), None);
        assert_eq!(grid.wrap_or_reject(Cell::new(3, -1), false), None);
        assert_eq!(grid.wrap_or_reject(Cell::new(17, 0), false), Some(Cell::new(17, 0)));
    }

    #[test]
    fn random_cells_stay_on_board() {
        let grid = Grid::new(10);
        let mut rng = SessionRng::new(7);
        for _ in 0..500 {
            assert!(grid.contains(grid.random_cell(&mut rng)));
        }
    }

    #[test]
    fn random_empty_cell_avoids_occupied() {
        let grid = Grid::new(4);
        let mut rng = SessionRng::new(11);
        let free = Cell::new(2, 3);
        for _ in 0..20 {
            assert_eq!(grid.random_empty_cell(&mut rng, |c| c != free), free);
        }
    }

    #[test]
    fn full_board_falls_back() {
        let grid = Grid::new(6);
        let mut rng = SessionRng::new(3);
        assert_eq!(grid.random_empty_cell(&mut rng, |_| true), FALLBACK_CELL);
    }
}
