//! Procedural obstacles and portals.

use crate::grid::{Cell, Grid};
use crate::rng::SessionRng;
use crate::snake::Snake;
use std::collections::HashSet;

/// Share of the board filled with obstacles at session start.
const OBSTACLE_FILL: f64 = 0.08;
/// Obstacles never exceed this share of the board.
const OBSTACLE_CAP: f64 = 0.10;
/// Attempts per target obstacle during initial generation.
const OBSTACLE_ATTEMPTS_PER_TARGET: usize = 8;
const GROW_ATTEMPTS: usize = 120;
/// Cells with both |dx| and |dy| below this, measured from the center, stay clear at spawn.
const SPAWN_CLEARANCE: i32 = 3;
const PORTAL_REDRAWS: usize = 20;

fn share_of_board(grid: &Grid, share: f64) -> usize {
    let area = (grid.size as f64) * (grid.size as f64);
    (area * share).floor() as usize
}

pub fn obstacle_target(grid: &Grid) -> usize {
    share_of_board(grid, OBSTACLE_FILL)
}

pub fn obstacle_cap(grid: &Grid) -> usize {
    share_of_board(grid, OBSTACLE_CAP)
}

/// True if `cell` lies in the clear square around the spawn point.
pub fn near_spawn(grid: &Grid, cell: Cell) -> bool {
    let center = grid.center();
    (cell.x - center.x).abs() < SPAWN_CLEARANCE && (cell.y - center.y).abs() < SPAWN_CLEARANCE
}

/// Scatters obstacles over the board away from the spawn area and the snake. May return fewer
/// than the target on crowded boards.
pub fn generate_obstacles(grid: &Grid, snake: &Snake, rng: &mut SessionRng) -> HashSet<Cell> {
    let target = obstacle_target(grid);
    let budget = target * OBSTACLE_ATTEMPTS_PER_TARGET;
    let mut blocks = HashSet::with_capacity(target);
    for _ in 0..budget {
        if blocks.len() >= target {
            break;
        }
        let cell = grid.random_cell(rng);
        if near_spawn(grid, cell) || blocks.contains(&cell) || snake.contains(cell) {
            continue;
        }
        blocks.insert(cell);
    }
    if blocks.len() < target {
        tracing::debug!(placed = blocks.len(), target, "obstacle budget exhausted");
    }
    blocks
}

/// Adds at most one obstacle clear of the snake and food. Returns whether one was added.
pub fn grow_obstacles(
    existing: &mut HashSet<Cell>,
    grid: &Grid,
    snake: &Snake,
    food: Cell,
    rng: &mut SessionRng,
) -> bool {
    let cap = obstacle_cap(grid);
    for _ in 0..GROW_ATTEMPTS {
        if existing.len() >= cap {
            return false;
        }
        let cell = grid.random_cell(rng);
        if existing.contains(&cell) || snake.contains(cell) || cell == food {
            continue;
        }
        existing.insert(cell);
        return true;
    }
    false
}

/// Two portal cells from `draw_empty`. The second is redrawn a bounded number of times while it
/// matches the first; after that a coinciding pair is accepted.
pub fn generate_portals(mut draw_empty: impl FnMut() -> Cell) -> [Cell; 2] {
    let first = draw_empty();
    let mut second = draw_empty();
    let mut redraws = 0;
    while second == first && redraws < PORTAL_REDRAWS {
        redraws += 1;
        second = draw_empty();
    }
    [first, second]
}
