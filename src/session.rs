//! Per-session state: snake, food, obstacles, portals, score, clock and lifecycle.

use crate::content::{generate_obstacles, generate_portals};
use crate::direction::{Direction, DirectionQueue};
use crate::grid::{Cell, Grid};
use crate::mode::Mode;
use crate::rng::SessionRng;
use crate::scoring::ComboTracker;
use crate::snake::Snake;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    Idle,
    Running,
    Paused,
    Ended,
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Ended => "ended",
        };
        f.write_str(s)
    }
}

/// Why a session ended. These are ordinary game outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EndReason {
    Wall,
    SelfCollision,
    Obstacle,
    TimeExpired,
}

impl EndReason {
    pub fn message(self) -> &'static str {
        match self {
            Self::Wall => "The wall stopped you.",
            Self::SelfCollision => "You caught your own tail.",
            Self::Obstacle => "You crashed into a block.",
            Self::TimeExpired => "Time's up.",
        }
    }
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Wall => "wall",
            Self::SelfCollision => "self-collision",
            Self::Obstacle => "obstacle",
            Self::TimeExpired => "time-expired",
        };
        f.write_str(s)
    }
}

/// Everything one playthrough owns. Rebuilt from scratch on reset; survives pause/resume.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub grid: Grid,
    pub mode: Mode,
    pub snake: Snake,
    pub direction: Direction,
    pub queue: DirectionQueue,
    pub food: Cell,
    pub obstacles: HashSet<Cell>,
    pub portals: Option<[Cell; 2]>,
    pub scoring: ComboTracker,
    pub food_eaten: u32,
    /// Simulated seconds, advanced one tick duration per tick.
    pub elapsed: f64,
    /// Seconds; 0 means no limit.
    pub time_limit: f64,
    /// Ticks per second.
    pub tick_rate: f64,
    pub lifecycle: Lifecycle,
    pub end_reason: Option<EndReason>,
}

impl SessionState {
    /// Fresh idle session: spawned snake, mode content, first food.
    pub fn new(grid: Grid, mode: Mode, tick_rate: f64, rng: &mut SessionRng, now: Instant) -> Self {
        let snake = Snake::spawn(grid.center());
        let obstacles = if mode.has_obstacles() {
            generate_obstacles(&grid, &snake, rng)
        } else {
            HashSet::new()
        };
        let mut session = Self {
            grid,
            mode,
            snake,
            direction: Direction::Right,
            queue: DirectionQueue::new(),
            food: Cell::new(0, 0),
            obstacles,
            portals: None,
            scoring: ComboTracker::new(now),
            food_eaten: 0,
            elapsed: 0.0,
            time_limit: mode.time_limit(),
            tick_rate: mode.initial_tick_rate(tick_rate),
            lifecycle: Lifecycle::Idle,
            end_reason: None,
        };
        if mode.has_portals() {
            let pair = generate_portals(|| session.random_empty_cell(rng));
            session.portals = Some(pair);
        }
        session.respawn_food(rng);
        session
    }

    pub fn score(&self) -> u32 {
        self.scoring.score()
    }

    pub fn combo(&self) -> u32 {
        self.scoring.combo()
    }

    /// Seconds per tick at the current rate.
    pub fn tick_duration(&self) -> f64 {
        1.0 / self.tick_rate
    }

    pub fn is_portal(&self, cell: Cell) -> bool {
        self.portals.is_some_and(|p| p.contains(&cell))
    }

    /// Cell reserved by the snake, an obstacle or a portal.
    pub fn is_occupied(&self, cell: Cell) -> bool {
        self.snake.contains(cell) || self.obstacles.contains(&cell) || self.is_portal(cell)
    }

    pub fn random_empty_cell(&self, rng: &mut SessionRng) -> Cell {
        self.grid.random_empty_cell(rng, |c| self.is_occupied(c))
    }

    pub fn respawn_food(&mut self, rng: &mut SessionRng) {
        self.food = self.random_empty_cell(rng);
    }

    /// Time left in a limited session, otherwise time played.
    pub fn clock_seconds(&self) -> f64 {
        if self.time_limit > 0.0 {
            (self.time_limit - self.elapsed).max(0.0)
        } else {
            self.elapsed
        }
    }

    pub fn finish(&mut self, reason: EndReason) {
        self.lifecycle = Lifecycle::Ended;
        self.end_reason = Some(reason);
    }
}
