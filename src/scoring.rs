//! Score and combo multiplier.

use std::time::{Duration, Instant};

/// Pickups closer together than this keep the combo going.
pub const COMBO_WINDOW: Duration = Duration::from_millis(2800);
pub const MAX_COMBO: u32 = 6;
/// Points per pickup before the multiplier.
pub const BASE_POINTS: f64 = 10.0;

/// Running score for one session. The combo window is wall-clock time, so it depends on how
/// fast the snake actually moves, not on tick count.
#[derive(Debug, Clone)]
pub struct ComboTracker {
    score: u32,
    combo: u32,
    /// Previous pickup, or session start before the first one.
    last_pickup: Instant,
}

impl ComboTracker {
    pub fn new(session_start: Instant) -> Self {
        Self {
            score: 0,
            combo: 1,
            last_pickup: session_start,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    /// Moves the reference point, e.g. when the session actually starts running.
    pub fn restart_clock(&mut self, now: Instant) {
        self.last_pickup = now;
    }

    /// Share of the combo window still open at `now`, from 1.0 right after a pickup down to 0.0.
    pub fn window_left(&self, now: Instant) -> f64 {
        let gap = now.saturating_duration_since(self.last_pickup);
        1.0 - (gap.as_secs_f64() / COMBO_WINDOW.as_secs_f64()).min(1.0)
    }

    /// Registers a pickup at `now` and returns the points awarded.
    pub fn record_pickup(&mut self, now: Instant) -> u32 {
        let gap = now.saturating_duration_since(self.last_pickup);
        self.combo = if gap < COMBO_WINDOW {
            (self.combo + 1).min(MAX_COMBO)
        } else {
            1
        };
        self.last_pickup = now;
        let points = (BASE_POINTS * self.combo as f64).round() as u32;
        self.score += points;
        points
    }
}
