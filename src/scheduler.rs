//! Fixed-step accumulator between a variable frame clock and the logic tick rate.

use std::time::Instant;

#[derive(Debug, Clone, Default)]
pub struct FixedStep {
    /// Simulated seconds not yet consumed by ticks.
    accumulator: f64,
    /// Instant of the previous frame; `None` until the next frame re-anchors the clock.
    last_frame: Option<Instant>,
}

impl FixedStep {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accumulated(&self) -> f64 {
        self.accumulator
    }

    /// Seconds since the previous frame, zero on the first frame after an anchor reset.
    pub fn frame_delta(&mut self, now: Instant) -> f64 {
        let delta = self
            .last_frame
            .map(|prev| now.saturating_duration_since(prev).as_secs_f64())
            .unwrap_or(0.0);
        self.last_frame = Some(now);
        delta
    }

    /// Moves the frame anchor without accumulating, for frames where time must not count.
    pub fn hold(&mut self, now: Instant) {
        self.last_frame = Some(now);
    }

    /// Forgets the frame anchor; the next `frame_delta` returns zero.
    pub fn reanchor(&mut self) {
        self.last_frame = None;
    }

    pub fn accumulate(&mut self, delta_secs: f64) {
        if delta_secs.is_finite() && delta_secs > 0.0 {
            self.accumulator += delta_secs;
        }
    }

    /// Takes one `step` from the accumulator if it holds that much.
    pub fn consume(&mut self, step: f64) -> bool {
        if step > 0.0 && self.accumulator >= step {
            self.accumulator -= step;
            true
        } else {
            false
        }
    }

    /// Drops pending time and the frame anchor.
    pub fn clear(&mut self) {
        self.accumulator = 0.0;
        self.last_frame = None;
    }
}
