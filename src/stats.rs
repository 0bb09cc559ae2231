//! Lifetime statistics aggregated from finished sessions.

use crate::mode::Mode;
use crate::session::EndReason;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary of one finished session, handed to the statistics store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub mode: Mode,
    pub reason: EndReason,
    pub food_eaten: u32,
    /// Simulated seconds.
    pub elapsed: f64,
    pub max_length: usize,
    pub final_score: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Statistics {
    pub games_played: u32,
    pub total_food: u32,
    /// Seconds.
    pub total_time: f64,
    pub max_length: usize,
    pub best_by_mode: BTreeMap<Mode, u32>,
}

impl Statistics {
    pub fn best(&self, mode: Mode) -> u32 {
        self.best_by_mode.get(&mode).copied().unwrap_or(0)
    }

    /// Folds a report in. Returns true if it set a new best for its mode.
    pub fn record(&mut self, report: &SessionReport) -> bool {
        self.games_played += 1;
        self.total_food += report.food_eaten;
        if report.elapsed.is_finite() && report.elapsed > 0.0 {
            self.total_time += report.elapsed;
        }
        self.max_length = self.max_length.max(report.max_length);
        let best = self.best_by_mode.entry(report.mode).or_insert(0);
        if report.final_score > *best {
            *best = report.final_score;
            true
        } else {
            false
        }
    }
}
