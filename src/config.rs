//! Player settings with defaults and range checks.

use crate::mode::Mode;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub const MIN_TICK_RATE: f64 = 6.0;
pub const MAX_TICK_RATE: f64 = 18.0;
pub const DEFAULT_TICK_RATE: f64 = 7.0;
pub const MIN_GRID_SIZE: i32 = 10;
pub const MAX_GRID_SIZE: i32 = 32;
pub const DEFAULT_GRID_SIZE: i32 = 18;

/// Built-in colour themes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeName {
    #[default]
    Solar,
    Mint,
    Graphite,
    Candy,
}

impl ThemeName {
    pub const ALL: [Self; 4] = [Self::Solar, Self::Mint, Self::Graphite, Self::Candy];

    pub fn label(self) -> &'static str {
        match self {
            Self::Solar => "Solar",
            Self::Mint => "Mint",
            Self::Graphite => "Graphite",
            Self::Candy => "Candy",
        }
    }

    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }
}

/// Settings chosen before a session. Missing fields in stored data take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct Settings {
    pub mode: Mode,
    /// Ticks per second.
    pub tick_rate: f64,
    pub grid_size: i32,
    pub theme: ThemeName,
    pub wrap: bool,
    pub trail: bool,
    pub sound: bool,
    pub show_grid: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: Mode::Classic,
            tick_rate: DEFAULT_TICK_RATE,
            grid_size: DEFAULT_GRID_SIZE,
            theme: ThemeName::Solar,
            wrap: false,
            trail: true,
            sound: false,
            show_grid: true,
        }
    }
}

pub fn clamp_tick_rate(rate: f64) -> f64 {
    if rate.is_finite() {
        rate.clamp(MIN_TICK_RATE, MAX_TICK_RATE)
    } else {
        DEFAULT_TICK_RATE
    }
}

pub fn clamp_grid_size(size: i32) -> i32 {
    size.clamp(MIN_GRID_SIZE, MAX_GRID_SIZE)
}

impl Settings {
    /// Copy with out-of-range values pulled back into range.
    pub fn sanitized(mut self) -> Self {
        self.tick_rate = clamp_tick_rate(self.tick_rate);
        self.grid_size = clamp_grid_size(self.grid_size);
        self
    }
}
