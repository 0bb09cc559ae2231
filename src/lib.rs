//! Grid snake engine with classic, rush, labyrinth, portals and time-attack modes, plus the
//! ratatui front end that drives it.
//!
//! The engine is rendering-free: [`engine::GameEngine`] owns the session and a fixed-step
//! clock, and can be driven from a terminal loop ([`engine::GameEngine::frame`]) or headless
//! ([`engine::GameEngine::advance_simulated_time`]).

pub mod app;
pub mod config;
pub mod content;
pub mod direction;
pub mod engine;
pub mod grid;
pub mod hud;
pub mod input;
pub mod mode;
pub mod resolver;
pub mod rng;
pub mod sampling;
pub mod scheduler;
pub mod scoring;
pub mod session;
pub mod snake;
pub mod stats;
pub mod store;
pub mod theme;
pub mod ui;

pub use config::Settings;
pub use engine::{GameEngine, GameEvent, LifecycleError};
pub use session::{EndReason, Lifecycle, SessionState};
