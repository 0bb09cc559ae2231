//! Game modes and their per-tick / per-pickup hooks.

use crate::content::grow_obstacles;
use crate::rng::SessionRng;
use crate::session::{EndReason, SessionState};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Rush speed-up per pickup, in ticks per second.
pub const RUSH_STEP: f64 = 0.3;
pub const RUSH_MAX_RATE: f64 = 18.0;
/// Labyrinth adds an obstacle whenever the score lands on a multiple of this.
pub const LABYRINTH_SCORE_STEP: u32 = 30;
/// Time attack length in seconds.
pub const TIME_ATTACK_SECS: f64 = 90.0;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Classic,
    Rush,
    Labyrinth,
    Portals,
    #[value(alias = "time-attack")]
    Time,
}

/// Side effect of a mode hook, reported to the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModeEffect {
    SpedUp { tick_rate: f64 },
    ObstacleAdded { total: usize },
}

impl Mode {
    pub const ALL: [Self; 5] = [Self::Classic, Self::Rush, Self::Labyrinth, Self::Portals, Self::Time];

    pub fn name(self) -> &'static str {
        match self {
            Self::Classic => "Classic",
            Self::Rush => "Rush",
            Self::Labyrinth => "Labyrinth",
            Self::Portals => "Portals",
            Self::Time => "Time Attack",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Classic => "No tricks, no timers.",
            Self::Rush => "Speed rises with every fruit.",
            Self::Labyrinth => "Random blocks in your way.",
            Self::Portals => "A pair of two-way teleports.",
            Self::Time => "90 seconds for the highest score.",
        }
    }

    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn has_obstacles(self) -> bool {
        self == Self::Labyrinth
    }

    pub fn has_portals(self) -> bool {
        self == Self::Portals
    }

    /// Seconds, 0 for unlimited.
    pub fn time_limit(self) -> f64 {
        match self {
            Self::Time => TIME_ATTACK_SECS,
            _ => 0.0,
        }
    }

    pub fn initial_tick_rate(self, configured: f64) -> f64 {
        configured
    }

    /// Runs first in every tick, after the clock has advanced.
    pub fn on_tick(self, session: &SessionState) -> Option<EndReason> {
        (session.time_limit > 0.0 && session.elapsed >= session.time_limit)
            .then_some(EndReason::TimeExpired)
    }

    /// Runs after score and food counter are updated, before the food is respawned.
    pub fn on_food_consumed(
        self,
        session: &mut SessionState,
        rng: &mut SessionRng,
    ) -> Option<ModeEffect> {
        match self {
            Self::Rush => {
                session.tick_rate = (session.tick_rate + RUSH_STEP).min(RUSH_MAX_RATE);
                Some(ModeEffect::SpedUp {
                    tick_rate: session.tick_rate,
                })
            }
            Self::Labyrinth if session.score() % LABYRINTH_SCORE_STEP == 0 => {
                let added = grow_obstacles(
                    &mut session.obstacles,
                    &session.grid,
                    &session.snake,
                    session.food,
                    rng,
                );
                added.then(|| ModeEffect::ObstacleAdded {
                    total: session.obstacles.len(),
                })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use std::time::Instant;

    fn session(mode: Mode) -> (SessionState, SessionRng) {
        let mut rng = SessionRng::new(17);
        let s = SessionState::new(Grid::new(18), mode, 7.0, &mut rng, Instant::now());
        (s, rng)
    }

    #[test]
    fn rush_caps_rate() {
        let (mut s, mut rng) = session(Mode::Rush);
        s.tick_rate = 17.9;
        Mode::Rush.on_food_consumed(&mut s, &mut rng);
        assert_eq!(s.tick_rate, RUSH_MAX_RATE);
        Mode::Rush.on_food_consumed(&mut s, &mut rng);
        assert_eq!(s.tick_rate, RUSH_MAX_RATE);
    }

    #[test]
    fn classic_hooks_are_inert() {
        let (mut s, mut rng) = session(Mode::Classic);
        assert_eq!(Mode::Classic.on_food_consumed(&mut s, &mut rng), None);
        s.elapsed = 1e6;
        assert_eq!(Mode::Classic.on_tick(&s), None);
        assert_eq!(s.tick_rate, 7.0);
    }

    #[test]
    fn time_mode_expires_at_limit() {
        let (mut s, _) = session(Mode::Time);
        s.elapsed = TIME_ATTACK_SECS - 0.01;
        assert_eq!(Mode::Time.on_tick(&s), None);
        s.elapsed = TIME_ATTACK_SECS;
        assert_eq!(Mode::Time.on_tick(&s), Some(EndReason::TimeExpired));
    }

    #[test]
    fn labyrinth_grows_only_on_multiples_of_thirty() {
        let (mut s, mut rng) = session(Mode::Labyrinth);
        let start = s.obstacles.len();
        let t0 = Instant::now();
        // First pickup: 10 points (slow pickups keep combo at 1).
        s.scoring.record_pickup(t0 + std::time::Duration::from_secs(10));
        assert_eq!(Mode::Labyrinth.on_food_consumed(&mut s, &mut rng), None);
        s.scoring.record_pickup(t0 + std::time::Duration::from_secs(20));
        s.scoring.record_pickup(t0 + std::time::Duration::from_secs(30));
        assert_eq!(s.score(), 30);
        let effect = Mode::Labyrinth.on_food_consumed(&mut s, &mut rng);
        assert_eq!(effect, Some(ModeEffect::ObstacleAdded { total: start + 1 }));
    }

    #[test]
    fn mode_cycle_visits_all() {
        let mut m = Mode::Classic;
        for _ in 0..Mode::ALL.len() {
            m = m.next();
        }
        assert_eq!(m, Mode::Classic);
    }
}
