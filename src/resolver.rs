//! One simulation tick: movement, teleport, collisions, food.

use crate::grid::Cell;
use crate::mode::ModeEffect;
use crate::rng::SessionRng;
use crate::session::{EndReason, SessionState};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pickup {
    pub points: u32,
    pub combo: u32,
    pub score: u32,
}

/// What happened during a tick. `ended` is set when the tick stopped the session; nothing after
/// the terminating step ran.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub teleported: Option<(Cell, Cell)>,
    pub pickup: Option<Pickup>,
    pub mode_effect: Option<ModeEffect>,
    pub ended: Option<EndReason>,
}

impl TickReport {
    fn end(mut self, reason: EndReason) -> Self {
        self.ended = Some(reason);
        self
    }
}

/// Advances `session` by one tick of `step` simulated seconds. `now` is the wall-clock instant
/// used for the combo window. Checks run in a fixed order and the first terminal one wins:
/// time, wall, self, obstacle.
pub fn resolve_tick(
    session: &mut SessionState,
    wrap: bool,
    step: f64,
    now: Instant,
    rng: &mut SessionRng,
) -> TickReport {
    let mut report = TickReport::default();
    session.elapsed += step;

    if let Some(reason) = session.mode.on_tick(session) {
        return report.end(reason);
    }

    if let Some(turn) = session.queue.pop() {
        session.direction = turn;
    }

    let Some(current) = session.snake.head() else {
        return report;
    };
    let (dx, dy) = session.direction.delta();
    let Some(mut head) = session.grid.wrap_or_reject(current.offset(dx, dy), wrap) else {
        return report.end(EndReason::Wall);
    };

    if let Some([a, b]) = session.portals {
        let exit = if head == a {
            Some(b)
        } else if head == b {
            Some(a)
        } else {
            None
        };
        if let Some(exit) = exit {
            report.teleported = Some((head, exit));
            head = exit;
        }
    }

    if session.snake.self_intersects(head) {
        return report.end(EndReason::SelfCollision);
    }
    if session.obstacles.contains(&head) {
        return report.end(EndReason::Obstacle);
    }

    let ate = head == session.food;
    session.snake.advance(head, ate);
    if ate {
        let points = session.scoring.record_pickup(now);
        session.food_eaten += 1;
        report.pickup = Some(Pickup {
            points,
            combo: session.combo(),
            score: session.score(),
        });
        let mode = session.mode;
        report.mode_effect = mode.on_food_consumed(session, rng);
        session.respawn_food(rng);
    }
    report
}
