//! HUD values and their display formatting.

use crate::session::SessionState;

/// Values shown in the sidebar, derived from a session on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct Hud {
    pub score: u32,
    pub best: u32,
    pub combo: u32,
    /// Seconds remaining in a timed session, seconds played otherwise.
    pub clock: f64,
    pub tick_rate: f64,
    pub mode_name: &'static str,
}

impl Hud {
    pub fn from_session(session: &SessionState, best: u32) -> Self {
        Self {
            score: session.score(),
            best: best.max(session.score()),
            combo: session.combo(),
            clock: session.clock_seconds(),
            tick_rate: session.tick_rate,
            mode_name: session.mode.name(),
        }
    }

    pub fn clock_label(&self) -> String {
        format_time(self.clock)
    }

    pub fn speed_label(&self) -> String {
        format!("{}x", format_rate(self.tick_rate))
    }
}

/// `mm:ss`, rounding fractional seconds down.
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// One decimal, with a trailing `.0` dropped.
pub fn format_rate(rate: f64) -> String {
    let s = format!("{rate:.1}");
    match s.strip_suffix(".0") {
        Some(whole) => whole.to_string(),
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::mode::Mode;
    use crate::rng::SessionRng;
    use std::time::Instant;

    #[test]
    fn time_formatting() {
        assert_eq!(format_time(0.0), "00:00");
        assert_eq!(format_time(59.9), "00:59");
        assert_eq!(format_time(90.0), "01:30");
        assert_eq!(format_time(-3.0), "00:00");
        assert_eq!(format_time(3725.0), "62:05");
    }

    #[test]
    fn rate_formatting() {
        assert_eq!(format_rate(7.0), "7");
        assert_eq!(format_rate(7.9), "7.9");
        assert_eq!(format_rate(7.0 + 0.3 * 3.0), "7.9");
        assert_eq!(format_rate(18.0), "18");
    }

    #[test]
    fn timed_mode_counts_down() {
        let mut rng = SessionRng::new(5);
        let mut s = SessionState::new(Grid::new(18), Mode::Time, 7.0, &mut rng, Instant::now());
        s.elapsed = 10.25;
        let hud = Hud::from_session(&s, 40);
        assert_eq!(hud.clock_label(), "01:19");
        assert_eq!(hud.best, 40);
        assert_eq!(hud.mode_name, "Time Attack");
        assert_eq!(hud.speed_label(), "7x");
    }

    #[test]
    fn untimed_mode_counts_up() {
        let mut rng = SessionRng::new(5);
        let mut s = SessionState::new(Grid::new(18), Mode::Classic, 7.0, &mut rng, Instant::now());
        s.elapsed = 65.0;
        assert_eq!(Hud::from_session(&s, 0).clock_label(), "01:05");
    }
}
