//! Game engine: owns settings, the current session and the fixed-step clock, and exposes the
//! lifecycle operations the host calls.

use crate::config::{DEFAULT_GRID_SIZE, Settings, ThemeName, clamp_grid_size, clamp_tick_rate};
use crate::direction::Direction;
use crate::grid::Grid;
use crate::hud::Hud;
use crate::mode::{Mode, ModeEffect};
use crate::resolver::{Pickup, TickReport, resolve_tick};
use crate::rng::SessionRng;
use crate::scheduler::FixedStep;
use crate::session::{EndReason, Lifecycle, SessionState};
use crate::stats::SessionReport;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Grid sizes "surprise me" picks from.
const SURPRISE_GRIDS: [i32; 6] = [14, 16, 18, 20, 22, 24];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleRequest {
    Start,
    Pause,
    Resume,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("cannot {request:?} while {from}")]
    InvalidTransition {
        from: Lifecycle,
        request: LifecycleRequest,
    },
}

/// Notifications for the host (sound, persistence, effects). Drained once per frame.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    FoodEaten(Pickup),
    Teleported,
    ModeEffect(ModeEffect),
    SessionEnded(SessionReport),
    SettingsChanged(Settings),
}

pub struct GameEngine {
    settings: Settings,
    session: SessionState,
    clock: FixedStep,
    rng: SessionRng,
    /// Wall-clock instant of the current frame; pickups are timestamped with it.
    frame_time: Instant,
    events: Vec<GameEvent>,
}

impl GameEngine {
    pub fn new(settings: Settings) -> Self {
        Self::with_rng(settings, SessionRng::from_random())
    }

    pub fn with_seed(settings: Settings, seed: u64) -> Self {
        Self::with_rng(settings, SessionRng::new(seed))
    }

    fn with_rng(settings: Settings, mut rng: SessionRng) -> Self {
        let settings = settings.sanitized();
        let now = Instant::now();
        let session = Self::build_session(&settings, &mut rng, now);
        Self {
            settings,
            session,
            clock: FixedStep::new(),
            rng,
            frame_time: now,
            events: Vec::new(),
        }
    }

    fn build_session(settings: &Settings, rng: &mut SessionRng, now: Instant) -> SessionState {
        SessionState::new(
            Grid::new(settings.grid_size),
            settings.mode,
            settings.tick_rate,
            rng,
            now,
        )
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.session.lifecycle
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn tick_duration(&self) -> f64 {
        self.session.tick_duration()
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn hud(&self, best: u32) -> Hud {
        Hud::from_session(&self.session, best)
    }

    // --- lifecycle ---

    /// Throws away the current session and builds a fresh idle one.
    pub fn reset(&mut self) {
        self.clock.clear();
        self.session = Self::build_session(&self.settings, &mut self.rng, self.frame_time);
        tracing::debug!(mode = ?self.settings.mode, grid = self.settings.grid_size, "session reset");
    }

    pub fn start(&mut self) -> Result<(), LifecycleError> {
        self.transition(LifecycleRequest::Start, Lifecycle::Idle, Lifecycle::Running)?;
        self.clock.clear();
        self.session.scoring.restart_clock(self.frame_time);
        tracing::info!(
            mode = ?self.session.mode,
            tick_rate = self.session.tick_rate,
            seed = self.rng.seed(),
            "session started"
        );
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), LifecycleError> {
        self.transition(LifecycleRequest::Pause, Lifecycle::Running, Lifecycle::Paused)
    }

    /// Resumes and forgets the frame anchor so the paused interval is not simulated.
    pub fn resume(&mut self) -> Result<(), LifecycleError> {
        self.transition(LifecycleRequest::Resume, Lifecycle::Paused, Lifecycle::Running)?;
        self.clock.reanchor();
        Ok(())
    }

    pub fn toggle_pause(&mut self) -> Result<(), LifecycleError> {
        match self.session.lifecycle {
            Lifecycle::Paused => self.resume(),
            _ => self.pause(),
        }
    }

    /// Ended (or any) session back to a fresh one, then running.
    pub fn restart(&mut self) -> Result<(), LifecycleError> {
        self.reset();
        self.start()
    }

    fn transition(
        &mut self,
        request: LifecycleRequest,
        from: Lifecycle,
        to: Lifecycle,
    ) -> Result<(), LifecycleError> {
        let current = self.session.lifecycle;
        if current != from {
            return Err(LifecycleError::InvalidTransition {
                from: current,
                request,
            });
        }
        self.session.lifecycle = to;
        Ok(())
    }

    // --- input ---

    /// Queues a turn. Ignored once the session has ended. A turn queued while idle is kept
    /// and taken on the first tick after `start`.
    pub fn request_direction(&mut self, direction: Direction) -> bool {
        if self.session.lifecycle == Lifecycle::Ended {
            return false;
        }
        let active = self.session.direction;
        self.session.queue.request(active, direction)
    }

    // --- clock ---

    /// Host frame callback. Returns the number of ticks run.
    pub fn frame(&mut self, now: Instant) -> usize {
        match self.session.lifecycle {
            Lifecycle::Running => {
                let delta = self.clock.frame_delta(now);
                self.frame_time = now;
                self.run_accumulated(delta)
            }
            Lifecycle::Paused => {
                self.clock.hold(now);
                self.frame_time = now;
                0
            }
            Lifecycle::Idle | Lifecycle::Ended => {
                self.frame_time = now;
                0
            }
        }
    }

    /// Headless clock: advances both wall and simulated time by `delta_secs` and runs every
    /// whole tick that fits. Returns the number of ticks run.
    pub fn advance_simulated_time(&mut self, delta_secs: f64) -> usize {
        if self.session.lifecycle != Lifecycle::Running {
            return 0;
        }
        // Deltas past what `Instant` can hold leave the wall clock where it is.
        if let Some(t) = Duration::try_from_secs_f64(delta_secs)
            .ok()
            .and_then(|d| self.frame_time.checked_add(d))
        {
            self.frame_time = t;
        }
        self.run_accumulated(delta_secs)
    }

    fn run_accumulated(&mut self, delta_secs: f64) -> usize {
        self.clock.accumulate(delta_secs);
        let mut ticks = 0;
        while self.session.lifecycle == Lifecycle::Running
            && self.clock.consume(self.session.tick_duration())
        {
            self.step();
            ticks += 1;
        }
        if self.session.lifecycle == Lifecycle::Ended {
            self.clock.clear();
        }
        ticks
    }

    /// One logic tick regardless of the accumulator. No-op unless running.
    pub fn tick(&mut self) -> bool {
        if self.session.lifecycle != Lifecycle::Running {
            return false;
        }
        self.step();
        true
    }

    fn step(&mut self) {
        let step = self.session.tick_duration();
        let report = resolve_tick(
            &mut self.session,
            self.settings.wrap,
            step,
            self.frame_time,
            &mut self.rng,
        );
        self.absorb(report);
    }

    fn absorb(&mut self, report: TickReport) {
        if let Some((from, to)) = report.teleported {
            tracing::debug!(?from, ?to, "teleported");
            self.events.push(GameEvent::Teleported);
        }
        if let Some(pickup) = report.pickup {
            self.events.push(GameEvent::FoodEaten(pickup));
        }
        if let Some(effect) = report.mode_effect {
            tracing::debug!(?effect, "mode effect");
            self.events.push(GameEvent::ModeEffect(effect));
        }
        if let Some(reason) = report.ended {
            self.finish(reason);
        }
    }

    fn finish(&mut self, reason: EndReason) {
        self.session.finish(reason);
        let report = SessionReport {
            mode: self.session.mode,
            reason,
            food_eaten: self.session.food_eaten,
            elapsed: self.session.elapsed,
            max_length: self.session.snake.len(),
            final_score: self.session.score(),
        };
        tracing::info!(
            %reason,
            score = report.final_score,
            length = report.max_length,
            elapsed = report.elapsed,
            "session ended"
        );
        self.events.push(GameEvent::SessionEnded(report));
    }

    // --- settings ---

    fn settings_changed(&mut self) {
        tracing::info!(settings = ?self.settings, "settings changed");
        self.events.push(GameEvent::SettingsChanged(self.settings.clone()));
    }

    /// Switches mode and starts over with an idle session.
    pub fn set_mode(&mut self, mode: Mode) {
        self.settings.mode = mode;
        self.settings_changed();
        self.reset();
    }

    /// Applies immediately to the running session too.
    pub fn set_tick_rate(&mut self, rate: f64) {
        let rate = clamp_tick_rate(rate);
        self.settings.tick_rate = rate;
        self.session.tick_rate = rate;
        self.settings_changed();
    }

    /// Resizes the board and starts over with an idle session.
    pub fn set_grid_size(&mut self, size: i32) {
        self.settings.grid_size = clamp_grid_size(size);
        self.settings_changed();
        self.reset();
    }

    pub fn set_wrap(&mut self, wrap: bool) {
        self.settings.wrap = wrap;
        self.settings_changed();
    }

    pub fn set_trail(&mut self, trail: bool) {
        self.settings.trail = trail;
        self.settings_changed();
    }

    pub fn set_show_grid(&mut self, show: bool) {
        self.settings.show_grid = show;
        self.settings_changed();
    }

    pub fn set_sound(&mut self, sound: bool) {
        self.settings.sound = sound;
        self.settings_changed();
    }

    pub fn set_theme(&mut self, theme: ThemeName) {
        self.settings.theme = theme;
        self.settings_changed();
    }

    /// "Surprise me": random mode, theme, speed, board and toggles, then a fresh idle session.
    pub fn randomize_settings(&mut self) {
        let rng = &mut self.rng;
        let mode = rng.pick(&Mode::ALL).copied().unwrap_or_default();
        let theme = rng.pick(&ThemeName::ALL).copied().unwrap_or_default();
        let tick_rate = f64::from(rng.random_range(6_u8..=13));
        let grid_size = rng.pick(&SURPRISE_GRIDS).copied().unwrap_or(DEFAULT_GRID_SIZE);
        let wrap = rng.chance(0.5);
        let trail = rng.chance(0.7);
        let show_grid = rng.chance(0.7);
        self.settings = Settings {
            mode,
            tick_rate,
            grid_size,
            theme,
            wrap,
            trail,
            show_grid,
            sound: self.settings.sound,
        }
        .sanitized();
        self.settings_changed();
        self.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Cell;
    use crate::snake::Snake;

    fn engine(mode: Mode) -> GameEngine {
        let settings = Settings {
            mode,
            ..Settings::default()
        };
        let mut e = GameEngine::with_seed(settings, 1234);
        // Food parked in a corner so nothing is eaten unless a test puts it in the way.
        e.session.food = Cell::new(0, 17);
        e
    }

    fn cells(e: &GameEngine) -> Vec<Cell> {
        e.session().snake.cells().copied().collect()
    }

    fn ended_reports(events: &[GameEvent]) -> Vec<&SessionReport> {
        events
            .iter()
            .filter_map(|e| match e {
                GameEvent::SessionEnded(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn classic_first_tick() {
        let mut e = engine(Mode::Classic);
        assert_eq!(cells(&e), vec![Cell::new(9, 9), Cell::new(8, 9), Cell::new(7, 9)]);
        e.start().unwrap();
        let step = e.tick_duration();
        assert_eq!(e.advance_simulated_time(step), 1);
        assert_eq!(cells(&e), vec![Cell::new(10, 9), Cell::new(9, 9), Cell::new(8, 9)]);
        assert_eq!(e.session().score(), 0);
        assert_eq!(e.lifecycle(), Lifecycle::Running);
    }

    #[test]
    fn wall_hit_ends_session_and_reports() {
        let mut e = engine(Mode::Classic);
        e.session.snake = Snake::from_cells([Cell::new(17, 9), Cell::new(16, 9), Cell::new(15, 9)]);
        e.start().unwrap();
        assert!(e.tick());
        assert_eq!(e.lifecycle(), Lifecycle::Ended);
        assert_eq!(e.session().end_reason, Some(EndReason::Wall));
        let events = e.drain_events();
        let reports = ended_reports(&events);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].reason, EndReason::Wall);
        assert_eq!(reports[0].max_length, 3);
        assert_eq!(reports[0].mode, Mode::Classic);
    }

    #[test]
    fn no_ticks_after_end_in_same_frame() {
        let mut e = engine(Mode::Classic);
        e.session.snake = Snake::from_cells([Cell::new(17, 9), Cell::new(16, 9), Cell::new(15, 9)]);
        e.start().unwrap();
        assert_eq!(e.advance_simulated_time(10.0), 1);
        assert_eq!(e.clock.accumulated(), 0.0);
        assert_eq!(ended_reports(&e.drain_events()).len(), 1);
    }

    #[test]
    fn rush_speeds_up_per_pickup() {
        let mut e = engine(Mode::Rush);
        assert_eq!(e.session().tick_rate, 7.0);
        e.start().unwrap();
        for _ in 0..3 {
            let head = e.session().snake.head().unwrap();
            e.session.food = head.offset(1, 0);
            assert!(e.tick());
        }
        assert_eq!(e.session().food_eaten, 3);
        assert!((e.session().tick_rate - 7.9).abs() < 1e-9);
        // The configured speed is untouched.
        assert_eq!(e.settings().tick_rate, 7.0);
    }

    #[test]
    fn wrap_setting_applies_live() {
        let mut e = engine(Mode::Classic);
        e.set_wrap(true);
        e.session.snake = Snake::from_cells([Cell::new(17, 9), Cell::new(16, 9), Cell::new(15, 9)]);
        e.start().unwrap();
        e.tick();
        assert_eq!(e.lifecycle(), Lifecycle::Running);
        assert_eq!(e.session().snake.head(), Some(Cell::new(0, 9)));
    }

    #[test]
    fn accumulator_runs_whole_ticks() {
        let mut e = engine(Mode::Classic);
        e.set_tick_rate(8.0);
        e.start().unwrap();
        assert_eq!(e.advance_simulated_time(0.5), 4);
        assert_eq!(e.advance_simulated_time(0.0625), 0);
        assert_eq!(e.advance_simulated_time(0.0625), 1);
        assert_eq!(e.session().snake.head(), Some(Cell::new(14, 9)));
    }

    #[test]
    fn variable_frames_match_fixed_ticks() {
        let mut a = engine(Mode::Classic);
        let mut b = engine(Mode::Classic);
        a.set_tick_rate(8.0);
        b.set_tick_rate(8.0);
        a.start().unwrap();
        b.start().unwrap();
        a.advance_simulated_time(0.75);
        for d in [0.0625, 0.3125, 0.0, 0.125, 0.25] {
            b.advance_simulated_time(d);
        }
        assert_eq!(cells(&a), cells(&b));
    }

    #[test]
    fn lifecycle_rules() {
        let mut e = engine(Mode::Classic);
        assert_eq!(
            e.pause(),
            Err(LifecycleError::InvalidTransition {
                from: Lifecycle::Idle,
                request: LifecycleRequest::Pause
            })
        );
        assert!(e.resume().is_err());
        e.start().unwrap();
        assert!(e.start().is_err());
        e.toggle_pause().unwrap();
        assert_eq!(e.lifecycle(), Lifecycle::Paused);
        assert_eq!(e.advance_simulated_time(5.0), 0);
        e.toggle_pause().unwrap();
        assert_eq!(e.lifecycle(), Lifecycle::Running);
    }

    #[test]
    fn ended_cannot_pause_but_can_restart() {
        let mut e = engine(Mode::Classic);
        e.session.snake = Snake::from_cells([Cell::new(17, 9), Cell::new(16, 9), Cell::new(15, 9)]);
        e.start().unwrap();
        e.tick();
        assert!(e.pause().is_err());
        assert!(e.start().is_err());
        e.restart().unwrap();
        assert_eq!(e.lifecycle(), Lifecycle::Running);
        assert_eq!(e.session().snake.head(), Some(Cell::new(9, 9)));
        assert_eq!(e.session().end_reason, None);
    }

    #[test]
    fn pause_does_not_count_as_simulated_time() {
        let mut e = engine(Mode::Classic);
        e.set_tick_rate(8.0);
        e.start().unwrap();
        let t0 = Instant::now();
        e.frame(t0);
        assert_eq!(e.frame(t0 + Duration::from_millis(250)), 2);
        e.pause().unwrap();
        e.frame(t0 + Duration::from_secs(30));
        e.resume().unwrap();
        // First frame after resume only re-anchors.
        assert_eq!(e.frame(t0 + Duration::from_secs(60)), 0);
        assert_eq!(e.frame(t0 + Duration::from_secs(60) + Duration::from_millis(125)), 1);
        assert_eq!(e.session().snake.head(), Some(Cell::new(12, 9)));
    }

    #[test]
    fn reversal_request_is_dropped() {
        let mut e = engine(Mode::Classic);
        assert!(!e.request_direction(Direction::Left));
        assert!(e.session().queue.is_empty());
        assert!(e.request_direction(Direction::Up));
        assert!(e.request_direction(Direction::Left));
        assert!(!e.request_direction(Direction::Down));
        assert_eq!(e.session().queue.len(), 2);
    }

    #[test]
    fn combo_follows_wall_clock() {
        let mut e = engine(Mode::Classic);
        e.set_tick_rate(8.0);
        e.set_wrap(true);
        e.start().unwrap();
        // Slow: first pickup four seconds in.
        e.advance_simulated_time(3.875);
        let head = e.session().snake.head().unwrap();
        e.session.food = head.offset(1, 0);
        e.advance_simulated_time(0.125);
        assert_eq!(e.session().combo(), 1);
        // Quick follow-up.
        let head = e.session().snake.head().unwrap();
        e.session.food = head.offset(1, 0);
        e.advance_simulated_time(0.125);
        assert_eq!(e.session().combo(), 2);
        assert_eq!(e.session().score(), 30);
    }

    #[test]
    fn reset_discards_progress() {
        let mut e = engine(Mode::Classic);
        e.start().unwrap();
        e.request_direction(Direction::Up);
        e.tick();
        e.reset();
        assert_eq!(e.lifecycle(), Lifecycle::Idle);
        assert_eq!(e.session().elapsed, 0.0);
        assert!(e.session().queue.is_empty());
        assert_eq!(e.session().direction, Direction::Right);
    }

    #[test]
    fn reset_drops_pending_simulated_time() {
        let mut e = engine(Mode::Classic);
        e.start().unwrap();
        let step = e.tick_duration();
        assert_eq!(e.advance_simulated_time(0.9 * step), 0);
        assert!(e.clock.accumulated() > 0.0);
        e.reset();
        e.start().unwrap();
        assert_eq!(e.clock.accumulated(), 0.0);
        assert_eq!(e.advance_simulated_time(0.2 * step), 0);
        assert_eq!(e.session().snake.head(), Some(Cell::new(9, 9)));
    }

    #[test]
    fn huge_deltas_do_not_panic() {
        for delta in [1e19, 1e20, f64::MAX, f64::INFINITY, f64::NAN, -1.0] {
            let mut e = engine(Mode::Classic);
            e.session.snake =
                Snake::from_cells([Cell::new(17, 9), Cell::new(16, 9), Cell::new(15, 9)]);
            e.start().unwrap();
            let before = e.frame_time;
            let ticks = e.advance_simulated_time(delta);
            if delta >= 1e19 && delta.is_finite() {
                assert_eq!(ticks, 1);
                assert_eq!(e.lifecycle(), Lifecycle::Ended);
                assert_eq!(e.session().end_reason, Some(EndReason::Wall));
            } else {
                assert_eq!(ticks, 0);
                assert_eq!(e.frame_time, before);
            }
        }
    }

    #[test]
    fn turn_queued_while_idle_is_taken_on_first_tick() {
        let mut e = engine(Mode::Classic);
        assert!(e.request_direction(Direction::Up));
        e.start().unwrap();
        e.tick();
        assert_eq!(e.session().snake.head(), Some(Cell::new(9, 8)));
    }

    #[test]
    fn mode_change_rebuilds_content_and_notifies() {
        let mut e = engine(Mode::Classic);
        e.start().unwrap();
        e.set_mode(Mode::Labyrinth);
        assert_eq!(e.lifecycle(), Lifecycle::Idle);
        assert!(!e.session().obstacles.is_empty());
        let events = e.drain_events();
        assert!(events.iter().any(|ev| matches!(
            ev,
            GameEvent::SettingsChanged(s) if s.mode == Mode::Labyrinth
        )));
    }

    #[test]
    fn settings_are_clamped() {
        let mut e = engine(Mode::Classic);
        e.set_grid_size(4);
        assert_eq!(e.session().grid.size, crate::config::MIN_GRID_SIZE);
        e.set_tick_rate(50.0);
        assert_eq!(e.session().tick_rate, crate::config::MAX_TICK_RATE);
    }

    #[test]
    fn surprise_stays_in_bounds() {
        let mut e = engine(Mode::Classic);
        for _ in 0..25 {
            e.randomize_settings();
            let s = e.settings();
            assert!((6.0..=13.0).contains(&s.tick_rate));
            assert!(SURPRISE_GRIDS.contains(&s.grid_size));
            assert_eq!(e.session().grid.size, s.grid_size);
            assert_eq!(e.session().mode, s.mode);
        }
    }

    #[test]
    fn time_attack_expires() {
        let mut e = engine(Mode::Time);
        e.set_wrap(true);
        e.set_tick_rate(8.0);
        e.start().unwrap();
        e.session.food = Cell::new(-5, -5);
        e.advance_simulated_time(89.875);
        assert_eq!(e.lifecycle(), Lifecycle::Running);
        e.advance_simulated_time(0.125);
        assert_eq!(e.lifecycle(), Lifecycle::Ended);
        assert_eq!(e.session().end_reason, Some(EndReason::TimeExpired));
    }
}
