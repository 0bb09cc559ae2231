//! App: terminal init, main loop, key handling and persistence of engine events.

use crate::config::{Settings, clamp_grid_size};
use crate::engine::{GameEngine, GameEvent};
use crate::hud::Hud;
use crate::input::{Action, key_to_action};
use crate::session::Lifecycle;
use crate::stats::Statistics;
use crate::store::{Cache, CacheStore};
use crate::theme::Theme;
use crate::ui::{self, View};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tachyonfx::Effect;

/// Target frame time (~60 FPS).
const FRAME_DURATION: Duration = Duration::from_millis(16);
/// Grid size change per key press.
const GRID_STEP: i32 = 2;

pub struct App {
    engine: GameEngine,
    theme: Theme,
    /// Optional btop-style file laid over the selected built-in theme.
    theme_file: Option<PathBuf>,
    /// `None` when persistence is disabled.
    store: Option<CacheStore>,
    stats: Statistics,
    /// Last finished session set a new best for its mode.
    new_best: bool,
    /// Snake fade-out for the ended session (created on first ended frame).
    end_effect: Option<Effect>,
    end_effect_process_time: Option<Instant>,
}

impl App {
    pub fn new(
        engine: GameEngine,
        stats: Statistics,
        store: Option<CacheStore>,
        theme_file: Option<PathBuf>,
    ) -> Self {
        let theme = load_theme(theme_file.as_deref(), engine.settings());
        Self {
            engine,
            theme,
            theme_file,
            store,
            stats,
            new_best: false,
            end_effect: None,
            end_effect_process_time: None,
        }
    }

    fn persist(&self) {
        let Some(store) = &self.store else {
            return;
        };
        let cache = Cache {
            settings: self.engine.settings().clone(),
            stats: self.stats.clone(),
        };
        if let Err(e) = store.save(&cache) {
            tracing::warn!(path = %store.path().display(), error = %e, "failed to save cache");
        }
    }

    fn clear_end_effect(&mut self) {
        self.end_effect = None;
        self.end_effect_process_time = None;
    }

    /// Terminal bell, the closest a terminal gets to a short tone.
    fn beep(&self) {
        if self.engine.settings().sound {
            let mut stdout = std::io::stdout();
            let _ = stdout.write_all(b"\x07");
            let _ = stdout.flush();
        }
    }

    fn handle_events(&mut self) {
        let mut settings_changed = false;
        for ev in self.engine.drain_events() {
            match ev {
                GameEvent::FoodEaten(_) | GameEvent::Teleported => self.beep(),
                GameEvent::ModeEffect(_) => {}
                GameEvent::SessionEnded(report) => {
                    self.new_best = self.stats.record(&report);
                    if self.new_best {
                        tracing::info!(mode = ?report.mode, score = report.final_score, "new best");
                    }
                    self.beep();
                    self.persist();
                }
                GameEvent::SettingsChanged(settings) => {
                    self.theme = load_theme(self.theme_file.as_deref(), &settings);
                    settings_changed = true;
                }
            }
        }
        if settings_changed {
            self.persist();
        }
    }

    /// Space / Enter: start when idle, toggle pause while playing, restart once ended.
    fn primary(&mut self) {
        let result = match self.engine.lifecycle() {
            Lifecycle::Idle => self.engine.start(),
            Lifecycle::Running | Lifecycle::Paused => self.engine.toggle_pause(),
            Lifecycle::Ended => {
                self.clear_end_effect();
                self.new_best = false;
                self.engine.restart()
            }
        };
        if let Err(e) = result {
            tracing::debug!(error = %e, "ignored lifecycle request");
        }
    }

    /// Returns false when the app should quit.
    fn apply_action(&mut self, action: Action) -> bool {
        let settings = self.engine.settings().clone();
        match action {
            Action::Quit => return false,
            Action::Turn(direction) => {
                self.engine.request_direction(direction);
            }
            Action::Primary => self.primary(),
            Action::Reset => self.engine.reset(),
            Action::CycleMode => self.engine.set_mode(settings.mode.next()),
            Action::SpeedUp => self.engine.set_tick_rate(settings.tick_rate.floor() + 1.0),
            Action::SpeedDown => self.engine.set_tick_rate(settings.tick_rate.ceil() - 1.0),
            Action::GridUp => self
                .engine
                .set_grid_size(clamp_grid_size(settings.grid_size + GRID_STEP)),
            Action::GridDown => self
                .engine
                .set_grid_size(clamp_grid_size(settings.grid_size - GRID_STEP)),
            Action::ToggleWrap => self.engine.set_wrap(!settings.wrap),
            Action::ToggleTrail => self.engine.set_trail(!settings.trail),
            Action::ToggleGrid => self.engine.set_show_grid(!settings.show_grid),
            Action::ToggleSound => self.engine.set_sound(!settings.sound),
            Action::CycleTheme => self.engine.set_theme(settings.theme.next()),
            Action::Surprise => self.engine.randomize_settings(),
            Action::None => {}
        }
        if self.engine.lifecycle() != Lifecycle::Ended {
            self.clear_end_effect();
            if self.engine.lifecycle() == Lifecycle::Idle {
                self.new_best = false;
            }
        }
        true
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let result = self.run_loop(&mut terminal);

        // Restore
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        self.persist();
        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            let now = Instant::now();
            self.engine.frame(now);
            self.handle_events();

            let hud = self.engine.hud(self.stats.best(self.engine.session().mode));
            self.draw(terminal, &hud, now)?;

            let timeout = FRAME_DURATION.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    if let Event::Key(key) = event::read()? {
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }
                        if !self.apply_action(key_to_action(key)) {
                            return Ok(());
                        }
                    }
                }
                self.handle_events();
            }
        }
    }

    fn draw(&mut self, terminal: &mut DefaultTerminal, hud: &Hud, now: Instant) -> Result<()> {
        let view = View {
            session: self.engine.session(),
            settings: self.engine.settings(),
            hud,
            stats: &self.stats,
            theme: &self.theme,
            new_best: self.new_best,
            now,
        };
        let end_effect = &mut self.end_effect;
        let end_effect_process_time = &mut self.end_effect_process_time;
        terminal.draw(|f| ui::draw(f, &view, end_effect, end_effect_process_time))?;
        Ok(())
    }
}

/// Theme for `settings`, falling back to the built-in one if the file can't be read.
fn load_theme(file: Option<&std::path::Path>, settings: &Settings) -> Theme {
    Theme::load(file, settings.theme).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "theme file unusable, using built-in theme");
        Theme::builtin(settings.theme)
    })
}
