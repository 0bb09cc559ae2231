//! snaketui: multi-mode snake in the terminal.

use anyhow::{Context, Result};
use clap::Parser;
use snaketui::app::App;
use snaketui::config::{Settings, ThemeName};
use snaketui::engine::GameEngine;
use snaketui::mode::Mode;
use snaketui::store::{CacheStore, default_path};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    let store = CacheStore::new(default_path());
    let cache = store.load();
    let settings = args.apply(cache.settings);
    tracing::info!(path = %store.path().display(), ?settings, "loaded settings");

    let mut engine = match args.seed {
        Some(seed) => GameEngine::with_seed(settings, seed),
        None => GameEngine::new(settings),
    };
    if args.autostart {
        engine.start()?;
    }

    let store = (!args.no_save).then_some(store);
    let mut app = App::new(engine, cache.stats, store, args.theme_file.clone());
    app.run()?;
    Ok(())
}

/// Log to a file; stdout belongs to the UI.
fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "snaketui=info".into()),
        )
        .init();
    Ok(())
}

/// Multi-mode snake in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "snaketui",
    version,
    about = "Snake in the terminal: classic, rush, labyrinth, portals and time attack.",
    long_about = "snaketui is a terminal snake game with five modes.\n\n\
        MODES:\n  classic    No tricks, no timers\n  rush       Speed rises with every fruit\n  \
        labyrinth  Random blocks, more appear as you score\n  portals    A pair of two-way teleports\n  \
        time       90 seconds for the highest score\n\n\
        CONTROLS:\n  Arrows / WASD / hjkl  Steer       Space / Enter  Start, pause, restart\n  \
        r  Reset   m  Mode   +/-  Speed   [ ]  Grid size   x  Surprise me\n  \
        o  Wrap    t  Trail  g  Grid lines  b  Sound   c  Theme   q / Esc  Quit\n\n\
        Settings and statistics are kept in $XDG_CONFIG_HOME/snaketui/cache.json."
)]
pub struct Args {
    /// Game mode. Defaults to the last one played.
    #[arg(short, long)]
    pub mode: Option<Mode>,

    /// Ticks per second (6-18).
    #[arg(short, long, value_name = "RATE")]
    pub speed: Option<f64>,

    /// Board size in cells per side (10-32).
    #[arg(short, long, value_name = "CELLS")]
    pub grid: Option<i32>,

    /// Built-in colour theme.
    #[arg(short, long)]
    pub theme: Option<ThemeName>,

    /// btop-style theme file (theme[key]="#hex") laid over the built-in theme.
    #[arg(long, value_name = "FILE")]
    pub theme_file: Option<PathBuf>,

    /// Leaving the board re-enters on the opposite edge.
    #[arg(long)]
    pub wrap: bool,

    /// Draw the body in one colour instead of fading it.
    #[arg(long)]
    pub no_trail: bool,

    /// Hide the grid dots.
    #[arg(long)]
    pub hide_grid: bool,

    /// Ring the terminal bell on pickups, teleports and crashes.
    #[arg(long)]
    pub sound: bool,

    /// RNG seed, for reproducible food and obstacle placement.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Do not write settings or statistics.
    #[arg(long)]
    pub no_save: bool,

    /// Write logs to this file (filter with RUST_LOG).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Start playing immediately.
    #[arg(long)]
    pub autostart: bool,
}

impl Args {
    /// Stored settings with anything given on the command line laid over them.
    pub fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(mode) = self.mode {
            settings.mode = mode;
        }
        if let Some(speed) = self.speed {
            settings.tick_rate = speed;
        }
        if let Some(grid) = self.grid {
            settings.grid_size = grid;
        }
        if let Some(theme) = self.theme {
            settings.theme = theme;
        }
        if self.wrap {
            settings.wrap = true;
        }
        if self.no_trail {
            settings.trail = false;
        }
        if self.hide_grid {
            settings.show_grid = false;
        }
        if self.sound {
            settings.sound = true;
        }
        settings.sanitized()
    }
}
