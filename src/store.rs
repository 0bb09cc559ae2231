//! Persist settings and statistics as JSON (XDG config or ~/.config/snaketui).

use crate::config::Settings;
use crate::stats::Statistics;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DIR_NAME: &str = "snaketui";
const FILENAME: &str = "cache.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid cache file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything kept between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cache {
    pub settings: Settings,
    pub stats: Statistics,
}

/// Default cache location: `$XDG_CONFIG_HOME/snaketui/cache.json`, else
/// `~/.config/snaketui/cache.json`, else the working directory.
pub fn default_path() -> PathBuf {
    let base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => std::env::var("HOME")
            .map(|h| PathBuf::from(h).join(".config"))
            .unwrap_or_else(|_| PathBuf::from(".")),
    };
    base.join(DIR_NAME).join(FILENAME)
}

#[derive(Debug, Clone)]
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the cache, sanitizing settings.
    pub fn try_load(&self) -> Result<Option<Cache>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut cache: Cache = serde_json::from_str(&raw)?;
        cache.settings = cache.settings.sanitized();
        Ok(Some(cache))
    }

    /// Like [`try_load`](Self::try_load) but never fails: unreadable data yields defaults.
    pub fn load(&self) -> Cache {
        match self.try_load() {
            Ok(Some(cache)) => cache,
            Ok(None) => Cache::default(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring stored cache");
                Cache::default()
            }
        }
    }

    /// Writes the cache, creating the directory if needed.
    pub fn save(&self, cache: &Cache) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(cache)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::Mode;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().join("nope.json"));
        assert!(store.try_load().unwrap().is_none());
        assert_eq!(store.load(), Cache::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().join("nested").join(FILENAME));
        let mut cache = Cache::default();
        cache.settings.mode = Mode::Portals;
        cache.settings.grid_size = 24;
        cache.stats.games_played = 4;
        cache.stats.best_by_mode.insert(Mode::Portals, 120);
        store.save(&cache).unwrap();
        assert_eq!(store.load(), cache);
    }

    #[test]
    fn corrupt_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FILENAME);
        fs::write(&path, "{ not json").unwrap();
        let store = CacheStore::new(&path);
        assert!(matches!(store.try_load(), Err(StoreError::Json(_))));
        assert_eq!(store.load(), Cache::default());
    }

    #[test]
    fn stored_settings_are_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FILENAME);
        fs::write(&path, r#"{"settings":{"grid_size":2,"tick_rate":40},"stats":{"games_played":3}}"#)
            .unwrap();
        let cache = CacheStore::new(&path).load();
        assert_eq!(cache.settings.grid_size, crate::config::MIN_GRID_SIZE);
        assert_eq!(cache.settings.tick_rate, crate::config::MAX_TICK_RATE);
        assert_eq!(cache.stats.games_played, 3);
        assert_eq!(cache.stats.best(Mode::Classic), 0);
    }
}
