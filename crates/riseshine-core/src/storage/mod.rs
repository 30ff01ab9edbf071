mod config;
pub mod database;
mod memory;

pub use config::{Config, ConfigFile, CountdownConfig};
pub use database::Database;
pub use memory::MemoryStore;

use std::path::PathBuf;

use crate::error::{ConfigError, StorageError};
use crate::routine::{AppSettings, Timer};

/// Persisted task list.
///
/// Every mutation returns the full collection as stored afterwards, so
/// callers render from the store rather than from their own deltas.
pub trait TaskStore {
    fn list(&self) -> Result<Vec<Timer>, StorageError>;

    /// Overwrite the whole collection.
    fn replace_all(&mut self, timers: &[Timer]) -> Result<(), StorageError>;

    /// Insert, or replace the task with the same id in place.
    fn upsert(&mut self, timer: Timer) -> Result<Vec<Timer>, StorageError> {
        let mut timers = self.list()?;
        match timers.iter_mut().find(|t| t.id == timer.id) {
            Some(existing) => *existing = timer,
            None => timers.push(timer),
        }
        self.replace_all(&timers)?;
        self.list()
    }

    fn remove(&mut self, id: &str) -> Result<Vec<Timer>, StorageError> {
        let mut timers = self.list()?;
        timers.retain(|t| t.id != id);
        self.replace_all(&timers)?;
        self.list()
    }

    /// Forget every `lastCompleted` mark.
    fn clear_all_completion_marks(&mut self) -> Result<Vec<Timer>, StorageError> {
        let mut timers = self.list()?;
        timers.iter_mut().for_each(Timer::clear_completion);
        self.replace_all(&timers)?;
        self.list()
    }
}

/// Persisted schedule settings.
///
/// Callers validate the window before writing.
pub trait SettingsStore {
    fn read(&self) -> Result<AppSettings, ConfigError>;
    fn write(&mut self, settings: AppSettings) -> Result<AppSettings, ConfigError>;
}

/// Returns `~/.config/riseshine[-dev]/` based on RISESHINE_ENV.
///
/// Set RISESHINE_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("RISESHINE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("riseshine-dev")
    } else {
        base_dir.join("riseshine")
    };

    std::fs::create_dir_all(&dir).map_err(StorageError::DataDir)?;
    Ok(dir)
}
