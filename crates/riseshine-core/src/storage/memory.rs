use super::{SettingsStore, TaskStore};
use crate::error::{ConfigError, StorageError};
use crate::routine::{AppSettings, Timer};

/// Volatile store for tests and throwaway sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    timers: Vec<Timer>,
    settings: AppSettings,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timers(timers: Vec<Timer>) -> Self {
        Self {
            timers,
            settings: AppSettings::default(),
        }
    }
}

impl TaskStore for MemoryStore {
    fn list(&self) -> Result<Vec<Timer>, StorageError> {
        Ok(self.timers.clone())
    }

    fn replace_all(&mut self, timers: &[Timer]) -> Result<(), StorageError> {
        self.timers = timers.to_vec();
        Ok(())
    }
}

impl SettingsStore for MemoryStore {
    fn read(&self) -> Result<AppSettings, ConfigError> {
        Ok(self.settings.clone())
    }

    fn write(&mut self, settings: AppSettings) -> Result<AppSettings, ConfigError> {
        self.settings = settings;
        Ok(self.settings.clone())
    }
}
