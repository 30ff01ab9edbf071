//! Core error types for riseshine-core.
//!
//! Invalid user input is rejected with a [`ValidationError`] before it ever
//! reaches the countdown or journey engines. Storage and configuration errors
//! are kept separate so callers can decide whether to degrade to defaults.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for riseshine-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// Stored record could not be encoded or decoded
    #[error("Corrupt record under '{key}': {message}")]
    Corrupt { key: String, message: String },

    /// The data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(#[source] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Departure does not fall after the morning start
    #[error("Departure time ({departure}) must be after start time ({start})")]
    InvalidWindow { start: String, departure: String },

    /// The buffer leaves no time for the routine
    #[error("Buffer of {buffer_minutes} min must be shorter than the {window_minutes} min morning")]
    BufferTooLarge {
        buffer_minutes: u32,
        window_minutes: i64,
    },

    /// Not a `HH:mm` wall-clock time
    #[error("Invalid time '{0}': expected HH:mm")]
    InvalidClockTime(String),

    /// Task duration must be positive
    #[error("Please set a time greater than 0")]
    NonPositiveDuration,

    /// Task name is blank
    #[error("Please give the task a name")]
    EmptyTaskName,

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
