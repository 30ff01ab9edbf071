//! # Rise & Shine Core Library
//!
//! This library provides the core logic for Rise & Shine, a morning-routine
//! timer for children. Each task counts down while a reward image is
//! revealed; a "race to the bus" indicator shows whether the remaining tasks
//! still fit before departure.
//!
//! ## Architecture
//!
//! - **Countdown Engine**: A wall-clock-anchored state machine sampled by the
//!   caller; no internal threads
//! - **Countdown Session**: Cooperative frame loop with command channel and
//!   cancellation
//! - **Journey**: Pure progress/urgency evaluation with time simulation
//! - **Storage**: SQLite key-value task storage and TOML configuration
//!
//! ## Key Components
//!
//! - [`CountdownEngine`]: Per-task countdown state machine
//! - [`JourneyWindow`] / [`journey::evaluate`]: Race-to-bus evaluation
//! - [`AppState`]: Application state container shared by views
//! - [`TaskStore`] / [`SettingsStore`]: Persistence seams

pub mod app;
pub mod clock;
pub mod cue;
pub mod error;
pub mod events;
pub mod journey;
pub mod routine;
pub mod storage;
pub mod timer;

pub use app::AppState;
pub use clock::{Clock, ManualClock, SystemClock};
pub use cue::{CompletionCue, SilentCue};
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::Event;
pub use journey::{
    ActiveTask, JourneyState, JourneyWindow, RoutineBudget, SimulatedClock, TimeSimulation,
};
pub use routine::{AppSettings, SoundType, ThemeColor, Timer};
pub use storage::{Config, ConfigFile, Database, MemoryStore, SettingsStore, TaskStore};
pub use timer::{
    CountdownEngine, CountdownPhase, CountdownSession, Frame, SessionCommand, SessionExit,
    SessionObserver,
};
