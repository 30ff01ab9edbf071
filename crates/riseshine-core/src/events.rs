use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Every countdown state change produces an Event.
/// The host renders them and turns completions into side effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    CountdownStarted {
        remaining_sec: f64,
        /// True when leaving PAUSED rather than READY.
        resumed: bool,
        at: DateTime<Utc>,
    },
    CountdownPaused {
        remaining_sec: f64,
        at: DateTime<Utc>,
    },
    CountdownReset {
        total_sec: u32,
    },
    /// Fired once per run, on natural expiry or when marked done early.
    CountdownCompleted {
        early: bool,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn is_completion(&self) -> bool {
        matches!(self, Event::CountdownCompleted { .. })
    }
}

/// Epoch milliseconds to a UTC instant, saturating on out-of-range input.
pub(crate) fn instant(epoch_ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(epoch_ms)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
