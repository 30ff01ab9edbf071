//! Schedule settings: morning start, departure, and buffer.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const CLOCK_FORMAT: &str = "%H:%M";

/// Parse a `HH:mm` wall-clock time.
pub fn parse_clock_time(value: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(value.trim(), CLOCK_FORMAT)
        .map_err(|_| ValidationError::InvalidClockTime(value.to_string()))
}

/// Minutes since midnight.
fn minutes_of_day(time: NaiveTime) -> i64 {
    i64::from(time.hour()) * 60 + i64::from(time.minute())
}

mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&time.format(super::CLOCK_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_clock_time(&raw).map_err(serde::de::Error::custom)
    }
}

/// Parent-configured schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    #[serde(with = "hhmm", default = "default_morning_start")]
    pub morning_start: NaiveTime,
    #[serde(with = "hhmm", default = "default_departure_time")]
    pub departure_time: NaiveTime,
    /// Minutes reserved before departure for shoes and coats.
    #[serde(default = "default_buffer_minutes")]
    pub buffer_minutes: u32,
}

fn default_morning_start() -> NaiveTime {
    NaiveTime::from_hms_opt(7, 0, 0).unwrap_or(NaiveTime::MIN)
}
fn default_departure_time() -> NaiveTime {
    NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN)
}
fn default_buffer_minutes() -> u32 {
    5
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            morning_start: default_morning_start(),
            departure_time: default_departure_time(),
            buffer_minutes: default_buffer_minutes(),
        }
    }
}

impl AppSettings {
    /// Build settings from `HH:mm` strings, validating the window.
    pub fn parse(
        morning_start: &str,
        departure_time: &str,
        buffer_minutes: u32,
    ) -> Result<Self, ValidationError> {
        let settings = Self {
            morning_start: parse_clock_time(morning_start)?,
            departure_time: parse_clock_time(departure_time)?,
            buffer_minutes,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Minutes between morning start and departure, ignoring the buffer.
    /// Zero or negative means the configuration is unusable.
    pub fn window_minutes(&self) -> i64 {
        minutes_of_day(self.departure_time) - minutes_of_day(self.morning_start)
    }

    /// Refuse a window in which departure is not after the morning start,
    /// or in which the buffer reaches back to the morning start.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let window_minutes = self.window_minutes();
        if window_minutes <= 0 {
            return Err(ValidationError::InvalidWindow {
                start: self.morning_start.format(CLOCK_FORMAT).to_string(),
                departure: self.departure_time.format(CLOCK_FORMAT).to_string(),
            });
        }
        if i64::from(self.buffer_minutes) >= window_minutes {
            return Err(ValidationError::BufferTooLarge {
                buffer_minutes: self.buffer_minutes,
                window_minutes,
            });
        }
        Ok(())
    }
}
