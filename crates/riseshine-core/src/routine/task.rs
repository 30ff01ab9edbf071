//! Persisted task definitions.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Duration a freshly opened task form starts with.
pub const DEFAULT_FORM_DURATION_SEC: u32 = 120;

/// Curtain colour drawn over the reward image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeColor {
    Blue,
    Pink,
    Yellow,
    Purple,
    Green,
    Orange,
}

impl ThemeColor {
    pub const ALL: [ThemeColor; 6] = [
        ThemeColor::Blue,
        ThemeColor::Pink,
        ThemeColor::Yellow,
        ThemeColor::Purple,
        ThemeColor::Green,
        ThemeColor::Orange,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeColor::Blue => "blue",
            ThemeColor::Pink => "pink",
            ThemeColor::Yellow => "yellow",
            ThemeColor::Purple => "purple",
            ThemeColor::Green => "green",
            ThemeColor::Orange => "orange",
        }
    }
}

impl fmt::Display for ThemeColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeColor {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "themeColor".into(),
                message: format!("unknown colour '{s}'"),
            })
    }
}

/// Cue played when a countdown completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundType {
    Chimes,
    Fanfare,
    Success,
}

impl SoundType {
    pub const ALL: [SoundType; 3] = [SoundType::Chimes, SoundType::Fanfare, SoundType::Success];

    pub fn as_str(&self) -> &'static str {
        match self {
            SoundType::Chimes => "chimes",
            SoundType::Fanfare => "fanfare",
            SoundType::Success => "success",
        }
    }
}

impl fmt::Display for SoundType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SoundType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "soundType".into(),
                message: format!("unknown sound '{s}'"),
            })
    }
}

/// A timed task in the morning routine.
///
/// The serialized shape (camelCase keys, `lastCompleted` omitted when unset)
/// is what the task store persists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timer {
    pub id: String,
    pub task_name: String,
    pub duration_sec: u32,
    pub image_uri: String,
    pub theme_color: ThemeColor,
    pub sound_type: SoundType,
    /// Epoch milliseconds of the most recent completion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_completed: Option<i64>,
}

impl Timer {
    /// Build a new task with a fresh id, rejecting blank names and zero
    /// durations.
    pub fn new(
        task_name: impl Into<String>,
        duration_sec: u32,
        image_uri: impl Into<String>,
        theme_color: ThemeColor,
        sound_type: SoundType,
    ) -> Result<Self, ValidationError> {
        let timer = Self {
            id: uuid::Uuid::new_v4().to_string(),
            task_name: task_name.into().trim().to_string(),
            duration_sec,
            image_uri: image_uri.into(),
            theme_color,
            sound_type,
            last_completed: None,
        };
        timer.validate()?;
        Ok(timer)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.duration_sec == 0 {
            return Err(ValidationError::NonPositiveDuration);
        }
        if self.task_name.trim().is_empty() {
            return Err(ValidationError::EmptyTaskName);
        }
        Ok(())
    }

    /// Whether `last_completed` falls on `today` in the given time zone.
    pub fn is_completed_on<Tz: TimeZone>(&self, today: NaiveDate, tz: &Tz) -> bool {
        self.last_completed
            .and_then(|ms| tz.timestamp_millis_opt(ms).single())
            .is_some_and(|at| at.date_naive() == today)
    }

    pub fn mark_completed(&mut self, at_ms: i64) {
        self.last_completed = Some(at_ms);
    }

    pub fn clear_completion(&mut self) {
        self.last_completed = None;
    }

    /// `m:ss` label shown on the task card.
    pub fn duration_label(&self) -> String {
        format!("{}:{:02}", self.duration_sec / 60, self.duration_sec % 60)
    }
}

/// Combine the form's minutes and seconds fields into a duration.
pub fn duration_from_parts(minutes: u32, seconds: u32) -> u32 {
    minutes.saturating_mul(60).saturating_add(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset, Utc};

    fn sample() -> Timer {
        Timer::new(
            "Brush Teeth",
            120,
            "https://example.com/teeth.png",
            ThemeColor::Blue,
            SoundType::Chimes,
        )
        .unwrap()
    }

    #[test]
    fn new_rejects_blank_name_and_zero_duration() {
        assert_eq!(
            Timer::new("   ", 60, "", ThemeColor::Pink, SoundType::Success).unwrap_err(),
            ValidationError::EmptyTaskName
        );
        assert_eq!(
            Timer::new("Shoes", 0, "", ThemeColor::Pink, SoundType::Success).unwrap_err(),
            ValidationError::NonPositiveDuration
        );
    }

    #[test]
    fn new_trims_name_and_assigns_unique_ids() {
        let a = Timer::new("  Shoes ", 60, "", ThemeColor::Green, SoundType::Fanfare).unwrap();
        let b = Timer::new("Shoes", 60, "", ThemeColor::Green, SoundType::Fanfare).unwrap();
        assert_eq!(a.task_name, "Shoes");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn completed_today_round_trip() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2024, 3, 5, 7, 15, 0).unwrap();
        let mut timer = sample();
        assert!(!timer.is_completed_on(now.date_naive(), &tz));

        timer.mark_completed(now.timestamp_millis());
        assert!(timer.is_completed_on(now.date_naive(), &tz));

        let tomorrow = (now + Duration::days(1)).date_naive();
        assert!(!timer.is_completed_on(tomorrow, &tz));

        timer.clear_completion();
        assert!(!timer.is_completed_on(now.date_naive(), &tz));
    }

    #[test]
    fn completed_today_uses_local_calendar_day() {
        // 23:30 UTC on the 4th is already the 5th at UTC+2.
        let at = Utc.with_ymd_and_hms(2024, 3, 4, 23, 30, 0).unwrap();
        let mut timer = sample();
        timer.mark_completed(at.timestamp_millis());

        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let fifth = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert!(timer.is_completed_on(fifth, &tz));
        assert!(!timer.is_completed_on(fifth, &Utc));
    }

    #[test]
    fn serialized_shape_uses_camel_case_and_omits_unset_completion() {
        let timer = sample();
        let json = serde_json::to_value(&timer).unwrap();
        assert_eq!(json["taskName"], "Brush Teeth");
        assert_eq!(json["durationSec"], 120);
        assert_eq!(json["themeColor"], "blue");
        assert_eq!(json["soundType"], "chimes");
        assert!(json.get("lastCompleted").is_none());
    }

    #[test]
    fn parses_palette_names() {
        assert_eq!("Orange".parse::<ThemeColor>().unwrap(), ThemeColor::Orange);
        assert_eq!("fanfare".parse::<SoundType>().unwrap(), SoundType::Fanfare);
        assert!("teal".parse::<ThemeColor>().is_err());
    }

    #[test]
    fn duration_helpers() {
        assert_eq!(duration_from_parts(2, 5), 125);
        let mut timer = sample();
        timer.duration_sec = 605;
        assert_eq!(timer.duration_label(), "10:05");
    }
}
