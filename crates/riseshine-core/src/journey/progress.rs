//! Race-to-bus progress and urgency.
//!
//! Everything here is a pure function of its inputs. The reference time is
//! always passed in, whether it came from the real clock or a simulation.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::routine::{AppSettings, Timer};

/// The morning window on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneyWindow {
    pub start: DateTime<Utc>,
    pub departure: DateTime<Utc>,
    /// Departure minus the buffer; the line the race is measured against.
    pub effective_deadline: DateTime<Utc>,
}

impl JourneyWindow {
    /// Anchor the settings' wall-clock times to `date` in `tz`.
    pub fn from_settings<Tz: TimeZone>(settings: &AppSettings, date: NaiveDate, tz: &Tz) -> Self {
        let start = on_date(date, settings.morning_start, tz);
        let departure = on_date(date, settings.departure_time, tz);
        let effective_deadline = departure - Duration::minutes(i64::from(settings.buffer_minutes));
        Self {
            start,
            departure,
            effective_deadline,
        }
    }

    /// Seconds from start to the effective deadline.
    pub fn total_window_sec(&self) -> f64 {
        seconds_between(self.start, self.effective_deadline)
    }

    pub fn is_valid(&self) -> bool {
        self.total_window_sec() > 0.0
    }

    pub fn evaluate(&self, reference: DateTime<Utc>, aggregate_remaining_sec: f64) -> JourneyState {
        evaluate(
            self.start,
            self.effective_deadline,
            reference,
            aggregate_remaining_sec,
        )
    }
}

/// Combine a wall-clock time with a date, resolving DST folds to the earlier
/// instant and gaps by reading the time as UTC-offset-free.
fn on_date<Tz: TimeZone>(date: NaiveDate, time: NaiveTime, tz: &Tz) -> DateTime<Utc> {
    let naive = date.and_time(time);
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(at) => at.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => tz.from_utc_datetime(&naive).with_timezone(&Utc),
    }
}

fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 1000.0
}

/// One evaluation of the race indicator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JourneyState {
    pub reference_time: DateTime<Utc>,
    /// 0.0 .. 1.0 share of the window that has elapsed.
    pub progress_ratio: f64,
    /// Negative once the deadline has passed.
    pub seconds_until_deadline: f64,
    pub aggregate_remaining_sec: f64,
    /// On the way, but the tasks left need more time than is left.
    pub urgent: bool,
    /// The deadline has passed.
    pub late: bool,
    /// False when the window is empty or inverted.
    pub window_valid: bool,
}

impl JourneyState {
    /// Whole minutes until departure, never negative.
    pub fn minutes_until_deadline(&self) -> i64 {
        (self.seconds_until_deadline.max(0.0) / 60.0).ceil() as i64
    }

    pub fn status_line(&self) -> String {
        if !self.window_valid {
            "Schedule not set".to_string()
        } else if self.urgent {
            "Hurry up! Not enough time!".to_string()
        } else if self.late {
            "Bus has left!".to_string()
        } else {
            format!("{} mins until departure", self.minutes_until_deadline())
        }
    }
}

/// Evaluate the journey at `reference`.
///
/// An empty or inverted window yields zero progress with neither urgency nor
/// lateness; settings validation is expected to keep that state unreachable.
pub fn evaluate(
    start: DateTime<Utc>,
    effective_deadline: DateTime<Utc>,
    reference: DateTime<Utc>,
    aggregate_remaining_sec: f64,
) -> JourneyState {
    let total_window = seconds_between(start, effective_deadline);
    let seconds_until_deadline = seconds_between(reference, effective_deadline);

    if total_window <= 0.0 {
        return JourneyState {
            reference_time: reference,
            progress_ratio: 0.0,
            seconds_until_deadline,
            aggregate_remaining_sec,
            urgent: false,
            late: false,
            window_valid: false,
        };
    }

    let elapsed = seconds_between(start, reference);
    let progress_ratio = (elapsed / total_window).clamp(0.0, 1.0);
    let on_the_way = progress_ratio > 0.0 && progress_ratio < 1.0;

    JourneyState {
        reference_time: reference,
        progress_ratio,
        seconds_until_deadline,
        aggregate_remaining_sec,
        urgent: on_the_way && seconds_until_deadline < aggregate_remaining_sec,
        late: seconds_until_deadline < 0.0,
        window_valid: true,
    }
}

/// The task currently being timed and its live remaining time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveTask<'a> {
    pub id: &'a str,
    pub remaining_sec: f64,
}

/// Seconds still needed by the tasks not completed on `today`.
///
/// The active task contributes its live remaining time instead of its full
/// duration.
pub fn aggregate_remaining_sec<Tz: TimeZone>(
    timers: &[Timer],
    active: Option<ActiveTask<'_>>,
    today: NaiveDate,
    tz: &Tz,
) -> f64 {
    timers
        .iter()
        .filter(|t| !t.is_completed_on(today, tz))
        .map(|t| match active {
            Some(active) if active.id == t.id => active.remaining_sec.max(0.0),
            _ => f64::from(t.duration_sec),
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routine::{SoundType, ThemeColor};
    use chrono::FixedOffset;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 2, h, m, s).unwrap()
    }

    fn timer(id: &str, secs: u32) -> Timer {
        Timer {
            id: id.into(),
            task_name: id.into(),
            duration_sec: secs,
            image_uri: String::new(),
            theme_color: ThemeColor::Blue,
            sound_type: SoundType::Success,
            last_completed: None,
        }
    }

    #[test]
    fn halfway_through_the_morning() {
        let state = evaluate(at(7, 0, 0), at(7, 55, 0), at(7, 30, 0), 0.0);
        assert!((state.progress_ratio - 0.5455).abs() < 1e-4);
        assert_eq!(state.seconds_until_deadline, 1500.0);
        assert!(!state.urgent);
        assert!(!state.late);
        assert_eq!(state.status_line(), "25 mins until departure");
    }

    #[test]
    fn urgent_when_tasks_outlast_the_clock() {
        let state = evaluate(at(7, 0, 0), at(7, 55, 0), at(7, 50, 0), 600.0);
        assert_eq!(state.seconds_until_deadline, 300.0);
        assert!(state.urgent);
        assert!(!state.late);
        assert_eq!(state.status_line(), "Hurry up! Not enough time!");
    }

    #[test]
    fn exactly_enough_time_is_not_urgent() {
        let state = evaluate(at(7, 0, 0), at(7, 55, 0), at(7, 50, 0), 300.0);
        assert!(!state.urgent);
    }

    #[test]
    fn late_after_the_deadline() {
        let state = evaluate(at(7, 0, 0), at(8, 0, 0), at(8, 1, 0), 600.0);
        assert_eq!(state.progress_ratio, 1.0);
        assert_eq!(state.seconds_until_deadline, -60.0);
        assert!(state.late);
        assert!(!state.urgent);
        assert_eq!(state.status_line(), "Bus has left!");
        assert_eq!(state.minutes_until_deadline(), 0);
    }

    #[test]
    fn no_urgency_before_the_journey_starts() {
        let state = evaluate(at(7, 0, 0), at(7, 55, 0), at(6, 30, 0), 100_000.0);
        assert_eq!(state.progress_ratio, 0.0);
        assert!(!state.urgent);
        assert!(!state.late);
    }

    #[test]
    fn invalid_window_reports_nothing() {
        let state = evaluate(at(8, 0, 0), at(7, 0, 0), at(7, 30, 0), 600.0);
        assert!(!state.window_valid);
        assert_eq!(state.progress_ratio, 0.0);
        assert!(!state.urgent);
        assert!(!state.late);
    }

    #[test]
    fn window_from_settings_subtracts_buffer() {
        let settings = AppSettings::parse("07:00", "08:00", 5).unwrap();
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 9, 2).unwrap();
        let window = JourneyWindow::from_settings(&settings, date, &tz);

        assert_eq!(window.start, at(12, 0, 0));
        assert_eq!(window.departure, at(13, 0, 0));
        assert_eq!(window.effective_deadline, at(12, 55, 0));
        assert_eq!(window.total_window_sec(), 55.0 * 60.0);
        assert!(window.is_valid());
    }

    #[test]
    fn buffer_can_swallow_the_window() {
        let settings = AppSettings {
            morning_start: NaiveTime::from_hms_opt(7, 50, 0).unwrap(),
            departure_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            buffer_minutes: 15,
        };
        let date = NaiveDate::from_ymd_opt(2024, 9, 2).unwrap();
        let window = JourneyWindow::from_settings(&settings, date, &Utc);
        assert!(!window.is_valid());
        assert!(!window.evaluate(at(7, 52, 0), 60.0).window_valid);
    }

    #[test]
    fn aggregate_substitutes_live_remaining_and_skips_done_tasks() {
        let today = NaiveDate::from_ymd_opt(2024, 9, 2).unwrap();
        let mut done = timer("teeth", 120);
        done.mark_completed(at(7, 5, 0).timestamp_millis());
        let mut yesterday = timer("shoes", 60);
        yesterday.mark_completed(at(7, 5, 0).timestamp_millis() - 86_400_000);
        let timers = vec![done, yesterday, timer("dress", 300), timer("eat", 600)];

        assert_eq!(aggregate_remaining_sec(&timers, None, today, &Utc), 960.0);

        let active = ActiveTask {
            id: "eat",
            remaining_sec: 42.5,
        };
        assert_eq!(
            aggregate_remaining_sec(&timers, Some(active), today, &Utc),
            402.5
        );

        // A finished task being re-run no longer counts.
        let rerun = ActiveTask {
            id: "teeth",
            remaining_sec: 100.0,
        };
        assert_eq!(
            aggregate_remaining_sec(&timers, Some(rerun), today, &Utc),
            960.0
        );
    }
}
