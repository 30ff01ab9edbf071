//! Routine budget shown next to the schedule settings.
//!
//! This answers "does the whole routine fit the morning" in whole minutes and
//! is deliberately independent of [`super::evaluate`]'s urgency, which answers
//! the same question second by second against the live clock. Near the
//! boundary the two can disagree.

use serde::{Deserialize, Serialize};

use crate::routine::AppSettings;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoutineBudget {
    pub total_window_minutes: i64,
    pub task_minutes: i64,
    pub buffer_minutes: i64,
    pub available_minutes: i64,
    /// Negative when the routine runs short.
    pub spare_minutes: i64,
    pub over_budget: bool,
    pub time_invalid: bool,
    pub task_percent: f64,
    pub buffer_percent: f64,
    pub free_percent: f64,
}

impl RoutineBudget {
    /// `total_task_seconds` is the duration of every task, done or not.
    pub fn compute(settings: &AppSettings, total_task_seconds: u64) -> Self {
        let total_window_minutes = settings.window_minutes();
        let task_minutes = total_task_seconds.div_ceil(60) as i64;
        let buffer_minutes = i64::from(settings.buffer_minutes);
        let available_minutes = (total_window_minutes - buffer_minutes).max(0);

        let percent = |mins: i64| {
            if total_window_minutes <= 0 {
                0.0
            } else {
                (mins as f64 / total_window_minutes as f64 * 100.0).min(100.0)
            }
        };
        let task_percent = percent(task_minutes);
        let buffer_percent = percent(buffer_minutes);

        Self {
            total_window_minutes,
            task_minutes,
            buffer_minutes,
            available_minutes,
            spare_minutes: available_minutes - task_minutes,
            over_budget: task_minutes > available_minutes,
            time_invalid: total_window_minutes <= 0,
            task_percent,
            buffer_percent,
            free_percent: (100.0 - task_percent - buffer_percent).max(0.0),
        }
    }
}
