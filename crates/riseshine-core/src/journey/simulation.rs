//! Parent-controlled time simulation.
//!
//! The offset is applied to the live real clock on every read, so a
//! simulated morning keeps ticking at normal speed.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;

/// Largest preview shift in either direction: one year.
pub const MAX_OFFSET_MINUTES: i64 = 365 * 24 * 60;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSimulation {
    pub active: bool,
    /// Minutes added to the real clock; negative previews the past. Applied
    /// clamped to [`MAX_OFFSET_MINUTES`].
    pub offset_minutes: i64,
}

impl TimeSimulation {
    pub fn with_offset(offset_minutes: i64) -> Self {
        Self {
            active: true,
            offset_minutes,
        }
    }

    pub fn reference_time(&self, real_now: DateTime<Utc>) -> DateTime<Utc> {
        if !self.active {
            return real_now;
        }
        let offset = self.offset_minutes.clamp(-MAX_OFFSET_MINUTES, MAX_OFFSET_MINUTES);
        TimeDelta::try_minutes(offset)
            .and_then(|delta| real_now.checked_add_signed(delta))
            .unwrap_or(if offset < 0 {
                DateTime::<Utc>::MIN_UTC
            } else {
                DateTime::<Utc>::MAX_UTC
            })
    }
}

/// A clock that reads through to another and applies a simulation.
#[derive(Debug, Clone)]
pub struct SimulatedClock<C> {
    real: C,
    simulation: TimeSimulation,
}

impl<C: Clock> SimulatedClock<C> {
    pub fn new(real: C, simulation: TimeSimulation) -> Self {
        Self { real, simulation }
    }

    pub fn simulation(&self) -> TimeSimulation {
        self.simulation
    }
}

impl<C: Clock> Clock for SimulatedClock<C> {
    fn now(&self) -> DateTime<Utc> {
        self.simulation.reference_time(self.real.now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::TimeZone;

    #[test]
    fn offset_moves_with_the_real_clock() {
        let real = ManualClock::new(Utc.with_ymd_and_hms(2024, 9, 2, 6, 0, 0).unwrap());
        let clock = SimulatedClock::new(real.clone(), TimeSimulation::with_offset(120));

        assert_eq!(clock.now(), Utc.with_ymd_and_hms(2024, 9, 2, 8, 0, 0).unwrap());
        real.advance_secs(1);
        assert_eq!(clock.now(), Utc.with_ymd_and_hms(2024, 9, 2, 8, 0, 1).unwrap());
    }

    #[test]
    fn negative_offsets_preview_the_past() {
        let now = Utc.with_ymd_and_hms(2024, 9, 2, 7, 30, 0).unwrap();
        let sim = TimeSimulation::with_offset(-45);
        let expected = Utc.with_ymd_and_hms(2024, 9, 2, 6, 45, 0).unwrap();
        assert_eq!(sim.reference_time(now), expected);
    }

    #[test]
    fn huge_offsets_are_clamped_to_a_year() {
        let now = Utc.with_ymd_and_hms(2024, 9, 2, 7, 30, 0).unwrap();
        let year = TimeDelta::try_minutes(MAX_OFFSET_MINUTES).unwrap();

        let ahead = TimeSimulation::with_offset(i64::MAX / 60);
        assert_eq!(ahead.reference_time(now), now + year);

        let behind = TimeSimulation::with_offset(i64::MIN);
        assert_eq!(behind.reference_time(now), now - year);
    }

    #[test]
    fn inactive_simulation_is_transparent() {
        let now = Utc.with_ymd_and_hms(2024, 9, 2, 7, 30, 0).unwrap();
        let sim = TimeSimulation {
            active: false,
            offset_minutes: 90,
        };
        assert_eq!(sim.reference_time(now), now);
    }
}
