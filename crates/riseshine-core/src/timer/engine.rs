//! Countdown engine implementation.
//!
//! The engine is a wall-clock-anchored state machine. It never accumulates
//! frame deltas: while running, every sample recomputes the remaining time
//! from the anchor instant, so dropped frames or a suspended process cannot
//! make it drift.
//!
//! ## State Transitions
//!
//! ```text
//! Ready -> Running -> (Paused -> Running)* -> Completed
//!   ^                                            |
//!   +------------------- reset ------------------+
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = CountdownEngine::new(120)?;
//! engine.start(clock.now_ms());
//! // Once per frame:
//! let sample = engine.sample(clock.now_ms());
//! if let Some(done) = sample.completed { /* play cue, persist */ }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::events::{instant, Event};
use crate::routine::Timer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountdownPhase {
    /// Not yet started; remaining equals the full duration.
    Ready,
    Running,
    Paused,
    /// Terminal until reset. Doubles as the completion latch.
    Completed,
}

/// Result of sampling the engine against the wall clock.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub remaining_sec: f64,
    /// `Some` only on the sample that crossed zero.
    pub completed: Option<Event>,
}

/// Countdown for one activated task.
///
/// Lives only as long as the session view; nothing here is persisted.
#[derive(Debug, Clone)]
pub struct CountdownEngine {
    total_duration_sec: u32,
    phase: CountdownPhase,
    /// Remaining seconds captured at the last pause or reset.
    baseline_sec: f64,
    /// Epoch milliseconds the current running period is measured from.
    anchor_ms: Option<i64>,
    /// Last computed remaining time.
    remaining_sec: f64,
}

impl CountdownEngine {
    /// Create an engine in the `Ready` phase.
    ///
    /// # Errors
    /// Returns [`ValidationError::NonPositiveDuration`] for a zero duration.
    pub fn new(total_duration_sec: u32) -> Result<Self, ValidationError> {
        if total_duration_sec == 0 {
            return Err(ValidationError::NonPositiveDuration);
        }
        let total = f64::from(total_duration_sec);
        Ok(Self {
            total_duration_sec,
            phase: CountdownPhase::Ready,
            baseline_sec: total,
            anchor_ms: None,
            remaining_sec: total,
        })
    }

    pub fn for_timer(timer: &Timer) -> Result<Self, ValidationError> {
        Self::new(timer.duration_sec)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> CountdownPhase {
        self.phase
    }

    pub fn total_duration_sec(&self) -> u32 {
        self.total_duration_sec
    }

    /// Remaining time as of the most recent sample or transition.
    pub fn remaining_sec(&self) -> f64 {
        self.remaining_sec
    }

    pub fn is_running(&self) -> bool {
        self.phase == CountdownPhase::Running
    }

    /// 0.0 .. 1.0 share of the duration already used up.
    pub fn progress(&self) -> f64 {
        1.0 - self.curtain_fraction()
    }

    /// 0.0 .. 1.0 share of the reward image still covered.
    pub fn curtain_fraction(&self) -> f64 {
        (self.remaining_sec / f64::from(self.total_duration_sec)).clamp(0.0, 1.0)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start from `Ready` or resume from `Paused`.
    pub fn start(&mut self, now_ms: i64) -> Option<Event> {
        match self.phase {
            CountdownPhase::Ready | CountdownPhase::Paused => {
                let resumed = self.phase == CountdownPhase::Paused;
                self.anchor_ms = Some(now_ms);
                self.phase = CountdownPhase::Running;
                Some(Event::CountdownStarted {
                    remaining_sec: self.baseline_sec,
                    resumed,
                    at: instant(now_ms),
                })
            }
            CountdownPhase::Running | CountdownPhase::Completed => None,
        }
    }

    pub fn pause(&mut self, now_ms: i64) -> Option<Event> {
        if self.phase != CountdownPhase::Running {
            return None;
        }
        // A pause that lands after expiry is the expiry.
        let sample = self.sample(now_ms);
        if let Some(completed) = sample.completed {
            return Some(completed);
        }
        self.baseline_sec = sample.remaining_sec;
        self.anchor_ms = None;
        self.phase = CountdownPhase::Paused;
        Some(Event::CountdownPaused {
            remaining_sec: self.baseline_sec,
            at: instant(now_ms),
        })
    }

    /// The single play/pause button.
    pub fn toggle(&mut self, now_ms: i64) -> Option<Event> {
        if self.is_running() {
            self.pause(now_ms)
        } else {
            self.start(now_ms)
        }
    }

    /// Back to `Ready` from any phase, re-arming completion.
    pub fn reset(&mut self) -> Option<Event> {
        let total = f64::from(self.total_duration_sec);
        self.phase = CountdownPhase::Ready;
        self.baseline_sec = total;
        self.remaining_sec = total;
        self.anchor_ms = None;
        Some(Event::CountdownReset {
            total_sec: self.total_duration_sec,
        })
    }

    /// Finish immediately. Fires the same one-shot completion as expiry.
    pub fn mark_done_early(&mut self, now_ms: i64) -> Option<Event> {
        if self.phase == CountdownPhase::Completed {
            return None;
        }
        Some(self.complete(now_ms, true))
    }

    /// Recompute remaining time from the wall clock.
    ///
    /// Returns the completion event exactly once, on the sample that reaches
    /// zero; later samples report zero with no event.
    pub fn sample(&mut self, now_ms: i64) -> Sample {
        let Some(anchor) = self.anchor_ms.filter(|_| self.is_running()) else {
            return Sample {
                remaining_sec: self.remaining_sec,
                completed: None,
            };
        };

        // A clock stepping backwards must not hand time back.
        let elapsed_sec = (now_ms - anchor).max(0) as f64 / 1000.0;
        let remaining = (self.baseline_sec - elapsed_sec).min(self.remaining_sec);

        if remaining <= 0.0 {
            let completed = self.complete(now_ms, false);
            return Sample {
                remaining_sec: 0.0,
                completed: Some(completed),
            };
        }

        self.remaining_sec = remaining;
        Sample {
            remaining_sec: remaining,
            completed: None,
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn complete(&mut self, now_ms: i64, early: bool) -> Event {
        self.phase = CountdownPhase::Completed;
        self.anchor_ms = None;
        self.baseline_sec = 0.0;
        self.remaining_sec = 0.0;
        Event::CountdownCompleted {
            early,
            at: instant(now_ms),
        }
    }
}

/// Format seconds as `m:ss`, the way the countdown face shows them.
pub fn format_clock(seconds: f64) -> String {
    let whole = seconds.max(0.0).floor() as u64;
    format!("{}:{:02}", whole / 60, whole % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const T0: i64 = 1_700_000_000_000;

    #[test]
    fn new_engine_is_ready_with_full_time() {
        let engine = CountdownEngine::new(90).unwrap();
        assert_eq!(engine.phase(), CountdownPhase::Ready);
        assert_eq!(engine.remaining_sec(), 90.0);
        assert_eq!(engine.progress(), 0.0);
        assert_eq!(engine.curtain_fraction(), 1.0);
    }

    #[test]
    fn zero_duration_is_rejected() {
        assert_eq!(
            CountdownEngine::new(0).unwrap_err(),
            ValidationError::NonPositiveDuration
        );
    }

    #[test]
    fn samples_follow_the_wall_clock() {
        let mut engine = CountdownEngine::new(60).unwrap();
        assert!(engine.start(T0).is_some());
        assert_eq!(engine.sample(T0 + 1_500).remaining_sec, 58.5);
        // Skipped frames change nothing: the next sample is still exact.
        assert_eq!(engine.sample(T0 + 30_000).remaining_sec, 30.0);
        assert!((engine.progress() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn pause_freezes_and_resume_continues() {
        let mut engine = CountdownEngine::new(60).unwrap();
        engine.start(T0);
        let paused = engine.pause(T0 + 10_000);
        assert!(matches!(
            paused,
            Some(Event::CountdownPaused { remaining_sec, .. }) if remaining_sec == 50.0
        ));
        assert_eq!(engine.phase(), CountdownPhase::Paused);
        assert_eq!(engine.sample(T0 + 500_000).remaining_sec, 50.0);

        let resumed = engine.start(T0 + 500_000);
        assert!(matches!(
            resumed,
            Some(Event::CountdownStarted { resumed: true, .. })
        ));
        assert_eq!(engine.sample(T0 + 505_000).remaining_sec, 45.0);
    }

    #[test]
    fn invalid_transitions_are_ignored() {
        let mut engine = CountdownEngine::new(10).unwrap();
        assert!(engine.pause(T0).is_none());
        assert_eq!(engine.phase(), CountdownPhase::Ready);

        engine.start(T0);
        assert!(engine.start(T0 + 1_000).is_none());
        assert_eq!(engine.sample(T0 + 2_000).remaining_sec, 8.0);

        engine.sample(T0 + 20_000);
        assert_eq!(engine.phase(), CountdownPhase::Completed);
        assert!(engine.start(T0 + 21_000).is_none());
        assert!(engine.pause(T0 + 21_000).is_none());
        assert!(engine.mark_done_early(T0 + 21_000).is_none());
    }

    #[test]
    fn expiry_fires_exactly_once() {
        let mut engine = CountdownEngine::new(5).unwrap();
        engine.start(T0);
        let mut fired = 0;
        for step in 0..100 {
            let sample = engine.sample(T0 + step * 100);
            if sample.completed.is_some() {
                fired += 1;
            }
            assert!(sample.remaining_sec >= 0.0);
        }
        assert_eq!(fired, 1);
        assert_eq!(engine.phase(), CountdownPhase::Completed);
        assert_eq!(engine.remaining_sec(), 0.0);
    }

    #[test]
    fn completion_can_fire_again_after_reset() {
        let mut engine = CountdownEngine::new(1).unwrap();
        engine.start(T0);
        assert!(engine.sample(T0 + 1_000).completed.is_some());
        engine.reset();
        engine.start(T0 + 2_000);
        assert!(engine.sample(T0 + 3_000).completed.is_some());
    }

    #[test]
    fn done_early_completes_from_any_live_phase() {
        for setup in 0..3 {
            let mut engine = CountdownEngine::new(30).unwrap();
            if setup >= 1 {
                engine.start(T0);
            }
            if setup == 2 {
                engine.pause(T0 + 1_000);
            }
            let event = engine.mark_done_early(T0 + 2_000);
            assert!(matches!(
                event,
                Some(Event::CountdownCompleted { early: true, .. })
            ));
            assert_eq!(engine.phase(), CountdownPhase::Completed);
            assert_eq!(engine.remaining_sec(), 0.0);
            assert!(engine.sample(T0 + 3_000).completed.is_none());
        }
    }

    #[test]
    fn reset_restores_ready_from_every_phase() {
        let mut engine = CountdownEngine::new(20).unwrap();
        engine.reset();
        assert_eq!(engine.phase(), CountdownPhase::Ready);

        engine.start(T0);
        engine.sample(T0 + 5_000);
        engine.reset();
        assert_eq!(engine.phase(), CountdownPhase::Ready);
        assert_eq!(engine.remaining_sec(), 20.0);
        assert_eq!(engine.sample(T0 + 9_000).remaining_sec, 20.0);

        engine.start(T0);
        engine.pause(T0 + 5_000);
        engine.reset();
        assert_eq!(engine.remaining_sec(), 20.0);

        engine.mark_done_early(T0);
        engine.reset();
        assert_eq!(engine.phase(), CountdownPhase::Ready);
        assert_eq!(engine.remaining_sec(), 20.0);
    }

    #[test]
    fn pause_after_expiry_reports_completion() {
        let mut engine = CountdownEngine::new(2).unwrap();
        engine.start(T0);
        let event = engine.pause(T0 + 5_000);
        assert!(matches!(
            event,
            Some(Event::CountdownCompleted { early: false, .. })
        ));
        assert_eq!(engine.phase(), CountdownPhase::Completed);
    }

    #[test]
    fn backwards_clock_does_not_add_time() {
        let mut engine = CountdownEngine::new(60).unwrap();
        engine.start(T0);
        assert_eq!(engine.sample(T0 + 10_000).remaining_sec, 50.0);
        assert_eq!(engine.sample(T0 + 4_000).remaining_sec, 50.0);
        assert_eq!(engine.sample(T0 - 4_000).remaining_sec, 50.0);
    }

    #[test]
    fn toggle_alternates_start_and_pause() {
        let mut engine = CountdownEngine::new(60).unwrap();
        engine.toggle(T0);
        assert!(engine.is_running());
        engine.toggle(T0 + 1_000);
        assert_eq!(engine.phase(), CountdownPhase::Paused);
        engine.toggle(T0 + 2_000);
        assert!(engine.is_running());
    }

    #[test]
    fn clock_face_format() {
        assert_eq!(format_clock(0.0), "0:00");
        assert_eq!(format_clock(59.9), "0:59");
        assert_eq!(format_clock(125.0), "2:05");
        assert_eq!(format_clock(-3.0), "0:00");
    }

    proptest! {
        #[test]
        fn running_time_is_independent_of_pause_cycles(
            segments in prop::collection::vec((1i64..20_000, 0i64..600_000), 1..12)
        ) {
            let total_sec = 600u32;
            let mut engine = CountdownEngine::new(total_sec).unwrap();
            let mut now = T0;
            let mut running_ms = 0i64;

            for (run_ms, idle_ms) in segments {
                engine.start(now);
                now += run_ms;
                running_ms += run_ms;
                engine.pause(now);
                now += idle_ms;
            }

            let expected = (f64::from(total_sec) - running_ms as f64 / 1000.0).max(0.0);
            prop_assert!((engine.remaining_sec() - expected).abs() < 1e-6);
            if expected > 0.0 {
                prop_assert_eq!(engine.phase(), CountdownPhase::Paused);
            } else {
                prop_assert_eq!(engine.phase(), CountdownPhase::Completed);
            }
        }

        #[test]
        fn remaining_never_increases_while_running(
            offsets in prop::collection::vec(0i64..120_000, 1..50)
        ) {
            let mut engine = CountdownEngine::new(90).unwrap();
            engine.start(T0);
            let mut last = engine.remaining_sec();
            for offset in offsets {
                let sample = engine.sample(T0 + offset);
                prop_assert!(sample.remaining_sec <= last);
                prop_assert!(sample.remaining_sec >= 0.0);
                last = sample.remaining_sec;
            }
        }
    }
}
