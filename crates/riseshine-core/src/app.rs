//! Application state shared by every view.
//!
//! [`AppState`] owns the task and settings stores plus the in-memory time
//! simulation, and is handed by reference to whichever view is active. All
//! mutations go through the stores and the cached copies are replaced with
//! what the store returns, so a failed write shows up as nothing changing.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::clock::Clock;
use crate::cue::CompletionCue;
use crate::error::{CoreError, Result};
use crate::journey::{
    aggregate_remaining_sec, ActiveTask, JourneyState, JourneyWindow, RoutineBudget,
    TimeSimulation,
};
use crate::routine::{seed_timers, AppSettings, Timer};
use crate::storage::{SettingsStore, TaskStore};

pub struct AppState<T, S> {
    tasks: T,
    settings_store: S,
    timers: Vec<Timer>,
    settings: AppSettings,
    simulation: TimeSimulation,
}

impl<T: TaskStore, S: SettingsStore> AppState<T, S> {
    /// Load both stores, seeding the starter routine into an empty task
    /// store. Read failures degrade to an empty list and default settings.
    pub fn load(tasks: T, settings_store: S) -> Self {
        let mut state = Self {
            tasks,
            settings_store,
            timers: Vec::new(),
            settings: AppSettings::default(),
            simulation: TimeSimulation::default(),
        };
        state.refresh();

        if state.timers.is_empty() {
            match state.tasks.replace_all(&seed_timers()) {
                Ok(()) => state.refresh(),
                Err(e) => tracing::warn!(error = %e, "failed to seed starter routine"),
            }
        }
        state
    }

    /// Re-read both stores.
    pub fn refresh(&mut self) {
        self.timers = self.tasks.list().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to load timers");
            Vec::new()
        });
        self.settings = self.settings_store.read().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to load settings");
            AppSettings::default()
        });
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn timers(&self) -> &[Timer] {
        &self.timers
    }

    pub fn timer(&self, id: &str) -> Option<&Timer> {
        self.timers.iter().find(|t| t.id == id)
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn simulation(&self) -> TimeSimulation {
        self.simulation
    }

    pub fn set_simulation(&mut self, simulation: TimeSimulation) {
        self.simulation = simulation;
    }

    /// Dashboard order: not-yet-done tasks first, otherwise as stored.
    pub fn sorted_timers<Tz: TimeZone>(&self, today: NaiveDate, tz: &Tz) -> Vec<&Timer> {
        let mut sorted: Vec<&Timer> = self.timers.iter().collect();
        sorted.sort_by_key(|t| t.is_completed_on(today, tz));
        sorted
    }

    /// Settings-screen budget over every task, done or not.
    pub fn budget(&self) -> RoutineBudget {
        let total: u64 = self.timers.iter().map(|t| u64::from(t.duration_sec)).sum();
        RoutineBudget::compute(&self.settings, total)
    }

    pub fn journey_window<Tz: TimeZone>(&self, today: NaiveDate, tz: &Tz) -> JourneyWindow {
        JourneyWindow::from_settings(&self.settings, today, tz)
    }

    /// Evaluate the race indicator now.
    ///
    /// The window and "completed today" use the real calendar day; only the
    /// reference instant is shifted by the simulation.
    pub fn journey<C: Clock, Tz: TimeZone>(
        &self,
        clock: &C,
        tz: &Tz,
        active: Option<ActiveTask<'_>>,
    ) -> JourneyState {
        let real_now = clock.now();
        let today = real_now.with_timezone(tz).date_naive();
        let remaining = aggregate_remaining_sec(&self.timers, active, today, tz);
        self.journey_window(today, tz)
            .evaluate(self.simulation.reference_time(real_now), remaining)
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Validate and store a new or edited task.
    pub fn save_timer(&mut self, timer: Timer) -> Result<&[Timer]> {
        timer.validate()?;
        let id = timer.id.clone();
        let stored = self.tasks.upsert(timer);
        self.apply_task_write(stored)?;
        tracing::info!(%id, "task saved");
        Ok(&self.timers)
    }

    pub fn delete_timer(&mut self, id: &str) -> Result<&[Timer]> {
        let stored = self.tasks.remove(id);
        self.apply_task_write(stored)?;
        tracing::info!(%id, "task removed");
        Ok(&self.timers)
    }

    /// Start the day over: every task becomes not-done.
    pub fn reset_all_progress(&mut self) -> Result<&[Timer]> {
        let stored = self.tasks.clear_all_completion_marks();
        self.apply_task_write(stored)?;
        tracing::info!("all completion marks cleared");
        Ok(&self.timers)
    }

    /// Validate the window and persist the settings.
    pub fn save_settings(&mut self, settings: AppSettings) -> Result<&AppSettings> {
        settings.validate()?;
        match self.settings_store.write(settings) {
            Ok(saved) => self.settings = saved,
            Err(e) => {
                self.refresh();
                return Err(e.into());
            }
        }
        Ok(&self.settings)
    }

    /// Host side of a countdown completion: play the task's cue and stamp
    /// `lastCompleted` on the stored record.
    ///
    /// A task deleted while its countdown ran is left deleted.
    pub fn record_completion(
        &mut self,
        id: &str,
        at: DateTime<Utc>,
        cue: &dyn CompletionCue,
    ) -> Result<Option<Timer>> {
        let stored = match self.tasks.list() {
            Ok(list) => list.into_iter().find(|t| t.id == id),
            Err(e) => {
                self.refresh();
                return Err(e.into());
            }
        };
        let Some(mut timer) = stored else {
            tracing::warn!(%id, "completed task no longer exists");
            return Ok(None);
        };

        cue.play(timer.sound_type);
        timer.mark_completed(at.timestamp_millis());
        let written = self.tasks.upsert(timer.clone());
        self.apply_task_write(written)?;
        tracing::info!(%id, task = %timer.task_name, "task completed");
        Ok(Some(timer))
    }

    fn apply_task_write(
        &mut self,
        stored: std::result::Result<Vec<Timer>, crate::error::StorageError>,
    ) -> Result<()> {
        match stored {
            Ok(timers) => {
                self.timers = timers;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "task store write failed");
                self.refresh();
                Err(CoreError::from(e))
            }
        }
    }
}
