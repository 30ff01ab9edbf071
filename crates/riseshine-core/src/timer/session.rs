//! Cooperative frame loop for an active countdown.
//!
//! A session owns one [`CountdownEngine`] and drives it from a single task:
//! host commands arrive on an mpsc channel, teardown arrives on a `watch`
//! flag, and a frame interval samples the engine while it is running. The
//! interval only exists in the `Running` phase; it is dropped on pause,
//! reset, completion and exit, and re-armed on resume.
//!
//! Commands are polled before frames, so a sample always reflects the most
//! recently applied transition.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{self, Interval, MissedTickBehavior};

use super::engine::{CountdownEngine, CountdownPhase};
use crate::clock::Clock;
use crate::events::Event;

/// Roughly one display refresh.
pub const DEFAULT_FRAME_PERIOD: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// Play/pause button.
    Toggle,
    Start,
    Pause,
    Reset,
    DoneEarly,
    /// Leave the countdown view.
    Exit,
}

/// What the view needs to draw one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub phase: CountdownPhase,
    pub remaining_sec: f64,
    pub total_sec: u32,
    /// Fraction of the reward image still hidden.
    pub curtain: f64,
}

/// Why [`CountdownSession::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionExit {
    /// The host sent [`SessionCommand::Exit`].
    Exited,
    /// The cancellation flag was raised or its sender dropped.
    Cancelled,
    /// Every command sender was dropped.
    Closed,
}

/// Receives frames and events from a running session.
pub trait SessionObserver {
    fn on_frame(&mut self, _frame: &Frame) {}

    /// Called for every transition, including the one-shot completion.
    fn on_event(&mut self, _event: &Event) {}
}

pub struct CountdownSession<C: Clock> {
    engine: CountdownEngine,
    clock: C,
    frame_period: Duration,
}

impl<C: Clock> CountdownSession<C> {
    pub fn new(engine: CountdownEngine, clock: C) -> Self {
        Self {
            engine,
            clock,
            frame_period: DEFAULT_FRAME_PERIOD,
        }
    }

    pub fn with_frame_period(mut self, period: Duration) -> Self {
        self.frame_period = period.max(Duration::from_millis(1));
        self
    }

    pub fn engine(&self) -> &CountdownEngine {
        &self.engine
    }

    pub fn frame(&self) -> Frame {
        Frame {
            phase: self.engine.phase(),
            remaining_sec: self.engine.remaining_sec(),
            total_sec: self.engine.total_duration_sec(),
            curtain: self.engine.curtain_fraction(),
        }
    }

    /// Apply one command against the current wall-clock instant.
    pub fn apply(&mut self, command: SessionCommand) -> Option<Event> {
        let now = self.clock.now_ms();
        match command {
            SessionCommand::Toggle => self.engine.toggle(now),
            SessionCommand::Start => self.engine.start(now),
            SessionCommand::Pause => self.engine.pause(now),
            SessionCommand::Reset => self.engine.reset(),
            SessionCommand::DoneEarly => self.engine.mark_done_early(now),
            SessionCommand::Exit => None,
        }
    }

    /// Drive the session until exit, cancellation, or channel close.
    pub async fn run<O: SessionObserver>(
        &mut self,
        commands: &mut mpsc::UnboundedReceiver<SessionCommand>,
        cancel: &mut watch::Receiver<bool>,
        observer: &mut O,
    ) -> SessionExit {
        let mut frames: Option<Interval> = None;
        observer.on_frame(&self.frame());

        loop {
            if *cancel.borrow() {
                tracing::debug!("countdown session cancelled");
                return SessionExit::Cancelled;
            }

            match (self.engine.is_running(), frames.is_some()) {
                (true, false) => frames = Some(self.arm_frames()),
                (false, true) => frames = None,
                _ => {}
            }

            let wake = tokio::select! {
                biased;
                changed = cancel.changed() => Wake::Cancel { sender_gone: changed.is_err() },
                command = commands.recv() => Wake::Command(command),
                _ = next_frame(&mut frames) => Wake::Frame,
            };

            match wake {
                Wake::Cancel { sender_gone } => {
                    if sender_gone || *cancel.borrow() {
                        tracing::debug!("countdown session torn down");
                        return SessionExit::Cancelled;
                    }
                }
                Wake::Command(None) => return SessionExit::Closed,
                Wake::Command(Some(SessionCommand::Exit)) => return SessionExit::Exited,
                Wake::Command(Some(command)) => {
                    tracing::trace!(?command, "session command");
                    if let Some(event) = self.apply(command) {
                        observer.on_event(&event);
                    }
                    observer.on_frame(&self.frame());
                }
                Wake::Frame => {
                    let sample = self.engine.sample(self.clock.now_ms());
                    observer.on_frame(&self.frame());
                    if let Some(event) = sample.completed {
                        tracing::info!("countdown expired");
                        observer.on_event(&event);
                    }
                }
            }
        }
    }

    fn arm_frames(&self) -> Interval {
        let mut interval = time::interval(self.frame_period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        interval
    }
}

enum Wake {
    Cancel { sender_gone: bool },
    Command(Option<SessionCommand>),
    Frame,
}

async fn next_frame(frames: &mut Option<Interval>) {
    match frames {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
