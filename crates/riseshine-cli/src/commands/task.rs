//! Task management and the interactive countdown.

use std::io::{BufRead, Write};
use std::time::Duration;

use chrono::Local;
use clap::Subcommand;
use riseshine_core::routine::{
    duration_from_parts, preset_image, DEFAULT_FORM_DURATION_SEC, PRESET_IMAGES,
};
use riseshine_core::timer::format_clock;
use riseshine_core::{
    ActiveTask, Config, CountdownEngine, CountdownPhase, CountdownSession, Event, Frame,
    SessionCommand, SessionExit, SessionObserver, SoundType, SystemClock, ThemeColor, Timer,
};
use tokio::sync::{mpsc, watch};

use super::{bar, open_app, runtime, App, TerminalCue};

#[derive(Subcommand)]
pub enum TaskAction {
    /// List tasks, not-yet-done first
    List {
        /// Print the stored task list as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a task
    Add {
        /// Task name
        name: String,
        /// Whole minutes of the duration (two minutes when no duration is given)
        #[arg(long)]
        minutes: Option<u32>,
        /// Extra seconds of the duration
        #[arg(long)]
        seconds: Option<u32>,
        /// Preset image name (e.g. "Pancakes") or an image URL
        #[arg(long)]
        image: Option<String>,
        /// Theme color: blue, green, yellow, orange, pink, purple
        #[arg(long, default_value = "blue")]
        color: ThemeColor,
        /// Completion sound: chimes, fanfare, success
        #[arg(long, default_value = "chimes")]
        sound: SoundType,
    },
    /// Edit a task
    Edit {
        /// Task ID
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        minutes: Option<u32>,
        #[arg(long)]
        seconds: Option<u32>,
        #[arg(long)]
        image: Option<String>,
        #[arg(long)]
        color: Option<ThemeColor>,
        #[arg(long)]
        sound: Option<SoundType>,
    },
    /// Remove a task
    Remove {
        /// Task ID
        id: String,
    },
    /// Mark every task as not done
    ResetAll,
    /// Run a task's countdown interactively
    Run {
        /// Task ID
        id: String,
        /// Start counting immediately instead of waiting for play
        #[arg(long)]
        start: bool,
    },
}

fn resolve_image(image: &str) -> String {
    preset_image(image)
        .map(|p| p.uri.to_string())
        .unwrap_or_else(|| image.to_string())
}

fn print_list(app: &App) {
    let today = Local::now().date_naive();
    for timer in app.sorted_timers(today, &Local) {
        let mark = if timer.is_completed_on(today, &Local) {
            "x"
        } else {
            " "
        };
        println!(
            "[{mark}] {}  {}  {}  {}  {}",
            timer.id,
            timer.task_name,
            timer.duration_label(),
            timer.theme_color,
            timer.sound_type
        );
    }
}

pub fn run(action: TaskAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = open_app()?;

    match action {
        TaskAction::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(app.timers())?);
            } else if app.timers().is_empty() {
                println!("No tasks.");
            } else {
                print_list(&app);
            }
        }
        TaskAction::Add {
            name,
            minutes,
            seconds,
            image,
            color,
            sound,
        } => {
            let image_uri = image
                .as_deref()
                .map(resolve_image)
                .unwrap_or_else(|| PRESET_IMAGES[0].uri.to_string());
            let duration_sec = match (minutes, seconds) {
                (None, None) => DEFAULT_FORM_DURATION_SEC,
                (m, s) => duration_from_parts(m.unwrap_or(0), s.unwrap_or(0)),
            };
            let timer = Timer::new(name, duration_sec, image_uri, color, sound)?;
            let id = timer.id.clone();
            app.save_timer(timer)?;
            println!("Task created: {id}");
        }
        TaskAction::Edit {
            id,
            name,
            minutes,
            seconds,
            image,
            color,
            sound,
        } => {
            let mut timer = app
                .timer(&id)
                .cloned()
                .ok_or_else(|| format!("task not found: {id}"))?;

            if let Some(name) = name {
                timer.task_name = name.trim().to_string();
            }
            if minutes.is_some() || seconds.is_some() {
                let current_min = timer.duration_sec / 60;
                let current_sec = timer.duration_sec % 60;
                timer.duration_sec = duration_from_parts(
                    minutes.unwrap_or(current_min),
                    seconds.unwrap_or(current_sec),
                );
            }
            if let Some(image) = image {
                timer.image_uri = resolve_image(&image);
            }
            if let Some(color) = color {
                timer.theme_color = color;
            }
            if let Some(sound) = sound {
                timer.sound_type = sound;
            }

            app.save_timer(timer)?;
            println!("Task updated: {id}");
        }
        TaskAction::Remove { id } => {
            if app.timer(&id).is_none() {
                return Err(format!("task not found: {id}").into());
            }
            app.delete_timer(&id)?;
            println!("Task removed: {id}");
        }
        TaskAction::ResetAll => {
            let count = app.reset_all_progress()?.len();
            println!("Progress reset for {count} tasks");
        }
        TaskAction::Run { id, start } => {
            let timer = app
                .timer(&id)
                .cloned()
                .ok_or_else(|| format!("task not found: {id}"))?;
            let config = Config::load_or_default();
            run_countdown(&mut app, timer, &config, start)?;
        }
    }
    Ok(())
}

fn run_countdown(
    app: &mut App,
    timer: Timer,
    config: &Config,
    start: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = CountdownEngine::for_timer(&timer)?;
    let mut session = CountdownSession::new(engine, SystemClock)
        .with_frame_period(Duration::from_millis(config.countdown.frame_ms));

    let (tx, mut rx) = mpsc::unbounded_channel();
    let (_cancel_tx, mut cancel_rx) = watch::channel(false);
    if start {
        tx.send(SessionCommand::Start)?;
    }
    spawn_input_reader(tx.clone());

    println!("{}  ({})", timer.task_name, timer.duration_label());
    println!("p: play/pause  r: reset  d: done  q: quit");

    let cue = TerminalCue {
        bell: config.countdown.bell,
    };
    let mut view = CountdownView {
        app,
        timer: &timer,
        cue: &cue,
        exit: tx,
    };

    let exit = runtime()?.block_on(session.run(&mut rx, &mut cancel_rx, &mut view));
    println!();
    tracing::debug!(?exit, phase = ?session.engine().phase(), "countdown view closed");

    if exit == SessionExit::Exited && session.engine().phase() == CountdownPhase::Completed {
        println!("Great job! {} is done.", timer.task_name);
    }
    Ok(())
}

/// Forwards one keystroke-per-line from stdin to the session.
fn spawn_input_reader(tx: mpsc::UnboundedSender<SessionCommand>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let command = match line.trim() {
                "" | "p" => SessionCommand::Toggle,
                "r" => SessionCommand::Reset,
                "d" => SessionCommand::DoneEarly,
                "q" => SessionCommand::Exit,
                other => {
                    tracing::debug!(input = other, "ignored countdown input");
                    continue;
                }
            };
            if tx.send(command).is_err() {
                return;
            }
        }
        // Input closed: leave the view once queued commands are applied.
        let _ = tx.send(SessionCommand::Exit);
    });
}

struct CountdownView<'a> {
    app: &'a mut App,
    timer: &'a Timer,
    cue: &'a TerminalCue,
    exit: mpsc::UnboundedSender<SessionCommand>,
}

impl SessionObserver for CountdownView<'_> {
    fn on_frame(&mut self, frame: &Frame) {
        let active = ActiveTask {
            id: &self.timer.id,
            remaining_sec: frame.remaining_sec,
        };
        let journey = self.app.journey(&SystemClock, &Local, Some(active));
        let icon = match frame.phase {
            CountdownPhase::Running => ">",
            CountdownPhase::Paused => "=",
            CountdownPhase::Ready => "-",
            CountdownPhase::Completed => "*",
        };

        let mut out = std::io::stdout();
        let _ = write!(
            out,
            "\r{icon} {:>5}  {}  {}\x1b[K",
            format_clock(frame.remaining_sec),
            bar(1.0 - frame.curtain, 20),
            journey.status_line()
        );
        let _ = out.flush();
    }

    fn on_event(&mut self, event: &Event) {
        let Event::CountdownCompleted { at, early } = event else {
            return;
        };
        tracing::debug!(early, "countdown completed");
        match self.app.record_completion(&self.timer.id, *at, self.cue) {
            Ok(Some(_)) => {}
            Ok(None) => tracing::warn!(id = %self.timer.id, "task vanished before completion"),
            Err(e) => tracing::warn!(error = %e, "failed to record completion"),
        }
        let _ = self.exit.send(SessionCommand::Exit);
    }
}
