use std::time::Duration;

use chrono::Local;
use clap::Args;
use riseshine_core::journey::MAX_OFFSET_MINUTES;
use riseshine_core::timer::format_clock;
use riseshine_core::{Clock, JourneyState, SystemClock, TimeSimulation};

use super::{bar, open_app, runtime, App};

#[derive(Args)]
pub struct JourneyArgs {
    /// Preview the morning shifted by this many minutes (at most a year)
    #[arg(
        long,
        allow_hyphen_values = true,
        value_parser = clap::value_parser!(i64).range(-MAX_OFFSET_MINUTES..=MAX_OFFSET_MINUTES)
    )]
    offset: Option<i64>,
    /// Re-evaluate every second until interrupted
    #[arg(long)]
    watch: bool,
    /// Print the evaluation as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: JourneyArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = open_app()?;
    if let Some(offset) = args.offset {
        app.set_simulation(TimeSimulation::with_offset(offset));
    }

    if !args.watch {
        return print_state(&app, &app.journey(&SystemClock, &Local, None), args.json);
    }

    runtime()?.block_on(watch(&app, args.json))
}

async fn watch(app: &App, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut ticks = tokio::time::interval(Duration::from_secs(1));
    loop {
        ticks.tick().await;
        let state = app.journey(&SystemClock, &Local, None);
        if !json {
            print!("\x1b[2J\x1b[H");
        }
        print_state(app, &state, json)?;
    }
}

fn print_state(
    app: &App,
    state: &JourneyState,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string(state)?);
        return Ok(());
    }

    let simulation = app.simulation();
    let now = state.reference_time.with_timezone(&Local);
    if simulation.active {
        println!(
            "Now:      {} (simulated {:+} min, real {})",
            now.format("%H:%M:%S"),
            simulation.offset_minutes,
            SystemClock.now().with_timezone(&Local).format("%H:%M:%S")
        );
    } else {
        println!("Now:      {}", now.format("%H:%M:%S"));
    }

    let settings = app.settings();
    println!(
        "Morning:  {} - {} ({} min buffer)",
        settings.morning_start.format("%H:%M"),
        settings.departure_time.format("%H:%M"),
        settings.buffer_minutes
    );
    println!(
        "Progress: {} {:.0}%",
        bar(state.progress_ratio, 30),
        state.progress_ratio * 100.0
    );
    println!(
        "Left:     {} of tasks",
        format_clock(state.aggregate_remaining_sec)
    );
    println!("{}", state.status_line());
    Ok(())
}
