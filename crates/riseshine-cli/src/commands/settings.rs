use clap::Subcommand;
use riseshine_core::ConfigFile;

use super::{bar, open_app};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print the whole configuration
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Get a config value
    Get {
        /// Config key (e.g. "schedule.departureTime", "countdown.bell")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// Show how the routine fits the morning window
    Budget {
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: SettingsAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SettingsAction::Show { json } => {
            let config = ConfigFile::open_default()?.load()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                print!("{}", toml::to_string_pretty(&config)?);
            }
        }
        SettingsAction::Get { key } => {
            let config = ConfigFile::open_default()?.load()?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown key: {key}").into()),
            }
        }
        SettingsAction::Set { key, value } => {
            let file = ConfigFile::open_default()?;
            let mut config = file.load()?;
            config.set(&key, &value)?;

            if key.starts_with("schedule.") {
                let mut app = open_app()?;
                app.save_settings(config.schedule)?;
            } else {
                file.save(&config)?;
            }
            tracing::info!(%key, %value, "setting changed");
            println!("ok");
        }
        SettingsAction::Budget { json } => {
            let app = open_app()?;
            let budget = app.budget();
            if json {
                println!("{}", serde_json::to_string_pretty(&budget)?);
                return Ok(());
            }

            let settings = app.settings();
            println!(
                "Window: {} - {} ({} min)",
                settings.morning_start.format("%H:%M"),
                settings.departure_time.format("%H:%M"),
                budget.total_window_minutes
            );
            if budget.time_invalid {
                println!("Departure must be after the morning start.");
                return Ok(());
            }
            println!("Tasks:  {} min", budget.task_minutes);
            println!("Buffer: {} min", budget.buffer_minutes);
            println!(
                "Tasks {:.0}% | Buffer {:.0}% | Free {:.0}%",
                budget.task_percent, budget.buffer_percent, budget.free_percent
            );
            println!(
                "{}",
                bar((budget.task_percent + budget.buffer_percent) / 100.0, 30)
            );
            if budget.over_budget {
                println!(
                    "Over budget by {} min!",
                    budget.spare_minutes.unsigned_abs()
                );
            } else {
                println!("{} min to spare", budget.spare_minutes);
            }
        }
    }
    Ok(())
}
