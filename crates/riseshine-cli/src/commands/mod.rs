pub mod journey;
pub mod settings;
pub mod task;

use std::io::Write;

use riseshine_core::{AppState, CompletionCue, ConfigFile, Database, SoundType};

pub type App = AppState<Database, ConfigFile>;

/// Open the task database and config file in the data directory.
pub fn open_app() -> Result<App, Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let config = ConfigFile::open_default()?;
    Ok(AppState::load(db, config))
}

/// Single-threaded runtime for the interactive views.
pub fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
}

/// Completion cue for a terminal: optional bell plus the cue name.
pub struct TerminalCue {
    pub bell: bool,
}

impl CompletionCue for TerminalCue {
    fn play(&self, sound: SoundType) {
        let mut out = std::io::stdout();
        if self.bell {
            let _ = write!(out, "\x07");
        }
        let _ = writeln!(out, "\n*{sound}*");
        let _ = out.flush();
    }
}

/// Horizontal bar with `filled` in 0..=1.
pub fn bar(filled: f64, width: usize) -> String {
    let n = ((filled.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(n), ".".repeat(width - n))
}
