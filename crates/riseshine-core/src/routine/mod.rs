//! The routine being timed: task definitions, schedule settings, presets.

mod presets;
mod settings;
mod task;

pub use presets::{preset_image, seed_timers, PresetImage, PRESET_IMAGES};
pub use settings::{parse_clock_time, AppSettings};
pub use task::{duration_from_parts, SoundType, ThemeColor, Timer, DEFAULT_FORM_DURATION_SEC};
