//! Built-in reward images and the starter routine.

use super::task::{SoundType, ThemeColor, Timer};

/// A named reward image offered by the task form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetImage {
    pub name: &'static str,
    pub uri: &'static str,
}

pub const PRESET_IMAGES: [PresetImage; 5] = [
    PresetImage {
        name: "Pancakes",
        uri: "https://images.unsplash.com/photo-1506084868230-bb9d95c24759?auto=format&fit=crop&w=600&q=80",
    },
    PresetImage {
        name: "School Bus",
        uri: "https://images.unsplash.com/photo-1557804506-669a67965ba0?auto=format&fit=crop&w=600&q=80",
    },
    PresetImage {
        name: "Sneakers",
        uri: "https://images.unsplash.com/photo-1515955656352-a1fa3ffcd111?auto=format&fit=crop&w=600&q=80",
    },
    PresetImage {
        name: "Books",
        uri: "https://images.unsplash.com/photo-1503676260728-1c00da094a0b?auto=format&fit=crop&w=600&q=80",
    },
    PresetImage {
        name: "Toys",
        uri: "https://images.unsplash.com/photo-1596461404969-9ae70f2830c1?auto=format&fit=crop&w=600&q=80",
    },
];

/// Look up a preset image by name (case-insensitive).
pub fn preset_image(name: &str) -> Option<&'static PresetImage> {
    PRESET_IMAGES
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
}

/// Tasks written to an empty store on first launch.
pub fn seed_timers() -> Vec<Timer> {
    vec![
        Timer {
            id: "preset-2".into(),
            task_name: "Get Dressed".into(),
            duration_sec: 300,
            image_uri: PRESET_IMAGES[2].uri.into(),
            theme_color: ThemeColor::Purple,
            sound_type: SoundType::Fanfare,
            last_completed: None,
        },
        Timer {
            id: "preset-3".into(),
            task_name: "Eat Breakfast".into(),
            duration_sec: 600,
            image_uri: PRESET_IMAGES[0].uri.into(),
            theme_color: ThemeColor::Yellow,
            sound_type: SoundType::Chimes,
            last_completed: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_routine_is_valid() {
        let seeds = seed_timers();
        assert_eq!(seeds.len(), 2);
        assert!(seeds.iter().all(|t| t.validate().is_ok()));
        assert_eq!(seeds.iter().map(|t| t.duration_sec).sum::<u32>(), 900);
    }

    #[test]
    fn finds_images_by_name() {
        assert_eq!(preset_image("school bus").map(|p| p.name), Some("School Bus"));
        assert!(preset_image("Unicorn").is_none());
    }
}
