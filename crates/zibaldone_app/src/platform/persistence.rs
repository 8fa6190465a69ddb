use std::fmt;
use std::fs;
use std::path::Path;

use clap::ValueEnum;
use engine_logging::{engine_error, engine_info, engine_warn};
use serde::{Deserialize, Serialize};
use zibaldone_engine::AtomicFileWriter;

const PREFERENCES_FILENAME: &str = "preferences.ron";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Follow the terminal's own colors.
    #[default]
    System,
    Light,
    Dark,
    Ocean,
    Forest,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Theme::System => "system",
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::Ocean => "ocean",
            Theme::Forest => "forest",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub theme: Theme,
    pub has_seen_welcome: bool,
}

/// Missing or unreadable preferences fall back to defaults.
pub(crate) fn load_preferences(state_dir: &Path) -> Preferences {
    let path = state_dir.join(PREFERENCES_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Preferences::default();
        }
        Err(err) => {
            engine_warn!("Failed to read preferences from {:?}: {}", path, err);
            return Preferences::default();
        }
    };

    match ron::from_str(&content) {
        Ok(preferences) => {
            engine_info!("Loaded preferences from {:?}", path);
            preferences
        }
        Err(err) => {
            engine_warn!("Failed to parse preferences from {:?}: {}", path, err);
            Preferences::default()
        }
    }
}

pub(crate) fn save_preferences(state_dir: &Path, preferences: &Preferences) -> bool {
    let pretty = ron::ser::PrettyConfig::new();
    let content = match ron::ser::to_string_pretty(preferences, pretty) {
        Ok(text) => text,
        Err(err) => {
            engine_error!("Failed to serialize preferences: {}", err);
            return false;
        }
    };

    let writer = AtomicFileWriter::new(state_dir);
    match writer.write(PREFERENCES_FILENAME, content.as_bytes()) {
        Ok(path) => {
            engine_info!("Saved preferences to {:?}", path);
            true
        }
        Err(err) => {
            engine_error!("Failed to write preferences to {:?}: {}", state_dir, err);
            false
        }
    }
}
