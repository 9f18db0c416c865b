use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use study_core::board::BoardColor;
use study_core::config::{parse_bool, BoardTheme, Settings};

#[derive(Clone, Debug)]
pub struct Config {
    pub storage_path: PathBuf,
    pub settings: Settings,
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Settings::default();
        Self {
            storage_path: env::var("STUDY_STORAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("chess-study")),
            settings: Settings {
                board_orientation: setting("BOARD_ORIENTATION", BoardColor::from_str)
                    .unwrap_or(defaults.board_orientation),
                board_color: setting("BOARD_COLOR", BoardTheme::from_str).unwrap_or(defaults.board_color),
                view_comments: setting("VIEW_COMMENTS", |v| parse_bool("VIEW_COMMENTS", v))
                    .unwrap_or(defaults.view_comments),
            },
        }
    }
}

/// Reads one variable; a value that does not parse is logged and dropped.
fn setting<T, E: std::fmt::Display>(key: &str, parse: impl Fn(&str) -> Result<T, E>) -> Option<T> {
    let raw = env::var(key).ok()?;
    match parse(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Ignoring {key}: {e}");
            None
        }
    }
}
