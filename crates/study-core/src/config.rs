//! Display settings and the embed block that places a study on a page.

use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use tracing::debug;

use crate::board::BoardColor;
use crate::error::StudyError;

static SETTING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([A-Za-z]+)\s*:\s*(.*?)\s*$").expect("valid setting regex"));

/// Square colour scheme of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardTheme {
    Green,
    Brown,
}

impl FromStr for BoardTheme {
    type Err = StudyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "green" => Ok(BoardTheme::Green),
            "brown" => Ok(BoardTheme::Brown),
            other => Err(StudyError::Config(format!(
                "Board color must be 'green' or 'brown', got '{other}'"
            ))),
        }
    }
}

impl fmt::Display for BoardTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BoardTheme::Green => "green",
            BoardTheme::Brown => "brown",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub board_orientation: BoardColor,
    pub board_color: BoardTheme,
    pub view_comments: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            board_orientation: BoardColor::White,
            board_color: BoardTheme::Green,
            view_comments: true,
        }
    }
}

pub fn parse_bool(key: &str, value: &str) -> Result<bool, StudyError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        other => Err(StudyError::Config(format!("{key} must be true or false, got '{other}'"))),
    }
}

/// A parsed embed block: per-embed overrides on top of the global
/// settings, plus the study to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedConfig {
    pub settings: Settings,
    pub study_id: String,
}

impl EmbedConfig {
    /// Parses `key: value` lines. Keys not listed here are skipped.
    pub fn parse(defaults: Settings, source: &str) -> Result<Self, StudyError> {
        let mut settings = defaults;
        let mut study_id = None;

        for line in source.lines().filter(|l| !l.trim().is_empty()) {
            let Some(cap) = SETTING_RE.captures(line) else {
                return Err(StudyError::Config(format!("Expected 'key: value', got '{}'", line.trim())));
            };
            let value = &cap[2];
            match &cap[1] {
                "boardOrientation" => settings.board_orientation = value.parse()?,
                "boardColor" => settings.board_color = value.parse()?,
                "viewComments" => settings.view_comments = parse_bool("viewComments", value)?,
                "chessStudyId" if !value.is_empty() => study_id = Some(value.to_string()),
                key => debug!(key, "Ignoring unknown embed setting"),
            }
        }

        let study_id = study_id.ok_or_else(|| StudyError::Config("chessStudyId is required".to_string()))?;
        Ok(Self { settings, study_id })
    }
}
