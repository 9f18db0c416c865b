//! Board sync adapter: game state to widget configuration and widget
//! events back to reducer intents.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::StudyError;
use crate::model::{DrawShape, Side};
use crate::reducer::{GameState, Intent};
use crate::rules::LivePosition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardColor {
    White,
    Black,
}

impl From<Side> for BoardColor {
    fn from(side: Side) -> Self {
        match side {
            Side::White => BoardColor::White,
            Side::Black => BoardColor::Black,
        }
    }
}

impl FromStr for BoardColor {
    type Err = StudyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "white" => Ok(BoardColor::White),
            "black" => Ok(BoardColor::Black),
            other => Err(StudyError::Config(format!(
                "Board orientation must be 'white' or 'black', got '{other}'"
            ))),
        }
    }
}

impl fmt::Display for BoardColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BoardColor::White => "white",
            BoardColor::Black => "black",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Movable {
    /// Always false: only legal destinations are accepted.
    pub free: bool,
    pub color: BoardColor,
    pub dests: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Drawable {
    pub shapes: Vec<DrawShape>,
}

/// Everything the board widget needs to display one position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardConfig {
    pub fen: String,
    pub check: bool,
    pub movable: Movable,
    pub turn_color: BoardColor,
    pub drawable: Drawable,
}

impl BoardConfig {
    fn build(live: &LivePosition, shapes: &[DrawShape]) -> Self {
        let turn: BoardColor = live.turn().into();
        Self {
            fen: live.fen(),
            check: live.is_check(),
            movable: Movable {
                free: false,
                color: turn,
                dests: live.dests(),
            },
            turn_color: turn,
            drawable: Drawable {
                shapes: shapes.to_vec(),
            },
        }
    }

    pub fn at(fen: &str, shapes: &[DrawShape]) -> Result<Self, StudyError> {
        Ok(Self::build(&LivePosition::from_fen(fen)?, shapes))
    }

    /// Configuration for the move `state` currently displays.
    pub fn for_state(state: &GameState) -> Result<Self, StudyError> {
        Self::at(state.displayed_fen(), state.displayed_shapes())
    }
}

/// A move completed on the widget.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MoveEvent {
    pub orig: String,
    pub dest: String,
    #[serde(default)]
    pub promotion: Option<char>,
}

impl MoveEvent {
    pub fn new(orig: &str, dest: &str) -> Self {
        Self {
            orig: orig.to_string(),
            dest: dest.to_string(),
            promotion: None,
        }
    }
}

/// Holds the engine for the displayed position. Replaced wholesale by
/// [`BoardSync::show`] whenever the reducer hands out a new configuration.
#[derive(Debug, Clone)]
pub struct BoardSync {
    live: LivePosition,
    config: BoardConfig,
}

impl BoardSync {
    pub fn new(state: &GameState) -> Result<Self, StudyError> {
        let live = LivePosition::from_fen(state.displayed_fen())?;
        let config = BoardConfig::build(&live, state.displayed_shapes());
        Ok(Self { live, config })
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn show(&mut self, config: BoardConfig) -> Result<(), StudyError> {
        self.live = LivePosition::from_fen(&config.fen)?;
        self.config = config;
        Ok(())
    }

    /// Validate a widget move against the displayed position.
    pub fn on_move(&self, event: &MoveEvent) -> Result<Intent, StudyError> {
        let mv = self.live.play(&event.orig, &event.dest, event.promotion)?;
        Ok(Intent::AddMove(mv))
    }

    pub fn on_shapes(&mut self, shapes: Vec<DrawShape>) -> Intent {
        self.config.drawable.shapes = shapes.clone();
        Intent::SyncShapes(shapes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StudyFile;
    use crate::reducer::reduce;

    #[test]
    fn test_fresh_study_config() {
        let state = GameState::new(StudyFile::default());
        let sync = BoardSync::new(&state).unwrap();
        let config = sync.config();
        assert_eq!(config.turn_color, BoardColor::White);
        assert_eq!(config.movable.color, BoardColor::White);
        assert!(!config.movable.free);
        assert!(!config.check);
        assert_eq!(config.movable.dests.len(), 10);
    }

    #[test]
    fn test_dests_follow_displayed_position() {
        let state = GameState::new(StudyFile::default());
        let mut sync = BoardSync::new(&state).unwrap();

        let intent = sync.on_move(&MoveEvent::new("e2", "e4")).unwrap();
        let reduced = reduce(&state, intent).unwrap();
        sync.show(reduced.board.unwrap()).unwrap();

        let config = sync.config();
        assert_eq!(config.turn_color, BoardColor::Black);
        assert!(config.movable.dests.contains_key("e7"));
        assert!(!config.movable.dests.contains_key("e2"));

        // white can't move again from the new position
        assert!(sync.on_move(&MoveEvent::new("d2", "d4")).is_err());
    }

    #[test]
    fn test_config_serializes_for_widget() {
        let config = BoardConfig::at(crate::model::STANDARD_START_FEN, &[]).unwrap();
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["turnColor"], "white");
        assert_eq!(json["movable"]["free"], false);
        assert!(json["movable"]["dests"]["g1"].is_array());
    }

    #[test]
    fn test_board_color_parse() {
        assert_eq!("Black".parse::<BoardColor>().unwrap(), BoardColor::Black);
        assert!("blue".parse::<BoardColor>().is_err());
    }
}
