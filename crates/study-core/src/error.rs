//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StudyError {
    #[error("Invalid FEN '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },

    #[error("PGN parse error: {0}")]
    Parse(String),

    #[error("Illegal move {from}-{to}")]
    IllegalMove { from: String, to: String },

    #[error("Move not found: {0}")]
    MoveNotFound(String),

    #[error("Move {0} is not the last move of its line")]
    NotTerminal(String),

    #[error("Move was played from {actual}, but the board shows {expected}")]
    PositionMismatch { expected: String, actual: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed study file: {0}")]
    Format(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StudyError {
    /// True for errors caused by unparseable user-supplied PGN/FEN text.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, StudyError::Parse(_) | StudyError::InvalidFen { .. })
    }

    /// True for intents rejected because they would break the tree's shape.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            StudyError::MoveNotFound(_)
                | StudyError::NotTerminal(_)
                | StudyError::PositionMismatch { .. }
        )
    }
}
