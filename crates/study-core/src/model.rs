//! Persisted shape of a chess study.
//!
//! A study is a main line of [`StudyMove`]s. Each main-line move may own
//! [`Variant`]s: alternative continuations one level deep, made of
//! [`VariantMove`]s which never own variants themselves.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::fmt;

pub const STANDARD_START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Schema tag written into every study file.
pub const CURRENT_STORAGE_VERSION: &str = "0.0.2";

/// Stable identity of a move node. Never reused, never an index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoveId(String);

impl MoveId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MoveId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for MoveId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for MoveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantId(String);

impl VariantId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Side that played a move, stored as `w` / `b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "w")]
    White,
    #[serde(rename = "b")]
    Black,
}

impl From<shakmaty::Color> for Side {
    fn from(color: shakmaty::Color) -> Self {
        match color {
            shakmaty::Color::White => Side::White,
            shakmaty::Color::Black => Side::Black,
        }
    }
}

/// A legal move as reported by the rules engine.
///
/// `flags` uses one letter per property: `n` normal, `c` capture,
/// `b` pawn double push, `e` en passant, `p` promotion, `k`/`q` castling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChessMove {
    pub color: Side,
    pub from: String,
    pub to: String,
    pub piece: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<String>,
    pub flags: String,
    pub san: String,
    #[serde(default)]
    pub lan: String,
    pub before: String,
    pub after: String,
}

impl ChessMove {
    pub fn is_capture(&self) -> bool {
        self.flags.contains('c') || self.flags.contains('e')
    }

    /// Full-move number of the position the move was played from.
    pub fn fullmove_number(&self) -> u32 {
        self.before
            .split_whitespace()
            .nth(5)
            .and_then(|n| n.parse().ok())
            .unwrap_or(1)
    }
}

/// An arrow (`orig` -> `dest`) or a circle (`orig` only) drawn on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawShape {
    pub orig: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brush: Option<String>,
}

impl DrawShape {
    pub fn arrow(orig: &str, dest: &str, brush: &str) -> Self {
        Self {
            orig: orig.to_string(),
            dest: Some(dest.to_string()),
            brush: Some(brush.to_string()),
        }
    }

    pub fn circle(orig: &str, brush: &str) -> Self {
        Self {
            orig: orig.to_string(),
            dest: None,
            brush: Some(brush.to_string()),
        }
    }
}

/// Behaviour shared by main-line and variant move nodes.
pub trait StudyNode {
    fn move_id(&self) -> &MoveId;
    fn chess_move(&self) -> &ChessMove;
    fn shapes(&self) -> &[DrawShape];
    fn comment(&self) -> Option<&JsonValue>;
    fn set_shapes(&mut self, shapes: Vec<DrawShape>);
    fn set_comment(&mut self, comment: Option<JsonValue>);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyMove {
    #[serde(flatten)]
    pub mv: ChessMove,
    pub move_id: MoveId,
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub shapes: Vec<DrawShape>,
    #[serde(default)]
    pub comment: Option<JsonValue>,
}

impl StudyMove {
    pub fn new(mv: ChessMove) -> Self {
        Self {
            mv,
            move_id: MoveId::generate(),
            variants: Vec::new(),
            shapes: Vec::new(),
            comment: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantMove {
    #[serde(flatten)]
    pub mv: ChessMove,
    pub move_id: MoveId,
    #[serde(default)]
    pub shapes: Vec<DrawShape>,
    #[serde(default)]
    pub comment: Option<JsonValue>,
}

impl VariantMove {
    pub fn new(mv: ChessMove) -> Self {
        Self {
            mv,
            move_id: MoveId::generate(),
            shapes: Vec::new(),
            comment: None,
        }
    }
}

macro_rules! impl_study_node {
    ($ty:ty) => {
        impl StudyNode for $ty {
            fn move_id(&self) -> &MoveId {
                &self.move_id
            }

            fn chess_move(&self) -> &ChessMove {
                &self.mv
            }

            fn shapes(&self) -> &[DrawShape] {
                &self.shapes
            }

            fn comment(&self) -> Option<&JsonValue> {
                self.comment.as_ref()
            }

            fn set_shapes(&mut self, shapes: Vec<DrawShape>) {
                self.shapes = shapes;
            }

            fn set_comment(&mut self, comment: Option<JsonValue>) {
                self.comment = comment;
            }
        }
    };
}

impl_study_node!(StudyMove);
impl_study_node!(VariantMove);

/// Alternative continuation branching off `parent_move_id`. Never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub variant_id: VariantId,
    pub parent_move_id: MoveId,
    pub moves: Vec<VariantMove>,
}

impl Variant {
    pub fn new(parent_move_id: MoveId, first: VariantMove) -> Self {
        Self {
            variant_id: VariantId::generate(),
            parent_move_id,
            moves: vec![first],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyHeader {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyFile {
    pub version: String,
    #[serde(default)]
    pub header: StudyHeader,
    #[serde(rename = "rootFEN", default = "default_root_fen")]
    pub root_fen: String,
    #[serde(default)]
    pub moves: Vec<StudyMove>,
    /// Fields written by other versions, carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

fn default_root_fen() -> String {
    STANDARD_START_FEN.to_string()
}

impl StudyFile {
    pub fn new(title: Option<String>, root_fen: String) -> Self {
        Self {
            version: CURRENT_STORAGE_VERSION.to_string(),
            header: StudyHeader { title },
            root_fen,
            moves: Vec::new(),
            extra: Map::new(),
        }
    }
}

impl Default for StudyFile {
    fn default() -> Self {
        Self::new(None, default_root_fen())
    }
}
