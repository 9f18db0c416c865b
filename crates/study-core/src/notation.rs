//! Move numbering for display, move-list rendering and PGN export.

use serde_json::Value as JsonValue;
use std::fmt::Write;

use crate::error::StudyError;
use crate::model::{MoveId, Side, StudyFile, StudyMove, StudyNode, Variant, VariantMove, STANDARD_START_FEN};
use crate::rules::{self, LivePosition};

/// One row of the move list. `white` is `None` only for the first row of
/// a study whose root position has black to move.
#[derive(Debug, Clone, Copy)]
pub struct MovePair<'a> {
    pub number: u32,
    pub white: Option<&'a StudyMove>,
    pub black: Option<&'a StudyMove>,
}

pub fn move_pairs(study: &StudyFile) -> Result<Vec<MovePair<'_>>, StudyError> {
    let root = LivePosition::from_fen(&study.root_fen)?;
    let mut number = root.fullmoves();
    let mut moves = study.moves.iter();
    let mut pairs = Vec::with_capacity(study.moves.len() / 2 + 1);

    if root.turn() == Side::Black {
        if let Some(first) = moves.next() {
            pairs.push(MovePair {
                number,
                white: None,
                black: Some(first),
            });
            number += 1;
        }
    }

    while let Some(white) = moves.next() {
        pairs.push(MovePair {
            number,
            white: Some(white),
            black: moves.next(),
        });
        number += 1;
    }

    Ok(pairs)
}

/// Number prefix for each move of a variant: `N.` before white moves,
/// `N...` before a variant's opening black move, nothing otherwise.
pub fn variant_labels(variant: &Variant) -> Vec<(Option<String>, &VariantMove)> {
    variant
        .moves
        .iter()
        .enumerate()
        .map(|(i, m)| (number_prefix(m.mv.color, m.mv.fullmove_number(), i == 0), m))
        .collect()
}

fn number_prefix(color: Side, number: u32, first: bool) -> Option<String> {
    match (color, first) {
        (Side::White, _) => Some(format!("{number}.")),
        (Side::Black, true) => Some(format!("{number}...")),
        (Side::Black, false) => None,
    }
}

/// Plain text of a structured comment document.
pub fn comment_text(comment: &JsonValue) -> String {
    fn collect(node: &JsonValue, out: &mut Vec<String>) {
        match node {
            JsonValue::String(s) => out.push(s.clone()),
            JsonValue::Object(map) => {
                if let Some(JsonValue::String(text)) = map.get("text") {
                    out.push(text.clone());
                }
                if let Some(content) = map.get("content") {
                    collect(content, out);
                }
            }
            JsonValue::Array(items) => items.iter().for_each(|item| collect(item, out)),
            _ => {}
        }
    }

    let mut parts = Vec::new();
    collect(comment, &mut parts);
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Structured comment document holding a single paragraph of `text`.
pub fn comment_document(text: &str) -> JsonValue {
    serde_json::json!({
        "type": "doc",
        "content": [{
            "type": "paragraph",
            "content": [{ "type": "text", "text": text }],
        }],
    })
}

fn render_san(san: &str, id: &MoveId, current: Option<&MoveId>) -> String {
    if current == Some(id) {
        format!("[{san}]")
    } else {
        san.to_string()
    }
}

/// Text move list: one numbered row per move pair, variants indented
/// underneath, the current move in brackets.
pub fn move_list_text(study: &StudyFile, current: Option<&MoveId>, show_comments: bool) -> Result<String, StudyError> {
    let mut out = String::new();

    for pair in move_pairs(study)? {
        let white = pair
            .white
            .map_or_else(|| "...".to_string(), |m| render_san(&m.mv.san, &m.move_id, current));
        let _ = write!(out, "{:>3}. {white}", pair.number);
        if let Some(black) = pair.black {
            let _ = write!(out, " {}", render_san(&black.mv.san, &black.move_id, current));
        }
        out.push('\n');

        for m in pair.white.into_iter().chain(pair.black) {
            if show_comments {
                if let Some(comment) = m.comment() {
                    let _ = writeln!(out, "      {{{}}} ({})", comment_text(comment), m.mv.san);
                }
            }
            for variant in &m.variants {
                let line: Vec<String> = variant_labels(variant)
                    .into_iter()
                    .map(|(label, vm)| {
                        let san = render_san(&vm.mv.san, &vm.move_id, current);
                        match label {
                            Some(label) => format!("{label} {san}"),
                            None => san,
                        }
                    })
                    .collect();
                let _ = writeln!(out, "      ({})", line.join(" "));
            }
        }
    }

    Ok(out)
}

/// Appends numbered SAN tokens, tracking when black needs `N...`.
struct MovetextWriter {
    tokens: Vec<String>,
    resume: bool,
}

impl MovetextWriter {
    fn push_node(&mut self, node: &dyn StudyNode) {
        let mv = node.chess_move();
        let (number, san) = (mv.fullmove_number(), &mv.san);
        match mv.color {
            Side::White => self.tokens.push(format!("{number}. {san}")),
            Side::Black if self.resume => self.tokens.push(format!("{number}... {san}")),
            Side::Black => self.tokens.push(san.to_string()),
        }
        self.resume = false;

        let text = node.comment().map(comment_text).unwrap_or_default();
        if !text.is_empty() {
            self.tokens.push(format!("{{{}}}", text.replace('}', ")")));
            self.resume = true;
        }
    }

    fn push_variant(&mut self, variant: &Variant) {
        let mut inner = MovetextWriter {
            tokens: Vec::new(),
            resume: true,
        };
        for m in &variant.moves {
            inner.push_node(m);
        }
        self.tokens.push(format!("({})", inner.tokens.join(" ")));
        self.resume = true;
    }
}

/// PGN for the study: title, non-standard root, main line, one level of
/// variations and comments.
pub fn to_pgn(study: &StudyFile) -> String {
    let mut pgn = String::new();
    let title = study.header.title.as_deref().unwrap_or("?").replace('"', "'");
    let _ = writeln!(pgn, "[Event \"{title}\"]");
    if !rules::same_position(&study.root_fen, STANDARD_START_FEN) {
        let _ = writeln!(pgn, "[SetUp \"1\"]");
        let _ = writeln!(pgn, "[FEN \"{}\"]", study.root_fen);
    }
    let _ = writeln!(pgn, "[Result \"*\"]");
    pgn.push('\n');

    let mut writer = MovetextWriter {
        tokens: Vec::new(),
        resume: true,
    };

    // variants of move i are alternatives to move i + 1
    let mut pending: &[Variant] = &[];
    for m in &study.moves {
        writer.push_node(m);
        for variant in pending {
            writer.push_variant(variant);
        }
        pending = &m.variants;
    }

    // variants behind the last main move have nothing to stand in for: the
    // first one continues the game, the rest are its alternatives
    if let Some((continuation, others)) = pending.split_first() {
        let mut moves = continuation.moves.iter();
        if let Some(first) = moves.next() {
            writer.push_node(first);
        }
        for variant in others {
            writer.push_variant(variant);
        }
        for m in moves {
            writer.push_node(m);
        }
    }

    writer.tokens.push("*".to_string());
    pgn.push_str(&writer.tokens.join(" "));
    pgn.push('\n');
    pgn
}
