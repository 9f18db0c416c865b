//! PGN/FEN import with a lightweight regex-based parser.
//!
//! Headers, comments, NAGs and variations are stripped; the remaining SAN
//! tokens are replayed through the rules engine to build the main line.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::error::StudyError;
use crate::model::{StudyFile, StudyMove, STANDARD_START_FEN};
use crate::rules::LivePosition;

static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\[(\w+)\s+"([^"]*)"\]"#).expect("valid header regex"));
static FEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[1-8pnbrqkPNBRQK]+(/[1-8pnbrqkPNBRQK]+){7}\s+[wb]\b").expect("valid FEN regex")
});
static MOVE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.+").expect("valid move number regex"));

const RESULTS: [&str; 4] = ["1-0", "0-1", "1/2-1/2", "*"];

/// Build a study from pasted text: empty, a FEN, or a PGN.
pub fn import_study(text: &str) -> Result<StudyFile, StudyError> {
    let text = text.trim();

    if text.is_empty() {
        return Ok(StudyFile::default());
    }

    if FEN_RE.is_match(text) {
        let live = LivePosition::from_fen(text)?;
        debug!(fen = %text, "Imported FEN");
        return Ok(StudyFile::new(None, live.fen()));
    }

    parse_pgn(text)
}

/// Parse a PGN game into a study. Only headers and the main line survive.
pub fn parse_pgn(pgn: &str) -> Result<StudyFile, StudyError> {
    let mut title = None;
    let mut event = None;
    let mut fen = None;

    for cap in HEADER_RE.captures_iter(pgn) {
        let value = cap[2].trim().to_string();
        if value.is_empty() || value == "?" {
            continue;
        }
        match &cap[1] {
            "Title" => title = Some(value),
            "Event" => event = Some(value),
            "FEN" => fen = Some(value),
            _ => {}
        }
    }

    let root = match fen.as_deref() {
        Some(fen) => LivePosition::from_fen(fen)?,
        None => LivePosition::from_fen(STANDARD_START_FEN)?,
    };

    let mut study = StudyFile::new(title.or(event), root.fen());
    let mut live = root;

    for token in extract_tokens(pgn)? {
        let mv = live.play_san(&token)?;
        live = LivePosition::from_fen(&mv.after)?;
        study.moves.push(StudyMove::new(mv));
    }

    debug!(moves = study.moves.len(), title = ?study.header.title, "Imported PGN");
    Ok(study)
}

/// SAN tokens from the movetext, in order.
fn extract_tokens(pgn: &str) -> Result<Vec<String>, StudyError> {
    let movetext = HEADER_RE.replace_all(pgn, " ");
    let movetext = strip_annotations(&movetext)?;

    let mut tokens = Vec::new();
    for raw in movetext.split_whitespace() {
        if RESULTS.contains(&raw) || raw.starts_with('$') {
            continue;
        }
        let token = MOVE_NUMBER_RE.replace(raw, "");
        if token.is_empty() {
            continue;
        }
        tokens.push(token.into_owned());
    }
    Ok(tokens)
}

/// Drop `{comments}`, `; rest-of-line comments` and `(variations)`,
/// which may nest.
fn strip_annotations(movetext: &str) -> Result<String, StudyError> {
    let mut out = String::with_capacity(movetext.len());
    let mut depth = 0usize;
    let mut chars = movetext.chars();

    while let Some(c) = chars.next() {
        match c {
            '{' => {
                if !chars.by_ref().any(|c| c == '}') {
                    return Err(StudyError::Parse("unterminated comment".into()));
                }
                out.push(' ');
            }
            ';' => {
                chars.by_ref().find(|&c| c == '\n');
                out.push(' ');
            }
            '(' => depth += 1,
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| StudyError::Parse("unbalanced ')'".into()))?;
                out.push(' ');
            }
            _ if depth > 0 => {}
            _ => out.push(c),
        }
    }

    if depth > 0 {
        return Err(StudyError::Parse("unterminated variation".into()));
    }
    Ok(out)
}
