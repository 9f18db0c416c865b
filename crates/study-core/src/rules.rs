//! Thin adapter over shakmaty: legality, SAN, check detection and FEN.
//!
//! A [`LivePosition`] is built from a FEN for every position the board shows
//! and is replaced, not mutated, when the displayed move changes.

use shakmaty::fen::Fen;
use shakmaty::san::San;
use shakmaty::{CastlingMode, Chess, EnPassantMode, File, Move, Position, Role, Square};
use std::collections::BTreeMap;

use crate::error::StudyError;
use crate::model::{ChessMove, Side};

/// Parse a FEN string into a playable position.
pub fn position_from_fen(fen: &str) -> Result<Chess, StudyError> {
    let invalid = |reason: String| StudyError::InvalidFen {
        fen: fen.to_string(),
        reason,
    };

    let parsed: Fen = fen.trim().parse().map_err(|e: shakmaty::fen::ParseFenError| invalid(e.to_string()))?;
    parsed
        .into_position(CastlingMode::Standard)
        .map_err(|e| invalid(e.to_string()))
}

pub fn fen_of(pos: &Chess) -> String {
    Fen::from_position(pos, EnPassantMode::Legal).to_string()
}

/// Compares piece placement, side to move and castling rights.
/// En passant and move counters are ignored so files written by other
/// engines still line up.
pub fn same_position(a: &str, b: &str) -> bool {
    let key = |fen: &str| fen.split_whitespace().take(3).collect::<Vec<_>>().join(" ");
    key(a) == key(b)
}

/// Square the king lands on for castling moves, `to` otherwise.
fn board_dest(m: &Move) -> Square {
    match *m {
        Move::Castle { king, rook } => {
            let file = if rook.file() > king.file() { File::G } else { File::C };
            Square::from_coords(file, king.rank())
        }
        _ => m.to(),
    }
}

#[derive(Debug, Clone)]
pub struct LivePosition {
    pos: Chess,
}

impl LivePosition {
    pub fn from_fen(fen: &str) -> Result<Self, StudyError> {
        Ok(Self {
            pos: position_from_fen(fen)?,
        })
    }

    pub fn standard() -> Self {
        Self {
            pos: Chess::default(),
        }
    }

    pub fn fen(&self) -> String {
        fen_of(&self.pos)
    }

    pub fn turn(&self) -> Side {
        self.pos.turn().into()
    }

    pub fn is_check(&self) -> bool {
        self.pos.is_check()
    }

    pub fn fullmoves(&self) -> u32 {
        self.pos.fullmoves().get()
    }

    /// Legal destination squares keyed by origin square.
    pub fn dests(&self) -> BTreeMap<String, Vec<String>> {
        let mut dests: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for m in self.pos.legal_moves() {
            let Some(from) = m.from() else { continue };
            let to = board_dest(&m).to_string();
            let entry = dests.entry(from.to_string()).or_default();
            // promotions share a destination
            if !entry.contains(&to) {
                entry.push(to);
            }
        }
        dests
    }

    /// Play `orig` -> `dest` as a board widget reports it. Castling may be
    /// given as king-to-destination or king-onto-rook. Promotions default
    /// to a queen.
    pub fn play(&self, orig: &str, dest: &str, promotion: Option<char>) -> Result<ChessMove, StudyError> {
        let illegal = || StudyError::IllegalMove {
            from: orig.to_string(),
            to: dest.to_string(),
        };

        let from: Square = orig.parse().map_err(|_| illegal())?;
        let to: Square = dest.parse().map_err(|_| illegal())?;
        let wanted = match promotion {
            Some(c) => Role::from_char(c.to_ascii_lowercase()).ok_or_else(illegal)?,
            None => Role::Queen,
        };

        let legals = self.pos.legal_moves();
        let chosen = legals
            .iter()
            .filter(|m| m.from() == Some(from))
            .filter(|m| match m {
                Move::Castle { rook, .. } => board_dest(m) == to || *rook == to,
                _ => m.to() == to,
            })
            .find(|m| m.promotion().map_or(true, |role| role == wanted))
            .ok_or_else(illegal)?;

        Ok(self.describe(chosen))
    }

    /// Play a move given in SAN (check/annotation suffixes allowed).
    pub fn play_san(&self, token: &str) -> Result<ChessMove, StudyError> {
        let cleaned = token.trim_end_matches(|c| matches!(c, '+' | '#' | '!' | '?'));
        let san: San = cleaned
            .parse()
            .map_err(|_| StudyError::Parse(format!("Invalid SAN '{token}'")))?;
        let mv = san
            .to_move(&self.pos)
            .map_err(|_| StudyError::Parse(format!("Illegal move '{token}'")))?;
        Ok(self.describe(&mv))
    }

    /// Enrich a legal move with SAN, flags and the surrounding FENs.
    fn describe(&self, m: &Move) -> ChessMove {
        let mut after = self.pos.clone();
        after.play_unchecked(*m);

        let mut san = San::from_move(&self.pos, *m).to_string();
        if after.is_checkmate() {
            san.push('#');
        } else if after.is_check() {
            san.push('+');
        }

        let from = m.from().map(|sq| sq.to_string()).unwrap_or_default();
        let to = board_dest(m);
        let promotion = m.promotion().map(|role| role.char().to_string());
        let lan = format!("{from}{to}{}", promotion.as_deref().unwrap_or(""));

        ChessMove {
            color: self.turn(),
            from,
            to: to.to_string(),
            piece: m.role().char().to_string(),
            captured: m.capture().map(|role| role.char().to_string()),
            promotion,
            flags: move_flags(m),
            san,
            lan,
            before: self.fen(),
            after: fen_of(&after),
        }
    }
}

fn move_flags(m: &Move) -> String {
    let mut flags = String::new();

    if m.is_en_passant() {
        flags.push('e');
    } else if m.is_capture() {
        flags.push('c');
    }

    if let Move::Normal { role: Role::Pawn, from, to, .. } = *m {
        if (from.rank() as i32 - to.rank() as i32).abs() == 2 {
            flags.push('b');
        }
    }

    if m.is_promotion() {
        flags.push('p');
    }

    if let Move::Castle { king, rook } = *m {
        flags.push(if rook.file() > king.file() { 'k' } else { 'q' });
    }

    if flags.is_empty() {
        flags.push('n');
    }
    flags
}

/// Replay `path` from `root_fen`, checking every move's stored FENs
/// against the engine. Returns the position after the last move.
pub fn replay(root_fen: &str, path: &[&ChessMove]) -> Result<LivePosition, StudyError> {
    let mut live = LivePosition::from_fen(root_fen)?;

    for mv in path {
        let expected = live.fen();
        if !same_position(&mv.before, &expected) {
            return Err(StudyError::PositionMismatch {
                expected,
                actual: mv.before.clone(),
            });
        }

        let promotion = mv.promotion.as_deref().and_then(|p| p.chars().next());
        let played = live.play(&mv.from, &mv.to, promotion)?;
        if !same_position(&played.after, &mv.after) {
            return Err(StudyError::PositionMismatch {
                expected: played.after,
                actual: mv.after.clone(),
            });
        }
        live = LivePosition::from_fen(&played.after)?;
    }

    Ok(live)
}
