//! Locating and addressing moves in the two-level study tree.
//!
//! Moves are always found by [`MoveId`]; a [`MovePosition`] is only a
//! short-lived address into one particular snapshot of the tree.

use crate::model::{ChessMove, MoveId, StudyMove, StudyNode, Variant};

/// Address of a variant: the main-line move it hangs off and its index
/// among that move's variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantPosition {
    pub parent_move_index: usize,
    pub variant_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovePosition {
    /// `None` for the main line.
    pub variant: Option<VariantPosition>,
    /// Index within the main line, or within the variant's moves.
    pub move_index: usize,
}

impl MovePosition {
    pub fn main(move_index: usize) -> Self {
        Self {
            variant: None,
            move_index,
        }
    }

    fn with_index(self, move_index: usize) -> Self {
        Self { move_index, ..self }
    }
}

/// Find `move_id`, searching the main line first, then every variant in
/// main-line order and creation order. `None` when absent.
pub fn locate(moves: &[StudyMove], move_id: &MoveId) -> Option<MovePosition> {
    if let Some(index) = moves.iter().position(|m| &m.move_id == move_id) {
        return Some(MovePosition::main(index));
    }

    for (parent_move_index, parent) in moves.iter().enumerate() {
        for (variant_index, variant) in parent.variants.iter().enumerate() {
            if let Some(move_index) = variant.moves.iter().position(|m| &m.move_id == move_id) {
                return Some(MovePosition {
                    variant: Some(VariantPosition {
                        parent_move_index,
                        variant_index,
                    }),
                    move_index,
                });
            }
        }
    }

    None
}

pub fn variant<'a>(moves: &'a [StudyMove], at: VariantPosition) -> Option<&'a Variant> {
    moves.get(at.parent_move_index)?.variants.get(at.variant_index)
}

pub fn variant_mut(moves: &mut [StudyMove], at: VariantPosition) -> Option<&mut Variant> {
    moves.get_mut(at.parent_move_index)?.variants.get_mut(at.variant_index)
}

/// Number of moves in the line that contains `pos`.
pub fn line_len(moves: &[StudyMove], pos: MovePosition) -> usize {
    match pos.variant {
        Some(at) => variant(moves, at).map_or(0, |v| v.moves.len()),
        None => moves.len(),
    }
}

pub fn is_last_in_line(moves: &[StudyMove], pos: MovePosition) -> bool {
    pos.move_index + 1 == line_len(moves, pos)
}

pub fn node(moves: &[StudyMove], pos: MovePosition) -> Option<&dyn StudyNode> {
    match pos.variant {
        Some(at) => variant(moves, at)?
            .moves
            .get(pos.move_index)
            .map(|m| m as &dyn StudyNode),
        None => moves.get(pos.move_index).map(|m| m as &dyn StudyNode),
    }
}

pub fn node_mut(moves: &mut [StudyMove], pos: MovePosition) -> Option<&mut dyn StudyNode> {
    match pos.variant {
        Some(at) => variant_mut(moves, at)?
            .moves
            .get_mut(pos.move_index)
            .map(|m| m as &mut dyn StudyNode),
        None => moves.get_mut(pos.move_index).map(|m| m as &mut dyn StudyNode),
    }
}

/// Neighbour of `pos` within its own line; `None` past either end.
pub fn offset(moves: &[StudyMove], pos: MovePosition, delta: isize) -> Option<MovePosition> {
    let target = pos.move_index.checked_add_signed(delta)?;
    (target < line_len(moves, pos)).then(|| pos.with_index(target))
}

/// Index of the variant of `parent` whose first move has `san`.
pub fn find_variant_by_first_san(parent: &StudyMove, san: &str) -> Option<usize> {
    parent
        .variants
        .iter()
        .position(|v| v.moves.first().is_some_and(|m| m.mv.san == san))
}

/// Moves from the root up to and including `pos`: the main line up to the
/// branch point, then the variant's own moves.
pub fn path_to(moves: &[StudyMove], pos: MovePosition) -> Vec<&ChessMove> {
    match pos.variant {
        Some(at) => {
            let mut path: Vec<&ChessMove> = moves
                .iter()
                .take(at.parent_move_index + 1)
                .map(|m| &m.mv)
                .collect();
            if let Some(v) = variant(moves, at) {
                path.extend(v.moves.iter().take(pos.move_index + 1).map(|m| &m.mv));
            }
            path
        }
        None => moves.iter().take(pos.move_index + 1).map(|m| &m.mv).collect(),
    }
}

/// Every move id in the tree, main line first.
pub fn move_ids(moves: &[StudyMove]) -> Vec<&MoveId> {
    let mut ids: Vec<&MoveId> = moves.iter().map(|m| &m.move_id).collect();
    for parent in moves {
        for v in &parent.variants {
            ids.extend(v.moves.iter().map(|m| &m.move_id));
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Side, VariantMove};

    fn chess_move(san: &str) -> ChessMove {
        ChessMove {
            color: Side::White,
            from: "a1".into(),
            to: "a2".into(),
            piece: "r".into(),
            captured: None,
            promotion: None,
            flags: "n".into(),
            san: san.into(),
            lan: String::new(),
            before: String::new(),
            after: String::new(),
        }
    }

    /// Main line a b c; variant on `a` with x y, second variant on `a` with z.
    fn sample() -> Vec<StudyMove> {
        let mut moves: Vec<StudyMove> = ["a", "b", "c"]
            .iter()
            .map(|san| StudyMove::new(chess_move(san)))
            .collect();
        let parent_id = moves[0].move_id.clone();
        let mut first = Variant::new(parent_id.clone(), VariantMove::new(chess_move("x")));
        first.moves.push(VariantMove::new(chess_move("y")));
        let second = Variant::new(parent_id, VariantMove::new(chess_move("z")));
        moves[0].variants = vec![first, second];
        moves
    }

    #[test]
    fn test_locate_main_line() {
        let moves = sample();
        for (i, m) in moves.iter().enumerate() {
            assert_eq!(locate(&moves, &m.move_id), Some(MovePosition::main(i)));
        }
    }

    #[test]
    fn test_locate_variant() {
        let moves = sample();
        let y = moves[0].variants[0].moves[1].move_id.clone();
        let z = moves[0].variants[1].moves[0].move_id.clone();

        let pos = locate(&moves, &y).unwrap();
        assert_eq!(
            pos.variant,
            Some(VariantPosition {
                parent_move_index: 0,
                variant_index: 0
            })
        );
        assert_eq!(pos.move_index, 1);
        assert_eq!(locate(&moves, &z).unwrap().variant.unwrap().variant_index, 1);
        assert_eq!(node(&moves, pos).unwrap().chess_move().san, "y");
    }

    #[test]
    fn test_locate_missing() {
        assert_eq!(locate(&sample(), &MoveId::from("nope")), None);
        assert_eq!(locate(&[], &MoveId::from("nope")), None);
    }

    #[test]
    fn test_offset_stays_in_line() {
        let moves = sample();
        let x = locate(&moves, &moves[0].variants[0].moves[0].move_id).unwrap();
        let y = offset(&moves, x, 1).unwrap();
        assert_eq!(node(&moves, y).unwrap().chess_move().san, "y");
        assert!(is_last_in_line(&moves, y));
        assert_eq!(offset(&moves, y, 1), None);
        assert_eq!(offset(&moves, x, -1), None);

        let c = MovePosition::main(2);
        assert_eq!(offset(&moves, c, -1), Some(MovePosition::main(1)));
        assert_eq!(offset(&moves, c, 1), None);
    }

    #[test]
    fn test_path_to_variant_follows_branch_point() {
        let moves = sample();
        let y = locate(&moves, &moves[0].variants[0].moves[1].move_id).unwrap();
        let sans: Vec<&str> = path_to(&moves, y).iter().map(|m| m.san.as_str()).collect();
        assert_eq!(sans, vec!["a", "x", "y"]);
    }

    #[test]
    fn test_find_variant_and_ids() {
        let moves = sample();
        assert_eq!(find_variant_by_first_san(&moves[0], "z"), Some(1));
        assert_eq!(find_variant_by_first_san(&moves[0], "y"), None);
        assert_eq!(move_ids(&moves).len(), 6);
    }

    #[test]
    fn test_node_mut_sets_comment() {
        let mut moves = sample();
        let pos = MovePosition::main(1);
        node_mut(&mut moves, pos)
            .unwrap()
            .set_comment(Some(serde_json::json!("note")));
        assert_eq!(moves[1].comment, Some(serde_json::json!("note")));
    }
}
