//! Integration tests: editing a study through the reducer the way a user
//! at the board would.

mod common;

use common::{back, current_san, forward, main_line, play, play_all};
use study_core::model::{StudyFile, STANDARD_START_FEN};
use study_core::reducer::{reduce, GameState, Intent, Outcome};
use study_core::tree::{self, MovePosition};
use study_core::StudyError;

fn fresh() -> GameState {
    GameState::new(StudyFile::default())
}

#[test]
fn test_branch_off_the_main_line() {
    let state = play_all(fresh(), &["e2e4"]);
    assert_eq!(main_line(&state), ["e4"]);
    assert_eq!(current_san(&state).as_deref(), Some("e4"));

    let state = play_all(state, &["e7e5"]);
    assert_eq!(state.study.moves.len(), 2);

    let state = back(&state);
    assert_eq!(current_san(&state).as_deref(), Some("e4"));
    assert_eq!(state.displayed_fen(), state.study.moves[0].mv.after);

    let reduced = play(&state, "c7", "c5").unwrap();
    let state = reduced.state;
    assert_eq!(state.study.moves.len(), 2);
    assert_eq!(state.study.moves[0].variants.len(), 1);
    let variant = &state.study.moves[0].variants[0];
    assert_eq!(variant.parent_move_id, state.study.moves[0].move_id);
    assert_eq!(variant.moves.len(), 1);
    assert_eq!(variant.moves[0].mv.san, "c5");
    assert_eq!(current_san(&state).as_deref(), Some("c5"));

    let board = reduced.board.unwrap();
    assert_eq!(board.fen, variant.moves[0].mv.after);
    assert!(board.movable.dests.contains_key("g1"));
}

#[test]
fn test_undivergent_moves_locate_in_order() {
    let state = play_all(fresh(), &["d2d4", "g8f6", "c2c4", "e7e6", "b1c3", "f8b4"]);
    for (i, m) in state.study.moves.iter().enumerate() {
        assert_eq!(tree::locate(&state.study.moves, &m.move_id), Some(MovePosition::main(i)));
    }
    assert_eq!(main_line(&state), ["d4", "Nf6", "c4", "e6", "Nc3", "Bb4"]);
}

#[test]
fn test_known_continuation_does_not_duplicate() {
    let state = play_all(fresh(), &["e2e4", "e7e5", "g1f3"]);
    let before = state.study.clone();
    let state = back(&back(&state));

    let state = play_all(state, &["e7e5"]);
    assert_eq!(state.study, before);
    assert_eq!(state.current_move, Some(before.moves[1].move_id.clone()));
}

#[test]
fn test_same_divergence_reuses_variant() {
    let state = play_all(fresh(), &["e2e4", "e7e5"]);
    let e4 = Intent::NavigateTo(state.study.moves[0].move_id.clone());

    let first = play_all(reduce(&state, e4.clone()).unwrap().state, &["c7c5"]);
    // backing up from a variant's first move stays inside the variant
    assert_eq!(back(&first).current_move, first.current_move);

    let again = play_all(reduce(&first, e4).unwrap().state, &["c7c5"]);
    assert_eq!(again.study.moves[0].variants.len(), 1);
    assert_eq!(again.current_move, first.current_move);
}

#[test]
fn test_remove_undoes_add() {
    let main = play_all(fresh(), &["e2e4", "e7e5"]);
    let added = play_all(main.clone(), &["g1f3"]);
    let removed = reduce(&added, Intent::RemoveLastMove).unwrap().state;
    assert_eq!(removed, main);

    let at_e4 = back(&main);
    let branched = play_all(at_e4.clone(), &["c7c5"]);
    let removed = reduce(&branched, Intent::RemoveLastMove).unwrap();
    assert!(removed.state.study.moves[0].variants.is_empty());
    assert_eq!(removed.state.current_move, at_e4.current_move);
    assert_eq!(removed.board.unwrap().fen, main.study.moves[0].mv.after);
}

#[test]
fn test_remove_non_terminal_is_rejected() {
    let state = back(&play_all(fresh(), &["e2e4", "e7e5"]));
    let err = reduce(&state, Intent::RemoveLastMove).unwrap_err();
    assert!(matches!(err, StudyError::NotTerminal(_)));
    assert_eq!(state.study.moves.len(), 2);
}

#[test]
fn test_forward_back_round_trip() {
    let state = play_all(fresh(), &["e2e4", "e7e5", "g1f3", "b8c6"]);
    let start = back(&back(&state));
    assert!(start.is_view_only);

    let round = back(&forward(&start));
    assert_eq!(round.current_move, start.current_move);
    assert_eq!(round.displayed_fen(), start.displayed_fen());
}

#[test]
fn test_navigation_past_ends_is_a_no_op() {
    let state = play_all(fresh(), &["e2e4"]);
    let reduced = reduce(&state, Intent::Navigate(study_core::reducer::Direction::Forward)).unwrap();
    assert!(matches!(reduced.outcome, Outcome::Ignored(_)));
    assert_eq!(reduced.state, state);

    let empty = fresh();
    let reduced = reduce(&empty, Intent::Navigate(study_core::reducer::Direction::Backward)).unwrap();
    assert!(matches!(reduced.outcome, Outcome::Ignored(_)));
    assert_eq!(reduced.state.displayed_fen(), STANDARD_START_FEN);
}

#[test]
fn test_branch_off_a_variant_middle_is_dropped() {
    let state = back(&play_all(fresh(), &["e2e4", "e7e5"]));
    let state = play_all(state, &["c7c5", "g1f3", "d7d6"]);
    let at_c5 = back(&back(&state));
    assert_eq!(current_san(&at_c5).as_deref(), Some("c5"));

    let reduced = play(&at_c5, "b1", "c3").unwrap();
    assert!(matches!(reduced.outcome, Outcome::Ignored(_)));
    assert_eq!(reduced.state, at_c5);
    // the board is told to put the piece back
    assert_eq!(reduced.board.unwrap().fen, at_c5.displayed_fen());
}
