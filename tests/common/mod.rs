#![allow(dead_code)]

use study_core::board::{BoardSync, MoveEvent};
use study_core::reducer::{reduce, Direction, GameState, Intent, Reduced};
use study_core::StudyError;

/// Play `orig`-`dest` on the displayed position, the way the board does.
pub fn play(state: &GameState, orig: &str, dest: &str) -> Result<Reduced, StudyError> {
    let sync = BoardSync::new(state)?;
    let intent = sync.on_move(&MoveEvent::new(orig, dest))?;
    reduce(state, intent)
}

/// Play a sequence of `e2e4`-style moves, failing the test on any error.
pub fn play_all(mut state: GameState, moves: &[&str]) -> GameState {
    for uci in moves {
        state = play(&state, &uci[0..2], &uci[2..4]).unwrap().state;
    }
    state
}

pub fn back(state: &GameState) -> GameState {
    reduce(state, Intent::Navigate(Direction::Backward)).unwrap().state
}

pub fn forward(state: &GameState) -> GameState {
    reduce(state, Intent::Navigate(Direction::Forward)).unwrap().state
}

pub fn main_line(state: &GameState) -> Vec<String> {
    state.study.moves.iter().map(|m| m.mv.san.clone()).collect()
}

pub fn current_san(state: &GameState) -> Option<String> {
    state.current_node().map(|n| n.chess_move().san.clone())
}
