//! Game-state reducer.
//!
//! [`reduce`] takes a snapshot and one [`Intent`] and returns a fresh
//! snapshot plus the board configuration to show. The input state is never
//! touched, so a rejected intent leaves nothing half-applied.

use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::board::BoardConfig;
use crate::error::StudyError;
use crate::model::{ChessMove, DrawShape, MoveId, StudyFile, StudyMove, StudyNode, Variant, VariantMove};
use crate::rules;
use crate::tree::{self, MovePosition};

#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    /// Identity of the displayed move; `None` only while the main line is empty.
    pub current_move: Option<MoveId>,
    /// True when the displayed move is not the tip of its line.
    pub is_view_only: bool,
    pub study: StudyFile,
}

impl GameState {
    /// Opens a study on the last main-line move.
    pub fn new(study: StudyFile) -> Self {
        Self {
            current_move: study.moves.last().map(|m| m.move_id.clone()),
            is_view_only: false,
            study,
        }
    }

    /// Tree address of the current move. Errors if the id dangles.
    pub fn current_position(&self) -> Result<Option<MovePosition>, StudyError> {
        match &self.current_move {
            None => Ok(None),
            Some(id) => tree::locate(&self.study.moves, id)
                .map(Some)
                .ok_or_else(|| StudyError::MoveNotFound(id.to_string())),
        }
    }

    pub fn current_node(&self) -> Option<&dyn StudyNode> {
        let pos = self.current_position().ok()??;
        tree::node(&self.study.moves, pos)
    }

    /// Position the board shows: after the current move, or the root.
    pub fn displayed_fen(&self) -> &str {
        match self.current_node() {
            Some(node) => &node.chess_move().after,
            None => &self.study.root_fen,
        }
    }

    pub fn displayed_shapes(&self) -> &[DrawShape] {
        match self.current_node() {
            Some(node) => node.shapes(),
            None => &[],
        }
    }

    fn set_current(&mut self, pos: MovePosition) -> Result<(), StudyError> {
        let node = tree::node(&self.study.moves, pos)
            .ok_or_else(|| StudyError::MoveNotFound(format!("{pos:?}")))?;
        self.current_move = Some(node.move_id().clone());
        Ok(())
    }

    fn refresh_view_only(&mut self) -> Result<(), StudyError> {
        self.is_view_only = match self.current_position()? {
            Some(pos) => !tree::is_last_in_line(&self.study.moves, pos),
            None => false,
        };
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Navigate(Direction),
    NavigateTo(MoveId),
    AddMove(ChessMove),
    RemoveLastMove,
    SyncShapes(Vec<DrawShape>),
    SyncComment(Option<JsonValue>),
}

impl Intent {
    fn name(&self) -> &'static str {
        match self {
            Intent::Navigate(_) => "navigate",
            Intent::NavigateTo(_) => "navigate_to",
            Intent::AddMove(_) => "add_move",
            Intent::RemoveLastMove => "remove_last_move",
            Intent::SyncShapes(_) => "sync_shapes",
            Intent::SyncComment(_) => "sync_comment",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The displayed move changed (or the tree grew/shrank under it).
    Moved,
    /// Only annotations of the current move changed.
    Annotated,
    /// Nothing changed.
    Ignored(&'static str),
}

#[derive(Debug, Clone)]
pub struct Reduced {
    pub state: GameState,
    /// Configuration to push to the board; `None` when the board is current.
    pub board: Option<BoardConfig>,
    pub outcome: Outcome,
}

pub fn reduce(state: &GameState, intent: Intent) -> Result<Reduced, StudyError> {
    let name = intent.name();
    let snap_back = matches!(intent, Intent::AddMove(_));
    let mut next = state.clone();

    let outcome = match intent {
        Intent::Navigate(direction) => navigate(&mut next, direction)?,
        Intent::NavigateTo(move_id) => navigate_to(&mut next, move_id)?,
        Intent::AddMove(mv) => add_move(&mut next, mv)?,
        Intent::RemoveLastMove => remove_last_move(&mut next)?,
        Intent::SyncShapes(shapes) => annotate(&mut next, |node| node.set_shapes(shapes))?,
        Intent::SyncComment(comment) => annotate(&mut next, |node| node.set_comment(comment))?,
    };

    let board = match &outcome {
        Outcome::Moved => {
            next.refresh_view_only()?;
            debug!(intent = name, current = ?next.current_move, view_only = next.is_view_only, "Intent applied");
            Some(BoardConfig::for_state(&next)?)
        }
        Outcome::Annotated => {
            debug!(intent = name, current = ?next.current_move, "Annotation updated");
            None
        }
        Outcome::Ignored(reason) => {
            debug!(intent = name, reason, "Intent ignored");
            // the widget already moved the piece; put it back
            snap_back.then(|| BoardConfig::for_state(state)).transpose()?
        }
    };

    let state = match outcome {
        Outcome::Ignored(_) => state.clone(),
        _ => next,
    };

    Ok(Reduced {
        state,
        board,
        outcome,
    })
}

fn navigate(state: &mut GameState, direction: Direction) -> Result<Outcome, StudyError> {
    let Some(pos) = state.current_position()? else {
        return Ok(Outcome::Ignored("no moves to navigate"));
    };

    let delta = match direction {
        Direction::Forward => 1,
        Direction::Backward => -1,
    };

    match tree::offset(&state.study.moves, pos, delta) {
        Some(target) => {
            state.set_current(target)?;
            Ok(Outcome::Moved)
        }
        None => Ok(Outcome::Ignored("already at the end of the line")),
    }
}

fn navigate_to(state: &mut GameState, move_id: MoveId) -> Result<Outcome, StudyError> {
    if state.current_move.as_ref() == Some(&move_id) {
        return Ok(Outcome::Ignored("move already displayed"));
    }

    let pos = tree::locate(&state.study.moves, &move_id)
        .ok_or_else(|| StudyError::MoveNotFound(move_id.to_string()))?;
    state.set_current(pos)?;
    Ok(Outcome::Moved)
}

fn add_move(state: &mut GameState, mv: ChessMove) -> Result<Outcome, StudyError> {
    let displayed = state.displayed_fen().to_string();
    if !rules::same_position(&mv.before, &displayed) {
        return Err(StudyError::PositionMismatch {
            expected: displayed,
            actual: mv.before,
        });
    }

    let current = state.current_position()?;
    let moves = &mut state.study.moves;

    let Some(pos) = current else {
        // board shows the root position
        return match moves.first() {
            None => {
                let fresh = StudyMove::new(mv);
                state.current_move = Some(fresh.move_id.clone());
                moves.push(fresh);
                Ok(Outcome::Moved)
            }
            Some(first) if first.mv.san == mv.san => {
                state.current_move = Some(first.move_id.clone());
                Ok(Outcome::Moved)
            }
            Some(_) => Ok(Outcome::Ignored("variants cannot branch off the root position")),
        };
    };

    if let Some(at) = pos.variant {
        let variant = tree::variant_mut(moves, at)
            .ok_or_else(|| StudyError::MoveNotFound(format!("{at:?}")))?;
        let next_index = pos.move_index + 1;

        if next_index == variant.moves.len() {
            let fresh = VariantMove::new(mv);
            state.current_move = Some(fresh.move_id.clone());
            variant.moves.push(fresh);
            return Ok(Outcome::Moved);
        }

        if variant.moves[next_index].mv.san == mv.san {
            state.current_move = Some(variant.moves[next_index].move_id.clone());
            return Ok(Outcome::Moved);
        }

        warn!(san = %mv.san, "Dropping move: variants nest only one level deep");
        return Ok(Outcome::Ignored("variants nest only one level deep"));
    }

    let index = pos.move_index;
    if index + 1 == moves.len() {
        // a removed continuation can leave variants behind the tip
        if let Some(variant_index) = tree::find_variant_by_first_san(&moves[index], &mv.san) {
            state.current_move = Some(moves[index].variants[variant_index].moves[0].move_id.clone());
            return Ok(Outcome::Moved);
        }
        let fresh = StudyMove::new(mv);
        state.current_move = Some(fresh.move_id.clone());
        moves.push(fresh);
        return Ok(Outcome::Moved);
    }

    if moves[index + 1].mv.san == mv.san {
        state.current_move = Some(moves[index + 1].move_id.clone());
        return Ok(Outcome::Moved);
    }

    let parent = &mut moves[index];
    match tree::find_variant_by_first_san(parent, &mv.san) {
        Some(variant_index) => {
            state.current_move = Some(parent.variants[variant_index].moves[0].move_id.clone());
        }
        None => {
            let fresh = VariantMove::new(mv);
            state.current_move = Some(fresh.move_id.clone());
            let variant = Variant::new(parent.move_id.clone(), fresh);
            debug!(variant = %variant.variant_id, parent = %parent.move_id, "Created variant");
            parent.variants.push(variant);
        }
    }
    Ok(Outcome::Moved)
}

fn remove_last_move(state: &mut GameState) -> Result<Outcome, StudyError> {
    let Some(pos) = state.current_position()? else {
        return Ok(Outcome::Ignored("nothing to remove"));
    };

    let moves = &mut state.study.moves;
    if !tree::is_last_in_line(moves, pos) {
        let id = state.current_move.as_ref().map(|id| id.to_string()).unwrap_or_default();
        warn!(move_id = %id, "Refusing to remove a move that is not the last of its line");
        return Err(StudyError::NotTerminal(id));
    }

    match pos.variant {
        Some(at) => {
            let parent = &mut moves[at.parent_move_index];
            let variant = &mut parent.variants[at.variant_index];
            variant.moves.pop();
            state.current_move = match variant.moves.last() {
                Some(last) => Some(last.move_id.clone()),
                None => {
                    let emptied = parent.variants.remove(at.variant_index);
                    debug!(variant = %emptied.variant_id, "Deleted empty variant");
                    Some(parent.move_id.clone())
                }
            };
        }
        None => {
            moves.pop();
            state.current_move = moves.last().map(|m| m.move_id.clone());
        }
    }

    Ok(Outcome::Moved)
}

fn annotate<F>(state: &mut GameState, apply: F) -> Result<Outcome, StudyError>
where
    F: FnOnce(&mut dyn StudyNode),
{
    let Some(pos) = state.current_position()? else {
        return Ok(Outcome::Ignored("no move selected"));
    };
    let node = tree::node_mut(&mut state.study.moves, pos)
        .ok_or_else(|| StudyError::MoveNotFound(format!("{pos:?}")))?;
    apply(node);
    Ok(Outcome::Annotated)
}
