//! Interactive study session: text commands in, reducer intents out.

use std::fmt::Write;

use study_core::board::{BoardColor, BoardSync, MoveEvent};
use study_core::config::Settings;
use study_core::model::{DrawShape, MoveId, StudyFile};
use study_core::notation;
use study_core::reducer::{self, Direction, GameState, Intent, Outcome};

use crate::error::AppError;
use crate::store::StudyStore;

pub const HELP: &str = "\
move <from> <to> [piece]   play a move, e.g. `move e7 e8 n`
back | forward             step along the current line
goto <move id>             jump to a move
undo                       remove the current move (last of its line only)
comment [text]             set or clear the comment of the current move
arrow <from> <to> [brush]  draw an arrow
circle <square> [brush]    draw a circle
clear                      remove drawn shapes
board | list | fen | pgn   show the study
widget                     board widget configuration as JSON
save                       write the study now
quit";

const DEFAULT_BRUSH: &str = "green";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Move(MoveEvent),
    Back,
    Forward,
    Goto(MoveId),
    Undo,
    Comment(Option<String>),
    Arrow { orig: String, dest: String, brush: String },
    Circle { square: String, brush: String },
    Clear,
    Board,
    List,
    Fen,
    Pgn,
    Widget,
    Save,
    Help,
}

fn square(token: &str) -> Result<String, AppError> {
    let bytes = token.as_bytes();
    let valid = bytes.len() == 2 && (b'a'..=b'h').contains(&bytes[0]) && (b'1'..=b'8').contains(&bytes[1]);
    if valid {
        Ok(token.to_string())
    } else {
        Err(AppError::BadRequest(format!("'{token}' is not a square")))
    }
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, AppError> {
        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let args: Vec<&str> = rest.split_whitespace().collect();

        let command = match (word.to_lowercase().as_str(), args.as_slice()) {
            ("move" | "m", [uci]) if uci.len() >= 4 && uci.is_ascii() => {
                let mut event = MoveEvent::new(&square(&uci[0..2])?, &square(&uci[2..4])?);
                event.promotion = uci[4..].chars().next();
                Command::Move(event)
            }
            ("move" | "m", [orig, dest]) => Command::Move(MoveEvent::new(&square(orig)?, &square(dest)?)),
            ("move" | "m", [orig, dest, piece]) => {
                let mut event = MoveEvent::new(&square(orig)?, &square(dest)?);
                event.promotion = piece.chars().next();
                Command::Move(event)
            }
            ("back" | "b", []) => Command::Back,
            ("forward" | "f", []) => Command::Forward,
            ("goto", [id]) => Command::Goto(MoveId::from(*id)),
            ("undo", []) => Command::Undo,
            ("comment", []) => Command::Comment(None),
            ("comment", _) => Command::Comment(Some(rest.trim().to_string())),
            ("arrow", [orig, dest]) => Command::Arrow {
                orig: square(orig)?,
                dest: square(dest)?,
                brush: DEFAULT_BRUSH.to_string(),
            },
            ("arrow", [orig, dest, brush]) => Command::Arrow {
                orig: square(orig)?,
                dest: square(dest)?,
                brush: brush.to_string(),
            },
            ("circle", [sq]) => Command::Circle {
                square: square(sq)?,
                brush: DEFAULT_BRUSH.to_string(),
            },
            ("circle", [sq, brush]) => Command::Circle {
                square: square(sq)?,
                brush: brush.to_string(),
            },
            ("clear", []) => Command::Clear,
            ("board", []) => Command::Board,
            ("list", []) => Command::List,
            ("fen", []) => Command::Fen,
            ("pgn", []) => Command::Pgn,
            ("widget", []) => Command::Widget,
            ("save", []) => Command::Save,
            ("help" | "?", _) => Command::Help,
            _ => return Err(AppError::BadRequest(format!("Unknown command '{line}'. Type `help`."))),
        };
        Ok(command)
    }
}

/// Draws the position from `fen` as text, seen from `orientation`.
pub fn render_board(fen: &str, orientation: BoardColor) -> String {
    let placement = fen.split_whitespace().next().unwrap_or_default();
    let mut rows: Vec<Vec<char>> = placement
        .split('/')
        .map(|rank| {
            rank.chars()
                .flat_map(|c| match c.to_digit(10) {
                    Some(n) => vec!['.'; n as usize],
                    None => vec![c],
                })
                .collect()
        })
        .collect();
    let mut files: Vec<char> = ('a'..='h').collect();
    let mut ranks: Vec<u32> = (1..=8).rev().collect();

    if orientation == BoardColor::Black {
        rows.reverse();
        rows.iter_mut().for_each(|row| row.reverse());
        files.reverse();
        ranks.reverse();
    }

    let mut out = String::new();
    for (rank, row) in ranks.iter().zip(&rows) {
        let squares: Vec<String> = row.iter().map(char::to_string).collect();
        let _ = writeln!(out, "{rank} {}", squares.join(" "));
    }
    let files: Vec<String> = files.iter().map(char::to_string).collect();
    let _ = write!(out, "  {}", files.join(" "));
    out
}

pub struct Session {
    id: String,
    state: GameState,
    sync: BoardSync,
    settings: Settings,
}

impl Session {
    pub fn new(id: &str, study: StudyFile, settings: Settings) -> Result<Self, AppError> {
        let state = GameState::new(study);
        let sync = BoardSync::new(&state)?;
        Ok(Self {
            id: id.to_string(),
            state,
            sync,
            settings,
        })
    }

    pub async fn open(store: &StudyStore, id: &str, settings: Settings) -> Result<Self, AppError> {
        let study = store.load(id).await?;
        tracing::info!(id, moves = study.moves.len(), "Opened study");
        Self::new(id, study, settings)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Runs one intent through the reducer. Returns whether the stored
    /// study changed.
    pub fn apply(&mut self, intent: Intent) -> Result<bool, AppError> {
        let reduced = reducer::reduce(&self.state, intent)?;
        if let Some(config) = reduced.board {
            self.sync.show(config)?;
        }
        let changed = reduced.state.study != self.state.study;
        self.state = reduced.state;
        if let Outcome::Ignored(reason) = reduced.outcome {
            return Err(AppError::BadRequest(format!("Nothing to do: {reason}")));
        }
        Ok(changed)
    }

    fn current_shapes(&self) -> Vec<DrawShape> {
        self.state.displayed_shapes().to_vec()
    }

    fn status_line(&self) -> String {
        let config = self.sync.config();
        let mut line = format!("{} to move", config.turn_color);
        if config.check {
            line.push_str(", check");
        }
        if self.state.is_view_only {
            line.push_str(" (not at the end of the line)");
        }
        line
    }

    pub fn board_text(&self) -> String {
        let mut out = render_board(&self.sync.config().fen, self.settings.board_orientation);
        let _ = write!(out, "\n{}", self.status_line());
        let shapes = self.current_shapes();
        if !shapes.is_empty() {
            let drawn: Vec<String> = shapes
                .iter()
                .map(|s| match &s.dest {
                    Some(dest) => format!("{}->{}", s.orig, dest),
                    None => format!("({})", s.orig),
                })
                .collect();
            let _ = write!(out, "\nshapes: {}", drawn.join(" "));
        }
        out
    }

    fn list_text(&self) -> Result<String, AppError> {
        let list = notation::move_list_text(
            &self.state.study,
            self.state.current_move.as_ref(),
            self.settings.view_comments,
        )?;
        Ok(if list.is_empty() { "(no moves yet)".to_string() } else { list })
    }

    /// Executes a command. Changes to the study are saved immediately.
    pub async fn run(&mut self, command: Command, store: &StudyStore) -> Result<String, AppError> {
        let intent = match command {
            Command::Move(event) => self.sync.on_move(&event)?,
            Command::Back => Intent::Navigate(Direction::Backward),
            Command::Forward => Intent::Navigate(Direction::Forward),
            Command::Goto(id) => Intent::NavigateTo(id),
            Command::Undo => Intent::RemoveLastMove,
            Command::Comment(text) => Intent::SyncComment(text.map(|t| notation::comment_document(&t))),
            Command::Arrow { orig, dest, brush } => {
                let mut shapes = self.current_shapes();
                shapes.push(DrawShape::arrow(&orig, &dest, &brush));
                self.sync.on_shapes(shapes)
            }
            Command::Circle { square, brush } => {
                let mut shapes = self.current_shapes();
                shapes.push(DrawShape::circle(&square, &brush));
                self.sync.on_shapes(shapes)
            }
            Command::Clear => self.sync.on_shapes(Vec::new()),
            Command::Board => return Ok(self.board_text()),
            Command::List => return self.list_text(),
            Command::Fen => return Ok(self.sync.config().fen.clone()),
            Command::Pgn => return Ok(notation::to_pgn(&self.state.study)),
            Command::Widget => {
                return serde_json::to_string_pretty(self.sync.config())
                    .map_err(|e| AppError::Study(e.into()));
            }
            Command::Save => {
                store.save(&self.state.study, Some(&self.id)).await?;
                return Ok(format!("Saved {}", self.id));
            }
            Command::Help => return Ok(HELP.to_string()),
        };

        if self.apply(intent)? {
            store.save(&self.state.study, Some(&self.id)).await?;
        }
        Ok(self.board_text())
    }
}
