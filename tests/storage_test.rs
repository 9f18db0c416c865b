//! Integration tests: studies on disk.

mod common;

use common::play_all;
use study::error::AppError;
use study::session::{Command, Session};
use study::store::StudyStore;
use study_core::config::Settings;
use study_core::import::import_study;
use study_core::model::{StudyFile, CURRENT_STORAGE_VERSION, STANDARD_START_FEN};
use study_core::reducer::GameState;
use study_core::serializer;

#[test]
fn test_missing_root_fen_defaults_to_start() {
    let study = serializer::from_json(r#"{"version": "0.0.1", "header": {"title": "Old"}, "moves": []}"#).unwrap();
    assert_eq!(study.root_fen, STANDARD_START_FEN);
    assert_eq!(study.header.title.as_deref(), Some("Old"));
    assert_eq!(study.version, CURRENT_STORAGE_VERSION);
}

#[test]
fn test_serialized_study_round_trips() {
    let state = play_all(GameState::new(StudyFile::default()), &["e2e4", "e7e5", "g1f3"]);
    let state = common::back(&common::back(&state));
    let state = play_all(state, &["c7c5", "g1f3"]);

    let json = serializer::to_json(&state.study).unwrap();
    assert_eq!(serializer::from_json(&json).unwrap(), state.study);

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["moves"][0]["variants"][0]["moves"][1]["san"], "Nf3");
    assert_eq!(value["moves"][0]["color"], "w");
    assert_eq!(value["rootFEN"], STANDARD_START_FEN);
}

#[test]
fn test_bad_pgn_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = StudyStore::new(dir.path().join("studies"));

    let err = import_study("1. e4 e5 2. Qxf7").map_err(AppError::from).unwrap_err();
    assert!(err.notice().contains("Qxf7"));
    assert!(!store.root().exists());
}

#[tokio::test]
async fn test_unknown_study_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = StudyStore::new(dir.path());
    let err = Session::open(&store, "missing", Settings::default()).await.err().unwrap();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_session_edits_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let store = StudyStore::new(dir.path());
    let study = import_study("[Event \"Italian\"]\n1. e4 e5 2. Nf3 Nc6 3. Bc4").unwrap();
    let id = store.save(&study, None).await.unwrap();

    let mut session = Session::open(&store, &id, Settings::default()).await.unwrap();
    for line in ["back", "move f1 b5", "comment The Spanish"] {
        session.run(Command::parse(line).unwrap(), &store).await.unwrap();
    }

    let reopened = Session::open(&store, &id, Settings::default()).await.unwrap();
    let study = &reopened.state().study;
    assert_eq!(study.header.title.as_deref(), Some("Italian"));
    assert_eq!(study.moves.len(), 5);
    let variant = &study.moves[3].variants[0];
    assert_eq!(variant.moves[0].mv.san, "Bb5");
    assert!(variant.moves[0].comment.is_some());

    let pgn = study_core::notation::to_pgn(study);
    assert!(pgn.contains("3. Bc4 (3. Bb5 {The Spanish})"));
}
