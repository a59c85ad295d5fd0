//! Replay determinism, rollback and the JSON wire format of whole logs.

mod common;

use common::*;
use rust_18xx::{Action, GameError};
use serde_json::Value;

#[test]
fn test_replay_is_deterministic() {
    let first = replay(opening());
    let second = replay(opening());
    assert_eq!(first.snapshot().unwrap(), second.snapshot().unwrap());
    assert_eq!(
        first.log().iter().collect::<Vec<_>>(),
        second.log().iter().collect::<Vec<_>>()
    );
}

#[test]
fn test_incremental_and_replayed_games_agree() {
    let mut game = new_game();
    for action in opening() {
        game.process_action(action).unwrap();
    }
    assert_eq!(game.snapshot().unwrap(), replay(opening()).snapshot().unwrap());
}

#[test]
fn test_log_survives_json_round_trip() {
    let game = replay(opening());
    let wire: Vec<Value> = game.actions().iter().map(Action::to_json).collect();
    let text = serde_json::to_string(&wire).unwrap();

    let parsed: Vec<Value> = serde_json::from_str(&text).unwrap();
    let mut fresh = new_game();
    for raw in &parsed {
        fresh.process_json(raw).unwrap();
    }
    assert_eq!(fresh.snapshot().unwrap(), game.snapshot().unwrap());
    assert_eq!(fresh.actions(), game.actions());
}

#[test]
fn test_rollback_undoes_last_action() {
    let all = opening();
    let game = replay(all.clone());
    let back = game.rollback().unwrap();
    let expected = replay(all[..all.len() - 1].to_vec());

    assert_eq!(back.actions().len(), all.len() - 1);
    assert_eq!(back.snapshot().unwrap(), expected.snapshot().unwrap());
    assert_eq!(back.current_entity_name(), Some("AR"));
}

#[test]
fn test_clone_with_prefix() {
    let game = replay(opening());
    let prefix = game.clone_with(game.actions().iter().take(7).cloned()).unwrap();
    assert_eq!(prefix.snapshot().unwrap(), replay(auction()).snapshot().unwrap());
    // The original is untouched.
    assert_eq!(game.actions().len(), opening().len());
}

#[test]
fn test_bad_log_reports_index() {
    let mut actions = auction();
    actions.push(buy_share("A", "AR_1"));
    let err = rust_18xx::GameBuilder::new(rust_18xx::games::g1889::config())
        .players(PLAYERS)
        .actions(actions)
        .build()
        .unwrap_err();
    match err {
        GameError::Replay { index, .. } => assert_eq!(index, 7),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_malformed_wire_action() {
    let mut game = new_game();
    let raw = serde_json::json!({"type": "buy_company", "entity": "A", "entity_type": "player"});
    assert!(matches!(game.process_json(&raw), Err(GameError::MalformedAction(_))));
    assert!(game.actions().is_empty());
}
