//! Multi-turn integration tests for scripted matches.
//!
//! These tests verify that AI-vs-AI matches terminate, are reproducible, and
//! that a snapshot taken mid-match continues exactly like the original game.
//!
//! Run with: cargo test --release match_integration

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use bastion::config::{GameConfig, GameMode, OpponentConfig};
use bastion::game::invariants::check_invariants;
use bastion::game::GameState;
use bastion::opponent::plan_turn;
use bastion::session::{run_match, run_match_with_state, SessionError};
use bastion::snapshot;

fn ai_config() -> GameConfig {
    let mut config = GameConfig::default();
    config.apply_mode(GameMode::AiVsAi);
    config
}

/// Play `turns` planned turns on `game`, or until it ends.
fn play_turns(game: &mut GameState, turns: u32) {
    let opponent = OpponentConfig::default();
    for _ in 0..turns {
        if game.is_game_over() {
            return;
        }
        for command in plan_turn(game, &opponent).unwrap() {
            game.apply(command).unwrap();
        }
        assert!(check_invariants(game).is_empty());
    }
}

#[test]
fn test_default_match_terminates() {
    let config = ai_config();
    let (result, state) = run_match_with_state(&config).unwrap();

    assert!(result.turns_played <= config.max_turns);
    assert!(result.is_draw() || state.is_game_over());
    assert!(check_invariants(&state).is_empty());
    for player in &result.players {
        assert!(player.units <= config.rules.max_units_per_player);
    }
}

#[test]
fn test_large_board_match_terminates() {
    let mut config = ai_config();
    config.board.width = 13;
    config.board.height = 13;
    config.max_turns = 400;

    let result = run_match(&config).unwrap();
    assert!(result.turns_played <= 400);
    if let Some(winner) = result.winner {
        let loser = result.players.iter().find(|p| p.player_id != winner).unwrap();
        assert_eq!(loser.hp, 0);
    }
}

#[test]
fn test_matches_are_deterministic() {
    let mut config = ai_config();
    config.opponent.deploy_when_idle = true;
    let first = run_match(&config).unwrap();
    for _ in 0..3 {
        assert_eq!(run_match(&config).unwrap(), first);
    }
}

#[test]
fn test_human_seat_is_refused() {
    let config = GameConfig::default();
    assert!(matches!(run_match(&config), Err(SessionError::HumanSeat(1))));
}

#[test]
fn test_snapshot_resumes_identically() {
    let config = ai_config();
    let mut original = GameState::new(&config).unwrap();
    play_turns(&mut original, 6);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("midgame.json");
    snapshot::save(&original, &path).unwrap();
    let mut restored = snapshot::load(&path).unwrap();

    assert_eq!(restored.turn_number(), original.turn_number());
    play_turns(&mut original, 10);
    play_turns(&mut restored, 10);

    assert_eq!(restored.board(), original.board());
    assert_eq!(restored.players(), original.players());
    assert_eq!(restored.phase(), original.phase());
    assert_eq!(restored.turn_number(), original.turn_number());
}

#[test]
fn test_snapshot_mid_turn() {
    let config = ai_config();
    let mut game = GameState::new(&config).unwrap();
    play_turns(&mut game, 2);

    // Stop half way through a planned turn.
    let plan = plan_turn(&game, &OpponentConfig::default()).unwrap();
    let half = plan.len() / 2;
    for command in plan.commands.iter().take(half) {
        game.apply(*command).unwrap();
    }

    let json = snapshot::to_json(&game).unwrap();
    let mut restored = snapshot::from_json(&json).unwrap();
    assert_eq!(restored.turn(), game.turn());

    // The planner picks up from whatever phase it finds.
    play_turns(&mut game, 1);
    play_turns(&mut restored, 1);
    assert_eq!(restored.board(), game.board());
    assert_eq!(restored.current_player_id(), game.current_player_id());
}
