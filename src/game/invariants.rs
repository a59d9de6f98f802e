//! Game invariants - sanity checks that detect bugs.
//!
//! The rules engine should never produce a state that fails these. They run
//! after every command the opponent planner and the match runner apply.

use crate::game::{GameState, Phase};

/// Invariant violation error.
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

fn violation(message: String) -> InvariantViolation {
    InvariantViolation { message }
}

/// Check all game invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants(state: &GameState) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let board = state.board();

    // Castle tiles stay claimed by their owner.
    for player in state.players() {
        match board.get(player.castle) {
            Some(tile) if tile.unfolded && tile.owner == Some(player.id) => {}
            Some(_) => violations.push(violation(format!(
                "castle tile {} not claimed by player {}",
                player.castle, player.id
            ))),
            None => violations.push(violation(format!(
                "castle of player {} outside the board at {}",
                player.id, player.castle
            ))),
        }
    }

    for (coord, tile) in board.iter() {
        let Some(unit) = tile.unit() else {
            continue;
        };
        if !tile.unfolded || tile.owner.is_none() {
            violations.push(violation(format!("unit at {coord} on an unclaimed tile")));
        }
        if unit.power == 0 || unit.power > unit.base_power {
            violations.push(violation(format!(
                "unit at {coord} has power {} (base {})",
                unit.power, unit.base_power
            )));
        }
    }

    let max = state.rules().max_units_per_player;
    for player in state.players() {
        let count = board.count_units(player.id);
        if count > max {
            violations.push(violation(format!(
                "player {} fields {count} units, limit {max}",
                player.id
            )));
        }
    }

    // Action tracking only exists for the acting player's units.
    let current = state.current_player_id();
    for (coord, _) in state.turn().pa_entries() {
        if state.phase() != Phase::Action {
            violations.push(violation(format!(
                "action points tracked at {coord} during {}",
                state.phase()
            )));
        } else if !board.get(coord).is_some_and(|t| t.owner == Some(current) && t.unit().is_some()) {
            violations.push(violation(format!(
                "action points tracked at {coord} without a unit of player {current}"
            )));
        }
    }

    let fallen = state.players().iter().any(|p| p.is_defeated());
    if fallen != state.is_game_over() {
        violations.push(violation(format!(
            "phase {} inconsistent with castle hp {:?}",
            state.phase(),
            state.players().iter().map(|p| p.hp).collect::<Vec<_>>()
        )));
    }

    violations
}

/// Assert all game invariants hold, panicking if any are violated.
///
/// Only active in debug builds. No-op in release builds.
///
/// # Panics
///
/// Panics with detailed message if any invariant is violated.
#[cfg(debug_assertions)]
pub fn assert_invariants(state: &GameState) {
    let violations = check_invariants(state);
    if !violations.is_empty() {
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        panic!("Game invariant violations:\n  - {}", messages.join("\n  - "));
    }
}

/// No-op in release builds.
#[cfg(not(debug_assertions))]
pub fn assert_invariants(_state: &GameState) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::game::{Coord, Unit};

    fn create_valid_game() -> GameState {
        GameState::new(&GameConfig::default()).unwrap()
    }

    fn put_unit(game: &mut GameState, player: u8, at: Coord) {
        let unit = Unit::from_template(game.catalog().get(1).unwrap());
        let tile = game.board_mut().get_mut(at).unwrap();
        tile.claim(player);
        tile.content = Some(unit);
    }

    #[test]
    fn test_valid_game_passes() {
        let mut game = create_valid_game();
        assert!(check_invariants(&game).is_empty());
        put_unit(&mut game, 1, Coord::new(4, 7));
        game.roll_dice().unwrap();
        game.start_action_phase().unwrap();
        assert!(check_invariants(&game).is_empty());
    }

    #[test]
    fn test_unit_on_unclaimed_tile_detected() {
        let mut game = create_valid_game();
        put_unit(&mut game, 1, Coord::new(2, 2));
        let tile = game.board_mut().get_mut(Coord::new(2, 2)).unwrap();
        tile.owner = None;
        let violations = check_invariants(&game);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("unclaimed"));
    }

    #[test]
    fn test_overpowered_unit_detected() {
        let mut game = create_valid_game();
        put_unit(&mut game, 2, Coord::new(2, 2));
        let tile = game.board_mut().get_mut(Coord::new(2, 2)).unwrap();
        tile.unit_mut().unwrap().power = 99;
        assert_eq!(check_invariants(&game).len(), 1);
    }

    #[test]
    fn test_captured_castle_detected() {
        let mut game = create_valid_game();
        game.board_mut().get_mut(Coord::new(4, 0)).unwrap().owner = Some(1);
        let violations = check_invariants(&game);
        assert!(violations.iter().any(|v| v.message.contains("not claimed by player 2")));
    }

    #[test]
    fn test_unit_limit_detected() {
        let mut game = create_valid_game();
        for x in 0..6 {
            put_unit(&mut game, 2, Coord::new(x, 1));
        }
        let violations = check_invariants(&game);
        assert!(violations.iter().any(|v| v.message.contains("6 units")));
    }

    #[test]
    fn test_dead_castle_without_game_over_detected() {
        let mut game = create_valid_game();
        game.player_mut(2).unwrap().hp = 0;
        assert_eq!(check_invariants(&game).len(), 1);
    }

    #[test]
    fn test_multiple_violations_all_reported() {
        let mut game = create_valid_game();
        game.player_mut(1).unwrap().hp = 0;
        put_unit(&mut game, 1, Coord::new(3, 3));
        game.board_mut()
            .get_mut(Coord::new(3, 3))
            .unwrap()
            .unit_mut()
            .unwrap()
            .power = 0;
        assert_eq!(check_invariants(&game).len(), 2);
    }

    #[test]
    #[should_panic(expected = "Game invariant violations")]
    #[cfg(debug_assertions)]
    fn test_assert_invariants_panics() {
        let mut game = create_valid_game();
        game.player_mut(2).unwrap().hp = 0;
        assert_invariants(&game);
    }
}
