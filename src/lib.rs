// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Bastion: a deterministic two-player castle board game engine.
//!
//! Players take turns rolling for move points, claiming tiles and summoning
//! monsters onto them, then moving and fighting with those monsters. A unit
//! that ends a move next to the enemy castle damages it; the first castle to
//! fall loses.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   CLI (play / run / show / check)   │
//! ├──────────────────┬──────────────────┤
//! │  Match session   │  Opponent driver │
//! ├──────────────────┴──────────────────┤
//! │     Rules engine (game::*)          │
//! └─────────────────────────────────────┘
//! ```
//!
//! The rules engine never blocks, draws or sleeps. Every operation either
//! applies completely or is refused with a [`Rejection`] and changes nothing.

pub mod config;
pub mod error;
pub mod game;
pub mod opponent;
pub mod render;
pub mod session;
pub mod snapshot;

pub use config::{ConfigError, GameConfig, GameMode};
pub use error::{Rejection, RuleResult};

// Re-export key game types at crate root for convenience
pub use game::{Command, Coord, GameEvent, GameState, Phase, Player, PlayerId, Tile};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_reexports_play_a_turn() {
        let mut game = GameState::new(&GameConfig::default()).unwrap();
        game.apply(Command::Roll).unwrap();
        game.apply(Command::StartActionPhase).unwrap();
        game.apply(Command::EndTurn).unwrap();
        assert_eq!(game.current_player_id(), 2);
        assert_eq!(game.phase(), Phase::Roll);
        assert!(matches!(
            game.apply(Command::EndTurn),
            Err(Rejection::WrongPhase { .. })
        ));
    }
}
