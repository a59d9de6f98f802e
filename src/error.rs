//! Rejection reasons for rules-engine operations.
//!
//! Every mutating operation either applies completely or returns one of
//! these without touching state. A rejection is routine input (an illegal
//! click, a stale plan), not a fault.

use thiserror::Error;

use crate::game::{Coord, Phase, TemplateId};

/// Why an operation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    /// The game has already ended.
    #[error("game already over")]
    GameOver,
    /// The operation belongs to a different phase.
    #[error("not allowed in {actual} (requires {expected})")]
    WrongPhase {
        /// Phase the operation requires.
        expected: Phase,
        /// Phase the game is in.
        actual: Phase,
    },
    /// The coordinate lies outside the board.
    #[error("{0} is outside the board")]
    OutOfBounds(Coord),
    /// The tile is not an unclaimed neighbour of the player's territory.
    #[error("{0} cannot be deployed")]
    NotDeployable(Coord),
    /// No move points left this build phase.
    #[error("no move points left")]
    NoMovePoints,
    /// The player already fields the maximum number of units.
    #[error("unit limit of {max} reached")]
    UnitLimit {
        /// Configured unit cap.
        max: usize,
    },
    /// The catalog has no such template.
    #[error("unknown unit template {0}")]
    UnknownTemplate(TemplateId),
    /// The template is not in the current player's roster.
    #[error("unit template {0} is not in the roster")]
    NotInRoster(TemplateId),
    /// Something already stands on the tile.
    #[error("{0} is occupied")]
    Occupied(Coord),
    /// The tile is not owned by the current player or cannot hold a unit.
    #[error("cannot summon at {0}")]
    NotSummonable(Coord),
    /// No unit stands on the tile.
    #[error("no unit at {0}")]
    NoUnit(Coord),
    /// The unit belongs to the other player.
    #[error("unit at {0} belongs to the opponent")]
    NotYourUnit(Coord),
    /// The unit has no action points left this phase.
    #[error("unit at {0} has already acted")]
    Exhausted(Coord),
    /// The destination is not a legal move.
    #[error("cannot move from {from} to {to}")]
    InvalidMove {
        /// Moving unit's tile.
        from: Coord,
        /// Requested destination.
        to: Coord,
    },
    /// The defender is not a legal attack target.
    #[error("{from} cannot attack {to}")]
    InvalidTarget {
        /// Attacking unit's tile.
        from: Coord,
        /// Requested target.
        to: Coord,
    },
}

/// Result type for rules-engine operations.
pub type RuleResult<T> = Result<T, Rejection>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_display() {
        let err = Rejection::WrongPhase {
            expected: Phase::Build,
            actual: Phase::Action,
        };
        assert_eq!(err.to_string(), "not allowed in ACTION_PHASE (requires BUILD_PHASE)");

        let err = Rejection::InvalidMove {
            from: Coord::new(1, 2),
            to: Coord::new(3, 4),
        };
        assert_eq!(err.to_string(), "cannot move from (1, 2) to (3, 4)");
    }
}
