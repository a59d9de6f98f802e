//! Transient feedback for the presentation layer.
//!
//! Events carry no state of their own: dropping them never changes the
//! outcome of a game. They exist so a renderer can show damage numbers,
//! knockouts and a running log without the rules calling into it.

use std::fmt;

use crate::game::{Coord, Phase, PlayerId, TemplateId};

/// Something worth showing that just happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// The game entered a new phase.
    PhaseStarted {
        /// Player whose turn it is.
        player: PlayerId,
        /// The new phase.
        phase: Phase,
        /// Move points available (non-zero only when entering the build phase).
        move_points: u32,
    },
    /// A tile was claimed by deployment.
    TileDeployed {
        /// Deploying player.
        player: PlayerId,
        /// Claimed tile.
        at: Coord,
    },
    /// A unit entered the board.
    UnitSummoned {
        /// Summoning player.
        player: PlayerId,
        /// Template summoned.
        template: TemplateId,
        /// Unit name.
        name: String,
        /// Summon tile.
        at: Coord,
    },
    /// A unit stepped to a neighbouring tile.
    UnitMoved {
        /// Origin tile.
        from: Coord,
        /// Destination tile.
        to: Coord,
    },
    /// A unit lost power but survived.
    Damage {
        /// Defender's tile.
        at: Coord,
        /// Power removed.
        amount: u32,
    },
    /// A unit was destroyed.
    KnockOut {
        /// Tile the unit was removed from.
        at: Coord,
        /// Name of the destroyed unit.
        name: String,
    },
    /// A castle took damage from an adjacent unit.
    CastleHit {
        /// Castle owner.
        player: PlayerId,
        /// Castle tile.
        at: Coord,
        /// Hit points left.
        remaining_hp: u32,
    },
    /// A player passed the turn.
    TurnEnded {
        /// Player who ended the turn.
        player: PlayerId,
    },
    /// A castle fell.
    GameOver {
        /// Player still standing.
        winner: Option<PlayerId>,
    },
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameEvent::PhaseStarted {
                player,
                phase: Phase::Build,
                move_points,
            } => write!(f, "P{player}: build phase, {move_points} move points"),
            GameEvent::PhaseStarted { player, phase, .. } => {
                write!(f, "P{player}: {} phase", phase.label())
            }
            GameEvent::TileDeployed { player, at } => write!(f, "P{player} deploys {at}"),
            GameEvent::UnitSummoned {
                player, name, at, ..
            } => write!(f, "P{player} summons {name} at {at}"),
            GameEvent::UnitMoved { from, to } => write!(f, "unit moves {from} -> {to}"),
            GameEvent::Damage { at, amount } => write!(f, "-{amount} POW at {at}"),
            GameEvent::KnockOut { at, name } => write!(f, "KO! {name} at {at}"),
            GameEvent::CastleHit {
                player,
                remaining_hp,
                ..
            } => write!(f, "castle P{player} hit, {remaining_hp} hp left"),
            GameEvent::TurnEnded { player } => write!(f, "P{player} ends the turn"),
            GameEvent::GameOver { winner: Some(p) } => write!(f, "game over, player {p} wins"),
            GameEvent::GameOver { winner: None } => write!(f, "game over, draw"),
        }
    }
}
