//! Player intents and their translation into rules calls.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::RuleResult;
use crate::game::{Coord, GameState, Phase, TemplateId};

/// A discrete intent issued by a player, human or scripted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Roll for move points.
    Roll,
    /// Claim a tile.
    Deploy {
        /// Tile to claim.
        at: Coord,
    },
    /// Pick, re-pick or clear the template to summon.
    SelectTemplate {
        /// Template, or `None` to clear.
        template: Option<TemplateId>,
    },
    /// Summon a unit.
    Summon {
        /// Template to summon.
        template: TemplateId,
        /// Target tile.
        at: Coord,
    },
    /// Select a board unit, or clear the selection.
    Select {
        /// Tile to select, or `None` to clear.
        at: Option<Coord>,
    },
    /// Step a unit to a neighbouring tile.
    Move {
        /// Source tile coordinate.
        from: Coord,
        /// Destination tile coordinate.
        to: Coord,
    },
    /// Strike an adjacent enemy unit.
    Attack {
        /// Attacker's tile.
        from: Coord,
        /// Defender's tile.
        to: Coord,
    },
    /// Finish a unit for this action phase.
    Hold {
        /// Unit's tile.
        at: Coord,
    },
    /// Leave the build phase.
    StartActionPhase,
    /// Pass the turn.
    EndTurn,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Roll => f.write_str("roll"),
            Command::Deploy { at } => write!(f, "deploy {at}"),
            Command::SelectTemplate { template: Some(id) } => write!(f, "pick template {id}"),
            Command::SelectTemplate { template: None } => f.write_str("clear template"),
            Command::Summon { template, at } => write!(f, "summon {template} at {at}"),
            Command::Select { at: Some(at) } => write!(f, "select {at}"),
            Command::Select { at: None } => f.write_str("deselect"),
            Command::Move { from, to } => write!(f, "move {from} -> {to}"),
            Command::Attack { from, to } => write!(f, "attack {from} -> {to}"),
            Command::Hold { at } => write!(f, "hold {at}"),
            Command::StartActionPhase => f.write_str("start action phase"),
            Command::EndTurn => f.write_str("end turn"),
        }
    }
}

impl GameState {
    /// Apply one command through the matching rules operation.
    ///
    /// # Errors
    ///
    /// Returns the operation's rejection; the state is then unchanged.
    pub fn apply(&mut self, command: Command) -> RuleResult<()> {
        match command {
            Command::Roll => self.roll_dice().map(drop),
            Command::Deploy { at } => self.deploy_tile(at),
            Command::SelectTemplate { template } => self.select_template(template).map(drop),
            Command::Summon { template, at } => self.place_unit(template, at),
            Command::Select { at } => self.select_unit(at).map(drop),
            Command::Move { from, to } => self.move_unit(from, to),
            Command::Attack { from, to } => self.attack_unit(from, to).map(drop),
            Command::Hold { at } => self.hold_unit(at),
            Command::StartActionPhase => self.start_action_phase(),
            Command::EndTurn => self.end_turn(),
        }
    }
}

/// Translate a click on `at` into the command it means in the current
/// phase and selection.
///
/// In the build phase a click summons the picked template, or deploys when
/// none is picked. In the action phase it attacks or moves with the selected
/// unit when `at` is a valid target, and otherwise (re)selects.
#[must_use]
pub fn command_for_click(state: &GameState, at: Coord) -> Option<Command> {
    let turn = state.turn();
    match state.phase() {
        Phase::Build => Some(match turn.selected_template {
            Some(template) => Command::Summon { template, at },
            None => Command::Deploy { at },
        }),
        Phase::Action => {
            if let Some(from) = turn.selected_unit {
                if state.valid_attack_locations(from).contains(&at) {
                    return Some(Command::Attack { from, to: at });
                }
                if state.valid_movement_locations(from).contains(&at) {
                    return Some(Command::Move { from, to: at });
                }
            }
            Some(Command::Select { at: Some(at) })
        }
        Phase::Roll | Phase::GameOver => None,
    }
}

/// The command that advances the current phase, if any.
#[must_use]
pub const fn advance_command(phase: Phase) -> Option<Command> {
    match phase {
        Phase::Roll => Some(Command::Roll),
        Phase::Build => Some(Command::StartActionPhase),
        Phase::Action => Some(Command::EndTurn),
        Phase::GameOver => None,
    }
}
