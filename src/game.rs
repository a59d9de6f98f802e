//! Game layer for Bastion.
//!
//! Implements the rules of the board game:
//! - Board with terrain, ownership and occupants
//! - Players with castles and rosters
//! - Turn phases and per-turn resources
//! - Deployment, summoning, movement and combat
//! - Read-only views and intent translation for presentation

mod board;
mod catalog;
pub mod combat;
mod command;
mod events;
pub mod invariants;
mod player;
mod rules;
mod state;
mod turn;
mod unit;
pub mod view;

pub use board::{Board, Coord, Terrain, Tile};
pub use catalog::{Catalog, TemplateId, UnitTemplate};
pub use combat::StrikeResult;
pub use command::{advance_command, command_for_click, Command};
pub use events::GameEvent;
pub use player::{opponent_of, Player, PlayerId};
pub use state::GameState;
pub use turn::{Phase, TurnState};
pub use unit::Unit;
pub use view::{highlights, selection_view, unit_view, Highlights, UnitView};
