//! Scripted opponent.
//!
//! Planning is a pure function of the game state: [`plan_turn`] returns the
//! commands for one turn without touching the live game. The
//! [`OpponentDriver`] then replays them at presentation pace, or all at once
//! for headless play.

mod driver;
mod pathfind;
mod planner;

pub use driver::OpponentDriver;
pub use pathfind::DistanceField;
pub use planner::{plan_turn, TurnPlan};
