//! Headless match runner.
//!
//! Provides a pure function interface: `config -> MatchResult`. Both seats
//! are played by the scripted opponent, one planned turn at a time, until a
//! castle falls or the turn cap is reached.
//!
//! # Determinism
//!
//! Given the same configuration, [`run_match`] always produces the same
//! [`MatchResult`].

use std::time::Instant;

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::config::{ConfigError, GameConfig};
use crate::error::Rejection;
use crate::game::{GameState, PlayerId};
use crate::opponent::{plan_turn, OpponentDriver};

/// Error type for match runs.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A seat is configured for a human player.
    #[error("player {0} is not scripted; headless matches need two scripted seats")]
    HumanSeat(PlayerId),
    /// The opponent issued a command the rules refused.
    #[error("opponent command rejected on turn {turn}: {rejection}")]
    Rejected {
        /// Turn number at the time.
        turn: u32,
        /// What the rules said.
        rejection: Rejection,
    },
}

/// Final standing of one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlayerSummary {
    /// Player identifier.
    pub player_id: PlayerId,
    /// Castle hp left.
    pub hp: u32,
    /// Units left on the board.
    pub units: usize,
}

/// Final result of a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    /// The winning player (None if the turn cap was hit).
    pub winner: Option<PlayerId>,
    /// Completed turns.
    pub turns_played: u32,
    /// Per-player standings.
    pub players: Vec<PlayerSummary>,
    /// Commands applied over the whole match.
    pub commands_applied: usize,
}

impl MatchResult {
    /// Whether the match ended on the turn cap.
    #[must_use]
    pub const fn is_draw(&self) -> bool {
        self.winner.is_none()
    }
}

/// Run a complete scripted match.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, either seat is human,
/// or the opponent issues a rejected command.
pub fn run_match(config: &GameConfig) -> Result<MatchResult, SessionError> {
    let runner = MatchRunner::new(config)?;
    let (result, _) = runner.run()?;
    Ok(result)
}

/// Run a complete scripted match and also return the final state.
///
/// # Errors
///
/// See [`run_match`].
pub fn run_match_with_state(config: &GameConfig) -> Result<(MatchResult, GameState), SessionError> {
    MatchRunner::new(config)?.run()
}

/// Orchestrates one headless match.
struct MatchRunner {
    /// Game state.
    state: GameState,
    /// Queue of planned commands.
    driver: OpponentDriver,
    /// Configuration.
    config: GameConfig,
    /// Commands applied so far.
    commands_applied: usize,
}

impl MatchRunner {
    fn new(config: &GameConfig) -> Result<Self, SessionError> {
        let state = GameState::new(config)?;
        if let Some(human) = state.players().iter().find(|p| !p.is_ai) {
            return Err(SessionError::HumanSeat(human.id));
        }
        Ok(Self {
            state,
            driver: OpponentDriver::new(config.opponent),
            config: config.clone(),
            commands_applied: 0,
        })
    }

    fn run(mut self) -> Result<(MatchResult, GameState), SessionError> {
        info!(
            width = self.config.board.width,
            height = self.config.board.height,
            max_turns = self.config.max_turns,
            "match started"
        );

        while !self.state.is_game_over() && self.state.turn_number() < self.config.max_turns {
            self.execute_turn()?;
        }

        let result = self.build_result();
        info!(
            winner = ?result.winner,
            turns = result.turns_played,
            commands = result.commands_applied,
            "match finished"
        );
        Ok((result, self.state))
    }

    fn execute_turn(&mut self) -> Result<(), SessionError> {
        let turn = self.state.turn_number();
        let rejected = |rejection| SessionError::Rejected { turn, rejection };

        let plan = plan_turn(&self.state, &self.config.opponent).map_err(rejected)?;
        self.driver.load(plan, Instant::now());
        self.commands_applied += self.driver.run_to_end(&mut self.state).map_err(rejected)?;
        // Nobody renders headless matches.
        drop(self.state.take_events());
        Ok(())
    }

    fn build_result(&self) -> MatchResult {
        let board = self.state.board();
        MatchResult {
            winner: self.state.winner(),
            turns_played: self.state.turn_number(),
            players: self
                .state
                .players()
                .iter()
                .map(|p| PlayerSummary {
                    player_id: p.id,
                    hp: p.hp,
                    units: board.count_units(p.id),
                })
                .collect(),
            commands_applied: self.commands_applied,
        }
    }
}
