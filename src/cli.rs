//! CLI command implementations for Bastion.

pub(crate) mod play;
pub(crate) mod run;
pub(crate) mod show;
pub(crate) mod validate;

mod output;

use bastion::config::{ConfigError, GameConfig, GameMode};
use bastion::session::SessionError;
use bastion::snapshot::SnapshotError;
use bastion::Rejection;
use clap::ValueEnum;
use std::error::Error;
use std::fmt;
use std::path::Path;

/// Output format for the `run` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Seat assignment for the `play` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ModeArg {
    /// You against the scripted opponent.
    Pvai,
    /// Two humans at one keyboard.
    Pvp,
    /// Watch two scripted opponents.
    Aivai,
}

impl From<ModeArg> for GameMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Pvai => GameMode::HumanVsAi,
            ModeArg::Pvp => GameMode::HumanVsHuman,
            ModeArg::Aivai => GameMode::AiVsAi,
        }
    }
}

/// Load a config file, or the defaults when no file is given.
fn load_config(path: Option<&Path>) -> Result<GameConfig, CliError> {
    match path {
        Some(path) => Ok(GameConfig::load(path)?),
        None => Ok(GameConfig::default()),
    }
}

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::new(format!("config: {e}"))
    }
}

impl From<SessionError> for CliError {
    fn from(e: SessionError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<SnapshotError> for CliError {
    fn from(e: SnapshotError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<Rejection> for CliError {
    fn from(e: Rejection) -> Self {
        Self::new(format!("rejected: {e}"))
    }
}
