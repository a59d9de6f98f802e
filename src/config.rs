//! Game configuration.
//!
//! Every field has a default, so an empty TOML file describes the standard
//! 9x9 game. CLI flags override values after loading.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::{Catalog, Coord, Player, PlayerId, TemplateId, UnitTemplate};

/// Smallest supported board side.
pub const MIN_BOARD_SIDE: u16 = 3;
/// Largest supported board side.
pub const MAX_BOARD_SIDE: u16 = 64;

/// Error loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML for this schema.
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value is out of range or inconsistent.
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// Offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl ConfigError {
    /// Build an [`ConfigError::Invalid`].
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Who sits in each seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameMode {
    /// Player 1 is human, player 2 is scripted.
    #[default]
    HumanVsAi,
    /// Both seats are human.
    HumanVsHuman,
    /// Both seats are scripted.
    AiVsAi,
}

impl GameMode {
    /// Whether the seat of `player` is scripted in this mode.
    #[must_use]
    pub const fn is_ai(self, player: PlayerId) -> bool {
        match self {
            GameMode::HumanVsAi => player == 2,
            GameMode::HumanVsHuman => false,
            GameMode::AiVsAi => true,
        }
    }
}

/// Board dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Width in tiles.
    pub width: u16,
    /// Height in tiles.
    pub height: u16,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: 9,
            height: 9,
        }
    }
}

/// Numeric rules carried by every game state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Castle health at game start.
    pub starting_hp: u32,
    /// Move points granted by each roll.
    pub move_points_per_roll: u32,
    /// Cap on units a player may have on the board.
    pub max_units_per_player: usize,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            starting_hp: 3,
            move_points_per_roll: 3,
            max_units_per_player: 5,
        }
    }
}

/// Scripted opponent behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpponentConfig {
    /// Pause between opponent actions, for presentation.
    pub action_delay_ms: u64,
    /// Spend leftover move points on deployment once nothing can be summoned.
    pub deploy_when_idle: bool,
}

impl Default for OpponentConfig {
    fn default() -> Self {
        Self {
            action_delay_ms: 500,
            deploy_when_idle: false,
        }
    }
}

impl OpponentConfig {
    /// Pause between opponent actions.
    #[must_use]
    pub const fn action_delay(&self) -> Duration {
        Duration::from_millis(self.action_delay_ms)
    }
}

/// One seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Castle position. Defaults to the centre of the player's home edge.
    #[serde(default)]
    pub castle: Option<Coord>,
    /// Templates this player may summon.
    pub roster: Vec<TemplateId>,
    /// Whether the scripted opponent plays this seat.
    #[serde(default)]
    pub ai: bool,
}

/// Full game configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Board dimensions.
    pub board: BoardConfig,
    /// Numeric rules.
    pub rules: RulesConfig,
    /// Scripted opponent behaviour.
    pub opponent: OpponentConfig,
    /// Exactly two seats; player 1 first.
    pub players: Vec<PlayerConfig>,
    /// Catalog override. Empty means the built-in catalog.
    pub monsters: Vec<UnitTemplate>,
    /// Turn cap for headless matches.
    pub max_turns: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board: BoardConfig::default(),
            rules: RulesConfig::default(),
            opponent: OpponentConfig::default(),
            players: vec![
                PlayerConfig {
                    castle: None,
                    roster: vec![1, 2, 3],
                    ai: false,
                },
                PlayerConfig {
                    castle: None,
                    roster: vec![4, 5, 6],
                    ai: false,
                },
            ],
            monsters: Vec::new(),
            max_turns: 200,
        }
    }
}

impl GameConfig {
    /// Parse a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for this schema.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load and validate a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Assign seats to humans or the scripted opponent.
    pub fn apply_mode(&mut self, mode: GameMode) {
        for (idx, seat) in self.players.iter_mut().enumerate() {
            seat.ai = mode.is_ai(seat_id(idx));
        }
    }

    /// Check every value for range and consistency.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (w, h) = (self.board.width, self.board.height);
        let side = MIN_BOARD_SIDE..=MAX_BOARD_SIDE;
        if !side.contains(&w) || !side.contains(&h) {
            return Err(ConfigError::invalid(
                "board",
                format!("{w}x{h} outside {MIN_BOARD_SIDE}..={MAX_BOARD_SIDE}"),
            ));
        }

        if self.rules.starting_hp == 0 {
            return Err(ConfigError::invalid("rules.starting_hp", "must be positive"));
        }
        if self.rules.max_units_per_player == 0 {
            return Err(ConfigError::invalid(
                "rules.max_units_per_player",
                "must be positive",
            ));
        }
        if self.max_turns == 0 {
            return Err(ConfigError::invalid("max_turns", "must be positive"));
        }

        let catalog = self.catalog();
        if catalog.is_empty() {
            return Err(ConfigError::invalid("monsters", "catalog is empty"));
        }
        if let Some(t) = catalog.iter().find(|t| t.base_power == 0 || t.action_points == 0) {
            return Err(ConfigError::invalid(
                "monsters",
                format!("template {} needs positive power and action points", t.id),
            ));
        }

        if self.players.len() != 2 {
            return Err(ConfigError::invalid(
                "players",
                format!("expected 2 seats, got {}", self.players.len()),
            ));
        }
        let castles: Vec<Coord> = (0..2).map(|idx| self.castle_of(idx)).collect();
        for (idx, castle) in castles.iter().enumerate() {
            if castle.x >= w || castle.y >= h {
                return Err(ConfigError::invalid(
                    "players.castle",
                    format!("player {} castle {castle} outside the board", seat_id(idx)),
                ));
            }
        }
        if castles[0] == castles[1] {
            return Err(ConfigError::invalid("players.castle", "castles coincide"));
        }
        for (idx, seat) in self.players.iter().enumerate() {
            if seat.roster.is_empty() {
                return Err(ConfigError::invalid(
                    "players.roster",
                    format!("player {} has an empty roster", seat_id(idx)),
                ));
            }
            if let Some(id) = seat.roster.iter().find(|id| !catalog.contains(**id)) {
                return Err(ConfigError::invalid(
                    "players.roster",
                    format!("player {} fields unknown template {id}", seat_id(idx)),
                ));
            }
        }

        Ok(())
    }

    /// The unit catalog this configuration selects.
    #[must_use]
    pub fn catalog(&self) -> Catalog {
        if self.monsters.is_empty() {
            Catalog::builtin()
        } else {
            Catalog::from_templates(self.monsters.iter().cloned())
        }
    }

    /// Castle position of the seat at `idx` (0 for player 1).
    #[must_use]
    pub fn castle_of(&self, idx: usize) -> Coord {
        let explicit = self.players.get(idx).and_then(|seat| seat.castle);
        explicit.unwrap_or_else(|| {
            let x = self.board.width / 2;
            let y = if idx == 0 {
                self.board.height.saturating_sub(1)
            } else {
                0
            };
            Coord::new(x, y)
        })
    }

    /// Build both players at full health.
    #[must_use]
    pub fn players(&self) -> [Player; 2] {
        [0, 1].map(|idx| {
            let (roster, ai) = self
                .players
                .get(idx)
                .map_or((Vec::new(), false), |seat| (seat.roster.clone(), seat.ai));
            Player::new(seat_id(idx), self.rules.starting_hp, self.castle_of(idx), roster)
                .with_ai(ai)
        })
    }
}

#[allow(clippy::cast_possible_truncation)]
const fn seat_id(idx: usize) -> PlayerId {
    idx as PlayerId + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GameConfig::default();
        config.validate().unwrap();
        assert_eq!(config.castle_of(0), Coord::new(4, 8));
        assert_eq!(config.castle_of(1), Coord::new(4, 0));
    }

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = GameConfig::from_toml_str("").unwrap();
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn test_partial_toml_overrides() {
        let text = r#"
            max_turns = 50

            [board]
            width = 13
            height = 13

            [rules]
            starting_hp = 5

            [[players]]
            roster = [1, 2]
            ai = true

            [[players]]
            castle = { x = 6, y = 1 }
            roster = [4]
        "#;
        let config = GameConfig::from_toml_str(text).unwrap();
        config.validate().unwrap();
        assert_eq!(config.board.width, 13);
        assert_eq!(config.rules.starting_hp, 5);
        assert_eq!(config.rules.move_points_per_roll, 3);
        assert_eq!(config.castle_of(0), Coord::new(6, 12));
        assert_eq!(config.castle_of(1), Coord::new(6, 1));

        let [p1, p2] = config.players();
        assert!(p1.is_ai);
        assert!(!p2.is_ai);
        assert_eq!(p1.hp, 5);
        assert_eq!(p2.roster, vec![4]);
    }

    #[test]
    fn test_rejects_tiny_board() {
        let mut config = GameConfig::default();
        config.board.width = 2;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "board", .. })
        ));
    }

    #[test]
    fn test_rejects_unknown_roster_template() {
        let mut config = GameConfig::default();
        config.players[1].roster.push(42);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("unknown template 42"));
    }

    #[test]
    fn test_rejects_coinciding_castles() {
        let mut config = GameConfig::default();
        config.players[0].castle = Some(Coord::new(4, 0));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_castle_outside_board() {
        let mut config = GameConfig::default();
        config.players[1].castle = Some(Coord::new(9, 0));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_apply_mode() {
        let mut config = GameConfig::default();
        config.apply_mode(GameMode::AiVsAi);
        assert!(config.players.iter().all(|p| p.ai));
        config.apply_mode(GameMode::HumanVsAi);
        assert!(!config.players[0].ai);
        assert!(config.players[1].ai);
    }

    #[test]
    fn test_custom_catalog() {
        let mut config = GameConfig::default();
        config.monsters = vec![UnitTemplate {
            id: 1,
            name: "Golem".to_string(),
            base_power: 6,
            action_points: 1,
            asset: String::new(),
        }];
        for seat in &mut config.players {
            seat.roster = vec![1];
        }
        config.validate().unwrap();
        assert_eq!(config.catalog().len(), 1);
    }
}
