//! Player state management.

use serde::{Deserialize, Serialize};

use crate::game::{Coord, TemplateId};

/// Unique identifier for a player (1 or 2).
pub type PlayerId = u8;

/// State for a single player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Unique identifier for this player.
    pub id: PlayerId,
    /// Castle health. The game ends when it reaches zero.
    pub hp: u32,
    /// Location of the player's castle. Never moves.
    pub castle: Coord,
    /// Templates this player may summon.
    pub roster: Vec<TemplateId>,
    /// Whether the scripted opponent plays this seat.
    pub is_ai: bool,
}

impl Player {
    /// Create a new human player.
    #[must_use]
    pub fn new(id: PlayerId, hp: u32, castle: Coord, roster: Vec<TemplateId>) -> Self {
        Self {
            id,
            hp,
            castle,
            roster,
            is_ai: false,
        }
    }

    /// Hand this seat to the scripted opponent.
    #[must_use]
    pub fn with_ai(mut self, is_ai: bool) -> Self {
        self.is_ai = is_ai;
        self
    }

    /// Damage the castle. Returns the remaining hp.
    pub fn damage_castle(&mut self, amount: u32) -> u32 {
        self.hp = self.hp.saturating_sub(amount);
        self.hp
    }

    /// Whether the castle has fallen.
    #[must_use]
    pub const fn is_defeated(&self) -> bool {
        self.hp == 0
    }

    /// Whether `template` is in this player's roster.
    #[must_use]
    pub fn can_field(&self, template: TemplateId) -> bool {
        self.roster.contains(&template)
    }
}

/// The other seat of a two-player game.
#[must_use]
pub const fn opponent_of(id: PlayerId) -> PlayerId {
    if id == 1 { 2 } else { 1 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_creation() {
        let player = Player::new(1, 3, Coord::new(4, 8), vec![1, 2, 3]);
        assert_eq!(player.id, 1);
        assert_eq!(player.hp, 3);
        assert!(!player.is_ai);
        assert!(!player.is_defeated());
        assert!(player.can_field(2));
        assert!(!player.can_field(4));
    }

    #[test]
    fn test_damage_castle_saturates() {
        let mut player = Player::new(2, 1, Coord::new(4, 0), vec![]);
        assert_eq!(player.damage_castle(1), 0);
        assert!(player.is_defeated());
        assert_eq!(player.damage_castle(1), 0);
    }

    #[test]
    fn test_opponent_of() {
        assert_eq!(opponent_of(1), 2);
        assert_eq!(opponent_of(2), 1);
    }
}
