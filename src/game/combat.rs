//! Combat resolution.
//!
//! A unit's power is both its health and its damage: the attacker deals its
//! full current power and takes nothing back. Castles lose a fixed amount
//! whenever an enemy unit steps next to them.

use crate::game::{Board, Coord};

/// Castle hp lost each time an enemy unit ends a move next to it.
pub const CASTLE_DAMAGE: u32 = 1;

/// Result of one attack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrikeResult {
    /// Power removed from the defender.
    pub damage: u32,
    /// Defender power left. Zero means it was knocked out.
    pub remaining_power: u32,
    /// Defender's name.
    pub defender: String,
}

impl StrikeResult {
    /// Whether the defender was removed from the board.
    #[must_use]
    pub const fn knocked_out(&self) -> bool {
        self.remaining_power == 0
    }
}

/// Power the defender keeps after being hit by `attacker_power`.
#[must_use]
pub const fn remaining_after_strike(attacker_power: u32, defender_power: u32) -> u32 {
    defender_power.saturating_sub(attacker_power)
}

/// Whether a unit standing on `pos` threatens the castle at `castle`.
#[must_use]
pub fn threatens_castle(pos: Coord, castle: Coord) -> bool {
    pos.is_adjacent_to(castle)
}

/// Hit the unit on `target` with `attacker_power`, removing it from the
/// board if its power runs out.
///
/// Returns `None` if no unit stands on `target`.
pub(crate) fn apply_strike(
    board: &mut Board,
    target: Coord,
    attacker_power: u32,
) -> Option<StrikeResult> {
    let tile = board.get_mut(target)?;
    let unit = tile.unit_mut()?;

    let before = unit.power;
    unit.take_damage(attacker_power);
    let result = StrikeResult {
        damage: before - unit.power,
        remaining_power: unit.power,
        defender: unit.name.clone(),
    };

    if result.knocked_out() {
        tile.content = None;
    }
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Catalog, Terrain, Tile, Unit};

    fn board_with_unit(at: Coord, template: u16) -> Board {
        let mut board = Board::new(5, 5).unwrap();
        let mut tile = Tile::new(Terrain::Forest);
        tile.claim(2);
        tile.content = Some(Unit::from_template(Catalog::builtin().get(template).unwrap()));
        board.set(at, tile);
        board
    }

    #[test]
    fn test_remaining_after_strike() {
        assert_eq!(remaining_after_strike(3, 5), 2);
        assert_eq!(remaining_after_strike(5, 5), 0);
        assert_eq!(remaining_after_strike(9, 1), 0);
        assert_eq!(remaining_after_strike(0, 4), 4);
    }

    #[test]
    fn test_strike_wounds() {
        let pos = Coord::new(2, 2);
        let mut board = board_with_unit(pos, 4);
        let result = apply_strike(&mut board, pos, 3).unwrap();
        assert_eq!(result.damage, 3);
        assert_eq!(result.remaining_power, 1);
        assert!(!result.knocked_out());
        assert_eq!(board.unit_at(pos).unwrap().power, 1);
    }

    #[test]
    fn test_strike_knocks_out_and_clears_tile() {
        let pos = Coord::new(1, 3);
        let mut board = board_with_unit(pos, 6);
        let result = apply_strike(&mut board, pos, 4).unwrap();
        assert_eq!(result.damage, 2);
        assert!(result.knocked_out());
        assert_eq!(result.defender, "Kappa Trickster");
        let tile = board.get(pos).unwrap();
        assert!(tile.content.is_none());
        assert_eq!(tile.owner, Some(2));
    }

    #[test]
    fn test_strike_on_empty_tile() {
        let mut board = Board::new(3, 3).unwrap();
        assert!(apply_strike(&mut board, Coord::new(1, 1), 3).is_none());
        assert!(apply_strike(&mut board, Coord::new(7, 1), 3).is_none());
    }

    #[test]
    fn test_threatens_castle() {
        let castle = Coord::new(4, 0);
        assert!(threatens_castle(Coord::new(4, 1), castle));
        assert!(threatens_castle(Coord::new(3, 0), castle));
        assert!(!threatens_castle(Coord::new(3, 1), castle));
        assert!(!threatens_castle(Coord::new(4, 2), castle));
    }
}
