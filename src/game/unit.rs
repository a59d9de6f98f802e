//! Unit instances placed on the board.

use serde::{Deserialize, Serialize};

use crate::game::combat::remaining_after_strike;
use crate::game::{TemplateId, UnitTemplate};

/// A summoned unit.
///
/// `power` is both the unit's remaining health and the damage it deals.
/// It starts at `base_power` and only ever goes down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Catalog template this unit was summoned from.
    pub template: TemplateId,
    /// Display name.
    pub name: String,
    /// Power at summon time.
    pub base_power: u32,
    /// Current power.
    pub power: u32,
    /// Action points granted at the start of each action phase.
    pub action_points: u8,
}

impl Unit {
    /// Create a fresh unit at full power from a catalog template.
    #[must_use]
    pub fn from_template(template: &UnitTemplate) -> Self {
        Self {
            template: template.id,
            name: template.name.clone(),
            base_power: template.base_power,
            power: template.base_power,
            action_points: template.action_points,
        }
    }

    /// Apply `amount` damage. Returns `true` if the unit survives.
    pub fn take_damage(&mut self, amount: u32) -> bool {
        self.power = remaining_after_strike(amount, self.power);
        self.power > 0
    }

    /// Whether the unit has lost any power.
    #[must_use]
    pub const fn is_wounded(&self) -> bool {
        self.power < self.base_power
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Catalog;

    #[test]
    fn test_unit_from_template_full_power() {
        let catalog = Catalog::builtin();
        let unit = Unit::from_template(catalog.get(2).unwrap());
        assert_eq!(unit.name, "Red Dragon");
        assert_eq!(unit.power, 4);
        assert_eq!(unit.base_power, 4);
        assert_eq!(unit.action_points, 2);
        assert!(!unit.is_wounded());
    }

    #[test]
    fn test_take_damage_survives() {
        let mut unit = Unit::from_template(Catalog::builtin().get(4).unwrap());
        assert!(unit.take_damage(3));
        assert_eq!(unit.power, 1);
        assert!(unit.is_wounded());
    }

    #[test]
    fn test_take_damage_never_negative() {
        let mut unit = Unit::from_template(Catalog::builtin().get(3).unwrap());
        assert!(!unit.take_damage(10));
        assert_eq!(unit.power, 0);
    }
}
