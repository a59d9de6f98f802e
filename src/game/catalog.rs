//! Static catalog of summonable unit templates.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Identifier of a unit template in the catalog.
pub type TemplateId = u16;

/// A summonable unit type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitTemplate {
    /// Catalog identifier.
    pub id: TemplateId,
    /// Display name.
    pub name: String,
    /// Power a freshly summoned unit starts with.
    pub base_power: u32,
    /// Action points per action phase.
    pub action_points: u8,
    /// Asset reference for the presentation layer.
    #[serde(default)]
    pub asset: String,
}

impl UnitTemplate {
    fn new(id: TemplateId, name: &str, base_power: u32, action_points: u8, asset: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            base_power,
            action_points,
            asset: asset.to_string(),
        }
    }
}

/// Read-only table mapping template id to template.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Catalog {
    templates: BTreeMap<TemplateId, UnitTemplate>,
}

impl Catalog {
    /// The built-in six-monster catalog. Ids 1-3 form the first player's
    /// default roster and ids 4-6 the second's.
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_templates([
            UnitTemplate::new(1, "Beast Warrior", 3, 3, "beast_warrior.png"),
            UnitTemplate::new(2, "Red Dragon", 4, 2, "red_dragon.png"),
            UnitTemplate::new(3, "Dark Assassin", 2, 4, "dark_assassin.png"),
            UnitTemplate::new(4, "Armored Knight", 4, 3, "armored_knight.png"),
            UnitTemplate::new(5, "Sea Serpent", 3, 3, "sea_serpent.png"),
            UnitTemplate::new(6, "Kappa Trickster", 2, 4, "kappa_trickster.png"),
        ])
    }

    /// Build a catalog from templates. Later duplicates replace earlier ones.
    #[must_use]
    pub fn from_templates(templates: impl IntoIterator<Item = UnitTemplate>) -> Self {
        Self {
            templates: templates.into_iter().map(|t| (t.id, t)).collect(),
        }
    }

    /// Look up a template.
    #[must_use]
    pub fn get(&self, id: TemplateId) -> Option<&UnitTemplate> {
        self.templates.get(&id)
    }

    /// Check if a template exists.
    #[must_use]
    pub fn contains(&self, id: TemplateId) -> bool {
        self.templates.contains_key(&id)
    }

    /// Iterate templates in id order.
    pub fn iter(&self) -> impl Iterator<Item = &UnitTemplate> {
        self.templates.values()
    }

    /// Number of templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
