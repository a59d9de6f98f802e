//! Phase cycle and per-turn bookkeeping.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::game::{Coord, TemplateId};

/// Phase of the current player's turn.
///
/// `Roll -> Build -> Action -> Roll (other player)`, with `GameOver`
/// reachable from anywhere and absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    /// Waiting for the current player to roll.
    Roll,
    /// Deploying tiles and summoning units with move points.
    Build,
    /// Moving and attacking with action points.
    Action,
    /// A castle has fallen.
    GameOver,
}

impl Phase {
    /// Short human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Phase::Roll => "Roll",
            Phase::Build => "Build",
            Phase::Action => "Action",
            Phase::GameOver => "Game over",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Roll => "ROLL_PHASE",
            Phase::Build => "BUILD_PHASE",
            Phase::Action => "ACTION_PHASE",
            Phase::GameOver => "GAME_OVER",
        };
        f.write_str(name)
    }
}

/// Resources and selections of the turn in progress.
///
/// Action-point tracking is keyed by the tile a unit stands on. Entries
/// exist only during the action phase and only for the current player's
/// units; moving a unit re-keys its entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    /// Deploy/summon actions left in the build phase.
    pub move_points: u32,
    /// Template picked for the next summon.
    pub selected_template: Option<TemplateId>,
    /// Board unit currently selected.
    pub selected_unit: Option<Coord>,
    /// Units that are done for this action phase.
    exhausted: BTreeSet<Coord>,
    /// Remaining action points per unit.
    #[serde(with = "coord_key_map")]
    remaining_pa: BTreeMap<Coord, u8>,
}

impl TurnState {
    /// Action points left for the unit at `coord` (0 when untracked).
    #[must_use]
    pub fn remaining_pa(&self, coord: Coord) -> u8 {
        self.remaining_pa.get(&coord).copied().unwrap_or(0)
    }

    /// Whether the unit at `coord` has finished acting this phase.
    #[must_use]
    pub fn has_acted(&self, coord: Coord) -> bool {
        self.exhausted.contains(&coord)
    }

    /// Tracked action-point entries in row-major order.
    pub fn pa_entries(&self) -> impl Iterator<Item = (Coord, u8)> + '_ {
        self.remaining_pa.iter().map(|(&coord, &pa)| (coord, pa))
    }

    /// Units marked as done, in row-major order.
    pub fn exhausted(&self) -> impl Iterator<Item = Coord> + '_ {
        self.exhausted.iter().copied()
    }

    /// Clear the board-unit selection.
    pub fn clear_selection(&mut self) {
        self.selected_unit = None;
    }

    /// Drop all action tracking.
    pub(crate) fn reset_action_tracking(&mut self) {
        self.exhausted.clear();
        self.remaining_pa.clear();
    }

    /// Start tracking a unit with a full allotment.
    pub(crate) fn grant_pa(&mut self, coord: Coord, pa: u8) {
        self.remaining_pa.insert(coord, pa);
    }

    /// Spend one action point. Returns what is left, marking the unit
    /// exhausted when that reaches zero.
    pub(crate) fn spend_pa(&mut self, coord: Coord) -> u8 {
        let left = self.remaining_pa(coord).saturating_sub(1);
        self.remaining_pa.insert(coord, left);
        if left == 0 {
            self.exhausted.insert(coord);
        }
        left
    }

    /// Re-key a unit's tracking after it moved.
    pub(crate) fn relocate(&mut self, from: Coord, to: Coord) {
        if let Some(pa) = self.remaining_pa.remove(&from) {
            self.remaining_pa.insert(to, pa);
        }
        if self.exhausted.remove(&from) {
            self.exhausted.insert(to);
        }
    }

    /// Stop tracking a unit that left the board.
    pub(crate) fn forget(&mut self, coord: Coord) {
        self.remaining_pa.remove(&coord);
        self.exhausted.remove(&coord);
        if self.selected_unit == Some(coord) {
            self.selected_unit = None;
        }
    }

    /// End a unit's activity for this phase.
    pub(crate) fn exhaust(&mut self, coord: Coord) {
        self.remaining_pa.insert(coord, 0);
        self.exhausted.insert(coord);
    }
}

/// Serialize a coordinate-keyed map as a list of pairs, since JSON object
/// keys must be strings.
mod coord_key_map {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::game::Coord;

    pub(super) fn serialize<S>(map: &BTreeMap<Coord, u8>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let pairs: Vec<(Coord, u8)> = map.iter().map(|(&k, &v)| (k, v)).collect();
        pairs.serialize(serializer)
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<Coord, u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let pairs: Vec<(Coord, u8)> = Vec::deserialize(deserializer)?;
        Ok(pairs.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spend_pa_exhausts_at_zero() {
        let mut turn = TurnState::default();
        let pos = Coord::new(1, 1);
        turn.grant_pa(pos, 2);
        assert_eq!(turn.spend_pa(pos), 1);
        assert!(!turn.has_acted(pos));
        assert_eq!(turn.spend_pa(pos), 0);
        assert!(turn.has_acted(pos));
    }

    #[test]
    fn test_relocate_rekeys_entry() {
        let mut turn = TurnState::default();
        let (from, to) = (Coord::new(1, 1), Coord::new(1, 2));
        turn.grant_pa(from, 3);
        turn.relocate(from, to);
        assert_eq!(turn.remaining_pa(from), 0);
        assert_eq!(turn.remaining_pa(to), 3);
        assert_eq!(turn.pa_entries().count(), 1);
    }

    #[test]
    fn test_forget_clears_selection() {
        let mut turn = TurnState::default();
        let pos = Coord::new(0, 3);
        turn.grant_pa(pos, 1);
        turn.selected_unit = Some(pos);
        turn.forget(pos);
        assert_eq!(turn.pa_entries().count(), 0);
        assert_eq!(turn.selected_unit, None);
    }

    #[test]
    fn test_turn_state_json_roundtrip() {
        let mut turn = TurnState::default();
        turn.grant_pa(Coord::new(2, 5), 3);
        turn.exhaust(Coord::new(4, 4));
        let json = serde_json::to_string(&turn).unwrap();
        let back: TurnState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, turn);
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::Roll.to_string(), "ROLL_PHASE");
        assert_eq!(Phase::GameOver.to_string(), "GAME_OVER");
    }
}
