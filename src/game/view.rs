//! Read-only projections for presentation.
//!
//! Mutations never touch presentation; a renderer polls these after each
//! change instead.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::game::{Coord, GameState, Phase, PlayerId, TemplateId};

/// What a detail panel shows for one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitView {
    /// Tile the unit stands on.
    pub at: Coord,
    /// Owning player.
    pub owner: PlayerId,
    /// Catalog template.
    pub template: TemplateId,
    /// Display name.
    pub name: String,
    /// Current power.
    pub power: u32,
    /// Power at summon time.
    pub base_power: u32,
    /// Action points per action phase.
    pub action_points: u8,
    /// Action points left this phase (0 outside the owner's action phase).
    pub remaining_pa: u8,
    /// Whether the unit is done for this action phase.
    pub exhausted: bool,
}

/// Detail of the unit on `at`, if any.
#[must_use]
pub fn unit_view(state: &GameState, at: Coord) -> Option<UnitView> {
    let tile = state.board().get(at)?;
    let unit = tile.unit()?;
    Some(UnitView {
        at,
        owner: tile.owner?,
        template: unit.template,
        name: unit.name.clone(),
        power: unit.power,
        base_power: unit.base_power,
        action_points: unit.action_points,
        remaining_pa: state.remaining_pa(at),
        exhausted: state.has_acted(at),
    })
}

/// Detail of the selected board unit, if any.
#[must_use]
pub fn selection_view(state: &GameState) -> Option<UnitView> {
    state
        .turn()
        .selected_unit
        .and_then(|at| unit_view(state, at))
}

/// Tiles to highlight for the current player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Highlights {
    /// Tiles the player may deploy.
    pub deploy: BTreeSet<Coord>,
    /// Tiles the selected template may be summoned on.
    pub summon: BTreeSet<Coord>,
    /// Tiles the selected unit may move to.
    pub movement: BTreeSet<Coord>,
    /// Enemy units the selected unit may attack.
    pub attack: BTreeSet<Coord>,
}

impl Highlights {
    /// Whether nothing is highlighted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deploy.is_empty()
            && self.summon.is_empty()
            && self.movement.is_empty()
            && self.attack.is_empty()
    }
}

/// Highlights derived from the phase and the current selections.
#[must_use]
pub fn highlights(state: &GameState) -> Highlights {
    let player = state.current_player_id();
    let turn = state.turn();
    match state.phase() {
        Phase::Build => {
            let summon = match turn.selected_template {
                Some(id) if state.can_summon_unit(player, id) => {
                    state.valid_summon_locations(player)
                }
                _ => BTreeSet::new(),
            };
            Highlights {
                deploy: state.valid_deploy_locations(player),
                summon,
                ..Highlights::default()
            }
        }
        Phase::Action => turn.selected_unit.map_or_else(Highlights::default, |at| Highlights {
            movement: state.valid_movement_locations(at),
            attack: state.valid_attack_locations(at),
            ..Highlights::default()
        }),
        Phase::Roll | Phase::GameOver => Highlights::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::game::Unit;

    fn game_with_unit(at: Coord) -> GameState {
        let mut game = GameState::new(&GameConfig::default()).unwrap();
        let unit = Unit::from_template(game.catalog().get(1).unwrap());
        let tile = game.board_mut().get_mut(at).unwrap();
        tile.claim(1);
        tile.content = Some(unit);
        game
    }

    #[test]
    fn test_selection_view_tracks_pa() {
        let at = Coord::new(2, 5);
        let mut game = game_with_unit(at);
        assert_eq!(selection_view(&game), None);

        game.roll_dice().unwrap();
        game.start_action_phase().unwrap();
        game.select_unit(Some(at)).unwrap();
        let view = selection_view(&game).unwrap();
        assert_eq!(view.name, "Beast Warrior");
        assert_eq!(view.remaining_pa, 3);
        assert_eq!(view.power, view.base_power);

        game.move_unit(at, Coord::new(2, 4)).unwrap();
        let view = selection_view(&game).unwrap();
        assert_eq!(view.at, Coord::new(2, 4));
        assert_eq!(view.remaining_pa, 2);
        assert!(!view.exhausted);
    }

    #[test]
    fn test_highlights_by_phase() {
        let at = Coord::new(2, 5);
        let mut game = game_with_unit(at);
        assert!(highlights(&game).is_empty());

        game.roll_dice().unwrap();
        let build = highlights(&game);
        assert!(!build.deploy.is_empty());
        assert!(build.summon.is_empty());

        game.deploy_tile(Coord::new(4, 7)).unwrap();
        game.select_template(Some(1)).unwrap();
        let build = highlights(&game);
        assert_eq!(
            build.summon,
            [Coord::new(4, 7), Coord::new(4, 8)].into_iter().collect()
        );

        game.start_action_phase().unwrap();
        assert!(highlights(&game).is_empty());
        game.select_unit(Some(at)).unwrap();
        let action = highlights(&game);
        assert!(action.deploy.is_empty());
        assert_eq!(action.movement.len(), 4);
        assert!(action.attack.is_empty());
    }
}
