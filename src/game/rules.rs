//! Rules engine: location queries and validated mutations.
//!
//! Every mutation runs its precondition check first and only then writes,
//! so a rejected call leaves the state untouched. Queries return empty sets
//! whenever the matching mutation would be rejected for phase or ownership
//! reasons, which lets callers treat "empty" as "nothing to do".

use std::collections::BTreeSet;

use tracing::{debug, trace};

use crate::error::{Rejection, RuleResult};
use crate::game::combat::{self, StrikeResult, CASTLE_DAMAGE};
use crate::game::{
    opponent_of, Coord, GameEvent, GameState, Phase, PlayerId, TemplateId, Unit,
};

impl GameState {
    /// Unclaimed tiles orthogonally adjacent to `player`'s territory.
    ///
    /// Empty unless `player` is in their build phase with move points left.
    #[must_use]
    pub fn valid_deploy_locations(&self, player: PlayerId) -> BTreeSet<Coord> {
        if !self.builds(player) || self.turn().move_points == 0 {
            return BTreeSet::new();
        }
        let board = self.board();
        board
            .tiles_owned_by(player)
            .flat_map(|(coord, _)| board.neighbors(coord))
            .filter(|&n| board.get(n).is_some_and(|t| !t.unfolded))
            .collect()
    }

    /// Claim an unclaimed tile next to the current player's territory.
    ///
    /// # Errors
    ///
    /// Rejected outside the build phase, without move points, or when
    /// `coord` is not a valid deploy location.
    pub fn deploy_tile(&mut self, coord: Coord) -> RuleResult<()> {
        self.check_deploy(coord).inspect_err(|r| trace!(%coord, %r, "deploy rejected"))?;

        let player = self.current_player_id();
        if let Some(tile) = self.board_mut().get_mut(coord) {
            tile.claim(player);
        }
        self.turn_mut().move_points -= 1;
        debug!(player, %coord, "tile deployed");
        self.emit(GameEvent::TileDeployed { player, at: coord });
        Ok(())
    }

    fn check_deploy(&self, coord: Coord) -> RuleResult<()> {
        self.require_phase(Phase::Build)?;
        if !self.board().in_bounds(coord) {
            return Err(Rejection::OutOfBounds(coord));
        }
        if self.turn().move_points == 0 {
            return Err(Rejection::NoMovePoints);
        }
        let player = self.current_player_id();
        let board = self.board();
        let unclaimed = board.get(coord).is_some_and(|t| !t.unfolded);
        let touches_territory = board
            .neighbors(coord)
            .any(|n| board.get(n).is_some_and(|t| t.owner == Some(player)));
        if unclaimed && touches_territory {
            Ok(())
        } else {
            Err(Rejection::NotDeployable(coord))
        }
    }

    /// Empty, passable tiles owned by `player`.
    ///
    /// Empty unless `player` is in their build phase.
    #[must_use]
    pub fn valid_summon_locations(&self, player: PlayerId) -> BTreeSet<Coord> {
        if !self.builds(player) {
            return BTreeSet::new();
        }
        self.board()
            .tiles_owned_by(player)
            .filter(|(_, tile)| tile.terrain.is_passable() && !tile.is_occupied())
            .map(|(coord, _)| coord)
            .collect()
    }

    /// Whether `player` could summon `template` right now, given a free tile.
    #[must_use]
    pub fn can_summon_unit(&self, player: PlayerId, template: TemplateId) -> bool {
        self.builds(player) && self.check_summon_resources(template).is_ok()
    }

    fn check_summon_resources(&self, template: TemplateId) -> RuleResult<()> {
        self.require_phase(Phase::Build)?;
        if !self.catalog().contains(template) {
            return Err(Rejection::UnknownTemplate(template));
        }
        if !self.current_player().can_field(template) {
            return Err(Rejection::NotInRoster(template));
        }
        if self.turn().move_points == 0 {
            return Err(Rejection::NoMovePoints);
        }
        let max = self.rules().max_units_per_player;
        if self.board().count_units(self.current_player_id()) >= max {
            return Err(Rejection::UnitLimit { max });
        }
        Ok(())
    }

    /// Pick the template to summon next. Picking the selected template
    /// again clears the pick. Returns the resulting pick.
    ///
    /// # Errors
    ///
    /// Rejected outside the build phase or for a template the current
    /// player cannot field.
    pub fn select_template(&mut self, template: Option<TemplateId>) -> RuleResult<Option<TemplateId>> {
        self.require_phase(Phase::Build)?;
        let next = match template {
            None => None,
            Some(id) if self.turn().selected_template == Some(id) => None,
            Some(id) => {
                if !self.catalog().contains(id) {
                    return Err(Rejection::UnknownTemplate(id));
                }
                if !self.current_player().can_field(id) {
                    return Err(Rejection::NotInRoster(id));
                }
                Some(id)
            }
        };
        self.turn_mut().selected_template = next;
        Ok(next)
    }

    /// Summon a fresh unit of `template` onto `coord`.
    ///
    /// # Errors
    ///
    /// Rejected outside the build phase, without move points, at the unit
    /// limit, for a template outside the roster, or when `coord` is not an
    /// empty, passable tile of the current player.
    pub fn place_unit(&mut self, template: TemplateId, coord: Coord) -> RuleResult<()> {
        let unit = self
            .check_place(template, coord)
            .inspect_err(|r| trace!(template, %coord, %r, "summon rejected"))?;

        let player = self.current_player_id();
        let name = unit.name.clone();
        if let Some(tile) = self.board_mut().get_mut(coord) {
            tile.content = Some(unit);
        }
        let turn = self.turn_mut();
        turn.selected_template = None;
        turn.move_points -= 1;
        debug!(player, template, %coord, "unit summoned");
        self.emit(GameEvent::UnitSummoned {
            player,
            template,
            name,
            at: coord,
        });
        Ok(())
    }

    fn check_place(&self, template: TemplateId, coord: Coord) -> RuleResult<Unit> {
        self.check_summon_resources(template)?;
        let tile = self.board().get(coord).ok_or(Rejection::OutOfBounds(coord))?;
        if tile.owner != Some(self.current_player_id()) || !tile.terrain.is_passable() {
            return Err(Rejection::NotSummonable(coord));
        }
        if tile.is_occupied() {
            return Err(Rejection::Occupied(coord));
        }
        self.catalog()
            .get(template)
            .map(Unit::from_template)
            .ok_or(Rejection::UnknownTemplate(template))
    }

    /// Empty, passable neighbours the unit at `from` may step onto. The
    /// enemy castle tile is never one of them.
    ///
    /// Empty unless `from` holds a current-player unit with action points
    /// left during the action phase.
    #[must_use]
    pub fn valid_movement_locations(&self, from: Coord) -> BTreeSet<Coord> {
        if self.check_actor(from).is_err() {
            return BTreeSet::new();
        }
        let enemy_castle = self.waiting_player().castle;
        let board = self.board();
        board
            .neighbors(from)
            .filter(|&n| n != enemy_castle)
            .filter(|&n| {
                board
                    .get(n)
                    .is_some_and(|t| !t.is_occupied() && t.terrain.is_passable())
            })
            .collect()
    }

    /// Neighbours of `from` holding an enemy unit.
    ///
    /// Empty unless `from` holds a current-player unit with action points
    /// left during the action phase.
    #[must_use]
    pub fn valid_attack_locations(&self, from: Coord) -> BTreeSet<Coord> {
        if self.check_actor(from).is_err() {
            return BTreeSet::new();
        }
        let enemy = opponent_of(self.current_player_id());
        let board = self.board();
        board
            .neighbors(from)
            .filter(|&n| {
                board
                    .get(n)
                    .is_some_and(|t| t.owner == Some(enemy) && t.unit().is_some())
            })
            .collect()
    }

    /// Check that `coord` holds a current-player unit able to act.
    fn check_actor(&self, coord: Coord) -> RuleResult<()> {
        self.require_phase(Phase::Action)?;
        let tile = self.board().get(coord).ok_or(Rejection::OutOfBounds(coord))?;
        if tile.unit().is_none() {
            return Err(Rejection::NoUnit(coord));
        }
        if tile.owner != Some(self.current_player_id()) {
            return Err(Rejection::NotYourUnit(coord));
        }
        if self.turn().remaining_pa(coord) == 0 {
            return Err(Rejection::Exhausted(coord));
        }
        Ok(())
    }

    /// Step the unit at `from` onto the neighbouring tile `to`, claiming it.
    ///
    /// Costs one action point. Ending next to the enemy castle damages it,
    /// which can end the game.
    ///
    /// # Errors
    ///
    /// Rejected unless `to` is a valid movement location of `from`.
    pub fn move_unit(&mut self, from: Coord, to: Coord) -> RuleResult<()> {
        self.check_move(from, to)
            .inspect_err(|r| trace!(%from, %to, %r, "move rejected"))?;

        let player = self.current_player_id();
        let content = self.board_mut().get_mut(from).and_then(|t| t.content.take());
        if let Some(tile) = self.board_mut().get_mut(to) {
            tile.content = content;
            tile.claim(player);
        }

        let turn = self.turn_mut();
        turn.relocate(from, to);
        let left = turn.spend_pa(to);
        turn.selected_unit = (left > 0).then_some(to);
        debug!(player, %from, %to, pa_left = left, "unit moved");
        self.emit(GameEvent::UnitMoved { from, to });

        self.siege(to);
        Ok(())
    }

    fn check_move(&self, from: Coord, to: Coord) -> RuleResult<()> {
        self.check_actor(from)?;
        if self.valid_movement_locations(from).contains(&to) {
            return Ok(());
        }
        if from.is_adjacent_to(to) && self.board().get(to).is_some_and(|t| t.is_occupied()) {
            Err(Rejection::Occupied(to))
        } else {
            Err(Rejection::InvalidMove { from, to })
        }
    }

    /// Damage the enemy castle if `pos` is next to it.
    fn siege(&mut self, pos: Coord) {
        let enemy = opponent_of(self.current_player_id());
        let Some(castle) = self.player(enemy).map(|p| p.castle) else {
            return;
        };
        if !combat::threatens_castle(pos, castle) {
            return;
        }
        let Some(remaining_hp) = self.player_mut(enemy).map(|p| p.damage_castle(CASTLE_DAMAGE))
        else {
            return;
        };
        debug!(player = enemy, remaining_hp, "castle hit");
        self.emit(GameEvent::CastleHit {
            player: enemy,
            at: castle,
            remaining_hp,
        });
        if remaining_hp == 0 {
            self.finish();
        }
    }

    /// Strike the enemy unit on `defender` with the unit on `attacker`.
    ///
    /// The defender loses the attacker's current power and is removed when
    /// that leaves nothing. Costs the attacker one action point.
    ///
    /// # Errors
    ///
    /// Rejected unless `defender` is a valid attack location of `attacker`.
    pub fn attack_unit(&mut self, attacker: Coord, defender: Coord) -> RuleResult<StrikeResult> {
        let power = self
            .check_attack(attacker, defender)
            .inspect_err(|r| trace!(%attacker, %defender, %r, "attack rejected"))?;

        let Some(result) = combat::apply_strike(self.board_mut(), defender, power) else {
            return Err(Rejection::InvalidTarget {
                from: attacker,
                to: defender,
            });
        };

        if result.knocked_out() {
            self.turn_mut().forget(defender);
            self.emit(GameEvent::KnockOut {
                at: defender,
                name: result.defender.clone(),
            });
        } else {
            self.emit(GameEvent::Damage {
                at: defender,
                amount: result.damage,
            });
        }

        let left = self.turn_mut().spend_pa(attacker);
        if left == 0 {
            self.turn_mut().clear_selection();
        }
        debug!(%attacker, %defender, damage = result.damage, pa_left = left, "attack resolved");
        Ok(result)
    }

    fn check_attack(&self, attacker: Coord, defender: Coord) -> RuleResult<u32> {
        self.check_actor(attacker)?;
        if !self.valid_attack_locations(attacker).contains(&defender) {
            return Err(Rejection::InvalidTarget {
                from: attacker,
                to: defender,
            });
        }
        self.board()
            .unit_at(attacker)
            .map(|u| u.power)
            .ok_or(Rejection::NoUnit(attacker))
    }

    /// Finish the unit on `coord` for this action phase without acting.
    ///
    /// # Errors
    ///
    /// Rejected unless `coord` holds a current-player unit that can still act.
    pub fn hold_unit(&mut self, coord: Coord) -> RuleResult<()> {
        self.check_actor(coord)
            .inspect_err(|r| trace!(%coord, %r, "hold rejected"))?;

        let turn = self.turn_mut();
        turn.exhaust(coord);
        if turn.selected_unit == Some(coord) {
            turn.clear_selection();
        }
        debug!(%coord, "unit holds");
        Ok(())
    }

    /// Select a board unit, or clear the selection.
    ///
    /// Passing `None`, the already-selected tile, or anything other than a
    /// current-player unit that has not acted clears the selection. Returns
    /// the resulting selection.
    ///
    /// # Errors
    ///
    /// Rejected once the game is over.
    pub fn select_unit(&mut self, coord: Option<Coord>) -> RuleResult<Option<Coord>> {
        self.require_active()?;
        let next = coord.filter(|&c| self.turn().selected_unit != Some(c) && self.selectable(c));
        self.turn_mut().selected_unit = next;
        Ok(next)
    }

    fn selectable(&self, coord: Coord) -> bool {
        let player = self.current_player_id();
        let own_unit = self
            .board()
            .get(coord)
            .is_some_and(|t| t.owner == Some(player) && t.unit().is_some());
        own_unit && !self.turn().has_acted(coord)
    }

    /// Action points left this phase for the unit on `coord`.
    #[must_use]
    pub fn remaining_pa(&self, coord: Coord) -> u8 {
        self.turn().remaining_pa(coord)
    }

    /// Whether the unit on `coord` is done for this action phase.
    #[must_use]
    pub fn has_acted(&self, coord: Coord) -> bool {
        self.turn().has_acted(coord)
    }

    fn builds(&self, player: PlayerId) -> bool {
        self.phase() == Phase::Build && player == self.current_player_id()
    }
}
