//! Greedy turn planning.
//!
//! The planner plays the whole turn against a private copy of the state,
//! using only the public rules surface, and records every command it
//! issued. Replaying those commands on the real state reproduces the turn.

use tracing::{debug, info};

use crate::config::OpponentConfig;
use crate::error::{Rejection, RuleResult};
use crate::game::invariants::assert_invariants;
use crate::game::{Command, Coord, GameState, Phase, PlayerId, TemplateId};
use crate::opponent::DistanceField;

/// Commands making up one scripted turn, in issue order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnPlan {
    /// Player the plan was made for.
    pub player: PlayerId,
    /// Commands to apply.
    pub commands: Vec<Command>,
}

impl TurnPlan {
    /// Number of planned commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether nothing was planned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Whether the plan passes the turn, rather than ending the game.
    #[must_use]
    pub fn ends_turn(&self) -> bool {
        self.commands.last() == Some(&Command::EndTurn)
    }
}

impl IntoIterator for TurnPlan {
    type Item = Command;
    type IntoIter = std::vec::IntoIter<Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.into_iter()
    }
}

/// Plans the current player's turn from whatever phase it is in.
struct Planner<'a> {
    sim: GameState,
    config: &'a OpponentConfig,
    plan: TurnPlan,
    target: Coord,
}

impl Planner<'_> {
    fn issue(&mut self, command: Command) -> RuleResult<()> {
        self.sim.apply(command)?;
        assert_invariants(&self.sim);
        debug!(player = self.plan.player, %command, "opponent action");
        self.plan.commands.push(command);
        Ok(())
    }

    fn done(&self) -> bool {
        self.sim.is_game_over()
    }

    /// Summon the strongest template as close to the enemy castle as
    /// possible until move points or options run out.
    fn build(&mut self) -> RuleResult<()> {
        while self.sim.turn().move_points > 0 {
            let Some(template) = self.strongest_summonable() else {
                break;
            };
            let Some(at) = self.closest(self.sim.valid_summon_locations(self.plan.player)) else {
                break;
            };
            self.issue(Command::Summon { template, at })?;
        }

        if self.config.deploy_when_idle {
            while let Some(at) = self.closest(self.sim.valid_deploy_locations(self.plan.player)) {
                self.issue(Command::Deploy { at })?;
            }
        }
        Ok(())
    }

    fn strongest_summonable(&self) -> Option<TemplateId> {
        let player = self.sim.current_player();
        let mut candidates: Vec<_> = player
            .roster
            .iter()
            .filter(|&&id| self.sim.can_summon_unit(player.id, id))
            .filter_map(|&id| self.sim.catalog().get(id))
            .collect();
        candidates.sort_by(|a, b| b.base_power.cmp(&a.base_power));
        candidates.first().map(|t| t.id)
    }

    fn closest(&self, tiles: impl IntoIterator<Item = Coord>) -> Option<Coord> {
        let target = self.target;
        tiles.into_iter().min_by_key(|&c| (c.manhattan(target), c))
    }

    /// Let each unit act, closest to the enemy castle first.
    fn act(&mut self) -> RuleResult<()> {
        let field = DistanceField::from_goal(self.sim.board(), self.target);
        let mut units: Vec<Coord> = self
            .sim
            .board()
            .units_of(self.plan.player)
            .map(|(pos, _)| pos)
            .collect();
        units.sort_by_key(|pos| pos.manhattan(self.target));

        for start in units {
            if self.done() {
                break;
            }
            if self.sim.has_acted(start) || self.sim.remaining_pa(start) == 0 {
                continue;
            }
            self.act_with(start, &field)?;
        }
        Ok(())
    }

    fn act_with(&mut self, start: Coord, field: &DistanceField) -> RuleResult<()> {
        if self.sim.turn().selected_unit != Some(start) {
            self.issue(Command::Select { at: Some(start) })?;
        }

        let mut pos = start;
        while !self.done() && self.sim.remaining_pa(pos) > 0 {
            if let Some(to) = self.weakest_target(pos) {
                self.issue(Command::Attack { from: pos, to })?;
                continue;
            }
            let step = self
                .sim
                .valid_movement_locations(pos)
                .into_iter()
                .min_by_key(|&c| field.rank(c));
            if let Some(to) = step {
                self.issue(Command::Move { from: pos, to })?;
                pos = to;
                continue;
            }
            self.issue(Command::Hold { at: pos })?;
        }
        Ok(())
    }

    fn weakest_target(&self, from: Coord) -> Option<Coord> {
        let board = self.sim.board();
        self.sim
            .valid_attack_locations(from)
            .into_iter()
            .min_by_key(|&c| (board.unit_at(c).map_or(u32::MAX, |u| u.power), c))
    }
}

/// Plan the current player's turn.
///
/// Starts from the current phase, so a turn interrupted mid-way can be
/// planned to completion. The plan ends with [`Command::EndTurn`] unless
/// the game ends first.
///
/// # Errors
///
/// Returns [`Rejection::GameOver`] once the game has ended. Any other
/// rejection means the planner issued an illegal command, which is a bug.
pub fn plan_turn(state: &GameState, config: &OpponentConfig) -> RuleResult<TurnPlan> {
    if state.is_game_over() {
        return Err(Rejection::GameOver);
    }

    let mut planner = Planner {
        sim: state.clone(),
        config,
        plan: TurnPlan {
            player: state.current_player_id(),
            commands: Vec::new(),
        },
        target: state.waiting_player().castle,
    };

    if planner.sim.phase() == Phase::Roll {
        planner.issue(Command::Roll)?;
    }
    if planner.sim.phase() == Phase::Build {
        planner.build()?;
        planner.issue(Command::StartActionPhase)?;
    }
    if planner.sim.phase() == Phase::Action {
        planner.act()?;
        if !planner.done() {
            planner.issue(Command::EndTurn)?;
        }
    }

    let plan = planner.plan;
    info!(
        player = plan.player,
        commands = plan.len(),
        ends_turn = plan.ends_turn(),
        "opponent turn planned"
    );
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::game::{Catalog, Terrain, Unit, UnitTemplate};

    fn game() -> GameState {
        GameState::new(&GameConfig::default()).unwrap()
    }

    fn put(game: &mut GameState, player: u8, template: u16, at: Coord) {
        let unit = Unit::from_template(game.catalog().get(template).unwrap());
        let tile = game.board_mut().get_mut(at).unwrap();
        tile.claim(player);
        tile.content = Some(unit);
    }

    #[test]
    fn test_first_turn_summons_on_castle_and_advances() {
        let game = game();
        let plan = plan_turn(&game, &OpponentConfig::default()).unwrap();
        assert_eq!(plan.player, 1);
        assert_eq!(plan.commands[0], Command::Roll);
        // Only the castle tile is free; Red Dragon is the strongest of 1-3.
        assert_eq!(
            plan.commands[1],
            Command::Summon {
                template: 2,
                at: Coord::new(4, 8)
            }
        );
        assert_eq!(plan.commands[2], Command::StartActionPhase);
        assert!(plan.ends_turn());
    }

    #[test]
    fn test_plan_replays_on_real_state() {
        let mut game = game();
        let plan = plan_turn(&game, &OpponentConfig::default()).unwrap();
        for cmd in plan {
            game.apply(cmd).unwrap();
        }
        assert_eq!(game.current_player_id(), 2);
        assert_eq!(game.board().count_units(1), 1);
    }

    #[test]
    fn test_deploy_when_idle_spends_points() {
        let mut game = game();
        put(&mut game, 1, 1, Coord::new(4, 8));
        let config = OpponentConfig {
            deploy_when_idle: true,
            ..OpponentConfig::default()
        };
        // Castle occupied, so no summon: all three points go to deployment.
        let plan = plan_turn(&game, &config).unwrap();
        let deploys: Vec<_> = plan
            .commands
            .iter()
            .filter(|c| matches!(c, Command::Deploy { .. }))
            .collect();
        assert_eq!(deploys.len(), 3);
        assert_eq!(deploys[0], &Command::Deploy { at: Coord::new(4, 7) });

        game.apply(Command::Roll).unwrap();
        let idle = plan_turn(&game, &OpponentConfig::default()).unwrap();
        assert_eq!(idle.commands[0], Command::StartActionPhase);
    }

    #[test]
    fn test_attacks_weakest_then_moves() {
        let titan = UnitTemplate {
            id: 9,
            name: "Titan".to_string(),
            base_power: 5,
            action_points: 2,
            asset: String::new(),
        };
        let mut config = GameConfig::default();
        config.monsters = Catalog::builtin().iter().cloned().chain([titan]).collect();
        config.players[0].roster.push(9);
        let mut game = GameState::new(&config).unwrap();

        let me = Coord::new(2, 4);
        let prey = Coord::new(2, 3);
        put(&mut game, 1, 9, me);
        put(&mut game, 2, 6, prey);
        game.board_mut().get_mut(prey).unwrap().unit_mut().unwrap().power = 1;
        game.roll_dice().unwrap();
        game.start_action_phase().unwrap();

        let plan = plan_turn(&game, &OpponentConfig::default()).unwrap();
        assert_eq!(
            plan.commands,
            vec![
                Command::Select { at: Some(me) },
                Command::Attack { from: me, to: prey },
                Command::Move { from: me, to: prey },
                Command::EndTurn,
            ]
        );
    }

    #[test]
    fn test_stops_when_castle_falls() {
        let mut game = game();
        game.player_mut(2).unwrap().hp = 1;
        put(&mut game, 1, 1, Coord::new(3, 1));
        let plan = plan_turn(&game, &OpponentConfig::default()).unwrap();
        assert!(!plan.ends_turn());
        assert!(matches!(plan.commands.last(), Some(Command::Move { .. })));

        for cmd in plan {
            game.apply(cmd).unwrap();
        }
        assert_eq!(game.winner(), Some(1));
        assert_eq!(plan_turn(&game, &OpponentConfig::default()), Err(Rejection::GameOver));
    }

    #[test]
    fn test_holds_when_boxed_in() {
        let mut game = game();
        let corner = Coord::new(0, 8);
        put(&mut game, 1, 3, corner);
        for wall in [Coord::new(0, 7), Coord::new(1, 8)] {
            game.board_mut().get_mut(wall).unwrap().terrain = Terrain::Mountain;
        }
        let plan = plan_turn(&game, &OpponentConfig::default()).unwrap();
        assert!(plan.commands.contains(&Command::Hold { at: corner }));
        assert!(plan.ends_turn());
    }
}
