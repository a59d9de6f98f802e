//! Game state and the phase state machine.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{ConfigError, GameConfig, GameMode, RulesConfig};
use crate::error::{Rejection, RuleResult};
use crate::game::{opponent_of, Board, Catalog, GameEvent, Phase, Player, PlayerId, TurnState};

/// Complete state of one match.
///
/// Owned by whoever drives the game; every rules operation takes it as its
/// receiver, so any number of independent games can coexist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// The board.
    board: Board,
    /// Both players, indexed by `id - 1`.
    players: [Player; 2],
    /// Player whose turn it is.
    current: PlayerId,
    /// Phase of the current turn.
    phase: Phase,
    /// Per-turn resources and selections.
    turn: TurnState,
    /// Completed turns.
    turn_number: u32,
    /// Summonable templates.
    catalog: Catalog,
    /// Numeric rules.
    rules: RulesConfig,
    /// Feedback not yet collected by the presentation layer.
    #[serde(skip)]
    events: Vec<GameEvent>,
}

impl GameState {
    /// Create a fresh game from a configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: &GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let catalog = config.catalog();
        let [p1, p2] = config.players();
        let castles = [(p1.id, p1.castle), (p2.id, p2.castle)];
        let board = Board::generate(config.board.width, config.board.height, &castles)
            .ok_or_else(|| ConfigError::invalid("board", "castle outside the board"))?;

        Ok(Self::from_parts(board, [p1, p2], catalog, config.rules))
    }

    /// Assemble a game from prepared parts, starting in player 1's roll phase.
    ///
    /// The caller is responsible for the board holding both castles.
    #[must_use]
    pub fn from_parts(
        board: Board,
        players: [Player; 2],
        catalog: Catalog,
        rules: RulesConfig,
    ) -> Self {
        Self {
            board,
            players,
            current: 1,
            phase: Phase::Roll,
            turn: TurnState::default(),
            turn_number: 0,
            catalog,
            rules,
            events: Vec::new(),
        }
    }

    /// The board.
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// Mutable board access for the rules engine.
    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    /// Both players.
    #[must_use]
    pub const fn players(&self) -> &[Player; 2] {
        &self.players
    }

    /// Get a player by ID.
    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Get a mutable reference to a player by ID.
    pub(crate) fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// Reassign which seats the scripted opponent plays, e.g. after
    /// restoring a snapshot.
    pub fn assign_seats(&mut self, mode: GameMode) {
        for player in &mut self.players {
            player.is_ai = mode.is_ai(player.id);
        }
    }

    /// ID of the player whose turn it is.
    #[must_use]
    pub const fn current_player_id(&self) -> PlayerId {
        self.current
    }

    /// The player whose turn it is.
    #[must_use]
    pub fn current_player(&self) -> &Player {
        self.seat(self.current)
    }

    /// The player waiting for their turn.
    #[must_use]
    pub fn waiting_player(&self) -> &Player {
        self.seat(opponent_of(self.current))
    }

    fn seat(&self, id: PlayerId) -> &Player {
        if id == self.players[1].id {
            &self.players[1]
        } else {
            &self.players[0]
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Per-turn resources and selections.
    #[must_use]
    pub const fn turn(&self) -> &TurnState {
        &self.turn
    }

    pub(crate) fn turn_mut(&mut self) -> &mut TurnState {
        &mut self.turn
    }

    /// Number of completed turns.
    #[must_use]
    pub const fn turn_number(&self) -> u32 {
        self.turn_number
    }

    /// Unit catalog.
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Numeric rules.
    #[must_use]
    pub const fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    /// Check if the game is over.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    /// The player left standing once the game is over.
    #[must_use]
    pub fn winner(&self) -> Option<PlayerId> {
        if !self.is_game_over() {
            return None;
        }
        let mut standing = self.players.iter().filter(|p| !p.is_defeated());
        match (standing.next(), standing.next()) {
            (Some(p), None) => Some(p.id),
            _ => None,
        }
    }

    /// Collect and clear pending feedback events.
    #[must_use]
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Pending feedback events, oldest first.
    #[must_use]
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        debug!(player = self.current, %event, "game event");
        self.events.push(event);
    }

    /// Reject once the game has ended, or when not in `expected`.
    pub(crate) fn require_phase(&self, expected: Phase) -> RuleResult<()> {
        match self.phase {
            Phase::GameOver => Err(Rejection::GameOver),
            actual if actual != expected => Err(Rejection::WrongPhase { expected, actual }),
            _ => Ok(()),
        }
    }

    /// Reject once the game has ended.
    pub(crate) fn require_active(&self) -> RuleResult<()> {
        if self.is_game_over() {
            Err(Rejection::GameOver)
        } else {
            Ok(())
        }
    }

    /// Roll: enter the build phase with a fresh allotment of move points.
    ///
    /// # Errors
    ///
    /// Rejected outside the roll phase.
    pub fn roll_dice(&mut self) -> RuleResult<u32> {
        self.require_phase(Phase::Roll)?;

        let move_points = self.rules.move_points_per_roll;
        self.turn.move_points = move_points;
        self.turn.clear_selection();
        self.phase = Phase::Build;
        self.emit(GameEvent::PhaseStarted {
            player: self.current,
            phase: Phase::Build,
            move_points,
        });
        Ok(move_points)
    }

    /// Enter the action phase, granting every current-player unit its
    /// full action points.
    ///
    /// # Errors
    ///
    /// Rejected outside the build phase.
    pub fn start_action_phase(&mut self) -> RuleResult<()> {
        self.require_phase(Phase::Build)?;

        self.phase = Phase::Action;
        self.turn.clear_selection();
        self.turn.selected_template = None;
        self.turn.reset_action_tracking();

        let grants: Vec<_> = self
            .board
            .units_of(self.current)
            .map(|(coord, unit)| (coord, unit.action_points))
            .collect();
        for (coord, pa) in grants {
            self.turn.grant_pa(coord, pa);
        }

        self.emit(GameEvent::PhaseStarted {
            player: self.current,
            phase: Phase::Action,
            move_points: 0,
        });
        Ok(())
    }

    /// Pass the turn to the other player.
    ///
    /// # Errors
    ///
    /// Rejected outside the action phase.
    pub fn end_turn(&mut self) -> RuleResult<()> {
        self.require_phase(Phase::Action)?;

        self.emit(GameEvent::TurnEnded {
            player: self.current,
        });
        self.turn.reset_action_tracking();
        self.turn.clear_selection();
        self.turn.move_points = 0;
        self.current = opponent_of(self.current);
        self.phase = Phase::Roll;
        self.turn_number += 1;
        self.emit(GameEvent::PhaseStarted {
            player: self.current,
            phase: Phase::Roll,
            move_points: 0,
        });
        Ok(())
    }

    /// Enter the terminal phase.
    pub(crate) fn finish(&mut self) {
        self.phase = Phase::GameOver;
        self.turn.clear_selection();
        self.turn.selected_template = None;
        let winner = self.winner();
        self.emit(GameEvent::GameOver { winner });
    }
}
