//! Paced replay of planned turns.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::config::OpponentConfig;
use crate::error::RuleResult;
use crate::game::invariants::assert_invariants;
use crate::game::{Command, GameState, PlayerId};
use crate::opponent::{plan_turn, TurnPlan};

/// Feeds scripted turns into a live game one command at a time.
///
/// Call [`OpponentDriver::poll`] from the frame loop; it plans a turn when a
/// scripted seat is to move and then applies one command whenever the
/// action delay has elapsed. Rules calls stay synchronous; only the spacing
/// between them is paced.
#[derive(Debug, Clone)]
pub struct OpponentDriver {
    config: OpponentConfig,
    queue: VecDeque<Command>,
    player: Option<PlayerId>,
    next_at: Option<Instant>,
}

impl OpponentDriver {
    /// Create an idle driver.
    #[must_use]
    pub fn new(config: OpponentConfig) -> Self {
        Self {
            config,
            queue: VecDeque::new(),
            player: None,
            next_at: None,
        }
    }

    /// Pause between two applied commands.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.config.action_delay()
    }

    /// Whether no commands are waiting.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of commands waiting.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Player whose turn is queued.
    #[must_use]
    pub const fn player(&self) -> Option<PlayerId> {
        self.player
    }

    /// Queue a planned turn. The first command is due one delay from `now`.
    pub fn load(&mut self, plan: TurnPlan, now: Instant) {
        debug!(player = plan.player, commands = plan.len(), "turn queued");
        self.player = Some(plan.player);
        self.queue = plan.commands.into();
        self.next_at = Some(now + self.delay());
    }

    /// Drop everything still queued.
    pub fn cancel(&mut self) {
        if !self.queue.is_empty() {
            debug!(dropped = self.queue.len(), "opponent turn cancelled");
        }
        self.queue.clear();
        self.player = None;
        self.next_at = None;
    }

    /// Advance the scripted player, if it is their turn and a command is due.
    ///
    /// Returns the command applied, if any.
    ///
    /// # Errors
    ///
    /// Returns the rejection of a command that no longer applies, after
    /// dropping the rest of the queue.
    pub fn poll(&mut self, state: &mut GameState, now: Instant) -> RuleResult<Option<Command>> {
        if state.is_game_over() || !state.current_player().is_ai {
            self.cancel();
            return Ok(None);
        }
        if self.player != Some(state.current_player_id()) {
            self.cancel();
        }
        if self.queue.is_empty() {
            let plan = plan_turn(state, &self.config)?;
            self.load(plan, now);
            return Ok(None);
        }
        if self.next_at.is_some_and(|due| now < due) {
            return Ok(None);
        }

        let Some(command) = self.queue.pop_front() else {
            return Ok(None);
        };
        if let Err(rejection) = state.apply(command) {
            warn!(%command, %rejection, "queued opponent command rejected");
            self.cancel();
            return Err(rejection);
        }
        self.next_at = Some(now + self.delay());
        if self.queue.is_empty() {
            self.player = None;
        }
        Ok(Some(command))
    }

    /// Apply everything queued without pacing. Returns the number applied.
    ///
    /// # Errors
    ///
    /// Returns the first rejection, after dropping the rest of the queue.
    pub fn run_to_end(&mut self, state: &mut GameState) -> RuleResult<usize> {
        let mut applied = 0;
        while let Some(command) = self.queue.pop_front() {
            if let Err(rejection) = state.apply(command) {
                self.cancel();
                return Err(rejection);
            }
            assert_invariants(state);
            applied += 1;
        }
        self.cancel();
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GameConfig, GameMode};

    fn ai_game() -> GameState {
        let mut config = GameConfig::default();
        config.apply_mode(GameMode::AiVsAi);
        GameState::new(&config).unwrap()
    }

    fn driver() -> OpponentDriver {
        OpponentDriver::new(OpponentConfig {
            action_delay_ms: 100,
            deploy_when_idle: false,
        })
    }

    #[test]
    fn test_poll_paces_commands() {
        let mut game = ai_game();
        let mut driver = driver();
        let t0 = Instant::now();

        assert_eq!(driver.poll(&mut game, t0), Ok(None));
        assert!(!driver.is_idle());
        assert_eq!(driver.player(), Some(1));

        assert_eq!(driver.poll(&mut game, t0 + Duration::from_millis(50)), Ok(None));
        let first = driver.poll(&mut game, t0 + Duration::from_millis(100)).unwrap();
        assert_eq!(first, Some(Command::Roll));
        assert_eq!(driver.poll(&mut game, t0 + Duration::from_millis(150)), Ok(None));
        let second = driver.poll(&mut game, t0 + Duration::from_millis(200)).unwrap();
        assert!(matches!(second, Some(Command::Summon { .. })));
    }

    #[test]
    fn test_poll_ignores_human_turn() {
        let mut game = GameState::new(&GameConfig::default()).unwrap();
        let mut driver = driver();
        assert_eq!(driver.poll(&mut game, Instant::now()), Ok(None));
        assert!(driver.is_idle());
        assert_eq!(game.phase(), crate::game::Phase::Roll);
    }

    #[test]
    fn test_cancel_drops_queue() {
        let mut game = ai_game();
        let mut driver = driver();
        let t0 = Instant::now();
        driver.poll(&mut game, t0).unwrap();
        driver.cancel();
        assert!(driver.is_idle());
        assert_eq!(driver.player(), None);
        let before = game.clone();
        // Planning again happens on the next poll, nothing is applied yet.
        assert_eq!(driver.poll(&mut game, t0), Ok(None));
        assert_eq!(game.phase(), before.phase());
    }

    #[test]
    fn test_run_to_end_finishes_turn() {
        let mut game = ai_game();
        let mut driver = driver();
        let plan = plan_turn(&game, &OpponentConfig::default()).unwrap();
        let expected = plan.len();
        driver.load(plan, Instant::now());
        assert_eq!(driver.run_to_end(&mut game), Ok(expected));
        assert!(driver.is_idle());
        assert_eq!(game.current_player_id(), 2);
    }

    #[test]
    fn test_stale_command_rejected() {
        let mut game = ai_game();
        let mut driver = driver();
        let plan = plan_turn(&game, &OpponentConfig::default()).unwrap();
        let t0 = Instant::now();
        driver.load(plan, t0);
        // Someone else rolled in the meantime.
        game.roll_dice().unwrap();
        let result = driver.poll(&mut game, t0 + Duration::from_secs(1));
        assert!(result.is_err());
        assert!(driver.is_idle());
    }
}
