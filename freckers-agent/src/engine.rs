//! The engine: mirrored board, strategy and budget for one side
//!
//! ## Architecture
//! - Level 1: `decide` / `notify`
//! - Level 2: budget check, timed strategy call, budget charge

use freckers_core::{Action, BoardState, GameError, Side};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use crate::budget::{Clock, GameBudget, ProcessClock, SystemClock, TurnDeadline};
use crate::config::EngineConfig;
use crate::strategy::{build_strategy, SelectionStrategy, TurnContext, TurnReport};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The host sent an action that does not resolve on the mirrored board
    #[error("host action rejected: {0}")]
    Rejected(#[from] GameError),
}

/// Outcome of one decision
#[derive(Clone, Debug)]
pub struct Decision {
    pub action: Action,
    /// Budget after charging this turn's compute
    pub budget: GameBudget,
    pub report: TurnReport,
}

/// Game-playing engine for one side.
///
/// `wall` bounds each turn; `compute` is what the game budget is charged
/// with, so time off the CPU is never charged to the game.
pub struct Engine<W: Clock = SystemClock, P: Clock = ProcessClock> {
    side: Side,
    board: BoardState,
    config: EngineConfig,
    strategy: Box<dyn SelectionStrategy>,
    budget: GameBudget,
    wall: W,
    compute: P,
    rng: ChaCha8Rng,
}

impl Engine {
    /// Engine with the reference configuration, at the starting position
    pub fn initialize(side: Side) -> Self {
        Self::new(side, EngineConfig::default())
    }

    pub fn new(side: Side, config: EngineConfig) -> Self {
        Self::with_clocks(side, config, SystemClock::new(), ProcessClock::new())
    }
}

impl<C: Clock + Clone> Engine<C, C> {
    /// One clock for both the turn deadline and the game budget
    pub fn with_clock(side: Side, config: EngineConfig, clock: C) -> Self {
        Self::with_clocks(side, config, clock.clone(), clock)
    }
}

impl<W: Clock, P: Clock> Engine<W, P> {
    pub fn with_clocks(side: Side, config: EngineConfig, wall: W, compute: P) -> Self {
        Self {
            side,
            board: BoardState::new_game(),
            strategy: build_strategy(&config),
            budget: GameBudget::from_config(&config.budget),
            rng: config.rng(),
            config,
            wall,
            compute,
        }
    }

    /// Start from `board` instead of the opening position
    pub fn with_board(mut self, board: BoardState) -> Self {
        self.board = board;
        self
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn board(&self) -> &BoardState {
        &self.board
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn budget(&self) -> GameBudget {
        self.budget
    }

    pub fn set_budget(&mut self, budget: GameBudget) {
        self.budget = budget;
    }

    /// Choose an action, charging the engine's own budget
    pub fn decide(&mut self) -> Action {
        let decision = self.decide_with_budget(self.budget);
        self.budget = decision.budget;
        decision.action
    }

    /// Choose an action under `budget` and return the charged budget.
    ///
    /// Never fails: `Grow` stands in whenever nothing better is available.
    pub fn decide_with_budget(&mut self, budget: GameBudget) -> Decision {
        if budget.is_exhausted() {
            tracing::warn!(
                side = %self.side,
                consumed_ms = budget.consumed.as_millis() as u64,
                "Game budget exhausted, growing"
            );
            return Decision {
                action: Action::Grow,
                budget,
                report: TurnReport {
                    strategy: self.strategy.name(),
                    exhausted: true,
                    ..Default::default()
                },
            };
        }

        let compute_start = self.compute.now();
        let deadline = TurnDeadline::start(&self.wall, budget.turn_limit);
        let mut turn = TurnContext {
            deadline: &deadline,
            rng: &mut self.rng,
        };
        let selection = self.strategy.select(&self.board, self.side, &mut turn);
        let elapsed = deadline.elapsed();
        let compute = self.compute.now().saturating_sub(compute_start);

        if deadline.tripped() {
            tracing::warn!(
                side = %self.side,
                limit_ms = deadline.limit().as_millis() as u64,
                "Turn deadline reached, using best result so far"
            );
        }

        let action = selection.action.unwrap_or(Action::Grow);
        let report = selection.report;
        tracing::debug!(
            side = %self.side,
            strategy = report.strategy,
            elapsed_ms = elapsed.as_millis() as u64,
            compute_ms = compute.as_millis() as u64,
            candidates = report.candidates_scored,
            rollouts = report.rollouts,
            nodes = report.nodes,
            "Decided {}",
            action
        );

        Decision {
            action,
            budget: budget.charge(compute),
            report,
        }
    }

    /// Apply an action the host has already accepted, by either side
    pub fn notify(&mut self, side: Side, action: &Action) -> Result<(), EngineError> {
        self.board = self.board.apply(side, action)?;
        tracing::trace!(%side, "Applied {}", action);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::VirtualClock;
    use crate::config::StrategyKind;
    use freckers_core::{Coord, Direction, MoveGenerator};
    use std::rc::Rc;
    use std::time::Duration;

    #[test]
    fn test_initialize() {
        let engine = Engine::initialize(Side::Blue);
        assert_eq!(engine.side(), Side::Blue);
        assert_eq!(*engine.board(), BoardState::new_game());
        assert_eq!(engine.budget().consumed, Duration::ZERO);
    }

    #[test]
    fn test_decide_is_legal() {
        let kinds = [
            StrategyKind::Heuristic,
            StrategyKind::Search,
            StrategyKind::SearchWithRollouts,
        ];
        for kind in kinds {
            let mut engine = Engine::new(Side::Red, EngineConfig::default().with_strategy(kind));
            let action = engine.decide();
            let legal = MoveGenerator::default().legal_actions(engine.board(), Side::Red);
            assert!(legal.contains(&action), "{} chose {}", kind, action);
        }
    }

    #[test]
    fn test_decide_charges_budget() {
        let clock = Rc::new(VirtualClock::with_tick(Duration::from_millis(1)));
        let config = EngineConfig::search(1);
        let mut engine = Engine::with_clock(Side::Red, config, Rc::clone(&clock));
        let before = engine.budget();
        let decision = engine.decide_with_budget(before);
        assert!(decision.budget.consumed > Duration::ZERO);
        // the passed-in value is returned updated, the stored one is not touched
        assert_eq!(engine.budget(), before);

        engine.decide();
        assert!(engine.budget().consumed > Duration::ZERO);
    }

    #[test]
    fn test_budget_charged_with_compute_not_wall_time() {
        let wall = Rc::new(VirtualClock::with_tick(Duration::from_secs(1)));
        let compute = Rc::new(VirtualClock::with_tick(Duration::from_millis(3)));
        let config = EngineConfig::search(1).with_budget(crate::config::BudgetConfig {
            game_limit_ms: 10_000_000,
            turn_limit_ms: 10_000_000,
        });
        let mut engine =
            Engine::with_clocks(Side::Red, config, Rc::clone(&wall), Rc::clone(&compute));

        let decision = engine.decide_with_budget(engine.budget());
        // compute is read once before and once after the strategy runs
        assert_eq!(compute.reads(), 2);
        assert_eq!(decision.budget.consumed, Duration::from_millis(3));
        assert!(wall.now() > Duration::from_secs(1));
        assert!(!decision.report.interrupted);
    }

    #[test]
    fn test_exhausted_budget_grows_without_clock() {
        let clock = Rc::new(VirtualClock::new());
        let mut engine =
            Engine::with_clock(Side::Red, EngineConfig::default(), Rc::clone(&clock));
        let spent = engine.budget().with_consumed(Duration::from_secs(180));

        let decision = engine.decide_with_budget(spent);
        assert_eq!(decision.action, Action::Grow);
        assert_eq!(decision.budget, spent);
        assert!(decision.report.exhausted);
        assert_eq!(clock.reads(), 0);
    }

    #[test]
    fn test_turn_deadline_returns_an_action() {
        let clock = Rc::new(VirtualClock::with_tick(Duration::from_secs(1)));
        let config = EngineConfig::default().with_budget(crate::config::BudgetConfig {
            game_limit_ms: 1_000_000,
            turn_limit_ms: 1_500,
        });
        let mut engine = Engine::with_clock(Side::Blue, config, Rc::clone(&clock));
        let decision = engine.decide_with_budget(engine.budget());
        assert!(decision.report.interrupted);
        let legal = MoveGenerator::default().legal_actions(engine.board(), Side::Blue);
        assert!(legal.contains(&decision.action));
    }

    #[test]
    fn test_notify_tracks_both_sides() {
        let mut engine = Engine::initialize(Side::Red);
        let red = Action::Step { origin: Coord::new(0, 3), direction: Direction::Down };
        let blue = Action::Step { origin: Coord::new(7, 3), direction: Direction::Up };
        engine.notify(Side::Red, &red).unwrap();
        engine.notify(Side::Blue, &blue).unwrap();

        let board = engine.board();
        assert!(board.pieces(Side::Red).contains(Coord::new(1, 3)));
        assert!(board.pieces(Side::Blue).contains(Coord::new(6, 3)));
        assert!(!board.has_tile(Coord::new(0, 3)));
    }

    #[test]
    fn test_notify_rejects_unresolvable_action() {
        let mut engine = Engine::initialize(Side::Red);
        let before = *engine.board();
        // no piece at (3,3)
        let bogus = Action::Step { origin: Coord::new(3, 3), direction: Direction::Down };
        let err = engine.notify(Side::Red, &bogus).unwrap_err();
        assert!(matches!(err, EngineError::Rejected(GameError::NoPieceAtOrigin { .. })));
        assert_eq!(*engine.board(), before);
    }
}
