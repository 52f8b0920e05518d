//! Selection strategies
//!
//! ## Architecture
//! - Level 2: `SelectionStrategy::select` per strategy
//! - Level 3: root scoring under a deadline, shortlist construction
//! - Level 4: report bookkeeping

use freckers_core::{
    action_score, Action, AlphaBetaSearch, BoardState, MoveGenerator, ScoredAction, SearchStats,
    Side,
};
use freckers_rollout::{RolloutEvaluator, RolloutSelection};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::budget::TurnDeadline;
use crate::config::{EngineConfig, StrategyKind};

// ============================================================================
// TURN CONTEXT AND REPORT
// ============================================================================

/// Per-decision resources handed to a strategy
pub struct TurnContext<'a> {
    pub deadline: &'a TurnDeadline<'a>,
    pub rng: &'a mut ChaCha8Rng,
}

/// What a strategy did during one decision
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TurnReport {
    pub strategy: &'static str,
    /// Root actions given a search score
    pub candidates_scored: usize,
    pub nodes: u64,
    pub rollouts: u32,
    /// Win rate of the chosen candidate, when rollouts picked it
    pub win_rate: Option<f64>,
    /// The turn deadline cut the work short
    pub interrupted: bool,
    /// The game budget was already spent; no search ran
    pub exhausted: bool,
}

/// Chosen action, if any work completed, plus the report
#[derive(Clone, Debug)]
pub struct Selection {
    pub action: Option<Action>,
    pub report: TurnReport,
}

/// Picks one action for the side to move
pub trait SelectionStrategy {
    fn name(&self) -> &'static str;

    /// `None` when the deadline left no usable result
    fn select(&self, board: &BoardState, side: Side, turn: &mut TurnContext<'_>) -> Selection;
}

/// Build the strategy named in `config`
pub fn build_strategy(config: &EngineConfig) -> Box<dyn SelectionStrategy> {
    let movegen = config.movegen();
    match config.strategy {
        StrategyKind::Heuristic => Box::new(HeuristicStrategy::new(movegen)),
        StrategyKind::Search => {
            Box::new(SearchStrategy::new(AlphaBetaSearch::new(config.depth, movegen)))
        }
        StrategyKind::SearchWithRollouts => Box::new(RolloutStrategy::new(
            AlphaBetaSearch::new(config.depth, movegen),
            RolloutEvaluator::new(config.rollout.clone(), movegen),
        )),
    }
}

// ============================================================================
// HEURISTIC
// ============================================================================

/// Highest `action_score`; ties go to the first action generated
#[derive(Clone, Copy, Debug, Default)]
pub struct HeuristicStrategy {
    movegen: MoveGenerator,
}

impl HeuristicStrategy {
    pub fn new(movegen: MoveGenerator) -> Self {
        Self { movegen }
    }
}

impl SelectionStrategy for HeuristicStrategy {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn select(&self, board: &BoardState, side: Side, _turn: &mut TurnContext<'_>) -> Selection {
        let actions = self.movegen.legal_actions(board, side);
        let report = TurnReport {
            strategy: self.name(),
            candidates_scored: actions.len(),
            ..Default::default()
        };

        let mut best: Option<(i32, Action)> = None;
        for action in actions {
            let score = action_score(side, &action);
            if best.as_ref().map_or(true, |(s, _)| score > *s) {
                best = Some((score, action));
            }
        }

        Selection {
            action: best.map(|(_, a)| a),
            report,
        }
    }
}

// ============================================================================
// SEARCH
// ============================================================================

/// Score root children in generation order until the deadline trips
fn score_root(
    search: &AlphaBetaSearch,
    board: &BoardState,
    side: Side,
    deadline: &TurnDeadline<'_>,
    report: &mut TurnReport,
) -> Vec<ScoredAction> {
    let mut stats = SearchStats::default();
    let mut scored = Vec::new();

    for (action, child) in search.root_children(board, side) {
        if deadline.expired() {
            report.interrupted = true;
            break;
        }
        let score = search.score_child(&child, &mut stats);
        scored.push(ScoredAction {
            action,
            score,
            board: child.board,
        });
    }

    report.candidates_scored = scored.len();
    report.nodes = stats.nodes;
    scored
}

/// First action with the highest score
fn first_best(scored: Vec<ScoredAction>) -> Option<ScoredAction> {
    let mut best: Option<ScoredAction> = None;
    for s in scored {
        if best.as_ref().map_or(true, |b| s.score > b.score) {
            best = Some(s);
        }
    }
    best
}

/// Depth-limited alpha-beta over every root action
#[derive(Clone, Copy, Debug, Default)]
pub struct SearchStrategy {
    search: AlphaBetaSearch,
}

impl SearchStrategy {
    pub fn new(search: AlphaBetaSearch) -> Self {
        Self { search }
    }
}

impl SelectionStrategy for SearchStrategy {
    fn name(&self) -> &'static str {
        "search"
    }

    fn select(&self, board: &BoardState, side: Side, turn: &mut TurnContext<'_>) -> Selection {
        let mut report = TurnReport {
            strategy: self.name(),
            ..Default::default()
        };
        let scored = score_root(&self.search, board, side, turn.deadline, &mut report);
        Selection {
            action: first_best(scored).map(|s| s.action),
            report,
        }
    }
}

// ============================================================================
// SEARCH WITH ROLLOUTS
// ============================================================================

/// Alpha-beta ranks the root actions; rollouts decide among the top few
#[derive(Clone, Debug)]
pub struct RolloutStrategy {
    search: AlphaBetaSearch,
    evaluator: RolloutEvaluator,
}

impl RolloutStrategy {
    pub fn new(search: AlphaBetaSearch, evaluator: RolloutEvaluator) -> Self {
        Self { search, evaluator }
    }

    /// Top-K by search score, stable so equal scores keep generation order
    fn shortlist(&self, mut scored: Vec<ScoredAction>) -> Vec<ScoredAction> {
        scored.sort_by(|a, b| b.score.cmp(&a.score));
        scored.truncate(self.evaluator.config().candidates);
        scored
    }
}

impl SelectionStrategy for RolloutStrategy {
    fn name(&self) -> &'static str {
        "rollout"
    }

    fn select(&self, board: &BoardState, side: Side, turn: &mut TurnContext<'_>) -> Selection {
        let mut report = TurnReport {
            strategy: self.name(),
            ..Default::default()
        };

        let scored = score_root(&self.search, board, side, turn.deadline, &mut report);
        let shortlist = self.shortlist(scored);
        // best by search alone, used when no playout finishes in time
        let fallback = shortlist.first().map(|s| s.action.clone());

        let deadline = turn.deadline;
        let candidates = shortlist.into_iter().map(|s| (s.action, s.board)).collect();
        let selection: RolloutSelection =
            self.evaluator.select(candidates, side, turn.rng, || deadline.expired());

        report.rollouts = selection.total_playouts();
        report.interrupted |= selection.interrupted;
        report.win_rate = selection.best_estimate().map(|e| e.win_rate());

        Selection {
            action: selection.best_action().cloned().or(fallback),
            report,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::VirtualClock;
    use freckers_core::{Coord, Direction, SquareSet};
    use freckers_rollout::RolloutConfig;
    use rand::SeedableRng;
    use std::time::Duration;

    fn set(coords: &[(i8, i8)]) -> SquareSet {
        coords.iter().map(|&(r, c)| Coord::new(r, c)).collect()
    }

    fn run(
        strategy: &dyn SelectionStrategy,
        board: &BoardState,
        side: Side,
        clock: &VirtualClock,
        limit: Duration,
    ) -> Selection {
        let deadline = TurnDeadline::start(clock, limit);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut turn = TurnContext { deadline: &deadline, rng: &mut rng };
        strategy.select(board, side, &mut turn)
    }

    /// One second on a clock that never moves
    fn run_untimed(strategy: &dyn SelectionStrategy, board: &BoardState, side: Side) -> Selection {
        run(strategy, board, side, &VirtualClock::new(), Duration::from_secs(1))
    }

    #[test]
    fn test_build_strategy_names() {
        assert_eq!(build_strategy(&EngineConfig::heuristic()).name(), "heuristic");
        assert_eq!(build_strategy(&EngineConfig::search(2)).name(), "search");
        assert_eq!(build_strategy(&EngineConfig::default()).name(), "rollout");
    }

    #[test]
    fn test_heuristic_ties_to_first_generated() {
        let strategy = HeuristicStrategy::default();
        let selection = run_untimed(&strategy, &BoardState::new_game(), Side::Red);
        // forward steps and the two opening jumps all score 2; (0,1) Down comes first
        assert_eq!(
            selection.action,
            Some(Action::Step { origin: Coord::new(0, 1), direction: Direction::Down })
        );
    }

    #[test]
    fn test_heuristic_grows_when_stuck() {
        let board =
            BoardState::from_parts(set(&[(3, 3)]), SquareSet::EMPTY, SquareSet::EMPTY).unwrap();
        let selection = run_untimed(&HeuristicStrategy::default(), &board, Side::Red);
        assert_eq!(selection.action, Some(Action::Grow));
    }

    #[test]
    fn test_search_scores_every_root_action() {
        let strategy = SearchStrategy::new(AlphaBetaSearch::default());
        let start = BoardState::new_game();
        let selection = run_untimed(&strategy, &start, Side::Blue);
        let legal = MoveGenerator::default().legal_actions(&start, Side::Blue);
        assert_eq!(selection.report.candidates_scored, legal.len());
        assert!(!selection.report.interrupted);
        assert!(legal.contains(selection.action.as_ref().unwrap()));
    }

    #[test]
    fn test_search_deadline_stops_scoring() {
        // every clock read costs 1s against a 2.5s limit
        let clock = VirtualClock::with_tick(Duration::from_secs(1));
        let strategy = SearchStrategy::new(AlphaBetaSearch::default());
        let limit = Duration::from_millis(2500);
        let selection = run(&strategy, &BoardState::new_game(), Side::Red, &clock, limit);
        assert!(selection.report.interrupted);
        assert!(selection.report.candidates_scored > 0);
        assert!(selection.action.is_some());
    }

    #[test]
    fn test_search_expired_before_start() {
        let clock = VirtualClock::with_tick(Duration::from_secs(10));
        let strategy = SearchStrategy::new(AlphaBetaSearch::default());
        let limit = Duration::from_secs(1);
        let selection = run(&strategy, &BoardState::new_game(), Side::Red, &clock, limit);
        assert_eq!(selection.action, None);
        assert_eq!(selection.report.candidates_scored, 0);
    }

    #[test]
    fn test_rollout_strategy_runs_playouts() {
        let config =
            EngineConfig::default().with_rollout(RolloutConfig::default().with_playouts(3));
        let strategy = build_strategy(&config);
        let selection = run_untimed(strategy.as_ref(), &BoardState::new_game(), Side::Red);
        assert_eq!(selection.report.rollouts, 4 * 3);
        assert!(selection.report.win_rate.is_some());
        assert!(selection.action.is_some());
    }

    #[test]
    fn test_rollout_strategy_falls_back_to_search() {
        // polls at 1s and 2s pass, the one at 3s trips before any playout
        let clock = VirtualClock::with_tick(Duration::from_secs(1));
        let strategy = build_strategy(&EngineConfig::default());
        let limit = Duration::from_millis(2500);
        let selection = run(strategy.as_ref(), &BoardState::new_game(), Side::Red, &clock, limit);
        assert!(selection.report.interrupted);
        assert_eq!(selection.report.rollouts, 0);
        assert_eq!(selection.report.win_rate, None);
        assert!(selection.action.is_some());
    }

    #[test]
    fn test_shortlist_is_stable() {
        let strategy = RolloutStrategy::new(
            AlphaBetaSearch::default(),
            RolloutEvaluator::new(
                RolloutConfig::default().with_candidates(2),
                MoveGenerator::default(),
            ),
        );
        let board = BoardState::new_game();
        let entry = |action: Action, score| ScoredAction { action, score, board };
        let a = Action::Step { origin: Coord::new(0, 1), direction: Direction::Down };
        let b = Action::Step { origin: Coord::new(0, 2), direction: Direction::Down };
        let list =
            strategy.shortlist(vec![entry(Action::Grow, 0), entry(a.clone(), 1), entry(b, 1)]);
        let actions: Vec<_> = list.into_iter().map(|s| s.action).collect();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0], a);
    }
}
