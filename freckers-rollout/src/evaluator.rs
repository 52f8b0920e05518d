//! Candidate win-rate estimation
//!
//! Level 2 - runs the playouts for a shortlist of candidate actions and
//! picks the one that wins most often.

use freckers_core::{Action, BoardState, MoveGenerator, Side};
use rand::Rng;

use crate::rollout::{playout, EpsilonGreedy, RolloutPolicy};
use crate::RolloutConfig;

/// Playout tally for one candidate
#[derive(Clone, Debug, PartialEq)]
pub struct CandidateEstimate {
    pub action: Action,
    pub wins: u32,
    /// Playouts actually completed (short of the target when interrupted)
    pub played: u32,
    /// Configured playouts per candidate
    pub target: u32,
}

impl CandidateEstimate {
    /// Wins over the configured playout count
    pub fn win_rate(&self) -> f64 {
        if self.target == 0 {
            0.0
        } else {
            self.wins as f64 / self.target as f64
        }
    }
}

/// Result of evaluating a shortlist
#[derive(Clone, Debug, Default)]
pub struct RolloutSelection {
    /// Estimates for every candidate that started, in shortlist order
    pub estimates: Vec<CandidateEstimate>,
    /// Index into `estimates` of the chosen candidate
    pub best: Option<usize>,
    /// True when `should_stop` cut the loop short
    pub interrupted: bool,
}

impl RolloutSelection {
    pub fn best_estimate(&self) -> Option<&CandidateEstimate> {
        self.best.map(|i| &self.estimates[i])
    }

    pub fn best_action(&self) -> Option<&Action> {
        self.best_estimate().map(|e| &e.action)
    }

    pub fn total_playouts(&self) -> u32 {
        self.estimates.iter().map(|e| e.played).sum()
    }
}

/// Rollout evaluator with a pluggable playout policy
#[derive(Clone, Debug)]
pub struct RolloutEvaluator<P = EpsilonGreedy> {
    config: RolloutConfig,
    movegen: MoveGenerator,
    policy: P,
}

impl RolloutEvaluator<EpsilonGreedy> {
    /// Epsilon-greedy playouts as configured
    pub fn new(config: RolloutConfig, movegen: MoveGenerator) -> Self {
        let policy = EpsilonGreedy::new(config.greedy_probability);
        Self {
            config,
            movegen,
            policy,
        }
    }
}

impl<P: RolloutPolicy> RolloutEvaluator<P> {
    pub fn with_policy(config: RolloutConfig, movegen: MoveGenerator, policy: P) -> Self {
        Self {
            config,
            movegen,
            policy,
        }
    }

    pub fn config(&self) -> &RolloutConfig {
        &self.config
    }

    /// Run playouts from `after` (the board once `action` is played by
    /// `perspective`), with the opponent to move.
    ///
    /// `should_stop` is polled before and after every playout.
    pub fn estimate<R: Rng, F: FnMut() -> bool>(
        &self,
        action: Action,
        after: &BoardState,
        perspective: Side,
        rng: &mut R,
        should_stop: &mut F,
    ) -> (CandidateEstimate, bool) {
        let mut estimate = CandidateEstimate {
            action,
            wins: 0,
            played: 0,
            target: self.config.playouts,
        };

        for _ in 0..self.config.playouts {
            if should_stop() {
                return (estimate, true);
            }
            let result = playout(
                after,
                perspective.opponent(),
                perspective,
                self.config.horizon,
                &self.movegen,
                &self.policy,
                rng,
            );
            estimate.played += 1;
            if result.winner == perspective {
                estimate.wins += 1;
            }
            if should_stop() {
                let truncated = estimate.played < self.config.playouts;
                return (estimate, truncated);
            }
        }

        (estimate, false)
    }

    /// Estimate each candidate in order and keep the highest win rate.
    ///
    /// Ties keep the earlier candidate, so the shortlist order is the
    /// tie-break.
    pub fn select<R: Rng, F: FnMut() -> bool>(
        &self,
        candidates: Vec<(Action, BoardState)>,
        perspective: Side,
        rng: &mut R,
        mut should_stop: F,
    ) -> RolloutSelection {
        let mut selection = RolloutSelection::default();

        for (action, after) in candidates {
            if should_stop() {
                selection.interrupted = true;
                break;
            }

            let (estimate, interrupted) =
                self.estimate(action, &after, perspective, rng, &mut should_stop);
            let better = selection
                .best_estimate()
                .map_or(true, |best| estimate.win_rate() > best.win_rate());
            if better && estimate.played > 0 {
                selection.best = Some(selection.estimates.len());
            }
            selection.estimates.push(estimate);

            if interrupted {
                selection.interrupted = true;
                break;
            }
        }

        selection
    }
}
