//! Freckers Rollout - Playout-based move evaluation
//!
//! This crate estimates how often a candidate action wins:
//! - Playout policies (uniform, epsilon-greedy)
//! - Single playouts with goal detection and a ply horizon
//! - Candidate win-rate estimation and selection
//!
//! ## Architecture
//! - Level 2: candidate selection (evaluator)
//! - Level 3: single playout
//! - Level 4: action selection policies

pub mod evaluator;
pub mod rollout;

pub use evaluator::{CandidateEstimate, RolloutEvaluator, RolloutSelection};
pub use rollout::{playout, EpsilonGreedy, PlayoutResult, RolloutPolicy, UniformPolicy};

use serde::{Deserialize, Serialize};

/// Rollout configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RolloutConfig {
    /// Shortlist size taken from the search ranking
    pub candidates: usize,
    /// Playouts per candidate
    pub playouts: u32,
    /// Plies per playout before falling back to static evaluation
    pub horizon: u32,
    /// Chance of a greedy (one-ply best) choice instead of a uniform one
    pub greedy_probability: f64,
}

impl Default for RolloutConfig {
    fn default() -> Self {
        Self {
            candidates: 4,
            playouts: 20,
            horizon: 20,
            greedy_probability: 0.2,
        }
    }
}

impl RolloutConfig {
    /// Fully greedy playouts: no randomness reaches the chosen actions
    pub fn greedy() -> Self {
        Self {
            greedy_probability: 1.0,
            ..Default::default()
        }
    }

    pub fn with_playouts(mut self, playouts: u32) -> Self {
        self.playouts = playouts;
        self
    }

    pub fn with_candidates(mut self, candidates: usize) -> Self {
        self.candidates = candidates;
        self
    }
}
