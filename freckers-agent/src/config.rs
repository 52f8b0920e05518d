//! Engine configuration
//!
//! Level 4 - Utilities and configuration

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use freckers_core::{JumpPolicy, MoveGenerator, DEFAULT_DEPTH};
use freckers_rollout::RolloutConfig;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Seed used when the configuration does not name one
pub const DEFAULT_SEED: u64 = 42;

/// Default per-game and per-turn compute ceiling (3 minutes)
pub const DEFAULT_LIMIT_MS: u64 = 180_000;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("unknown strategy '{0}' (expected heuristic, search or rollout)")]
    UnknownStrategy(String),
    #[error("greedy probability {0} is outside [0, 1]")]
    InvalidProbability(f64),
    #[error("rollout shortlist must hold at least one candidate")]
    EmptyShortlist,
    #[error("turn limit must be positive")]
    ZeroTurnLimit,
}

/// How the engine picks its action
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyKind {
    /// One-ply action scoring
    Heuristic,
    /// Depth-limited alpha-beta over every root action
    Search,
    /// Alpha-beta shortlist refined by rollout win rates
    #[default]
    SearchWithRollouts,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StrategyKind::Heuristic => "heuristic",
            StrategyKind::Search => "search",
            StrategyKind::SearchWithRollouts => "rollout",
        };
        f.write_str(name)
    }
}

impl FromStr for StrategyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "heuristic" | "greedy" => Ok(StrategyKind::Heuristic),
            "search" | "minimax" => Ok(StrategyKind::Search),
            "rollout" | "rollouts" | "search-with-rollouts" => Ok(StrategyKind::SearchWithRollouts),
            _ => Err(ConfigError::UnknownStrategy(s.to_string())),
        }
    }
}

/// Compute ceilings in milliseconds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetConfig {
    /// Total compute the engine may spend over one game
    pub game_limit_ms: u64,
    /// Wall-clock limit for a single decision
    pub turn_limit_ms: u64,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            game_limit_ms: DEFAULT_LIMIT_MS,
            turn_limit_ms: DEFAULT_LIMIT_MS,
        }
    }
}

/// Engine configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub strategy: StrategyKind,
    /// Alpha-beta depth in plies
    pub depth: u32,
    pub jump_policy: JumpPolicy,
    pub rollout: RolloutConfig,
    pub budget: BudgetConfig,
    /// Random seed for reproducibility (None = entropy)
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            depth: DEFAULT_DEPTH,
            jump_policy: JumpPolicy::default(),
            rollout: RolloutConfig::default(),
            budget: BudgetConfig::default(),
            seed: Some(DEFAULT_SEED),
        }
    }
}

impl EngineConfig {
    /// One-ply heuristic player
    pub fn heuristic() -> Self {
        Self {
            strategy: StrategyKind::Heuristic,
            ..Default::default()
        }
    }

    /// Search-only player at the given depth
    pub fn search(depth: u32) -> Self {
        Self {
            strategy: StrategyKind::Search,
            depth,
            ..Default::default()
        }
    }

    /// Search with fully greedy rollouts, so every decision is reproducible
    pub fn deterministic() -> Self {
        Self {
            rollout: RolloutConfig::greedy(),
            ..Default::default()
        }
    }

    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_jump_policy(mut self, jump_policy: JumpPolicy) -> Self {
        self.jump_policy = jump_policy;
        self
    }

    pub fn with_rollout(mut self, rollout: RolloutConfig) -> Self {
        self.rollout = rollout;
        self
    }

    pub fn with_budget(mut self, budget: BudgetConfig) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn movegen(&self) -> MoveGenerator {
        MoveGenerator::new(self.jump_policy)
    }

    /// RNG from the configured seed, or from entropy when unseeded
    pub fn rng(&self) -> ChaCha8Rng {
        match self.seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_entropy(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = self.rollout.greedy_probability;
        if !(0.0..=1.0).contains(&p) {
            return Err(ConfigError::InvalidProbability(p));
        }
        if self.rollout.candidates == 0 {
            return Err(ConfigError::EmptyShortlist);
        }
        if self.budget.turn_limit_ms == 0 {
            return Err(ConfigError::ZeroTurnLimit);
        }
        Ok(())
    }

    /// Load from a JSON file; missing fields keep their defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read engine config: {}", path.display()))?;
        let config: EngineConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse engine config: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write engine config: {}", path.display()))?;
        Ok(())
    }
}
