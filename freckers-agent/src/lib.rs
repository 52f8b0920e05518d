//! Freckers Agent - Budgeted game-playing engine
//!
//! This crate turns the search and rollout machinery into a player:
//! - Engine configuration with JSON loading
//! - Pluggable selection strategies (heuristic, search, search with rollouts)
//! - Per-game and per-turn compute budgets with injectable clocks
//! - The engine lifecycle: initialize, decide, notify
//!
//! ## Architecture
//! - Level 1: engine (`decide` / `notify`)
//! - Level 2: selection strategies
//! - Level 3: budgets and deadlines
//! - Level 4: configuration

pub mod budget;
pub mod config;
pub mod engine;
pub mod strategy;

pub use budget::{Clock, GameBudget, ProcessClock, SystemClock, TurnDeadline, VirtualClock};
pub use config::{BudgetConfig, ConfigError, EngineConfig, StrategyKind, DEFAULT_SEED};
pub use engine::{Decision, Engine, EngineError};
pub use strategy::{
    build_strategy, HeuristicStrategy, RolloutStrategy, SearchStrategy, Selection,
    SelectionStrategy, TurnContext, TurnReport,
};
