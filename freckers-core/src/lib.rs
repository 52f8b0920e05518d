//! Freckers Core - Board, rules and search
//!
//! This crate provides the game logic the engine is built on:
//! - Board geometry (8x8 grid, 64-bit square sets)
//! - Board state, actions and rule-checked application
//! - Move generation with recursive jump-chain search
//! - Progress evaluation
//! - Depth-limited alpha-beta search over game tree nodes

pub mod board;
pub mod error;
pub mod game;
pub mod movegen;
pub mod eval;
pub mod ai;

// Re-exports for convenient access
pub use board::{Coord, Direction, SquareSet, ALL_DIRECTIONS, BOARD_SIZE};
pub use error::GameError;
pub use game::{Action, BoardState, Side};
pub use movegen::{JumpChain, JumpPolicy, MoveGenerator};
pub use eval::{action_score, evaluate, progress};
pub use ai::{
    alpha_beta, minimax, AlphaBetaSearch, ScoredAction, SearchNode, SearchStats, DEFAULT_DEPTH,
};
