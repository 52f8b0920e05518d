use thiserror::Error;

use crate::board::{Coord, Direction};
use crate::game::Side;

/// Errors raised when a board or an action breaks the game rules
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("both sides occupy {0}")]
    OverlappingPieces(Coord),

    #[error("no {side} piece at {origin}")]
    NoPieceAtOrigin { side: Side, origin: Coord },

    #[error("{direction:?} is a backward direction for {side}")]
    BackwardDirection { side: Side, direction: Direction },

    #[error("step from {origin} toward {direction:?} leaves the board")]
    StepOffBoard { origin: Coord, direction: Direction },

    #[error("step destination {0} has no tile or is occupied")]
    StepBlocked(Coord),

    #[error("jump action carries no hops")]
    EmptyJump,

    #[error("hop {hop} of jump from {origin} toward {direction:?} does not resolve to a free tile")]
    IllegalHop {
        origin: Coord,
        hop: usize,
        direction: Direction,
    },
}

/// Convenience Result type for game operations
pub type Result<T> = std::result::Result<T, GameError>;
