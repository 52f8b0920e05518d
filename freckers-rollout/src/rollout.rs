//! Single playouts and the policies that drive them
//!
//! ## Architecture
//! - Level 3: single playout
//! - Level 4: action selection

use freckers_core::{evaluate, Action, BoardState, MoveGenerator, Side};
use rand::prelude::*;

// ============================================================================
// PLAYOUT RESULT
// ============================================================================

/// Outcome of one simulated game
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayoutResult {
    pub winner: Side,
    /// Plies played before the playout ended
    pub plies: u32,
    /// True when a side reached its goal row, false when the horizon ran out
    pub terminal: bool,
}

// ============================================================================
// POLICIES (Level 4)
// ============================================================================

/// Chooses which successor a playout follows
pub trait RolloutPolicy {
    /// Index into `successors` (never empty)
    fn select<R: Rng>(&self, side: Side, successors: &[(Action, BoardState)], rng: &mut R) -> usize;
}

/// Every action equally likely
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformPolicy;

impl RolloutPolicy for UniformPolicy {
    fn select<R: Rng>(
        &self,
        _side: Side,
        successors: &[(Action, BoardState)],
        rng: &mut R,
    ) -> usize {
        rng.gen_range(0..successors.len())
    }
}

/// Greedy with probability `greedy_probability`, uniform otherwise.
///
/// The greedy choice maximises the mover's own one-ply evaluation; ties go
/// to the first action generated.
#[derive(Clone, Copy, Debug)]
pub struct EpsilonGreedy {
    pub greedy_probability: f64,
}

impl EpsilonGreedy {
    pub fn new(greedy_probability: f64) -> Self {
        Self {
            greedy_probability: greedy_probability.clamp(0.0, 1.0),
        }
    }
}

impl RolloutPolicy for EpsilonGreedy {
    fn select<R: Rng>(
        &self,
        side: Side,
        successors: &[(Action, BoardState)],
        rng: &mut R,
    ) -> usize {
        if rng.gen::<f64>() < self.greedy_probability {
            greedy_index(side, successors)
        } else {
            rng.gen_range(0..successors.len())
        }
    }
}

/// First successor with the best evaluation for `side`
pub fn greedy_index(side: Side, successors: &[(Action, BoardState)]) -> usize {
    let mut best = 0;
    let mut best_score = i32::MIN;
    for (i, (_, board)) in successors.iter().enumerate() {
        let score = evaluate(board, side);
        if score > best_score {
            best_score = score;
            best = i;
        }
    }
    best
}

/// First successor that puts a piece of `side` on its goal row
fn winning_index(side: Side, successors: &[(Action, BoardState)]) -> Option<usize> {
    successors.iter().position(|(_, board)| board.reached_goal(side))
}

// ============================================================================
// PLAYOUT (Level 3)
// ============================================================================

/// Simulate from `board` with `to_move` to act.
///
/// Ends the instant a side reaches its goal row. A side that can win on the
/// spot always does. At the horizon the winner is `perspective` when its
/// static evaluation is strictly positive, otherwise its opponent.
pub fn playout<P: RolloutPolicy, R: Rng>(
    board: &BoardState,
    to_move: Side,
    perspective: Side,
    horizon: u32,
    movegen: &MoveGenerator,
    policy: &P,
    rng: &mut R,
) -> PlayoutResult {
    if let Some(winner) = board.winner() {
        return PlayoutResult {
            winner,
            plies: 0,
            terminal: true,
        };
    }

    let mut current = *board;
    let mut side = to_move;

    for ply in 1..=horizon {
        let mut successors = movegen.successors(&current, side);

        let index = winning_index(side, &successors)
            .unwrap_or_else(|| policy.select(side, &successors, rng));
        current = successors.swap_remove(index).1;

        if current.reached_goal(side) {
            return PlayoutResult {
                winner: side,
                plies: ply,
                terminal: true,
            };
        }
        side = side.opponent();
    }

    let winner = if evaluate(&current, perspective) > 0 {
        perspective
    } else {
        perspective.opponent()
    };
    PlayoutResult {
        winner,
        plies: horizon,
        terminal: false,
    }
}

// ============================================================================
// TESTS
// ============================================================================
