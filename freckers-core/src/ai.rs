//! Game tree nodes and depth-limited alpha-beta search

use crate::eval::evaluate;
use crate::game::{Action, BoardState, Side};
use crate::movegen::MoveGenerator;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Default search depth in plies
pub const DEFAULT_DEPTH: u32 = 2;

// ============================================================================
// GAME TREE NODE
// ============================================================================

/// A position in the search tree.
///
/// `perspective` is fixed for the whole tree; `maximizing` flips every ply
/// and decides whose turn it is at this node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchNode {
    pub board: BoardState,
    pub maximizing: bool,
    pub perspective: Side,
    pub depth: u32,
    pub max_depth: u32,
}

impl SearchNode {
    /// Root node with `perspective` to move
    pub fn root(board: BoardState, perspective: Side, max_depth: u32) -> Self {
        Self {
            board,
            maximizing: true,
            perspective,
            depth: 0,
            max_depth,
        }
    }

    pub fn side_to_move(&self) -> Side {
        if self.maximizing {
            self.perspective
        } else {
            self.perspective.opponent()
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.depth >= self.max_depth
    }

    /// Static evaluation from the tree's perspective
    pub fn evaluate(&self) -> i32 {
        evaluate(&self.board, self.perspective)
    }

    /// One child per legal action of the side to move
    pub fn children(&self, movegen: &MoveGenerator) -> Vec<(Action, SearchNode)> {
        movegen
            .successors(&self.board, self.side_to_move())
            .into_iter()
            .map(|(action, board)| {
                let child = SearchNode {
                    board,
                    maximizing: !self.maximizing,
                    perspective: self.perspective,
                    depth: self.depth + 1,
                    max_depth: self.max_depth,
                };
                (action, child)
            })
            .collect()
    }
}

// ============================================================================
// ALPHA-BETA
// ============================================================================

/// Counters collected while searching
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: u64,
    pub leaves: u64,
    pub cutoffs: u64,
}

/// Fail-hard alpha-beta minimax.
///
/// With a full `(i32::MIN, i32::MAX)` window the result equals
/// [`minimax`] on the same node.
pub fn alpha_beta(
    node: &SearchNode,
    mut alpha: i32,
    mut beta: i32,
    movegen: &MoveGenerator,
    stats: &mut SearchStats,
) -> i32 {
    stats.nodes += 1;

    if node.is_leaf() {
        stats.leaves += 1;
        return node.evaluate();
    }

    if node.maximizing {
        for (_, child) in node.children(movegen) {
            let value = alpha_beta(&child, alpha, beta, movegen, stats);
            if value >= beta {
                stats.cutoffs += 1;
                return value;
            }
            alpha = alpha.max(value);
        }
        alpha
    } else {
        for (_, child) in node.children(movegen) {
            let value = alpha_beta(&child, alpha, beta, movegen, stats);
            if value <= alpha {
                stats.cutoffs += 1;
                return value;
            }
            beta = beta.min(value);
        }
        beta
    }
}

/// Exhaustive minimax without pruning
pub fn minimax(node: &SearchNode, movegen: &MoveGenerator) -> i32 {
    if node.is_leaf() {
        return node.evaluate();
    }

    let values = node
        .children(movegen)
        .into_iter()
        .map(|(_, child)| minimax(&child, movegen));

    // children always include Grow, so the iterator is never empty
    let best = if node.maximizing { values.max() } else { values.min() };
    best.unwrap_or_else(|| node.evaluate())
}

// ============================================================================
// ROOT SEARCH
// ============================================================================

/// A root action with its backed-up search value
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoredAction {
    pub action: Action,
    pub score: i32,
    /// Board after `action`
    pub board: BoardState,
}

/// Depth-limited alpha-beta player
#[derive(Clone, Copy, Debug)]
pub struct AlphaBetaSearch {
    pub depth: u32,
    pub movegen: MoveGenerator,
}

impl AlphaBetaSearch {
    pub fn new(depth: u32, movegen: MoveGenerator) -> Self {
        Self { depth, movegen }
    }

    /// Root children for `side`, ready to be scored one at a time
    pub fn root_children(&self, board: &BoardState, side: Side) -> Vec<(Action, SearchNode)> {
        SearchNode::root(*board, side, self.depth.max(1)).children(&self.movegen)
    }

    /// Full-window value of one root child
    pub fn score_child(&self, child: &SearchNode, stats: &mut SearchStats) -> i32 {
        alpha_beta(child, i32::MIN, i32::MAX, &self.movegen, stats)
    }

    /// Score every root action, in generation order
    pub fn score_actions(&self, board: &BoardState, side: Side) -> Vec<ScoredAction> {
        let mut stats = SearchStats::default();
        self.root_children(board, side)
            .into_iter()
            .map(|(action, child)| ScoredAction {
                score: self.score_child(&child, &mut stats),
                action,
                board: child.board,
            })
            .collect()
    }

    /// Highest scoring action; ties go to the first one generated
    pub fn best_action(&self, board: &BoardState, side: Side) -> ScoredAction {
        let mut best: Option<ScoredAction> = None;
        for scored in self.score_actions(board, side) {
            if best.as_ref().map_or(true, |b| scored.score > b.score) {
                best = Some(scored);
            }
        }
        best.unwrap_or_else(|| {
            let grown = board.apply_grow(side);
            ScoredAction {
                action: Action::Grow,
                score: evaluate(&grown, side),
                board: grown,
            }
        })
    }
}

impl Default for AlphaBetaSearch {
    fn default() -> Self {
        Self::new(DEFAULT_DEPTH, MoveGenerator::default())
    }
}

// ============================================================================
// TESTS
// ============================================================================
