//! Legal action generation
//!
//! Steps and jump chains are generated per piece in ascending square order,
//! directions in the side's fixed order, and `Grow` is always appended last
//! so the result is never empty.

use crate::board::{Coord, Direction, SquareSet, NUM_SQUARES};
use crate::game::{hop_landing, Action, BoardState, Side};
use serde::{Deserialize, Serialize};

/// Which stopping points of a jump chain become actions
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum JumpPolicy {
    /// Every hop count a chain can stop at is its own action
    #[default]
    AllStops,
    /// Only chains that cannot be extended any further
    MaximalOnly,
}

/// A jump chain found from one origin
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JumpChain {
    pub hops: Vec<Direction>,
    /// Squares landed on, in order (excludes the origin)
    pub path: Vec<Coord>,
    pub landing: Coord,
    /// Tile layout after the chain: every departed square lost its tile
    pub tiles: SquareSet,
}

/// Move generator, parameterised by its jump policy
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveGenerator {
    pub jump_policy: JumpPolicy,
}

impl MoveGenerator {
    pub fn new(jump_policy: JumpPolicy) -> Self {
        Self { jump_policy }
    }

    /// All legal actions for `side`, `Grow` last
    pub fn legal_actions(&self, board: &BoardState, side: Side) -> Vec<Action> {
        self.successors(board, side)
            .into_iter()
            .map(|(action, _)| action)
            .collect()
    }

    /// All legal actions for `side`, each paired with the board it produces
    pub fn successors(&self, board: &BoardState, side: Side) -> Vec<(Action, BoardState)> {
        let mut out = Vec::new();

        for origin in board.pieces(side) {
            self.generate_steps(board, side, origin, &mut out);
            self.generate_jumps(board, side, origin, &mut out);
        }

        out.push((Action::Grow, board.apply_grow(side)));
        out
    }

    fn generate_steps(
        &self,
        board: &BoardState,
        side: Side,
        origin: Coord,
        out: &mut Vec<(Action, BoardState)>,
    ) {
        let occupied = board.occupied();
        let tiles = board.tiles();

        for &direction in side.directions() {
            let dest = match origin.step(direction) {
                Some(d) => d,
                None => continue,
            };
            if tiles.contains(dest) && !occupied.contains(dest) {
                let next = board.with_move(side, origin, dest, tiles.without(origin));
                out.push((Action::Step { origin, direction }, next));
            }
        }
    }

    fn generate_jumps(
        &self,
        board: &BoardState,
        side: Side,
        origin: Coord,
        out: &mut Vec<(Action, BoardState)>,
    ) {
        for chain in self.jump_chains(board, side, origin) {
            let next = board.with_move(side, origin, chain.landing, chain.tiles);
            out.push((
                Action::Jump {
                    origin,
                    hops: chain.hops,
                },
                next,
            ));
        }
    }

    /// Every jump chain available to the piece at `origin`
    pub fn jump_chains(&self, board: &BoardState, side: Side, origin: Coord) -> Vec<JumpChain> {
        let mut chains = Vec::new();
        let search = ChainSearch {
            side,
            policy: self.jump_policy,
        };
        search.extend(
            origin,
            board.occupied(),
            board.tiles(),
            SquareSet::EMPTY.with(origin),
            &mut Vec::new(),
            &mut Vec::new(),
            &mut chains,
        );
        chains
    }
}

// ============================================================================
// JUMP-CHAIN SEARCH
// ============================================================================

struct ChainSearch {
    side: Side,
    policy: JumpPolicy,
}

impl ChainSearch {
    /// Explore hops from `current`.
    ///
    /// `occupied` has the moving piece at `current`, `tiles` has lost every
    /// square departed so far, and `visited` holds the origin plus each
    /// landing. The sets are copied per branch; `hops`/`path` are a shared
    /// stack popped on return.
    #[allow(clippy::too_many_arguments)]
    fn extend(
        &self,
        current: Coord,
        occupied: SquareSet,
        tiles: SquareSet,
        visited: SquareSet,
        hops: &mut Vec<Direction>,
        path: &mut Vec<Coord>,
        chains: &mut Vec<JumpChain>,
    ) -> bool {
        debug_assert!(hops.len() < NUM_SQUARES);
        let mut extended = false;

        for &direction in self.side.directions() {
            let landing = match hop_landing(current, direction, occupied, tiles) {
                Some(l) if !visited.contains(l) => l,
                _ => continue,
            };
            extended = true;

            let next_occupied = occupied.without(current).with(landing);
            let next_tiles = tiles.without(current);
            hops.push(direction);
            path.push(landing);

            if self.policy == JumpPolicy::AllStops {
                chains.push(Self::chain(hops, path, next_tiles));
            }
            let deeper = self.extend(
                landing,
                next_occupied,
                next_tiles,
                visited.with(landing),
                hops,
                path,
                chains,
            );
            if self.policy == JumpPolicy::MaximalOnly && !deeper {
                chains.push(Self::chain(hops, path, next_tiles));
            }

            hops.pop();
            path.pop();
        }

        extended
    }

    fn chain(hops: &[Direction], path: &[Coord], tiles: SquareSet) -> JumpChain {
        JumpChain {
            hops: hops.to_vec(),
            path: path.to_vec(),
            landing: path[path.len() - 1],
            tiles,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
