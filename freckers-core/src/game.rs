//! Board state, sides and actions

use crate::board::{Coord, Direction, SquareSet, BOARD_SIZE};
use crate::error::{GameError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// SIDES
// ============================================================================

/// Player side. Red starts on row 0 and races to row 7, Blue the reverse.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Red,
    Blue,
}

const RED_DIRECTIONS: [Direction; 5] = [
    Direction::Down,
    Direction::DownLeft,
    Direction::DownRight,
    Direction::Left,
    Direction::Right,
];

const BLUE_DIRECTIONS: [Direction; 5] = [
    Direction::Up,
    Direction::UpLeft,
    Direction::UpRight,
    Direction::Left,
    Direction::Right,
];

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::Red => Side::Blue,
            Side::Blue => Side::Red,
        }
    }

    pub fn home_row(self) -> i8 {
        match self {
            Side::Red => 0,
            Side::Blue => BOARD_SIZE - 1,
        }
    }

    pub fn goal_row(self) -> i8 {
        self.opponent().home_row()
    }

    /// Forward, forward diagonals and sideways, in generation order
    pub fn directions(self) -> &'static [Direction] {
        match self {
            Side::Red => &RED_DIRECTIONS,
            Side::Blue => &BLUE_DIRECTIONS,
        }
    }

    pub fn allows(self, direction: Direction) -> bool {
        self.directions().contains(&direction)
    }

    /// Rows already covered from the home row
    pub fn progress(self, row: i8) -> i32 {
        match self {
            Side::Red => row as i32,
            Side::Blue => (BOARD_SIZE - 1 - row) as i32,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Red => write!(f, "red"),
            Side::Blue => write!(f, "blue"),
        }
    }
}

// ============================================================================
// ACTIONS
// ============================================================================

/// One turn's action.
///
/// A `Jump` carries one direction per hop; each hop skips the adjacent square
/// and lands two squares away in that direction.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Step { origin: Coord, direction: Direction },
    Jump { origin: Coord, hops: Vec<Direction> },
    Grow,
}

impl Action {
    pub fn origin(&self) -> Option<Coord> {
        match self {
            Action::Step { origin, .. } | Action::Jump { origin, .. } => Some(*origin),
            Action::Grow => None,
        }
    }

    pub fn is_grow(&self) -> bool {
        matches!(self, Action::Grow)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Step { origin, direction } => write!(f, "STEP {} {:?}", origin, direction),
            Action::Jump { origin, hops } => write!(f, "JUMP {} {:?}", origin, hops),
            Action::Grow => write!(f, "GROW"),
        }
    }
}

/// Landing square of a single hop from `current`, if the hop is open.
///
/// The square in between must hold a piece; the landing must carry a tile
/// and be empty.
pub(crate) fn hop_landing(
    current: Coord,
    direction: Direction,
    occupied: SquareSet,
    tiles: SquareSet,
) -> Option<Coord> {
    let over = current.step(direction)?;
    let landing = over.step(direction)?;
    if occupied.contains(over) && tiles.contains(landing) && !occupied.contains(landing) {
        Some(landing)
    } else {
        None
    }
}

// ============================================================================
// BOARD STATE
// ============================================================================

/// Piece placement and tile layout (clone to mutate)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardState {
    red: SquareSet,
    blue: SquareSet,
    tiles: SquareSet,
}

impl BoardState {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Starting position: six pieces per side on the home rows, tiles in the
    /// corners and along the rows in front of each home row.
    pub fn new_game() -> Self {
        let red = (1..7).map(|c| Coord::new(0, c)).collect();
        let blue = (1..7).map(|c| Coord::new(7, c)).collect();

        let mut tiles: SquareSet = [
            Coord::new(0, 0),
            Coord::new(0, 7),
            Coord::new(7, 0),
            Coord::new(7, 7),
        ]
        .into_iter()
        .collect();
        for c in 1..7 {
            tiles.insert(Coord::new(1, c));
            tiles.insert(Coord::new(6, c));
        }

        Self { red, blue, tiles }
    }

    /// Build an arbitrary position, rejecting overlapping pieces
    pub fn from_parts(red: SquareSet, blue: SquareSet, tiles: SquareSet) -> Result<Self> {
        if let Some(clash) = red.intersection(blue).iter().next() {
            return Err(GameError::OverlappingPieces(clash));
        }
        Ok(Self { red, blue, tiles })
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn pieces(&self, side: Side) -> SquareSet {
        match side {
            Side::Red => self.red,
            Side::Blue => self.blue,
        }
    }

    pub fn occupied(&self) -> SquareSet {
        self.red.union(self.blue)
    }

    pub fn tiles(&self) -> SquareSet {
        self.tiles
    }

    pub fn is_occupied(&self, coord: Coord) -> bool {
        self.occupied().contains(coord)
    }

    pub fn has_tile(&self, coord: Coord) -> bool {
        self.tiles.contains(coord)
    }

    /// Whether any piece of `side` stands on its goal row
    pub fn reached_goal(&self, side: Side) -> bool {
        let goal = side.goal_row();
        self.pieces(side).iter().any(|c| c.r == goal)
    }

    /// First side (Red, then Blue) with a piece on its goal row
    pub fn winner(&self) -> Option<Side> {
        [Side::Red, Side::Blue]
            .into_iter()
            .find(|&side| self.reached_goal(side))
    }

    // ========================================================================
    // APPLY ACTION
    // ========================================================================

    /// Validate `action` for `side` and return the resulting board
    pub fn apply(&self, side: Side, action: &Action) -> Result<Self> {
        match action {
            Action::Step { origin, direction } => self.apply_step(side, *origin, *direction),
            Action::Jump { origin, hops } => self.apply_jump(side, *origin, hops),
            Action::Grow => Ok(self.apply_grow(side)),
        }
    }

    fn check_origin(&self, side: Side, origin: Coord) -> Result<()> {
        if self.pieces(side).contains(origin) {
            Ok(())
        } else {
            Err(GameError::NoPieceAtOrigin { side, origin })
        }
    }

    fn check_direction(side: Side, direction: Direction) -> Result<()> {
        if side.allows(direction) {
            Ok(())
        } else {
            Err(GameError::BackwardDirection { side, direction })
        }
    }

    fn apply_step(&self, side: Side, origin: Coord, direction: Direction) -> Result<Self> {
        self.check_origin(side, origin)?;
        Self::check_direction(side, direction)?;

        let dest = origin
            .step(direction)
            .ok_or(GameError::StepOffBoard { origin, direction })?;
        if !self.tiles.contains(dest) || self.is_occupied(dest) {
            return Err(GameError::StepBlocked(dest));
        }

        let mut next = *self;
        next.tiles.remove(origin);
        next.relocate(side, origin, dest);
        Ok(next)
    }

    fn apply_jump(&self, side: Side, origin: Coord, hops: &[Direction]) -> Result<Self> {
        self.check_origin(side, origin)?;
        if hops.is_empty() {
            return Err(GameError::EmptyJump);
        }

        let mut occupied = self.occupied();
        let mut tiles = self.tiles;
        let mut current = origin;

        for (hop, &direction) in hops.iter().enumerate() {
            Self::check_direction(side, direction)?;
            let landing = hop_landing(current, direction, occupied, tiles).ok_or(
                GameError::IllegalHop {
                    origin,
                    hop,
                    direction,
                },
            )?;
            occupied = occupied.without(current).with(landing);
            tiles = tiles.without(current);
            current = landing;
        }

        let mut next = *self;
        next.tiles = tiles;
        next.relocate(side, origin, current);
        Ok(next)
    }

    /// Grow never fails: it only ever adds tiles.
    pub fn apply_grow(&self, side: Side) -> Self {
        let mut next = *self;
        for piece in self.pieces(side) {
            for adjacent in piece.neighbors() {
                next.tiles.insert(adjacent);
            }
        }
        next
    }

    /// Move a piece of `side` and consume tiles, with no rule checks.
    ///
    /// Used by the move generator, which has already validated the chain.
    pub(crate) fn with_move(
        &self,
        side: Side,
        origin: Coord,
        dest: Coord,
        tiles: SquareSet,
    ) -> Self {
        let mut next = *self;
        next.tiles = tiles;
        next.relocate(side, origin, dest);
        next
    }

    fn relocate(&mut self, side: Side, from: Coord, to: Coord) {
        let set = match side {
            Side::Red => &mut self.red,
            Side::Blue => &mut self.blue,
        };
        set.remove(from);
        set.insert(to);
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new_game()
    }
}

// ============================================================================
// TESTS
// ============================================================================
