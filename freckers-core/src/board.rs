//! Square grid geometry: coordinates, directions and 64-bit square sets

use serde::{Deserialize, Serialize};
use std::fmt;

/// Board edge length (rows and columns)
pub const BOARD_SIZE: i8 = 8;

/// Number of squares on the board
pub const NUM_SQUARES: usize = 64;

// ============================================================================
// COORDINATES
// ============================================================================

/// Row/column coordinate, both in `0..8`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub r: i8,
    pub c: i8,
}

impl Coord {
    /// Build a coordinate that is known to be on the board.
    ///
    /// Panics in debug builds when out of range; use [`Coord::try_new`] for
    /// values that come from arithmetic.
    pub const fn new(r: i8, c: i8) -> Self {
        debug_assert!(r >= 0 && r < BOARD_SIZE && c >= 0 && c < BOARD_SIZE);
        Self { r, c }
    }

    /// `None` when the coordinate falls off the board
    pub fn try_new(r: i8, c: i8) -> Option<Self> {
        if (0..BOARD_SIZE).contains(&r) && (0..BOARD_SIZE).contains(&c) {
            Some(Self { r, c })
        } else {
            None
        }
    }

    /// Square index in `0..64`, row-major
    pub fn index(self) -> u8 {
        (self.r * BOARD_SIZE + self.c) as u8
    }

    pub fn from_index(index: u8) -> Self {
        debug_assert!((index as usize) < NUM_SQUARES);
        let i = index as i8;
        Self::new(i / BOARD_SIZE, i % BOARD_SIZE)
    }

    /// Adjacent square in `direction`, or `None` when that leaves the board
    pub fn step(self, direction: Direction) -> Option<Coord> {
        let (dr, dc) = direction.delta();
        Coord::try_new(self.r + dr, self.c + dc)
    }

    /// All on-board squares in the 8-neighbourhood
    pub fn neighbors(self) -> impl Iterator<Item = Coord> {
        ALL_DIRECTIONS.iter().filter_map(move |&d| self.step(d))
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.r, self.c)
    }
}

// ============================================================================
// DIRECTIONS
// ============================================================================

/// One of the eight unit vectors. "Down" increases the row index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    UpRight,
    Right,
    DownRight,
    Down,
    DownLeft,
    Left,
    UpLeft,
}

pub const ALL_DIRECTIONS: [Direction; 8] = [
    Direction::Up,
    Direction::UpRight,
    Direction::Right,
    Direction::DownRight,
    Direction::Down,
    Direction::DownLeft,
    Direction::Left,
    Direction::UpLeft,
];

impl Direction {
    /// (row delta, column delta)
    pub const fn delta(self) -> (i8, i8) {
        match self {
            Direction::Up => (-1, 0),
            Direction::UpRight => (-1, 1),
            Direction::Right => (0, 1),
            Direction::DownRight => (1, 1),
            Direction::Down => (1, 0),
            Direction::DownLeft => (1, -1),
            Direction::Left => (0, -1),
            Direction::UpLeft => (-1, -1),
        }
    }

    /// Row component only
    pub const fn row_delta(self) -> i8 {
        self.delta().0
    }
}

// ============================================================================
// SQUARE SETS
// ============================================================================

/// Set of squares as a 64-bit mask. Copies are independent values.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SquareSet(u64);

impl SquareSet {
    pub const EMPTY: SquareSet = SquareSet(0);

    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    pub fn contains(self, coord: Coord) -> bool {
        self.0 & (1u64 << coord.index()) != 0
    }

    pub fn insert(&mut self, coord: Coord) {
        self.0 |= 1u64 << coord.index();
    }

    pub fn remove(&mut self, coord: Coord) {
        self.0 &= !(1u64 << coord.index());
    }

    /// Copy with `coord` added
    #[must_use]
    pub fn with(self, coord: Coord) -> Self {
        Self(self.0 | (1u64 << coord.index()))
    }

    /// Copy with `coord` removed
    #[must_use]
    pub fn without(self, coord: Coord) -> Self {
        Self(self.0 & !(1u64 << coord.index()))
    }

    pub fn union(self, other: SquareSet) -> Self {
        Self(self.0 | other.0)
    }

    pub fn intersection(self, other: SquareSet) -> Self {
        Self(self.0 & other.0)
    }

    pub fn difference(self, other: SquareSet) -> Self {
        Self(self.0 & !other.0)
    }

    pub fn is_disjoint(self, other: SquareSet) -> bool {
        self.0 & other.0 == 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Squares in ascending index order
    pub fn iter(self) -> SquareIter {
        SquareIter(self.0)
    }
}

impl FromIterator<Coord> for SquareSet {
    fn from_iter<I: IntoIterator<Item = Coord>>(iter: I) -> Self {
        let mut set = SquareSet::EMPTY;
        for coord in iter {
            set.insert(coord);
        }
        set
    }
}

impl IntoIterator for SquareSet {
    type Item = Coord;
    type IntoIter = SquareIter;

    fn into_iter(self) -> SquareIter {
        self.iter()
    }
}

impl fmt::Debug for SquareSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Iterator over the squares of a [`SquareSet`]
pub struct SquareIter(u64);

impl Iterator for SquareIter {
    type Item = Coord;

    fn next(&mut self) -> Option<Coord> {
        if self.0 == 0 {
            return None;
        }
        let index = self.0.trailing_zeros() as u8;
        self.0 &= self.0 - 1;
        Some(Coord::from_index(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for SquareIter {}
