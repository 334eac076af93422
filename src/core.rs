use std::borrow::Cow;
use std::fmt::Debug;
use std::hash::Hash;
use strum_macros::{Display, EnumIter, EnumString};

/// Error type. This is used for malformed problem instances (missing
/// start/goal, conflicting givens) or misuse of the library itself.
/// Exhaustion of a search space or cancellation of a run are not errors;
/// those are terminal `Outcome`s.
#[derive(Debug, Clone, PartialEq)]
pub struct Error(Cow<'static, str>);
impl Error {
    pub const fn new_const(s: &'static str) -> Self {
        Error(Cow::Borrowed(s))
    }

    pub fn new<S: Into<String>>(s: S) -> Self {
        Error(Cow::Owned(s.into()))
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for Error {}

/// A 0-indexed grid coordinate, compared and hashed by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }

    /// Manhattan distance to another position.
    pub fn manhattan(&self, other: &Position) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    /// The neighboring position one step in `dir`, if it stays inside a
    /// `rows` x `cols` grid.
    pub fn step(&self, dir: Direction, rows: usize, cols: usize) -> Option<Position> {
        let (dr, dc) = dir.delta();
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        if row < rows && col < cols {
            Some(Position { row, col })
        } else {
            None
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The four orthogonal moves, in the fixed expansion order used by every
/// search in this crate: Up, Down, Left, Right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const fn delta(&self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    pub const fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// How a problem exposes candidate next-states to a search. Expansion must
/// be a pure function of the state: no side effects, deterministic order.
///
/// Neighbors are returned together with the move that produces them, so a
/// finished search can report a move sequence without re-deriving it.
pub trait SearchSpace {
    type State: Clone + Eq + Hash + Debug;
    type Move: Clone + Debug;

    fn start(&self) -> Self::State;
    fn is_goal(&self, state: &Self::State) -> bool;
    fn neighbors(&self, state: &Self::State) -> Vec<(Self::State, Self::Move)>;

    /// Admissible estimate of remaining cost. The default makes AStar
    /// degrade to uniform-cost search.
    fn heuristic(&self, state: &Self::State) -> usize {
        let _ = state;
        0
    }
}
