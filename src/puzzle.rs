use rand::Rng;
use strum::IntoEnumIterator;

use crate::core::{Direction, Error, Position, SearchSpace};

/// An arrangement of sliding tiles, row-major, with 0 as the blank.
/// Cheap to clone and hash; the visited sets of a search hold many of
/// these.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TileState {
    tiles: Box<[u8]>,
}

impl TileState {
    pub fn tiles(&self) -> &[u8] {
        &self.tiles
    }

    fn blank(&self) -> usize {
        // A valid state always has exactly one blank.
        self.tiles.iter().position(|&t| t == 0).expect("state has no blank tile")
    }
}

const TOO_MANY_TILES: Error = Error::new_const("Board exceeds 256 tiles");
const EMPTY_BOARD: Error = Error::new_const("Board dimensions must be non-zero");
const NOT_A_PERMUTATION: Error = Error::new_const("Tiles are not a permutation of 0..rows*cols");

/// The sliding-tile problem: a fixed board shape, a starting arrangement,
/// and the canonical goal (ascending tiles, blank last). Moves are
/// labeled by the direction the blank travels.
#[derive(Debug, Clone)]
pub struct TilePuzzle {
    rows: usize,
    cols: usize,
    start: TileState,
}

/// How many random moves per board edge `scrambled` walks away from the
/// goal. Walking from the goal guarantees the instance is solvable.
pub const SHUFFLE_FACTOR: usize = 50;

impl TilePuzzle {
    pub fn new(rows: usize, cols: usize, tiles: Vec<u8>) -> Result<Self, Error> {
        if rows == 0 || cols == 0 {
            return Err(EMPTY_BOARD);
        }
        if rows * cols > 256 {
            return Err(TOO_MANY_TILES);
        }
        if tiles.len() != rows * cols {
            return Err(NOT_A_PERMUTATION);
        }
        let mut seen = vec![false; rows * cols];
        for &t in &tiles {
            let t = t as usize;
            if t >= rows * cols || seen[t] {
                return Err(NOT_A_PERMUTATION);
            }
            seen[t] = true;
        }
        Ok(TilePuzzle {
            rows,
            cols,
            start: TileState { tiles: tiles.into_boxed_slice() },
        })
    }

    /// A puzzle scrambled by a random walk from the goal state.
    pub fn scrambled<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Result<Self, Error> {
        Self::scrambled_by(rows, cols, SHUFFLE_FACTOR * rows.max(cols), rng)
    }

    /// Scramble with an explicit number of random moves.
    pub fn scrambled_by<R: Rng + ?Sized>(
        rows: usize,
        cols: usize,
        moves: usize,
        rng: &mut R,
    ) -> Result<Self, Error> {
        let mut puzzle = Self::new(rows, cols, Self::goal_tiles(rows, cols))?;
        let mut state = puzzle.start.clone();
        for _ in 0..moves {
            let options = puzzle.neighbors(&state);
            if options.is_empty() {
                // A 1x1 board has nowhere for the blank to go.
                break;
            }
            let pick = rng.random_range(0..options.len());
            state = options.into_iter().nth(pick).map(|(s, _)| s).unwrap_or(state);
        }
        puzzle.start = state;
        Ok(puzzle)
    }

    fn goal_tiles(rows: usize, cols: usize) -> Vec<u8> {
        let n = rows * cols;
        (1..n).map(|t| t as u8).chain(std::iter::once(0)).collect()
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn goal_state(&self) -> TileState {
        TileState { tiles: Self::goal_tiles(self.rows, self.cols).into_boxed_slice() }
    }

    fn position_of(&self, index: usize) -> Position {
        Position::new(index / self.cols, index % self.cols)
    }
}

impl SearchSpace for TilePuzzle {
    type State = TileState;
    type Move = Direction;

    fn start(&self) -> TileState {
        self.start.clone()
    }

    fn is_goal(&self, state: &TileState) -> bool {
        let n = state.tiles.len();
        state.tiles[n - 1] == 0 && state.tiles[..n - 1].iter().enumerate().all(|(i, &t)| t as usize == i + 1)
    }

    fn neighbors(&self, state: &TileState) -> Vec<(TileState, Direction)> {
        let blank = state.blank();
        let blank_pos = self.position_of(blank);
        Direction::iter()
            .filter_map(|dir| {
                let target = blank_pos.step(dir, self.rows, self.cols)?;
                let target_index = target.row * self.cols + target.col;
                let mut tiles = state.tiles.clone();
                tiles.swap(blank, target_index);
                Some((TileState { tiles }, dir))
            })
            .collect()
    }

    /// Sum of tile Manhattan distances to their goal slots. Admissible:
    /// every move relocates exactly one tile by one step.
    fn heuristic(&self, state: &TileState) -> usize {
        state
            .tiles
            .iter()
            .enumerate()
            .filter(|&(_, &t)| t != 0)
            .map(|(i, &t)| {
                let here = self.position_of(i);
                let home = self.position_of(t as usize - 1);
                here.manhattan(&home)
            })
            .sum()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_goal_state_shape() {
        let puzzle = TilePuzzle::new(2, 3, vec![1, 2, 3, 4, 5, 0]).unwrap();
        assert!(puzzle.is_goal(&puzzle.start()));
        assert_eq!(puzzle.goal_state().tiles(), &[1, 2, 3, 4, 5, 0]);
    }

    #[test]
    fn test_rejects_bad_tiles() {
        assert!(TilePuzzle::new(2, 2, vec![0, 1, 2]).is_err());
        assert!(TilePuzzle::new(2, 2, vec![0, 1, 2, 2]).is_err());
        assert!(TilePuzzle::new(2, 2, vec![0, 1, 2, 4]).is_err());
        assert!(TilePuzzle::new(0, 2, vec![]).is_err());
    }

    #[test]
    fn test_neighbors_swap_blank() {
        // Blank in the top-left of a 2x2: it can move Down or Right.
        let puzzle = TilePuzzle::new(2, 2, vec![0, 1, 2, 3]).unwrap();
        let n = puzzle.neighbors(&puzzle.start());
        assert_eq!(n.len(), 2);
        assert_eq!(n[0].1, Direction::Down);
        assert_eq!(n[0].0.tiles(), &[2, 1, 0, 3]);
        assert_eq!(n[1].1, Direction::Right);
        assert_eq!(n[1].0.tiles(), &[1, 0, 2, 3]);
    }

    #[test]
    fn test_heuristic_zero_at_goal() {
        let puzzle = TilePuzzle::new(3, 3, vec![1, 2, 3, 4, 5, 6, 7, 8, 0]).unwrap();
        assert_eq!(puzzle.heuristic(&puzzle.goal_state()), 0);
        // Swapping two adjacent tiles displaces each by one.
        let moved = TilePuzzle::new(3, 3, vec![2, 1, 3, 4, 5, 6, 7, 8, 0]).unwrap();
        assert_eq!(puzzle.heuristic(&moved.start()), 2);
    }

    #[test]
    fn test_scramble_handles_boards_without_moves() {
        // The blank on a 1x1 board has no neighbors to walk through.
        let mut rng = StdRng::seed_from_u64(1);
        let puzzle = TilePuzzle::scrambled(1, 1, &mut rng).unwrap();
        assert!(puzzle.is_goal(&puzzle.start()));
    }

    #[test]
    fn test_scramble_is_valid_and_deterministic() {
        let mut rng = StdRng::seed_from_u64(11);
        let a = TilePuzzle::scrambled_by(3, 3, 40, &mut rng).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let b = TilePuzzle::scrambled_by(3, 3, 40, &mut rng).unwrap();
        assert_eq!(a.start(), b.start());
        // Still a permutation.
        let mut tiles: Vec<u8> = a.start().tiles().to_vec();
        tiles.sort_unstable();
        assert_eq!(tiles, (0..9).map(|t| t as u8).collect::<Vec<_>>());
    }
}
