use bit_set::BitSet;
use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt::Display;

use crate::core::{Error, Position};

pub const SIDE: usize = 9;
pub const BOX: usize = 3;

const OUT_OF_BOUNDS: Error = Error::new_const("Cell out of bounds");
const BAD_VALUE: Error = Error::new_const("Cell value must be 1..=9");
const GIVEN_CELL: Error = Error::new_const("Cannot write a given cell");
const ALREADY_FILLED: Error = Error::new_const("Cell already filled");
const NO_SUCH_ACTION: Error = Error::new_const("No placement to retract");

/// A 9x9 Sudoku board. Cells hold 0 (empty) or 1..=9; the given mask
/// marks the user-supplied clues, which a solver may read but never
/// write. Everything else is solver-owned for the duration of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SudokuBoard {
    cells: [[u8; SIDE]; SIDE],
    given: [[bool; SIDE]; SIDE],
}

impl SudokuBoard {
    pub fn new() -> Self {
        SudokuBoard { cells: [[0; SIDE]; SIDE], given: [[false; SIDE]; SIDE] }
    }

    /// Parse a 9-line board, one character per cell: digits 1-9 are
    /// givens, '.' or '0' are empty.
    pub fn parse(s: &str) -> Result<Self, Error> {
        let lines: Vec<&str> = s.lines().collect();
        if lines.len() != SIDE {
            return Err(Error::new(format!("Expected {} rows, got {}", SIDE, lines.len())));
        }
        let mut board = Self::new();
        for (r, line) in lines.iter().enumerate() {
            let line = line.trim();
            if line.chars().count() != SIDE {
                return Err(Error::new(format!("Row {} is not {} cells wide", r, SIDE)));
            }
            for (c, ch) in line.chars().enumerate() {
                match ch {
                    '.' | '0' => {}
                    '1'..='9' => {
                        board.set_given(Position::new(r, c), ch as u8 - b'0')?;
                    }
                    _ => return Err(Error::new(format!("Invalid character {:?} in input", ch))),
                }
            }
        }
        Ok(board)
    }

    pub fn serialize(&self) -> String {
        let mut result = String::new();
        for row in &self.cells {
            for &cell in row {
                if cell == 0 {
                    result.push('.');
                } else {
                    result.push((b'0' + cell) as char);
                }
            }
            result.push('\n');
        }
        result
    }

    fn check_bounds(pos: Position) -> Result<(), Error> {
        if pos.row >= SIDE || pos.col >= SIDE {
            return Err(OUT_OF_BOUNDS);
        }
        Ok(())
    }

    pub fn value(&self, pos: Position) -> u8 {
        self.cells[pos.row][pos.col]
    }

    pub fn is_given(&self, pos: Position) -> bool {
        self.given[pos.row][pos.col]
    }

    pub fn is_empty(&self, pos: Position) -> bool {
        self.cells[pos.row][pos.col] == 0
    }

    /// Record a clue cell. Clues may conflict with each other here; the
    /// conflict check happens once, when a run starts.
    pub fn set_given(&mut self, pos: Position, value: u8) -> Result<(), Error> {
        Self::check_bounds(pos)?;
        if !(1..=9).contains(&value) {
            return Err(BAD_VALUE);
        }
        self.cells[pos.row][pos.col] = value;
        self.given[pos.row][pos.col] = true;
        Ok(())
    }

    /// Solver-owned write into an empty non-given cell.
    pub fn place(&mut self, pos: Position, value: u8) -> Result<(), Error> {
        Self::check_bounds(pos)?;
        if !(1..=9).contains(&value) {
            return Err(BAD_VALUE);
        }
        if self.given[pos.row][pos.col] {
            return Err(GIVEN_CELL);
        }
        if self.cells[pos.row][pos.col] != 0 {
            return Err(ALREADY_FILLED);
        }
        self.cells[pos.row][pos.col] = value;
        Ok(())
    }

    /// Undo a solver placement, returning the value that was removed.
    pub fn retract(&mut self, pos: Position) -> Result<u8, Error> {
        Self::check_bounds(pos)?;
        if self.given[pos.row][pos.col] {
            return Err(GIVEN_CELL);
        }
        let value = self.cells[pos.row][pos.col];
        if value == 0 {
            return Err(NO_SUCH_ACTION);
        }
        self.cells[pos.row][pos.col] = 0;
        Ok(value)
    }

    /// Clear everything, givens included.
    pub fn clear(&mut self) {
        self.cells = [[0; SIDE]; SIDE];
        self.given = [[false; SIDE]; SIDE];
    }

    /// Clear only solver-owned cells, keeping the clues.
    pub fn clear_solved(&mut self) {
        for r in 0..SIDE {
            for c in 0..SIDE {
                if !self.given[r][c] {
                    self.cells[r][c] = 0;
                }
            }
        }
    }

    /// Would placing `value` at `pos` keep the row, column, and box free
    /// of duplicates? The cell itself is ignored, so this also answers
    /// "is the value already here consistent" when the cell is filled.
    pub fn is_valid(&self, pos: Position, value: u8) -> bool {
        for i in 0..SIDE {
            if i != pos.col && self.cells[pos.row][i] == value {
                return false;
            }
            if i != pos.row && self.cells[i][pos.col] == value {
                return false;
            }
        }
        let box_r = (pos.row / BOX) * BOX;
        let box_c = (pos.col / BOX) * BOX;
        for r in box_r..box_r + BOX {
            for c in box_c..box_c + BOX {
                if (r, c) != (pos.row, pos.col) && self.cells[r][c] == value {
                    return false;
                }
            }
        }
        true
    }

    /// Every placed value consistent with its row/column/box. Used to
    /// reject conflicting clue sets before a run starts.
    pub fn is_valid_grid(&self) -> bool {
        for r in 0..SIDE {
            for c in 0..SIDE {
                let value = self.cells[r][c];
                if value != 0 && !self.is_valid(Position::new(r, c), value) {
                    return false;
                }
            }
        }
        true
    }

    /// The legal values for a cell, as a set. Ascending iteration order.
    pub fn candidates(&self, pos: Position) -> BitSet {
        let mut out = BitSet::with_capacity(SIDE + 1);
        for value in 1..=9u8 {
            if self.is_valid(pos, value) {
                out.insert(value as usize);
            }
        }
        out
    }

    pub fn solved(&self) -> bool {
        self.cells.iter().all(|row| row.iter().all(|&v| v != 0))
    }

    /// Positions of all empty cells in row-major order.
    pub fn empty_cells(&self) -> Vec<Position> {
        let mut out = Vec::new();
        for r in 0..SIDE {
            for c in 0..SIDE {
                if self.cells[r][c] == 0 {
                    out.push(Position::new(r, c));
                }
            }
        }
        out
    }

    /// Generate a random puzzle: fill the three diagonal boxes with
    /// shuffled digits, complete the rest by backtracking, then blank
    /// 60-80 random cells. Whatever survives becomes the givens.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut cells = [[0u8; SIDE]; SIDE];
        for k in (0..SIDE).step_by(BOX) {
            let mut nums: Vec<u8> = (1..=9).collect();
            nums.shuffle(rng);
            for r in 0..BOX {
                for c in 0..BOX {
                    cells[k + r][k + c] = nums.pop().unwrap();
                }
            }
        }
        fill_remaining(&mut cells, 0, 0);
        let blanks = rng.random_range(60..80);
        for _ in 0..blanks {
            let r = rng.random_range(0..SIDE);
            let c = rng.random_range(0..SIDE);
            cells[r][c] = 0;
        }
        let mut board = Self::new();
        for r in 0..SIDE {
            for c in 0..SIDE {
                if cells[r][c] != 0 {
                    // Bounds and value range hold by construction.
                    board.set_given(Position::new(r, c), cells[r][c]).unwrap();
                }
            }
        }
        board
    }
}

impl Default for SudokuBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for SudokuBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.serialize())
    }
}

fn placement_ok(cells: &[[u8; SIDE]; SIDE], row: usize, col: usize, value: u8) -> bool {
    for i in 0..SIDE {
        if cells[row][i] == value || cells[i][col] == value {
            return false;
        }
    }
    let box_r = (row / BOX) * BOX;
    let box_c = (col / BOX) * BOX;
    for r in box_r..box_r + BOX {
        for c in box_c..box_c + BOX {
            if cells[r][c] == value {
                return false;
            }
        }
    }
    true
}

fn fill_remaining(cells: &mut [[u8; SIDE]; SIDE], row: usize, col: usize) -> bool {
    if row == SIDE {
        return true;
    }
    if col == SIDE {
        return fill_remaining(cells, row + 1, 0);
    }
    if cells[row][col] != 0 {
        return fill_remaining(cells, row, col + 1);
    }
    for value in 1..=9u8 {
        if placement_ok(cells, row, col, value) {
            cells[row][col] = value;
            if fill_remaining(cells, row, col + 1) {
                return true;
            }
        }
    }
    cells[row][col] = 0;
    false
}
