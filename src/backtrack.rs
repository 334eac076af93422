use strum_macros::{Display, EnumIter, EnumString};

use crate::core::{Error, Position};
use crate::engine::{Outcome, Resumable, Tick};
use crate::sudoku::SudokuBoard;

/// Cell-selection tactics for the backtracking solver. Both explore the
/// same value order (ascending) and differ only in which empty cell they
/// commit to next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString)]
pub enum SolverKind {
    /// Fill empty cells in row-major order.
    Chronological,
    /// Fill the empty cell with the fewest legal candidates first.
    MinimumRemaining,
}

/// Whether a step wrote a value into a cell or undid an earlier write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum CellTag {
    Placed,
    Retracted,
}

/// One solver action: `value` was placed at or retracted from `pos`.
/// Renderers read the evolving board through `BacktrackSearch::board`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellStep {
    pub pos: Position,
    pub value: u8,
    pub tag: CellTag,
}

const CONFLICTING_GIVENS: Error = Error::new_const("Given cells conflict with each other");

enum Tactic {
    /// Empty cells in a fixed row-major order, plus a cursor and the
    /// minimum value to try at the cursor (raised after a retraction).
    Chronological {
        empties: Vec<Position>,
        cursor: usize,
        resume: u8,
    },
    /// Dynamic cell choice; `retry` pins the solver to the cell it just
    /// retracted so larger values get tried there before moving on.
    MinimumRemaining { retry: Option<(Position, u8)> },
}

/// Stepwise backtracking over a Sudoku board. Each `advance()` performs
/// exactly one placement or one retraction and reports it as a
/// `CellStep`; the advance after the last placement yields the terminal
/// `Found` with the solved board. Given cells are never written or
/// retracted. The trail and cursor state die with this value, so a new
/// run always starts clean.
pub struct BacktrackSearch {
    board: SudokuBoard,
    kind: SolverKind,
    tactic: Tactic,
    trail: Vec<(Position, u8)>,
    outcome: Option<Outcome<SudokuBoard>>,
}

impl BacktrackSearch {
    /// Fails when the given cells already conflict; that is a malformed
    /// instance, not an exhausted search. Solver-owned cells left over
    /// from a previous run are cleared.
    pub fn new(mut board: SudokuBoard, kind: SolverKind) -> Result<Self, Error> {
        board.clear_solved();
        if !board.is_valid_grid() {
            return Err(CONFLICTING_GIVENS);
        }
        let tactic = match kind {
            SolverKind::Chronological => Tactic::Chronological {
                empties: board.empty_cells(),
                cursor: 0,
                resume: 1,
            },
            SolverKind::MinimumRemaining => Tactic::MinimumRemaining { retry: None },
        };
        Ok(BacktrackSearch { board, kind, tactic, trail: Vec::new(), outcome: None })
    }

    pub fn kind(&self) -> SolverKind {
        self.kind
    }

    /// The board as of the most recent step.
    pub fn board(&self) -> &SudokuBoard {
        &self.board
    }

    /// Depth of the current placement trail.
    pub fn depth(&self) -> usize {
        self.trail.len()
    }

    fn place(&mut self, pos: Position, value: u8) -> Tick<CellStep, SudokuBoard> {
        // Validity and emptiness were checked by the caller.
        self.board.place(pos, value).expect("placement target is a writable empty cell");
        self.trail.push((pos, value));
        Tick::Step(CellStep { pos, value, tag: CellTag::Placed })
    }

    /// Pop the most recent placement off the trail and undo it. An empty
    /// trail means every alternative is spent.
    fn backtrack(&mut self) -> Tick<CellStep, SudokuBoard> {
        let Some((pos, value)) = self.trail.pop() else {
            self.outcome = Some(Outcome::Exhausted);
            return Tick::Done(Outcome::Exhausted);
        };
        self.board.retract(pos).expect("trail entries are solver placements");
        match &mut self.tactic {
            Tactic::Chronological { empties, cursor, resume } => {
                // The retracted cell is the one right behind the cursor.
                *cursor -= 1;
                debug_assert_eq!(empties[*cursor], pos);
                *resume = value + 1;
            }
            Tactic::MinimumRemaining { retry } => {
                *retry = Some((pos, value));
            }
        }
        Tick::Step(CellStep { pos, value, tag: CellTag::Retracted })
    }

    fn advance_chronological(&mut self) -> Tick<CellStep, SudokuBoard> {
        let Tactic::Chronological { empties, cursor, resume } = &self.tactic else {
            unreachable!()
        };
        if *cursor == empties.len() {
            let outcome = Outcome::Found(self.board.clone());
            self.outcome = Some(outcome.clone());
            return Tick::Done(outcome);
        }
        let pos = empties[*cursor];
        let from = *resume;
        for value in from..=9 {
            if self.board.is_valid(pos, value) {
                let Tactic::Chronological { cursor, resume, .. } = &mut self.tactic else {
                    unreachable!()
                };
                *cursor += 1;
                *resume = 1;
                return self.place(pos, value);
            }
        }
        self.backtrack()
    }

    fn advance_minimum_remaining(&mut self) -> Tick<CellStep, SudokuBoard> {
        let Tactic::MinimumRemaining { retry } = &mut self.tactic else { unreachable!() };
        if let Some((pos, below)) = retry.take() {
            // Continue at the retracted cell with the next larger value.
            let next = self
                .board
                .candidates(pos)
                .iter()
                .map(|v| v as u8)
                .find(|&v| v > below);
            return match next {
                Some(value) => self.place(pos, value),
                None => self.backtrack(),
            };
        }
        let target = self
            .board
            .empty_cells()
            .into_iter()
            .map(|pos| (self.board.candidates(pos).len(), pos))
            .min_by_key(|&(count, pos)| (count, pos));
        match target {
            None => {
                let outcome = Outcome::Found(self.board.clone());
                self.outcome = Some(outcome.clone());
                Tick::Done(outcome)
            }
            Some((0, _)) => self.backtrack(),
            Some((_, pos)) => {
                let value = self
                    .board
                    .candidates(pos)
                    .iter()
                    .next()
                    .map(|v| v as u8)
                    .expect("candidate count was nonzero");
                self.place(pos, value)
            }
        }
    }
}

impl Resumable for BacktrackSearch {
    type Step = CellStep;
    type Solution = SudokuBoard;

    fn advance(&mut self) -> Tick<CellStep, SudokuBoard> {
        if let Some(outcome) = &self.outcome {
            return Tick::Done(outcome.clone());
        }
        match self.kind {
            SolverKind::Chronological => self.advance_chronological(),
            SolverKind::MinimumRemaining => self.advance_minimum_remaining(),
        }
    }
}
