use std::io::{self, Write};
use std::time::Duration;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::style::{Print, Stylize};
use crossterm::terminal::{Clear, ClearType};
use crossterm::{execute, queue};

use stepwise_search::backtrack::{BacktrackSearch, CellStep, CellTag, SolverKind};
use stepwise_search::core::Position;
use stepwise_search::driver::{DriverControl, StepDriver, StepObserver};
use stepwise_search::engine::{Engine, Outcome};
use stepwise_search::sudoku::{SudokuBoard, SIDE};

// https://en.wikipedia.org/wiki/Sudoku
const PUZZLE: &str = "53..7....\n\
                      6..195...\n\
                      .98....6.\n\
                      8...6...3\n\
                      4..8.3..1\n\
                      7...2...6\n\
                      .6....28.\n\
                      ...419..5\n\
                      ....8..79\n";

/// Mirrors the solver's placements onto its own copy of the board, so it
/// can render without reaching back into the engine between steps.
struct BoardAnimator {
    board: SudokuBoard,
    last: Option<CellStep>,
}

impl BoardAnimator {
    fn new(board: SudokuBoard) -> Self {
        Self { board, last: None }
    }

    fn draw(&self) -> io::Result<()> {
        let mut out = io::stdout();
        queue!(out, MoveTo(0, 0))?;
        for r in 0..SIDE {
            if r > 0 && r % 3 == 0 {
                queue!(out, Print("---+---+---\r\n"))?;
            }
            for c in 0..SIDE {
                if c > 0 && c % 3 == 0 {
                    queue!(out, Print("|"))?;
                }
                let pos = Position::new(r, c);
                let value = self.board.value(pos);
                let glyph = if value == 0 {
                    ".".to_string().dark_grey()
                } else if self.board.is_given(pos) {
                    char::from(b'0' + value).to_string().bold()
                } else if self.last.map(|s| s.pos) == Some(pos) {
                    char::from(b'0' + value).to_string().yellow()
                } else {
                    char::from(b'0' + value).to_string().cyan()
                };
                queue!(out, Print(glyph))?;
            }
            queue!(out, Print("\r\n"))?;
        }
        out.flush()
    }
}

impl StepObserver<BacktrackSearch> for BoardAnimator {
    fn on_step(&mut self, step: &CellStep) -> DriverControl {
        let applied = match step.tag {
            CellTag::Placed => self.board.place(step.pos, step.value).is_ok(),
            CellTag::Retracted => self.board.retract(step.pos).is_ok(),
        };
        self.last = Some(*step);
        if applied && self.draw().is_ok() {
            DriverControl::Continue
        } else {
            DriverControl::Cancel
        }
    }

    fn on_done(&mut self, _outcome: &Outcome<SudokuBoard>) {}
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let board = SudokuBoard::parse(PUZZLE)?;

    execute!(io::stdout(), Clear(ClearType::All), Hide)?;
    let driver = StepDriver::with_pace(Duration::from_millis(5));
    let mut results = Vec::new();
    for kind in [SolverKind::Chronological, SolverKind::MinimumRemaining] {
        let mut engine = Engine::new(BacktrackSearch::new(board.clone(), kind)?);
        let mut animator = BoardAnimator::new(board.clone());
        let outcome = driver.run(&mut engine, &mut animator);
        results.push((kind, outcome, engine.steps_taken()));
    }
    execute!(io::stdout(), MoveTo(0, 12), Show)?;

    for (kind, outcome, steps) in &results {
        match outcome {
            Outcome::Found(solved) => {
                println!("{} solved the puzzle in {} steps:\n{}", kind, steps, solved)
            }
            Outcome::Exhausted => println!("{}: no solution exists ({} steps)", kind, steps),
            Outcome::Cancelled => println!("{}: cancelled after {} steps", kind, steps),
        }
    }
    Ok(())
}
