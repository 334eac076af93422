use std::collections::HashSet;
use std::io::{self, Write};
use std::time::Duration;

use color_eyre::eyre::eyre;
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::style::{Print, Stylize};
use crossterm::terminal::{Clear, ClearType};
use crossterm::{execute, queue};
use rand::rngs::StdRng;
use rand::SeedableRng;

use stepwise_search::core::{Position, SearchSpace};
use stepwise_search::driver::{DriverControl, StepDriver, StepObserver};
use stepwise_search::engine::{Engine, Outcome};
use stepwise_search::grid::{GridMap, GridWorld};
use stepwise_search::pathfind::{ExploreStep, FoundPath, PathAlgorithm, PathSearch};

struct GridAnimator {
    world: GridWorld,
}

impl GridAnimator {
    fn draw(&self, path: &[Position], visited: &HashSet<Position>) -> io::Result<()> {
        let mut out = io::stdout();
        queue!(out, MoveTo(0, 0))?;
        let on_path: HashSet<Position> = path.iter().copied().collect();
        let current = path.last().copied();
        for r in 0..self.world.rows() {
            for c in 0..self.world.cols() {
                let pos = Position::new(r, c);
                let glyph = if Some(pos) == current {
                    "@".yellow().bold()
                } else if pos == self.world.start() {
                    "S".green().bold()
                } else if pos == self.world.goal() {
                    "G".green().bold()
                } else if self.world.is_obstacle(pos) {
                    "#".dark_grey()
                } else if on_path.contains(&pos) {
                    "*".cyan()
                } else if visited.contains(&pos) {
                    ".".blue()
                } else {
                    " ".stylize()
                };
                queue!(out, Print(glyph))?;
            }
            queue!(out, Print("\r\n"))?;
        }
        out.flush()
    }
}

impl StepObserver<PathSearch<GridWorld>> for GridAnimator {
    fn on_step(&mut self, step: &ExploreStep<GridWorld>) -> DriverControl {
        match self.draw(&step.path, &step.visited) {
            Ok(()) => DriverControl::Continue,
            Err(_) => DriverControl::Cancel,
        }
    }

    fn on_done(&mut self, _outcome: &Outcome<FoundPath<GridWorld>>) {}
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let mut map = GridMap::new(15, 40)?;
    map.set_start(Position::new(7, 2))?;
    map.set_goal(Position::new(7, 37))?;
    map.randomize(0.3, &mut StdRng::seed_from_u64(2024));
    let world = map.world()?;

    execute!(io::stdout(), Clear(ClearType::All), Hide)?;
    let driver = StepDriver::with_pace(Duration::from_millis(20));
    let mut results = Vec::new();
    for algorithm in [
        PathAlgorithm::BreadthFirst,
        PathAlgorithm::DepthFirst,
        PathAlgorithm::AStar,
    ] {
        let mut engine = Engine::new(PathSearch::new(world.clone(), algorithm));
        let mut animator = GridAnimator { world: world.clone() };
        let outcome = driver.run(&mut engine, &mut animator);
        results.push((algorithm, outcome, engine.search().expanded()));
    }
    execute!(io::stdout(), MoveTo(0, 15), Show)?;

    for (algorithm, outcome, expanded) in &results {
        match outcome {
            Outcome::Found(path) => {
                println!("{}: path of {} moves, {} states expanded", algorithm, path.edges(), expanded)
            }
            Outcome::Exhausted => println!("{}: no path exists ({} states expanded)", algorithm, expanded),
            Outcome::Cancelled => println!("{}: cancelled", algorithm),
        }
    }
    if results.iter().any(|(_, o, _)| matches!(o, Outcome::Cancelled)) {
        return Err(eyre!("animation was interrupted"));
    }
    Ok(())
}
