use rand::Rng;
use strum::IntoEnumIterator;

use crate::core::{Direction, Error, Position, SearchSpace};

/// A grid cell is either walkable or an obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellKind {
    #[default]
    Free,
    Obstacle,
}

const EMPTY_GRID: Error = Error::new_const("Grid dimensions must be non-zero");
const OUT_OF_BOUNDS: Error = Error::new_const("Position out of grid bounds");
const NO_START: Error = Error::new_const("No start position set");
const NO_GOAL: Error = Error::new_const("No goal position set");
const START_ON_OBSTACLE: Error = Error::new_const("Start position is an obstacle");
const GOAL_ON_OBSTACLE: Error = Error::new_const("Goal position is an obstacle");

/// The editable grid a caller paints obstacles onto and picks endpoints
/// in. Nothing here is consumed by a search directly; `world()` freezes
/// the current contents into an immutable `GridWorld` per run.
#[derive(Debug, Clone)]
pub struct GridMap {
    rows: usize,
    cols: usize,
    cells: Vec<CellKind>,
    start: Option<Position>,
    goal: Option<Position>,
}

impl GridMap {
    pub fn new(rows: usize, cols: usize) -> Result<Self, Error> {
        if rows == 0 || cols == 0 {
            return Err(EMPTY_GRID);
        }
        Ok(GridMap {
            rows,
            cols,
            cells: vec![CellKind::Free; rows * cols],
            start: None,
            goal: None,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    fn index(&self, pos: Position) -> Result<usize, Error> {
        if pos.row >= self.rows || pos.col >= self.cols {
            return Err(OUT_OF_BOUNDS);
        }
        Ok(pos.row * self.cols + pos.col)
    }

    pub fn cell(&self, pos: Position) -> Result<CellKind, Error> {
        Ok(self.cells[self.index(pos)?])
    }

    pub fn set_cell(&mut self, pos: Position, kind: CellKind) -> Result<(), Error> {
        let i = self.index(pos)?;
        self.cells[i] = kind;
        Ok(())
    }

    pub fn start(&self) -> Option<Position> {
        self.start
    }

    pub fn goal(&self) -> Option<Position> {
        self.goal
    }

    pub fn set_start(&mut self, pos: Position) -> Result<(), Error> {
        self.index(pos)?;
        self.start = Some(pos);
        Ok(())
    }

    pub fn set_goal(&mut self, pos: Position) -> Result<(), Error> {
        self.index(pos)?;
        self.goal = Some(pos);
        Ok(())
    }

    /// Clear every obstacle, keeping endpoints.
    pub fn clear_obstacles(&mut self) {
        self.cells.fill(CellKind::Free);
    }

    /// Scatter obstacles over roughly `density` of the grid. A cell is
    /// only eligible while it has no diagonally-adjacent obstacle, unless
    /// it also touches one orthogonally; that keeps obstacle clusters
    /// connected instead of forming checkerboards the searches slide
    /// through. Start/goal cells are never covered. Placement is bounded
    /// by an attempt budget, so dense requests may come up short.
    pub fn randomize<R: Rng + ?Sized>(&mut self, density: f64, rng: &mut R) {
        self.clear_obstacles();
        let total = self.rows * self.cols;
        let mut remaining = ((density.clamp(0.0, 1.0) * total as f64) as usize).min(total);
        let mut attempts = 0;
        let max_attempts = total * 10;
        while remaining > 0 && attempts < max_attempts {
            attempts += 1;
            let pos = Position::new(rng.random_range(0..self.rows), rng.random_range(0..self.cols));
            if Some(pos) == self.start || Some(pos) == self.goal {
                continue;
            }
            if self.cells[pos.row * self.cols + pos.col] == CellKind::Obstacle {
                continue;
            }
            if self.placement_allowed(pos) {
                self.cells[pos.row * self.cols + pos.col] = CellKind::Obstacle;
                remaining -= 1;
            }
        }
    }

    fn placement_allowed(&self, pos: Position) -> bool {
        let diagonal = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
        let orthogonal = [(-1, 0), (1, 0), (0, -1), (0, 1)];
        let occupied = |dr: isize, dc: isize| -> bool {
            let (Some(r), Some(c)) = (pos.row.checked_add_signed(dr), pos.col.checked_add_signed(dc))
            else {
                return false;
            };
            r < self.rows && c < self.cols && self.cells[r * self.cols + c] == CellKind::Obstacle
        };
        let touches_diagonal = diagonal.iter().any(|&(dr, dc)| occupied(dr, dc));
        let touches_orthogonal = orthogonal.iter().any(|&(dr, dc)| occupied(dr, dc));
        !touches_diagonal || touches_orthogonal
    }

    /// Freeze the current grid into an immutable per-run search space.
    /// Fails if either endpoint is unset or sits on an obstacle; this is
    /// the malformed-instance check, reported before any run starts.
    pub fn world(&self) -> Result<GridWorld, Error> {
        let start = self.start.ok_or(NO_START)?;
        let goal = self.goal.ok_or(NO_GOAL)?;
        if self.cell(start)? == CellKind::Obstacle {
            return Err(START_ON_OBSTACLE);
        }
        if self.cell(goal)? == CellKind::Obstacle {
            return Err(GOAL_ON_OBSTACLE);
        }
        Ok(GridWorld {
            rows: self.rows,
            cols: self.cols,
            cells: self.cells.clone(),
            start,
            goal,
        })
    }
}

/// Immutable snapshot of a grid at search start. The searches only ever
/// read this; their visited/frontier bookkeeping lives elsewhere.
#[derive(Debug, Clone)]
pub struct GridWorld {
    rows: usize,
    cols: usize,
    cells: Vec<CellKind>,
    start: Position,
    goal: Position,
}

impl GridWorld {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn goal(&self) -> Position {
        self.goal
    }

    pub fn is_obstacle(&self, pos: Position) -> bool {
        self.cells[pos.row * self.cols + pos.col] == CellKind::Obstacle
    }
}

impl SearchSpace for GridWorld {
    type State = Position;
    type Move = Direction;

    fn start(&self) -> Position {
        self.start
    }

    fn is_goal(&self, state: &Position) -> bool {
        *state == self.goal
    }

    fn neighbors(&self, state: &Position) -> Vec<(Position, Direction)> {
        Direction::iter()
            .filter_map(|dir| {
                state
                    .step(dir, self.rows, self.cols)
                    .filter(|next| !self.is_obstacle(*next))
                    .map(|next| (next, dir))
            })
            .collect()
    }

    fn heuristic(&self, state: &Position) -> usize {
        state.manhattan(&self.goal)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn three_by_three() -> GridMap {
        let mut map = GridMap::new(3, 3).unwrap();
        map.set_start(Position::new(0, 0)).unwrap();
        map.set_goal(Position::new(2, 2)).unwrap();
        map
    }

    #[test]
    fn test_world_requires_endpoints() {
        let map = GridMap::new(3, 3).unwrap();
        assert!(map.world().is_err());
        let mut map = GridMap::new(3, 3).unwrap();
        map.set_start(Position::new(0, 0)).unwrap();
        assert!(map.world().is_err());
        assert!(three_by_three().world().is_ok());
    }

    #[test]
    fn test_world_rejects_covered_endpoints() {
        let mut map = three_by_three();
        map.set_cell(Position::new(2, 2), CellKind::Obstacle).unwrap();
        assert!(map.world().is_err());
    }

    #[test]
    fn test_neighbor_order_and_filtering() {
        let world = three_by_three().world().unwrap();
        // Center cell sees all four, in Up, Down, Left, Right order.
        let n = world.neighbors(&Position::new(1, 1));
        assert_eq!(
            n,
            vec![
                (Position::new(0, 1), Direction::Up),
                (Position::new(2, 1), Direction::Down),
                (Position::new(1, 0), Direction::Left),
                (Position::new(1, 2), Direction::Right),
            ],
        );
        // Corner cell only sees in-bounds neighbors.
        let n = world.neighbors(&Position::new(0, 0));
        assert_eq!(
            n,
            vec![
                (Position::new(1, 0), Direction::Down),
                (Position::new(0, 1), Direction::Right),
            ],
        );
    }

    #[test]
    fn test_obstacles_filtered_from_neighbors() {
        let mut map = three_by_three();
        map.set_cell(Position::new(0, 1), CellKind::Obstacle).unwrap();
        let world = map.world().unwrap();
        let n = world.neighbors(&Position::new(1, 1));
        assert!(!n.iter().any(|(p, _)| *p == Position::new(0, 1)));
        assert_eq!(n.len(), 3);
    }

    #[test]
    fn test_randomize_spares_endpoints() {
        let mut map = three_by_three();
        let mut rng = StdRng::seed_from_u64(7);
        map.randomize(0.9, &mut rng);
        assert_eq!(map.cell(Position::new(0, 0)).unwrap(), CellKind::Free);
        assert_eq!(map.cell(Position::new(2, 2)).unwrap(), CellKind::Free);
    }

    #[test]
    fn test_randomize_is_seed_deterministic() {
        let mut a = GridMap::new(10, 10).unwrap();
        let mut b = GridMap::new(10, 10).unwrap();
        a.randomize(0.3, &mut StdRng::seed_from_u64(42));
        b.randomize(0.3, &mut StdRng::seed_from_u64(42));
        for r in 0..10 {
            for c in 0..10 {
                let pos = Position::new(r, c);
                assert_eq!(a.cell(pos).unwrap(), b.cell(pos).unwrap());
            }
        }
    }

    #[test]
    fn test_heuristic_is_manhattan_to_goal() {
        let world = three_by_three().world().unwrap();
        assert_eq!(world.heuristic(&Position::new(0, 0)), 4);
        assert_eq!(world.heuristic(&Position::new(2, 2)), 0);
    }
}
