use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};
use std::fmt::Debug;
use strum_macros::{Display, EnumIter, EnumString};

use crate::core::SearchSpace;
use crate::engine::{Outcome, Resumable, Tick};

/// The path-search strategies, selected at run start. Each variant owns a
/// different frontier representation but answers the same `advance()`
/// contract: expand one state per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString)]
pub enum PathAlgorithm {
    BreadthFirst,
    DepthFirst,
    AStar,
}

/// A partial path from the start to some frontier state, carried whole so
/// that reaching the goal needs no separate reconstruction pass.
#[derive(Debug)]
struct PathNode<G: SearchSpace> {
    states: Vec<G::State>,
    moves: Vec<G::Move>,
}

impl<G: SearchSpace> PathNode<G> {
    fn current(&self) -> &G::State {
        self.states.last().expect("path is never empty")
    }

    /// Edge count so far; the `g` of uniform-cost searches.
    fn cost(&self) -> usize {
        self.moves.len()
    }

    fn extended(&self, state: G::State, mv: G::Move) -> PathNode<G> {
        let mut states = self.states.clone();
        let mut moves = self.moves.clone();
        states.push(state);
        moves.push(mv);
        PathNode { states, moves }
    }
}

struct HeapEntry<G: SearchSpace> {
    f: usize,
    seq: u64,
    node: PathNode<G>,
}

impl<G: SearchSpace> PartialEq for HeapEntry<G> {
    fn eq(&self, other: &Self) -> bool {
        self.f == other.f && self.seq == other.seq
    }
}

impl<G: SearchSpace> Eq for HeapEntry<G> {}

impl<G: SearchSpace> PartialOrd for HeapEntry<G> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<G: SearchSpace> Ord for HeapEntry<G> {
    // Inverted so the max-heap pops the smallest f; ties go to the
    // earliest insertion, keeping runs reproducible.
    fn cmp(&self, other: &Self) -> Ordering {
        other.f.cmp(&self.f).then_with(|| other.seq.cmp(&self.seq))
    }
}

enum Frontier<G: SearchSpace> {
    Queue(VecDeque<PathNode<G>>),
    Stack(Vec<PathNode<G>>),
    Heap { heap: BinaryHeap<HeapEntry<G>>, seq: u64 },
}

enum Visited<S> {
    Membership(HashSet<S>),
    BestCost(HashMap<S, usize>),
}

impl<S: Clone + Eq + std::hash::Hash> Visited<S> {
    fn snapshot(&self) -> HashSet<S> {
        match self {
            Visited::Membership(set) => set.clone(),
            Visited::BestCost(map) => map.keys().cloned().collect(),
        }
    }
}

/// What the caller observes per expansion: the partial path popped from
/// the frontier and a snapshot of the visited set at that moment. Steps
/// are transient rendering material, never needed for correctness.
pub struct ExploreStep<G: SearchSpace> {
    pub path: Vec<G::State>,
    pub moves: Vec<G::Move>,
    pub visited: HashSet<G::State>,
}

impl<G: SearchSpace> ExploreStep<G> {
    /// The state being expanded this step.
    pub fn current(&self) -> &G::State {
        self.path.last().expect("path is never empty")
    }
}

impl<G: SearchSpace> Debug for ExploreStep<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExploreStep")
            .field("current", self.current())
            .field("path_len", &self.path.len())
            .field("visited", &self.visited.len())
            .finish()
    }
}

/// A complete start-to-goal path, states and the moves between them.
pub struct FoundPath<G: SearchSpace> {
    pub states: Vec<G::State>,
    pub moves: Vec<G::Move>,
}

impl<G: SearchSpace> FoundPath<G> {
    pub fn edges(&self) -> usize {
        self.moves.len()
    }
}

impl<G: SearchSpace> Clone for FoundPath<G> {
    fn clone(&self) -> Self {
        FoundPath { states: self.states.clone(), moves: self.moves.clone() }
    }
}

impl<G: SearchSpace> Debug for FoundPath<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FoundPath")
            .field("states", &self.states)
            .field("moves", &self.moves)
            .finish()
    }
}

impl<G: SearchSpace> PartialEq for FoundPath<G>
where
    G::Move: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.states == other.states && self.moves == other.moves
    }
}

/// Stepwise exploration of a `SearchSpace`. Each `advance()` pops one
/// path from the frontier, reports it as an `ExploreStep`, and pushes the
/// unvisited neighbors; the call after the goal was popped yields the
/// terminal `Found`. The frontier and visited set belong to this value
/// alone and die with it, so a fresh run always starts from scratch.
///
/// BFS marks states visited when they are enqueued, never re-expanding a
/// state, which with unit edge costs makes its paths shortest. DFS does
/// the same but offers no length guarantee; its neighbors are pushed in
/// reverse so the stack pops them in the same Up/Down/Left/Right order
/// the other searches expand in (a presentation choice, not correctness).
/// AStar keeps a best-known-g map instead and re-enqueues a state only
/// when a strictly cheaper path to it appears; the heap is unbounded and
/// stale entries are simply popped late, which is harmless under an
/// admissible consistent heuristic.
pub struct PathSearch<G: SearchSpace> {
    space: G,
    algorithm: PathAlgorithm,
    frontier: Frontier<G>,
    visited: Visited<G::State>,
    expanded: usize,
    outcome: Option<Outcome<FoundPath<G>>>,
}

impl<G: SearchSpace> PathSearch<G> {
    pub fn new(space: G, algorithm: PathAlgorithm) -> Self {
        let start = space.start();
        let root = PathNode::<G> { states: vec![start.clone()], moves: Vec::new() };
        let (frontier, visited) = match algorithm {
            PathAlgorithm::BreadthFirst => {
                let mut set = HashSet::new();
                set.insert(start);
                (Frontier::Queue(VecDeque::from([root])), Visited::Membership(set))
            }
            PathAlgorithm::DepthFirst => {
                let mut set = HashSet::new();
                set.insert(start);
                (Frontier::Stack(vec![root]), Visited::Membership(set))
            }
            PathAlgorithm::AStar => {
                let f = space.heuristic(&start);
                let mut heap = BinaryHeap::new();
                heap.push(HeapEntry { f, seq: 0, node: root });
                (Frontier::Heap { heap, seq: 0 }, Visited::BestCost(HashMap::new()))
            }
        };
        PathSearch { space, algorithm, frontier, visited, expanded: 0, outcome: None }
    }

    pub fn algorithm(&self) -> PathAlgorithm {
        self.algorithm
    }

    pub fn space(&self) -> &G {
        &self.space
    }

    /// States expanded so far (popped from the frontier).
    pub fn expanded(&self) -> usize {
        self.expanded
    }

    fn pop(&mut self) -> Option<PathNode<G>> {
        match &mut self.frontier {
            Frontier::Queue(queue) => queue.pop_front(),
            Frontier::Stack(stack) => stack.pop(),
            Frontier::Heap { heap, .. } => heap.pop().map(|entry| entry.node),
        }
    }

    fn expand(&mut self, node: &PathNode<G>) {
        let neighbors = self.space.neighbors(node.current());
        match &mut self.frontier {
            Frontier::Queue(queue) => {
                let Visited::Membership(seen) = &mut self.visited else { unreachable!() };
                for (state, mv) in neighbors {
                    if seen.insert(state.clone()) {
                        queue.push_back(node.extended(state, mv));
                    }
                }
            }
            Frontier::Stack(stack) => {
                let Visited::Membership(seen) = &mut self.visited else { unreachable!() };
                for (state, mv) in neighbors.into_iter().rev() {
                    if seen.insert(state.clone()) {
                        stack.push(node.extended(state, mv));
                    }
                }
            }
            Frontier::Heap { heap, seq } => {
                let Visited::BestCost(best) = &mut self.visited else { unreachable!() };
                let g = node.cost() + 1;
                for (state, mv) in neighbors {
                    let improved = match best.get(&state) {
                        None => true,
                        Some(&recorded) => g < recorded,
                    };
                    if improved {
                        best.insert(state.clone(), g);
                        *seq += 1;
                        let f = g + self.space.heuristic(&state);
                        heap.push(HeapEntry { f, seq: *seq, node: node.extended(state, mv) });
                    }
                }
            }
        }
    }
}

impl<G: SearchSpace> Resumable for PathSearch<G> {
    type Step = ExploreStep<G>;
    type Solution = FoundPath<G>;

    fn advance(&mut self) -> Tick<ExploreStep<G>, FoundPath<G>> {
        if let Some(outcome) = &self.outcome {
            return Tick::Done(outcome.clone());
        }
        let Some(node) = self.pop() else {
            self.outcome = Some(Outcome::Exhausted);
            return Tick::Done(Outcome::Exhausted);
        };
        self.expanded += 1;
        let step = ExploreStep {
            path: node.states.clone(),
            moves: node.moves.clone(),
            visited: self.visited.snapshot(),
        };
        if self.space.is_goal(node.current()) {
            // The goal expansion is still observable as a step; the
            // terminal result arrives on the next advance.
            self.outcome = Some(Outcome::Found(FoundPath { states: node.states, moves: node.moves }));
        } else {
            self.expand(&node);
        }
        Tick::Step(step)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::Position;
    use crate::engine::Engine;
    use crate::grid::{CellKind, GridMap, GridWorld};
    use crate::puzzle::TilePuzzle;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::VecDeque;

    fn open_grid(rows: usize, cols: usize) -> GridMap {
        let mut map = GridMap::new(rows, cols).unwrap();
        map.set_start(Position::new(0, 0)).unwrap();
        map.set_goal(Position::new(rows - 1, cols - 1)).unwrap();
        map
    }

    fn run_to_outcome<G: SearchSpace>(search: PathSearch<G>) -> (Outcome<FoundPath<G>>, usize) {
        let mut engine = Engine::new(search);
        loop {
            if let Tick::Done(outcome) = engine.advance() {
                return (outcome, engine.search().expanded());
            }
        }
    }

    fn assert_valid_grid_path(world: &GridWorld, path: &FoundPath<GridWorld>) {
        assert_eq!(path.states.first(), Some(&world.start()));
        assert!(world.is_goal(path.states.last().unwrap()));
        for pair in path.states.windows(2) {
            assert_eq!(pair[0].manhattan(&pair[1]), 1);
            assert!(!world.is_obstacle(pair[1]));
        }
    }

    /// Reference shortest-path distance, independent of PathSearch.
    fn brute_force_distance(world: &GridWorld) -> Option<usize> {
        let mut dist = std::collections::HashMap::new();
        let mut queue = VecDeque::from([world.start()]);
        dist.insert(world.start(), 0usize);
        while let Some(pos) = queue.pop_front() {
            let d = dist[&pos];
            if world.is_goal(&pos) {
                return Some(d);
            }
            for (next, _) in world.neighbors(&pos) {
                if !dist.contains_key(&next) {
                    dist.insert(next, d + 1);
                    queue.push_back(next);
                }
            }
        }
        None
    }

    #[test]
    fn test_bfs_shortest_on_open_3x3() {
        let world = open_grid(3, 3).world().unwrap();
        let (outcome, _) = run_to_outcome(PathSearch::new(world.clone(), PathAlgorithm::BreadthFirst));
        let Outcome::Found(path) = outcome else { panic!("expected a path") };
        assert_eq!(path.edges(), 4);
        assert_eq!(path.states.len(), 5);
        assert_valid_grid_path(&world, &path);
    }

    #[test]
    fn test_astar_matches_bfs_and_expands_no_more() {
        let mut map = open_grid(5, 5);
        map.set_cell(Position::new(1, 1), CellKind::Obstacle).unwrap();
        map.set_cell(Position::new(1, 2), CellKind::Obstacle).unwrap();
        map.set_cell(Position::new(3, 3), CellKind::Obstacle).unwrap();
        let world = map.world().unwrap();

        let (bfs, bfs_expanded) = run_to_outcome(PathSearch::new(world.clone(), PathAlgorithm::BreadthFirst));
        let (astar, astar_expanded) = run_to_outcome(PathSearch::new(world.clone(), PathAlgorithm::AStar));
        let (Outcome::Found(bfs_path), Outcome::Found(astar_path)) = (bfs, astar) else {
            panic!("both searches should find a path");
        };
        assert_eq!(astar_path.edges(), bfs_path.edges());
        assert!(astar_expanded <= bfs_expanded);
        assert_valid_grid_path(&world, &astar_path);
    }

    #[test]
    fn test_astar_does_not_reexpand_open_grid() {
        let world = open_grid(3, 3).world().unwrap();
        let (outcome, expanded) = run_to_outcome(PathSearch::new(world, PathAlgorithm::AStar));
        assert!(outcome.is_found());
        // 9 distinct states; re-enqueueing without a strict g improvement
        // would push this over.
        assert!(expanded <= 9);
    }

    #[test]
    fn test_dfs_path_is_valid() {
        let world = open_grid(4, 4).world().unwrap();
        let (outcome, _) = run_to_outcome(PathSearch::new(world.clone(), PathAlgorithm::DepthFirst));
        let Outcome::Found(path) = outcome else { panic!("expected a path") };
        assert_valid_grid_path(&world, &path);
    }

    #[test]
    fn test_walled_grid_exhausts() {
        let mut map = open_grid(3, 3);
        for r in 0..3 {
            map.set_cell(Position::new(r, 1), CellKind::Obstacle).unwrap();
        }
        let world = map.world().unwrap();
        for algorithm in [PathAlgorithm::BreadthFirst, PathAlgorithm::DepthFirst, PathAlgorithm::AStar] {
            let (outcome, _) = run_to_outcome(PathSearch::new(world.clone(), algorithm));
            assert_eq!(outcome, Outcome::Exhausted, "{}", algorithm);
        }
    }

    #[test]
    fn test_bfs_matches_brute_force_on_random_grids() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut checked = 0;
        for _ in 0..20 {
            let mut map = open_grid(6, 6);
            map.randomize(0.3, &mut rng);
            let world = map.world().unwrap();
            let expected = brute_force_distance(&world);
            let (outcome, _) = run_to_outcome(PathSearch::new(world.clone(), PathAlgorithm::BreadthFirst));
            match (expected, outcome) {
                (Some(d), Outcome::Found(path)) => {
                    assert_eq!(path.edges(), d);
                    checked += 1;
                }
                (None, Outcome::Exhausted) => {}
                (expected, outcome) => {
                    panic!("brute force {:?} disagrees with BFS {:?}", expected, outcome)
                }
            }
        }
        assert!(checked > 0, "no solvable grid in the sample");
    }

    #[test]
    fn test_goal_step_emitted_before_terminal() {
        // Start == goal: the single expansion is still observable.
        let mut map = GridMap::new(2, 2).unwrap();
        map.set_start(Position::new(0, 0)).unwrap();
        map.set_goal(Position::new(0, 0)).unwrap();
        let mut search = PathSearch::new(map.world().unwrap(), PathAlgorithm::BreadthFirst);
        match search.advance() {
            Tick::Step(step) => assert_eq!(*step.current(), Position::new(0, 0)),
            tick => panic!("expected a step, got {:?}", tick),
        }
        match search.advance() {
            Tick::Done(Outcome::Found(path)) => assert_eq!(path.edges(), 0),
            tick => panic!("expected Found, got {:?}", tick),
        }
    }

    #[test]
    fn test_cancelled_run_leaks_nothing_into_a_fresh_one() {
        let mut map = open_grid(6, 6);
        map.randomize(0.25, &mut StdRng::seed_from_u64(17));
        let world = map.world().unwrap();

        let trace = |limit: usize| -> Vec<Position> {
            let mut engine = Engine::new(PathSearch::new(world.clone(), PathAlgorithm::AStar));
            let mut seen = Vec::new();
            while seen.len() < limit {
                match engine.advance() {
                    Tick::Step(step) => seen.push(*step.current()),
                    Tick::Done(_) => break,
                }
            }
            engine.cancel();
            seen
        };

        // Cancelling after 5 steps and restarting from scratch replays
        // the exact same prefix as an uninterrupted run.
        let short = trace(5);
        let long = trace(50);
        assert_eq!(short[..], long[..short.len()]);
    }

    #[test]
    fn test_bfs_solves_scrambled_tile_puzzle() {
        let mut rng = StdRng::seed_from_u64(3);
        let puzzle = TilePuzzle::scrambled_by(3, 3, 8, &mut rng).unwrap();
        let (outcome, _) = run_to_outcome(PathSearch::new(puzzle.clone(), PathAlgorithm::BreadthFirst));
        let Outcome::Found(path) = outcome else { panic!("scramble walks are solvable") };
        assert!(path.edges() <= 8);
        // Replaying the move labels from the start reaches the goal.
        let mut state = puzzle.start();
        for mv in &path.moves {
            let (next, _) = puzzle
                .neighbors(&state)
                .into_iter()
                .find(|(_, m)| m == mv)
                .expect("move labels stay legal along the path");
            state = next;
        }
        assert!(puzzle.is_goal(&state));
    }

    #[test]
    fn test_astar_on_tile_puzzle_is_optimal_like_bfs() {
        let mut rng = StdRng::seed_from_u64(21);
        let puzzle = TilePuzzle::scrambled_by(3, 3, 10, &mut rng).unwrap();
        let (bfs, _) = run_to_outcome(PathSearch::new(puzzle.clone(), PathAlgorithm::BreadthFirst));
        let (astar, _) = run_to_outcome(PathSearch::new(puzzle, PathAlgorithm::AStar));
        let (Outcome::Found(b), Outcome::Found(a)) = (bfs, astar) else {
            panic!("both should solve the scramble");
        };
        assert_eq!(a.edges(), b.edges());
    }
}
