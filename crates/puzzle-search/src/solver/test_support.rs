//! Fixtures shared by the solver tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crate::puzzle::Puzzle;
use crate::solver::Outcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub to: u32,
    pub cost: u64,
}

/// Target nodes of a solved graph search
pub fn targets(outcome: Outcome<Edge>) -> Option<Vec<u32>> {
    outcome
        .into_moves()
        .map(|moves| moves.iter().map(|edge| edge.to).collect())
}

/// Weighted directed graph exposed as a puzzle
pub struct GraphPuzzle {
    start: u32,
    goals: HashSet<u32>,
    edges: HashMap<u32, Vec<Edge>>,
    panicking_hook: bool,
    finished_calls: AtomicUsize,
    last_finished_tries: AtomicU64,
}

impl GraphPuzzle {
    pub fn new(start: u32, goals: &[u32], edges: &[(u32, u32, u64)]) -> Self {
        let mut adjacency: HashMap<u32, Vec<Edge>> = HashMap::new();
        for &(from, to, cost) in edges {
            adjacency.entry(from).or_default().push(Edge { to, cost });
        }
        Self {
            start,
            goals: goals.iter().copied().collect(),
            edges: adjacency,
            panicking_hook: false,
            finished_calls: AtomicUsize::new(0),
            last_finished_tries: AtomicU64::new(0),
        }
    }

    pub fn with_panicking_hook(mut self) -> Self {
        self.panicking_hook = true;
        self
    }

    pub fn reset_counters(&self) {
        self.finished_calls.store(0, Ordering::SeqCst);
        self.last_finished_tries.store(0, Ordering::SeqCst);
    }

    pub fn finished_calls(&self) -> usize {
        self.finished_calls.load(Ordering::SeqCst)
    }

    pub fn last_finished_tries(&self) -> u64 {
        self.last_finished_tries.load(Ordering::SeqCst)
    }
}

impl Puzzle for GraphPuzzle {
    type Position = u32;
    type Move = Edge;

    fn initial_position(&self) -> u32 {
        self.start
    }

    fn is_goal(&self, position: &u32) -> bool {
        self.goals.contains(position)
    }

    fn legal_moves(&self, position: &u32) -> Vec<Edge> {
        self.edges.get(position).cloned().unwrap_or_default()
    }

    fn apply(&self, _position: &u32, mv: &Edge) -> u32 {
        mv.to
    }

    fn move_cost(&self, mv: &Edge) -> u64 {
        mv.cost
    }

    fn on_expand(&self, _position: &u32, _tries: u64) {
        if self.panicking_hook {
            panic!("progress hook failure");
        }
    }

    fn on_finished(&self, _path: Option<&[Edge]>, _final: Option<&u32>, tries: u64, _elapsed_ms: u64) {
        self.finished_calls.fetch_add(1, Ordering::SeqCst);
        self.last_finished_tries.store(tries, Ordering::SeqCst);
    }
}

/// Replay `moves` and check that they end on a goal and pass through none before
pub fn assert_reaches_goal<P: Puzzle>(puzzle: &P, moves: &[P::Move]) {
    let mut position = puzzle.initial_position();
    for (i, mv) in moves.iter().enumerate() {
        assert!(!puzzle.is_goal(&position), "goal reached early, after {} moves", i);
        position = puzzle.apply(&position, mv);
    }
    assert!(puzzle.is_goal(&position), "path does not end on a goal");
}

pub fn path_cost<P: Puzzle>(puzzle: &P, moves: &[P::Move]) -> u64 {
    moves.iter().map(|mv| puzzle.move_cost(mv)).sum()
}

/// Number of distinct canonical positions reachable from the start
pub fn reachable_count<P: Puzzle>(puzzle: &P) -> usize {
    let start = puzzle.initial_position();
    let mut seen = HashSet::new();
    seen.insert(puzzle.canonical(&start));
    let mut queue = VecDeque::from([start]);
    while let Some(position) = queue.pop_front() {
        for mv in puzzle.legal_moves(&position) {
            let next = puzzle.apply(&position, &mv);
            if seen.insert(puzzle.canonical(&next)) {
                queue.push_back(next);
            }
        }
    }
    seen.len()
}
