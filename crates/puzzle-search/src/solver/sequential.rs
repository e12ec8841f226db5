//! Exhaustive depth-first solver.
//!
//! Finds a solution whenever one is reachable, but not necessarily the
//! cheapest or the shortest. The walk uses an explicit frame stack instead of
//! recursion so deep state spaces cannot overflow the thread stack; positions
//! are entered, counted and reported in the same order a recursive walk would.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use log::debug;

use crate::error::SearchError;
use crate::node::SearchNode;
use crate::puzzle::Puzzle;
use crate::solver::{notify_expand, report_finished, Interrupt, Outcome, PuzzleSolver, SearchStats};

type Node<P> = SearchNode<<P as Puzzle>::Position, <P as Puzzle>::Move>;

/// A node whose moves are being tried, with the moves not yet tried
struct Frame<P: Puzzle> {
    node: Arc<Node<P>>,
    moves: std::vec::IntoIter<P::Move>,
}

/// What happened when the walk stepped onto a node
enum Entered<P: Puzzle> {
    Seen,
    Goal(Arc<Node<P>>),
    Open(Frame<P>),
}

enum Walk<P: Puzzle> {
    Found(Arc<Node<P>>),
    Exhausted,
    Interrupted,
}

pub struct SequentialSolver<'a, P: Puzzle> {
    puzzle: &'a P,
    interrupt: Interrupt,
    stats: SearchStats,
}

impl<'a, P: Puzzle> SequentialSolver<'a, P> {
    pub fn new(puzzle: &'a P) -> Self {
        Self {
            puzzle,
            interrupt: Interrupt::new(),
            stats: SearchStats::default(),
        }
    }

    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    fn enter(&self, node: Arc<Node<P>>, seen: &mut HashSet<P::Position>) -> Entered<P> {
        let position = node.position();
        if !seen.insert(self.puzzle.canonical(position)) {
            return Entered::Seen;
        }
        if self.puzzle.is_goal(position) {
            return Entered::Goal(node);
        }
        let moves = self.puzzle.legal_moves(position).into_iter();
        Entered::Open(Frame { node, moves })
    }

    fn walk(&self, seen: &mut HashSet<P::Position>, tries: &mut u64) -> Walk<P> {
        if self.interrupt.is_interrupted() {
            return Walk::Interrupted;
        }
        let root = SearchNode::root(self.puzzle.initial_position());
        let mut stack: Vec<Frame<P>> = match self.enter(root, seen) {
            Entered::Goal(node) => return Walk::Found(node),
            Entered::Seen => return Walk::Exhausted,
            Entered::Open(frame) => vec![frame],
        };

        while let Some(frame) = stack.last_mut() {
            if self.interrupt.is_interrupted() {
                return Walk::Interrupted;
            }

            let Some(mv) = frame.moves.next() else {
                stack.pop();
                continue;
            };
            let parent = Arc::clone(&frame.node);

            let position = self.puzzle.apply(parent.position(), &mv);
            notify_expand(self.puzzle, &position, *tries);
            *tries += 1;

            let child = SearchNode::child(&parent, mv, position);
            match self.enter(child, seen) {
                Entered::Goal(node) => return Walk::Found(node),
                Entered::Open(frame) => stack.push(frame),
                Entered::Seen => {}
            }
        }

        Walk::Exhausted
    }
}

impl<'a, P: Puzzle> PuzzleSolver<P::Move> for SequentialSolver<'a, P> {
    fn solve(&mut self) -> Result<Outcome<P::Move>, SearchError> {
        let start_time = Instant::now();
        let mut seen = HashSet::new();
        let mut tries: u64 = 0;

        let walk = self.walk(&mut seen, &mut tries);

        let (outcome, solution) = match walk {
            Walk::Found(node) => (Outcome::Solved(node.path()), Some(node)),
            Walk::Exhausted => (Outcome::Unsolvable, None),
            Walk::Interrupted => (Outcome::Interrupted, None),
        };

        self.stats = SearchStats {
            tries,
            visited: seen.len(),
            time_elapsed_ms: start_time.elapsed().as_millis() as u64,
        };
        debug!(
            "sequential search finished: solved={} tries={} visited={} in {}ms",
            outcome.is_solved(),
            self.stats.tries,
            self.stats.visited,
            self.stats.time_elapsed_ms
        );

        let final_position = solution.as_ref().map(|node| node.position());
        report_finished(self.puzzle, &outcome, final_position, &self.stats);
        Ok(outcome)
    }

    fn stats(&self) -> SearchStats {
        self.stats
    }

    fn interrupt_handle(&self) -> Interrupt {
        self.interrupt.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzles::{BridgePuzzle, PailsPuzzle};
    use crate::solver::test_support::{assert_reaches_goal, targets, GraphPuzzle};

    #[test]
    fn test_follows_move_order_depth_first() {
        // 0 -> 1 -> 3 -> 4 is found before the shorter 0 -> 2 -> 4 is tried
        let graph = GraphPuzzle::new(0, &[4], &[(0, 1, 1), (0, 2, 1), (1, 3, 1), (3, 4, 1), (2, 4, 1)]);
        let mut solver = SequentialSolver::new(&graph);
        assert_eq!(targets(solver.solve().unwrap()), Some(vec![1, 3, 4]));
        assert_eq!(solver.stats().tries, 3);
    }

    #[test]
    fn test_seen_positions_are_pruned() {
        // Both branches reach 3; the second visit must not be expanded again
        let graph = GraphPuzzle::new(
            0,
            &[],
            &[(0, 1, 1), (0, 2, 1), (1, 3, 1), (2, 3, 1), (3, 4, 1)],
        );
        let mut solver = SequentialSolver::new(&graph);
        assert_eq!(solver.solve().unwrap(), Outcome::Unsolvable);
        // 0->1, 1->3, 3->4, 0->2, 2->3 (pruned on entry)
        assert_eq!(solver.stats().tries, 5);
        assert_eq!(solver.stats().visited, 5);
    }

    #[test]
    fn test_cycles_terminate() {
        let graph = GraphPuzzle::new(0, &[], &[(0, 1, 1), (1, 0, 1), (1, 1, 1)]);
        let mut solver = SequentialSolver::new(&graph);
        assert_eq!(solver.solve().unwrap(), Outcome::Unsolvable);
        assert_eq!(solver.stats().visited, 2);
    }

    #[test]
    fn test_solves_bridge_and_pails() {
        let bridge = BridgePuzzle::new(vec![1, 2, 5, 10]).unwrap();
        let moves = SequentialSolver::new(&bridge).solve().unwrap().into_moves().unwrap();
        assert_reaches_goal(&bridge, &moves);

        let pails = PailsPuzzle::new(3, 5, 4).unwrap();
        let moves = SequentialSolver::new(&pails).solve().unwrap().into_moves().unwrap();
        assert_reaches_goal(&pails, &moves);
    }

    #[test]
    fn test_interrupt_from_progress_hook() {
        struct Endless {
            interrupt: Interrupt,
        }

        impl Puzzle for Endless {
            type Position = u64;
            type Move = ();

            fn initial_position(&self) -> u64 {
                0
            }
            fn is_goal(&self, _position: &u64) -> bool {
                false
            }
            fn legal_moves(&self, _position: &u64) -> Vec<()> {
                vec![()]
            }
            fn apply(&self, position: &u64, _mv: &()) -> u64 {
                position + 1
            }
            fn on_expand(&self, _position: &u64, tries: u64) {
                if tries == 1000 {
                    self.interrupt.interrupt();
                }
            }
        }

        let interrupt = Interrupt::new();
        let puzzle = Endless {
            interrupt: interrupt.clone(),
        };
        let mut solver = SequentialSolver::new(&puzzle).with_interrupt(interrupt);
        assert_eq!(solver.solve().unwrap(), Outcome::Interrupted);
        assert_eq!(solver.stats().tries, 1001);
    }
}
