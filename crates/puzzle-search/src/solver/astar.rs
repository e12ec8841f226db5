//! Best-first (A*) solver.
//!
//! Expands positions in order of accumulated cost plus the puzzle's estimate
//! of the remaining cost. With an estimate that never overestimates, the
//! first goal popped is a cheapest one. Equal priorities are popped in
//! insertion order, so a fixed puzzle always yields the same path.

use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::{BinaryHeap, HashMap};
use std::sync::Arc;
use std::time::Instant;

use log::debug;

use crate::error::SearchError;
use crate::node::SearchNode;
use crate::puzzle::Puzzle;
use crate::solver::{notify_expand, report_finished, Interrupt, Outcome, PuzzleSolver, SearchStats};

/// A frontier entry
struct Candidate<P, M> {
    /// Cost so far plus estimate
    priority: u64,
    seq: u64,
    cost: u64,
    node: Arc<SearchNode<P, M>>,
}

impl<P, M> PartialEq for Candidate<P, M> {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl<P, M> Eq for Candidate<P, M> {}

impl<P, M> Ord for Candidate<P, M> {
    // BinaryHeap is a max-heap: reverse so the lowest priority, then the
    // oldest entry, comes out first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<P, M> PartialOrd for Candidate<P, M> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub struct AStarSolver<'a, P: Puzzle> {
    puzzle: &'a P,
    interrupt: Interrupt,
    stats: SearchStats,
}

impl<'a, P: Puzzle> AStarSolver<'a, P> {
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
}

impl<'a, P: Puzzle> PuzzleSolver<P::Move> for AStarSolver<'a, P> {
    fn solve(&mut self) -> Result<Outcome<P::Move>, SearchError> {
        let start_time = Instant::now();
        let puzzle = self.puzzle;

        // Cheapest known cost for every position discovered so far
        let mut best: HashMap<P::Position, u64> = HashMap::new();
        let mut frontier = BinaryHeap::new();
        let mut seq: u64 = 0;
        let mut tries: u64 = 0;

        let initial = puzzle.initial_position();
        best.insert(puzzle.canonical(&initial), 0);
        frontier.push(Candidate {
            priority: puzzle.estimated_cost(&initial),
            seq,
            cost: 0,
            node: SearchNode::root(initial),
        });

        let mut solution = None;
        let mut interrupted = false;

        while let Some(candidate) = frontier.pop() {
            if self.interrupt.is_interrupted() {
                interrupted = true;
                break;
            }

            let position = candidate.node.position();

            // A cheaper route to this position was queued after this one
            let stale = best
                .get(&puzzle.canonical(position))
                .is_some_and(|&known| known < candidate.cost);
            if stale {
                continue;
            }

            if puzzle.is_goal(position) {
                solution = Some(candidate.node);
                break;
            }

            for mv in puzzle.legal_moves(position) {
                let child = puzzle.apply(position, &mv);
                let cost = candidate.cost.saturating_add(puzzle.move_cost(&mv));
                notify_expand(puzzle, &child, tries);
                tries += 1;

                match best.entry(puzzle.canonical(&child)) {
                    Entry::Occupied(known) if *known.get() <= cost => continue,
                    Entry::Occupied(mut known) => {
                        known.insert(cost);
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(cost);
                    }
                }

                seq += 1;
                frontier.push(Candidate {
                    priority: cost.saturating_add(puzzle.estimated_cost(&child)),
                    seq,
                    cost,
                    node: SearchNode::child(&candidate.node, mv, child),
                });
            }
        }
        frontier.clear();

        let outcome = match (&solution, interrupted) {
            (_, true) => Outcome::Interrupted,
            (Some(node), false) => Outcome::Solved(node.path()),
            (None, false) => Outcome::Unsolvable,
        };

        self.stats = SearchStats {
            tries,
            visited: best.len(),
            time_elapsed_ms: start_time.elapsed().as_millis() as u64,
        };
        debug!(
            "a* search finished: solved={} tries={} visited={} in {}ms",
            outcome.is_solved(),
            self.stats.tries,
            self.stats.visited,
            self.stats.time_elapsed_ms
        );

        let final_position = solution.as_ref().map(|node| node.position());
        report_finished(puzzle, &outcome, final_position, &self.stats);
        Ok(outcome)
    }

    fn stats(&self) -> SearchStats {
        self.stats
    }

    fn interrupt_handle(&self) -> Interrupt {
        self.interrupt.clone()
    }
}
