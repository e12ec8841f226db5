//! Search strategies and the contract they share.
//!
//! Every strategy is driven the same way: build it against a [`Puzzle`], call
//! [`PuzzleSolver::solve`], and read back an [`Outcome`]. Counters for the
//! last run are available through [`PuzzleSolver::stats`].

pub mod astar;
pub mod concurrent;
pub mod sequential;

#[cfg(test)]
pub(crate) mod test_support;

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::warn;
use serde::Serialize;

use crate::error::SearchError;
use crate::puzzle::Puzzle;

pub use astar::AStarSolver;
pub use concurrent::{ConcurrentSolver, ExplorationBias};
pub use sequential::SequentialSolver;

/// How a solve ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<M> {
    /// Moves from the initial position to a goal. Empty if the initial
    /// position is already a goal.
    Solved(Vec<M>),
    /// Every reachable position was explored without reaching a goal
    Unsolvable,
    /// The search was stopped through its [`Interrupt`] before finishing
    Interrupted,
}

impl<M> Outcome<M> {
    pub fn moves(&self) -> Option<&[M]> {
        match self {
            Outcome::Solved(moves) => Some(moves),
            _ => None,
        }
    }

    pub fn into_moves(self) -> Option<Vec<M>> {
        match self {
            Outcome::Solved(moves) => Some(moves),
            _ => None,
        }
    }

    pub fn is_solved(&self) -> bool {
        matches!(self, Outcome::Solved(_))
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(self, Outcome::Interrupted)
    }
}

/// Counters describing the most recent solve
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchStats {
    /// Child positions generated
    pub tries: u64,
    /// Distinct positions recorded as visited
    pub visited: usize,
    pub time_elapsed_ms: u64,
}

/// Cooperative cancellation flag, shareable across threads
#[derive(Debug, Clone, Default)]
pub struct Interrupt(Arc<AtomicBool>);

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every solver holding this handle to stop at its next expansion
    pub fn interrupt(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_interrupted(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

pub trait PuzzleSolver<M> {
    /// Search until a goal is reached, the space is exhausted, or the
    /// search is interrupted. Blocks the calling thread.
    fn solve(&mut self) -> Result<Outcome<M>, SearchError>;

    fn stats(&self) -> SearchStats;

    /// Handle that stops this solver when tripped from another thread
    fn interrupt_handle(&self) -> Interrupt;
}

/// Deliver a progress notification without letting a failing hook abort the search
pub(crate) fn notify_expand<P: Puzzle + ?Sized>(puzzle: &P, position: &P::Position, tries: u64) {
    let delivered = panic::catch_unwind(AssertUnwindSafe(|| puzzle.on_expand(position, tries)));
    if delivered.is_err() {
        warn!("progress hook panicked at try {}, ignoring", tries);
    }
}

/// Hand the end-of-search report to the puzzle
pub(crate) fn report_finished<P: Puzzle + ?Sized>(
    puzzle: &P,
    outcome: &Outcome<P::Move>,
    final_position: Option<&P::Position>,
    stats: &SearchStats,
) {
    puzzle.on_finished(
        outcome.moves(),
        final_position,
        stats.tries,
        stats.time_elapsed_ms,
    );
}
