//! The contract a concrete puzzle implements to be searched.
//!
//! Solvers only ever talk to a puzzle through this trait. Positions and moves
//! are opaque to them beyond equality and hashing.

use std::hash::Hash;

pub trait Puzzle {
    /// Complete, immutable snapshot of puzzle state
    type Position: Clone + Eq + Hash;
    /// One transition between two positions
    type Move: Clone;

    fn initial_position(&self) -> Self::Position;

    fn is_goal(&self, position: &Self::Position) -> bool;

    /// Moves playable from `position`, in the order they should be tried
    fn legal_moves(&self, position: &Self::Position) -> Vec<Self::Move>;

    /// Position reached by playing `mv`. Must be free of side effects.
    fn apply(&self, position: &Self::Position, mv: &Self::Move) -> Self::Position;

    /// Key under which a position is recorded as visited.
    ///
    /// This is the only duplicate test: every strategy treats two positions
    /// as already seen exactly when their keys are equal. Puzzles with
    /// symmetric states override it so that equivalent positions collapse
    /// onto one key.
    fn canonical(&self, position: &Self::Position) -> Self::Position {
        position.clone()
    }

    fn move_cost(&self, _mv: &Self::Move) -> u64 {
        1
    }

    /// Lower bound on the remaining cost to a goal. Must not overestimate
    /// for the best-first strategy to stay optimal.
    fn estimated_cost(&self, _position: &Self::Position) -> u64 {
        0
    }

    /// Progress notification for each generated position.
    /// Panics raised here are logged and ignored by the solvers.
    fn on_expand(&self, _position: &Self::Position, _tries: u64) {}

    /// Called exactly once when a solve ends, whatever the outcome
    fn on_finished(
        &self,
        _path: Option<&[Self::Move]>,
        _final_position: Option<&Self::Position>,
        _tries: u64,
        _elapsed_ms: u64,
    ) {
    }
}
