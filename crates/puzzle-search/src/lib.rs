//! Puzzle-agnostic state-space search.
//!
//! A puzzle describes its positions and moves through the [`Puzzle`] trait;
//! the solvers in [`solver`] find a sequence of moves from the initial
//! position to a goal without knowing anything else about it. Pick a
//! strategy by name with [`Algorithm`].

pub mod algorithm;
pub mod error;
pub mod node;
pub mod puzzle;
pub mod puzzles;
pub mod solver;

// Re-export main types
pub use algorithm::{Algorithm, SolverOptions};
pub use error::SearchError;
pub use node::SearchNode;
pub use puzzle::Puzzle;
pub use puzzles::{ConfigError, PuzzleConfig};
pub use solver::{
    AStarSolver, ConcurrentSolver, ExplorationBias, Interrupt, Outcome, PuzzleSolver,
    SearchStats, SequentialSolver,
};
