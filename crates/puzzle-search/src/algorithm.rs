//! Named search strategies.
//!
//! A lookup from strategy name to solver construction parameters. Holds no
//! search logic of its own.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::puzzle::Puzzle;
use crate::solver::{
    AStarSolver, ConcurrentSolver, ExplorationBias, Interrupt, PuzzleSolver, SequentialSolver,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    /// Best-first on cost plus estimate; cheapest solution
    AStarSequential,
    /// Depth-first; first solution found
    SimpleSequential,
    /// Worker pool, exhaustive; cheapest solution
    ConcurrentBreadth,
    /// Worker pool racing towards any solution
    ConcurrentDepth,
    /// Worker pool balancing speed and solution quality
    ConcurrentOptimum,
}

/// Overrides applied when building a solver
#[derive(Debug, Clone, Default)]
pub struct SolverOptions {
    /// Worker threads for the concurrent strategies
    pub workers: Option<usize>,
    /// Replaces the preset bias of a concurrent strategy
    pub bias: Option<ExplorationBias>,
    pub interrupt: Option<Interrupt>,
}

impl Algorithm {
    pub const ALL: [Algorithm; 5] = [
        Algorithm::AStarSequential,
        Algorithm::SimpleSequential,
        Algorithm::ConcurrentBreadth,
        Algorithm::ConcurrentDepth,
        Algorithm::ConcurrentOptimum,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Algorithm::AStarSequential => "A* sequential",
            Algorithm::SimpleSequential => "Simple sequential",
            Algorithm::ConcurrentBreadth => "Concurrent (breadth, shortest)",
            Algorithm::ConcurrentDepth => "Concurrent (depth, fastest)",
            Algorithm::ConcurrentOptimum => "Concurrent (optimum)",
        }
    }

    /// Preset bias, or `None` for the sequential strategies
    pub fn exploration_bias(self) -> Option<ExplorationBias> {
        match self {
            Algorithm::AStarSequential | Algorithm::SimpleSequential => None,
            Algorithm::ConcurrentBreadth => Some(ExplorationBias::BREADTH),
            Algorithm::ConcurrentDepth => Some(ExplorationBias::DEPTH),
            Algorithm::ConcurrentOptimum => Some(ExplorationBias::OPTIMUM),
        }
    }

    pub fn is_concurrent(self) -> bool {
        self.exploration_bias().is_some()
    }

    pub fn create_solver<'a, P>(self, puzzle: &'a P) -> Box<dyn PuzzleSolver<P::Move> + 'a>
    where
        P: Puzzle + Sync,
        P::Position: Send + Sync,
        P::Move: Send + Sync,
    {
        self.configure(puzzle, &SolverOptions::default())
    }

    /// Build a solver for `puzzle`. Options that do not apply to this
    /// strategy are ignored.
    pub fn configure<'a, P>(
        self,
        puzzle: &'a P,
        options: &SolverOptions,
    ) -> Box<dyn PuzzleSolver<P::Move> + 'a>
    where
        P: Puzzle + Sync,
        P::Position: Send + Sync,
        P::Move: Send + Sync,
    {
        let interrupt = options.interrupt.clone().unwrap_or_default();
        match self.exploration_bias() {
            None if self == Algorithm::SimpleSequential => {
                Box::new(SequentialSolver::new(puzzle).with_interrupt(interrupt))
            }
            None => Box::new(AStarSolver::new(puzzle).with_interrupt(interrupt)),
            Some(preset) => {
                let mut solver = ConcurrentSolver::new(puzzle, options.bias.unwrap_or(preset))
                    .with_interrupt(interrupt);
                if let Some(workers) = options.workers {
                    solver = solver.with_workers(workers);
                }
                Box::new(solver)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzles::{BridgePuzzle, PailsPuzzle};
    use crate::solver::Outcome;

    #[test]
    fn test_presets() {
        assert_eq!(Algorithm::AStarSequential.exploration_bias(), None);
        assert_eq!(
            Algorithm::ConcurrentBreadth.exploration_bias().map(ExplorationBias::value),
            Some(1.0)
        );
        assert_eq!(
            Algorithm::ConcurrentDepth.exploration_bias().map(ExplorationBias::value),
            Some(0.12)
        );
        assert_eq!(
            Algorithm::ConcurrentOptimum.exploration_bias().map(ExplorationBias::value),
            Some(0.3)
        );
        assert_eq!(Algorithm::ALL.iter().filter(|a| a.is_concurrent()).count(), 3);
    }

    #[test]
    fn test_names() {
        let json = serde_json::to_string(&Algorithm::AStarSequential).unwrap();
        assert_eq!(json, "\"a-star-sequential\"");

        let parsed = Algorithm::from_str("concurrent-depth", false).unwrap();
        assert_eq!(parsed, Algorithm::ConcurrentDepth);
    }

    #[test]
    fn test_every_algorithm_solves() {
        let puzzle = PailsPuzzle::new(3, 5, 4).unwrap();
        for algorithm in Algorithm::ALL {
            let mut solver = algorithm.configure(
                &puzzle,
                &SolverOptions {
                    workers: Some(2),
                    ..SolverOptions::default()
                },
            );
            assert!(
                solver.solve().unwrap().is_solved(),
                "{} found no solution",
                algorithm.label()
            );
        }
    }

    #[test]
    fn test_shared_interrupt() {
        let puzzle = BridgePuzzle::new(vec![1, 2, 5, 10]).unwrap();
        let interrupt = Interrupt::new();
        interrupt.interrupt();
        let options = SolverOptions {
            interrupt: Some(interrupt),
            ..SolverOptions::default()
        };
        for algorithm in Algorithm::ALL {
            let mut solver = algorithm.configure(&puzzle, &options);
            assert_eq!(solver.solve().unwrap(), Outcome::Interrupted);
        }
    }

    #[test]
    fn test_breadth_preset_is_optimal() {
        let puzzle = BridgePuzzle::new(vec![1, 2, 5, 10]).unwrap();
        let mut solver = Algorithm::ConcurrentBreadth.create_solver(&puzzle);
        let moves = solver.solve().unwrap().into_moves().unwrap();
        assert_eq!(moves.len(), 5);
        assert_eq!(moves.iter().map(|m| m.cost()).sum::<u64>(), 17);
    }
}
