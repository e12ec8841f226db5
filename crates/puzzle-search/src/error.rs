//! Errors surfaced by the search engine.
//!
//! Not finding a solution is not an error: see [`crate::solver::Outcome`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    /// Exploration bias outside of `(0, 1]`
    #[error("exploration bias must be in (0, 1], got {0}")]
    InvalidBias(f64),

    /// The worker pool could not be started
    #[error("failed to spawn search worker: {0}")]
    Spawn(#[source] std::io::Error),

    /// A worker died mid-search; partial results are discarded
    #[error("search worker {worker} panicked, search aborted")]
    WorkerPanicked { worker: usize },
}
