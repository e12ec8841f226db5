//! Concrete puzzles and the JSON format they are loaded from.
//!
//! Each puzzle is a small [`Puzzle`](crate::Puzzle) implementation; the
//! solvers know nothing about any of them.

pub mod bridge;
pub mod pails;
pub mod slider;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use bridge::{BridgeMove, BridgePosition, BridgePuzzle, Crossing};
pub use pails::{Pail, PailMove, PailsPosition, PailsPuzzle};
pub use slider::{Location, SlideMove, SliderPosition, SliderPuzzle};

/// Rejected puzzle description
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("a bridge puzzle takes 1 to {max} people, got {count}")]
    PeopleCount { count: usize, max: usize },

    #[error("crossing speeds must be positive")]
    ZeroSpeed,

    #[error("crossing speed {speed} exceeds the maximum of {max}")]
    SpeedTooLarge { speed: u64, max: u64 },

    #[error("board size {size} is outside 2..={max}")]
    BoardSize { size: usize, max: usize },

    #[error("tiles do not form a {size}x{size} board with exactly one blank")]
    BoardTiles { size: usize },

    #[error("pail capacities must be in 1..={max}, got {first} and {second}")]
    Capacity { first: u8, second: u8, max: u8 },

    #[error("target {target} does not fit in pails of {first} and {second}")]
    Target { target: u8, first: u8, second: u8 },
}

/// A puzzle description, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PuzzleConfig {
    Bridge {
        speeds: Vec<u64>,
    },
    Slider {
        size: usize,
        /// Row-major, 0 marks the blank
        tiles: Vec<u8>,
    },
    #[serde(rename_all = "camelCase")]
    Pails {
        first_pail: u8,
        second_pail: u8,
        target: u8,
    },
}

impl PuzzleConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            PuzzleConfig::Bridge { .. } => "bridge",
            PuzzleConfig::Slider { .. } => "slider",
            PuzzleConfig::Pails { .. } => "pails",
        }
    }
}
