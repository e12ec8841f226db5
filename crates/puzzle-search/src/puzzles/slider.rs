//! Sliding tile puzzle on an n×n board.
//!
//! A move slides a tile next to the blank into the blank. The goal has the
//! tiles in order with the blank in the bottom right corner.

use serde::Serialize;

use crate::puzzle::Puzzle;
use crate::puzzles::ConfigError;

/// Tiles are stored as `u8`
const MAX_SIZE: usize = 15;

/// Neighbours of the blank, in the order moves are generated
const OFFSETS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Location {
    pub row: u8,
    pub col: u8,
}

/// The tile at `from` slides into the blank at `to`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SlideMove {
    pub from: Location,
    pub to: Location,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SliderPosition {
    tiles: Vec<u8>,
}

impl SliderPosition {
    pub fn tiles(&self) -> &[u8] {
        &self.tiles
    }

    fn blank(&self) -> usize {
        self.tiles.iter().position(|&t| t == 0).unwrap_or(0)
    }
}

#[derive(Debug, Clone)]
pub struct SliderPuzzle {
    size: usize,
    initial: SliderPosition,
}

impl SliderPuzzle {
    /// `tiles` are row-major with 0 as the blank
    pub fn new(size: usize, tiles: Vec<u8>) -> Result<Self, ConfigError> {
        if !(2..=MAX_SIZE).contains(&size) {
            return Err(ConfigError::BoardSize {
                size,
                max: MAX_SIZE,
            });
        }
        let mut sorted = tiles.clone();
        sorted.sort_unstable();
        let complete = sorted.len() == size * size
            && sorted.iter().enumerate().all(|(i, &t)| t as usize == i);
        if !complete {
            return Err(ConfigError::BoardTiles { size });
        }
        Ok(Self {
            size,
            initial: SliderPosition { tiles },
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    fn location(&self, index: usize) -> Location {
        Location {
            row: (index / self.size) as u8,
            col: (index % self.size) as u8,
        }
    }

    fn index(&self, location: Location) -> usize {
        location.row as usize * self.size + location.col as usize
    }
}

impl Puzzle for SliderPuzzle {
    type Position = SliderPosition;
    type Move = SlideMove;

    fn initial_position(&self) -> SliderPosition {
        self.initial.clone()
    }

    fn is_goal(&self, position: &SliderPosition) -> bool {
        let last = position.tiles.len() - 1;
        position.tiles[last] == 0
            && position.tiles[..last]
                .iter()
                .enumerate()
                .all(|(i, &t)| t as usize == i + 1)
    }

    fn legal_moves(&self, position: &SliderPosition) -> Vec<SlideMove> {
        let blank = self.location(position.blank());
        OFFSETS
            .iter()
            .filter_map(|&(dr, dc)| {
                let row = blank.row as isize + dr;
                let col = blank.col as isize + dc;
                let bounds = 0..self.size as isize;
                let inside = bounds.contains(&row) && bounds.contains(&col);
                inside.then(|| SlideMove {
                    from: Location {
                        row: row as u8,
                        col: col as u8,
                    },
                    to: blank,
                })
            })
            .collect()
    }

    fn apply(&self, position: &SliderPosition, mv: &SlideMove) -> SliderPosition {
        let mut tiles = position.tiles.clone();
        tiles.swap(self.index(mv.from), self.index(mv.to));
        SliderPosition { tiles }
    }

    /// Sum of Manhattan distances of every tile from its home
    fn estimated_cost(&self, position: &SliderPosition) -> u64 {
        position
            .tiles
            .iter()
            .enumerate()
            .filter(|&(_, &tile)| tile != 0)
            .map(|(index, &tile)| {
                let here = self.location(index);
                let home = self.location(tile as usize - 1);
                (here.row.abs_diff(home.row) + here.col.abs_diff(home.col)) as u64
            })
            .sum()
    }
}
