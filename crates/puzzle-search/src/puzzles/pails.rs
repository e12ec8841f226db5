//! Two pails measuring puzzle.
//!
//! With two unmarked pails and a tap, measure out an exact amount by filling,
//! emptying, and pouring one pail into the other.

use serde::Serialize;

use crate::puzzle::Puzzle;
use crate::puzzles::ConfigError;

/// Largest capacity accepted for either pail
pub const MAX_CAPACITY: u8 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Pail {
    First,
    Second,
}

impl Pail {
    fn other(self) -> Pail {
        match self {
            Pail::First => Pail::Second,
            Pail::Second => Pail::First,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum PailMove {
    Fill { pail: Pail },
    Empty { pail: Pail },
    /// Pour from one pail into the other until it is empty or the other is full
    Pour { from: Pail },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PailsPosition {
    pub first: u8,
    pub second: u8,
}

impl PailsPosition {
    fn get(&self, pail: Pail) -> u8 {
        match pail {
            Pail::First => self.first,
            Pail::Second => self.second,
        }
    }

    fn with(mut self, pail: Pail, amount: u8) -> Self {
        match pail {
            Pail::First => self.first = amount,
            Pail::Second => self.second = amount,
        }
        self
    }
}

#[derive(Debug, Clone)]
pub struct PailsPuzzle {
    first: u8,
    second: u8,
    target: u8,
}

impl PailsPuzzle {
    pub fn new(first: u8, second: u8, target: u8) -> Result<Self, ConfigError> {
        let valid = |size: u8| (1..=MAX_CAPACITY).contains(&size);
        if !valid(first) || !valid(second) {
            return Err(ConfigError::Capacity {
                first,
                second,
                max: MAX_CAPACITY,
            });
        }
        if target == 0 || target > first.max(second) {
            return Err(ConfigError::Target {
                target,
                first,
                second,
            });
        }
        Ok(Self {
            first,
            second,
            target,
        })
    }

    fn capacity(&self, pail: Pail) -> u8 {
        match pail {
            Pail::First => self.first,
            Pail::Second => self.second,
        }
    }
}

impl Puzzle for PailsPuzzle {
    type Position = PailsPosition;
    type Move = PailMove;

    fn initial_position(&self) -> PailsPosition {
        PailsPosition { first: 0, second: 0 }
    }

    fn is_goal(&self, position: &PailsPosition) -> bool {
        position.first == self.target || position.second == self.target
    }

    // Moves that would leave the pails unchanged are not offered
    fn legal_moves(&self, position: &PailsPosition) -> Vec<PailMove> {
        let mut moves = Vec::with_capacity(6);
        for pail in [Pail::First, Pail::Second] {
            if position.get(pail) < self.capacity(pail) {
                moves.push(PailMove::Fill { pail });
            }
        }
        for pail in [Pail::First, Pail::Second] {
            if position.get(pail) > 0 {
                moves.push(PailMove::Empty { pail });
            }
        }
        for from in [Pail::First, Pail::Second] {
            let to = from.other();
            if position.get(from) > 0 && position.get(to) < self.capacity(to) {
                moves.push(PailMove::Pour { from });
            }
        }
        moves
    }

    fn apply(&self, position: &PailsPosition, mv: &PailMove) -> PailsPosition {
        match *mv {
            PailMove::Fill { pail } => position.with(pail, self.capacity(pail)),
            PailMove::Empty { pail } => position.with(pail, 0),
            PailMove::Pour { from } => {
                let to = from.other();
                let amount = position
                    .get(from)
                    .min(self.capacity(to) - position.get(to));
                position
                    .with(from, position.get(from) - amount)
                    .with(to, position.get(to) + amount)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_params() {
        assert!(matches!(
            PailsPuzzle::new(0, 5, 1),
            Err(ConfigError::Capacity { .. })
        ));
        assert!(PailsPuzzle::new(3, 21, 1).is_err());
        assert_eq!(
            PailsPuzzle::new(3, 5, 6).unwrap_err(),
            ConfigError::Target {
                target: 6,
                first: 3,
                second: 5
            }
        );
    }

    #[test]
    fn test_moves_skip_no_ops() {
        let puzzle = PailsPuzzle::new(3, 5, 4).unwrap();
        let empty = puzzle.initial_position();
        assert_eq!(
            puzzle.legal_moves(&empty),
            vec![
                PailMove::Fill { pail: Pail::First },
                PailMove::Fill { pail: Pail::Second }
            ]
        );

        let full = PailsPosition { first: 3, second: 5 };
        assert_eq!(
            puzzle.legal_moves(&full),
            vec![
                PailMove::Empty { pail: Pail::First },
                PailMove::Empty { pail: Pail::Second }
            ]
        );
    }

    #[test]
    fn test_pour_stops_when_full() {
        let puzzle = PailsPuzzle::new(3, 5, 4).unwrap();
        let position = PailsPosition { first: 3, second: 4 };
        let poured = puzzle.apply(&position, &PailMove::Pour { from: Pail::First });
        assert_eq!(poured, PailsPosition { first: 2, second: 5 });

        let back = puzzle.apply(&poured, &PailMove::Pour { from: Pail::Second });
        assert_eq!(back, PailsPosition { first: 3, second: 4 });
        assert!(puzzle.is_goal(&back));
    }

    #[test]
    fn test_move_serialization() {
        let json = serde_json::to_string(&PailMove::Pour { from: Pail::Second }).unwrap();
        assert_eq!(json, r#"{"action":"pour","from":"second"}"#);
    }
}
