//! Bridge and torch puzzle.
//!
//! A group must cross a bridge at night. At most two people cross at once,
//! the single light always goes with them, and a crossing takes as long as its
//! slower walker. Everyone has to end up on the far side.

use serde::Serialize;
use smallvec::SmallVec;

use crate::puzzle::Puzzle;
use crate::puzzles::ConfigError;

/// People are tracked as bits of a `u32`
const MAX_PEOPLE: usize = 32;

/// Keeps any crossing schedule's total well inside `u64`
pub const MAX_SPEED: u64 = u32::MAX as u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Crossing {
    /// Towards the far side
    Forth,
    /// Back with the light
    Back,
}

/// One or two people crossing together. Immutable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BridgeMove {
    people: SmallVec<[usize; 2]>,
    crossing: Crossing,
    cost: u64,
}

impl BridgeMove {
    /// Indices of the people crossing
    pub fn people(&self) -> &[usize] {
        &self.people
    }

    pub fn crossing(&self) -> Crossing {
        self.crossing
    }

    /// Time taken: the speed of the slower walker
    pub fn cost(&self) -> u64 {
        self.cost
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgePosition {
    /// Bit `i` set when person `i` is on the far side
    far_side: u32,
    light_far: bool,
}

impl BridgePosition {
    pub fn is_across(&self, person: usize) -> bool {
        self.far_side & (1 << person) != 0
    }

    pub fn light_is_across(&self) -> bool {
        self.light_far
    }
}

#[derive(Debug, Clone)]
pub struct BridgePuzzle {
    speeds: Vec<u64>,
}

impl BridgePuzzle {
    pub fn new(speeds: Vec<u64>) -> Result<Self, ConfigError> {
        if speeds.is_empty() || speeds.len() > MAX_PEOPLE {
            return Err(ConfigError::PeopleCount {
                count: speeds.len(),
                max: MAX_PEOPLE,
            });
        }
        if speeds.contains(&0) {
            return Err(ConfigError::ZeroSpeed);
        }
        if let Some(&speed) = speeds.iter().find(|&&speed| speed > MAX_SPEED) {
            return Err(ConfigError::SpeedTooLarge {
                speed,
                max: MAX_SPEED,
            });
        }
        Ok(Self { speeds })
    }

    pub fn speeds(&self) -> &[u64] {
        &self.speeds
    }

    fn everyone(&self) -> u32 {
        if self.speeds.len() == MAX_PEOPLE {
            u32::MAX
        } else {
            (1 << self.speeds.len()) - 1
        }
    }

    fn crossing(&self, people: &[usize], crossing: Crossing) -> BridgeMove {
        let cost = people.iter().map(|&p| self.speeds[p]).max().unwrap_or(0);
        BridgeMove {
            people: SmallVec::from_slice(people),
            crossing,
            cost,
        }
    }
}

impl Puzzle for BridgePuzzle {
    type Position = BridgePosition;
    type Move = BridgeMove;

    fn initial_position(&self) -> BridgePosition {
        BridgePosition {
            far_side: 0,
            light_far: false,
        }
    }

    fn is_goal(&self, position: &BridgePosition) -> bool {
        position.far_side == self.everyone()
    }

    // Pairs are tried first going forth and singles first coming back
    fn legal_moves(&self, position: &BridgePosition) -> Vec<BridgeMove> {
        let crossing = if position.light_far {
            Crossing::Back
        } else {
            Crossing::Forth
        };
        let with_light: Vec<usize> = (0..self.speeds.len())
            .filter(|&p| position.is_across(p) == position.light_far)
            .collect();

        let mut pairs = Vec::new();
        for (i, &a) in with_light.iter().enumerate() {
            for &b in &with_light[i + 1..] {
                pairs.push(self.crossing(&[a, b], crossing));
            }
        }
        let singles = with_light.iter().map(|&p| self.crossing(&[p], crossing));

        match crossing {
            Crossing::Forth => pairs.into_iter().chain(singles).collect(),
            Crossing::Back => singles.chain(pairs).collect(),
        }
    }

    fn apply(&self, position: &BridgePosition, mv: &BridgeMove) -> BridgePosition {
        let moved = mv.people.iter().fold(0u32, |mask, &p| mask | (1 << p));
        BridgePosition {
            far_side: position.far_side ^ moved,
            light_far: !position.light_far,
        }
    }

    fn move_cost(&self, mv: &BridgeMove) -> u64 {
        mv.cost
    }

    /// Everyone still waiting has to cross at least once
    fn estimated_cost(&self, position: &BridgePosition) -> u64 {
        (0..self.speeds.len())
            .filter(|&p| !position.is_across(p))
            .map(|p| self.speeds[p])
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_groups() {
        assert_eq!(
            BridgePuzzle::new(vec![]).unwrap_err(),
            ConfigError::PeopleCount { count: 0, max: 32 }
        );
        assert_eq!(BridgePuzzle::new(vec![1, 0]).unwrap_err(), ConfigError::ZeroSpeed);
        assert!(BridgePuzzle::new(vec![1; 33]).is_err());
        assert!(BridgePuzzle::new(vec![1; 32]).is_ok());
        assert_eq!(
            BridgePuzzle::new(vec![u64::MAX, 1]).unwrap_err(),
            ConfigError::SpeedTooLarge {
                speed: u64::MAX,
                max: MAX_SPEED
            }
        );
        assert!(BridgePuzzle::new(vec![MAX_SPEED, 1]).is_ok());
    }

    #[test]
    fn test_opening_moves() {
        let puzzle = BridgePuzzle::new(vec![1, 2, 5]).unwrap();
        let moves = puzzle.legal_moves(&puzzle.initial_position());

        // Three pairs, then three singles
        assert_eq!(moves.len(), 6);
        assert_eq!(moves[0].people(), &[0, 1]);
        assert_eq!(moves[0].cost(), 2);
        assert_eq!(moves[2].people(), &[1, 2]);
        assert_eq!(moves[2].cost(), 5);
        assert_eq!(moves[3].people(), &[0]);
        assert!(moves.iter().all(|m| m.crossing() == Crossing::Forth));
    }

    #[test]
    fn test_light_travels_with_crossers() {
        let puzzle = BridgePuzzle::new(vec![1, 2, 5]).unwrap();
        let start = puzzle.initial_position();
        let pair = puzzle.legal_moves(&start)[0].clone();
        let after = puzzle.apply(&start, &pair);

        assert!(after.is_across(0) && after.is_across(1) && !after.is_across(2));
        assert!(after.light_is_across());

        // Only the two across can bring the light back, singles first
        let back = puzzle.legal_moves(&after);
        assert_eq!(back.len(), 3);
        assert_eq!(back[0].people(), &[0]);
        assert_eq!(back[0].crossing(), Crossing::Back);
        assert_eq!(back[2].people(), &[0, 1]);
    }

    #[test]
    fn test_goal_and_estimate() {
        let puzzle = BridgePuzzle::new(vec![1, 10]).unwrap();
        let start = puzzle.initial_position();
        assert_eq!(puzzle.estimated_cost(&start), 10);

        let across = puzzle.apply(&start, &puzzle.legal_moves(&start)[0]);
        assert!(puzzle.is_goal(&across));
        assert_eq!(puzzle.estimated_cost(&across), 0);
    }
}
