//! Cardinal grid directions with an `Invalid` routing sentinel.
//!
//! Tubes answer routing queries with a `Direction`; `Invalid` means "no
//! outgoing path" and is the sole signal that a holder must leave the
//! network. Angles follow math convention: east is 0, north is +pi/2.

use serde::{Deserialize, Serialize};

/// A travel direction on the disposal grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// No direction - the terminal routing answer.
    #[default]
    Invalid,
    North,
    East,
    South,
    West,
}

/// The four real directions in clockwise order.
pub const CARDINALS: [Direction; 4] = [
    Direction::North,
    Direction::East,
    Direction::South,
    Direction::West,
];

impl Direction {
    /// The direction pointing the opposite way. `Invalid` has no opposite.
    pub fn opposite(self) -> Self {
        match self {
            Direction::Invalid => Direction::Invalid,
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// Next direction clockwise (N -> E -> S -> W -> N).
    pub fn clockwise(self) -> Self {
        match self {
            Direction::Invalid => Direction::Invalid,
            Direction::North => Direction::East,
            Direction::East => Direction::South,
            Direction::South => Direction::West,
            Direction::West => Direction::North,
        }
    }

    /// Tile offset one step along this direction.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Invalid => (0, 0),
            Direction::North => (0, 1),
            Direction::East => (1, 0),
            Direction::South => (0, -1),
            Direction::West => (-1, 0),
        }
    }

    /// Direction from one tile to an adjacent tile, `Invalid` if not adjacent.
    pub fn from_offset(dx: i32, dy: i32) -> Self {
        match (dx, dy) {
            (0, 1) => Direction::North,
            (1, 0) => Direction::East,
            (0, -1) => Direction::South,
            (-1, 0) => Direction::West,
            _ => Direction::Invalid,
        }
    }

    /// Grid-relative angle in radians, `None` for `Invalid`.
    pub fn to_angle(self) -> Option<f32> {
        match self {
            Direction::Invalid => None,
            Direction::East => Some(0.0),
            Direction::North => Some(std::f32::consts::FRAC_PI_2),
            Direction::West => Some(std::f32::consts::PI),
            Direction::South => Some(-std::f32::consts::FRAC_PI_2),
        }
    }

    /// Whether this is one of the four real directions.
    pub fn is_cardinal(self) -> bool {
        self != Direction::Invalid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposites_are_involutive() {
        for dir in CARDINALS {
            assert_eq!(dir.opposite().opposite(), dir);
        }
        assert_eq!(Direction::Invalid.opposite(), Direction::Invalid);
    }

    #[test]
    fn test_clockwise_cycles() {
        let mut dir = Direction::North;
        for _ in 0..4 {
            dir = dir.clockwise();
        }
        assert_eq!(dir, Direction::North);
    }

    #[test]
    fn test_offset_round_trip() {
        for dir in CARDINALS {
            let (dx, dy) = dir.offset();
            assert_eq!(Direction::from_offset(dx, dy), dir);
        }
        assert_eq!(Direction::from_offset(2, 0), Direction::Invalid);
        assert_eq!(Direction::from_offset(1, 1), Direction::Invalid);
    }

    #[test]
    fn test_angles() {
        assert_eq!(Direction::East.to_angle(), Some(0.0));
        assert_eq!(Direction::North.to_angle(), Some(std::f32::consts::FRAC_PI_2));
        assert!(Direction::Invalid.to_angle().is_none());
    }
}
