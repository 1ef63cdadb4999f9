//! Per-segment routing rules - the tube side of the routing protocol.
//!
//! A holder arriving at a segment asks for its outgoing travel direction.
//! The answer is a pure function of the segment's shape and facing, the
//! holder's arrival direction, and whether the holder's tags match the
//! segment's sorting filter. `Direction::Invalid` is the sole terminal
//! answer and always means "leave the network here".
//!
//! Junctions route deterministically: trunk traffic passes straight
//! through, branch traffic merges toward the facing direction. Identical
//! inputs always produce identical answers, so a retried query cannot
//! desynchronize a holder from its route.

use serde::{Deserialize, Serialize};

use crate::direction::Direction;

/// The connection layout of a tube segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TubeShape {
    /// Single port in the facing direction; launches holders from a
    /// disposal unit into the network.
    Entry,
    /// Straight segment: facing port plus its opposite.
    Transit,
    /// 90-degree corner: facing port plus the next port clockwise.
    Bend,
    /// T-piece: straight trunk plus a clockwise branch. Branch arrivals
    /// merge into the facing direction.
    Junction,
    /// T-piece that diverts tag-matched holders down the branch.
    Sorter,
    /// Dead end - every arrival is told to leave the network.
    Terminal,
}

/// Connection ports for a shape rotated to `facing`.
pub fn ports(shape: TubeShape, facing: Direction) -> Vec<Direction> {
    match shape {
        TubeShape::Entry | TubeShape::Terminal => vec![facing],
        TubeShape::Transit => vec![facing, facing.opposite()],
        TubeShape::Bend => vec![facing, facing.clockwise()],
        TubeShape::Junction | TubeShape::Sorter => {
            vec![facing, facing.opposite(), facing.clockwise()]
        }
    }
}

/// The branch port of a junction or sorter.
pub fn branch_port(facing: Direction) -> Direction {
    facing.clockwise()
}

/// Resolve the outgoing travel direction for a holder that entered this
/// segment travelling `arrival`.
///
/// `tags_divert` is whether the holder's tag set overlaps the segment's
/// sorting filter; it only matters for `Sorter` segments.
pub fn next_direction(
    shape: TubeShape,
    facing: Direction,
    arrival: Direction,
    tags_divert: bool,
) -> Direction {
    // A holder travelling `arrival` comes in through the port on the side
    // it arrived from.
    let entry_port = arrival.opposite();

    match shape {
        // Entry launches in its facing direction no matter how the holder
        // was loaded (fresh holders arrive with no direction at all).
        TubeShape::Entry => facing,
        TubeShape::Terminal => Direction::Invalid,
        TubeShape::Transit | TubeShape::Bend => {
            let ports = ports(shape, facing);
            if !ports.contains(&entry_port) {
                return Direction::Invalid;
            }
            // Two-port segment: leave through the other port.
            if ports[0] == entry_port {
                ports[1]
            } else {
                ports[0]
            }
        }
        TubeShape::Junction | TubeShape::Sorter => {
            let branch = branch_port(facing);
            if entry_port == branch {
                // Branch arrivals merge onto the trunk.
                facing
            } else if entry_port == facing || entry_port == facing.opposite() {
                if shape == TubeShape::Sorter && tags_divert && entry_port == facing.opposite() {
                    // Tag-matched holders moving with the trunk get diverted.
                    branch
                } else {
                    // Straight through.
                    arrival
                }
            } else {
                Direction::Invalid
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_launches_in_facing_direction() {
        assert_eq!(
            next_direction(TubeShape::Entry, Direction::East, Direction::Invalid, false),
            Direction::East
        );
    }

    #[test]
    fn test_terminal_always_invalid() {
        for arrival in crate::direction::CARDINALS {
            assert_eq!(
                next_direction(TubeShape::Terminal, Direction::West, arrival, false),
                Direction::Invalid
            );
        }
    }

    #[test]
    fn test_transit_passes_straight_through() {
        // East-facing straight tube, holder travelling east keeps going east.
        assert_eq!(
            next_direction(TubeShape::Transit, Direction::East, Direction::East, false),
            Direction::East
        );
        // And the same tube carries westbound traffic too.
        assert_eq!(
            next_direction(TubeShape::Transit, Direction::East, Direction::West, false),
            Direction::West
        );
        // Sideways arrival has no port.
        assert_eq!(
            next_direction(TubeShape::Transit, Direction::East, Direction::North, false),
            Direction::Invalid
        );
    }

    #[test]
    fn test_bend_turns_ninety_degrees() {
        // North-facing bend connects North and East. A holder travelling
        // east enters through the West... no port there: Invalid.
        assert_eq!(
            next_direction(TubeShape::Bend, Direction::North, Direction::East, false),
            Direction::Invalid
        );
        // Travelling south (entered through the North port) exits East.
        assert_eq!(
            next_direction(TubeShape::Bend, Direction::North, Direction::South, false),
            Direction::East
        );
        // Travelling west (entered through the East port) exits North.
        assert_eq!(
            next_direction(TubeShape::Bend, Direction::North, Direction::West, false),
            Direction::North
        );
    }

    #[test]
    fn test_junction_trunk_passes_branch_merges() {
        // East-facing junction: trunk E/W, branch S.
        let shape = TubeShape::Junction;
        assert_eq!(
            next_direction(shape, Direction::East, Direction::East, false),
            Direction::East
        );
        assert_eq!(
            next_direction(shape, Direction::East, Direction::West, false),
            Direction::West
        );
        // Branch arrival (travelling north, entered through the South port)
        // merges toward facing.
        assert_eq!(
            next_direction(shape, Direction::East, Direction::North, false),
            Direction::East
        );
    }

    #[test]
    fn test_sorter_diverts_only_tagged_trunk_traffic() {
        let shape = TubeShape::Sorter;
        // Untagged: straight through.
        assert_eq!(
            next_direction(shape, Direction::East, Direction::East, false),
            Direction::East
        );
        // Tagged and moving with the trunk: diverted down the branch.
        assert_eq!(
            next_direction(shape, Direction::East, Direction::East, true),
            Direction::South
        );
        // Tagged but moving against the trunk: not diverted.
        assert_eq!(
            next_direction(shape, Direction::East, Direction::West, true),
            Direction::West
        );
    }

    #[test]
    fn test_routing_is_idempotent() {
        // Same inputs, same answer - retries cannot change the route.
        for _ in 0..3 {
            assert_eq!(
                next_direction(TubeShape::Junction, Direction::North, Direction::North, false),
                Direction::North
            );
        }
    }
}
