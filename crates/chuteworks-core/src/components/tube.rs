//! Tube network segment component.

use serde::{Deserialize, Serialize};

use chuteworks_logic::direction::Direction;
use chuteworks_logic::routing::{self, TubeShape};

/// One segment of the disposal network. The segment's anchor is its
/// entity's `Position`; routing behavior comes from shape plus facing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisposalTube {
    /// Stable id used for visit counting and persistence.
    pub tube_id: u32,
    pub shape: TubeShape,
    pub facing: Direction,
    /// Sorting filter; only read by `Sorter` segments.
    pub sort_tags: Vec<String>,
}

impl DisposalTube {
    pub fn new(tube_id: u32, shape: TubeShape, facing: Direction) -> Self {
        Self {
            tube_id,
            shape,
            facing,
            sort_tags: Vec::new(),
        }
    }

    pub fn with_sort_tags(mut self, tags: Vec<String>) -> Self {
        self.sort_tags = tags;
        self
    }

    /// Connection ports of this segment.
    pub fn ports(&self) -> Vec<Direction> {
        routing::ports(self.shape, self.facing)
    }

    /// Whether this segment has a port on the given side.
    pub fn has_port(&self, side: Direction) -> bool {
        self.ports().contains(&side)
    }
}
