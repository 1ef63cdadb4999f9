//! Components for entities that ride the network.

use serde::{Deserialize, Serialize};

use super::common::Vec2;

/// Marker for a transportable entity, with a stable id used to rebuild
/// holder/unit membership after a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cargo {
    pub cargo_id: u32,
}

/// Cumulative damage taken by an entity.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Damageable {
    pub total: f32,
}

/// Brief forced incapacitation after ejection. Present only while active.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Knockdown {
    pub time_left: f32,
}

/// Throw impulse applied on ejection. Present only while in flight.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Thrown {
    pub velocity: Vec2,
    pub time_left: f32,
}
