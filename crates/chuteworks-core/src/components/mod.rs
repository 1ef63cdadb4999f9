//! Component definitions for the disposal-network ECS.
//!
//! Components are pure data structs attached to entities.
//! They have no behavior - that lives in systems.

mod cargo;
mod common;
mod holder;
mod tile;
mod tube;
mod unit;

pub use cargo::*;
pub use common::*;
pub use holder::*;
pub use tile::*;
pub use tube::*;
pub use unit::*;

// The logic-crate value types travel with the components that embed them.
pub use chuteworks_logic::atmosphere::{GasId, GasMixture};
pub use chuteworks_logic::direction::Direction;
pub use chuteworks_logic::routing::TubeShape;
