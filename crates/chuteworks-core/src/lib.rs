//! Chuteworks Core - Disposal Transport Network Engine
//!
//! An ECS-based simulation of a pneumatic disposal network: holders
//! (sealed packets of entities plus a gas payload) travel a graph of tube
//! segments, routed one hop at a time, until they reach an exit point or
//! break out of the network.
//!
//! # Architecture
//!
//! The simulation uses an Entity Component System (ECS) architecture via `hecs`:
//! - **Entities**: Holders, tube segments, disposal units, floor tiles, cargo
//! - **Components**: Pure data attached to entities (DisposalHolder, DisposalTube, etc.)
//! - **Systems**: Logic that queries and updates components
//!
//! # Example
//!
//! ```rust,no_run
//! use chuteworks_core::prelude::*;
//! use chuteworks_core::layout::{NetworkLayout, TubeSpec, UnitSpec};
//!
//! let mut engine = DisposalEngine::new(NetworkConfig::default());
//!
//! // A two-segment network: an entry chute discharging into a terminal.
//! let layout = NetworkLayout {
//!     name: "chute".to_owned(),
//!     tubes: vec![
//!         TubeSpec { x: 0, y: 0, shape: TubeShape::Entry, facing: Direction::East, sort_tags: vec![] },
//!         TubeSpec { x: 1, y: 0, shape: TubeShape::Terminal, facing: Direction::West, sort_tags: vec![] },
//!     ],
//!     units: vec![UnitSpec { x: 0, y: 0 }, UnitSpec { x: 1, y: 0 }],
//! };
//! let handles = engine.build(&layout);
//!
//! // Load a unit and flush it into the network.
//! let crate_entity = engine.spawn_cargo(0, 0);
//! engine.load_cargo(handles.units[0], crate_entity);
//! let _holder = engine.flush(handles.units[0]);
//!
//! // Run simulation
//! loop {
//!     engine.update(1.0 / 60.0); // 60 FPS
//! }
//! ```

pub mod components;
pub mod config;
pub mod engine;
pub mod layout;
pub mod persistence;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::config::NetworkConfig;
    pub use crate::engine::DisposalEngine;
    pub use crate::systems::{EventLog, NetworkEvent};
}
