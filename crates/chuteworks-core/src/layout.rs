//! Network construction from a layout description.
//!
//! Layouts are plain serde structs, normally read from JSON manifests, so
//! the same description drives the engine, the harness, and tests.

use std::collections::BTreeSet;

use hecs::{Entity, World};
use serde::{Deserialize, Serialize};

use chuteworks_logic::direction::Direction;
use chuteworks_logic::routing::TubeShape;

use crate::components::{DisposalTube, DisposalUnit, FloorTile, Position};

/// A complete tube-network description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkLayout {
    pub name: String,
    pub tubes: Vec<TubeSpec>,
    #[serde(default)]
    pub units: Vec<UnitSpec>,
}

/// One tube segment in a layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TubeSpec {
    pub x: i32,
    pub y: i32,
    pub shape: TubeShape,
    pub facing: Direction,
    #[serde(default)]
    pub sort_tags: Vec<String>,
}

/// One disposal unit in a layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitSpec {
    pub x: i32,
    pub y: i32,
}

/// Entities spawned for a layout, in declaration order.
pub struct NetworkHandles {
    pub tubes: Vec<Entity>,
    pub units: Vec<Entity>,
}

impl NetworkLayout {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Spawn the tubes, units, and the floor under them.
///
/// Tube ids are assigned by declaration order; every occupied tile gets a
/// single floor tile regardless of how many structures sit on it.
pub fn build_network(world: &mut World, layout: &NetworkLayout) -> NetworkHandles {
    let mut tubes = Vec::with_capacity(layout.tubes.len());
    let mut floored: BTreeSet<(i32, i32)> = BTreeSet::new();

    for (idx, spec) in layout.tubes.iter().enumerate() {
        let tube = DisposalTube::new(idx as u32, spec.shape, spec.facing)
            .with_sort_tags(spec.sort_tags.clone());
        tubes.push(world.spawn((tube, Position::from_tile(spec.x, spec.y))));
        floored.insert((spec.x, spec.y));
    }

    let mut units = Vec::with_capacity(layout.units.len());
    for (idx, spec) in layout.units.iter().enumerate() {
        units.push(world.spawn((
            DisposalUnit::new(idx as u32),
            Position::from_tile(spec.x, spec.y),
        )));
        floored.insert((spec.x, spec.y));
    }

    for (x, y) in floored {
        world.spawn((FloorTile::new(), Position::from_tile(x, y)));
    }

    log::debug!(
        "built network '{}': {} tubes, {} units",
        layout.name,
        tubes.len(),
        units.len()
    );
    NetworkHandles { tubes, units }
}
