//! Save/Load functionality for persisting network state
//!
//! Uses bincode for efficient binary serialization of the entire
//! simulation. `Entity` references inside holders and units are not
//! serialized directly; they are rebuilt from the mirrored stable ids
//! (cargo, tube, unit) after the world is reconstructed.

use hecs::World;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{Read, Write};

use crate::components::*;
use crate::config::NetworkConfig;
use crate::systems::EventLog;

/// Version number for save file format (increment when format changes)
const SAVE_VERSION: u32 = 1;

/// Serializable snapshot of the simulation state
#[derive(Serialize, Deserialize)]
pub struct SaveData {
    /// Save format version
    pub version: u32,
    /// Simulation time in seconds
    pub sim_time: f64,
    /// Network tuning config
    pub config: NetworkConfig,
    /// Undrained feedback events
    pub events: EventLog,
    /// Next cargo id the engine will hand out
    pub next_cargo_id: u32,
    /// All entities with their components
    pub entities: Vec<SerializableEntity>,
}

/// All possible components for an entity, serialized as optionals
#[derive(Serialize, Deserialize, Default)]
pub struct SerializableEntity {
    pub position: Option<Position>,
    pub holder: Option<DisposalHolder>,
    pub tube: Option<DisposalTube>,
    pub unit: Option<DisposalUnit>,
    pub tile: Option<FloorTile>,
    pub cargo: Option<Cargo>,
    pub damageable: Option<Damageable>,
    pub knockdown: Option<Knockdown>,
    pub thrown: Option<Thrown>,
}

/// Extract all entities from a world into serializable form
fn serialize_entities(world: &World) -> Vec<SerializableEntity> {
    let mut entities = Vec::new();

    for entity in world.iter() {
        let mut se = SerializableEntity::default();
        let entity_ref = world.entity(entity.entity()).unwrap();

        if let Some(c) = entity_ref.get::<&Position>() {
            se.position = Some(*c);
        }
        if let Some(c) = entity_ref.get::<&DisposalHolder>() {
            se.holder = Some((*c).clone());
        }
        if let Some(c) = entity_ref.get::<&DisposalTube>() {
            se.tube = Some((*c).clone());
        }
        if let Some(c) = entity_ref.get::<&DisposalUnit>() {
            se.unit = Some((*c).clone());
        }
        if let Some(c) = entity_ref.get::<&FloorTile>() {
            se.tile = Some((*c).clone());
        }
        if let Some(c) = entity_ref.get::<&Cargo>() {
            se.cargo = Some(*c);
        }
        if let Some(c) = entity_ref.get::<&Damageable>() {
            se.damageable = Some(*c);
        }
        if let Some(c) = entity_ref.get::<&Knockdown>() {
            se.knockdown = Some(*c);
        }
        if let Some(c) = entity_ref.get::<&Thrown>() {
            se.thrown = Some(*c);
        }

        entities.push(se);
    }

    entities
}

/// Rebuild a world from serialized entities
fn deserialize_entities(world: &mut World, entities: Vec<SerializableEntity>) {
    for se in entities {
        spawn_entity(world, se);
    }
}

/// Spawn an entity with all its components
fn spawn_entity(world: &mut World, se: SerializableEntity) {
    let entity = world.spawn(());

    if let Some(c) = se.position {
        let _ = world.insert_one(entity, c);
    }
    if let Some(c) = se.holder {
        let _ = world.insert_one(entity, c);
    }
    if let Some(c) = se.tube {
        let _ = world.insert_one(entity, c);
    }
    if let Some(c) = se.unit {
        let _ = world.insert_one(entity, c);
    }
    if let Some(c) = se.tile {
        let _ = world.insert_one(entity, c);
    }
    if let Some(c) = se.cargo {
        let _ = world.insert_one(entity, c);
    }
    if let Some(c) = se.damageable {
        let _ = world.insert_one(entity, c);
    }
    if let Some(c) = se.knockdown {
        let _ = world.insert_one(entity, c);
    }
    if let Some(c) = se.thrown {
        let _ = world.insert_one(entity, c);
    }
}

/// Restore `Entity` references from the mirrored stable ids.
///
/// Ids that no longer resolve are dropped from the mirrored lists too, so
/// a holder never references an entity that was not restored.
pub fn rebuild_references(world: &mut World) {
    let cargo_by_id: HashMap<u32, hecs::Entity> = world
        .query::<&Cargo>()
        .iter()
        .map(|(e, c)| (c.cargo_id, e))
        .collect();
    let tube_by_id: HashMap<u32, hecs::Entity> = world
        .query::<&DisposalTube>()
        .iter()
        .map(|(e, t)| (t.tube_id, e))
        .collect();

    let mut holder_fixes = Vec::new();
    for (entity, holder) in world.query::<&DisposalHolder>().iter() {
        let resolved: Vec<(u32, hecs::Entity)> = holder
            .content_ids
            .iter()
            .filter_map(|id| cargo_by_id.get(id).map(|&e| (*id, e)))
            .collect();
        let current = holder
            .current_tube_id
            .and_then(|id| tube_by_id.get(&id).copied());
        let next = holder
            .next_tube_id
            .and_then(|id| tube_by_id.get(&id).copied());
        holder_fixes.push((entity, resolved, current, next));
    }
    for (entity, resolved, current, next) in holder_fixes {
        if let Ok(mut holder) = world.get::<&mut DisposalHolder>(entity) {
            holder.content_ids = resolved.iter().map(|(id, _)| *id).collect();
            holder.contents = resolved.iter().map(|(_, e)| *e).collect();
            holder.current_tube = current;
            holder.next_tube = next;
        }
    }

    let mut unit_fixes = Vec::new();
    for (entity, unit) in world.query::<&DisposalUnit>().iter() {
        let resolved: Vec<(u32, hecs::Entity)> = unit
            .content_ids
            .iter()
            .filter_map(|id| cargo_by_id.get(id).map(|&e| (*id, e)))
            .collect();
        unit_fixes.push((entity, resolved));
    }
    for (entity, resolved) in unit_fixes {
        if let Ok(mut unit) = world.get::<&mut DisposalUnit>(entity) {
            unit.content_ids = resolved.iter().map(|(id, _)| *id).collect();
            unit.contents = resolved.iter().map(|(_, e)| *e).collect();
        }
    }
}

/// Save the complete simulation to a writer
pub fn save_simulation<W: Write>(
    writer: W,
    world: &World,
    sim_time: f64,
    config: &NetworkConfig,
    events: &EventLog,
    next_cargo_id: u32,
) -> Result<(), SaveError> {
    let entities = serialize_entities(world);

    let save_data = SaveData {
        version: SAVE_VERSION,
        sim_time,
        config: config.clone(),
        events: events.clone(),
        next_cargo_id,
        entities,
    };

    bincode::serialize_into(writer, &save_data)?;
    Ok(())
}

/// Load a simulation from a reader
pub fn load_simulation<R: Read>(reader: R) -> Result<LoadedSimulation, SaveError> {
    let save_data: SaveData = bincode::deserialize_from(reader)?;

    if save_data.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: save_data.version,
        });
    }

    let mut world = World::new();
    deserialize_entities(&mut world, save_data.entities);
    rebuild_references(&mut world);

    Ok(LoadedSimulation {
        world,
        sim_time: save_data.sim_time,
        config: save_data.config,
        events: save_data.events,
        next_cargo_id: save_data.next_cargo_id,
    })
}

/// Result of loading a simulation
pub struct LoadedSimulation {
    pub world: World,
    pub sim_time: f64,
    pub config: NetworkConfig,
    pub events: EventLog,
    pub next_cargo_id: u32,
}

/// Errors that can occur during save/load
#[derive(Debug)]
pub enum SaveError {
    Io(std::io::Error),
    Bincode(Box<bincode::ErrorKind>),
    VersionMismatch { expected: u32, found: u32 },
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<Box<bincode::ErrorKind>> for SaveError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        SaveError::Bincode(e)
    }
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "IO error: {}", e),
            SaveError::Bincode(e) => write!(f, "Serialization error: {}", e),
            SaveError::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "Save version mismatch: expected {}, found {}",
                    expected, found
                )
            }
        }
    }
}

impl std::error::Error for SaveError {}
