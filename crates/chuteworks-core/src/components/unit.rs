//! Disposal unit component - entry chamber and reception point.

use hecs::Entity;
use serde::{Deserialize, Serialize};

use chuteworks_logic::atmosphere::GasMixture;

/// An entry/exit chamber attached to the network. As an entry point it
/// charges gas and holds entities until flushed; as a reception point it
/// receives exiting holders and discharges their contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisposalUnit {
    /// Stable id for persistence.
    pub unit_id: u32,
    /// Entities waiting in the chamber, in insertion order.
    #[serde(skip)]
    pub contents: Vec<Entity>,
    /// Stable cargo ids mirroring `contents`.
    pub content_ids: Vec<u32>,
    /// Charged gas, moved into a holder on flush.
    pub air: GasMixture,
}

impl DisposalUnit {
    pub fn new(unit_id: u32) -> Self {
        Self {
            unit_id,
            ..Default::default()
        }
    }

    pub fn with_air(mut self, air: GasMixture) -> Self {
        self.air = air;
        self
    }

    /// Add an entity to the chamber. Membership is unique.
    pub fn insert(&mut self, entity: Entity, cargo_id: u32) -> bool {
        if self.contents.contains(&entity) {
            return false;
        }
        self.contents.push(entity);
        self.content_ids.push(cargo_id);
        true
    }

    /// Remove an entity from the chamber - the discharge handoff used when
    /// an exiting holder routes through this unit.
    pub fn remove(&mut self, entity: Entity) -> bool {
        match self.contents.iter().position(|&e| e == entity) {
            Some(idx) => {
                self.contents.remove(idx);
                self.content_ids.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }
}
