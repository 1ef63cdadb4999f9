//! Transactional gas transfer between units, holders and the floor.
//!
//! Transfers move whole mixtures: a payload is either fully charged into a
//! holder or stays where it was, and expelling always drains the holder
//! side completely.

use hecs::{Entity, World};

use chuteworks_logic::atmosphere::GasMixture;

use crate::components::{DisposalHolder, DisposalUnit, FloorTile, Position};

/// Charge a disposal unit's air into a holder at entry.
///
/// The move is total: if the holder cannot be found the charge is returned
/// to the unit untouched.
pub fn transfer_atmos(world: &mut World, unit_e: Entity, holder_e: Entity) {
    let charge = match world.get::<&mut DisposalUnit>(unit_e) {
        Ok(mut unit) => unit.air.take_all(),
        Err(_) => return,
    };
    match world.get::<&mut DisposalHolder>(holder_e) {
        Ok(mut holder) => holder.air.merge(&charge),
        Err(_) => {
            if let Ok(mut unit) = world.get::<&mut DisposalUnit>(unit_e) {
                unit.air.merge(&charge);
            }
        }
    }
}

/// Release a drained gas payload into the ambient air above a tile.
///
/// With no floor tile present the payload vents to space; either way the
/// payload is gone and exit can complete.
pub fn expel_atmos(world: &mut World, tile: (i32, i32), payload: GasMixture) {
    if payload.is_empty() {
        return;
    }
    let sink = world
        .query::<(&FloorTile, &Position)>()
        .iter()
        .find(|(_, (_, pos))| pos.tile() == tile)
        .map(|(e, _)| e);
    match sink {
        Some(tile_e) => {
            if let Ok(mut floor) = world.get::<&mut FloorTile>(tile_e) {
                floor.air.merge(&payload);
            }
        }
        None => {
            log::debug!(
                "no floor at ({}, {}); {} moles vented",
                tile.0,
                tile.1,
                payload.total_moles()
            );
        }
    }
}
