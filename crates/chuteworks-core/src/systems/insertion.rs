//! Launching payloads into the network from a disposal unit.

use hecs::{Entity, World};
use rand::Rng;

use chuteworks_logic::atmosphere::GasMixture;

use crate::components::{DisposalHolder, DisposalUnit, Position};
use crate::config::NetworkConfig;

use super::atmos::transfer_atmos;
use super::events::EventLog;
use super::transition::{try_enter_tube, tube_at};

/// Flush a disposal unit: move its contents and charged air into a fresh
/// holder on the unit's attached tube segment and launch it.
///
/// Returns the holder entity, or `None` when the flush could not happen -
/// no attached tube, or nothing in the chamber (a holder may not exist
/// without contents). On a failed launch the holder exits on the spot,
/// ejecting the contents back where they started.
pub fn flush_unit(
    world: &mut World,
    config: &NetworkConfig,
    events: &mut EventLog,
    rng: &mut impl Rng,
    unit_e: Entity,
) -> Option<Entity> {
    let unit_pos = world.get::<&Position>(unit_e).ok().map(|p| *p)?;
    let tile = unit_pos.tile();
    let start_tube = tube_at(world, tile)?;

    let (contents, content_ids) = match world.get::<&mut DisposalUnit>(unit_e) {
        Ok(mut unit) => {
            if unit.contents.is_empty() {
                return None;
            }
            (
                std::mem::take(&mut unit.contents),
                std::mem::take(&mut unit.content_ids),
            )
        }
        Err(_) => return None,
    };

    let mut holder = DisposalHolder::new(GasMixture::empty());
    holder.contents = contents;
    holder.content_ids = content_ids;
    let anchor = world
        .get::<&Position>(start_tube)
        .map(|p| *p)
        .unwrap_or(unit_pos);
    let holder_e = world.spawn((holder, anchor));

    // Charge the payload's atmosphere from the unit, then launch.
    transfer_atmos(world, unit_e, holder_e);

    log::debug!(
        "unit {} flushed at ({}, {})",
        world
            .get::<&DisposalUnit>(unit_e)
            .map(|u| u.unit_id)
            .unwrap_or(0),
        tile.0,
        tile.1
    );

    if !try_enter_tube(world, config, events, rng, holder_e, start_tube) {
        // The launch failed terminally; try_enter_tube already routed the
        // holder through exit, dropping the contents back at the unit.
        return None;
    }
    Some(holder_e)
}
