//! Tube-to-tube transition handling.
//!
//! A hop asks the arrived segment for the next travel direction, applies
//! turn consequences (damage, clang, escape rolls), then commits the new
//! trajectory. `Invalid` from routing is the sole trigger for exit.

use hecs::{Entity, World};
use rand::Rng;

use chuteworks_logic::{damage, routing};

use crate::components::{Damageable, Direction, DisposalHolder, DisposalTube, Position};
use crate::config::NetworkConfig;

use super::events::{EventLog, NetworkEvent};
use super::exit::exit_disposals;

/// Find the tube segment sitting on a tile.
pub fn tube_at(world: &World, tile: (i32, i32)) -> Option<Entity> {
    world
        .query::<(&DisposalTube, &Position)>()
        .iter()
        .find(|(_, (_, pos))| pos.tile() == tile)
        .map(|(e, _)| e)
}

/// Find the segment one tile over in `direction` with a port facing back.
pub fn neighbor_in_direction(
    world: &World,
    from: (i32, i32),
    direction: Direction,
) -> Option<Entity> {
    if !direction.is_cardinal() {
        return None;
    }
    let (dx, dy) = direction.offset();
    let target = (from.0 + dx, from.1 + dy);
    world
        .query::<(&DisposalTube, &Position)>()
        .iter()
        .find(|(_, (tube, pos))| pos.tile() == target && tube.has_port(direction.opposite()))
        .map(|(e, _)| e)
}

/// Attempt to move a holder into `tube_e`.
///
/// Returns false when the transition did not happen: the holder is already
/// exiting, the tube is its current one, routing answered `Invalid`
/// (exit), or an escape roll succeeded (exit). On success the holder's
/// direction, tube references, rotation and visit count are committed.
pub fn try_enter_tube(
    world: &mut World,
    config: &NetworkConfig,
    events: &mut EventLog,
    rng: &mut impl Rng,
    holder_e: Entity,
    tube_e: Entity,
) -> bool {
    let (is_exiting, current_tube, arrival, accumulated, contents) =
        match world.get::<&DisposalHolder>(holder_e) {
            Ok(h) => (
                h.is_exiting,
                h.current_tube,
                h.current_direction,
                h.accumulated_damage,
                h.contents.clone(),
            ),
            Err(_) => return false,
        };
    if is_exiting {
        return false;
    }
    if current_tube == Some(tube_e) {
        return false;
    }

    let tube_info = {
        match (
            world.get::<&DisposalTube>(tube_e).ok(),
            world.get::<&Position>(tube_e).ok(),
        ) {
            (Some(tube), Some(pos)) => Some((
                tube.tube_id,
                tube.shape,
                tube.facing,
                tube.sort_tags.clone(),
                *pos,
            )),
            _ => None,
        }
    };
    let Some((tube_id, shape, facing, sort_tags, anchor)) = tube_info else {
        // Arrived at a tube that no longer exists.
        exit_disposals(world, config, events, holder_e);
        return false;
    };

    let divert = !sort_tags.is_empty()
        && world
            .get::<&DisposalHolder>(holder_e)
            .map(|h| h.tags_overlap(&sort_tags))
            .unwrap_or(false);

    let next_dir = routing::next_direction(shape, facing, arrival, divert);
    if next_dir == Direction::Invalid {
        exit_disposals(world, config, events, holder_e);
        return false;
    }

    let tile = anchor.tile();
    // A first entry (no established direction yet) is not a turn.
    let is_turn = arrival.is_cardinal() && next_dir != arrival;
    if is_turn {
        if damage::damage_allowed(accumulated, config.damage_cap) {
            let mut applied = 0.0;
            for &content in &contents {
                if let Ok(mut dmg) = world.get::<&mut Damageable>(content) {
                    dmg.total += config.turn_damage.blunt;
                    applied += config.turn_damage.blunt;
                }
            }
            if let Ok(mut holder) = world.get::<&mut DisposalHolder>(holder_e) {
                holder.accumulated_damage += applied;
            }
        }
        events.push(NetworkEvent::Clang {
            x: tile.0,
            y: tile.1,
            direction: next_dir,
        });

        let visits = world
            .get::<&DisposalHolder>(holder_e)
            .map(|h| h.visits(tube_id))
            .unwrap_or(0);
        if visits > config.tube_visit_threshold {
            let roll = rng.gen::<f32>();
            if damage::should_escape(visits, config.tube_visit_threshold, roll, config.escape_chance)
            {
                log::debug!("holder broke out after {} visits to tube {}", visits, tube_id);
                events.push(NetworkEvent::HolderEscaped {
                    x: tile.0,
                    y: tile.1,
                });
                exit_disposals(world, config, events, holder_e);
                return false;
            }
        }
    }

    let neighbor = neighbor_in_direction(world, tile, next_dir);
    let neighbor_id =
        neighbor.and_then(|e| world.get::<&DisposalTube>(e).ok().map(|t| t.tube_id));
    if let Ok(mut holder) = world.get::<&mut DisposalHolder>(holder_e) {
        holder.current_direction = next_dir;
        holder.rotation = next_dir.to_angle().unwrap_or(holder.rotation);
        holder.current_tube = Some(tube_e);
        holder.current_tube_id = Some(tube_id);
        holder.next_tube = neighbor;
        holder.next_tube_id = neighbor_id;
        holder.record_visit(tube_id);
    }
    log::trace!("holder entered tube {} heading {:?}", tube_id, next_dir);
    true
}
