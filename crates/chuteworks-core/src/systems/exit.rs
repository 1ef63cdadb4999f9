//! Exit handling - the single terminal path out of the network.
//!
//! Every failure mode funnels here: invalid routing answers, destroyed
//! tubes, escapes, drained holders. The operation always terminates; the
//! reception chamber and floor pry are best-effort conveniences, and a
//! holder is never left half-drained.

use hecs::{Entity, World};

use chuteworks_logic::damage;

use crate::components::{
    Cargo, DisposalHolder, DisposalUnit, FloorTile, Knockdown, Position, Thrown, Vec2,
};
use crate::config::NetworkConfig;

use super::atmos::expel_atmos;
use super::events::{EventLog, NetworkEvent};

/// How long a thrown entity stays in flight.
const THROW_SECONDS: f32 = 0.5;

/// Find a disposal unit sitting on a tile.
pub fn unit_at(world: &World, tile: (i32, i32)) -> Option<Entity> {
    world
        .query::<(&DisposalUnit, &Position)>()
        .iter()
        .find(|(_, (_, pos))| pos.tile() == tile)
        .map(|(e, _)| e)
}

/// Pry open the floor plating on a tile, if there is any.
pub fn pry_tile(world: &mut World, events: &mut EventLog, tile: (i32, i32)) {
    let target = world
        .query::<(&FloorTile, &Position)>()
        .iter()
        .find(|(_, (_, pos))| pos.tile() == tile)
        .map(|(e, _)| e);
    if let Some(tile_e) = target {
        if let Ok(mut floor) = world.get::<&mut FloorTile>(tile_e) {
            if !floor.pried {
                floor.pried = true;
                drop(floor);
                events.push(NetworkEvent::TilePried {
                    x: tile.0,
                    y: tile.1,
                });
            }
        }
    }
}

/// Terminate a holder's transit: eject contents, settle the gas payload,
/// destroy the holder.
///
/// Idempotent past the latch - calling this on an exiting or already
/// destroyed holder is a no-op.
pub fn exit_disposals(
    world: &mut World,
    config: &NetworkConfig,
    events: &mut EventLog,
    holder_e: Entity,
) {
    let (contents, air, direction) = match world.get::<&mut DisposalHolder>(holder_e) {
        Ok(mut holder) => {
            if holder.is_exiting {
                return;
            }
            holder.is_exiting = true;
            holder.content_ids.clear();
            (
                std::mem::take(&mut holder.contents),
                holder.air.take_all(),
                holder.current_direction,
            )
        }
        Err(_) => return,
    };

    let position = world
        .get::<&Position>(holder_e)
        .map(|p| *p)
        .unwrap_or_default();
    let tile = position.tile();
    let angle = direction.to_angle().map(|a| a + config.grid_rotation);

    let chamber = unit_at(world, tile);
    if chamber.is_none() {
        // Destructive fallback: open the floor under the holder so the
        // contents are not ejected into solid plating, plus the tile ahead
        // when an exit direction is known.
        pry_tile(world, events, tile);
        if direction.is_cardinal() {
            let (dx, dy) = direction.offset();
            pry_tile(world, events, (tile.0 + dx, tile.1 + dy));
        }
    }

    let count = contents.len();
    for content in contents {
        if let Some(chamber_e) = chamber {
            // Route through the reception chamber: insert, then discharge
            // immediately. The entity passes through without colliding
            // with the chamber itself.
            let cargo_id = world
                .get::<&Cargo>(content)
                .map(|c| c.cargo_id)
                .unwrap_or(0);
            if let Ok(mut unit) = world.get::<&mut DisposalUnit>(chamber_e) {
                unit.insert(content, cargo_id);
                unit.remove(content);
            }
        }
        // Re-parent to the grid at the exit point, disoriented and, when a
        // trajectory is known, thrown along it.
        let _ = world.insert_one(content, position);
        let _ = world.insert_one(
            content,
            Knockdown {
                time_left: config.knockdown_seconds,
            },
        );
        if let Some(angle) = angle {
            let (vx, vy) =
                damage::throw_velocity(angle, config.traversal_speed, config.exit_multiplier);
            let _ = world.insert_one(
                content,
                Thrown {
                    velocity: Vec2::new(vx, vy),
                    time_left: THROW_SECONDS,
                },
            );
        }
    }
    if count > 0 {
        events.push(NetworkEvent::ContentsEjected {
            x: tile.0,
            y: tile.1,
            count,
        });
    }

    expel_atmos(world, tile, air);

    log::debug!(
        "holder left disposals at ({}, {}) with {} entities",
        tile.0,
        tile.1,
        count
    );
    let _ = world.despawn(holder_e);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chuteworks_logic::atmosphere::{GasId, GasMixture};
    use chuteworks_logic::direction::Direction;
    use crate::components::Damageable;

    fn holder_with_cargo(
        world: &mut World,
        at: (i32, i32),
        direction: Direction,
        moles: f32,
    ) -> (Entity, Vec<Entity>) {
        let cargo: Vec<Entity> = (0..2)
            .map(|i| {
                world.spawn((
                    Cargo { cargo_id: i + 1 },
                    Damageable::default(),
                    Position::from_tile(at.0, at.1),
                ))
            })
            .collect();
        let mut holder = DisposalHolder::new(GasMixture::with_gas(GasId::Oxygen, moles));
        for (i, &e) in cargo.iter().enumerate() {
            holder.insert_content(e, i as u32 + 1);
        }
        holder.current_direction = direction;
        let holder_e = world.spawn((holder, Position::from_tile(at.0, at.1)));
        (holder_e, cargo)
    }

    #[test]
    fn test_exit_without_chamber_pries_floor() {
        let mut world = World::new();
        let config = NetworkConfig::default();
        let mut events = EventLog::new();

        let under = world.spawn((FloorTile::new(), Position::from_tile(0, 0)));
        let ahead = world.spawn((FloorTile::new(), Position::from_tile(1, 0)));
        let (holder_e, cargo) = holder_with_cargo(&mut world, (0, 0), Direction::East, 2.0);

        exit_disposals(&mut world, &config, &mut events, holder_e);

        assert!(world.get::<&FloorTile>(under).unwrap().pried);
        assert!(world.get::<&FloorTile>(ahead).unwrap().pried);
        assert!(!world.contains(holder_e));
        // Gas drained into the tile under the exit.
        assert!((world.get::<&FloorTile>(under).unwrap().air.total_moles() - 2.0).abs() < 0.001);
        // Contents knocked down and thrown east.
        for e in cargo {
            assert!(world.get::<&Knockdown>(e).is_ok());
            let thrown = world.get::<&Thrown>(e).unwrap();
            assert!(thrown.velocity.x > 0.0);
            assert!(thrown.velocity.y.abs() < 0.001);
        }
        let drained = events.drain();
        assert!(drained.contains(&NetworkEvent::TilePried { x: 0, y: 0 }));
        assert!(drained.contains(&NetworkEvent::TilePried { x: 1, y: 0 }));
        assert!(drained.contains(&NetworkEvent::ContentsEjected { x: 0, y: 0, count: 2 }));
    }

    #[test]
    fn test_exit_into_chamber_skips_pry() {
        let mut world = World::new();
        let config = NetworkConfig::default();
        let mut events = EventLog::new();

        let floor = world.spawn((FloorTile::new(), Position::from_tile(0, 0)));
        let chamber = world.spawn((DisposalUnit::new(5), Position::from_tile(0, 0)));
        let (holder_e, cargo) = holder_with_cargo(&mut world, (0, 0), Direction::East, 1.0);

        exit_disposals(&mut world, &config, &mut events, holder_e);

        assert!(!world.get::<&FloorTile>(floor).unwrap().pried);
        // Discharged straight through the chamber, not left inside it.
        assert!(world.get::<&DisposalUnit>(chamber).unwrap().is_empty());
        for e in cargo {
            assert!(world.get::<&Knockdown>(e).is_ok());
        }
        assert!(!world.contains(holder_e));
        let drained = events.drain();
        assert!(!drained
            .iter()
            .any(|e| matches!(e, NetworkEvent::TilePried { .. })));
    }

    #[test]
    fn test_exit_without_direction_skips_throw_and_ahead_pry() {
        let mut world = World::new();
        let config = NetworkConfig::default();
        let mut events = EventLog::new();

        world.spawn((FloorTile::new(), Position::from_tile(0, 0)));
        let ahead = world.spawn((FloorTile::new(), Position::from_tile(1, 0)));
        let (holder_e, cargo) = holder_with_cargo(&mut world, (0, 0), Direction::Invalid, 0.0);

        exit_disposals(&mut world, &config, &mut events, holder_e);

        assert!(!world.get::<&FloorTile>(ahead).unwrap().pried);
        for e in cargo {
            assert!(world.get::<&Thrown>(e).is_err());
            assert!(world.get::<&Knockdown>(e).is_ok());
        }
    }

    #[test]
    fn test_exit_is_idempotent() {
        let mut world = World::new();
        let config = NetworkConfig::default();
        let mut events = EventLog::new();

        let floor = world.spawn((FloorTile::new(), Position::from_tile(0, 0)));
        let (holder_e, _) = holder_with_cargo(&mut world, (0, 0), Direction::East, 2.0);

        exit_disposals(&mut world, &config, &mut events, holder_e);
        let first_events = events.drain().len();
        let first_moles = world.get::<&FloorTile>(floor).unwrap().air.total_moles();

        // Second call: holder is gone, nothing changes.
        exit_disposals(&mut world, &config, &mut events, holder_e);
        assert!(events.is_empty());
        let second_moles = world.get::<&FloorTile>(floor).unwrap().air.total_moles();
        assert_eq!(first_moles, second_moles);
        assert!(first_events > 0);
    }
}
