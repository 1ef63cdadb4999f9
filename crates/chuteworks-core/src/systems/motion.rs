//! Motion control - advances every active holder along its segment.
//!
//! Each tick a holder accumulates covered distance at traversal speed and
//! is drawn along the line between its current and next tube anchors.
//! Arrival is a distance comparison, not a position test, so overshoot at
//! high speed cannot miss a transition; leftover distance carries into the
//! next segment within the same tick, bounded by
//! [`MAX_CHAINED_TRANSITIONS`].

use hecs::{Entity, World};
use rand::Rng;

use chuteworks_logic::transit;

use crate::components::{DisposalHolder, DisposalTube, Position};
use crate::config::NetworkConfig;

use super::events::EventLog;
use super::exit::exit_disposals;
use super::transition::try_enter_tube;

/// Upper bound on same-tick follow-up transitions. Generous for any real
/// network; only a pathological zero-length layout could hit it.
pub const MAX_CHAINED_TRANSITIONS: usize = 8;

/// Advance all holders by one tick.
pub fn motion_system(
    world: &mut World,
    config: &NetworkConfig,
    events: &mut EventLog,
    rng: &mut impl Rng,
    delta_seconds: f32,
) {
    // Collect first - transitions and exits mutate the world mid-walk.
    let holders: Vec<Entity> = world
        .query::<&DisposalHolder>()
        .iter()
        .map(|(e, _)| e)
        .collect();
    for holder_e in holders {
        update_holder(world, config, events, rng, holder_e, delta_seconds);
    }
}

/// Anchor position of a tube, `None` once the tube is gone.
fn anchor_of(world: &World, tube_e: Entity) -> Option<(f32, f32)> {
    world.get::<&DisposalTube>(tube_e).ok()?;
    let pos = world.get::<&Position>(tube_e).ok()?;
    Some((pos.world.x, pos.world.y))
}

fn set_holder_position(world: &mut World, holder_e: Entity, position: Position) {
    if let Ok(mut pos) = world.get::<&mut Position>(holder_e) {
        *pos = position;
    }
}

/// Contained entities follow the holder exactly while in transit.
fn sync_contents(world: &mut World, holder_e: Entity) {
    let snapshot = match world.get::<&DisposalHolder>(holder_e) {
        Ok(h) => h.contents.clone(),
        Err(_) => return,
    };
    let position = match world.get::<&Position>(holder_e) {
        Ok(p) => *p,
        Err(_) => return,
    };
    for content in snapshot {
        let _ = world.insert_one(content, position);
    }
}

fn update_holder(
    world: &mut World,
    config: &NetworkConfig,
    events: &mut EventLog,
    rng: &mut impl Rng,
    holder_e: Entity,
    delta_seconds: f32,
) {
    let (is_exiting, drained, current, next, mut progress) =
        match world.get::<&DisposalHolder>(holder_e) {
            Ok(h) => (
                h.is_exiting,
                h.contents.is_empty(),
                h.current_tube,
                h.next_tube,
                h.progress,
            ),
            Err(_) => return,
        };
    if is_exiting {
        return;
    }
    // A holder without contents does not get to exist.
    if drained {
        exit_disposals(world, config, events, holder_e);
        return;
    }
    let (Some(current), Some(next)) = (current, next) else {
        exit_disposals(world, config, events, holder_e);
        return;
    };
    // Primary failure path: a referenced tube was destroyed mid-transit.
    let (Some(mut origin), Some(mut dest)) = (anchor_of(world, current), anchor_of(world, next))
    else {
        exit_disposals(world, config, events, holder_e);
        return;
    };

    progress += config.traversal_speed * delta_seconds;
    let mut next_e = next;

    for _ in 0..MAX_CHAINED_TRANSITIONS {
        let total = transit::segment_length(origin, dest);
        if !transit::has_arrived(progress, total) {
            break;
        }
        let overshoot = progress - total;
        // Snap to the arrival anchor first so routing and exit observe the
        // holder at the tube it actually reached.
        set_holder_position(world, holder_e, Position::new(dest.0, dest.1));

        if !try_enter_tube(world, config, events, rng, holder_e, next_e) {
            // The holder exited, or the hop was refused; a refusal with
            // the holder still live means it can no longer move - a stall.
            let stalled = world
                .get::<&DisposalHolder>(holder_e)
                .map(|h| !h.is_exiting)
                .unwrap_or(false);
            if stalled {
                exit_disposals(world, config, events, holder_e);
            }
            return;
        }

        // Transition committed: carry the overshoot onto the new segment.
        progress = overshoot;
        let (new_current, new_next) = match world.get::<&DisposalHolder>(holder_e) {
            Ok(h) => (h.current_tube, h.next_tube),
            Err(_) => return,
        };
        let (Some(c), Some(n)) = (new_current, new_next) else {
            exit_disposals(world, config, events, holder_e);
            return;
        };
        let (Some(o), Some(d)) = (anchor_of(world, c), anchor_of(world, n)) else {
            exit_disposals(world, config, events, holder_e);
            return;
        };
        origin = o;
        dest = d;
        next_e = n;
    }

    if let Ok(mut holder) = world.get::<&mut DisposalHolder>(holder_e) {
        holder.progress = progress;
    }
    let (x, y) = transit::position_along(origin, dest, progress);
    set_holder_position(world, holder_e, Position::new(x, y));
    sync_contents(world, holder_e);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chuteworks_logic::atmosphere::GasMixture;
    use chuteworks_logic::direction::Direction;
    use chuteworks_logic::routing::TubeShape;
    use crate::components::{Cargo, Damageable, DisposalTube, FloorTile};
    use crate::systems::events::NetworkEvent;
    use rand::rngs::mock::StepRng;

    fn rng() -> StepRng {
        StepRng::new(u64::MAX, 0)
    }

    fn spawn_tube(
        world: &mut World,
        id: u32,
        shape: TubeShape,
        facing: Direction,
        tile: (i32, i32),
    ) -> Entity {
        world.spawn((
            DisposalTube::new(id, shape, facing),
            Position::from_tile(tile.0, tile.1),
        ))
    }

    /// Entry at (0,0) facing east, transits at (1,0) and (2,0), terminal
    /// at (3,0). Returns the holder, launched and moving east.
    fn straight_line(world: &mut World, config: &NetworkConfig, events: &mut EventLog) -> Entity {
        let entry = spawn_tube(world, 0, TubeShape::Entry, Direction::East, (0, 0));
        spawn_tube(world, 1, TubeShape::Transit, Direction::East, (1, 0));
        spawn_tube(world, 2, TubeShape::Transit, Direction::East, (2, 0));
        spawn_tube(world, 3, TubeShape::Terminal, Direction::West, (3, 0));
        for x in 0..4 {
            world.spawn((FloorTile::new(), Position::from_tile(x, 0)));
        }

        let content = world.spawn((
            Cargo { cargo_id: 1 },
            Damageable::default(),
            Position::from_tile(0, 0),
        ));
        let mut holder = DisposalHolder::new(GasMixture::empty());
        holder.insert_content(content, 1);
        let holder_e = world.spawn((holder, Position::from_tile(0, 0)));
        assert!(try_enter_tube(world, config, events, &mut rng(), holder_e, entry));
        holder_e
    }

    #[test]
    fn test_holder_advances_toward_next_tube() {
        let mut world = World::new();
        let config = NetworkConfig {
            traversal_speed: 0.5,
            ..Default::default()
        };
        let mut events = EventLog::new();
        let holder_e = straight_line(&mut world, &config, &mut events);

        motion_system(&mut world, &config, &mut events, &mut rng(), 1.0);

        let pos = world.get::<&Position>(holder_e).unwrap();
        assert!((pos.world.x - 0.5).abs() < 0.001);
        assert_eq!(pos.world.y, 0.0);
        drop(pos);
        // Contents ride along.
        let content = world.get::<&DisposalHolder>(holder_e).unwrap().contents[0];
        let cpos = world.get::<&Position>(content).unwrap();
        assert!((cpos.world.x - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_straight_run_reaches_terminal_and_exits() {
        let mut world = World::new();
        let config = NetworkConfig {
            traversal_speed: 1.0,
            ..Default::default()
        };
        let mut events = EventLog::new();
        let holder_e = straight_line(&mut world, &config, &mut events);
        let content = world.get::<&DisposalHolder>(holder_e).unwrap().contents[0];

        // 3 tiles to cover at 1 tile/s; give it a few extra ticks.
        for _ in 0..5 {
            motion_system(&mut world, &config, &mut events, &mut rng(), 1.0);
            if !world.contains(holder_e) {
                break;
            }
        }

        assert!(!world.contains(holder_e));
        // Straight travel dealt no damage and the cargo landed at the end.
        assert_eq!(world.get::<&Damageable>(content).unwrap().total, 0.0);
        assert_eq!(world.get::<&Position>(content).unwrap().tile(), (3, 0));
        let drained = events.drain();
        assert!(!drained.iter().any(|e| matches!(e, NetworkEvent::Clang { .. })));
        assert!(drained
            .iter()
            .any(|e| matches!(e, NetworkEvent::ContentsEjected { x: 3, y: 0, count: 1 })));
    }

    #[test]
    fn test_overshoot_chains_transitions_in_one_tick() {
        let mut world = World::new();
        let config = NetworkConfig {
            traversal_speed: 10.0,
            ..Default::default()
        };
        let mut events = EventLog::new();
        let holder_e = straight_line(&mut world, &config, &mut events);

        // One tick covers the whole 3-tile run.
        motion_system(&mut world, &config, &mut events, &mut rng(), 1.0);

        assert!(!world.contains(holder_e));
        assert!(events
            .drain()
            .iter()
            .any(|e| matches!(e, NetworkEvent::ContentsEjected { x: 3, y: 0, .. })));
    }

    #[test]
    fn test_destroyed_next_tube_forces_exit_with_pry() {
        let mut world = World::new();
        let config = NetworkConfig {
            traversal_speed: 1.0,
            ..Default::default()
        };
        let mut events = EventLog::new();
        let holder_e = straight_line(&mut world, &config, &mut events);

        // Delete the tube the holder is heading for.
        let doomed = world.get::<&DisposalHolder>(holder_e).unwrap().next_tube.unwrap();
        world.despawn(doomed).unwrap();

        motion_system(&mut world, &config, &mut events, &mut rng(), 0.1);

        assert!(!world.contains(holder_e));
        let drained = events.drain();
        // Direction was still east from before the deletion, so the tile
        // under the holder and the one ahead both get pried.
        assert!(drained.contains(&NetworkEvent::TilePried { x: 0, y: 0 }));
        assert!(drained.contains(&NetworkEvent::TilePried { x: 1, y: 0 }));
    }

    #[test]
    fn test_drained_holder_is_destroyed() {
        let mut world = World::new();
        let config = NetworkConfig::default();
        let mut events = EventLog::new();

        let holder_e = world.spawn((
            DisposalHolder::new(GasMixture::empty()),
            Position::from_tile(0, 0),
        ));
        motion_system(&mut world, &config, &mut events, &mut rng(), 0.1);
        assert!(!world.contains(holder_e));
    }

    #[test]
    fn test_exiting_holder_is_left_alone() {
        let mut world = World::new();
        let config = NetworkConfig::default();
        let mut events = EventLog::new();

        let content = world.spawn((Cargo { cargo_id: 1 },));
        let mut holder = DisposalHolder::new(GasMixture::empty());
        holder.insert_content(content, 1);
        holder.is_exiting = true;
        let holder_e = world.spawn((holder, Position::from_tile(0, 0)));

        motion_system(&mut world, &config, &mut events, &mut rng(), 1.0);

        // Still present and unmoved - the latch blocks further motion.
        assert!(world.contains(holder_e));
        assert_eq!(world.get::<&Position>(holder_e).unwrap().tile(), (0, 0));
    }
}
