//! Post-ejection recovery - knockdown timers and throw flight.

use hecs::{Entity, World};

use crate::components::{Knockdown, Position, Thrown};

/// Tick down knockdowns and integrate throw impulses for ejected entities.
pub fn recovery_system(world: &mut World, delta_seconds: f32) {
    // Collect updates first (can't mutate while iterating).
    let mut knockdowns: Vec<(Entity, f32)> = Vec::new();
    for (entity, kd) in world.query::<&Knockdown>().iter() {
        knockdowns.push((entity, kd.time_left - delta_seconds));
    }
    for (entity, time_left) in knockdowns {
        if time_left <= 0.0 {
            let _ = world.remove_one::<Knockdown>(entity);
        } else if let Ok(mut kd) = world.get::<&mut Knockdown>(entity) {
            kd.time_left = time_left;
        }
    }

    let mut flights: Vec<(Entity, Position, f32)> = Vec::new();
    for (entity, (thrown, pos)) in world.query::<(&Thrown, &Position)>().iter() {
        let moved = Position {
            world: pos.world + thrown.velocity * delta_seconds,
        };
        flights.push((entity, moved, thrown.time_left - delta_seconds));
    }
    for (entity, position, time_left) in flights {
        if let Ok(mut pos) = world.get::<&mut Position>(entity) {
            *pos = position;
        }
        if time_left <= 0.0 {
            let _ = world.remove_one::<Thrown>(entity);
        } else if let Ok(mut thrown) = world.get::<&mut Thrown>(entity) {
            thrown.time_left = time_left;
        }
    }
}
