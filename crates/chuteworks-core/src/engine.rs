//! Disposal engine - main entry point for running the network simulation

use std::io::{Read, Write};

use hecs::{Entity, World};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::components::*;
use crate::config::NetworkConfig;
use crate::layout::{build_network, NetworkHandles, NetworkLayout};
use crate::systems::*;

/// Main disposal-network engine.
///
/// Ticks are single-threaded: motion, transitions and exits run to
/// completion for one holder before the next is touched. All randomness
/// flows through one RNG seeded from the config, so a given seed replays
/// the same run.
pub struct DisposalEngine {
    /// ECS world containing all entities
    pub world: World,
    /// Network tuning values
    pub config: NetworkConfig,
    /// Pending feedback events, drained by the embedder
    pub events: EventLog,
    /// Simulation time in seconds since start
    pub sim_time: f64,

    rng: StdRng,
    next_cargo_id: u32,
}

impl DisposalEngine {
    /// Create an empty engine with the given tuning.
    pub fn new(config: NetworkConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            world: World::new(),
            config,
            events: EventLog::new(),
            sim_time: 0.0,
            rng,
            next_cargo_id: 1,
        }
    }

    /// Spawn a complete network from a layout description.
    pub fn build(&mut self, layout: &NetworkLayout) -> NetworkHandles {
        build_network(&mut self.world, layout)
    }

    /// Advance the simulation by `delta_seconds`.
    pub fn update(&mut self, delta_seconds: f32) {
        motion_system(
            &mut self.world,
            &self.config,
            &mut self.events,
            &mut self.rng,
            delta_seconds,
        );
        recovery_system(&mut self.world, delta_seconds);
        self.sim_time += delta_seconds as f64;
    }

    /// Create a transportable entity on a tile.
    pub fn spawn_cargo(&mut self, x: i32, y: i32) -> Entity {
        let id = self.next_cargo_id;
        self.next_cargo_id += 1;
        self.world.spawn((
            Cargo { cargo_id: id },
            Damageable::default(),
            Position::from_tile(x, y),
        ))
    }

    /// Put a cargo entity into a disposal unit's chamber.
    pub fn load_cargo(&mut self, unit_e: Entity, cargo_e: Entity) -> bool {
        let cargo_id = match self.world.get::<&Cargo>(cargo_e) {
            Ok(c) => c.cargo_id,
            Err(_) => return false,
        };
        let unit_pos = match self.world.get::<&Position>(unit_e) {
            Ok(p) => *p,
            Err(_) => return false,
        };
        let inserted = match self.world.get::<&mut DisposalUnit>(unit_e) {
            Ok(mut unit) => unit.insert(cargo_e, cargo_id),
            Err(_) => false,
        };
        if inserted {
            let _ = self.world.insert_one(cargo_e, unit_pos);
        }
        inserted
    }

    /// Spawn a holder carrying `entities` and `gas` and launch it into
    /// `start_tube`.
    ///
    /// `direction` seeds the holder's travel direction: `Invalid` for an
    /// entry segment (the normal case), or a cardinal to inject mid-network.
    /// Returns `None` when the launch failed terminally - the holder has
    /// already exited, dropping the entities at the tube.
    pub fn spawn_holder(
        &mut self,
        entities: &[Entity],
        gas: GasMixture,
        start_tube: Entity,
        direction: Direction,
    ) -> Option<Entity> {
        if entities.is_empty() {
            return None;
        }
        let anchor = self.world.get::<&Position>(start_tube).ok().map(|p| *p)?;
        let mut holder = DisposalHolder::new(gas);
        for &entity in entities {
            let cargo_id = self
                .world
                .get::<&Cargo>(entity)
                .map(|c| c.cargo_id)
                .unwrap_or(0);
            holder.insert_content(entity, cargo_id);
        }
        holder.current_direction = direction;
        let holder_e = self.world.spawn((holder, anchor));
        if !try_enter_tube(
            &mut self.world,
            &self.config,
            &mut self.events,
            &mut self.rng,
            holder_e,
            start_tube,
        ) {
            return None;
        }
        Some(holder_e)
    }

    /// Flush a unit, launching its charge into the network.
    pub fn flush(&mut self, unit_e: Entity) -> Option<Entity> {
        flush_unit(
            &mut self.world,
            &self.config,
            &mut self.events,
            &mut self.rng,
            unit_e,
        )
    }

    /// Take all pending feedback events.
    pub fn drain_events(&mut self) -> Vec<NetworkEvent> {
        self.events.drain()
    }

    /// Count holders currently in transit.
    pub fn holder_count(&self) -> usize {
        self.world.query::<&DisposalHolder>().iter().count()
    }

    /// Count network segments.
    pub fn tube_count(&self) -> usize {
        self.world.query::<&DisposalTube>().iter().count()
    }

    /// Count disposal units.
    pub fn unit_count(&self) -> usize {
        self.world.query::<&DisposalUnit>().iter().count()
    }

    /// Save simulation state to a writer
    pub fn save<W: Write>(&self, writer: W) -> Result<(), crate::persistence::SaveError> {
        crate::persistence::save_simulation(
            writer,
            &self.world,
            self.sim_time,
            &self.config,
            &self.events,
            self.next_cargo_id,
        )
    }

    /// Load simulation state from a reader
    pub fn load<R: Read>(&mut self, reader: R) -> Result<(), crate::persistence::SaveError> {
        let loaded = crate::persistence::load_simulation(reader)?;

        self.world = loaded.world;
        self.sim_time = loaded.sim_time;
        self.config = loaded.config;
        self.events = loaded.events;
        self.next_cargo_id = loaded.next_cargo_id;
        self.rng = StdRng::seed_from_u64(self.config.seed);

        Ok(())
    }
}

impl Default for DisposalEngine {
    fn default() -> Self {
        Self::new(NetworkConfig::default())
    }
}
