//! Network tuning configuration.

use serde::{Deserialize, Serialize};

use chuteworks_logic::damage::TurnDamage;

/// Tuning values for holder transit, damage and exit behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Holder speed along a segment, tiles per second.
    pub traversal_speed: f32,
    /// Fixed damage profile dealt to each contained entity on a turn.
    pub turn_damage: TurnDamage,
    /// Once accumulated turn damage reaches this, further turns are free.
    pub damage_cap: f32,
    /// Chance of breaking out of the network on a turn, rolled once the
    /// visit threshold for the entered tube is exceeded.
    pub escape_chance: f32,
    /// Visits to a single tube before escape rolls begin.
    pub tube_visit_threshold: u32,
    /// Ejection speed multiplier applied on top of traversal speed.
    pub exit_multiplier: f32,
    /// Forced incapacitation applied to ejected entities, seconds.
    pub knockdown_seconds: f32,
    /// World rotation of the grid, radians; composed into exit trajectories.
    pub grid_rotation: f32,
    /// Seed for the engine's deterministic RNG.
    pub seed: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            traversal_speed: 5.0,
            turn_damage: TurnDamage::default(),
            damage_cap: 30.0,
            escape_chance: 0.25,
            tube_visit_threshold: 2,
            exit_multiplier: 3.0,
            knockdown_seconds: 1.0,
            grid_rotation: 0.0,
            seed: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_round_trips_through_json() {
        let config = NetworkConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: NetworkConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.traversal_speed, config.traversal_speed);
        assert_eq!(back.tube_visit_threshold, config.tube_visit_threshold);
        assert_eq!(back.seed, config.seed);
    }
}
