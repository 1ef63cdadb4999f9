//! Turn damage, escape rolls, and ejection impulse math.
//!
//! Damage and escape chances apply only when a holder changes direction -
//! straight travel is safe, sharp turns are punishing. The cumulative
//! damage a single holder can deal is capped; once the cap is reached
//! further turns are free.

use serde::{Deserialize, Serialize};

/// Damage applied to each contained entity on a single turn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurnDamage {
    /// Blunt damage per entity.
    pub blunt: f32,
}

impl Default for TurnDamage {
    fn default() -> Self {
        Self { blunt: 5.0 }
    }
}

/// Whether a pending turn is still allowed to deal damage.
///
/// The check runs before the turn's damage is added, so the accumulated
/// total may exceed the cap by at most one turn's worth.
pub fn damage_allowed(accumulated: f32, cap: f32) -> bool {
    accumulated < cap
}

/// Whether a holder breaks out of the network on this turn.
///
/// `visits` is how many times the holder has already entered the segment;
/// the roll only happens once that count exceeds `threshold`. `roll` is a
/// uniform sample in [0, 1) supplied by the caller's RNG.
pub fn should_escape(visits: u32, threshold: u32, roll: f32, chance: f32) -> bool {
    visits > threshold && roll < chance
}

/// Velocity imparted to an ejected entity.
///
/// `angle` is the composed exit trajectory (grid rotation already applied);
/// speed scales with how fast the holder was travelling.
pub fn throw_velocity(angle: f32, traversal_speed: f32, multiplier: f32) -> (f32, f32) {
    let magnitude = traversal_speed * multiplier;
    (angle.cos() * magnitude, angle.sin() * magnitude)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_allowed_up_to_cap() {
        assert!(damage_allowed(0.0, 30.0));
        assert!(damage_allowed(29.9, 30.0));
        assert!(!damage_allowed(30.0, 30.0));
        assert!(!damage_allowed(45.0, 30.0));
    }

    #[test]
    fn test_escape_needs_threshold_and_roll() {
        // Under threshold: the roll is never consulted.
        assert!(!should_escape(2, 2, 0.0, 0.25));
        // Over threshold, roll under chance.
        assert!(should_escape(3, 2, 0.1, 0.25));
        // Over threshold, roll too high.
        assert!(!should_escape(3, 2, 0.9, 0.25));
        // Zero chance never escapes.
        assert!(!should_escape(10, 2, 0.0, 0.0));
    }

    #[test]
    fn test_throw_velocity_direction() {
        let (vx, vy) = throw_velocity(0.0, 5.0, 3.0);
        assert!((vx - 15.0).abs() < 0.001);
        assert!(vy.abs() < 0.001);

        let (vx, vy) = throw_velocity(std::f32::consts::FRAC_PI_2, 5.0, 3.0);
        assert!(vx.abs() < 0.001);
        assert!((vy - 15.0).abs() < 0.001);
    }
}
