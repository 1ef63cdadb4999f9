//! Gas mixture value type and transactional transfer math.
//!
//! A holder carries its gas payload as an owned `GasMixture`; transfers in
//! and out of the network are whole-mixture moves (`take_all`) so a payload
//! is never left half-drained. Mixing weights temperature by heat capacity.

use serde::{Deserialize, Serialize};

/// Number of tracked gas species.
pub const GAS_COUNT: usize = 5;

/// Gas species index into [`GasMixture::moles`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GasId {
    Oxygen = 0,
    Nitrogen = 1,
    CarbonDioxide = 2,
    Plasma = 3,
    WaterVapour = 4,
}

impl GasId {
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Configuration constants for gas mixtures.
pub mod gas_constants {
    use super::GAS_COUNT;

    /// 20 degrees Celsius in Kelvin - default mixture temperature.
    pub const T20C: f32 = 293.15;

    /// Mixtures below this total are treated as empty.
    pub const MINIMUM_MOLES: f32 = 0.0001;

    /// Specific heat per mole for each species, indexed by `GasId`.
    pub const SPECIFIC_HEATS: [f32; GAS_COUNT] = [20.0, 20.0, 30.0, 200.0, 40.0];
}

/// An owned quantity of gas: moles per species plus temperature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GasMixture {
    /// Moles of each species, indexed by [`GasId`].
    pub moles: [f32; GAS_COUNT],
    /// Temperature in Kelvin.
    pub temperature: f32,
}

impl Default for GasMixture {
    fn default() -> Self {
        Self::empty()
    }
}

impl GasMixture {
    /// A mixture with no gas at room temperature.
    pub fn empty() -> Self {
        Self {
            moles: [0.0; GAS_COUNT],
            temperature: gas_constants::T20C,
        }
    }

    /// Build a mixture holding `moles` of a single species.
    pub fn with_gas(gas: GasId, moles: f32) -> Self {
        let mut mix = Self::empty();
        mix.moles[gas.index()] = moles;
        mix
    }

    pub fn total_moles(&self) -> f32 {
        self.moles.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_moles() < gas_constants::MINIMUM_MOLES
    }

    /// Total heat capacity - moles weighted by per-species specific heat.
    pub fn heat_capacity(&self) -> f32 {
        self.moles
            .iter()
            .zip(gas_constants::SPECIFIC_HEATS.iter())
            .map(|(m, c)| m * c)
            .sum()
    }

    /// Mix another quantity of gas into this one.
    ///
    /// The resulting temperature is the heat-capacity-weighted average of
    /// both mixtures, so merging cold and hot gas conserves thermal energy.
    pub fn merge(&mut self, other: &GasMixture) {
        let self_cap = self.heat_capacity();
        let other_cap = other.heat_capacity();
        let combined = self_cap + other_cap;
        if combined > 0.0 {
            self.temperature =
                (self.temperature * self_cap + other.temperature * other_cap) / combined;
        }
        for (mine, theirs) in self.moles.iter_mut().zip(other.moles.iter()) {
            *mine += theirs;
        }
    }

    /// Remove a fraction of the mixture, returning the removed portion.
    ///
    /// `fraction` is clamped to [0, 1]. Temperature is unchanged on both
    /// sides - splitting a mixture does not change how hot it is.
    pub fn remove_fraction(&mut self, fraction: f32) -> GasMixture {
        let fraction = fraction.clamp(0.0, 1.0);
        let mut removed = GasMixture::empty();
        removed.temperature = self.temperature;
        for (idx, moles) in self.moles.iter_mut().enumerate() {
            let taken = *moles * fraction;
            removed.moles[idx] = taken;
            *moles -= taken;
        }
        removed
    }

    /// Move the entire contents out, leaving this mixture empty.
    pub fn take_all(&mut self) -> GasMixture {
        std::mem::replace(self, GasMixture::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_mixture() {
        let mix = GasMixture::empty();
        assert!(mix.is_empty());
        assert_eq!(mix.total_moles(), 0.0);
        assert_eq!(mix.temperature, gas_constants::T20C);
    }

    #[test]
    fn test_merge_adds_moles() {
        let mut a = GasMixture::with_gas(GasId::Oxygen, 2.0);
        let b = GasMixture::with_gas(GasId::Nitrogen, 3.0);
        a.merge(&b);
        assert!((a.moles[GasId::Oxygen.index()] - 2.0).abs() < f32::EPSILON);
        assert!((a.moles[GasId::Nitrogen.index()] - 3.0).abs() < f32::EPSILON);
        assert!((a.total_moles() - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_merge_weights_temperature_by_heat_capacity() {
        let mut cold = GasMixture::with_gas(GasId::Oxygen, 1.0);
        cold.temperature = 200.0;
        let mut hot = GasMixture::with_gas(GasId::Oxygen, 3.0);
        hot.temperature = 400.0;

        cold.merge(&hot);

        // Same species, so weighting is purely by moles: (200 + 3*400) / 4
        assert!((cold.temperature - 350.0).abs() < 0.01);
    }

    #[test]
    fn test_merge_into_empty_takes_other_temperature() {
        let mut sink = GasMixture::empty();
        let mut payload = GasMixture::with_gas(GasId::CarbonDioxide, 2.0);
        payload.temperature = 310.0;
        sink.merge(&payload);
        assert!((sink.temperature - 310.0).abs() < 0.01);
    }

    #[test]
    fn test_remove_fraction() {
        let mut mix = GasMixture::with_gas(GasId::Plasma, 4.0);
        let half = mix.remove_fraction(0.5);
        assert!((half.total_moles() - 2.0).abs() < 0.001);
        assert!((mix.total_moles() - 2.0).abs() < 0.001);
        assert_eq!(half.temperature, mix.temperature);
    }

    #[test]
    fn test_take_all_leaves_empty() {
        let mut mix = GasMixture::with_gas(GasId::Oxygen, 2.0);
        let taken = mix.take_all();
        assert!((taken.total_moles() - 2.0).abs() < 0.001);
        assert!(mix.is_empty());
    }
}
