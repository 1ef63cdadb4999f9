//! Floor tile component - atmosphere sink and pry-fallback target.

use serde::{Deserialize, Serialize};

use chuteworks_logic::atmosphere::GasMixture;

/// The floor under a stretch of network. Receives expelled gas payloads;
/// pried open as the destructive fallback when a holder exits with no
/// reception chamber present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FloorTile {
    /// Whether the tile plating has been pried open.
    pub pried: bool,
    /// Ambient air above the tile.
    pub air: GasMixture,
}

impl FloorTile {
    pub fn new() -> Self {
        Self::default()
    }
}
