//! Systems - logic that operates on components

mod atmos;
mod events;
mod exit;
mod insertion;
mod motion;
mod recovery;
mod transition;

pub use atmos::*;
pub use events::*;
pub use exit::*;
pub use insertion::*;
pub use motion::*;
pub use recovery::*;
pub use transition::*;
