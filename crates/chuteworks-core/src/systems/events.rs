//! Feedback events emitted by the network for the embedding game to play
//! back as audio/visual cues. Drained by the embedder each tick.

use serde::{Deserialize, Serialize};

use chuteworks_logic::direction::Direction;

/// One observable occurrence inside the network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NetworkEvent {
    /// A holder took a turn - directional clang cue.
    Clang {
        x: i32,
        y: i32,
        direction: Direction,
    },
    /// Floor plating pried open by an emergency exit.
    TilePried { x: i32, y: i32 },
    /// Entities ejected from the network.
    ContentsEjected { x: i32, y: i32, count: usize },
    /// A holder broke out of a routing loop.
    HolderEscaped { x: i32, y: i32 },
}

/// FIFO queue of pending events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<NetworkEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: NetworkEvent) {
        self.events.push(event);
    }

    /// Take all pending events, leaving the log empty.
    pub fn drain(&mut self) -> Vec<NetworkEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NetworkEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
