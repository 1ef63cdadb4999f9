//! The in-transit payload container moving through the tube network.

use std::collections::{BTreeSet, HashMap};

use hecs::Entity;
use serde::{Deserialize, Serialize};

use chuteworks_logic::atmosphere::GasMixture;
use chuteworks_logic::direction::Direction;
use chuteworks_logic::tags;

/// One packet travelling the disposal network: contained entities plus a
/// gas payload, both exclusively owned by the holder until exit.
///
/// `Entity` references are runtime lookups only and are rebuilt from the
/// mirrored stable ids after a load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisposalHolder {
    /// Contained entities, in insertion order. Never empty while the
    /// holder exists - a drained holder is destroyed immediately.
    #[serde(skip)]
    pub contents: Vec<Entity>,
    /// Stable cargo ids mirroring `contents`, for persistence.
    pub content_ids: Vec<u32>,
    /// Gas payload, transferred atomically at entry and exit.
    pub air: GasMixture,
    /// Tube the holder most recently entered.
    #[serde(skip)]
    pub current_tube: Option<Entity>,
    pub current_tube_id: Option<u32>,
    /// Tube the holder is travelling toward.
    #[serde(skip)]
    pub next_tube: Option<Entity>,
    pub next_tube_id: Option<u32>,
    /// Current travel direction; `Invalid` until the first tube is entered.
    pub current_direction: Direction,
    /// World rotation, kept in line with the travel direction.
    pub rotation: f32,
    /// Sorting tags read by sorter segments.
    pub tags: BTreeSet<String>,
    /// Times each tube (by id) has been entered. Grows monotonically.
    pub tube_visits: HashMap<u32, u32>,
    /// Total turn damage dealt to contents so far, capped by config.
    pub accumulated_damage: f32,
    /// Distance covered from the current tube's anchor.
    pub progress: f32,
    /// One-way latch: once exit begins no further routing happens.
    pub is_exiting: bool,
}

/// Tag operations can fail on malformed input.
#[derive(Debug, PartialEq, Eq)]
pub enum TagError {
    /// Tag contains characters outside alphanumerics, commas and spaces,
    /// or is empty.
    InvalidCharacters,
}

impl std::fmt::Display for TagError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TagError::InvalidCharacters => {
                write!(f, "tag must be non-empty alphanumerics, commas and spaces")
            }
        }
    }
}

impl std::error::Error for TagError {}

impl DisposalHolder {
    pub fn new(air: GasMixture) -> Self {
        Self {
            air,
            ..Default::default()
        }
    }

    /// Add an entity to the contents. Membership is unique; re-inserting
    /// an already-contained entity is a no-op returning false.
    pub fn insert_content(&mut self, entity: Entity, cargo_id: u32) -> bool {
        if self.contents.contains(&entity) {
            return false;
        }
        self.contents.push(entity);
        self.content_ids.push(cargo_id);
        true
    }

    pub fn remove_content(&mut self, entity: Entity) -> bool {
        match self.contents.iter().position(|&e| e == entity) {
            Some(idx) => {
                self.contents.remove(idx);
                self.content_ids.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Attach a sorting tag. The charset is restricted so tags survive
    /// sorter filter lists and config files.
    pub fn add_tag(&mut self, tag: &str) -> Result<(), TagError> {
        if !tags::is_valid_tag(tag) {
            return Err(TagError::InvalidCharacters);
        }
        self.tags.insert(tag.to_owned());
        Ok(())
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        self.tags.remove(tag)
    }

    /// Whether any held tag appears in a sorter's filter list.
    pub fn tags_overlap(&self, filter: &[String]) -> bool {
        tags::tags_overlap(
            self.tags.iter().map(String::as_str),
            filter.iter().map(String::as_str),
        )
    }

    /// How many times the holder has entered the given tube.
    pub fn visits(&self, tube_id: u32) -> u32 {
        self.tube_visits.get(&tube_id).copied().unwrap_or(0)
    }

    /// Record a successful entry into a tube. Counts only ever grow.
    pub fn record_visit(&mut self, tube_id: u32) {
        *self.tube_visits.entry(tube_id).or_insert(0) += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hecs::World;

    fn dummy_entities(world: &mut World, n: usize) -> Vec<Entity> {
        (0..n).map(|_| world.spawn(())).collect()
    }

    #[test]
    fn test_contents_unique_membership() {
        let mut world = World::new();
        let entities = dummy_entities(&mut world, 2);
        let mut holder = DisposalHolder::new(GasMixture::empty());

        assert!(holder.insert_content(entities[0], 1));
        assert!(holder.insert_content(entities[1], 2));
        assert!(!holder.insert_content(entities[0], 1));
        assert_eq!(holder.contents.len(), 2);
        assert_eq!(holder.content_ids, vec![1, 2]);

        assert!(holder.remove_content(entities[0]));
        assert!(!holder.remove_content(entities[0]));
        assert_eq!(holder.content_ids, vec![2]);
    }

    #[test]
    fn test_tag_charset_enforced() {
        let mut holder = DisposalHolder::default();
        assert!(holder.add_tag("recycle").is_ok());
        assert!(holder.add_tag("deck 3, cargo").is_ok());
        assert_eq!(
            holder.add_tag("bad;tag"),
            Err(TagError::InvalidCharacters)
        );
        assert_eq!(holder.add_tag(""), Err(TagError::InvalidCharacters));

        assert!(holder.tags_overlap(&["recycle".to_owned()]));
        assert!(!holder.tags_overlap(&["mail".to_owned()]));
        assert!(holder.remove_tag("recycle"));
        assert!(!holder.tags_overlap(&["recycle".to_owned()]));
    }

    #[test]
    fn test_visit_counts_monotonic() {
        let mut holder = DisposalHolder::default();
        assert_eq!(holder.visits(7), 0);
        holder.record_visit(7);
        holder.record_visit(7);
        holder.record_visit(3);
        assert_eq!(holder.visits(7), 2);
        assert_eq!(holder.visits(3), 1);
    }
}
