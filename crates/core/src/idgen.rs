//! Entity id allocation

use crate::types::EntityId;
use parking_lot::Mutex;

/// First id handed out by a fresh sequence. Lower ids are reserved for
/// entities every level starts with (the player).
pub const FIRST_ENTITY_ID: u32 = 10;

/// Thread-safe monotonic id sequence
///
/// Passed explicitly into every operation that creates entities, so two
/// editing sessions never share hidden state and tests can start from a
/// known id.
#[derive(Debug)]
pub struct EntityIdSequence {
    next_id: Mutex<u32>,
}

impl EntityIdSequence {
    pub fn new() -> Self {
        Self::starting_at(FIRST_ENTITY_ID)
    }

    /// Create a sequence whose first id is `first`
    pub fn starting_at(first: u32) -> Self {
        Self {
            next_id: Mutex::new(first),
        }
    }

    /// Get the next available id
    pub fn next_id(&self) -> EntityId {
        let mut next = self.next_id.lock();
        let id = *next;
        *next = next.saturating_add(1);
        EntityId(id)
    }

    /// The id the next call to `next_id` will return
    pub fn peek(&self) -> EntityId {
        EntityId(*self.next_id.lock())
    }

    /// Continue allocating after `max_id`, used once a level has been loaded
    pub fn reset_after(&self, max_id: EntityId) {
        *self.next_id.lock() = max_id.get().saturating_add(1);
    }
}

impl Default for EntityIdSequence {
    fn default() -> Self {
        Self::new()
    }
}
