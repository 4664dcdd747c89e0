//! Spawn and despawn requests buffered until the end of a frame.

use std::collections::BTreeSet;

use battlepath_core::EntityId;

use crate::entity::Entity;

/// Pending structural changes to the entity arena.
///
/// Requests made while a frame is being processed land here and only reach
/// the arena when [`PendingChanges::drain`] runs during the commit.
#[derive(Debug, Default)]
pub(crate) struct PendingChanges {
    additions: Vec<Entity>,
    removals: BTreeSet<EntityId>,
}

impl PendingChanges {
    pub(crate) fn queue_spawn(&mut self, entity: Entity) {
        self.additions.push(entity);
    }

    /// Returns `true` when the removal was not already queued.
    pub(crate) fn queue_removal(&mut self, id: EntityId) -> bool {
        self.removals.insert(id)
    }

    pub(crate) fn is_removal_pending(&self, id: EntityId) -> bool {
        self.removals.contains(&id)
    }

    pub(crate) fn counts(&self) -> (usize, usize) {
        (self.additions.len(), self.removals.len())
    }

    /// Yields removals in identifier order and the additions that survive them.
    ///
    /// An entity spawned and despawned within the same frame never appears.
    pub(crate) fn drain(&mut self) -> (Vec<EntityId>, Vec<Entity>) {
        let removals = std::mem::take(&mut self.removals);
        let additions: Vec<Entity> = self
            .additions
            .drain(..)
            .filter(|entity| !removals.contains(&entity.id))
            .collect();
        (removals.into_iter().collect(), additions)
    }
}
