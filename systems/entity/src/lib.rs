#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that classifies the live entity collection once per frame.

use battlepath_core::{EntityClass, EntitySnapshot, EntityView};

/// Per-frame classification of live entities.
///
/// The lists are rebuilt from scratch by [`EntitySystem::arrange`] and reflect
/// the world exactly as it was captured; nothing is carried across frames.
#[derive(Debug, Default)]
pub struct EntitySystem {
    units: Vec<EntitySnapshot>,
    selected: Vec<EntitySnapshot>,
    collidables: Vec<EntitySnapshot>,
    projectiles: Vec<EntitySnapshot>,
    towers: Vec<EntitySnapshot>,
}

impl EntitySystem {
    /// Creates a new entity system with empty classification buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds every classification list from the provided view.
    pub fn arrange(&mut self, view: &EntityView) {
        self.units.clear();
        self.selected.clear();
        self.collidables.clear();
        self.projectiles.clear();
        self.towers.clear();

        for snapshot in view.iter() {
            match snapshot.class() {
                EntityClass::Unit => {
                    self.units.push(*snapshot);
                    if snapshot.is_selected() {
                        self.selected.push(*snapshot);
                    }
                    self.collidables.push(*snapshot);
                }
                EntityClass::Tower => {
                    self.towers.push(*snapshot);
                    self.collidables.push(*snapshot);
                }
                EntityClass::Projectile => self.projectiles.push(*snapshot),
            }
        }
    }

    /// Every unit in identifier order.
    #[must_use]
    pub fn units(&self) -> &[EntitySnapshot] {
        &self.units
    }

    /// Units whose selection flag was set when the view was captured.
    #[must_use]
    pub fn selected(&self) -> &[EntitySnapshot] {
        &self.selected
    }

    /// Entities other movers can collide with: units and towers.
    #[must_use]
    pub fn collidables(&self) -> &[EntitySnapshot] {
        &self.collidables
    }

    /// Every projectile in flight.
    #[must_use]
    pub fn projectiles(&self) -> &[EntitySnapshot] {
        &self.projectiles
    }

    /// Every tower.
    #[must_use]
    pub fn towers(&self) -> &[EntitySnapshot] {
        &self.towers
    }

    /// The unit under direct control in action mode.
    #[must_use]
    pub fn controlled(&self) -> Option<&EntitySnapshot> {
        self.selected.first()
    }
}
