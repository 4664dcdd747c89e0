#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Collision queries for moving circles against the tile field and other entities.
//!
//! Every query is answered against borrowed snapshots, so asking whether a
//! move would collide never changes the entity being asked about.

use battlepath_core::{CollisionResult, EntityId, EntitySnapshot, Field, Vector2D};

/// Throwaway shape used to ask whether a move would collide.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionProbe {
    /// Entity the probe stands in for; it never collides with itself.
    pub id: EntityId,
    /// Position before the move.
    pub position: Vector2D,
    /// Collision extent.
    pub radius: f32,
    /// Entity that launched the probe's subject, ignored during the query.
    pub owner: Option<EntityId>,
}

impl CollisionProbe {
    /// Copies the collision-relevant state of a snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &EntitySnapshot) -> Self {
        Self {
            id: snapshot.id,
            position: snapshot.position,
            radius: snapshot.radius,
            owner: snapshot.owner(),
        }
    }
}

/// Answers collision queries for a single frame.
pub struct CollisionDetection<'a> {
    field: &'a dyn Field,
    collidables: &'a [EntitySnapshot],
}

impl<'a> CollisionDetection<'a> {
    /// Creates a detector over the field and the frame's collidable entities.
    #[must_use]
    pub fn new(field: &'a dyn Field, collidables: &'a [EntitySnapshot]) -> Self {
        Self { field, collidables }
    }

    /// Reports what the probe would hit after moving by `velocity`.
    ///
    /// Leaving the grid or entering a blocked tile wins over entity contacts.
    /// Entity contacts only count while the probe closes in on the other
    /// entity, so overlapping shapes are free to separate; the nearest contact
    /// to the projected position is reported.
    #[must_use]
    pub fn collide(&self, probe: &CollisionProbe, velocity: Vector2D) -> Option<CollisionResult> {
        let projected = probe.position + velocity;

        match self.field.tile_value_at(projected) {
            None => return Some(CollisionResult::Field { tile: None }),
            Some(value) if !value.is_traversable() => {
                return Some(CollisionResult::Field {
                    tile: self.field.tile_index_at(projected),
                })
            }
            Some(_) => {}
        }

        let mut nearest: Option<(f32, EntityId)> = None;
        for other in self.collidables {
            if other.id == probe.id || Some(other.id) == probe.owner {
                continue;
            }

            let projected_distance = projected.distance(other.position);
            if projected_distance >= probe.radius + other.radius {
                continue;
            }
            if projected_distance >= probe.position.distance(other.position) {
                continue;
            }

            match nearest {
                Some((distance, _)) if distance <= projected_distance => {}
                _ => nearest = Some((projected_distance, other.id)),
            }
        }

        nearest.map(|(_, entity)| CollisionResult::Entity { entity })
    }

    /// Tests a hypothetical displacement of `entity` without touching it.
    #[must_use]
    pub fn test_move(
        &self,
        entity: &EntitySnapshot,
        displacement: Vector2D,
    ) -> Option<CollisionResult> {
        self.collide(&CollisionProbe::from_snapshot(entity), displacement)
    }
}
