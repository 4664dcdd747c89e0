#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Battlepath simulation.
//!
//! This crate defines the message surface that connects the game
//! orchestrator, the authoritative world, and pure systems. The orchestrator
//! and systems submit [`Command`] values describing desired mutations, the
//! world executes those commands via its `apply` entry point, and then
//! broadcasts [`Event`] values that downstream systems react to. Systems only
//! ever read immutable [`EntityView`] snapshots, so nothing iterates the live
//! entity collection while it changes.

use std::time::Duration;

use serde::{Deserialize, Serialize};

mod collaborators;
mod config;
mod geometry;

pub use collaborators::{Field, Input, Key, MouseButton, Pathplanner, TileIndex, TileValue, View};
pub use config::{ConfigError, FireDirection, SimulationConfig, TOWER_FIRE_DIRECTION};
pub use geometry::Rectangle2D;

/// Two-dimensional vector used for every position, velocity and direction.
///
/// Normalization goes through `normalize_or_zero`, so a zero-length vector
/// normalizes to the zero vector instead of producing NaN components.
pub use glam::Vec2 as Vector2D;

/// Describes which control scheme the player is currently using.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayMode {
    /// Top-down view with rectangle selection and path-directed movement.
    #[default]
    Strategy,
    /// Direct control of the first selected unit with projectile shooting.
    Action,
}

/// Stable handle allocated by the world for every entity it owns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Closed set of entity variants tracked by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityClass {
    /// Player-commanded unit that follows paths and shoots.
    Unit,
    /// Straight-line shot that disappears on impact or expiry.
    Projectile,
    /// Stationary turret that fires at nearby units.
    Tower,
}

/// Outcome of a collision query against the field or another entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CollisionResult {
    /// The projected position lies on a blocked tile or outside the field.
    Field {
        /// Tile that blocked the move, `None` when outside the field.
        tile: Option<TileIndex>,
    },
    /// The projected extent overlaps another entity.
    Entity {
        /// Identifier of the entity that was hit.
        entity: EntityId,
    },
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock and runs every entity's `process` step.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Queues a new unit at the provided position.
    SpawnUnit {
        /// World position of the unit.
        position: Vector2D,
    },
    /// Queues a new tower at the provided position.
    SpawnTower {
        /// World position of the tower.
        position: Vector2D,
    },
    /// Discards the unit's path and requests a fresh plan toward `destination`.
    MoveUnitTo {
        /// Unit receiving the order.
        unit: EntityId,
        /// World position the unit should travel to.
        destination: Vector2D,
    },
    /// Drops any waypoints the unit still holds.
    ClearPath {
        /// Unit whose path should be cleared.
        unit: EntityId,
    },
    /// Overrides the velocity of a unit under direct control.
    SetVelocity {
        /// Unit being steered.
        unit: EntityId,
        /// New velocity in world units per second.
        velocity: Vector2D,
    },
    /// Marks a unit as selected or deselected.
    SetSelected {
        /// Unit whose selection flag changes.
        unit: EntityId,
        /// Whether the unit is selected after the command.
        selected: bool,
    },
    /// Requests that a unit fire a projectile along `direction`.
    Shoot {
        /// Unit firing the shot.
        unit: EntityId,
        /// Direction of travel; normalized by the world.
        direction: Vector2D,
    },
    /// Updates the aim vector presented by a tower.
    AimTower {
        /// Tower being rotated.
        tower: EntityId,
        /// Normalized aim vector.
        aim: Vector2D,
    },
    /// Requests that a tower fire a projectile along `direction`.
    FireTower {
        /// Tower firing the shot.
        tower: EntityId,
        /// Direction of travel; normalized by the world.
        direction: Vector2D,
    },
    /// Commits an unobstructed displacement for an entity.
    MoveEntity {
        /// Entity being moved.
        entity: EntityId,
        /// Position the entity occupies after the move.
        to: Vector2D,
    },
    /// Reports that a projectile struck something and must be removed.
    Impact {
        /// Projectile that collided.
        projectile: EntityId,
        /// Position where the collision was detected.
        at: Vector2D,
        /// What the projectile collided with.
        target: CollisionResult,
    },
    /// Queues removal of an entity at the next commit.
    Despawn {
        /// Entity to remove.
        entity: EntityId,
    },
    /// Applies every queued spawn and despawn.
    CommitChanges,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
        /// Simulation clock after the tick.
        clock: Duration,
    },
    /// A unit reached the head waypoint of its path.
    WaypointReached {
        /// Unit that arrived.
        unit: EntityId,
        /// Number of waypoints still queued.
        remaining: usize,
    },
    /// A unit received a new non-empty path.
    PathAssigned {
        /// Unit that was commanded.
        unit: EntityId,
        /// Number of waypoints in the plan.
        waypoints: usize,
    },
    /// The planner found no route, so the unit holds position.
    PathUnavailable {
        /// Unit that was commanded.
        unit: EntityId,
        /// Destination that could not be reached.
        destination: Vector2D,
    },
    /// A unit or tower emitted a projectile, visible after the next commit.
    ShotFired {
        /// Entity that fired.
        shooter: EntityId,
        /// Identifier reserved for the projectile.
        projectile: EntityId,
    },
    /// A shot request arrived before the shooter's cooldown elapsed.
    ShotRejected {
        /// Entity whose request was rejected.
        shooter: EntityId,
    },
    /// A projectile collided and will be removed at the next commit.
    ProjectileImpacted {
        /// Projectile that collided.
        projectile: EntityId,
        /// Position of the impact.
        at: Vector2D,
        /// What the projectile collided with.
        target: CollisionResult,
    },
    /// A projectile outlived its lifetime and will be removed at the next commit.
    ProjectileExpired {
        /// Projectile that expired.
        projectile: EntityId,
    },
    /// An entity became part of the live collection.
    EntitySpawned {
        /// Identifier of the new entity.
        entity: EntityId,
        /// Variant of the new entity.
        class: EntityClass,
        /// Position where the entity appeared.
        position: Vector2D,
    },
    /// An entity left the live collection.
    EntityDespawned {
        /// Identifier of the removed entity.
        entity: EntityId,
        /// Variant of the removed entity.
        class: EntityClass,
    },
}

/// Variant-specific state captured alongside an [`EntitySnapshot`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SnapshotKind {
    /// Unit details.
    Unit {
        /// Travel speed in world units per second.
        speed: f32,
        /// Whether the unit is currently selected.
        selected: bool,
        /// Head of the queued path, if any.
        waypoint: Option<Vector2D>,
        /// Number of waypoints still queued.
        path_len: usize,
    },
    /// Projectile details.
    Projectile {
        /// Entity that fired the projectile.
        owner: EntityId,
    },
    /// Tower details.
    Tower {
        /// Normalized aim vector.
        aim: Vector2D,
        /// Whether the tower's cooldown has elapsed.
        ready_to_fire: bool,
    },
}

/// Immutable representation of a single entity used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntitySnapshot {
    /// Identifier allocated by the world.
    pub id: EntityId,
    /// Current world position.
    pub position: Vector2D,
    /// Current velocity in world units per second.
    pub velocity: Vector2D,
    /// Collision extent.
    pub radius: f32,
    /// Variant-specific state.
    pub kind: SnapshotKind,
}

impl EntitySnapshot {
    /// Variant of the captured entity.
    #[must_use]
    pub const fn class(&self) -> EntityClass {
        match self.kind {
            SnapshotKind::Unit { .. } => EntityClass::Unit,
            SnapshotKind::Projectile { .. } => EntityClass::Projectile,
            SnapshotKind::Tower { .. } => EntityClass::Tower,
        }
    }

    /// Reports whether the snapshot describes a selected unit.
    #[must_use]
    pub const fn is_selected(&self) -> bool {
        matches!(self.kind, SnapshotKind::Unit { selected: true, .. })
    }

    /// Entity that fired the snapshot's projectile, if it is one.
    #[must_use]
    pub const fn owner(&self) -> Option<EntityId> {
        match self.kind {
            SnapshotKind::Projectile { owner } => Some(owner),
            _ => None,
        }
    }
}

/// Read-only snapshot describing every live entity.
#[derive(Clone, Debug, Default)]
pub struct EntityView {
    snapshots: Vec<EntitySnapshot>,
}

impl EntityView {
    /// Creates a new entity view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EntitySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &EntitySnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot captured for the provided entity.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&EntitySnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of captured entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view contains no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EntitySnapshot> {
        self.snapshots
    }
}

/// Assignment of a unit to a tower that has it within detection range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerTarget {
    /// Tower that acquired the target.
    pub tower: EntityId,
    /// Unit being targeted.
    pub unit: EntityId,
    /// World position of the tower.
    pub tower_position: Vector2D,
    /// World position of the unit.
    pub unit_position: Vector2D,
}
