//! Authoritative entity state and the per-entity `process` step.

use std::{collections::VecDeque, time::Duration};

use battlepath_core::{
    EntityClass, EntityId, EntitySnapshot, SimulationConfig, SnapshotKind, Vector2D,
};

/// Entity stored inside the world arena.
///
/// Every variant shares position, velocity and radius; variant-specific
/// behaviour lives in the component carried by [`EntityKind`].
#[derive(Clone, Debug)]
pub(crate) struct Entity {
    pub(crate) id: EntityId,
    pub(crate) position: Vector2D,
    pub(crate) velocity: Vector2D,
    pub(crate) radius: f32,
    pub(crate) kind: EntityKind,
}

#[derive(Clone, Debug)]
pub(crate) enum EntityKind {
    Unit(UnitState),
    Projectile(ProjectileState),
    Tower(TowerState),
}

#[derive(Clone, Debug)]
pub(crate) struct UnitState {
    pub(crate) path: VecDeque<Vector2D>,
    pub(crate) speed: f32,
    pub(crate) selected: bool,
    pub(crate) last_shot: Option<Duration>,
}

#[derive(Clone, Debug)]
pub(crate) struct ProjectileState {
    pub(crate) owner: EntityId,
    pub(crate) age: Duration,
}

#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    pub(crate) aim: Vector2D,
    pub(crate) last_shot: Option<Duration>,
}

/// Result of advancing a single entity by one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ProcessOutcome {
    Idle,
    WaypointReached { remaining: usize },
    Expired,
}

impl Entity {
    pub(crate) fn unit(id: EntityId, position: Vector2D, config: &SimulationConfig) -> Self {
        Self {
            id,
            position,
            velocity: Vector2D::ZERO,
            radius: config.unit_radius,
            kind: EntityKind::Unit(UnitState {
                path: VecDeque::new(),
                speed: config.unit_speed,
                selected: false,
                last_shot: None,
            }),
        }
    }

    /// Projectile travelling along `direction`, which must already be normalized.
    pub(crate) fn projectile(
        id: EntityId,
        position: Vector2D,
        direction: Vector2D,
        owner: EntityId,
        config: &SimulationConfig,
    ) -> Self {
        Self {
            id,
            position,
            velocity: direction * config.projectile_speed,
            radius: config.projectile_radius,
            kind: EntityKind::Projectile(ProjectileState {
                owner,
                age: Duration::ZERO,
            }),
        }
    }

    pub(crate) fn tower(id: EntityId, position: Vector2D, config: &SimulationConfig) -> Self {
        Self {
            id,
            position,
            velocity: Vector2D::ZERO,
            radius: config.tower_radius,
            kind: EntityKind::Tower(TowerState {
                aim: Vector2D::ZERO,
                last_shot: None,
            }),
        }
    }

    pub(crate) fn class(&self) -> EntityClass {
        match self.kind {
            EntityKind::Unit(_) => EntityClass::Unit,
            EntityKind::Projectile(_) => EntityClass::Projectile,
            EntityKind::Tower(_) => EntityClass::Tower,
        }
    }

    pub(crate) fn as_unit_mut(&mut self) -> Option<&mut UnitState> {
        match &mut self.kind {
            EntityKind::Unit(unit) => Some(unit),
            _ => None,
        }
    }

    pub(crate) fn as_unit(&self) -> Option<&UnitState> {
        match &self.kind {
            EntityKind::Unit(unit) => Some(unit),
            _ => None,
        }
    }

    /// Advances intrinsic state: waypoint arrival for units, ageing for projectiles.
    ///
    /// Displacement is not applied here; the movement system proposes it
    /// after every entity has been processed.
    pub(crate) fn process(&mut self, dt: Duration, config: &SimulationConfig) -> ProcessOutcome {
        let position = self.position;
        match &mut self.kind {
            EntityKind::Unit(unit) => {
                let Some(head) = unit.path.front().copied() else {
                    return ProcessOutcome::Idle;
                };
                if position.distance(head) < config.arrival_tolerance {
                    let _ = unit.path.pop_front();
                    return ProcessOutcome::WaypointReached {
                        remaining: unit.path.len(),
                    };
                }
                ProcessOutcome::Idle
            }
            EntityKind::Projectile(projectile) => {
                projectile.age = projectile.age.saturating_add(dt);
                if projectile.age >= config.projectile_lifetime() {
                    ProcessOutcome::Expired
                } else {
                    ProcessOutcome::Idle
                }
            }
            EntityKind::Tower(_) => ProcessOutcome::Idle,
        }
    }

    pub(crate) fn snapshot(&self, clock: Duration, cooldown: Duration) -> EntitySnapshot {
        let kind = match &self.kind {
            EntityKind::Unit(unit) => SnapshotKind::Unit {
                speed: unit.speed,
                selected: unit.selected,
                waypoint: unit.path.front().copied(),
                path_len: unit.path.len(),
            },
            EntityKind::Projectile(projectile) => SnapshotKind::Projectile {
                owner: projectile.owner,
            },
            EntityKind::Tower(tower) => SnapshotKind::Tower {
                aim: tower.aim,
                ready_to_fire: cooldown_elapsed(tower.last_shot, clock, cooldown),
            },
        };

        EntitySnapshot {
            id: self.id,
            position: self.position,
            velocity: self.velocity,
            radius: self.radius,
            kind,
        }
    }
}

/// Reports whether a shooter that last fired at `last_shot` may fire again at `clock`.
pub(crate) fn cooldown_elapsed(
    last_shot: Option<Duration>,
    clock: Duration,
    cooldown: Duration,
) -> bool {
    last_shot.map_or(true, |last| clock.saturating_sub(last) >= cooldown)
}
