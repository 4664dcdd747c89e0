#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Movement system that turns velocities and paths into collision-checked moves.

use std::time::Duration;

use battlepath_core::{Command, EntitySnapshot, Field, SnapshotKind, Vector2D};
use battlepath_system_collision::CollisionDetection;

/// Pure system that proposes one displacement per mover and frame.
///
/// Units under direct control move along their velocity; other units step
/// towards the head of their path. Every proposal is checked against the
/// field and the frame's collidables before it is committed: blocked units
/// hold position for the frame, blocked projectiles report an impact.
#[derive(Debug, Default)]
pub struct Movement {
    scratch: Vec<Command>,
}

impl Movement {
    /// Creates a new movement system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `MoveEntity` and `Impact` commands for the provided movers.
    pub fn handle(
        &mut self,
        units: &[EntitySnapshot],
        projectiles: &[EntitySnapshot],
        collidables: &[EntitySnapshot],
        field: &dyn Field,
        dt: Duration,
        out: &mut Vec<Command>,
    ) {
        if dt.is_zero() {
            return;
        }

        let seconds = dt.as_secs_f32();
        let detection = CollisionDetection::new(field, collidables);
        self.scratch.clear();

        for unit in units {
            let Some(to) = unit_destination(unit, seconds) else {
                continue;
            };
            if detection.test_move(unit, to - unit.position).is_none() {
                self.scratch.push(Command::MoveEntity { entity: unit.id, to });
            }
        }

        for projectile in projectiles {
            let displacement = projectile.velocity * seconds;
            if displacement == Vector2D::ZERO {
                continue;
            }

            let to = projectile.position + displacement;
            match detection.test_move(projectile, displacement) {
                None => self.scratch.push(Command::MoveEntity {
                    entity: projectile.id,
                    to,
                }),
                Some(target) => self.scratch.push(Command::Impact {
                    projectile: projectile.id,
                    at: to,
                    target,
                }),
            }
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

/// Where the unit wants to be at the end of the frame, `None` when it stays put.
fn unit_destination(unit: &EntitySnapshot, seconds: f32) -> Option<Vector2D> {
    if unit.velocity != Vector2D::ZERO {
        return Some(unit.position + unit.velocity * seconds);
    }

    let SnapshotKind::Unit {
        speed,
        waypoint: Some(waypoint),
        ..
    } = unit.kind
    else {
        return None;
    };

    let offset = waypoint - unit.position;
    let distance = offset.length();
    if distance == 0.0 {
        return None;
    }

    let step = speed * seconds;
    if distance <= step {
        Some(waypoint)
    } else {
        Some(unit.position + offset.normalize_or_zero() * step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battlepath_core::{CollisionResult, EntityId, TileIndex, TileValue};
    use battlepath_world::TileField;

    fn unit(id: u32, position: Vector2D, waypoint: Option<Vector2D>) -> EntitySnapshot {
        EntitySnapshot {
            id: EntityId::new(id),
            position,
            velocity: Vector2D::ZERO,
            radius: 0.5,
            kind: SnapshotKind::Unit {
                speed: 2.0,
                selected: false,
                waypoint,
                path_len: usize::from(waypoint.is_some()),
            },
        }
    }

    fn projectile(id: u32, position: Vector2D, velocity: Vector2D) -> EntitySnapshot {
        EntitySnapshot {
            id: EntityId::new(id),
            position,
            velocity,
            radius: 0.1,
            kind: SnapshotKind::Projectile {
                owner: EntityId::new(0),
            },
        }
    }

    #[test]
    fn path_step_scales_with_speed_and_lands_on_waypoint() {
        let field = TileField::open(8, 8, 1.0);
        let far = unit(1, Vector2D::new(1.0, 1.0), Some(Vector2D::new(5.0, 1.0)));
        let near = unit(2, Vector2D::new(4.0, 4.0), Some(Vector2D::new(4.3, 4.0)));
        let mut system = Movement::new();
        let mut out = Vec::new();

        system.handle(
            &[far, near],
            &[],
            &[],
            &field,
            Duration::from_millis(250),
            &mut out,
        );

        assert_eq!(
            out,
            vec![
                Command::MoveEntity {
                    entity: EntityId::new(1),
                    to: Vector2D::new(1.5, 1.0),
                },
                Command::MoveEntity {
                    entity: EntityId::new(2),
                    to: Vector2D::new(4.3, 4.0),
                },
            ]
        );
    }

    #[test]
    fn velocity_overrides_path_and_idle_units_stay_put() {
        let field = TileField::open(8, 8, 1.0);
        let steered = EntitySnapshot {
            velocity: Vector2D::new(0.0, 4.0),
            ..unit(1, Vector2D::new(2.0, 2.0), Some(Vector2D::new(6.0, 2.0)))
        };
        let idle = unit(2, Vector2D::new(5.0, 5.0), None);
        let mut system = Movement::new();
        let mut out = Vec::new();

        system.handle(
            &[steered, idle],
            &[],
            &[],
            &field,
            Duration::from_millis(500),
            &mut out,
        );

        assert_eq!(
            out,
            vec![Command::MoveEntity {
                entity: EntityId::new(1),
                to: Vector2D::new(2.0, 4.0),
            }]
        );
    }

    #[test]
    fn blocked_units_stop_for_the_frame() {
        let mut field = TileField::open(4, 1, 1.0);
        field.set(TileIndex::new(2, 0), TileValue::WALL);
        let walker = EntitySnapshot {
            velocity: Vector2D::new(4.0, 0.0),
            ..unit(1, Vector2D::new(1.5, 0.5), None)
        };
        let mut system = Movement::new();
        let mut out = Vec::new();

        system.handle(
            &[walker],
            &[],
            &[walker],
            &field,
            Duration::from_millis(250),
            &mut out,
        );

        assert!(out.is_empty());
    }

    #[test]
    fn projectiles_fly_until_they_hit_something() {
        let field = TileField::open(8, 2, 1.0);
        let target = unit(5, Vector2D::new(6.0, 1.0), None);
        let free = projectile(7, Vector2D::new(1.0, 1.0), Vector2D::new(4.0, 0.0));
        let hitting = projectile(8, Vector2D::new(5.0, 1.0), Vector2D::new(4.0, 0.0));
        let leaving = projectile(9, Vector2D::new(1.0, 1.5), Vector2D::new(0.0, 4.0));
        let mut system = Movement::new();
        let mut out = Vec::new();

        system.handle(
            &[],
            &[free, hitting, leaving],
            &[target],
            &field,
            Duration::from_millis(125),
            &mut out,
        );

        assert_eq!(
            out,
            vec![
                Command::MoveEntity {
                    entity: EntityId::new(7),
                    to: Vector2D::new(1.5, 1.0),
                },
                Command::Impact {
                    projectile: EntityId::new(8),
                    at: Vector2D::new(5.5, 1.0),
                    target: CollisionResult::Entity {
                        entity: EntityId::new(5),
                    },
                },
                Command::Impact {
                    projectile: EntityId::new(9),
                    at: Vector2D::new(1.0, 2.0),
                    target: CollisionResult::Field { tile: None },
                },
            ]
        );
    }
}
