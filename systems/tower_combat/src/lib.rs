#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that aims towers at their targets and emits firing commands.

use battlepath_core::{Command, EntitySnapshot, FireDirection, SnapshotKind, TowerTarget, Vector2D};

/// Tower combat system that queues aim and fire commands.
#[derive(Debug, Default)]
pub struct TowerCombat {
    scratch: Vec<Command>,
}

impl TowerCombat {
    /// Creates a new tower combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `AimTower` for every target and `FireTower` for towers ready to fire.
    ///
    /// `towers` must be sorted by identifier, as produced by an entity view.
    ///
    /// The aim vector points from the target back to the tower; the launch
    /// direction is derived from it through `fire_direction`.
    pub fn handle(
        &mut self,
        towers: &[EntitySnapshot],
        tower_targets: &[TowerTarget],
        fire_direction: FireDirection,
        out: &mut Vec<Command>,
    ) {
        if tower_targets.is_empty() || towers.is_empty() {
            return;
        }

        self.scratch.clear();

        for target in tower_targets {
            let Some(ready_to_fire) = find_readiness(towers, target) else {
                continue;
            };

            let aim = (target.tower_position - target.unit_position).normalize_or_zero();
            if aim == Vector2D::ZERO {
                continue;
            }

            self.scratch.push(Command::AimTower {
                tower: target.tower,
                aim,
            });
            if ready_to_fire {
                self.scratch.push(Command::FireTower {
                    tower: target.tower,
                    direction: fire_direction.launch(aim),
                });
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

fn find_readiness(towers: &[EntitySnapshot], target: &TowerTarget) -> Option<bool> {
    towers
        .binary_search_by_key(&target.tower, |snapshot| snapshot.id)
        .ok()
        .and_then(|index| match towers[index].kind {
            SnapshotKind::Tower { ready_to_fire, .. } => Some(ready_to_fire),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use battlepath_core::{EntityId, TOWER_FIRE_DIRECTION};

    fn tower(id: u32, ready_to_fire: bool) -> EntitySnapshot {
        EntitySnapshot {
            id: EntityId::new(id),
            position: Vector2D::ZERO,
            velocity: Vector2D::ZERO,
            radius: 1.0,
            kind: SnapshotKind::Tower {
                aim: Vector2D::ZERO,
                ready_to_fire,
            },
        }
    }

    fn target(tower: u32, unit: u32, unit_position: Vector2D) -> TowerTarget {
        TowerTarget {
            tower: EntityId::new(tower),
            unit: EntityId::new(unit),
            tower_position: Vector2D::ZERO,
            unit_position,
        }
    }

    #[test]
    fn ready_tower_aims_and_fires_towards_target() {
        let mut system = TowerCombat::new();
        let mut out = Vec::new();

        system.handle(
            &[tower(1, true)],
            &[target(1, 5, Vector2D::new(4.0, 0.0))],
            TOWER_FIRE_DIRECTION,
            &mut out,
        );

        assert_eq!(
            out,
            vec![
                Command::AimTower {
                    tower: EntityId::new(1),
                    aim: Vector2D::new(-1.0, 0.0),
                },
                Command::FireTower {
                    tower: EntityId::new(1),
                    direction: Vector2D::new(1.0, 0.0),
                },
            ]
        );
    }

    #[test]
    fn aim_fire_direction_launches_away_from_target() {
        let mut system = TowerCombat::new();
        let mut out = Vec::new();

        system.handle(
            &[tower(1, true)],
            &[target(1, 5, Vector2D::new(0.0, 2.0))],
            FireDirection::Aim,
            &mut out,
        );

        assert_eq!(
            out.last(),
            Some(&Command::FireTower {
                tower: EntityId::new(1),
                direction: Vector2D::new(0.0, -1.0),
            })
        );
    }

    #[test]
    fn cooling_down_or_missing_towers_do_not_fire() {
        let mut system = TowerCombat::new();
        let mut out = Vec::new();

        system.handle(
            &[tower(3, false), tower(8, true)],
            &[
                target(3, 9, Vector2D::new(1.0, 0.0)),
                target(42, 9, Vector2D::new(1.0, 0.0)),
            ],
            TOWER_FIRE_DIRECTION,
            &mut out,
        );

        assert_eq!(
            out,
            vec![Command::AimTower {
                tower: EntityId::new(3),
                aim: Vector2D::new(-1.0, 0.0),
            }]
        );
    }

    #[test]
    fn coincident_target_is_ignored() {
        let mut system = TowerCombat::new();
        let mut out = Vec::new();

        system.handle(
            &[tower(1, true)],
            &[target(1, 2, Vector2D::ZERO)],
            TOWER_FIRE_DIRECTION,
            &mut out,
        );

        assert!(out.is_empty());
    }
}
