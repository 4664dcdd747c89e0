#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that assigns each tower the nearest unit inside its detection radius.

use battlepath_core::{EntityClass, EntityId, EntitySnapshot, TowerTarget, Vector2D};

/// Tower targeting system that reuses a scratch buffer between frames.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    unit_workspace: Vec<UnitCandidate>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes tower targets for the provided snapshots.
    ///
    /// The output buffer is cleared before populating it. Units count as in
    /// range while their distance to the tower is strictly below
    /// `detection_radius`; equidistant units resolve to the smaller id.
    pub fn handle(
        &mut self,
        towers: &[EntitySnapshot],
        units: &[EntitySnapshot],
        detection_radius: f32,
        out: &mut Vec<TowerTarget>,
    ) {
        out.clear();

        if towers.is_empty() || units.is_empty() || detection_radius <= 0.0 {
            return;
        }

        self.prepare_unit_workspace(units);
        if self.unit_workspace.is_empty() {
            return;
        }

        for tower in towers {
            if tower.class() != EntityClass::Tower {
                continue;
            }

            let mut best: Option<BestCandidate> = None;
            for candidate in &self.unit_workspace {
                let distance = tower.position.distance(candidate.position);
                if distance >= detection_radius {
                    continue;
                }

                let current = BestCandidate {
                    distance,
                    unit: candidate.id,
                    position: candidate.position,
                };
                match &mut best {
                    Some(existing) => {
                        if current.precedes(existing) {
                            *existing = current;
                        }
                    }
                    None => best = Some(current),
                }
            }

            if let Some(best) = best {
                out.push(TowerTarget {
                    tower: tower.id,
                    unit: best.unit,
                    tower_position: tower.position,
                    unit_position: best.position,
                });
            }
        }
    }

    fn prepare_unit_workspace(&mut self, units: &[EntitySnapshot]) {
        self.unit_workspace.clear();
        self.unit_workspace.reserve(units.len());
        self.unit_workspace.extend(
            units
                .iter()
                .filter(|snapshot| snapshot.class() == EntityClass::Unit)
                .map(|snapshot| UnitCandidate {
                    id: snapshot.id,
                    position: snapshot.position,
                }),
        );
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct UnitCandidate {
    id: EntityId,
    position: Vector2D,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BestCandidate {
    distance: f32,
    unit: EntityId,
    position: Vector2D,
}

impl BestCandidate {
    fn precedes(&self, other: &Self) -> bool {
        if self.distance != other.distance {
            return self.distance < other.distance;
        }

        self.unit < other.unit
    }
}
