#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Battlepath.
//!
//! The world owns every entity in an arena keyed by stable [`EntityId`]
//! handles. It is mutated exclusively through [`apply`]; spawns and despawns
//! requested during a frame are buffered and only reach the arena on
//! [`Command::CommitChanges`], so systems reading a snapshot never observe a
//! half-updated collection.

use std::{collections::BTreeMap, fmt, time::Duration};

use battlepath_core::{Command, EntityId, Event, Pathplanner, SimulationConfig, Vector2D};
use tracing::{debug, trace};

mod changes;
mod entity;
mod field;
mod navigation;

use changes::PendingChanges;
use entity::{cooldown_elapsed, Entity, EntityKind, ProcessOutcome};

pub use field::{FieldError, MapLayout, TileField};
pub use navigation::GridPlanner;

/// Represents the authoritative Battlepath world state.
pub struct World {
    config: SimulationConfig,
    field: TileField,
    planner: Box<dyn Pathplanner>,
    entities: BTreeMap<EntityId, Entity>,
    pending: PendingChanges,
    next_entity_id: u32,
    clock: Duration,
    tick_index: u64,
}

impl World {
    /// Creates an empty world over `field`, planning routes with a [`GridPlanner`].
    #[must_use]
    pub fn new(field: TileField, config: SimulationConfig) -> Self {
        let planner = GridPlanner::new(&field);
        Self::with_planner(field, config, Box::new(planner))
    }

    /// Creates an empty world that delegates route planning to `planner`.
    #[must_use]
    pub fn with_planner(
        field: TileField,
        config: SimulationConfig,
        planner: Box<dyn Pathplanner>,
    ) -> Self {
        Self {
            config,
            field,
            planner,
            entities: BTreeMap::new(),
            pending: PendingChanges::default(),
            next_entity_id: 0,
            clock: Duration::ZERO,
            tick_index: 0,
        }
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = EntityId::new(self.next_entity_id);
        self.next_entity_id = self.next_entity_id.saturating_add(1);
        id
    }

    fn unit_mut(&mut self, id: EntityId) -> Option<&mut entity::UnitState> {
        self.entities.get_mut(&id).and_then(Entity::as_unit_mut)
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        self.clock = self.clock.saturating_add(dt);
        out_events.push(Event::TimeAdvanced {
            dt,
            clock: self.clock,
        });

        let mut expired = Vec::new();
        for entity in self.entities.values_mut() {
            match entity.process(dt, &self.config) {
                ProcessOutcome::Idle => {}
                ProcessOutcome::WaypointReached { remaining } => {
                    out_events.push(Event::WaypointReached {
                        unit: entity.id,
                        remaining,
                    });
                }
                ProcessOutcome::Expired => expired.push(entity.id),
            }
        }

        for projectile in expired {
            if self.pending.queue_removal(projectile) {
                out_events.push(Event::ProjectileExpired { projectile });
            }
        }
    }

    fn move_unit_to(&mut self, unit: EntityId, destination: Vector2D, out_events: &mut Vec<Event>) {
        let Some(entity) = self.entities.get_mut(&unit) else {
            return;
        };
        let start = entity.position;
        let Some(state) = entity.as_unit_mut() else {
            return;
        };

        state.path.clear();
        let plan = self.planner.plan(start, destination);
        if plan.is_empty() {
            debug!(unit = unit.get(), ?destination, "no route, holding position");
            out_events.push(Event::PathUnavailable { unit, destination });
            return;
        }

        out_events.push(Event::PathAssigned {
            unit,
            waypoints: plan.len(),
        });
        state.path.extend(plan);
    }

    fn fire(&mut self, shooter: EntityId, direction: Vector2D, out_events: &mut Vec<Event>) {
        let direction = direction.normalize_or_zero();
        let cooldown = self.config.shot_cooldown();
        let clock = self.clock;

        let Some(entity) = self.entities.get_mut(&shooter) else {
            return;
        };
        let last_shot = match &mut entity.kind {
            EntityKind::Unit(unit) => &mut unit.last_shot,
            EntityKind::Tower(tower) => &mut tower.last_shot,
            EntityKind::Projectile(_) => return,
        };

        if direction == Vector2D::ZERO || !cooldown_elapsed(*last_shot, clock, cooldown) {
            trace!(shooter = shooter.get(), "shot rejected");
            out_events.push(Event::ShotRejected { shooter });
            return;
        }

        *last_shot = Some(clock);
        let origin = entity.position;
        let projectile = self.allocate_id();
        self.pending.queue_spawn(Entity::projectile(
            projectile,
            origin,
            direction,
            shooter,
            &self.config,
        ));
        out_events.push(Event::ShotFired {
            shooter,
            projectile,
        });
    }

    fn commit(&mut self, out_events: &mut Vec<Event>) {
        let (removals, additions) = self.pending.drain();
        if removals.is_empty() && additions.is_empty() {
            return;
        }

        debug!(
            removed = removals.len(),
            added = additions.len(),
            "committing entity changes"
        );

        for id in removals {
            if let Some(entity) = self.entities.remove(&id) {
                out_events.push(Event::EntityDespawned {
                    entity: id,
                    class: entity.class(),
                });
            }
        }

        for entity in additions {
            out_events.push(Event::EntitySpawned {
                entity: entity.id,
                class: entity.class(),
                position: entity.position,
            });
            let _ = self.entities.insert(entity.id, entity);
        }
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("entities", &self.entities.len())
            .field("pending", &self.pending.counts())
            .field("clock", &self.clock)
            .field("tick_index", &self.tick_index)
            .finish_non_exhaustive()
    }
}

/// Applies the provided command to the world.
///
/// Structural changes (spawns, despawns, impacts, expiries) are queued and
/// take effect on [`Command::CommitChanges`]. Commands naming unknown or
/// mismatched entities are ignored.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::SpawnUnit { position } => {
            let id = world.allocate_id();
            world
                .pending
                .queue_spawn(Entity::unit(id, position, &world.config));
        }
        Command::SpawnTower { position } => {
            let id = world.allocate_id();
            world
                .pending
                .queue_spawn(Entity::tower(id, position, &world.config));
        }
        Command::MoveUnitTo { unit, destination } => {
            world.move_unit_to(unit, destination, out_events);
        }
        Command::ClearPath { unit } => {
            if let Some(state) = world.unit_mut(unit) {
                state.path.clear();
            }
        }
        Command::SetVelocity { unit, velocity } => {
            if let Some(entity) = world.entities.get_mut(&unit) {
                if entity.as_unit().is_some() {
                    entity.velocity = velocity;
                }
            }
        }
        Command::SetSelected { unit, selected } => {
            if let Some(state) = world.unit_mut(unit) {
                state.selected = selected;
            }
        }
        Command::Shoot { unit, direction } => {
            if world.entities.get(&unit).and_then(Entity::as_unit).is_some() {
                world.fire(unit, direction, out_events);
            }
        }
        Command::AimTower { tower, aim } => {
            if let Some(entity) = world.entities.get_mut(&tower) {
                if let EntityKind::Tower(state) = &mut entity.kind {
                    state.aim = aim;
                }
            }
        }
        Command::FireTower { tower, direction } => {
            let is_tower = world
                .entities
                .get(&tower)
                .is_some_and(|entity| matches!(entity.kind, EntityKind::Tower(_)));
            if is_tower {
                world.fire(tower, direction, out_events);
            }
        }
        Command::MoveEntity { entity, to } => {
            if let Some(stored) = world.entities.get_mut(&entity) {
                if !matches!(stored.kind, EntityKind::Tower(_)) {
                    stored.position = to;
                }
            }
        }
        Command::Impact {
            projectile,
            at,
            target,
        } => {
            let Some(stored) = world.entities.get_mut(&projectile) else {
                return;
            };
            if !matches!(stored.kind, EntityKind::Projectile(_)) {
                return;
            }
            stored.position = at;
            if world.pending.queue_removal(projectile) {
                trace!(projectile = projectile.get(), ?target, "projectile impact");
                out_events.push(Event::ProjectileImpacted {
                    projectile,
                    at,
                    target,
                });
            }
        }
        Command::Despawn { entity } => {
            let _ = world.pending.queue_removal(entity);
        }
        Command::CommitChanges => world.commit(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use battlepath_core::{EntityId, EntitySnapshot, EntityView, SimulationConfig, Vector2D};

    use super::{TileField, World};

    /// Captures a read-only view of every live entity in identifier order.
    #[must_use]
    pub fn entity_view(world: &World) -> EntityView {
        let cooldown = world.config.shot_cooldown();
        EntityView::from_snapshots(
            world
                .entities
                .values()
                .map(|entity| entity.snapshot(world.clock, cooldown))
                .collect(),
        )
    }

    /// Captures a single entity, if it is live.
    #[must_use]
    pub fn entity(world: &World, id: EntityId) -> Option<EntitySnapshot> {
        world
            .entities
            .get(&id)
            .map(|entity| entity.snapshot(world.clock, world.config.shot_cooldown()))
    }

    /// Waypoints still queued for a unit.
    #[must_use]
    pub fn path(world: &World, unit: EntityId) -> Option<Vec<Vector2D>> {
        world
            .entities
            .get(&unit)
            .and_then(|entity| entity.as_unit())
            .map(|state| state.path.iter().copied().collect())
    }

    /// Units whose distance to `position` is strictly below `range`.
    #[must_use]
    pub fn units_in_range(world: &World, position: Vector2D, range: f32) -> Vec<EntityId> {
        world
            .entities
            .values()
            .filter(|entity| entity.as_unit().is_some())
            .filter(|entity| entity.position.distance(position) < range)
            .map(|entity| entity.id)
            .collect()
    }

    /// Number of live entities.
    #[must_use]
    pub fn entity_count(world: &World) -> usize {
        world.entities.len()
    }

    /// Number of queued additions and removals awaiting the next commit.
    #[must_use]
    pub fn pending_changes(world: &World) -> (usize, usize) {
        world.pending.counts()
    }

    /// Reports whether the entity will be removed at the next commit.
    #[must_use]
    pub fn is_removal_pending(world: &World, id: EntityId) -> bool {
        world.pending.is_removal_pending(id)
    }

    /// Accumulated simulation time.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Number of ticks processed so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Parameters the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &SimulationConfig {
        &world.config
    }

    /// Tile grid used for collision and planning.
    #[must_use]
    pub fn field(world: &World) -> &TileField {
        &world.field
    }

    /// Where newly requested units appear.
    #[must_use]
    pub fn start_position(world: &World) -> Vector2D {
        world
            .config
            .start_position
            .or_else(|| world.field.find_start_position())
            .unwrap_or(Vector2D::ZERO)
    }
}
