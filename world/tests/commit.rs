use std::time::Duration;

use battlepath_core::{Command, EntityId, Event, SimulationConfig, Vector2D};
use battlepath_world::{apply, query, TileField, World};

fn ids(world: &World) -> Vec<EntityId> {
    query::entity_view(world)
        .iter()
        .map(|snapshot| snapshot.id)
        .collect()
}

fn waypoint_events(events: &[Event]) -> Vec<EntityId> {
    let mut units: Vec<EntityId> = events
        .iter()
        .filter_map(|event| match event {
            Event::WaypointReached { unit, .. } => Some(*unit),
            _ => None,
        })
        .collect();
    units.sort();
    units
}

/// Gives the unit a single waypoint already within arrival tolerance.
fn arm_waypoint(world: &mut World, unit: EntityId, events: &mut Vec<Event>) {
    let position = query::entity(world, unit).expect("unit alive").position;
    apply(
        world,
        Command::MoveUnitTo {
            unit,
            destination: position + Vector2D::new(0.02, 0.0),
        },
        events,
    );
}

#[test]
fn frame_changes_apply_once_at_commit() {
    let mut world = World::new(TileField::open(16, 4, 1.0), SimulationConfig::default());
    let mut events = Vec::new();
    for index in 0..5 {
        apply(
            &mut world,
            Command::SpawnUnit {
                position: Vector2D::new(index as f32 * 2.0 + 0.5, 0.5),
            },
            &mut events,
        );
    }
    apply(&mut world, Command::CommitChanges, &mut events);
    let original = ids(&world);
    assert_eq!(original.len(), 5);

    for unit in original.clone() {
        arm_waypoint(&mut world, unit, &mut events);
    }
    events.clear();

    apply(
        &mut world,
        Command::Despawn {
            entity: EntityId::new(1),
        },
        &mut events,
    );
    apply(
        &mut world,
        Command::Despawn {
            entity: EntityId::new(3),
        },
        &mut events,
    );
    apply(
        &mut world,
        Command::Despawn {
            entity: EntityId::new(3),
        },
        &mut events,
    );
    for position in [Vector2D::new(12.5, 2.5), Vector2D::new(14.5, 2.5)] {
        apply(&mut world, Command::SpawnUnit { position }, &mut events);
    }
    apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_millis(16),
        },
        &mut events,
    );

    // Pending removals are still live for this tick; pending spawns are not.
    assert_eq!(waypoint_events(&events), original);
    assert_eq!(query::entity_count(&world), 5);
    assert_eq!(query::pending_changes(&world), (2, 2));

    events.clear();
    apply(&mut world, Command::CommitChanges, &mut events);

    assert_eq!(
        ids(&world),
        vec![
            EntityId::new(0),
            EntityId::new(2),
            EntityId::new(4),
            EntityId::new(5),
            EntityId::new(6),
        ]
    );
    let despawned = events
        .iter()
        .filter(|event| matches!(event, Event::EntityDespawned { .. }))
        .count();
    let spawned = events
        .iter()
        .filter(|event| matches!(event, Event::EntitySpawned { .. }))
        .count();
    assert_eq!((despawned, spawned), (2, 2));
    assert_eq!(query::pending_changes(&world), (0, 0));

    events.clear();
    for unit in [EntityId::new(5), EntityId::new(6)] {
        arm_waypoint(&mut world, unit, &mut events);
    }
    apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_millis(16),
        },
        &mut events,
    );
    assert_eq!(waypoint_events(&events), vec![EntityId::new(5), EntityId::new(6)]);

    apply(&mut world, Command::CommitChanges, &mut events);
    assert_eq!(query::entity_count(&world), 5);
}

#[test]
fn negative_cooldown_never_panics_and_never_gates() {
    let config = SimulationConfig {
        shot_cooldown_secs: -0.1,
        ..SimulationConfig::default()
    };
    let mut world = World::new(TileField::open(8, 8, 1.0), config);
    let mut events = Vec::new();
    apply(
        &mut world,
        Command::SpawnUnit {
            position: Vector2D::new(4.5, 4.5),
        },
        &mut events,
    );
    apply(&mut world, Command::CommitChanges, &mut events);
    assert_eq!(query::entity_view(&world).len(), 1);

    let unit = EntityId::new(0);
    for _ in 0..2 {
        apply(
            &mut world,
            Command::Shoot {
                unit,
                direction: Vector2D::X,
            },
            &mut events,
        );
    }
    apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_millis(16),
        },
        &mut events,
    );

    let fired = events
        .iter()
        .filter(|event| matches!(event, Event::ShotFired { .. }))
        .count();
    assert_eq!(fired, 2);
}
