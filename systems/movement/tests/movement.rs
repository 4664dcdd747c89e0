use std::time::Duration;

use battlepath_core::{Command, EntityId, Event, SimulationConfig, Vector2D};
use battlepath_system_entity::EntitySystem;
use battlepath_system_movement::Movement;
use battlepath_world::{self as world, query, MapLayout, TileField, World};

const FRAME: Duration = Duration::from_millis(16);

fn spawn_unit(world: &mut World, position: Vector2D) -> EntityId {
    let mut events = Vec::new();
    world::apply(world, Command::SpawnUnit { position }, &mut events);
    world::apply(world, Command::CommitChanges, &mut events);
    events
        .iter()
        .find_map(|event| match event {
            Event::EntitySpawned { entity, .. } => Some(*entity),
            _ => None,
        })
        .expect("unit spawned")
}

fn run_frame(world: &mut World, entities: &mut EntitySystem, movement: &mut Movement) {
    let mut events = Vec::new();
    world::apply(world, Command::Tick { dt: FRAME }, &mut events);

    entities.arrange(&query::entity_view(world));
    let mut commands = Vec::new();
    movement.handle(
        entities.units(),
        entities.projectiles(),
        entities.collidables(),
        query::field(world),
        FRAME,
        &mut commands,
    );
    for command in commands {
        world::apply(world, command, &mut events);
    }
    world::apply(world, Command::CommitChanges, &mut events);
}

fn path_len(world: &World, unit: EntityId) -> usize {
    query::path(world, unit).map_or(0, |path| path.len())
}

#[test]
fn unit_converges_on_open_terrain_destination() {
    let mut world = World::new(TileField::open(16, 4, 1.0), SimulationConfig::default());
    let unit = spawn_unit(&mut world, Vector2D::new(0.0, 0.0));
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::MoveUnitTo {
            unit,
            destination: Vector2D::new(10.0, 0.0),
        },
        &mut events,
    );
    assert_eq!(
        query::path(&world, unit),
        Some(vec![Vector2D::new(10.0, 0.0)])
    );

    let mut entities = EntitySystem::new();
    let mut movement = Movement::new();
    let mut previous = path_len(&world, unit);
    for _ in 0..400 {
        run_frame(&mut world, &mut entities, &mut movement);
        let current = path_len(&world, unit);
        assert!(current <= previous, "path grew from {previous} to {current}");
        previous = current;
    }

    let snapshot = query::entity(&world, unit).expect("unit alive");
    let tolerance = query::config(&world).arrival_tolerance;
    assert!(snapshot.position.distance(Vector2D::new(10.0, 0.0)) < tolerance);
    assert_eq!(path_len(&world, unit), 0);
}

#[test]
fn unit_follows_detour_through_every_waypoint() {
    let layout = MapLayout::parse(
        "\
.......
.#####.
.......
",
        1.0,
    )
    .expect("map parses");
    let mut world = World::new(layout.field, SimulationConfig::default());
    let unit = spawn_unit(&mut world, Vector2D::new(3.5, 0.5));
    let destination = Vector2D::new(3.5, 2.5);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::MoveUnitTo { unit, destination },
        &mut events,
    );
    let planned = query::path(&world, unit).expect("unit has a path");
    assert!(planned.len() >= 2);

    let mut entities = EntitySystem::new();
    let mut movement = Movement::new();
    for _ in 0..600 {
        run_frame(&mut world, &mut entities, &mut movement);
    }

    let snapshot = query::entity(&world, unit).expect("unit alive");
    let tolerance = query::config(&world).arrival_tolerance;
    assert!(snapshot.position.distance(destination) < tolerance);
    assert_eq!(path_len(&world, unit), 0);
}

#[test]
fn units_do_not_walk_through_each_other() {
    let mut world = World::new(TileField::open(16, 4, 1.0), SimulationConfig::default());
    let walker = spawn_unit(&mut world, Vector2D::new(1.5, 1.5));
    let blocker = spawn_unit(&mut world, Vector2D::new(4.5, 1.5));
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::MoveUnitTo {
            unit: walker,
            destination: Vector2D::new(8.5, 1.5),
        },
        &mut events,
    );

    let mut entities = EntitySystem::new();
    let mut movement = Movement::new();
    for _ in 0..200 {
        run_frame(&mut world, &mut entities, &mut movement);
    }

    let walker_position = query::entity(&world, walker).expect("walker alive").position;
    let blocker_position = query::entity(&world, blocker).expect("blocker alive").position;
    assert_eq!(blocker_position, Vector2D::new(4.5, 1.5));
    assert!(walker_position.distance(blocker_position) >= 1.0 - 1e-4);
    assert!(walker_position.x < blocker_position.x);
}
