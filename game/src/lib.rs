#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame orchestration for Battlepath.
//!
//! [`Game::step`] translates one frame of input into commands and then runs
//! the simulation phases in a fixed order: classification, mode enforcement,
//! the world tick, tower targeting and combat, movement, effects, the deferred
//! entity commit and finally the camera. The world is only ever mutated
//! through `battlepath_world::apply`.

use std::time::Duration;

use battlepath_core::{
    Command, EntityId, EntitySnapshot, Event, Input, Key, MouseButton, PlayMode, Rectangle2D,
    SimulationConfig, SnapshotKind, TowerTarget, Vector2D, View,
};
use battlepath_system_effects::{Effects, Particle};
use battlepath_system_entity::EntitySystem;
use battlepath_system_movement::Movement;
use battlepath_system_tower_combat::TowerCombat;
use battlepath_system_tower_targeting::TowerTargeting;
use battlepath_world::{self as world, query, World};
use tracing::{debug, info};

mod input;

pub use input::InputState;

/// Owns the world, the systems and the camera, and advances them frame by frame.
#[derive(Debug)]
pub struct Game<V: View> {
    world: World,
    view: V,
    config: SimulationConfig,
    mode: PlayMode,
    selection: Option<Rectangle2D>,
    found: bool,
    previous_buttons: [bool; 3],
    entities: EntitySystem,
    movement: Movement,
    tower_targeting: TowerTargeting,
    tower_combat: TowerCombat,
    effects: Effects,
    targets: Vec<TowerTarget>,
    commands: Vec<Command>,
    events: Vec<Event>,
}

impl<V: View> Game<V> {
    /// Creates a game in strategy mode around an existing world and camera.
    ///
    /// `effects_seed` seeds the cosmetic particle generator.
    #[must_use]
    pub fn new(world: World, view: V, effects_seed: u64) -> Self {
        let config = query::config(&world).clone();
        let effects = Effects::new(&config, effects_seed);
        Self {
            world,
            view,
            config,
            mode: PlayMode::Strategy,
            selection: None,
            found: false,
            previous_buttons: [false; 3],
            entities: EntitySystem::new(),
            movement: Movement::new(),
            tower_targeting: TowerTargeting::new(),
            tower_combat: TowerCombat::new(),
            effects,
            targets: Vec::new(),
            commands: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Advances the game by one frame.
    pub fn step(&mut self, dt: Duration, input: &mut impl Input) {
        self.events.clear();

        self.arrange();
        self.translate_input(input);

        self.arrange();
        self.enforce_mode();

        self.apply_selection_rectangle();
        self.apply(Command::Tick { dt });

        self.arrange();
        self.run_towers();
        self.run_movement(dt);

        self.effects.handle(&self.events, dt);
        self.apply(Command::CommitChanges);

        self.arrange();
        self.enforce_mode();

        let focus = self
            .view
            .followed()
            .and_then(|entity| query::entity(&self.world, entity))
            .map(|snapshot| snapshot.position);
        self.view.process(dt, focus);
    }

    /// Applies a command to the world immediately.
    ///
    /// Spawns and despawns still wait for the next commit.
    pub fn submit(&mut self, command: Command) {
        self.apply(command);
    }

    /// Switches the control scheme, returning whether the switch happened.
    ///
    /// Entering action mode requires a selected unit: the first one is
    /// followed by the camera and its path is discarded. Leaving action mode
    /// releases the camera and stops the controlled unit.
    pub fn set_mode(&mut self, mode: PlayMode) -> bool {
        let controlled = self.controlled_unit();

        match mode {
            PlayMode::Action => {
                let Some(unit) = controlled else {
                    debug!("action mode requires a selected unit");
                    return false;
                };
                self.view.follow(unit.id);
                self.apply(Command::ClearPath { unit: unit.id });
                self.selection = None;
            }
            PlayMode::Strategy => {
                self.view.unfollow();
                if let Some(unit) = controlled {
                    self.apply(Command::SetVelocity {
                        unit: unit.id,
                        velocity: Vector2D::ZERO,
                    });
                }
            }
        }

        if self.mode != mode {
            info!(?mode, "play mode changed");
        }
        self.mode = mode;
        true
    }

    /// Current control scheme.
    #[must_use]
    pub fn mode(&self) -> PlayMode {
        self.mode
    }

    /// Selection rectangle being dragged, if any.
    #[must_use]
    pub fn selection(&self) -> Option<Rectangle2D> {
        self.selection
    }

    /// Authoritative world state.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Camera driven by the game.
    #[must_use]
    pub fn view(&self) -> &V {
        &self.view
    }

    /// Particles currently alive.
    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        self.effects.particles()
    }

    /// Events the world broadcast during the most recent frame.
    #[must_use]
    pub fn last_events(&self) -> &[Event] {
        &self.events
    }

    /// Units strictly closer than `range` to `position`.
    #[must_use]
    pub fn units_in_range(&self, position: Vector2D, range: f32) -> Vec<EntityId> {
        query::units_in_range(&self.world, position, range)
    }

    fn apply(&mut self, command: Command) {
        world::apply(&mut self.world, command, &mut self.events);
    }

    fn apply_all(&mut self) {
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }
    }

    fn arrange(&mut self) {
        self.entities.arrange(&query::entity_view(&self.world));
    }

    fn controlled_unit(&self) -> Option<EntitySnapshot> {
        query::entity_view(&self.world)
            .iter()
            .find(|snapshot| snapshot.is_selected())
            .copied()
    }

    fn translate_input(&mut self, input: &mut impl Input) {
        let cursor = input.cursor_position();
        let buttons = MouseButton::ALL.map(|button| input.mouse_button(button));
        let pressed = |button: MouseButton| {
            buttons[button.index()] && !self.previous_buttons[button.index()]
        };
        let primary_pressed = pressed(MouseButton::Primary);
        let secondary_pressed = pressed(MouseButton::Secondary);
        let primary_held = buttons[MouseButton::Primary.index()];
        self.previous_buttons = buttons;

        match self.mode {
            PlayMode::Strategy => {
                self.translate_strategy(&*input, cursor, primary_pressed, primary_held);
                if secondary_pressed {
                    self.order_move(cursor);
                }
            }
            PlayMode::Action => self.translate_action(&*input, cursor, primary_held),
        }

        for key in input.drain_key_buffer() {
            self.handle_key(key);
        }
    }

    fn translate_strategy(
        &mut self,
        input: &impl Input,
        cursor: Vector2D,
        primary_pressed: bool,
        primary_held: bool,
    ) {
        if primary_pressed {
            self.found = false;
            let clicked: Vec<EntityId> = self
                .entities
                .units()
                .iter()
                .filter(|unit| unit.position.distance(cursor) < unit.radius)
                .map(|unit| unit.id)
                .collect();
            for unit in clicked {
                self.found = true;
                self.apply(Command::SetSelected {
                    unit,
                    selected: true,
                });
            }
            self.selection = Some(Rectangle2D::at_point(cursor));
        }

        if primary_held {
            if let Some(selection) = &mut self.selection {
                selection.set_bottom_right(cursor);
            }
        } else {
            self.selection = None;
        }

        let scroll = Vector2D::new(
            axis(input, Key::ScrollRight, Key::ScrollLeft),
            axis(input, Key::ScrollUp, Key::ScrollDown),
        );
        self.view.set_velocity(scroll * self.config.scroll_speed);
    }

    fn translate_action(&mut self, input: &impl Input, cursor: Vector2D, primary_held: bool) {
        self.selection = None;
        self.view.set_velocity(Vector2D::ZERO);

        let Some(unit) = self.entities.controlled().copied() else {
            return;
        };

        if primary_held {
            self.apply(Command::Shoot {
                unit: unit.id,
                direction: cursor - unit.position,
            });
        }

        // Opposing keys cancel out.
        let direction = Vector2D::new(
            axis(input, Key::MoveRight, Key::MoveLeft),
            axis(input, Key::MoveUp, Key::MoveDown),
        );
        let speed = match unit.kind {
            SnapshotKind::Unit { speed, .. } => speed,
            _ => self.config.unit_speed,
        };
        self.apply(Command::SetVelocity {
            unit: unit.id,
            velocity: direction.normalize_or_zero() * speed,
        });
    }

    fn order_move(&mut self, destination: Vector2D) {
        let selected: Vec<EntityId> = self.entities.selected().iter().map(|unit| unit.id).collect();
        for unit in selected {
            self.apply(Command::MoveUnitTo { unit, destination });
        }
    }

    fn handle_key(&mut self, key: Key) {
        match key {
            Key::ZoomIn => {
                let target = self.view.target_zoom() * self.config.zoom_in_factor;
                self.view.zoom(target, true);
            }
            Key::ZoomOut => {
                let target = self.view.target_zoom() * self.config.zoom_out_factor;
                self.view.zoom(target, true);
            }
            Key::ToggleMode => {
                let next = match self.mode {
                    PlayMode::Strategy => PlayMode::Action,
                    PlayMode::Action => PlayMode::Strategy,
                };
                let _ = self.set_mode(next);
            }
            Key::SpawnUnit => {
                let position = query::start_position(&self.world);
                debug!(?position, "spawning unit");
                self.apply(Command::SpawnUnit { position });
            }
            Key::MoveUp
            | Key::MoveDown
            | Key::MoveLeft
            | Key::MoveRight
            | Key::ScrollUp
            | Key::ScrollDown
            | Key::ScrollLeft
            | Key::ScrollRight => {}
        }
    }

    fn enforce_mode(&mut self) {
        match self.mode {
            PlayMode::Strategy => {}
            PlayMode::Action => match self.entities.controlled().map(|unit| unit.id) {
                None => {
                    debug!("no unit selected, leaving action mode");
                    let _ = self.set_mode(PlayMode::Strategy);
                }
                Some(unit) => {
                    if self.view.followed() != Some(unit) {
                        self.view.follow(unit);
                    }
                }
            },
        }
    }

    fn apply_selection_rectangle(&mut self) {
        if self.mode != PlayMode::Strategy || self.found {
            return;
        }
        let Some(selection) = self.selection else {
            return;
        };

        let changes: Vec<(EntityId, bool)> = self
            .entities
            .units()
            .iter()
            .filter_map(|unit| {
                let inside = selection.inside(unit.position);
                (inside != unit.is_selected()).then_some((unit.id, inside))
            })
            .collect();
        for (unit, selected) in changes {
            self.apply(Command::SetSelected { unit, selected });
        }
    }

    fn run_towers(&mut self) {
        self.tower_targeting.handle(
            self.entities.towers(),
            self.entities.units(),
            self.config.tower_detection_radius,
            &mut self.targets,
        );
        self.tower_combat.handle(
            self.entities.towers(),
            &self.targets,
            self.config.tower_fire_direction,
            &mut self.commands,
        );
        self.apply_all();
    }

    fn run_movement(&mut self, dt: Duration) {
        self.movement.handle(
            self.entities.units(),
            self.entities.projectiles(),
            self.entities.collidables(),
            query::field(&self.world),
            dt,
            &mut self.commands,
        );
        self.apply_all();
    }
}

/// Held-key axis in `{-1, 0, 1}`.
fn axis(input: &impl Input, positive: Key, negative: Key) -> f32 {
    let held = |key| f32::from(u8::from(input.is_pressed(key)));
    held(positive) - held(negative)
}
