//! Scenario loading and the scripted input that drives headless runs.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use battlepath_camera::Camera;
use battlepath_core::{Command, Key, MouseButton, SimulationConfig, Vector2D};
use battlepath_game::{Game, InputState};
use battlepath_world::{MapLayout, World};

/// Map used when no map file is supplied.
pub(crate) const DEFAULT_MAP: &str = "\
........................
..U.....................
..U........#............
...........#.......T....
...........#............
...........#............
..U.....................
........................
";

/// Reads a TOML configuration, falling back to defaults when no path is given.
pub(crate) fn load_config(path: Option<&Path>) -> Result<SimulationConfig> {
    let config = match path {
        Some(path) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            parse_config(&source)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => SimulationConfig::default(),
    };
    Ok(config)
}

fn parse_config(source: &str) -> Result<SimulationConfig> {
    let config: SimulationConfig = toml::from_str(source)?;
    config.validate()?;
    Ok(config)
}

/// Reads an ASCII map, falling back to [`DEFAULT_MAP`] when no path is given.
pub(crate) fn load_layout(path: Option<&Path>, tile_length: f32) -> Result<MapLayout> {
    match path {
        Some(path) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("failed to read map {}", path.display()))?;
            MapLayout::parse(&source, tile_length)
                .with_context(|| format!("invalid map {}", path.display()))
        }
        None => MapLayout::parse(DEFAULT_MAP, tile_length).context("invalid built-in map"),
    }
}

/// Builds a game with every unit and tower of the layout already committed.
pub(crate) fn build_game(layout: MapLayout, config: SimulationConfig, seed: u64) -> Game<Camera> {
    let extent = field_extent(&layout);
    let MapLayout {
        field,
        units,
        towers,
    } = layout;

    let mut game = Game::new(World::new(field, config), Camera::new(extent * 0.5), seed);
    for position in units {
        game.submit(Command::SpawnUnit { position });
    }
    for position in towers {
        game.submit(Command::SpawnTower { position });
    }
    game.submit(Command::CommitChanges);
    game
}

/// World-space size of the layout's field.
pub(crate) fn field_extent(layout: &MapLayout) -> Vector2D {
    let field = &layout.field;
    Vector2D::new(field.columns() as f32, field.rows() as f32) * field.tile_length()
}

/// Frame-indexed player actions: select everything, order a move, optionally take control.
#[derive(Clone, Debug)]
pub(crate) struct Script {
    pub(crate) extent: Vector2D,
    pub(crate) destination: Option<Vector2D>,
    pub(crate) action: bool,
}

impl Script {
    /// Updates the input state for the provided frame.
    pub(crate) fn drive(&self, frame: u32, input: &mut InputState) {
        match frame {
            0 => {
                input.set_cursor(Vector2D::splat(-1.0));
                input.set_button(MouseButton::Primary, true);
            }
            1 => input.set_cursor(self.extent + Vector2D::ONE),
            2 => input.set_button(MouseButton::Primary, false),
            3 => {
                if let Some(destination) = self.destination {
                    input.set_cursor(destination);
                    input.set_button(MouseButton::Secondary, true);
                }
            }
            4 => input.set_button(MouseButton::Secondary, false),
            5 if self.action => input.push_key(Key::ToggleMode),
            6 if self.action => {
                input.set_cursor(self.destination.unwrap_or(self.extent));
                input.set_key(Key::MoveRight, true);
                input.set_button(MouseButton::Primary, true);
            }
            _ => {}
        }
    }
}
