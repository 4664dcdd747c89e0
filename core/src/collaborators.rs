//! Interfaces of the collaborators that sit outside the simulation core.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{EntityId, Vector2D};

/// Location of a single tile expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileIndex {
    column: u32,
    row: u32,
}

impl TileIndex {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Traversability value stored for a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileValue(u8);

impl TileValue {
    /// Open ground that units and projectiles may cross.
    pub const OPEN: Self = Self(0);
    /// Solid wall.
    pub const WALL: Self = Self(1);

    /// Wraps a raw tile value.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Retrieves the raw tile value.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Only the open value can be crossed.
    #[must_use]
    pub const fn is_traversable(&self) -> bool {
        self.0 == Self::OPEN.0
    }
}

/// Queryable tile grid that maps world positions onto tiles.
pub trait Field {
    /// Tile containing the world position, `None` outside the grid.
    fn tile_index_at(&self, position: Vector2D) -> Option<TileIndex>;

    /// Traversability value at the world position, `None` outside the grid.
    fn tile_value_at(&self, position: Vector2D) -> Option<TileValue>;

    /// Positions outside the grid are never traversable.
    fn is_traversable(&self, position: Vector2D) -> bool {
        self.tile_value_at(position)
            .map_or(false, |value| value.is_traversable())
    }
}

/// Route planner treated as a black box by the simulation.
pub trait Pathplanner {
    /// Ordered waypoints from `start` to `goal`, excluding `start`.
    ///
    /// An empty result means no route exists and the caller stays put.
    fn plan(&self, start: Vector2D, goal: Vector2D) -> Vec<Vector2D>;
}

/// Camera owned by the presentation layer.
///
/// The simulation writes scroll velocity and zoom targets and tells the
/// camera which entity to follow, but never owns camera state.
pub trait View {
    /// Starts tracking the provided entity.
    fn follow(&mut self, entity: EntityId);

    /// Stops tracking any entity.
    fn unfollow(&mut self);

    /// Entity currently tracked, if any.
    fn followed(&self) -> Option<EntityId>;

    /// Sets the target zoom, jumping there immediately when `animate` is false.
    fn zoom(&mut self, target: f32, animate: bool);

    /// Zoom level the camera is heading towards.
    fn target_zoom(&self) -> f32;

    /// Sets the free-scroll velocity in world units per second.
    fn set_velocity(&mut self, velocity: Vector2D);

    /// Current free-scroll velocity.
    fn velocity(&self) -> Vector2D;

    /// Advances the camera, centring on `focus` when following an entity.
    fn process(&mut self, dt: Duration, focus: Option<Vector2D>);
}

/// Mouse buttons reported by the input collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    /// Usually the left button.
    Primary,
    /// Usually the right button.
    Secondary,
    /// Usually the middle button.
    Tertiary,
}

impl MouseButton {
    /// Every button in index order.
    pub const ALL: [Self; 3] = [Self::Primary, Self::Secondary, Self::Tertiary];

    /// Zero-based slot of the button.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Primary => 0,
            Self::Secondary => 1,
            Self::Tertiary => 2,
        }
    }
}

/// Decoded keyboard actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Steer the controlled unit towards +y.
    MoveUp,
    /// Steer the controlled unit towards -y.
    MoveDown,
    /// Steer the controlled unit towards -x.
    MoveLeft,
    /// Steer the controlled unit towards +x.
    MoveRight,
    /// Scroll the camera towards +y.
    ScrollUp,
    /// Scroll the camera towards -y.
    ScrollDown,
    /// Scroll the camera towards -x.
    ScrollLeft,
    /// Scroll the camera towards +x.
    ScrollRight,
    /// Zoom in by one step.
    ZoomIn,
    /// Zoom out by one step.
    ZoomOut,
    /// Switch between strategy and action mode.
    ToggleMode,
    /// Spawn a unit at the start position.
    SpawnUnit,
}

/// Pre-decoded input state for one frame.
///
/// Held state ([`Input::is_pressed`], [`Input::mouse_button`]) and discrete
/// key events ([`Input::drain_key_buffer`]) are separate surfaces: held keys
/// drive continuous motion while buffered keys fire exactly once.
pub trait Input {
    /// Level state of the mouse button.
    fn mouse_button(&self, button: MouseButton) -> bool;

    /// Cursor position in world coordinates.
    fn cursor_position(&self) -> Vector2D;

    /// Whether the key is currently held.
    fn is_pressed(&self, key: Key) -> bool;

    /// Key presses buffered since the previous drain; empty until new presses arrive.
    fn drain_key_buffer(&mut self) -> Vec<Key>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Strip;

    impl Field for Strip {
        fn tile_index_at(&self, position: Vector2D) -> Option<TileIndex> {
            (position.x >= 0.0 && position.x < 2.0 && position.y >= 0.0 && position.y < 1.0)
                .then(|| TileIndex::new(position.x as u32, 0))
        }

        fn tile_value_at(&self, position: Vector2D) -> Option<TileValue> {
            self.tile_index_at(position).map(|tile| {
                if tile.column() == 0 {
                    TileValue::OPEN
                } else {
                    TileValue::WALL
                }
            })
        }
    }

    #[test]
    fn default_traversability_uses_tile_values() {
        let field = Strip;
        assert!(field.is_traversable(Vector2D::new(0.5, 0.5)));
        assert!(!field.is_traversable(Vector2D::new(1.5, 0.5)));
        assert!(!field.is_traversable(Vector2D::new(-1.0, 0.5)));
    }

    #[test]
    fn mouse_buttons_map_to_distinct_slots() {
        let slots: Vec<usize> = MouseButton::ALL.iter().map(|button| button.index()).collect();
        assert_eq!(slots, vec![0, 1, 2]);
    }
}
