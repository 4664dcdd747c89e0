//! Scripted [`Input`] implementation for headless runs and tests.

use std::collections::HashSet;

use battlepath_core::{Input, Key, MouseButton, Vector2D};

/// Input state driven programmatically instead of by a device.
#[derive(Clone, Debug, Default)]
pub struct InputState {
    buttons: [bool; 3],
    cursor: Vector2D,
    held: HashSet<Key>,
    buffer: Vec<Key>,
}

impl InputState {
    /// Creates an input state with nothing pressed and the cursor at the origin.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the cursor to a world position.
    pub fn set_cursor(&mut self, position: Vector2D) {
        self.cursor = position;
    }

    /// Sets the level state of a mouse button.
    pub fn set_button(&mut self, button: MouseButton, pressed: bool) {
        self.buttons[button.index()] = pressed;
    }

    /// Marks a key as held or released.
    pub fn set_key(&mut self, key: Key, held: bool) {
        if held {
            let _ = self.held.insert(key);
        } else {
            let _ = self.held.remove(&key);
        }
    }

    /// Buffers a discrete key press for the next drain.
    pub fn push_key(&mut self, key: Key) {
        self.buffer.push(key);
    }
}

impl Input for InputState {
    fn mouse_button(&self, button: MouseButton) -> bool {
        self.buttons[button.index()]
    }

    fn cursor_position(&self) -> Vector2D {
        self.cursor
    }

    fn is_pressed(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    fn drain_key_buffer(&mut self) -> Vec<Key> {
        std::mem::take(&mut self.buffer)
    }
}
