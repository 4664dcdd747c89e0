#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless camera that implements the simulation's [`View`] contract.

use std::time::Duration;

use battlepath_core::{EntityId, Vector2D, View};

/// Fraction of the remaining zoom distance covered per second while animating.
const ZOOM_RATE: f32 = 8.0;

/// Zoom gap under which an animation snaps to its target.
const ZOOM_EPSILON: f32 = 1e-3;

/// Camera centred on a world position with free scroll, follow and animated zoom.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    center: Vector2D,
    velocity: Vector2D,
    zoom: f32,
    target_zoom: f32,
    followed: Option<EntityId>,
}

impl Camera {
    /// Creates a camera centred on `center` at zoom level one.
    #[must_use]
    pub fn new(center: Vector2D) -> Self {
        Self {
            center,
            velocity: Vector2D::ZERO,
            zoom: 1.0,
            target_zoom: 1.0,
            followed: None,
        }
    }

    /// World position at the centre of the view.
    #[must_use]
    pub fn center(&self) -> Vector2D {
        self.center
    }

    /// Zoom level currently applied.
    #[must_use]
    pub fn current_zoom(&self) -> f32 {
        self.zoom
    }

    /// Converts a position relative to the viewport centre into world coordinates.
    #[must_use]
    pub fn screen_to_world(&self, offset_from_center: Vector2D) -> Vector2D {
        self.center + offset_from_center / self.zoom
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vector2D::ZERO)
    }
}

impl View for Camera {
    fn follow(&mut self, entity: EntityId) {
        self.followed = Some(entity);
    }

    fn unfollow(&mut self) {
        self.followed = None;
    }

    fn followed(&self) -> Option<EntityId> {
        self.followed
    }

    fn zoom(&mut self, target: f32, animate: bool) {
        if !(target.is_finite() && target > 0.0) {
            return;
        }
        self.target_zoom = target;
        if !animate {
            self.zoom = target;
        }
    }

    fn target_zoom(&self) -> f32 {
        self.target_zoom
    }

    fn set_velocity(&mut self, velocity: Vector2D) {
        self.velocity = velocity;
    }

    fn velocity(&self) -> Vector2D {
        self.velocity
    }

    fn process(&mut self, dt: Duration, focus: Option<Vector2D>) {
        let seconds = dt.as_secs_f32();

        match (self.followed, focus) {
            (Some(_), Some(focus)) => self.center = focus,
            _ => self.center += self.velocity * seconds,
        }

        let gap = self.target_zoom - self.zoom;
        if gap.abs() <= ZOOM_EPSILON {
            self.zoom = self.target_zoom;
        } else {
            self.zoom += gap * (ZOOM_RATE * seconds).min(1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_camera_scrolls_with_velocity() {
        let mut camera = Camera::default();
        camera.set_velocity(Vector2D::new(20.0, 0.0));

        camera.process(Duration::from_millis(500), Some(Vector2D::new(3.0, 3.0)));

        assert_eq!(camera.center(), Vector2D::new(10.0, 0.0));
    }

    #[test]
    fn followed_entity_pins_the_centre() {
        let mut camera = Camera::default();
        camera.set_velocity(Vector2D::new(20.0, 0.0));
        camera.follow(EntityId::new(4));

        camera.process(Duration::from_millis(500), Some(Vector2D::new(3.0, 3.0)));
        assert_eq!(camera.center(), Vector2D::new(3.0, 3.0));
        assert_eq!(camera.followed(), Some(EntityId::new(4)));

        camera.unfollow();
        camera.process(Duration::from_millis(100), Some(Vector2D::new(9.0, 9.0)));
        assert_eq!(camera.center(), Vector2D::new(5.0, 3.0));
    }

    #[test]
    fn animated_zoom_converges_on_target() {
        let mut camera = Camera::default();
        camera.zoom(2.0, true);
        assert_eq!(camera.current_zoom(), 1.0);
        assert_eq!(camera.target_zoom(), 2.0);

        for _ in 0..120 {
            camera.process(Duration::from_millis(16), None);
        }

        assert_eq!(camera.current_zoom(), 2.0);
    }

    #[test]
    fn instant_zoom_skips_animation_and_rejects_nonsense() {
        let mut camera = Camera::default();
        camera.zoom(0.5, false);
        camera.zoom(-1.0, false);

        assert_eq!(camera.current_zoom(), 0.5);
        assert_eq!(camera.target_zoom(), 0.5);
        assert_eq!(
            camera.screen_to_world(Vector2D::new(1.0, -2.0)),
            Vector2D::new(2.0, -4.0)
        );
    }
}
