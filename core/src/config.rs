//! Tunable simulation parameters.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Vector2D;

/// Direction a tower launches its projectile relative to its aim vector.
///
/// A tower's aim vector points from its target back to the tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FireDirection {
    /// Launch along the negated aim vector, i.e. towards the target.
    NegatedAim,
    /// Launch along the aim vector itself, i.e. away from the target.
    Aim,
}

impl FireDirection {
    /// Resolves the launch direction for the provided aim vector.
    #[must_use]
    pub fn launch(self, aim: Vector2D) -> Vector2D {
        match self {
            Self::NegatedAim => -aim,
            Self::Aim => aim,
        }
    }
}

/// Fire direction used by towers unless a configuration overrides it.
///
/// `NegatedAim` launches towards the target; `Aim` launches away from it.
pub const TOWER_FIRE_DIRECTION: FireDirection = FireDirection::NegatedAim;

/// Errors reported when a configuration contains unusable values.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// A value that must be strictly positive was zero, negative or not finite.
    #[error("`{field}` must be a positive finite number, got {value}")]
    NotPositive {
        /// Name of the offending field.
        field: &'static str,
        /// Value found in the configuration.
        value: f32,
    },
}

/// Parameters shared by the world, the systems and the game orchestrator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Unit travel speed in world units per second.
    pub unit_speed: f32,
    /// Collision radius of a unit.
    pub unit_radius: f32,
    /// Projectile travel speed in world units per second.
    pub projectile_speed: f32,
    /// Collision radius of a projectile.
    pub projectile_radius: f32,
    /// Seconds a projectile survives without hitting anything.
    pub projectile_lifetime_secs: f32,
    /// Collision radius of a tower.
    pub tower_radius: f32,
    /// Distance within which towers acquire units.
    pub tower_detection_radius: f32,
    /// Direction towers launch projectiles relative to their aim.
    pub tower_fire_direction: FireDirection,
    /// Minimum seconds between two shots of the same shooter.
    pub shot_cooldown_secs: f32,
    /// Distance under which a waypoint counts as reached.
    pub arrival_tolerance: f32,
    /// Camera scroll speed in world units per second.
    pub scroll_speed: f32,
    /// Multiplier applied to the target zoom per zoom-in key press.
    pub zoom_in_factor: f32,
    /// Multiplier applied to the target zoom per zoom-out key press.
    pub zoom_out_factor: f32,
    /// Number of particles emitted per projectile impact.
    pub impact_burst: u32,
    /// Seconds a particle remains visible.
    pub particle_lifetime_secs: f32,
    /// Where spawned units appear; the first open tile when absent.
    pub start_position: Option<Vector2D>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            unit_speed: 3.0,
            unit_radius: 0.5,
            projectile_speed: 20.0,
            projectile_radius: 0.1,
            projectile_lifetime_secs: 5.0,
            tower_radius: 1.0,
            tower_detection_radius: 10.0,
            tower_fire_direction: TOWER_FIRE_DIRECTION,
            shot_cooldown_secs: 0.3,
            arrival_tolerance: 0.05,
            scroll_speed: 20.0,
            zoom_in_factor: 1.25,
            zoom_out_factor: 0.8,
            impact_burst: 12,
            particle_lifetime_secs: 0.5,
            start_position: None,
        }
    }
}

impl SimulationConfig {
    /// Minimum interval between two shots of the same shooter.
    ///
    /// Negative or non-finite values resolve to zero.
    #[must_use]
    pub fn shot_cooldown(&self) -> Duration {
        seconds(self.shot_cooldown_secs)
    }

    /// Lifetime of a projectile that never hits anything.
    #[must_use]
    pub fn projectile_lifetime(&self) -> Duration {
        seconds(self.projectile_lifetime_secs)
    }

    /// Lifetime of a cosmetic particle.
    #[must_use]
    pub fn particle_lifetime(&self) -> Duration {
        seconds(self.particle_lifetime_secs)
    }

    /// Verifies that every quantity the simulation divides by or scales with is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("unit_speed", self.unit_speed),
            ("unit_radius", self.unit_radius),
            ("projectile_speed", self.projectile_speed),
            ("projectile_radius", self.projectile_radius),
            ("projectile_lifetime_secs", self.projectile_lifetime_secs),
            ("tower_radius", self.tower_radius),
            ("tower_detection_radius", self.tower_detection_radius),
            ("shot_cooldown_secs", self.shot_cooldown_secs),
            ("arrival_tolerance", self.arrival_tolerance),
            ("scroll_speed", self.scroll_speed),
            ("zoom_in_factor", self.zoom_in_factor),
            ("zoom_out_factor", self.zoom_out_factor),
            ("particle_lifetime_secs", self.particle_lifetime_secs),
        ];

        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }

        Ok(())
    }
}

/// Converts configured seconds into a duration, treating unusable values as zero.
fn seconds(value: f32) -> Duration {
    Duration::try_from_secs_f32(value).unwrap_or(Duration::ZERO)
}
