#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Cosmetic particle bursts spawned where projectiles strike.
//!
//! Particles never interact with the simulation: they are owned here, read
//! by presentation code and dropped once their lifetime runs out.

use std::{f32::consts::TAU, time::Duration};

use battlepath_core::{Event, SimulationConfig, Vector2D};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const MIN_PARTICLE_SPEED: f32 = 1.0;
const MAX_PARTICLE_SPEED: f32 = 4.0;

/// Short-lived cosmetic particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// Current world position.
    pub position: Vector2D,
    /// Drift in world units per second.
    pub velocity: Vector2D,
    /// Time since the particle was emitted.
    pub age: Duration,
    /// Age at which the particle disappears.
    pub lifetime: Duration,
}

impl Particle {
    /// Remaining fraction of the lifetime in `[0, 1]`, useful for fading.
    #[must_use]
    pub fn remaining(&self) -> f32 {
        if self.lifetime.is_zero() {
            return 0.0;
        }
        let spent = self.age.as_secs_f32() / self.lifetime.as_secs_f32();
        (1.0 - spent).clamp(0.0, 1.0)
    }
}

/// Particle system driven by impact events.
#[derive(Debug)]
pub struct Effects {
    rng: ChaCha8Rng,
    burst: u32,
    lifetime: Duration,
    particles: Vec<Particle>,
}

impl Effects {
    /// Creates an effects system with a seeded generator for burst directions.
    #[must_use]
    pub fn new(config: &SimulationConfig, seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            burst: config.impact_burst,
            lifetime: config.particle_lifetime(),
            particles: Vec::new(),
        }
    }

    /// Ages and drifts existing particles, then emits a burst per impact event.
    pub fn handle(&mut self, events: &[Event], dt: Duration) {
        let seconds = dt.as_secs_f32();
        self.particles.retain_mut(|particle| {
            particle.age = particle.age.saturating_add(dt);
            particle.position += particle.velocity * seconds;
            particle.age < particle.lifetime
        });

        for event in events {
            if let Event::ProjectileImpacted { at, .. } = event {
                self.burst_at(*at);
            }
        }
    }

    fn burst_at(&mut self, position: Vector2D) {
        self.particles.reserve(self.burst as usize);
        for _ in 0..self.burst {
            let angle = self.rng.gen_range(0.0..TAU);
            let speed = self.rng.gen_range(MIN_PARTICLE_SPEED..MAX_PARTICLE_SPEED);
            self.particles.push(Particle {
                position,
                velocity: Vector2D::from_angle(angle) * speed,
                age: Duration::ZERO,
                lifetime: self.lifetime,
            });
        }
    }

    /// Particles currently alive.
    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }
}
