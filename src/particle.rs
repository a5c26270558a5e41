use crate::config::SimConfig;

/// 2D vector in scene units. `y` grows downward, so "up" is negative `y`.
pub use glam::Vec2;

/// Lifespan that maps to full opacity.
const OPAQUE_LIFESPAN: f32 = 255.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Ascending,
    Exploded,
}

#[derive(Debug, Clone)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    acceleration: Vec2,
    pub hue: f32,
    pub lifespan: f32,
    phase: Phase,
}

impl Particle {
    /// A rising shell with an upward speed drawn from the configured band.
    pub fn shell(position: Vec2, hue: f32, rng: &mut fastrand::Rng, config: &SimConfig) -> Self {
        let (lo, hi) = config.shell_speed;
        let speed = lo + rng.f32() * (hi - lo);
        Self::with_velocity(position, Vec2::new(0.0, -speed), hue, config.shell_lifespan, Phase::Ascending)
    }

    pub fn fragment(position: Vec2, velocity: Vec2, hue: f32, lifespan: f32) -> Self {
        Self::with_velocity(position, velocity, hue, lifespan, Phase::Exploded)
    }

    fn with_velocity(position: Vec2, velocity: Vec2, hue: f32, lifespan: f32, phase: Phase) -> Self {
        Self {
            position,
            velocity,
            acceleration: Vec2::ZERO,
            hue,
            lifespan,
            phase,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Marks the particle as exploded. Exploded particles never ascend again.
    pub fn explode(&mut self) {
        self.phase = Phase::Exploded;
    }

    pub fn apply_force(&mut self, force: Vec2) {
        self.acceleration += force;
    }

    /// One semi-implicit Euler step of `dt` ticks.
    pub fn integrate(&mut self, dt: f32, config: &SimConfig) {
        let (gravity, rate) = match self.phase {
            Phase::Ascending => (config.ascending_gravity, config.ascending_decay),
            Phase::Exploded => {
                self.velocity *= config.drag.powf(dt);
                (config.exploded_gravity, config.exploded_decay)
            }
        };

        self.apply_force(Vec2::new(0.0, gravity));
        self.velocity += self.acceleration * dt;
        self.position += self.velocity * dt;
        self.acceleration = Vec2::ZERO;
        self.lifespan -= config.decay_step(rate, dt);
    }

    pub fn is_dead(&self) -> bool {
        self.lifespan < 0.0
    }

    /// Remaining life as opacity in 0..=1. Lifespan doubles as a 0..255 alpha.
    pub fn alpha(&self) -> f32 {
        (self.lifespan / OPAQUE_LIFESPAN).clamp(0.0, 1.0)
    }
}
