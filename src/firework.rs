use crate::color::wrap_hue;
use crate::config::SimConfig;
use crate::particle::{Particle, Vec2};
use crate::vibe::{Pattern, VisualParams};
use std::f32::consts::TAU;

pub type FireworkId = u64;

/// Base fragment count of the burst pattern before the size factor.
const BURST_BASE: f32 = 40.0;
/// Spread of fragment hues around the base hue, in degrees.
const HUE_JITTER: f32 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireworkState {
    Ascending,
    Exploded,
    Finished,
}

/// Emitted once when a shell bursts.
#[derive(Debug, Clone, PartialEq)]
pub struct Burst {
    pub firework: FireworkId,
    pub position: Vec2,
    pub hue: f32,
    pub fragments: usize,
}

#[derive(Debug)]
pub struct Firework {
    id: FireworkId,
    shell: Particle,
    fragments: Vec<Particle>,
    exploded: bool,
    hue: f32,
    size_factor: f32,
    pattern: Pattern,
    launch_position: Vec2,
    fragment_lifespan: f32,
    rng: fastrand::Rng,
}

impl Firework {
    pub fn new(id: FireworkId, position: Vec2, mut params: VisualParams, config: &SimConfig) -> Self {
        let shell = Particle::shell(position, params.hue, &mut params.rng, config);
        Self {
            id,
            shell,
            fragments: Vec::new(),
            exploded: false,
            hue: params.hue,
            size_factor: params.size_factor,
            pattern: params.pattern,
            launch_position: position,
            fragment_lifespan: config.fragment_lifespan,
            rng: params.rng,
        }
    }

    /// Overrides how long fragments live, e.g. to match a sound's length.
    pub fn with_fragment_lifespan(mut self, lifespan: f32) -> Self {
        self.fragment_lifespan = lifespan;
        self
    }

    pub fn id(&self) -> FireworkId {
        self.id
    }

    pub fn hue(&self) -> f32 {
        self.hue
    }

    pub fn size_factor(&self) -> f32 {
        self.size_factor
    }

    pub fn pattern(&self) -> Pattern {
        self.pattern
    }

    pub fn launch_position(&self) -> Vec2 {
        self.launch_position
    }

    pub fn shell(&self) -> &Particle {
        &self.shell
    }

    pub fn fragments(&self) -> &[Particle] {
        &self.fragments
    }

    pub fn state(&self) -> FireworkState {
        match (self.exploded, self.fragments.is_empty()) {
            (false, _) => FireworkState::Ascending,
            (true, false) => FireworkState::Exploded,
            (true, true) => FireworkState::Finished,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state() == FireworkState::Finished
    }

    /// Advances one step. Returns the burst on the step the shell reaches apex.
    pub fn update(&mut self, dt: f32, config: &SimConfig) -> Option<Burst> {
        let mut burst = None;

        if !self.exploded {
            self.shell.integrate(dt, config);
            if self.shell.velocity.y >= 0.0 {
                burst = Some(self.explode(config));
            }
        } else {
            for fragment in &mut self.fragments {
                fragment.integrate(dt, config);
            }
        }

        self.fragments.retain(|f| !f.is_dead());
        burst
    }

    fn explode(&mut self, config: &SimConfig) -> Burst {
        self.shell.explode();
        self.exploded = true;

        let origin = self.shell.position;
        let count = fragment_count(self.pattern, self.size_factor, &mut self.rng, config);
        self.fragments.reserve_exact(count);

        for i in 0..count {
            let hue = match self.pattern {
                Pattern::Custom | Pattern::Burst => self.rng.f32() * 360.0,
                _ => wrap_hue(self.hue + (self.rng.f32() * 2.0 - 1.0) * HUE_JITTER),
            };
            let velocity = fragment_velocity(self.pattern, i, count, self.size_factor, &mut self.rng);
            self.fragments.push(Particle::fragment(origin, velocity, hue, self.fragment_lifespan));
        }

        Burst {
            firework: self.id,
            position: origin,
            hue: self.hue,
            fragments: count,
        }
    }
}

/// Number of fragments a pattern bursts into, clamped to the configured limits.
pub fn fragment_count(pattern: Pattern, size_factor: f32, rng: &mut fastrand::Rng, config: &SimConfig) -> usize {
    let raw = match pattern {
        Pattern::Burst => (BURST_BASE * size_factor.min(2.0)).floor(),
        Pattern::Fountain => (BURST_BASE * 0.6 * size_factor).floor(),
        Pattern::Sphere => (120.0 * size_factor).floor(),
        Pattern::Star => (100.0 * size_factor).floor(),
        Pattern::Ring => (90.0 * size_factor).floor(),
        Pattern::Custom => (120.0 * size_factor).floor() + rng.usize(0..=60) as f32,
    };

    if !(raw > 0.0) {
        return config.min_fragments;
    }
    (raw as usize).clamp(config.min_fragments, config.max_fragments)
}

/// Angle of spoke `i` out of `count`, evenly spaced around the circle.
pub fn spoke_angle(i: usize, count: usize) -> f32 {
    i as f32 / count.max(1) as f32 * TAU
}

/// Initial velocity of fragment `i` for the given pattern.
pub fn fragment_velocity(
    pattern: Pattern,
    i: usize,
    count: usize,
    size_factor: f32,
    rng: &mut fastrand::Rng,
) -> Vec2 {
    match pattern {
        Pattern::Sphere => Vec2::from_angle(rng.f32() * TAU) * range(rng, 2.0, 8.0),
        Pattern::Fountain => Vec2::new(range(rng, -2.0, 2.0), range(rng, -8.0, -4.0)),
        Pattern::Star => Vec2::from_angle(spoke_angle(i, count)) * (5.0 + range(rng, -0.5, 0.5)),
        Pattern::Ring => {
            let angle = spoke_angle(i, count);
            let radius = 9.0 + range(rng, -0.3, 0.3);
            // Tilted ring seen nearly edge-on
            Vec2::new(
                angle.cos() * radius,
                angle.sin() * radius * 0.08 + range(rng, -0.15, 0.15),
            )
        }
        Pattern::Custom | Pattern::Burst => {
            Vec2::from_angle(rng.f32() * TAU) * range(rng, 2.0, 5.0 + 5.0 * size_factor)
        }
    }
}

fn range(rng: &mut fastrand::Rng, lo: f32, hi: f32) -> f32 {
    lo + rng.f32() * (hi - lo)
}
