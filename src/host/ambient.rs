use noise::{NoiseFn, Perlin};
use skyburst::{Pattern, Vec2, Vibe};

/// Launches fireworks on its own when the display runs unattended.
///
/// Launch spots wander smoothly across the sky instead of jumping around,
/// following a Perlin noise curve over time.
pub struct AmbientLauncher {
    perlin: Perlin,
    time: f32,
    next_launch: f32,
}

impl AmbientLauncher {
    pub fn new() -> Self {
        Self {
            perlin: Perlin::new(fastrand::u32(0..1000)),
            time: 0.0,
            next_launch: 0.5,
        }
    }

    /// Advances by `dt` seconds. Returns a launch when one is due.
    pub fn update(&mut self, dt: f32, world: Vec2) -> Option<(Vec2, Vibe)> {
        self.time += dt;
        // Wrap time to prevent floating point precision issues
        if self.time > 10000.0 {
            self.time -= 10000.0;
            self.next_launch -= 10000.0;
        }

        if self.time < self.next_launch {
            return None;
        }

        let drift = self.perlin.get([self.time as f64 * 0.15, 0.5]) as f32;
        let x = world.x * (0.5 + drift * 0.35).clamp(0.15, 0.85);
        let y = (world.y - skyburst::relay::LAUNCH_MARGIN).max(0.0);

        let mut vibe = Vibe::random();
        vibe.pattern = Pattern::ALL[fastrand::usize(0..Pattern::ALL.len())].to_string();

        self.next_launch = self.time + 0.6 + fastrand::f32() * 1.4;
        Some((Vec2::new(x, y), vibe))
    }
}
