//! The simulation loop: active fireworks, spawn queue, explosion observer and
//! the canvas they are drawn onto.

use crate::canvas::Canvas;
use crate::color::hsb_to_rgb;
use crate::config::SimConfig;
use crate::firework::{Firework, FireworkId, FireworkState};
use crate::particle::{Particle, Vec2};
use crate::vibe::{Vibe, VisualParams};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use tracing::{debug, trace};

/// One launch waiting for the next tick boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnRequest {
    pub position: Vec2,
    pub vibe: Option<Vibe>,
    /// Overrides the configured fragment lifespan.
    pub fragment_lifespan: Option<f32>,
}

impl SpawnRequest {
    pub fn new(position: Vec2, vibe: Option<Vibe>) -> Self {
        Self {
            position,
            vibe,
            fragment_lifespan: None,
        }
    }
}

/// Notification raised once per burst.
#[derive(Debug, Clone, PartialEq)]
pub struct Explosion {
    pub firework: FireworkId,
    pub position: Vec2,
    pub hue: f32,
    pub correlation_id: u64,
}

type ExplosionListener = Box<dyn FnMut(&Explosion)>;

/// Thread-safe handle that queues launches into a [`Scene`].
#[derive(Clone)]
pub struct Spawner {
    tx: Sender<(FireworkId, SpawnRequest)>,
    next_id: Arc<AtomicU64>,
}

impl Spawner {
    /// Queues a launch. Returns `None` once the scene has been dropped.
    pub fn spawn(&self, request: SpawnRequest) -> Option<FireworkId> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.tx.send((id, request)).ok()?;
        Some(id)
    }
}

pub struct Scene {
    config: SimConfig,
    fireworks: Vec<Firework>,
    pending: Vec<(FireworkId, SpawnRequest)>,
    inbox: Receiver<(FireworkId, SpawnRequest)>,
    inbox_tx: Sender<(FireworkId, SpawnRequest)>,
    next_id: Arc<AtomicU64>,
    next_correlation: u64,
    listener: Option<ExplosionListener>,
    canvas: Canvas,
    units_per_pixel: f32,
}

impl Scene {
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_config(width, height, SimConfig::default())
    }

    pub fn with_config(width: usize, height: usize, config: SimConfig) -> Self {
        let (inbox_tx, inbox) = mpsc::channel();
        let canvas = Canvas::new(width, height, config.background);
        let units_per_pixel = units_per_pixel(&config, height);
        Self {
            config,
            fireworks: Vec::new(),
            pending: Vec::new(),
            inbox,
            inbox_tx,
            next_id: Arc::new(AtomicU64::new(1)),
            next_correlation: 1,
            listener: None,
            canvas,
            units_per_pixel,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn fireworks(&self) -> &[Firework] {
        &self.fireworks
    }

    pub fn len(&self) -> usize {
        self.fireworks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fireworks.is_empty()
    }

    /// Launches queued by [`Scene::spawn`] that the next tick will pick up.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Size of the visible world in scene units.
    pub fn world_size(&self) -> Vec2 {
        Vec2::new(
            self.canvas.width() as f32 * self.units_per_pixel,
            self.canvas.height() as f32 * self.units_per_pixel,
        )
    }

    /// Scene units covered by one canvas pixel.
    pub fn units_per_pixel(&self) -> f32 {
        self.units_per_pixel
    }

    /// Converts a pixel coordinate on the canvas into scene units.
    pub fn to_world(&self, x: f32, y: f32) -> Vec2 {
        Vec2::new(x * self.units_per_pixel, y * self.units_per_pixel)
    }

    /// Registers the observer called synchronously for every explosion.
    pub fn on_explosion(&mut self, listener: impl FnMut(&Explosion) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn spawner(&self) -> Spawner {
        Spawner {
            tx: self.inbox_tx.clone(),
            next_id: Arc::clone(&self.next_id),
        }
    }

    /// Queues a firework. It joins the active set at the start of the next tick.
    pub fn spawn(&mut self, position: Vec2, vibe: Option<Vibe>) -> FireworkId {
        self.spawn_request(SpawnRequest::new(position, vibe))
    }

    pub fn spawn_request(&mut self, request: SpawnRequest) -> FireworkId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.pending.push((id, request));
        id
    }

    /// Drops a firework before the next tick. Returns whether it was active.
    pub fn discard(&mut self, id: FireworkId) -> bool {
        let before = self.fireworks.len();
        self.fireworks.retain(|fw| fw.id() != id);
        self.pending.retain(|(pending_id, _)| *pending_id != id);
        before != self.fireworks.len()
    }

    /// Advances every firework by `dt` ticks and drops finished ones.
    pub fn tick(&mut self, dt: f32) {
        self.drain_spawns();

        for firework in &mut self.fireworks {
            let Some(burst) = firework.update(dt, &self.config) else {
                continue;
            };

            let explosion = Explosion {
                firework: burst.firework,
                position: burst.position,
                hue: burst.hue,
                correlation_id: self.next_correlation,
            };
            self.next_correlation += 1;

            debug!(
                firework = burst.firework,
                fragments = burst.fragments,
                x = burst.position.x,
                y = burst.position.y,
                "firework exploded"
            );

            if let Some(listener) = self.listener.as_mut() {
                listener(&explosion);
            }
        }

        let before = self.fireworks.len();
        self.fireworks.retain(|fw| fw.state() != FireworkState::Finished);
        let pruned = before - self.fireworks.len();
        if pruned > 0 {
            trace!(pruned, active = self.fireworks.len(), "pruned finished fireworks");
        }
    }

    fn drain_spawns(&mut self) {
        let queued: Vec<_> = self.inbox.try_iter().collect();
        let requests = std::mem::take(&mut self.pending).into_iter().chain(queued);

        for (id, request) in requests {
            let params = match &request.vibe {
                Some(vibe) => VisualParams::from_vibe(vibe),
                None => VisualParams::random(fastrand::Rng::new()),
            };
            debug!(
                firework = id,
                pattern = %params.pattern,
                hue = params.hue,
                size_factor = params.size_factor,
                "firework launched"
            );

            let mut firework = Firework::new(id, request.position, params, &self.config);
            if let Some(lifespan) = request.fragment_lifespan {
                firework = firework.with_fragment_lifespan(lifespan);
            }
            self.fireworks.push(firework);
        }
    }

    /// Paints the current frame onto the canvas.
    pub fn render(&mut self) -> &Canvas {
        self.canvas.wash(self.config.fade_alpha);

        let scale = 1.0 / self.units_per_pixel;
        for firework in &self.fireworks {
            if firework.state() == FireworkState::Ascending {
                draw(&mut self.canvas, firework.shell(), scale);
            }
            for fragment in firework.fragments() {
                draw(&mut self.canvas, fragment, scale);
            }
        }

        &self.canvas
    }

    /// Changes the draw target's pixel size. Fireworks in flight are untouched.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.canvas.resize(width, height);
        self.units_per_pixel = units_per_pixel(&self.config, height);
    }
}

fn draw(canvas: &mut Canvas, particle: &Particle, scale: f32) {
    if particle.is_dead() {
        return;
    }
    let rgb = hsb_to_rgb(particle.hue, 1.0, 1.0);
    canvas.plot(particle.position.x * scale, particle.position.y * scale, rgb, particle.alpha());
}

fn units_per_pixel(config: &SimConfig, height: usize) -> f32 {
    match config.world_height {
        Some(world_height) if height > 0 => world_height / height as f32,
        _ => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vibe::Pattern;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn vibe(pattern: Pattern, seed: f64) -> Vibe {
        Vibe::new("#ff6b6b", 50.0, pattern, Some(seed))
    }

    #[test]
    fn spawn_takes_effect_on_next_tick() {
        let mut scene = Scene::new(200, 600);
        let id = scene.spawn(Vec2::new(100.0, 500.0), Some(vibe(Pattern::Burst, 42.0)));
        assert!(scene.is_empty());
        assert_eq!(scene.pending(), 1);

        scene.tick(1.0);
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.pending(), 0);
        assert_eq!(scene.fireworks()[0].id(), id);
        assert_eq!(scene.fireworks()[0].launch_position(), Vec2::new(100.0, 500.0));
    }

    #[test]
    fn explosion_listener_fires_once_per_firework() {
        let mut scene = Scene::new(400, 800);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        scene.on_explosion(move |e| sink.borrow_mut().push(e.clone()));

        let a = scene.spawn(Vec2::new(100.0, 700.0), Some(vibe(Pattern::Sphere, 1.0)));
        let b = scene.spawn(Vec2::new(300.0, 700.0), Some(vibe(Pattern::Ring, 2.0)));
        for _ in 0..400 {
            scene.tick(1.0);
        }

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        let mut ids: Vec<_> = seen.iter().map(|e| e.firework).collect();
        ids.sort();
        assert_eq!(ids, vec![a, b]);
        assert_ne!(seen[0].correlation_id, seen[1].correlation_id);
        assert!(scene.is_empty());
    }

    #[test]
    fn spawner_queues_from_other_threads() {
        let mut scene = Scene::new(100, 100);
        let spawner = scene.spawner();
        let local = scene.spawn(Vec2::new(10.0, 90.0), None);
        let handle = std::thread::spawn(move || spawner.spawn(SpawnRequest::new(Vec2::new(50.0, 90.0), None)));
        let remote = handle.join().unwrap().unwrap();
        assert_ne!(local, remote);

        scene.tick(1.0);
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn resize_keeps_fireworks_in_flight() {
        let mut scene = Scene::new(120, 300);
        scene.spawn(Vec2::new(60.0, 280.0), Some(vibe(Pattern::Star, 5.0)));
        for _ in 0..10 {
            scene.tick(1.0);
        }
        let before = scene.fireworks()[0].shell().position;

        scene.resize(60, 150);
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.fireworks()[0].shell().position, before);
        assert_eq!((scene.canvas().width(), scene.canvas().height()), (60, 150));

        scene.tick(1.0);
        scene.render();
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn world_height_scales_pixels() {
        let config = SimConfig { world_height: Some(800.0), ..SimConfig::default() };
        let mut scene = Scene::with_config(100, 200, config);
        assert_eq!(scene.world_size(), Vec2::new(400.0, 800.0));
        assert_eq!(scene.to_world(10.0, 20.0), Vec2::new(40.0, 80.0));
        scene.resize(100, 400);
        assert_eq!(scene.world_size(), Vec2::new(200.0, 800.0));
        assert_eq!(scene.units_per_pixel(), 2.0);
    }

    #[test]
    fn render_draws_shell_with_its_hue() {
        let mut scene = Scene::new(50, 400);
        scene.spawn(Vec2::new(25.0, 390.0), Some(Vibe::new("#96ceb4", 30.0, Pattern::Sphere, Some(3.0))));
        scene.tick(1.0);
        let shell = scene.fireworks()[0].shell().position;
        let canvas = scene.render();
        let (r, g, b) = canvas.get(shell.x as usize, shell.y as usize).unwrap();
        assert!(g > r && g > b, "expected a green dot, got {:?}", (r, g, b));
    }

    #[test]
    fn discard_removes_active_and_pending() {
        let mut scene = Scene::new(100, 100);
        let a = scene.spawn(Vec2::new(10.0, 90.0), None);
        scene.tick(1.0);
        let b = scene.spawn(Vec2::new(20.0, 90.0), None);
        assert!(scene.discard(a));
        assert!(!scene.discard(b));
        scene.tick(1.0);
        assert!(scene.is_empty());
    }
}
