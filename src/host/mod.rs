use crossterm::event::{Event, KeyCode, MouseButton, MouseEventKind};
use skyburst::{LaunchMode, Pattern, Relay, Scene, SimConfig, Vibe};
use std::cell::Cell;
use std::io::{BufWriter, Stdout, Write};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use tracing::debug;

pub mod ambient;
pub mod feed;

use ambient::AmbientLauncher;

pub struct Options {
    pub launch_mode: LaunchMode,
    pub demo: bool,
    pub bell: bool,
    pub events: Option<PathBuf>,
}

/// Terminal adapter around a [`Scene`]: turns clicks and keys into launches,
/// starts the event feed, and writes frames to the terminal.
pub struct Display {
    scene: Scene,
    relay: Arc<Mutex<Relay>>,
    ambient: Option<AmbientLauncher>,
    click_pattern: Pattern,
    bell: bool,
    pending_bells: Rc<Cell<u32>>,
    output_buf: Vec<u8>,
}

impl Display {
    /// `width` and `height` are in pixels: one column, two per terminal row.
    pub fn new(width: usize, height: usize, config: SimConfig, options: Options) -> Self {
        let mut scene = Scene::with_config(width, height, config);
        let mut relay = Relay::new(options.launch_mode, scene.world_size());
        relay.set_units_per_pixel(scene.units_per_pixel());
        let relay = Arc::new(Mutex::new(relay));
        if let Some(path) = options.events {
            feed::follow(path, Arc::clone(&relay), scene.spawner());
        }

        let pending_bells = Rc::new(Cell::new(0));
        let bells = Rc::clone(&pending_bells);
        scene.on_explosion(move |explosion| {
            debug!(correlation_id = explosion.correlation_id, hue = explosion.hue, "explosion");
            bells.set(bells.get() + 1);
        });

        Self {
            scene,
            relay,
            ambient: options.demo.then(AmbientLauncher::new),
            click_pattern: Pattern::Burst,
            bell: options.bell,
            pending_bells,
            output_buf: Vec::with_capacity(width * height * 25),
        }
    }

    /// One fixed step of `seconds`, which the scene sees as `ticks`.
    pub fn update(&mut self, seconds: f32, ticks: f32) {
        if let Some(ambient) = self.ambient.as_mut() {
            if let Some((position, vibe)) = ambient.update(seconds, self.scene.world_size()) {
                self.scene.spawn(position, Some(vibe));
            }
        }

        self.scene.tick(ticks);
    }

    pub fn render(&mut self, stdout: &mut BufWriter<Stdout>) -> std::io::Result<()> {
        self.output_buf.clear();
        self.scene.render().write_ansi(&mut self.output_buf)?;

        let bells = self.pending_bells.replace(0);
        if self.bell && bells > 0 {
            self.output_buf.push(0x07);
        }

        stdout.write_all(&self.output_buf)?;
        stdout.flush()?;
        Ok(())
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.scene.resize(width, height);
        let mut relay = feed::lock(&self.relay);
        relay.set_world(self.scene.world_size());
        relay.set_units_per_pixel(self.scene.units_per_pixel());
    }

    pub fn handle_event(&mut self, event: &Event) {
        match event {
            Event::Mouse(mouse_event) => {
                if let MouseEventKind::Down(MouseButton::Left) = mouse_event.kind {
                    // Account for half-block rendering
                    let x = mouse_event.column as f32;
                    let y = mouse_event.row as f32 * 2.0;
                    let mut vibe = Vibe::default_click();
                    vibe.pattern = self.click_pattern.to_string();
                    let position = self.scene.to_world(x, y);
                    self.scene.spawn(position, Some(vibe));
                }
            }
            Event::Key(key_event) => match key_event.code {
                KeyCode::Char(c @ '1'..='6') => {
                    let index = c as usize - '1' as usize;
                    self.click_pattern = Pattern::ALL[index];
                    debug!(pattern = %self.click_pattern, "click pattern selected");
                }
                KeyCode::Char(' ') => {
                    let position = feed::lock(&self.relay).launch_point();
                    self.scene.spawn(position, Some(Vibe::random()));
                }
                _ => {}
            },
            _ => {}
        }
    }
}
