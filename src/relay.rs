//! Translation of remote payloads into launches.
//!
//! A display receives two kinds of JSON lines: firework events published by a
//! phone (already carrying a vibe), and raw acceleration samples from the
//! polling fallback. Both end up as [`SpawnRequest`]s.

use crate::error::RelayError;
use crate::particle::Vec2;
use crate::scene::SpawnRequest;
use crate::vibe::Vibe;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

/// Ticks of fragment life per second of explosion audio.
pub const TICKS_PER_AUDIO_SECOND: f32 = 50.0;
/// Shake strength on the y axis that launches a fallback firework.
pub const SHAKE_THRESHOLD: f64 = 10.0;
/// Distance of the launch point above the bottom edge, in scene units.
pub const LAUNCH_MARGIN: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FireworkEvent {
    pub id: String,
    pub vibe: Vibe,
    #[serde(default, alias = "userId")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default, alias = "audioDuration")]
    pub audio_duration: Option<f32>,
    #[serde(default, alias = "clickPosition")]
    pub click_position: Option<Point>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
pub struct Acceleration {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Firework(FireworkEvent),
    Acceleration(Acceleration),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPayload {
    Firework(FireworkEvent),
    Acceleration { acceleration: Acceleration },
}

impl Payload {
    pub fn decode(line: &str) -> Result<Self, RelayError> {
        let value: serde_json::Value = serde_json::from_str(line)?;
        match serde_json::from_value::<RawPayload>(value) {
            Ok(RawPayload::Firework(event)) => Ok(Payload::Firework(event)),
            Ok(RawPayload::Acceleration { acceleration }) => Ok(Payload::Acceleration(acceleration)),
            Err(_) => Err(RelayError::Unrecognized),
        }
    }
}

/// Minimum spacing between triggers.
#[derive(Debug)]
pub struct Cooldown {
    period: Duration,
    last: Option<Instant>,
}

impl Cooldown {
    pub fn new(period: Duration) -> Self {
        Self { period, last: None }
    }

    /// Returns true and arms the cooldown if enough time has passed.
    pub fn try_trigger(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) <= self.period => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Where launches without an explicit position start from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LaunchMode {
    Center,
    #[default]
    Random,
}

#[derive(Debug)]
pub struct Relay {
    mode: LaunchMode,
    world: Vec2,
    units_per_pixel: f32,
    last_event_id: Option<String>,
    shake_cooldown: Cooldown,
}

impl Relay {
    pub fn new(mode: LaunchMode, world: Vec2) -> Self {
        Self {
            mode,
            world,
            units_per_pixel: 1.0,
            last_event_id: None,
            shake_cooldown: Cooldown::new(Duration::from_millis(1000)),
        }
    }

    /// Keeps launch points inside a resized world.
    pub fn set_world(&mut self, world: Vec2) {
        self.world = world;
    }

    /// Scale for `click_position`, which senders report in canvas pixels.
    pub fn set_units_per_pixel(&mut self, units_per_pixel: f32) {
        self.units_per_pixel = units_per_pixel;
    }

    /// A launch point near the bottom edge.
    pub fn launch_point(&self) -> Vec2 {
        let x = match self.mode {
            LaunchMode::Center => self.world.x / 2.0,
            LaunchMode::Random => self.world.x * (0.2 + fastrand::f32() * 0.6),
        };
        Vec2::new(x, (self.world.y - LAUNCH_MARGIN).max(0.0))
    }

    /// Decodes one line and translates it.
    pub fn accept(&mut self, line: &str, now: Instant) -> Result<Option<SpawnRequest>, RelayError> {
        let payload = Payload::decode(line)?;
        Ok(self.translate(payload, now))
    }

    pub fn translate(&mut self, payload: Payload, now: Instant) -> Option<SpawnRequest> {
        match payload {
            Payload::Firework(event) => self.on_event(event),
            Payload::Acceleration(sample) => self.on_acceleration(sample, now),
        }
    }

    fn on_event(&mut self, event: FireworkEvent) -> Option<SpawnRequest> {
        if self.last_event_id.as_deref() == Some(event.id.as_str()) {
            debug!(id = %event.id, "ignoring repeated event");
            return None;
        }
        self.last_event_id = Some(event.id);

        let position = match event.click_position {
            Some(p) => Vec2::new(p.x, p.y) * self.units_per_pixel,
            None => self.launch_point(),
        };
        let fragment_lifespan = event
            .audio_duration
            .filter(|d| d.is_finite() && *d > 0.0)
            .map(|d| (d * TICKS_PER_AUDIO_SECOND).floor().max(1.0));

        Some(SpawnRequest {
            position,
            vibe: Some(event.vibe),
            fragment_lifespan,
        })
    }

    fn on_acceleration(&mut self, sample: Acceleration, now: Instant) -> Option<SpawnRequest> {
        let y = sample.y?;
        if y <= SHAKE_THRESHOLD || !self.shake_cooldown.try_trigger(now) {
            return None;
        }
        debug!(y, "shake over threshold");

        Some(SpawnRequest::new(self.launch_point(), Some(Vibe::from_acceleration(y))))
    }
}
