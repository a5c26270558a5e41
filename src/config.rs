//! Tunable simulation constants.
//!
//! Every field has a default matching the reference look, so a JSON config
//! file only needs to name what it changes:
//!
//! ```json
//! { "exploded_decay": 2.0, "background": [26, 27, 38] }
//! ```

use crate::color::Rgb;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// How lifespan decrements relate to `dt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DecayModel {
    /// Fixed decrement per tick regardless of `dt`. Apparent duration follows
    /// the host frame rate.
    #[default]
    PerTick,
    /// Decrement scaled by `dt`, for hosts that pass variable steps.
    Scaled,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SimConfig {
    /// Upward launch speed band for shells, in units per tick.
    pub shell_speed: (f32, f32),
    /// Downward force on an ascending shell, per tick.
    pub ascending_gravity: f32,
    /// Downward force on a fragment, per tick.
    pub exploded_gravity: f32,
    /// Velocity multiplier applied to fragments every tick.
    pub drag: f32,
    pub ascending_decay: f32,
    pub exploded_decay: f32,
    pub decay_model: DecayModel,
    pub shell_lifespan: f32,
    pub fragment_lifespan: f32,
    pub min_fragments: usize,
    pub max_fragments: usize,
    /// Opacity (0..=255) of the background wash painted every frame.
    pub fade_alpha: u8,
    pub background: Rgb,
    /// Fixed logical height of the world. `None` maps one unit to one pixel.
    pub world_height: Option<f32>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            shell_speed: (12.0, 18.0),
            ascending_gravity: 0.2,
            exploded_gravity: 0.1,
            drag: 0.95,
            ascending_decay: 1.0,
            exploded_decay: 3.0,
            decay_model: DecayModel::PerTick,
            shell_lifespan: 255.0,
            fragment_lifespan: 255.0,
            min_fragments: 40,
            max_fragments: 500,
            fade_alpha: 25,
            background: (0, 0, 0),
            world_height: None,
        }
    }
}

impl SimConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: SimConfig = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let (lo, hi) = self.shell_speed;
        if !(lo > 0.0 && hi >= lo) {
            return Err(ConfigError::Invalid("shell_speed must be a positive, ordered band".into()));
        }
        if self.ascending_gravity <= 0.0 {
            return Err(ConfigError::Invalid("ascending_gravity must be positive".into()));
        }
        if !(self.drag > 0.0 && self.drag <= 1.0) {
            return Err(ConfigError::Invalid("drag must be in (0, 1]".into()));
        }
        if self.ascending_decay <= 0.0 || self.exploded_decay <= 0.0 {
            return Err(ConfigError::Invalid("decay rates must be positive".into()));
        }
        if self.min_fragments == 0 || self.min_fragments > self.max_fragments {
            return Err(ConfigError::Invalid("fragment limits must satisfy 0 < min <= max".into()));
        }
        if matches!(self.world_height, Some(h) if h <= 0.0) {
            return Err(ConfigError::Invalid("world_height must be positive".into()));
        }
        Ok(())
    }

    /// Lifespan decrement for one step of `dt` ticks.
    pub fn decay_step(&self, rate: f32, dt: f32) -> f32 {
        match self.decay_model {
            DecayModel::PerTick => rate,
            DecayModel::Scaled => rate * dt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: SimConfig =
            serde_json::from_str(r#"{ "exploded_decay": 2.0, "decay_model": "scaled" }"#).unwrap();
        assert_eq!(config.exploded_decay, 2.0);
        assert_eq!(config.decay_model, DecayModel::Scaled);
        assert_eq!(config.ascending_decay, 1.0);
        assert_eq!(config.max_fragments, 500);
    }

    #[test]
    fn rejects_inverted_fragment_limits() {
        let config = SimConfig { min_fragments: 600, ..SimConfig::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn scaled_decay_keeps_ratio() {
        let config = SimConfig { decay_model: DecayModel::Scaled, ..SimConfig::default() };
        let ascending = config.decay_step(config.ascending_decay, 0.5);
        let exploded = config.decay_step(config.exploded_decay, 0.5);
        assert_eq!(ascending, 0.5);
        assert_eq!(exploded / ascending, 3.0);
    }
}
