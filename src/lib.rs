//! Firework particle engine.
//!
//! A [`Scene`] owns every firework in flight. Hosts call [`Scene::spawn`] when
//! something triggers a launch, drive [`Scene::tick`] and [`Scene::render`]
//! from their frame loop, and forward viewport changes to [`Scene::resize`].
//!
//! ```
//! use skyburst::{Pattern, Scene, Vec2, Vibe};
//!
//! let mut scene = Scene::new(320, 240);
//! scene.on_explosion(|e| println!("boom at {:?}", e.position));
//! scene.spawn(Vec2::new(160.0, 230.0), Some(Vibe::new("#ffeaa7", 60.0, Pattern::Star, Some(7.0))));
//!
//! for _ in 0..200 {
//!     scene.tick(1.0);
//!     scene.render();
//! }
//! assert!(scene.is_empty());
//! ```

pub mod canvas;
pub mod color;
pub mod config;
pub mod error;
pub mod firework;
pub mod particle;
pub mod relay;
pub mod scene;
pub mod vibe;

pub use canvas::Canvas;
pub use config::{DecayModel, SimConfig};
pub use error::{ConfigError, RelayError};
pub use firework::{Burst, Firework, FireworkId, FireworkState};
pub use particle::{Particle, Phase, Vec2};
pub use relay::{LaunchMode, Payload, Relay};
pub use scene::{Explosion, Scene, SpawnRequest, Spawner};
pub use vibe::{Pattern, Vibe, VisualParams};
