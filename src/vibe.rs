//! Mapping from an event's "vibe" to simulation parameters.

use crate::color::{self, wrap_hue};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Design palette used by the phone client. These colors keep their
/// hand-picked hues rather than their true hex hue.
pub const PALETTE: [(&str, f32); 8] = [
    ("#ff6b6b", 0.0),
    ("#4ecdc4", 180.0),
    ("#45b7d1", 200.0),
    ("#96ceb4", 120.0),
    ("#ffeaa7", 50.0),
    ("#fd79a8", 320.0),
    ("#a29bfe", 250.0),
    ("#fd7f6f", 10.0),
];

pub const MIN_SIZE_FACTOR: f32 = 1.0;
pub const MAX_SIZE_FACTOR: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Pattern {
    Sphere,
    Fountain,
    Star,
    Ring,
    #[default]
    Custom,
    Burst,
}

impl Pattern {
    pub const ALL: [Pattern; 6] = [
        Pattern::Sphere,
        Pattern::Fountain,
        Pattern::Star,
        Pattern::Ring,
        Pattern::Custom,
        Pattern::Burst,
    ];

    /// Case-insensitive lookup. Unknown names fall back to `Custom`.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "sphere" => Pattern::Sphere,
            "fountain" => Pattern::Fountain,
            "star" => Pattern::Star,
            "ring" => Pattern::Ring,
            "burst" => Pattern::Burst,
            _ => Pattern::Custom,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Pattern::Sphere => "sphere",
            Pattern::Fountain => "fountain",
            Pattern::Star => "star",
            Pattern::Ring => "ring",
            Pattern::Custom => "custom",
            Pattern::Burst => "burst",
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Abstract look of one firework, as sent by a trigger.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Vibe {
    pub color: String,
    pub size: f64,
    pub pattern: String,
    #[serde(default)]
    pub seed: Option<f64>,
}

impl Vibe {
    pub fn new(color: impl Into<String>, size: f64, pattern: Pattern, seed: Option<f64>) -> Self {
        Self {
            color: color.into(),
            size,
            pattern: pattern.as_str().to_string(),
            seed,
        }
    }

    /// The vibe a plain click launches with.
    pub fn default_click() -> Self {
        Self::new("#4ecdc4", 50.0, Pattern::Burst, Some(fastrand::f64()))
    }

    /// A palette color, size 20..80, burst or fountain.
    pub fn random() -> Self {
        let (color, _) = PALETTE[fastrand::usize(0..PALETTE.len() - 1)];
        let pattern = if fastrand::bool() { Pattern::Burst } else { Pattern::Fountain };
        Self::new(color, 20.0 + fastrand::f64() * 60.0, pattern, Some(fastrand::u32(0..1000) as f64))
    }

    /// Vibe for a shake sample: a fountain that grows with the shake.
    pub fn from_acceleration(y: f64) -> Self {
        Self::new("#4ecdc4", y.abs() * 8.0, Pattern::Fountain, Some(fastrand::u32(0..1000) as f64))
    }
}

/// Concrete parameters for one firework, derived from a [`Vibe`].
#[derive(Debug, Clone)]
pub struct VisualParams {
    pub hue: f32,
    pub size_factor: f32,
    pub pattern: Pattern,
    pub rng: fastrand::Rng,
}

impl VisualParams {
    pub fn from_vibe(vibe: &Vibe) -> Self {
        let mut rng = match vibe.seed {
            Some(seed) => fastrand::Rng::with_seed(seed.to_bits()),
            None => fastrand::Rng::new(),
        };
        let hue = color_to_hue(&vibe.color, &mut rng);

        Self {
            hue,
            size_factor: size_factor(vibe.size),
            pattern: Pattern::parse(&vibe.pattern),
            rng,
        }
    }

    /// Parameters for a launch with no vibe at all.
    pub fn random(mut rng: fastrand::Rng) -> Self {
        Self {
            hue: rng.f32() * 360.0,
            size_factor: MIN_SIZE_FACTOR,
            pattern: Pattern::Burst,
            rng,
        }
    }
}

/// `clamp(size / 30, 1, 4)`. Non-finite sizes map to the minimum.
pub fn size_factor(size: f64) -> f32 {
    let factor = (size / 30.0) as f32;
    if factor.is_nan() {
        return MIN_SIZE_FACTOR;
    }
    factor.clamp(MIN_SIZE_FACTOR, MAX_SIZE_FACTOR)
}

/// Palette hue, then true hex hue, then a hue drawn from `rng`.
pub fn color_to_hue(color: &str, rng: &mut fastrand::Rng) -> f32 {
    let key = color.trim().to_ascii_lowercase();
    if let Some(&(_, hue)) = PALETTE.iter().find(|(c, _)| *c == key) {
        return hue;
    }
    match color::parse_hex(&key) {
        Some(rgb) => color::hue_of(rgb),
        None => wrap_hue(rng.f32() * 360.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_factor_clamps_and_scales() {
        assert_eq!(size_factor(0.0), 1.0);
        assert_eq!(size_factor(150.0), 4.0);
        assert!((size_factor(90.0) - 3.0).abs() < 1e-6);
        assert_eq!(size_factor(-20.0), 1.0);
        assert_eq!(size_factor(f64::NAN), 1.0);
        assert_eq!(size_factor(f64::INFINITY), 4.0);
    }

    #[test]
    fn size_factor_is_monotonic() {
        let mut last = 0.0;
        for size in 0..200 {
            let f = size_factor(size as f64);
            assert!(f >= last);
            last = f;
        }
    }

    #[test]
    fn pattern_parse_falls_back_to_custom() {
        assert_eq!(Pattern::parse("star"), Pattern::Star);
        assert_eq!(Pattern::parse(" RING "), Pattern::Ring);
        assert_eq!(Pattern::parse("zigzag"), Pattern::Custom);
        assert_eq!(Pattern::parse(""), Pattern::Custom);
        for p in Pattern::ALL {
            assert_eq!(Pattern::parse(p.as_str()), p);
        }
    }

    #[test]
    fn palette_colors_keep_design_hues() {
        let mut rng = fastrand::Rng::with_seed(0);
        assert_eq!(color_to_hue("#4ecdc4", &mut rng), 180.0);
        assert_eq!(color_to_hue("#FF6B6B", &mut rng), 0.0);
        assert_eq!(color_to_hue("#a29bfe", &mut rng), 250.0);
    }

    #[test]
    fn other_hex_colors_use_true_hue() {
        let mut rng = fastrand::Rng::with_seed(0);
        assert!((color_to_hue("#00ff00", &mut rng) - 120.0).abs() < 0.01);
        assert!((color_to_hue("0000ff", &mut rng) - 240.0).abs() < 0.01);
    }

    #[test]
    fn unparseable_color_is_deterministic_under_seed() {
        let vibe = Vibe::new("sunset", 40.0, Pattern::Sphere, Some(42.0));
        let a = VisualParams::from_vibe(&vibe);
        let b = VisualParams::from_vibe(&vibe);
        assert_eq!(a.hue, b.hue);
        assert!((0.0..360.0).contains(&a.hue));
    }

    #[test]
    fn from_vibe_maps_every_field() {
        let vibe = Vibe::new("#45b7d1", 90.0, Pattern::Star, Some(3.0));
        let params = VisualParams::from_vibe(&vibe);
        assert_eq!(params.hue, 200.0);
        assert!((params.size_factor - 3.0).abs() < 1e-6);
        assert_eq!(params.pattern, Pattern::Star);
    }

    #[test]
    fn vibe_deserializes_without_seed() {
        let vibe: Vibe =
            serde_json::from_str(r##"{"color":"#ffeaa7","size":30,"pattern":"fountain"}"##).unwrap();
        assert_eq!(vibe.seed, None);
        assert_eq!(Pattern::parse(&vibe.pattern), Pattern::Fountain);
    }

    #[test]
    fn random_vibe_stays_in_range() {
        for _ in 0..50 {
            let vibe = Vibe::random();
            assert!((20.0..80.0).contains(&vibe.size));
            assert!(vibe.pattern == "burst" || vibe.pattern == "fountain");
            assert!(PALETTE.iter().any(|(c, _)| *c == vibe.color));
        }
    }

    #[test]
    fn harder_shakes_make_bigger_fountains() {
        let gentle = Vibe::from_acceleration(11.0);
        let hard = Vibe::from_acceleration(-20.0);
        assert_eq!(gentle.pattern, "fountain");
        assert_eq!(gentle.size, 88.0);
        assert_eq!(hard.size, 160.0);
        assert!(VisualParams::from_vibe(&hard).size_factor > VisualParams::from_vibe(&gentle).size_factor);
        let seed = hard.seed.unwrap();
        assert!(seed.fract() == 0.0 && (0.0..1000.0).contains(&seed));
    }
}
