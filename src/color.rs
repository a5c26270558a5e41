//! Color helpers shared by the mapper and the canvas.

pub type Rgb = (u8, u8, u8);

/// Parses `RRGGBB`, with or without a leading `#`.
pub fn parse_hex(hex: &str) -> Option<Rgb> {
    let hex = hex.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}

/// Hue in degrees of an RGB color. Greys have no hue and map to 0.
pub fn hue_of(rgb: Rgb) -> f32 {
    let r = rgb.0 as f32 / 255.0;
    let g = rgb.1 as f32 / 255.0;
    let b = rgb.2 as f32 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;
    if delta <= f32::EPSILON {
        return 0.0;
    }

    let hue = if max == r {
        60.0 * ((g - b) / delta)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };

    wrap_hue(hue)
}

/// Wraps any angle in degrees into `[0, 360)`.
pub fn wrap_hue(hue: f32) -> f32 {
    let wrapped = hue.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negatives
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// HSB (hue in degrees, saturation and brightness in 0..=1) to RGB.
pub fn hsb_to_rgb(hue: f32, saturation: f32, brightness: f32) -> Rgb {
    let h = wrap_hue(hue) / 60.0;
    let s = saturation.clamp(0.0, 1.0);
    let v = brightness.clamp(0.0, 1.0);

    let c = v * s;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    (
        ((r + m) * 255.0).round() as u8,
        ((g + m) * 255.0).round() as u8,
        ((b + m) * 255.0).round() as u8,
    )
}

/// Linear blend from `base` toward `over` by `t` in 0..=1.
pub fn blend(base: Rgb, over: Rgb, t: f32) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    (
        (base.0 as f32 * (1.0 - t) + over.0 as f32 * t).round() as u8,
        (base.1 as f32 * (1.0 - t) + over.1 as f32 * t).round() as u8,
        (base.2 as f32 * (1.0 - t) + over.2 as f32 * t).round() as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_with_and_without_hash() {
        assert_eq!(parse_hex("#ff6b6b"), Some((255, 107, 107)));
        assert_eq!(parse_hex("1a1b26"), Some((0x1a, 0x1b, 0x26)));
        assert_eq!(parse_hex("#fff"), None);
        assert_eq!(parse_hex("zzzzzz"), None);
    }

    #[test]
    fn primary_hues() {
        assert_eq!(hue_of((255, 0, 0)), 0.0);
        assert!((hue_of((0, 255, 0)) - 120.0).abs() < 0.01);
        assert!((hue_of((0, 0, 255)) - 240.0).abs() < 0.01);
        assert_eq!(hue_of((128, 128, 128)), 0.0);
    }

    #[test]
    fn hsb_round_trips_primaries() {
        assert_eq!(hsb_to_rgb(0.0, 1.0, 1.0), (255, 0, 0));
        assert_eq!(hsb_to_rgb(120.0, 1.0, 1.0), (0, 255, 0));
        assert_eq!(hsb_to_rgb(240.0, 1.0, 1.0), (0, 0, 255));
        assert_eq!(hsb_to_rgb(360.0, 1.0, 1.0), (255, 0, 0));
        assert_eq!(hsb_to_rgb(42.0, 1.0, 0.0), (0, 0, 0));
    }

    #[test]
    fn wrap_hue_handles_negatives() {
        assert!((wrap_hue(-30.0) - 330.0).abs() < 1e-4);
        assert!((wrap_hue(390.0) - 30.0).abs() < 1e-4);
        assert!(wrap_hue(-1e-9) < 360.0);
    }

    #[test]
    fn blend_endpoints() {
        assert_eq!(blend((0, 0, 0), (200, 100, 50), 0.0), (0, 0, 0));
        assert_eq!(blend((0, 0, 0), (200, 100, 50), 1.0), (200, 100, 50));
        assert_eq!(blend((0, 0, 0), (200, 100, 50), 0.5), (100, 50, 25));
    }
}
