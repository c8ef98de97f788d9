//! Continuous colormaps mapping `[0, 1]` to RGB

use plotters::style::RGBColor;

/// Diverging blue → grey → red map, for values centred on zero
pub fn coolwarm(t: f64) -> RGBColor {
    const COLD: (f64, f64, f64) = (59.0, 76.0, 192.0);
    const MID: (f64, f64, f64) = (221.0, 221.0, 221.0);
    const WARM: (f64, f64, f64) = (180.0, 4.0, 38.0);

    if !t.is_finite() {
        return RGBColor(160, 160, 160);
    }
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        lerp(COLD, MID, t * 2.0)
    } else {
        lerp(MID, WARM, (t - 0.5) * 2.0)
    }
}

/// Rainbow map from dark blue through cyan, yellow to dark red
pub fn jet(t: f64) -> RGBColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let channel = |offset: f64| ((1.5 - (4.0 * t - offset).abs()).clamp(0.0, 1.0) * 255.0).round() as u8;
    RGBColor(channel(3.0), channel(2.0), channel(1.0))
}

/// Position of `value` in `[min, max]`, 0.5 for an empty range
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    if max > min {
        (value - min) / (max - min)
    } else {
        0.5
    }
}

fn lerp(a: (f64, f64, f64), b: (f64, f64, f64), t: f64) -> RGBColor {
    let mix = |x: f64, y: f64| (x + (y - x) * t).round() as u8;
    RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}
