//! Colour helpers.

use handspin_types::{Hsv, Rgb};

/// Resting colour of the controlled object.
pub const AZURE: Rgb = Rgb::new(0.0, 0.5, 1.0);

/// Convert HSV (hue in degrees, any range) to RGB.
pub fn hsv_to_rgb(hsv: Hsv) -> Rgb {
    let h = hsv.h.rem_euclid(360.0) / 60.0;
    let c = hsv.v * hsv.s;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let m = hsv.v - c;

    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    Rgb::new(r + m, g + m, b + m)
}
