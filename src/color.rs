//! Speed-to-color ramp.

use crate::config::{COLOR_RAMP_HIGH, COLOR_RAMP_LOW, MAX_COLOR_SPEED};

/// An 8-bit RGBA color as handed to the canvas.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Rgba {
        Rgba { r, g, b, a: 255 }
    }

    pub const fn gray(level: u8) -> Rgba {
        Rgba::rgb(level, level, level)
    }

    /// Linear-light components for an sRGB render target.
    pub fn to_linear(self) -> [f32; 4] {
        [
            srgb_to_linear(self.r),
            srgb_to_linear(self.g),
            srgb_to_linear(self.b),
            self.a as f32 / 255.0,
        ]
    }

    /// Components as stored, scaled to `0..=1`.
    pub fn to_unorm(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }
}

fn srgb_to_linear(c: u8) -> f32 {
    let c = c as f32 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Linearly maps `value` from `[in_min, in_max]` onto `[out_min, out_max]`,
/// clamping to the output range when `value` falls outside the input range.
pub fn map_range(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    if (in_max - in_min).abs() < f32::EPSILON {
        return out_min;
    }
    let mapped = (value - in_min) / (in_max - in_min) * (out_max - out_min) + out_min;
    if out_max < out_min {
        mapped.clamp(out_max, out_min)
    } else {
        mapped.clamp(out_min, out_max)
    }
}

/// Slow particles are orange-red, fast ones shift through yellow to red.
pub fn speed_color(speed: f32) -> Rgba {
    let code = map_range(speed, 0.0, MAX_COLOR_SPEED, COLOR_RAMP_LOW, COLOR_RAMP_HIGH) as u8;
    Rgba::rgb(code, 255 - code, 0)
}
