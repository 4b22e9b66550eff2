//! Particle color palettes.
//!
//! Colors are straight-alpha RGBA stored in a [`Vec4`], each channel 0.0-1.0.

use glam::Vec4;
use serde::{Deserialize, Serialize};

/// Palette mapping a particle's hue seed to a color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Palette {
    /// Warm gold, steel blue and muted violet bands.
    #[default]
    Accretion,
    /// Single warm band from deep red to amber.
    Ember,
}

impl Palette {
    /// Color for a hue seed in `[0, 1)` with the given opacity.
    pub fn color(&self, hue_seed: f32, opacity: f32) -> Vec4 {
        let h = hue_seed.clamp(0.0, 1.0);
        match self {
            Palette::Accretion => {
                if h < 0.4 {
                    hsla(35.0 + h * 20.0, 0.70, 0.55, opacity)
                } else if h < 0.7 {
                    hsla(220.0 + (h - 0.4) * 60.0, 0.40, 0.45, opacity)
                } else {
                    hsla(280.0 + (h - 0.7) * 40.0, 0.30, 0.40, opacity)
                }
            }
            Palette::Ember => hsla(8.0 + h * 32.0, 0.80, 0.45 + h * 0.12, opacity),
        }
    }
}

/// Color from 8-bit RGB and a float alpha.
pub fn rgba(rgb: [u8; 3], alpha: f32) -> Vec4 {
    Vec4::new(
        rgb[0] as f32 / 255.0,
        rgb[1] as f32 / 255.0,
        rgb[2] as f32 / 255.0,
        alpha,
    )
}

/// Convert HSL to RGBA.
///
/// * `hue` - degrees, wraps at 360
/// * `saturation`, `lightness` - 0.0 to 1.0
pub fn hsla(hue: f32, saturation: f32, lightness: f32, alpha: f32) -> Vec4 {
    let h = hue.rem_euclid(360.0) / 60.0;
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let m = lightness - c / 2.0;

    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    Vec4::new(r + m, g + m, b + m, alpha)
}
