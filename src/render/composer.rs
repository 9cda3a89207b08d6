//! Blend modes and layer compositing.
//!
//! Layers are straight-alpha RGBA buffers. Compositing follows the W3C
//! separable blend model: the blend function mixes colors where the
//! backdrop is opaque, then the result is placed source-over.

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::shader::{blend_multiply, blend_overlay, blend_screen, blend_soft_light, to_byte};

/// Blend modes for compositing layers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Source-over: top layer replaces bottom based on alpha.
    #[default]
    Normal,
    /// Multiply - darkens.
    Multiply,
    /// Screen - lightens.
    Screen,
    /// Overlay - increases contrast; mid-gray is neutral. Used for grain.
    Overlay,
    /// Soft light - gentler overlay.
    SoftLight,
}

impl BlendMode {
    /// Mix a backdrop channel with a source channel, both in [0, 1].
    #[inline]
    pub fn apply(self, base: f32, blend: f32) -> f32 {
        match self {
            BlendMode::Normal => blend,
            BlendMode::Multiply => blend_multiply(base, blend),
            BlendMode::Screen => blend_screen(base, blend),
            BlendMode::Overlay => blend_overlay(base, blend),
            BlendMode::SoftLight => blend_soft_light(base, blend),
        }
    }
}

/// Blend `src` onto `dst` with an extra `opacity` multiplier on the source alpha.
#[inline]
pub fn blend_pixel(dst: &mut Rgba<u8>, src: Rgba<u8>, mode: BlendMode, opacity: f32) {
    let sa = src[3] as f32 / 255.0 * opacity.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return;
    }
    let da = dst[3] as f32 / 255.0;
    let oa = sa + da * (1.0 - sa);

    for c in 0..3 {
        let s = src[c] as f32 / 255.0;
        let d = dst[c] as f32 / 255.0;
        let mixed = (1.0 - da) * s + da * mode.apply(d, s);
        dst[c] = to_byte((sa * mixed + da * (1.0 - sa) * d) / oa);
    }
    dst[3] = to_byte(oa);
}

/// Composite a whole layer onto `dst` at the origin.
///
/// Only the overlapping region is touched when the sizes differ.
pub fn composite(dst: &mut RgbaImage, src: &RgbaImage, mode: BlendMode, opacity: f32) {
    if opacity <= 0.0 {
        return;
    }
    let width = dst.width().min(src.width());
    let height = dst.height().min(src.height());
    for y in 0..height {
        for x in 0..width {
            let s = *src.get_pixel(x, y);
            blend_pixel(dst.get_pixel_mut(x, y), s, mode, opacity);
        }
    }
}
