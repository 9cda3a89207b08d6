//! Blending and interpolation functions.
//!
//! Channel values are normalized to [0, 1] where 0 is black and 1 is full
//! intensity.

/// Linear interpolation between two values.
///
/// Returns `a` when `t=0`, `b` when `t=1`, and linear blend in between.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Smoothstep interpolation.
///
/// Returns 0 when x <= edge0, 1 when x >= edge1, and a Hermite curve in between.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Multiply blend: darkens.
#[inline]
pub fn blend_multiply(base: f32, blend: f32) -> f32 {
    base * blend
}

/// Screen blend: lightens.
#[inline]
pub fn blend_screen(base: f32, blend: f32) -> f32 {
    1.0 - (1.0 - base) * (1.0 - blend)
}

/// Overlay blend.
///
/// Multiply in the shadows of `base`, screen in its highlights. A mid-gray
/// blend value leaves the base untouched, which is what makes it suitable
/// for grain.
#[inline]
pub fn blend_overlay(base: f32, blend: f32) -> f32 {
    if base < 0.5 {
        2.0 * base * blend
    } else {
        1.0 - 2.0 * (1.0 - base) * (1.0 - blend)
    }
}

/// Soft light blend (W3C compositing formula).
#[inline]
pub fn blend_soft_light(base: f32, blend: f32) -> f32 {
    if blend <= 0.5 {
        base - (1.0 - 2.0 * blend) * base * (1.0 - base)
    } else {
        let d = if base <= 0.25 {
            ((16.0 * base - 12.0) * base + 4.0) * base
        } else {
            base.sqrt()
        };
        base + (2.0 * blend - 1.0) * (d - base)
    }
}

/// Convert a normalized channel back to a byte, rounding to nearest.
#[inline]
pub fn to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}
