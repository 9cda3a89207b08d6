//! Anti-aliased shape rasterization onto RGBA layers.
//!
//! Shapes are evaluated per pixel with signed distance functions from
//! [`crate::shader`] and blended source-over with coverage as opacity.

use image::RgbaImage;

use crate::color::Rgba;
use crate::render::composer::{BlendMode, blend_pixel};
use crate::shader::{coverage, rotate_deg, rotated_half_extents, sd_rounded_box};

/// A square centered at `(cx, cy)` with rotation about its center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotatedSquare {
    pub cx: f32,
    pub cy: f32,
    pub half: f32,
    pub rotation_deg: f32,
}

impl RotatedSquare {
    pub fn new(cx: f32, cy: f32, half: f32, rotation_deg: f32) -> Self {
        Self {
            cx,
            cy,
            half,
            rotation_deg,
        }
    }

    /// Map a layer point into the square's unrotated local frame.
    #[inline]
    pub fn to_local(&self, x: f32, y: f32) -> (f32, f32) {
        rotate_deg(x - self.cx, y - self.cy, -self.rotation_deg)
    }

    /// Map a local point back onto the layer.
    #[inline]
    pub fn to_layer(&self, lx: f32, ly: f32) -> (f32, f32) {
        let (x, y) = rotate_deg(lx, ly, self.rotation_deg);
        (x + self.cx, y + self.cy)
    }

    /// Corners in layer space: top-left, top-right, bottom-right, bottom-left.
    pub fn corners(&self) -> [(f32, f32); 4] {
        let h = self.half;
        [
            self.to_layer(-h, -h),
            self.to_layer(h, -h),
            self.to_layer(h, h),
            self.to_layer(-h, h),
        ]
    }

    /// Pixel bounds `(x0, y0, x1, y1)` covering the square plus `pad`,
    /// clipped to a `width × height` layer. `None` when fully outside.
    pub fn pixel_bounds(&self, pad: f32, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let (ex, ey) = rotated_half_extents(self.half, self.half, self.rotation_deg);
        let x0 = (self.cx - ex - pad).floor().max(0.0);
        let y0 = (self.cy - ey - pad).floor().max(0.0);
        let x1 = (self.cx + ex + pad).ceil().min(width as f32);
        let y1 = (self.cy + ey + pad).ceil().min(height as f32);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }
}

/// Fill a rotated rounded square.
pub fn fill_rounded_square(layer: &mut RgbaImage, square: RotatedSquare, radius: f32, color: Rgba) {
    if square.half <= 0.0 || color.a == 0 {
        return;
    }
    let Some((x0, y0, x1, y1)) = square.pixel_bounds(1.0, layer.width(), layer.height()) else {
        return;
    };
    let src = color.to_pixel();
    for y in y0..y1 {
        for x in x0..x1 {
            let (lx, ly) = square.to_local(x as f32 + 0.5, y as f32 + 0.5);
            let cov = coverage(sd_rounded_box(lx, ly, square.half, square.half, radius));
            if cov > 0.0 {
                blend_pixel(layer.get_pixel_mut(x, y), src, BlendMode::Normal, cov);
            }
        }
    }
}

/// Stroke the outline of a rotated square, centered on its edge.
pub fn stroke_square(layer: &mut RgbaImage, square: RotatedSquare, thickness: f32, color: Rgba) {
    let half_t = thickness.max(0.0) / 2.0;
    if half_t <= 0.0 || color.a == 0 {
        return;
    }
    let Some((x0, y0, x1, y1)) = square.pixel_bounds(half_t + 1.0, layer.width(), layer.height())
    else {
        return;
    };
    let src = color.to_pixel();
    for y in y0..y1 {
        for x in x0..x1 {
            let (lx, ly) = square.to_local(x as f32 + 0.5, y as f32 + 0.5);
            let sd = sd_rounded_box(lx, ly, square.half, square.half, 0.0).abs() - half_t;
            let cov = coverage(sd);
            if cov > 0.0 {
                blend_pixel(layer.get_pixel_mut(x, y), src, BlendMode::Normal, cov);
            }
        }
    }
}

/// Full-height vertical line centered on `x`.
pub fn vertical_guide(layer: &mut RgbaImage, x: f32, thickness: f32, color: Rgba) {
    let half_t = thickness / 2.0;
    let x0 = (x - half_t - 1.0).floor().max(0.0) as u32;
    let x1 = ((x + half_t + 1.0).ceil().max(0.0) as u32).min(layer.width());
    let src = color.to_pixel();
    for px in x0..x1 {
        let cov = coverage((px as f32 + 0.5 - x).abs() - half_t);
        if cov <= 0.0 {
            continue;
        }
        for py in 0..layer.height() {
            blend_pixel(layer.get_pixel_mut(px, py), src, BlendMode::Normal, cov);
        }
    }
}

/// Full-width horizontal line centered on `y`.
pub fn horizontal_guide(layer: &mut RgbaImage, y: f32, thickness: f32, color: Rgba) {
    let half_t = thickness / 2.0;
    let y0 = (y - half_t - 1.0).floor().max(0.0) as u32;
    let y1 = ((y + half_t + 1.0).ceil().max(0.0) as u32).min(layer.height());
    let src = color.to_pixel();
    for py in y0..y1 {
        let cov = coverage((py as f32 + 0.5 - y).abs() - half_t);
        if cov <= 0.0 {
            continue;
        }
        for px in 0..layer.width() {
            blend_pixel(layer.get_pixel_mut(px, py), src, BlendMode::Normal, cov);
        }
    }
}
