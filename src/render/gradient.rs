//! Gradient geometry and color ramps.
//!
//! ## Linear
//!
//! ```text
//!            end (100%)
//!               ▲
//!               │  angle 0° = bottom-to-top, clockwise positive
//!        ┌──────┼──────┐
//!        │      ●      │   axis through the canvas center,
//!        │      │      │   length = |cos α|·w + |sin α|·h
//!        └──────┼──────┘   where α = angle − 90°
//!               │
//!           start (0%)
//! ```
//!
//! ## Radial
//!
//! Center at `center_percent` of the canvas, radius `max(w, h) / 1.5`.

use image::{Rgba, RgbaImage};
use rayon::prelude::*;

use crate::color::Rgba as Color;
use crate::design::{GradientKind, GradientSpec, GradientStop, Percent2};
use crate::shader::dist;

/// Ordered stops ready for sampling.
///
/// Stops sharing an offset collapse to the last one given.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorRamp {
    stops: Vec<(f32, Color)>,
}

impl ColorRamp {
    pub fn new(stops: &[GradientStop]) -> Self {
        let mut sorted: Vec<(f32, Color)> = stops
            .iter()
            .map(|s| (s.offset.clamp(0.0, 1.0), s.color))
            .collect();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut ramp: Vec<(f32, Color)> = Vec::with_capacity(sorted.len());
        for (offset, color) in sorted {
            match ramp.last_mut() {
                Some(last) if last.0 == offset => last.1 = color,
                _ => ramp.push((offset, color)),
            }
        }
        Self { stops: ramp }
    }

    pub fn stops(&self) -> &[(f32, Color)] {
        &self.stops
    }

    /// Color at position `t`. Flat outside the first/last stop; white if empty.
    pub fn sample(&self, t: f32) -> Color {
        let (Some(first), Some(last)) = (self.stops.first(), self.stops.last()) else {
            return Color::WHITE;
        };
        if t <= first.0 {
            return first.1;
        }
        if t >= last.0 {
            return last.1;
        }
        for pair in self.stops.windows(2) {
            let (o0, c0) = pair[0];
            let (o1, c1) = pair[1];
            if t <= o1 {
                let span = o1 - o0;
                let local = if span > 0.0 { (t - o0) / span } else { 1.0 };
                return c0.lerp(c1, local);
            }
        }
        last.1
    }
}

/// Start and end points of a linear gradient in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearGeometry {
    pub start: (f32, f32),
    pub end: (f32, f32),
}

impl LinearGeometry {
    pub fn new(angle_degrees: f32, width: f32, height: f32) -> Self {
        // Period 360: 360° must produce bit-identical geometry to 0°
        let angle = angle_degrees.rem_euclid(360.0);
        let (sin_a, cos_a) = (angle - 90.0).to_radians().sin_cos();
        let length = cos_a.abs() * width + sin_a.abs() * height;
        let (cx, cy) = (width / 2.0, height / 2.0);
        let (hx, hy) = (cos_a * length / 2.0, sin_a * length / 2.0);
        Self {
            start: (cx - hx, cy - hy),
            end: (cx + hx, cy + hy),
        }
    }

    pub fn length(&self) -> f32 {
        dist(self.end.0, self.end.1, self.start.0, self.start.1)
    }

    /// Projection of `(x, y)` onto the axis: 0 at start, 1 at end.
    #[inline]
    pub fn param(&self, x: f32, y: f32) -> f32 {
        let (dx, dy) = (self.end.0 - self.start.0, self.end.1 - self.start.1);
        let len_sq = dx * dx + dy * dy;
        if len_sq <= f32::EPSILON {
            return 0.0;
        }
        ((x - self.start.0) * dx + (y - self.start.1) * dy) / len_sq
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialGeometry {
    pub center: (f32, f32),
    pub radius: f32,
}

impl RadialGeometry {
    pub fn new(center_percent: Percent2, width: f32, height: f32) -> Self {
        Self {
            center: (center_percent.x * width, center_percent.y * height),
            radius: width.max(height) / 1.5,
        }
    }

    #[inline]
    pub fn param(&self, x: f32, y: f32) -> f32 {
        if self.radius <= 0.0 {
            return 0.0;
        }
        dist(x, y, self.center.0, self.center.1) / self.radius
    }
}

enum Geometry {
    Linear(LinearGeometry),
    Radial(RadialGeometry),
}

impl Geometry {
    #[inline]
    fn param(&self, x: f32, y: f32) -> f32 {
        match self {
            Geometry::Linear(g) => g.param(x, y),
            Geometry::Radial(g) => g.param(x, y),
        }
    }
}

/// Rasterize a gradient over a `width × height` layer, sampling pixel centers.
pub fn render_gradient(spec: &GradientSpec, width: u32, height: u32) -> RgbaImage {
    let (w, h) = (width as f32, height as f32);
    let geometry = match spec.kind {
        GradientKind::Linear { angle_degrees } => {
            Geometry::Linear(LinearGeometry::new(angle_degrees, w, h))
        }
        GradientKind::Radial { center_percent } => {
            Geometry::Radial(RadialGeometry::new(center_percent, w, h))
        }
    };
    let ramp = ColorRamp::new(&spec.stops);

    let mut layer = RgbaImage::new(width, height);
    let row_len = width as usize * 4;
    if row_len == 0 {
        return layer;
    }

    let buffer: &mut [u8] = &mut layer;
    buffer
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            let py = y as f32 + 0.5;
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                let t = geometry.param(x as f32 + 0.5, py);
                let Rgba(rgba) = ramp.sample(t).to_pixel();
                px.copy_from_slice(&rgba);
            }
        });

    layer
}
