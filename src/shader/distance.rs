//! Distance functions for spatial calculations.

/// Euclidean distance between two points.
#[inline]
pub fn dist(x: f32, y: f32, cx: f32, cy: f32) -> f32 {
    let dx = x - cx;
    let dy = y - cy;
    (dx * dx + dy * dy).sqrt()
}

/// Signed distance from a point to a rounded box centered at the origin.
///
/// `half_w`/`half_h` are the box half extents, `radius` the corner radius
/// (clamped to the smaller half extent). Negative inside, positive outside.
#[inline]
pub fn sd_rounded_box(x: f32, y: f32, half_w: f32, half_h: f32, radius: f32) -> f32 {
    let r = radius.clamp(0.0, half_w.min(half_h));
    let qx = x.abs() - (half_w - r);
    let qy = y.abs() - (half_h - r);
    let outside = dist(qx.max(0.0), qy.max(0.0), 0.0, 0.0);
    let inside = qx.max(qy).min(0.0);
    outside + inside - r
}

/// Anti-aliased coverage of a pixel whose center lies at signed distance `sd`.
///
/// One pixel wide ramp: fully covered at `sd <= -0.5`, empty at `sd >= 0.5`.
#[inline]
pub fn coverage(sd: f32) -> f32 {
    (0.5 - sd).clamp(0.0, 1.0)
}
