//! Coordinate transformation functions.
//!
//! Screen space is y-down, so a positive angle turns clockwise on screen.

/// Rotate a point around the origin (angle in degrees).
#[inline]
pub fn rotate_deg(x: f32, y: f32, angle_deg: f32) -> (f32, f32) {
    let (sin_a, cos_a) = angle_deg.to_radians().sin_cos();
    (x * cos_a - y * sin_a, x * sin_a + y * cos_a)
}

/// Rotate `(x, y)` around `(cx, cy)` by `angle_deg`.
#[inline]
pub fn rotate_about_deg(x: f32, y: f32, cx: f32, cy: f32, angle_deg: f32) -> (f32, f32) {
    let (rx, ry) = rotate_deg(x - cx, y - cy, angle_deg);
    (rx + cx, ry + cy)
}

/// Angle in degrees of the vector from `(cx, cy)` to `(x, y)`, in (-180, 180].
#[inline]
pub fn angle_deg(x: f32, y: f32, cx: f32, cy: f32) -> f32 {
    (y - cy).atan2(x - cx).to_degrees()
}

/// Half extents of the axis-aligned box enclosing a rotated rectangle.
#[inline]
pub fn rotated_half_extents(half_w: f32, half_h: f32, angle_deg: f32) -> (f32, f32) {
    let (sin_a, cos_a) = angle_deg.to_radians().sin_cos();
    let (sin_a, cos_a) = (sin_a.abs(), cos_a.abs());
    (half_w * cos_a + half_h * sin_a, half_w * sin_a + half_h * cos_a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotate_90_is_clockwise_on_screen() {
        // +x rotated 90 degrees points down (+y) in y-down space
        let (x, y) = rotate_deg(1.0, 0.0, 90.0);
        assert!(x.abs() < 1e-6);
        assert!((y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_rotate_about_roundtrip() {
        let (x, y) = rotate_about_deg(15.0, 4.0, 10.0, 10.0, 37.0);
        let (x2, y2) = rotate_about_deg(x, y, 10.0, 10.0, -37.0);
        assert!((x2 - 15.0).abs() < 1e-4);
        assert!((y2 - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_angle_deg() {
        assert!((angle_deg(1.0, 0.0, 0.0, 0.0)).abs() < 1e-6);
        assert!((angle_deg(0.0, 1.0, 0.0, 0.0) - 90.0).abs() < 1e-4);
        assert!((angle_deg(-1.0, 0.0, 0.0, 0.0) - 180.0).abs() < 1e-4);
    }

    #[test]
    fn test_rotated_half_extents() {
        let (hw, hh) = rotated_half_extents(10.0, 10.0, 45.0);
        assert!((hw - 10.0 * 2f32.sqrt()).abs() < 1e-3);
        assert!((hh - hw).abs() < 1e-4);
    }
}
