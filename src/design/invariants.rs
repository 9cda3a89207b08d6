//! Clamping and normalization rules for design values.
//!
//! Every write into a [`super::DesignState`] goes through these, so sliders
//! and pointer handlers can hand over raw values without pre-validating.
//! NaN never survives: it maps to the field's default.

use super::types::{DeviceCanvas, Percent2};

pub const MIN_SCALE: f32 = 0.1;
pub const MAX_SCALE: f32 = 1.0;
pub const DEFAULT_SCALE: f32 = 0.5;

pub const MIN_BORDER_RATIO: f32 = -1.0;
pub const MAX_BORDER_RATIO: f32 = 200.0;

pub const MIN_CORNER_RATIO: f32 = 0.0;
pub const MAX_CORNER_RATIO: f32 = 100.0;

/// Clamp a QR scale into [0.1, 1.0].
#[inline]
pub fn clamp_scale(scale: f32) -> f32 {
    if scale.is_nan() {
        return DEFAULT_SCALE;
    }
    scale.clamp(MIN_SCALE, MAX_SCALE)
}

/// Normalize an angle into (-180, 180].
#[inline]
pub fn normalize_rotation(degrees: f32) -> f32 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let r = degrees.rem_euclid(360.0);
    if r > 180.0 { r - 360.0 } else { r }
}

/// Clamp grain intensity into [0, 1].
#[inline]
pub fn clamp_grain(grain: f32) -> f32 {
    if grain.is_nan() {
        return 0.0;
    }
    grain.clamp(0.0, 1.0)
}

/// Clamp a gradient stop offset into [0, 1].
#[inline]
pub fn clamp_offset(offset: f32) -> f32 {
    if offset.is_nan() {
        return 0.0;
    }
    offset.clamp(0.0, 1.0)
}

#[inline]
pub fn clamp_border_ratio(ratio: f32) -> f32 {
    if ratio.is_nan() {
        return 0.0;
    }
    ratio.clamp(MIN_BORDER_RATIO, MAX_BORDER_RATIO)
}

#[inline]
pub fn clamp_corner_ratio(ratio: f32) -> f32 {
    if ratio.is_nan() {
        return 0.0;
    }
    ratio.clamp(MIN_CORNER_RATIO, MAX_CORNER_RATIO)
}

/// Side length in device pixels of the QR container at `scale`.
#[inline]
pub fn qr_side_px(canvas: &DeviceCanvas, scale: f32) -> f32 {
    clamp_scale(scale) * canvas.min_side()
}

/// Width of the drawn artifact over the QR side. A negative border shrinks
/// the plate under the QR, so the QR itself is the outer edge.
#[inline]
pub fn footprint_factor(border_ratio: f32) -> f32 {
    1.0 + clamp_border_ratio(border_ratio).max(0.0) / 100.0
}

/// Axis-aligned half extent over the half side for a square turned by
/// `rotation_degrees`. 1 at multiples of 90, sqrt(2) at 45.
#[inline]
pub fn rotation_extent_factor(rotation_degrees: f32) -> f32 {
    let r = normalize_rotation(rotation_degrees).to_radians();
    r.cos().abs() + r.sin().abs()
}

/// Largest scale at which the rotated plate still fits the canvas's shorter side.
pub fn max_fit_scale(border_ratio: f32, rotation_degrees: f32) -> f32 {
    let factor = footprint_factor(border_ratio) * rotation_extent_factor(rotation_degrees);
    (1.0 / factor).clamp(MIN_SCALE, MAX_SCALE)
}

/// Clamp `scale` into range and down to [`max_fit_scale`].
#[inline]
pub fn clamp_fitted_scale(scale: f32, border_ratio: f32, rotation_degrees: f32) -> f32 {
    clamp_scale(scale).min(max_fit_scale(border_ratio, rotation_degrees))
}

/// Half of the axis-aligned bounding box of the rotated plate, in device pixels.
pub fn artifact_half_extent(
    canvas: &DeviceCanvas,
    scale: f32,
    border_ratio: f32,
    rotation_degrees: f32,
) -> f32 {
    qr_side_px(canvas, scale) / 2.0
        * footprint_factor(border_ratio)
        * rotation_extent_factor(rotation_degrees)
}

/// Clamp a center position so a box of half side `half_extent_px` around it
/// stays inside the canvas. Pass [`artifact_half_extent`] so the plate and
/// its rotated corners are covered, not only the QR square.
pub fn clamp_position(position: Percent2, canvas: &DeviceCanvas, half_extent_px: f32) -> Percent2 {
    let (w, h) = canvas.size_f32();
    let half_x = (half_extent_px / w).min(0.5);
    let half_y = (half_extent_px / h).min(0.5);

    let axis = |v: f32, half: f32| {
        if v.is_nan() {
            0.5
        } else {
            v.clamp(half, 1.0 - half)
        }
    };

    Percent2::new(axis(position.x, half_x), axis(position.y, half_y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_scale_range() {
        for s in [-10.0, -0.0, 0.05, 0.1, 0.42, 1.0, 7.5, f32::INFINITY, f32::NEG_INFINITY] {
            let c = clamp_scale(s);
            assert!((MIN_SCALE..=MAX_SCALE).contains(&c), "{} -> {}", s, c);
        }
        assert_eq!(clamp_scale(f32::NAN), DEFAULT_SCALE);
        assert_eq!(clamp_scale(0.42), 0.42);
    }

    #[test]
    fn test_normalize_rotation_range() {
        for r in [-720.0, -540.0, -180.0, -179.5, 0.0, 45.0, 180.0, 181.0, 359.0, 360.0, 1000.25] {
            let n = normalize_rotation(r);
            assert!(n > -180.0 && n <= 180.0, "{} -> {}", r, n);
        }
        assert_eq!(normalize_rotation(-180.0), 180.0);
        assert_eq!(normalize_rotation(181.0), -179.0);
        assert_eq!(normalize_rotation(f32::NAN), 0.0);
    }

    #[test]
    fn test_normalize_rotation_periodic() {
        for r in [-170.25, -45.0, 0.0, 43.5, 90.0, 179.75] {
            assert_eq!(normalize_rotation(r + 360.0), normalize_rotation(r));
        }
    }

    #[test]
    fn test_ratios_clamped() {
        assert_eq!(clamp_border_ratio(-5.0), -1.0);
        assert_eq!(clamp_border_ratio(500.0), 200.0);
        assert_eq!(clamp_corner_ratio(-1.0), 0.0);
        assert_eq!(clamp_corner_ratio(150.0), 100.0);
        assert_eq!(clamp_grain(1.5), 1.0);
    }

    #[test]
    fn test_clamp_position_keeps_box_inside() {
        let canvas = DeviceCanvas::new(1000, 2000);
        for scale in [0.1, 0.5, 1.0] {
            for (x, y) in [(-1.0, -1.0), (0.0, 1.0), (0.5, 0.5), (2.0, 0.3)] {
                let half = qr_side_px(&canvas, scale) / 2.0;
                let p = clamp_position(Percent2::new(x, y), &canvas, half);
                let (cx, cy) = (p.x * 1000.0, p.y * 2000.0);
                assert!(cx - half >= -1e-3 && cx + half <= 1000.0 + 1e-3);
                assert!(cy - half >= -1e-3 && cy + half <= 2000.0 + 1e-3);
            }
        }
    }

    #[test]
    fn test_full_extent_pins_short_axis_to_center() {
        let canvas = DeviceCanvas::new(1000, 2000);
        let p = clamp_position(Percent2::new(0.1, 0.1), &canvas, 500.0);
        assert!((p.x - 0.5).abs() < 1e-6);
        assert!((p.y - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_footprint_counts_only_growing_borders() {
        assert!((footprint_factor(8.0) - 1.08).abs() < 1e-6);
        assert_eq!(footprint_factor(-1.0), 1.0);
        assert_eq!(footprint_factor(500.0), 3.0);
    }

    #[test]
    fn test_rotation_extent() {
        assert!((rotation_extent_factor(0.0) - 1.0).abs() < 1e-6);
        assert!((rotation_extent_factor(90.0) - 1.0).abs() < 1e-6);
        assert!((rotation_extent_factor(45.0) - std::f32::consts::SQRT_2).abs() < 1e-5);
        assert!((rotation_extent_factor(-135.0) - std::f32::consts::SQRT_2).abs() < 1e-5);
    }

    #[test]
    fn test_fit_scale_keeps_plate_on_short_side() {
        for ratio in [-1.0, 0.0, 8.0, 50.0, 200.0] {
            for rotation in [0.0, 10.0, 45.0, 90.0, 170.0] {
                let scale = clamp_fitted_scale(1.0, ratio, rotation);
                assert!((MIN_SCALE..=MAX_SCALE).contains(&scale));
                let canvas = DeviceCanvas::new(1000, 2000);
                let half = artifact_half_extent(&canvas, scale, ratio, rotation);
                assert!(half <= 500.0 + 1e-2, "{} {} -> {}", ratio, rotation, half);
            }
        }
        assert_eq!(clamp_fitted_scale(1.0, 0.0, 0.0), 1.0);
        assert_eq!(clamp_fitted_scale(0.3, 8.0, 45.0), 0.3);
    }
}
