//! Snapping rules for dragged positions and rotation angles.

use crate::design::invariants::normalize_rotation;

/// Snap `value` to `target` when within `tolerance`.
///
/// Returns the possibly snapped value and whether it snapped.
#[inline]
pub fn snap_axis(value: f32, target: f32, tolerance: f32) -> (f32, bool) {
    if (value - target).abs() <= tolerance {
        (target, true)
    } else {
        (value, false)
    }
}

/// Snap an angle to the nearest multiple of `step` when within `tolerance`.
///
/// The result is normalized into (-180, 180].
pub fn snap_angle(degrees: f32, step: f32, tolerance: f32) -> (f32, bool) {
    let degrees = normalize_rotation(degrees);
    if step <= 0.0 {
        return (degrees, false);
    }
    let nearest = (degrees / step).round() * step;
    if (degrees - nearest).abs() <= tolerance {
        (normalize_rotation(nearest), true)
    } else {
        (degrees, false)
    }
}
