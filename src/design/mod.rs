//! # Design Document
//!
//! The single mutable document the editor works on: device canvas,
//! background and QR configuration.
//!
//! [`DesignState`] keeps its fields private. It is built through
//! [`DesignState::new`] and modified only through the partial-merge
//! mutators, both of which run every value through [`invariants`]. The
//! derived palette is a function of the state ([`palette::derived_palette`]),
//! never a field.
//!
//! ```
//! use qrwall::design::{DesignState, QrPatch};
//!
//! let mut state = DesignState::default();
//! state.update_qr(QrPatch {
//!     scale: Some(7.0),
//!     rotation_degrees: Some(540.0),
//!     ..Default::default()
//! });
//! // Capped so the default 8% border plate still fits the canvas
//! assert!((state.qr().scale - 1.0 / 1.08).abs() < 1e-5);
//! assert_eq!(state.qr().rotation_degrees, 180.0);
//! ```

pub mod document;
pub mod invariants;
pub mod palette;
pub mod patch;
pub mod types;

pub use document::{DesignDocument, from_serializable, to_serializable};
pub use patch::{BackgroundPatch, Changes, DevicePatch, QrPatch};
pub use types::{
    BackgroundFill, BackgroundSpec, DeviceCanvas, GradientKind, GradientSpec, GradientStop,
    ImageSource, MAX_CANVAS_SIDE, Percent2, QrSpec, QrStyle,
};

use crate::color::Rgba;
use invariants::{
    artifact_half_extent, clamp_border_ratio, clamp_corner_ratio, clamp_fitted_scale,
    clamp_grain, clamp_offset, clamp_position, normalize_rotation,
};

/// Axis-aligned square occupied by the QR container, in device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QrBox {
    pub center_x: f32,
    pub center_y: f32,
    pub side: f32,
}

impl QrBox {
    pub fn half(&self) -> f32 {
        self.side / 2.0
    }

    pub fn left(&self) -> f32 {
        self.center_x - self.half()
    }

    pub fn top(&self) -> f32 {
        self.center_y - self.half()
    }

    pub fn right(&self) -> f32 {
        self.center_x + self.half()
    }

    pub fn bottom(&self) -> f32 {
        self.center_y + self.half()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DesignState {
    device: DeviceCanvas,
    background: BackgroundSpec,
    qr: QrSpec,
}

impl DesignState {
    /// Build a state, normalizing every field.
    pub fn new(device: DeviceCanvas, background: BackgroundSpec, qr: QrSpec) -> Self {
        let device = DeviceCanvas::new(device.pixel_width, device.pixel_height);
        let mut state = Self {
            device,
            background: normalize_background(background),
            qr,
        };
        state.qr = normalize_qr(state.qr, &state.device);
        state
    }

    pub fn device(&self) -> &DeviceCanvas {
        &self.device
    }

    pub fn background(&self) -> &BackgroundSpec {
        &self.background
    }

    pub fn qr(&self) -> &QrSpec {
        &self.qr
    }

    pub fn palette(&self) -> Vec<Rgba> {
        palette::derived_palette(self)
    }

    /// The QR container square in device pixels.
    pub fn qr_box(&self) -> QrBox {
        let (w, h) = self.device.size_f32();
        QrBox {
            center_x: self.qr.position_percent.x * w,
            center_y: self.qr.position_percent.y * h,
            side: invariants::qr_side_px(&self.device, self.qr.scale),
        }
    }

    /// Half side of the axis-aligned box around the rotated plate.
    pub fn artifact_half_extent(&self) -> f32 {
        artifact_half_extent(
            &self.device,
            self.qr.scale,
            self.qr.style.border_size_ratio,
            self.qr.rotation_degrees,
        )
    }

    pub fn update_background(&mut self, patch: BackgroundPatch) -> Changes {
        let mut changes = Changes::default();

        if let Some(fill) = patch.fill {
            let fill = normalize_fill(fill);
            if fill != self.background.fill {
                self.background.fill = fill;
                changes.fill = true;
            }
        }

        if let Some(grain) = patch.grain {
            let grain = clamp_grain(grain);
            if grain != self.background.grain {
                self.background.grain = grain;
                changes.grain = true;
            }
        }

        changes
    }

    pub fn update_qr(&mut self, patch: QrPatch) -> Changes {
        let before = self.qr.clone();
        let mut next = self.qr.clone();

        if let Some(url) = patch.payload_url {
            next.payload_url = url;
        }
        if let Some(position) = patch.position_percent {
            next.position_percent = position;
        }
        if let Some(scale) = patch.scale {
            next.scale = scale;
        }
        if let Some(rotation) = patch.rotation_degrees {
            next.rotation_degrees = rotation;
        }
        if let Some(color) = patch.primary_color {
            next.style.primary_color = color;
        }
        if let Some(color) = patch.secondary_color {
            next.style.secondary_color = color;
        }
        if let Some(color) = patch.border_color {
            next.style.border_color = color;
        }
        if let Some(ratio) = patch.border_size_ratio {
            next.style.border_size_ratio = ratio;
        }
        if let Some(ratio) = patch.corner_radius_ratio {
            next.style.corner_radius_ratio = ratio;
        }

        self.qr = normalize_qr(next, &self.device);
        qr_changes(&before, &self.qr)
    }

    /// Resize the canvas. The QR keeps its percentage position, re-clamped
    /// against the new absolute size.
    pub fn update_device(&mut self, patch: DevicePatch) -> Changes {
        let device = DeviceCanvas::new(
            patch.pixel_width.unwrap_or(self.device.pixel_width),
            patch.pixel_height.unwrap_or(self.device.pixel_height),
        );
        if device == self.device {
            return Changes::default();
        }

        self.device = device;
        let before = self.qr.clone();
        self.qr = normalize_qr(self.qr.clone(), &self.device);

        let mut changes = qr_changes(&before, &self.qr);
        changes.device = true;
        changes.fill = true;
        changes.grain = true;
        changes.qr_layout = true;
        changes
    }
}

fn qr_changes(before: &QrSpec, after: &QrSpec) -> Changes {
    Changes {
        qr_payload: before.payload_url != after.payload_url,
        qr_colors: before.style.primary_color != after.style.primary_color
            || before.style.secondary_color != after.style.secondary_color,
        qr_layout: before.position_percent != after.position_percent
            || before.scale != after.scale
            || before.rotation_degrees != after.rotation_degrees
            || before.style.border_color != after.style.border_color
            || before.style.border_size_ratio != after.style.border_size_ratio
            || before.style.corner_radius_ratio != after.style.corner_radius_ratio,
        ..Default::default()
    }
}

fn normalize_qr(mut qr: QrSpec, device: &DeviceCanvas) -> QrSpec {
    qr.style.border_size_ratio = clamp_border_ratio(qr.style.border_size_ratio);
    qr.style.corner_radius_ratio = clamp_corner_ratio(qr.style.corner_radius_ratio);
    qr.rotation_degrees = normalize_rotation(qr.rotation_degrees);
    // The whole rotated plate has to fit, so a wide border or a tilt can
    // pull the scale below MAX_SCALE.
    qr.scale = clamp_fitted_scale(qr.scale, qr.style.border_size_ratio, qr.rotation_degrees);
    let half = artifact_half_extent(
        device,
        qr.scale,
        qr.style.border_size_ratio,
        qr.rotation_degrees,
    );
    qr.position_percent = clamp_position(qr.position_percent, device, half);
    qr
}

fn normalize_background(mut background: BackgroundSpec) -> BackgroundSpec {
    background.fill = normalize_fill(background.fill);
    background.grain = clamp_grain(background.grain);
    background
}

fn normalize_fill(fill: BackgroundFill) -> BackgroundFill {
    match fill {
        BackgroundFill::Gradient { mut gradient } => {
            for stop in &mut gradient.stops {
                stop.offset = clamp_offset(stop.offset);
            }
            // Stable: stops sharing an offset keep their relative order
            gradient
                .stops
                .sort_by(|a, b| a.offset.total_cmp(&b.offset));
            gradient.kind = match gradient.kind {
                GradientKind::Linear { angle_degrees } => GradientKind::Linear {
                    angle_degrees: if angle_degrees.is_finite() {
                        angle_degrees
                    } else {
                        0.0
                    },
                },
                GradientKind::Radial { center_percent } => GradientKind::Radial {
                    center_percent: Percent2::new(
                        clamp_offset(center_percent.x),
                        clamp_offset(center_percent.y),
                    ),
                },
            };
            BackgroundFill::Gradient { gradient }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes() {
        let qr = QrSpec {
            scale: 4.0,
            rotation_degrees: 370.0,
            position_percent: Percent2::new(-3.0, 9.0),
            ..Default::default()
        };
        let state = DesignState::new(DeviceCanvas::new(0, 0), BackgroundSpec::default(), qr);
        assert_eq!(state.device().pixel_width, 1);
        // Tilted by 10 degrees, so the fit limit is below 1 / 1.08
        assert_eq!(state.qr().scale, invariants::max_fit_scale(8.0, 10.0));
        assert!(state.qr().scale < 0.85);
        assert!((state.qr().rotation_degrees - 10.0).abs() < 1e-4);
        assert_eq!(state.qr().position_percent, Percent2::CENTER);
    }

    #[test]
    fn test_update_qr_reports_changes() {
        let mut state = DesignState::default();
        let changes = state.update_qr(QrPatch::rotation(30.0));
        assert!(changes.qr_layout);
        assert!(!changes.qr_payload && !changes.qr_colors);

        let changes = state.update_qr(QrPatch::payload("https://rust-lang.org"));
        assert!(changes.qr_payload);

        // Same value again: nothing changed
        let changes = state.update_qr(QrPatch::rotation(30.0));
        assert!(!changes.any());
    }

    #[test]
    fn test_scale_growth_reclamps_position() {
        let mut state = DesignState::default();
        state.update_qr(QrPatch {
            scale: Some(0.1),
            position_percent: Some(Percent2::new(0.0, 0.0)),
            ..Default::default()
        });
        let small = state.qr().position_percent;
        state.update_qr(QrPatch::scale(1.0));
        let big = state.qr().position_percent;
        assert!(big.x > small.x);
        let b = state.qr_box();
        assert!(b.left() >= -1e-3 && b.top() >= -1e-3);
    }

    #[test]
    fn test_device_change_keeps_percent_and_reclamps() {
        let mut state = DesignState::default();
        state.update_qr(QrPatch::position(0.3, 0.3));
        let changes = state.update_device(DevicePatch::size(1000, 1000));
        assert!(changes.device && changes.fill && changes.qr_layout);
        assert_eq!(state.qr().position_percent, Percent2::new(0.3, 0.3));

        // A square canvas at scale 0.5 with an 8% border needs the center 27% in
        state.update_qr(QrPatch::position(0.0, 1.0));
        let p = state.qr().position_percent;
        assert!((p.x - 0.27).abs() < 1e-5 && (p.y - 0.73).abs() < 1e-5);
    }

    #[test]
    fn test_plate_stays_inside_at_full_scale() {
        let mut state = DesignState::new(
            DeviceCanvas::new(1000, 2000),
            BackgroundSpec::default(),
            QrSpec::default(),
        );
        state.update_qr(QrPatch {
            scale: Some(1.0),
            position_percent: Some(Percent2::new(0.0, 0.0)),
            ..Default::default()
        });
        let b = state.qr_box();
        let plate_half = b.half() * 1.08;
        assert!(b.center_x - plate_half >= -1e-2);
        assert!(b.center_x + plate_half <= 1000.0 + 1e-2);
        assert!(b.center_y - plate_half >= -1e-2);
    }

    #[test]
    fn test_rotated_corners_stay_inside() {
        let mut state = DesignState::new(
            DeviceCanvas::new(1000, 2000),
            BackgroundSpec::default(),
            QrSpec::default(),
        );
        state.update_qr(QrPatch {
            scale: Some(0.3),
            rotation_degrees: Some(45.0),
            position_percent: Some(Percent2::new(0.0, 0.0)),
            ..Default::default()
        });
        assert_eq!(state.qr().scale, 0.3);
        let b = state.qr_box();
        // Corner of the plate along the diagonal
        let reach = b.half() * 1.08 * std::f32::consts::SQRT_2;
        assert!(b.center_x - reach >= -1e-2, "leftmost {}", b.center_x - reach);
        assert!(b.center_y - reach >= -1e-2);
    }

    #[test]
    fn test_rotation_reclamps_position() {
        let mut state = DesignState::new(
            DeviceCanvas::new(1000, 2000),
            BackgroundSpec::default(),
            QrSpec::default(),
        );
        state.update_qr(QrPatch::position(0.0, 0.5));
        let before = state.qr().position_percent.x;
        let changes = state.update_qr(QrPatch::rotation(45.0));
        assert!(changes.qr_layout);
        assert!(state.qr().position_percent.x > before);
        let b = state.qr_box();
        assert!(b.center_x - state.artifact_half_extent() >= -1e-2);
    }

    #[test]
    fn test_gradient_stops_sorted_stably() {
        let mut state = DesignState::default();
        let red = Rgba::rgb(255, 0, 0);
        let blue = Rgba::rgb(0, 0, 255);
        state.update_background(BackgroundPatch::fill(BackgroundFill::Gradient {
            gradient: GradientSpec::linear(
                0.0,
                vec![
                    GradientStop::new(1.4, Rgba::WHITE),
                    GradientStop::new(0.5, red),
                    GradientStop::new(0.5, blue),
                ],
            ),
        }));
        let BackgroundFill::Gradient { gradient } = &state.background().fill else {
            panic!("expected gradient");
        };
        let offsets: Vec<f32> = gradient.stops.iter().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![0.5, 0.5, 1.0]);
        assert_eq!(gradient.stops[0].color, red);
        assert_eq!(gradient.stops[1].color, blue);
    }

    #[test]
    fn test_device_size_is_bounded() {
        let mut state = DesignState::default();
        state.update_device(DevicePatch::size(u32::MAX, 0));
        assert_eq!(state.device().pixel_width, MAX_CANVAS_SIDE);
        assert_eq!(state.device().pixel_height, 1);
    }

    #[test]
    fn test_qr_box_center() {
        let state = DesignState::new(
            DeviceCanvas::new(1290, 2796),
            BackgroundSpec::default(),
            QrSpec::default(),
        );
        let b = state.qr_box();
        assert_eq!((b.center_x, b.center_y), (645.0, 1398.0));
        assert_eq!(b.side, 645.0);
    }
}
