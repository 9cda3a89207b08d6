//! # Transform Controller
//!
//! Pointer-driven move, uniform scale and rotate of the QR artifact.
//!
//! ```text
//!  pointer tracking:  Idle ⇄ Hovering ──down on QR──► Dragging ──up──► Idle/Hovering
//!  selection:         Idle ──click──► Selected ──down on handle──► Transforming(Scale|Rotate)
//!                                        ▲                                 │
//!                                        └──────────────up─────────────────┘
//! ```
//!
//! The controller never mutates the design itself. Each event returns an
//! [`InteractionOutcome`] carrying a [`QrPatch`] to merge and, on the first
//! real mutation of a gesture, the label of the history snapshot to take
//! *before* merging. A press that never moves records nothing.
//!
//! Coordinates are device pixels of the canvas.

pub mod snap;

use crate::config::EditorConfig;
use crate::design::{DesignState, Percent2, QrPatch, invariants};
use crate::scene::ChromeOverlay;
use crate::shader::{angle_deg, dist, rotate_deg};

use snap::{snap_angle, snap_axis};

pub const MOVE_LABEL: &str = "Move QR Code";
pub const RESIZE_LABEL: &str = "Resize QR Code";
pub const ROTATE_LABEL: &str = "Rotate QR Code";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformKind {
    Scale,
    Rotate,
}

/// Pointer tracking state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PointerState {
    #[default]
    Idle,
    Hovering,
    Dragging,
    Transforming(TransformKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];

    /// Unit direction of the corner in the unrotated local frame.
    fn sign(self) -> (f32, f32) {
        match self {
            Corner::TopLeft => (-1.0, -1.0),
            Corner::TopRight => (1.0, -1.0),
            Corner::BottomRight => (1.0, 1.0),
            Corner::BottomLeft => (-1.0, 1.0),
        }
    }
}

/// What a pointer position lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Body,
    ScaleHandle(Corner),
    RotateHandle(Corner),
}

/// Result of feeding one pointer event to the controller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionOutcome {
    /// Take a history snapshot with this label before applying `patch`
    pub snapshot: Option<&'static str>,
    pub patch: Option<QrPatch>,
    pub selection_changed: bool,
    /// Chrome (hover outline, handles, guides) needs a redraw
    pub chrome_changed: bool,
}

#[derive(Debug, Clone, Copy)]
enum Gesture {
    Move { grab_dx: f32, grab_dy: f32 },
    Scale { start_scale: f32, grab_dist: f32 },
    Rotate { start_rotation: f32, grab_angle: f32 },
}

/// Transient state of one press-move-release gesture.
#[derive(Debug, Clone)]
struct TransformSession {
    gesture: Gesture,
    label: &'static str,
    snapshot_taken: bool,
}

#[derive(Debug, Clone, Copy)]
struct SnapSettings {
    tolerance_px: f32,
    rotation_step_deg: f32,
    rotation_tolerance_deg: f32,
    handle_size_px: f32,
    rotate_margin_px: f32,
}

#[derive(Debug, Clone)]
pub struct TransformController {
    settings: SnapSettings,
    pointer: PointerState,
    selected: bool,
    locked: bool,
    session: Option<TransformSession>,
    snapped_x: bool,
    snapped_y: bool,
}

impl Default for TransformController {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl TransformController {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            settings: SnapSettings {
                tolerance_px: config.snap_tolerance_px,
                rotation_step_deg: config.rotation_snap_step_deg,
                rotation_tolerance_deg: config.rotation_snap_tolerance_deg,
                handle_size_px: config.handle_size_px,
                rotate_margin_px: config.rotate_handle_margin_px,
            },
            pointer: PointerState::Idle,
            selected: false,
            locked: false,
            session: None,
            snapped_x: false,
            snapped_y: false,
        }
    }

    pub fn pointer_state(&self) -> PointerState {
        self.pointer
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Snap feedback of the current drag: `(vertical guide, horizontal guide)`.
    pub fn snapped(&self) -> (bool, bool) {
        (self.snapped_x, self.snapped_y)
    }

    /// Returns true if the selection changed.
    pub fn select(&mut self) -> bool {
        let changed = !self.selected;
        self.selected = true;
        changed
    }

    /// Returns true if the selection changed.
    pub fn deselect(&mut self) -> bool {
        let changed = self.selected;
        self.abort();
        self.selected = false;
        changed
    }

    /// Locking drops any gesture in flight; pointer input is then ignored.
    pub fn set_locked(&mut self, locked: bool) {
        if locked {
            self.abort();
            self.pointer = PointerState::Idle;
        }
        self.locked = locked;
    }

    /// Drop the current gesture. Values already merged stay; they were
    /// clamped on the way in.
    pub fn abort(&mut self) {
        if self.session.take().is_some() {
            tracing::debug!("transform gesture aborted");
        }
        self.snapped_x = false;
        self.snapped_y = false;
        if matches!(
            self.pointer,
            PointerState::Dragging | PointerState::Transforming(_)
        ) {
            self.pointer = PointerState::Idle;
        }
    }

    /// Overlay to draw for the current state.
    pub fn chrome(&self) -> ChromeOverlay {
        ChromeOverlay {
            hovering: matches!(self.pointer, PointerState::Hovering | PointerState::Dragging),
            selected: self.selected,
            snapped_x: self.snapped_x,
            snapped_y: self.snapped_y,
        }
    }

    /// Locate `(x, y)` on the QR. The body is the border plate when it is
    /// larger than the QR. Handles sit on the QR corners and only exist
    /// while selected.
    pub fn hit_test(&self, state: &DesignState, x: f32, y: f32) -> Option<HitTarget> {
        let qr_box = state.qr_box();
        let qr = state.qr();
        let half = qr_box.half();
        let body_half = half * invariants::footprint_factor(qr.style.border_size_ratio);
        let (lx, ly) = rotate_deg(
            x - qr_box.center_x,
            y - qr_box.center_y,
            -qr.rotation_degrees,
        );
        let on_qr = lx.abs() <= half && ly.abs() <= half;
        let on_body = lx.abs() <= body_half && ly.abs() <= body_half;

        if self.selected {
            let handle_half = self.settings.handle_size_px / 2.0;
            for corner in Corner::ALL {
                let (sx, sy) = corner.sign();
                let (cx, cy) = (sx * half, sy * half);
                if (lx - cx).abs() <= handle_half && (ly - cy).abs() <= handle_half {
                    return Some(HitTarget::ScaleHandle(corner));
                }
            }
            if !on_qr {
                let reach = handle_half + self.settings.rotate_margin_px;
                for corner in Corner::ALL {
                    let (sx, sy) = corner.sign();
                    if dist(lx, ly, sx * half, sy * half) <= reach {
                        return Some(HitTarget::RotateHandle(corner));
                    }
                }
            }
        }

        on_body.then_some(HitTarget::Body)
    }

    pub fn pointer_down(&mut self, state: &DesignState, x: f32, y: f32) -> InteractionOutcome {
        let mut outcome = InteractionOutcome::default();
        if self.locked {
            return outcome;
        }
        // A stray press while a gesture is live restarts from scratch
        self.abort();

        let qr_box = state.qr_box();
        let qr = state.qr();
        let (cx, cy) = (qr_box.center_x, qr_box.center_y);

        match self.hit_test(state, x, y) {
            Some(HitTarget::Body) => {
                self.session = Some(TransformSession {
                    gesture: Gesture::Move {
                        grab_dx: x - cx,
                        grab_dy: y - cy,
                    },
                    label: MOVE_LABEL,
                    snapshot_taken: false,
                });
                self.pointer = PointerState::Dragging;
                outcome.chrome_changed = true;
            }
            Some(HitTarget::ScaleHandle(_)) => {
                let grab_dist = dist(x, y, cx, cy);
                if grab_dist > f32::EPSILON {
                    self.session = Some(TransformSession {
                        gesture: Gesture::Scale {
                            start_scale: qr.scale,
                            grab_dist,
                        },
                        label: RESIZE_LABEL,
                        snapshot_taken: false,
                    });
                    self.pointer = PointerState::Transforming(TransformKind::Scale);
                }
            }
            Some(HitTarget::RotateHandle(_)) => {
                self.session = Some(TransformSession {
                    gesture: Gesture::Rotate {
                        start_rotation: qr.rotation_degrees,
                        grab_angle: angle_deg(x, y, cx, cy),
                    },
                    label: ROTATE_LABEL,
                    snapshot_taken: false,
                });
                self.pointer = PointerState::Transforming(TransformKind::Rotate);
            }
            None => {
                outcome.selection_changed = self.deselect();
                self.pointer = PointerState::Idle;
                outcome.chrome_changed = outcome.selection_changed;
            }
        }
        outcome
    }

    pub fn pointer_move(&mut self, state: &DesignState, x: f32, y: f32) -> InteractionOutcome {
        let mut outcome = InteractionOutcome::default();
        if self.locked {
            return outcome;
        }

        let Some(session) = self.session.as_mut() else {
            let next = if self.hit_test(state, x, y).is_some() {
                PointerState::Hovering
            } else {
                PointerState::Idle
            };
            outcome.chrome_changed = next != self.pointer;
            self.pointer = next;
            return outcome;
        };

        let qr_box = state.qr_box();
        let qr = state.qr();
        let (cx, cy) = (qr_box.center_x, qr_box.center_y);
        let settings = self.settings;

        let patch = match session.gesture {
            Gesture::Move { grab_dx, grab_dy } => {
                let device = state.device();
                let (w, h) = device.size_f32();
                let candidate = Percent2::new((x - grab_dx) / w, (y - grab_dy) / h);
                let clamped =
                    invariants::clamp_position(candidate, device, state.artifact_half_extent());

                let (px, snapped_x) = snap_axis(clamped.x * w, w / 2.0, settings.tolerance_px);
                let (py, snapped_y) = snap_axis(clamped.y * h, h / 2.0, settings.tolerance_px);
                outcome.chrome_changed = (snapped_x, snapped_y) != (self.snapped_x, self.snapped_y);
                self.snapped_x = snapped_x;
                self.snapped_y = snapped_y;

                let position = Percent2::new(px / w, py / h);
                (position != qr.position_percent).then(|| QrPatch::position(position.x, position.y))
            }
            Gesture::Scale {
                start_scale,
                grab_dist,
            } => {
                let scale = invariants::clamp_fitted_scale(
                    start_scale * dist(x, y, cx, cy) / grab_dist,
                    qr.style.border_size_ratio,
                    qr.rotation_degrees,
                );
                (scale != qr.scale).then(|| QrPatch::scale(scale))
            }
            Gesture::Rotate {
                start_rotation,
                grab_angle,
            } => {
                let raw = start_rotation + angle_deg(x, y, cx, cy) - grab_angle;
                let (rotation, _) = snap_angle(
                    raw,
                    settings.rotation_step_deg,
                    settings.rotation_tolerance_deg,
                );
                (rotation != qr.rotation_degrees).then(|| QrPatch::rotation(rotation))
            }
        };

        if patch.is_some() && !session.snapshot_taken {
            session.snapshot_taken = true;
            outcome.snapshot = Some(session.label);
        }
        outcome.patch = patch;
        outcome
    }

    pub fn pointer_up(&mut self, state: &DesignState, x: f32, y: f32) -> InteractionOutcome {
        let mut outcome = InteractionOutcome::default();
        if self.locked {
            return outcome;
        }
        let Some(session) = self.session.take() else {
            return outcome;
        };
        tracing::debug!(
            gesture = session.label,
            moved = session.snapshot_taken,
            "transform gesture finished"
        );

        outcome.selection_changed = self.select();
        outcome.chrome_changed = true;
        self.snapped_x = false;
        self.snapped_y = false;
        self.pointer = if self.hit_test(state, x, y).is_some() {
            PointerState::Hovering
        } else {
            PointerState::Idle
        };
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;
    use crate::design::{BackgroundSpec, DeviceCanvas, QrSpec};
    use pretty_assertions::assert_eq;

    fn scenario_state() -> DesignState {
        DesignState::new(
            DeviceCanvas::new(1290, 2796),
            BackgroundSpec::solid(Rgba::WHITE),
            QrSpec::default(),
        )
    }

    fn apply(state: &mut DesignState, outcome: &InteractionOutcome) {
        if let Some(patch) = outcome.patch.clone() {
            state.update_qr(patch);
        }
    }

    #[test]
    fn test_hover_tracks_qr_box() {
        let state = scenario_state();
        let mut ctl = TransformController::default();
        ctl.pointer_move(&state, 645.0, 1398.0);
        assert_eq!(ctl.pointer_state(), PointerState::Hovering);
        ctl.pointer_move(&state, 10.0, 10.0);
        assert_eq!(ctl.pointer_state(), PointerState::Idle);
    }

    #[test]
    fn test_click_without_move_selects_without_snapshot() {
        let state = scenario_state();
        let mut ctl = TransformController::default();
        let down = ctl.pointer_down(&state, 645.0, 1398.0);
        assert_eq!(ctl.pointer_state(), PointerState::Dragging);
        assert_eq!(down.snapshot, None);

        let up = ctl.pointer_up(&state, 645.0, 1398.0);
        assert!(up.selection_changed);
        assert!(ctl.is_selected());
        assert_eq!(up.snapshot, None);
    }

    #[test]
    fn test_drag_snapshots_once_before_first_move() {
        let mut state = scenario_state();
        let mut ctl = TransformController::default();
        ctl.pointer_down(&state, 645.0, 1398.0);

        let first = ctl.pointer_move(&state, 745.0, 1398.0);
        assert_eq!(first.snapshot, Some(MOVE_LABEL));
        apply(&mut state, &first);

        let second = ctl.pointer_move(&state, 800.0, 1398.0);
        assert_eq!(second.snapshot, None);
        assert!(second.patch.is_some());
    }

    #[test]
    fn test_drag_snaps_to_center() {
        // Center + 10px on x stays snapped with the default 20px tolerance
        let mut state = scenario_state();
        let mut ctl = TransformController::default();
        ctl.pointer_down(&state, 700.0, 1500.0);
        let outcome = ctl.pointer_move(&state, 710.0, 1500.0);
        apply(&mut state, &outcome);

        assert_eq!(ctl.snapped(), (true, true));
        assert_eq!(state.qr_box().center_x, 645.0);
        assert!(ctl.chrome().snapped_x);
    }

    #[test]
    fn test_drag_is_clamped_inside_canvas() {
        let mut state = scenario_state();
        let mut ctl = TransformController::default();
        ctl.pointer_down(&state, 645.0, 1398.0);
        let outcome = ctl.pointer_move(&state, -5000.0, -5000.0);
        apply(&mut state, &outcome);

        let qr_box = state.qr_box();
        assert!(qr_box.left() >= -1e-3);
        assert!(qr_box.top() >= -1e-3);
        // The border plate is clamped too, not only the QR square
        let plate_half = qr_box.half() * 1.08;
        assert!(qr_box.center_x - plate_half >= -1e-2);
        assert!(qr_box.center_y - plate_half >= -1e-2);
    }

    #[test]
    fn test_rotated_drag_keeps_corners_inside() {
        let mut state = scenario_state();
        state.update_qr(QrPatch {
            scale: Some(0.3),
            rotation_degrees: Some(45.0),
            ..Default::default()
        });
        let mut ctl = TransformController::default();
        ctl.pointer_down(&state, 645.0, 1398.0);
        let outcome = ctl.pointer_move(&state, -5000.0, 1398.0);
        apply(&mut state, &outcome);

        let qr_box = state.qr_box();
        let leftmost = qr_box.center_x - state.artifact_half_extent();
        assert!(leftmost >= -1e-2, "leftmost {}", leftmost);
        assert!(state.artifact_half_extent() > qr_box.half() * 1.5);
    }

    #[test]
    fn test_x_snaps_independently_of_y() {
        let mut state = scenario_state();
        let mut ctl = TransformController::default();
        ctl.pointer_down(&state, 645.0, 1398.0);
        // 10px off on x, 300px off on y
        let outcome = ctl.pointer_move(&state, 655.0, 1698.0);
        assert_eq!(outcome.snapshot, Some(MOVE_LABEL));
        apply(&mut state, &outcome);

        assert_eq!(ctl.snapped(), (true, false));
        let chrome = ctl.chrome();
        assert!(chrome.snapped_x && !chrome.snapped_y);
        let qr_box = state.qr_box();
        assert_eq!(qr_box.center_x, 645.0);
        assert!((qr_box.center_y - 1698.0).abs() < 1e-2);
    }

    #[test]
    fn test_border_plate_is_part_of_body() {
        let state = scenario_state();
        let ctl = TransformController::default();
        let qr_box = state.qr_box();
        // Inside the 8% plate but outside the QR square
        let on_plate = qr_box.right() + 10.0;
        assert_eq!(
            ctl.hit_test(&state, on_plate, qr_box.center_y),
            Some(HitTarget::Body)
        );
        assert_eq!(ctl.hit_test(&state, qr_box.right() + 40.0, qr_box.center_y), None);
    }

    #[test]
    fn test_scale_gesture_stops_at_fit_limit() {
        let mut state = scenario_state();
        let mut ctl = TransformController::default();
        ctl.select();
        let qr_box = state.qr_box();
        ctl.pointer_down(&state, qr_box.right(), qr_box.bottom());
        let outcome = ctl.pointer_move(&state, qr_box.right() + 2000.0, qr_box.bottom() + 2000.0);
        apply(&mut state, &outcome);
        assert!((state.qr().scale - invariants::max_fit_scale(8.0, 0.0)).abs() < 1e-6);
        assert!(state.artifact_half_extent() <= 645.0 + 1e-2);
    }

    #[test]
    fn test_rotate_snaps_to_45() {
        let mut state = scenario_state();
        let mut ctl = TransformController::default();
        ctl.select();

        let qr_box = state.qr_box();
        let half = qr_box.half();
        // Just outside the top-right corner, inside the rotation band
        let grab = (qr_box.center_x + half + 20.0, qr_box.center_y - half - 20.0);
        ctl.pointer_down(&state, grab.0, grab.1);
        assert_eq!(
            ctl.pointer_state(),
            PointerState::Transforming(TransformKind::Rotate)
        );

        // Swing the pointer 43 degrees clockwise around the center
        let (dx, dy) = rotate_deg(grab.0 - qr_box.center_x, grab.1 - qr_box.center_y, 43.0);
        let outcome = ctl.pointer_move(&state, qr_box.center_x + dx, qr_box.center_y + dy);
        assert_eq!(outcome.snapshot, Some(ROTATE_LABEL));
        apply(&mut state, &outcome);
        assert!((state.qr().rotation_degrees - 45.0).abs() < 1e-3);
    }

    #[test]
    fn test_scale_from_corner_handle() {
        let mut state = scenario_state();
        let mut ctl = TransformController::default();
        ctl.select();

        let qr_box = state.qr_box();
        let corner = (qr_box.right(), qr_box.bottom());
        ctl.pointer_down(&state, corner.0, corner.1);
        assert_eq!(
            ctl.pointer_state(),
            PointerState::Transforming(TransformKind::Scale)
        );

        // Halfway back toward the center halves the scale
        let mid = (
            (corner.0 + qr_box.center_x) / 2.0,
            (corner.1 + qr_box.center_y) / 2.0,
        );
        let outcome = ctl.pointer_move(&state, mid.0, mid.1);
        assert_eq!(outcome.snapshot, Some(RESIZE_LABEL));
        apply(&mut state, &outcome);
        assert!((state.qr().scale - 0.25).abs() < 1e-4);

        ctl.pointer_up(&state, mid.0, mid.1);
        assert!(ctl.is_selected());
        assert!(!ctl.is_active());
    }

    #[test]
    fn test_handles_need_selection() {
        let state = scenario_state();
        let ctl = TransformController::default();
        let qr_box = state.qr_box();
        let outside_corner = (qr_box.right() + 40.0, qr_box.bottom() + 40.0);
        assert_eq!(ctl.hit_test(&state, outside_corner.0, outside_corner.1), None);
    }

    #[test]
    fn test_press_outside_deselects() {
        let state = scenario_state();
        let mut ctl = TransformController::default();
        ctl.select();
        let outcome = ctl.pointer_down(&state, 5.0, 5.0);
        assert!(outcome.selection_changed);
        assert!(!ctl.is_selected());
        assert_eq!(ctl.pointer_state(), PointerState::Idle);
    }

    #[test]
    fn test_locked_ignores_input() {
        let state = scenario_state();
        let mut ctl = TransformController::default();
        ctl.set_locked(true);
        assert_eq!(
            ctl.pointer_down(&state, 645.0, 1398.0),
            InteractionOutcome::default()
        );
        assert!(!ctl.is_active());
    }

    #[test]
    fn test_abort_drops_session() {
        let state = scenario_state();
        let mut ctl = TransformController::default();
        ctl.pointer_down(&state, 645.0, 1398.0);
        ctl.abort();
        assert!(!ctl.is_active());
        assert_eq!(ctl.pointer_move(&state, 900.0, 1398.0).patch, None);
    }
}
