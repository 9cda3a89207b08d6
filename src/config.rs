//! # Editor Configuration
//!
//! Tunables for interaction feedback, history depth and grain rendering.
//! Every field has a default, so a config file only needs the keys it
//! overrides:
//!
//! ```json
//! { "snap_tolerance_px": 24, "history_depth": 100 }
//! ```
//!
//! Snap tolerances are expressed in device pixels (the canvas coordinate
//! space), not on-screen pixels. Hosts that display the canvas scaled down
//! and want a constant on-screen feel should divide by their display scale
//! before handing the config over.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Distance from the canvas center within which a dragged QR snaps to it
    pub snap_tolerance_px: f32,

    /// Rotation snap points are multiples of this angle
    pub rotation_snap_step_deg: f32,

    /// Angular distance within which a rotation snaps
    pub rotation_snap_tolerance_deg: f32,

    /// Maximum number of undo steps kept
    pub history_depth: usize,

    /// Quiet period before a color edit regenerates the QR bitmap
    pub regen_debounce_ms: u64,

    /// Grain layer opacity is `grain × grain_opacity_factor`
    pub grain_opacity_factor: f32,

    /// Seed of the tileable grain texture
    pub grain_seed: u32,

    /// Side of the square corner handles in the chrome layer
    pub handle_size_px: f32,

    /// Width of the band outside each corner handle that starts a rotation
    pub rotate_handle_margin_px: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            snap_tolerance_px: 20.0,
            rotation_snap_step_deg: 45.0,
            rotation_snap_tolerance_deg: 5.0,
            history_depth: 50,
            regen_debounce_ms: 300,
            grain_opacity_factor: 0.065,
            grain_seed: 0x5EED,
            handle_size_px: 24.0,
            rotate_handle_margin_px: 36.0,
        }
    }
}

impl EditorConfig {
    /// Load a config from a JSON file; missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: EditorConfig = serde_json::from_str(text)?;
        Ok(config.sanitized())
    }

    pub fn regen_debounce(&self) -> Duration {
        Duration::from_millis(self.regen_debounce_ms)
    }

    /// Replace negative or non-finite tolerances with defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        let fix = |v: f32, d: f32| if v.is_finite() && v >= 0.0 { v } else { d };
        self.snap_tolerance_px = fix(self.snap_tolerance_px, defaults.snap_tolerance_px);
        self.rotation_snap_tolerance_deg = fix(
            self.rotation_snap_tolerance_deg,
            defaults.rotation_snap_tolerance_deg,
        );
        self.grain_opacity_factor = fix(self.grain_opacity_factor, defaults.grain_opacity_factor);
        self.handle_size_px = fix(self.handle_size_px, defaults.handle_size_px);
        self.rotate_handle_margin_px =
            fix(self.rotate_handle_margin_px, defaults.rotate_handle_margin_px);
        if !(self.rotation_snap_step_deg.is_finite() && self.rotation_snap_step_deg > 0.0) {
            self.rotation_snap_step_deg = defaults.rotation_snap_step_deg;
        }
        self.history_depth = self.history_depth.max(1);
        self
    }
}
