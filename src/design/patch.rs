//! Partial updates merged into a [`super::DesignState`].
//!
//! Every field is optional; `None` leaves the current value alone. Merging
//! reports what changed through [`Changes`] so the scene only redraws the
//! affected layers.

use serde::{Deserialize, Serialize};

use super::types::{BackgroundFill, Percent2};
use crate::color::Rgba;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundPatch {
    pub fill: Option<BackgroundFill>,
    pub grain: Option<f32>,
}

impl BackgroundPatch {
    pub fn fill(fill: BackgroundFill) -> Self {
        Self {
            fill: Some(fill),
            ..Default::default()
        }
    }

    pub fn grain(grain: f32) -> Self {
        Self {
            grain: Some(grain),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QrPatch {
    pub payload_url: Option<String>,
    pub position_percent: Option<Percent2>,
    pub scale: Option<f32>,
    pub rotation_degrees: Option<f32>,
    pub primary_color: Option<Rgba>,
    pub secondary_color: Option<Rgba>,
    pub border_color: Option<Rgba>,
    pub border_size_ratio: Option<f32>,
    pub corner_radius_ratio: Option<f32>,
}

impl QrPatch {
    pub fn payload(url: impl Into<String>) -> Self {
        Self {
            payload_url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn position(x: f32, y: f32) -> Self {
        Self {
            position_percent: Some(Percent2::new(x, y)),
            ..Default::default()
        }
    }

    pub fn scale(scale: f32) -> Self {
        Self {
            scale: Some(scale),
            ..Default::default()
        }
    }

    pub fn rotation(degrees: f32) -> Self {
        Self {
            rotation_degrees: Some(degrees),
            ..Default::default()
        }
    }

    pub fn colors(primary: Rgba, secondary: Rgba) -> Self {
        Self {
            primary_color: Some(primary),
            secondary_color: Some(secondary),
            ..Default::default()
        }
    }

    pub fn border(color: Rgba, size_ratio: f32, corner_ratio: f32) -> Self {
        Self {
            border_color: Some(color),
            border_size_ratio: Some(size_ratio),
            corner_radius_ratio: Some(corner_ratio),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevicePatch {
    pub pixel_width: Option<u32>,
    pub pixel_height: Option<u32>,
}

impl DevicePatch {
    pub fn size(pixel_width: u32, pixel_height: u32) -> Self {
        Self {
            pixel_width: Some(pixel_width),
            pixel_height: Some(pixel_height),
        }
    }
}

/// Which parts of the design a merge actually modified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Changes {
    pub device: bool,
    pub fill: bool,
    pub grain: bool,
    /// Payload text changed: the QR matrix must be re-encoded
    pub qr_payload: bool,
    /// Module colors changed: the QR bitmap must be recolored
    pub qr_colors: bool,
    /// Position, scale, rotation or border changed: redraw only
    pub qr_layout: bool,
}

impl Changes {
    pub const ALL: Changes = Changes {
        device: true,
        fill: true,
        grain: true,
        qr_payload: true,
        qr_colors: true,
        qr_layout: true,
    };

    pub fn any(&self) -> bool {
        self.device || self.fill || self.grain || self.qr_payload || self.qr_colors || self.qr_layout
    }

    pub fn merge(self, other: Changes) -> Changes {
        Changes {
            device: self.device || other.device,
            fill: self.fill || other.fill,
            grain: self.grain || other.grain,
            qr_payload: self.qr_payload || other.qr_payload,
            qr_colors: self.qr_colors || other.qr_colors,
            qr_layout: self.qr_layout || other.qr_layout,
        }
    }
}
