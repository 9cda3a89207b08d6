//! Plain data types of the design document.
//!
//! These derive `Serialize + Deserialize` so the same shapes are used for
//! in-memory editing and for the JSON document handed to persistence.
//! Invariants are not enforced here; [`super::DesignState`] normalizes
//! everything that enters it.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::color::Rgba;
use crate::resources::ResourceHandle;

/// The fixed-resolution drawing surface of the target device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCanvas {
    pub pixel_width: u32,
    pub pixel_height: u32,
}

/// Longest canvas side accepted, in pixels.
pub const MAX_CANVAS_SIDE: u32 = 8192;

impl DeviceCanvas {
    /// Dimensions are clamped into [1, MAX_CANVAS_SIDE].
    pub fn new(pixel_width: u32, pixel_height: u32) -> Self {
        Self {
            pixel_width: pixel_width.clamp(1, MAX_CANVAS_SIDE),
            pixel_height: pixel_height.clamp(1, MAX_CANVAS_SIDE),
        }
    }

    pub fn fits(&self) -> bool {
        self.pixel_width <= MAX_CANVAS_SIDE && self.pixel_height <= MAX_CANVAS_SIDE
    }

    pub fn size_f32(&self) -> (f32, f32) {
        (self.pixel_width as f32, self.pixel_height as f32)
    }

    pub fn center(&self) -> (f32, f32) {
        (self.pixel_width as f32 / 2.0, self.pixel_height as f32 / 2.0)
    }

    pub fn min_side(&self) -> f32 {
        self.pixel_width.min(self.pixel_height) as f32
    }
}

impl Default for DeviceCanvas {
    fn default() -> Self {
        crate::device::DeviceProfile::default().canvas()
    }
}

/// A point expressed as fractions of the canvas size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Percent2 {
    pub x: f32,
    pub y: f32,
}

impl Percent2 {
    pub const CENTER: Percent2 = Percent2 { x: 0.5, y: 0.5 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Default for Percent2 {
    fn default() -> Self {
        Self::CENTER
    }
}

/// One color stop of a gradient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// Position along the gradient, 0 at the start and 1 at the end
    pub offset: f32,
    pub color: Rgba,
}

impl GradientStop {
    pub fn new(offset: f32, color: Rgba) -> Self {
        Self { offset, color }
    }
}

/// Gradient geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GradientKind {
    /// 0° runs bottom-to-top, angles increase clockwise
    Linear { angle_degrees: f32 },
    /// Circle centered at a fraction of the canvas size
    Radial { center_percent: Percent2 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientSpec {
    pub kind: GradientKind,
    pub stops: Vec<GradientStop>,
}

impl GradientSpec {
    pub fn linear(angle_degrees: f32, stops: Vec<GradientStop>) -> Self {
        Self {
            kind: GradientKind::Linear { angle_degrees },
            stops,
        }
    }

    pub fn radial(center_percent: Percent2, stops: Vec<GradientStop>) -> Self {
        Self {
            kind: GradientKind::Radial { center_percent },
            stops,
        }
    }
}

/// Where the pixels of an image background come from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSource {
    /// Fetched over HTTP(S)
    Url(String),
    /// Read from the local filesystem
    Path(PathBuf),
    /// Transient in-memory bytes held by the [`crate::resources::ResourceRegistry`]
    Blob(ResourceHandle),
}

/// The fill style of the background layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "style", rename_all = "snake_case")]
pub enum BackgroundFill {
    Solid { color: Rgba },
    Gradient { gradient: GradientSpec },
    Image { source: ImageSource },
}

impl Default for BackgroundFill {
    fn default() -> Self {
        BackgroundFill::Solid {
            color: Rgba::WHITE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BackgroundSpec {
    pub fill: BackgroundFill,
    /// Noise overlay intensity in [0, 1], independent of the fill style
    #[serde(default)]
    pub grain: f32,
}

impl BackgroundSpec {
    pub fn solid(color: Rgba) -> Self {
        Self {
            fill: BackgroundFill::Solid { color },
            grain: 0.0,
        }
    }

    pub fn gradient(gradient: GradientSpec) -> Self {
        Self {
            fill: BackgroundFill::Gradient { gradient },
            grain: 0.0,
        }
    }

    pub fn image(source: ImageSource) -> Self {
        Self {
            fill: BackgroundFill::Image { source },
            grain: 0.0,
        }
    }
}

/// Colors and border geometry of the QR artifact.
///
/// Border and corner ratios are percentages of the QR's drawn side length,
/// so they scale together with the QR.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QrStyle {
    /// Dark modules
    pub primary_color: Rgba,
    /// Light modules
    pub secondary_color: Rgba,
    pub border_color: Rgba,
    /// In [-1, 200]
    pub border_size_ratio: f32,
    /// In [0, 100]
    pub corner_radius_ratio: f32,
}

impl Default for QrStyle {
    fn default() -> Self {
        Self {
            primary_color: Rgba::BLACK,
            secondary_color: Rgba::WHITE,
            border_color: Rgba::WHITE,
            border_size_ratio: 8.0,
            corner_radius_ratio: 12.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QrSpec {
    pub payload_url: String,
    /// Center of the QR container relative to the canvas
    pub position_percent: Percent2,
    /// QR side as a fraction of the canvas's shorter side, in [0.1, 1.0]
    pub scale: f32,
    /// In (-180, 180]
    pub rotation_degrees: f32,
    pub style: QrStyle,
}

impl Default for QrSpec {
    fn default() -> Self {
        Self {
            payload_url: "https://example.com".to_string(),
            position_percent: Percent2::CENTER,
            scale: 0.5,
            rotation_degrees: 0.0,
            style: QrStyle::default(),
        }
    }
}
