//! # Export Pipeline
//!
//! Rasterizes the design at an arbitrary output scale.
//!
//! ```text
//! resize surface to floor(w×scale) × floor(h×scale)
//!   → full redraw without chrome (borders and modules in target pixels)
//!   → copy frame
//!   → restore original size and redraw      (always, via RestoreGuard)
//!   → encode PNG / JPEG                     (off-thread in export_async)
//! ```

use std::fmt;
use std::str::FromStr;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;
use crate::design::{BackgroundFill, DesignState};
use crate::error::{QrwallError, Result};
use crate::resources::ResourceRegistry;
use crate::scene::SceneHost;

pub const DEFAULT_QUALITY: f32 = 0.92;

/// Longest side of an exported image.
pub const MAX_EXPORT_SIDE: u32 = 16_384;

/// Pixel budget of one export (512 MiB of RGBA).
pub const MAX_EXPORT_PIXELS: u64 = 1 << 27;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
}

impl ExportFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Png => write!(f, "png"),
            ExportFormat::Jpeg => write!(f, "jpeg"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = QrwallError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "jpeg" | "jpg" => Ok(ExportFormat::Jpeg),
            other => Err(QrwallError::InvalidExport(format!(
                "unknown format '{}', expected png or jpeg",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub format: ExportFormat,
    /// In (0, 1]; only JPEG uses it
    pub quality: f32,
    /// Output size relative to the device canvas
    pub scale: f32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Png,
            quality: DEFAULT_QUALITY,
            scale: 1.0,
        }
    }
}

impl ExportOptions {
    pub fn png(scale: f32) -> Self {
        Self {
            scale,
            ..Default::default()
        }
    }

    pub fn jpeg(scale: f32, quality: f32) -> Self {
        Self {
            format: ExportFormat::Jpeg,
            quality,
            scale,
        }
    }

    /// Quality clamped into (0, 1]; non-positive or NaN falls back to the default.
    pub fn effective_quality(&self) -> f32 {
        if self.quality.is_nan() || self.quality <= 0.0 {
            DEFAULT_QUALITY
        } else {
            self.quality.min(1.0)
        }
    }

    /// JPEG quality on the encoder's 1..=100 scale.
    pub fn jpeg_quality(&self) -> u8 {
        (self.effective_quality() * 100.0).round().clamp(1.0, 100.0) as u8
    }

    fn validate(&self) -> Result<()> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(QrwallError::InvalidExport(format!(
                "scale must be finite and positive, got {}",
                self.scale
            )));
        }
        Ok(())
    }
}

/// Output pixel size for a canvas at `scale`; each side at least 1.
///
/// Sizes over [`MAX_EXPORT_SIDE`] or [`MAX_EXPORT_PIXELS`] are rejected
/// before anything is allocated.
pub fn target_size(width: u32, height: u32, scale: f32) -> Result<(u32, u32)> {
    let side = |v: u32| (v as f64 * scale as f64).floor().max(1.0);
    let (tw, th) = (side(width), side(height));
    let max_side = MAX_EXPORT_SIDE as f64;
    if tw > max_side || th > max_side || tw * th > MAX_EXPORT_PIXELS as f64 {
        return Err(QrwallError::InvalidExport(format!(
            "{}x{} at scale {} exceeds the export limit of {} pixels per side and {} pixels total",
            width, height, scale, MAX_EXPORT_SIDE, MAX_EXPORT_PIXELS
        )));
    }
    Ok((tw as u32, th as u32))
}

/// Encoded export result.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: ExportFormat,
}

/// A frame rendered at export resolution, not yet encoded.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    pub image: RgbaImage,
    pub options: ExportOptions,
}

/// Puts the scene back at its on-screen size however the export ends.
struct RestoreGuard<'a> {
    scene: &'a mut SceneHost,
    state: &'a DesignState,
    width: u32,
    height: u32,
}

impl Drop for RestoreGuard<'_> {
    fn drop(&mut self) {
        self.scene.resize(self.width, self.height);
        self.scene.invalidate_all();
        self.scene.render(self.state, None);
        tracing::debug!(width = self.width, height = self.height, "scene restored after export");
    }
}

/// Render `state` at export resolution and restore the scene.
pub fn capture(
    scene: &mut SceneHost,
    state: &DesignState,
    options: &ExportOptions,
) -> Result<CapturedFrame> {
    options.validate()?;
    if !scene.is_initialized() {
        return Err(QrwallError::SurfaceUninitialized);
    }

    let (width, height) = scene.size();
    let device = state.device();
    let (tw, th) = target_size(device.pixel_width, device.pixel_height, options.scale)?;

    let guard = RestoreGuard {
        scene,
        state,
        width,
        height,
    };
    guard.scene.resize(tw, th);
    guard.scene.invalidate_all();
    guard.scene.render(state, None);
    let image = guard
        .scene
        .surface()
        .cloned()
        .ok_or(QrwallError::SurfaceUninitialized)?;
    drop(guard);

    tracing::debug!(width = tw, height = th, format = %options.format, "export frame captured");
    Ok(CapturedFrame {
        image,
        options: *options,
    })
}

/// Encode a captured frame.
pub fn encode(frame: CapturedFrame) -> Result<ExportedImage> {
    let (width, height) = frame.image.dimensions();
    let format = frame.options.format;
    let mut bytes = Vec::new();

    match format {
        ExportFormat::Png => PngEncoder::new(&mut bytes)
            .write_image(frame.image.as_raw(), width, height, ExtendedColorType::Rgba8)
            .map_err(|e| QrwallError::ImageEncode(format!("PNG encoding failed: {}", e)))?,
        ExportFormat::Jpeg => {
            // No alpha in JPEG
            let rgb = DynamicImage::ImageRgba8(frame.image).to_rgb8();
            JpegEncoder::new_with_quality(&mut bytes, frame.options.jpeg_quality())
                .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
                .map_err(|e| QrwallError::ImageEncode(format!("JPEG encoding failed: {}", e)))?
        }
    }

    Ok(ExportedImage {
        bytes,
        width,
        height,
        format,
    })
}

/// Render and encode on the calling thread.
pub fn export(
    scene: &mut SceneHost,
    state: &DesignState,
    options: &ExportOptions,
) -> Result<ExportedImage> {
    encode(capture(scene, state, options)?)
}

/// Render on the calling thread, encode on the blocking pool.
pub async fn export_async(
    scene: &mut SceneHost,
    state: &DesignState,
    options: &ExportOptions,
) -> Result<ExportedImage> {
    let frame = capture(scene, state, options)?;
    tokio::task::spawn_blocking(move || encode(frame))
        .await
        .map_err(|e| QrwallError::ImageEncode(format!("Encode task failed: {}", e)))?
}

/// Rasterize a design without an editor, on a fresh scene at device size.
///
/// `background` is the decoded image for an image fill; without it the
/// fill falls back to white.
pub fn render_design(
    state: &DesignState,
    background: Option<DynamicImage>,
    config: &EditorConfig,
    options: &ExportOptions,
) -> Result<ExportedImage> {
    let device = state.device();
    // Fail before drawing anything at device size
    options.validate()?;
    target_size(device.pixel_width, device.pixel_height, options.scale)?;
    let mut scene = SceneHost::new(device.pixel_width, device.pixel_height, config);
    scene.prepare_payload(&state.qr().payload_url)?;

    if let BackgroundFill::Image { source } = &state.background().fill {
        let mut registry = ResourceRegistry::new();
        match background {
            Some(image) => scene.upload_background(source.clone(), image, &mut registry),
            None => scene.background_failed(source.clone(), &mut registry),
        }
    }

    scene.render(state, None);
    export(&mut scene, state, options)
}
