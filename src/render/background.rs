//! Background compositor: the bottom layer of the scene.
//!
//! Renders solid, gradient and image fills. Image fills use cover scaling:
//! one uniform scale `max(w / iw, h / ih)`, centered, cropping the overflow.
//!
//! Decoding happens elsewhere ([`crate::loader`]); the decoded bitmap is
//! handed over with [`BackgroundCompositor::upload`], which also releases
//! the transient blob it came from. Decoded bitmaps are kept per source so
//! restoring an older design finds its image again; the editor prunes the
//! ones no design references anymore. Until an image is available, or when
//! loading failed, the layer falls back to solid white.

use std::collections::{HashMap, HashSet};

use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};

use crate::color::Rgba;
use crate::design::{BackgroundFill, ImageSource};
use crate::render::gradient::render_gradient;
use crate::resources::ResourceRegistry;

/// Fill used when an image background cannot be shown.
pub const FALLBACK_FILL: Rgba = Rgba::WHITE;

/// Placement of a cover-scaled image relative to the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverRect {
    pub scale: f32,
    /// Scaled image size, never smaller than the canvas
    pub width: u32,
    pub height: u32,
    /// Top-left of the canvas inside the scaled image
    pub crop_x: u32,
    pub crop_y: u32,
}

/// Compute cover placement of an `iw × ih` image on a `w × h` canvas.
pub fn cover_rect(iw: u32, ih: u32, w: u32, h: u32) -> Option<CoverRect> {
    if iw == 0 || ih == 0 || w == 0 || h == 0 {
        return None;
    }
    let scale = (w as f32 / iw as f32).max(h as f32 / ih as f32);
    let width = ((iw as f32 * scale).round() as u32).max(w);
    let height = ((ih as f32 * scale).round() as u32).max(h);
    Some(CoverRect {
        scale,
        width,
        height,
        crop_x: (width - w) / 2,
        crop_y: (height - h) / 2,
    })
}

pub fn render_solid(color: Rgba, width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, color.to_pixel())
}

/// Cover-scale `image` onto a `width × height` layer.
pub fn render_cover(image: &DynamicImage, width: u32, height: u32) -> Option<RgbaImage> {
    let rect = cover_rect(image.width(), image.height(), width, height)?;
    let scaled = imageops::resize(&image.to_rgba8(), rect.width, rect.height, FilterType::Triangle);
    Some(imageops::crop_imm(&scaled, rect.crop_x, rect.crop_y, width, height).to_image())
}

#[derive(Debug, Default)]
pub struct BackgroundCompositor {
    images: HashMap<ImageSource, DynamicImage>,
    failed: HashSet<ImageSource>,
}

impl BackgroundCompositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a decoded image for `source`. A blob source is released from
    /// `registry` now that its pixels live here.
    pub fn upload(
        &mut self,
        source: ImageSource,
        image: DynamicImage,
        registry: &mut ResourceRegistry,
    ) {
        if let ImageSource::Blob(handle) = &source {
            registry.release(handle);
        }
        self.failed.remove(&source);
        tracing::debug!(
            width = image.width(),
            height = image.height(),
            cached = self.images.len(),
            "background image uploaded"
        );
        self.images.insert(source, image);
    }

    /// Record that `source` could not be loaded; renders fall back to white.
    pub fn mark_failed(&mut self, source: ImageSource, registry: &mut ResourceRegistry) {
        if let ImageSource::Blob(handle) = &source {
            registry.release(handle);
        }
        self.images.remove(&source);
        self.failed.insert(source);
    }

    pub fn has_image_for(&self, source: &ImageSource) -> bool {
        self.images.contains_key(source)
    }

    pub fn has_failed(&self, source: &ImageSource) -> bool {
        self.failed.contains(source)
    }

    pub fn cached_count(&self) -> usize {
        self.images.len()
    }

    /// Keep only the bitmaps and failure marks whose source passes `keep`.
    pub fn retain(&mut self, keep: impl Fn(&ImageSource) -> bool) {
        let before = self.images.len();
        self.images.retain(|source, _| keep(source));
        self.failed.retain(|source| keep(source));
        if self.images.len() != before {
            tracing::debug!(
                dropped = before - self.images.len(),
                cached = self.images.len(),
                "pruned background images"
            );
        }
    }

    /// Drop every decoded bitmap.
    pub fn clear_images(&mut self) {
        self.images.clear();
        self.failed.clear();
    }

    /// Render the base fill layer.
    pub fn render(&self, fill: &BackgroundFill, width: u32, height: u32) -> RgbaImage {
        match fill {
            BackgroundFill::Solid { color } => render_solid(*color, width, height),
            BackgroundFill::Gradient { gradient } => render_gradient(gradient, width, height),
            BackgroundFill::Image { source } => self.render_image(source, width, height),
        }
    }

    fn render_image(&self, source: &ImageSource, width: u32, height: u32) -> RgbaImage {
        match self.images.get(source) {
            Some(image) => render_cover(image, width, height).unwrap_or_else(|| {
                tracing::warn!("background image has no pixels; using white fill");
                render_solid(FALLBACK_FILL, width, height)
            }),
            None => {
                if self.has_failed(source) {
                    tracing::warn!(?source, "background image failed to load; using white fill");
                } else {
                    // Image fills only get pixels through a load
                    tracing::warn!(
                        ?source,
                        "background image was never loaded; using white fill"
                    );
                }
                render_solid(FALLBACK_FILL, width, height)
            }
        }
    }
}
