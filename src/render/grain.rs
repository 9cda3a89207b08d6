//! Grain overlay.
//!
//! A small tileable gray noise texture is repeated over the canvas into its
//! own layer. The scene composites that layer with [`BlendMode::Overlay`] at
//! `grain × 0.065` opacity, so changing the grain amount never re-renders
//! the base fill or even the grain layer itself.

use image::{DynamicImage, Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::render::composer::BlendMode;
use crate::shader::{lerp, tile_noise, to_byte};

/// Side of the generated tile in pixels.
pub const TILE_SIZE: u32 = 128;

/// Lattice spacing of the low-frequency noise component.
const CLUMP: u32 = 8;

/// Blend mode the grain layer is composited with.
pub const GRAIN_BLEND: BlendMode = BlendMode::Overlay;

/// Layer opacity for a grain amount in [0, 1].
#[inline]
pub fn grain_opacity(grain: f32, factor: f32) -> f32 {
    (grain.clamp(0.0, 1.0) * factor).clamp(0.0, 1.0)
}

/// A repeatable noise tile.
#[derive(Debug, Clone, PartialEq)]
pub struct GrainTexture {
    tile: RgbaImage,
}

impl GrainTexture {
    /// Deterministic procedural tile: per-pixel white noise mixed with a
    /// little clumped value noise, both periodic over the tile.
    pub fn generate(seed: u32) -> Self {
        let mut rng = StdRng::seed_from_u64(seed as u64);
        let period = TILE_SIZE / CLUMP;
        let mut tile = RgbaImage::new(TILE_SIZE, TILE_SIZE);

        for (x, y, px) in tile.enumerate_pixels_mut() {
            let white: f32 = rng.random();
            let clump = tile_noise(
                x as f32 / CLUMP as f32,
                y as f32 / CLUMP as f32,
                period,
                seed,
            );
            let v = to_byte(lerp(white, clump, 0.3));
            *px = Rgba([v, v, v, 255]);
        }

        Self { tile }
    }

    /// Use an external bitmap (e.g. a bundled noise asset) as the tile.
    pub fn from_image(image: &DynamicImage) -> Self {
        Self {
            tile: image.to_rgba8(),
        }
    }

    pub fn tile(&self) -> &RgbaImage {
        &self.tile
    }

    /// Repeat the tile over a `width × height` layer.
    pub fn render_layer(&self, width: u32, height: u32) -> RgbaImage {
        let (tw, th) = self.tile.dimensions();
        if tw == 0 || th == 0 {
            // Neutral gray is a no-op under overlay
            return RgbaImage::from_pixel(width, height, Rgba([128, 128, 128, 255]));
        }
        RgbaImage::from_fn(width, height, |x, y| *self.tile.get_pixel(x % tw, y % th))
    }
}
