//! # Scene Host
//!
//! Owns the drawing surface and the cached layers that make up a frame.
//!
//! ```text
//! DesignState ──► SceneHost::render ──► surface (RgbaImage)
//!                      │
//!         redraw dirty layers only, then composite bottom to top:
//!         1. background   (solid / gradient / image cover)
//!         2. grain        (overlay, opacity = grain × 0.065)
//!         3. QR artifact  (plate + QR, scaled and rotated)
//!         4. UI chrome    (outline, handles, snap guides; never exported)
//! ```
//!
//! Layers are sized to the surface, not the device. Geometry is recomputed
//! from percentages against the surface size, so a surface resized for
//! export redraws borders and modules in target pixels.

use image::{DynamicImage, RgbaImage};

use crate::color::Rgba;
use crate::config::EditorConfig;
use crate::design::{Changes, DesignState, DeviceCanvas, ImageSource, QrBox, invariants};
use crate::error::Result;
use crate::render::background::BackgroundCompositor;
use crate::render::composer::{BlendMode, composite};
use crate::render::grain::{GRAIN_BLEND, GrainTexture, grain_opacity};
use crate::render::qr::{QrEncoder, QrRenderer};
use crate::render::shapes::{
    RotatedSquare, fill_rounded_square, horizontal_guide, stroke_square, vertical_guide,
};
use crate::resources::ResourceRegistry;

const SELECTION_COLOR: Rgba = Rgba::rgb(0x3B, 0x82, 0xF6);
const GUIDE_COLOR: Rgba = Rgba::rgb(0xFF, 0x3B, 0x8B);
const OUTLINE_PX: f32 = 3.0;
const GUIDE_PX: f32 = 2.0;

/// What the interaction layer wants drawn on top of the design.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChromeOverlay {
    pub hovering: bool,
    pub selected: bool,
    /// Vertical center guide
    pub snapped_x: bool,
    /// Horizontal center guide
    pub snapped_y: bool,
}

impl ChromeOverlay {
    pub fn is_empty(&self) -> bool {
        !(self.hovering || self.selected || self.snapped_x || self.snapped_y)
    }
}

#[derive(Debug, Clone, Copy)]
struct Dirty {
    background: bool,
    grain: bool,
    qr: bool,
    qr_bitmap: bool,
}

impl Dirty {
    const ALL: Dirty = Dirty {
        background: true,
        grain: true,
        qr: true,
        qr_bitmap: true,
    };
}

#[derive(Debug)]
pub struct SceneHost {
    width: u32,
    height: u32,
    surface: Option<RgbaImage>,
    background_layer: Option<RgbaImage>,
    grain_layer: Option<RgbaImage>,
    qr_layer: Option<RgbaImage>,
    compositor: BackgroundCompositor,
    grain_texture: GrainTexture,
    qr_renderer: QrRenderer,
    dirty: Dirty,
    grain_opacity_factor: f32,
    handle_size_px: f32,
}

impl SceneHost {
    pub fn new(width: u32, height: u32, config: &EditorConfig) -> Self {
        Self::with_encoder(width, height, config, QrRenderer::default())
    }

    pub fn with_encoder(
        width: u32,
        height: u32,
        config: &EditorConfig,
        qr_renderer: QrRenderer,
    ) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            surface: None,
            background_layer: None,
            grain_layer: None,
            qr_layer: None,
            compositor: BackgroundCompositor::new(),
            grain_texture: GrainTexture::generate(config.grain_seed),
            qr_renderer,
            dirty: Dirty::ALL,
            grain_opacity_factor: config.grain_opacity_factor,
            handle_size_px: config.handle_size_px,
        }
    }

    /// Scene for a custom [`QrEncoder`].
    pub fn with_qr_encoder(
        width: u32,
        height: u32,
        config: &EditorConfig,
        encoder: Box<dyn QrEncoder>,
    ) -> Self {
        Self::with_encoder(width, height, config, QrRenderer::new(encoder))
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// True once a frame has been composited.
    pub fn is_initialized(&self) -> bool {
        self.surface.is_some()
    }

    /// The last composited frame.
    pub fn surface(&self) -> Option<&RgbaImage> {
        self.surface.as_ref()
    }

    /// Resize the surface. Every layer is redrawn on the next render.
    pub fn resize(&mut self, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        if (width, height) == (self.width, self.height) {
            return;
        }
        tracing::debug!(width, height, "scene resized");
        self.width = width;
        self.height = height;
        self.background_layer = None;
        self.grain_layer = None;
        self.qr_layer = None;
        self.invalidate_all();
    }

    pub fn invalidate_background(&mut self) {
        self.dirty.background = true;
    }

    pub fn invalidate_grain(&mut self) {
        self.dirty.grain = true;
    }

    /// Redraw the QR layer with the current bitmap.
    pub fn invalidate_qr(&mut self) {
        self.dirty.qr = true;
    }

    /// Recolor or re-encode the QR bitmap, then redraw its layer.
    pub fn invalidate_qr_bitmap(&mut self) {
        self.dirty.qr_bitmap = true;
        self.dirty.qr = true;
    }

    pub fn invalidate_all(&mut self) {
        self.dirty = Dirty::ALL;
    }

    /// Mark layers affected by a merge. Module color changes are left to
    /// the caller, which debounces them into [`Self::invalidate_qr_bitmap`].
    pub fn apply_changes(&mut self, changes: Changes) {
        if changes.device {
            self.invalidate_all();
            return;
        }
        if changes.fill {
            self.invalidate_background();
        }
        if changes.qr_payload {
            self.invalidate_qr_bitmap();
        }
        if changes.qr_layout {
            self.invalidate_qr();
        }
        // Grain amount is a composite-time opacity; no layer to redraw
    }

    /// Encode `payload` ahead of a merge so a failure leaves the design untouched.
    pub fn prepare_payload(&mut self, payload: &str) -> Result<()> {
        self.qr_renderer.prepare(payload)
    }

    pub fn qr_is_stale(&self, state: &DesignState) -> bool {
        self.qr_renderer.is_stale(state.qr())
    }

    /// Hand a decoded background image to the compositor.
    pub fn upload_background(
        &mut self,
        source: ImageSource,
        image: DynamicImage,
        registry: &mut ResourceRegistry,
    ) {
        self.compositor.upload(source, image, registry);
        self.invalidate_background();
    }

    pub fn background_failed(&mut self, source: ImageSource, registry: &mut ResourceRegistry) {
        self.compositor.mark_failed(source, registry);
        self.invalidate_background();
    }

    pub fn clear_background_images(&mut self) {
        self.compositor.clear_images();
    }

    /// Drop decoded backgrounds whose source fails `keep`.
    pub fn retain_background_images(&mut self, keep: impl Fn(&ImageSource) -> bool) {
        self.compositor.retain(keep);
    }

    pub fn cached_background_count(&self) -> usize {
        self.compositor.cached_count()
    }

    pub fn has_background_image(&self, source: &ImageSource) -> bool {
        self.compositor.has_image_for(source)
    }

    /// QR container square in surface pixels.
    pub fn qr_box(&self, state: &DesignState) -> QrBox {
        let canvas = DeviceCanvas::new(self.width, self.height);
        let qr = state.qr();
        QrBox {
            center_x: qr.position_percent.x * self.width as f32,
            center_y: qr.position_percent.y * self.height as f32,
            side: invariants::qr_side_px(&canvas, qr.scale),
        }
    }

    /// Redraw dirty layers and composite a new frame.
    pub fn render(&mut self, state: &DesignState, chrome: Option<&ChromeOverlay>) {
        let (w, h) = (self.width, self.height);

        if self.dirty.background || self.background_layer.is_none() {
            tracing::debug!(width = w, height = h, "drawing background layer");
            self.background_layer = Some(self.compositor.render(&state.background().fill, w, h));
            self.dirty.background = false;
        }

        // Grain 0 needs no layer; once built it is kept across amount changes
        let opacity = grain_opacity(state.background().grain, self.grain_opacity_factor);
        if opacity > 0.0 && (self.dirty.grain || self.grain_layer.is_none()) {
            self.grain_layer = Some(self.grain_texture.render_layer(w, h));
            self.dirty.grain = false;
        }

        if self.dirty.qr_bitmap {
            if let Err(e) = self.qr_renderer.regenerate(state.qr()) {
                tracing::warn!(error = %e, "QR regeneration failed; drawing border only");
            }
            self.dirty.qr_bitmap = false;
        }

        if self.dirty.qr || self.qr_layer.is_none() {
            tracing::debug!("drawing QR layer");
            let mut layer = RgbaImage::new(w, h);
            self.qr_renderer.draw(&mut layer, state.qr(), self.qr_box(state));
            self.qr_layer = Some(layer);
            self.dirty.qr = false;
        }

        let mut frame = self
            .background_layer
            .clone()
            .unwrap_or_else(|| RgbaImage::new(w, h));

        if opacity > 0.0
            && let Some(grain) = &self.grain_layer
        {
            composite(&mut frame, grain, GRAIN_BLEND, opacity);
        }

        if let Some(qr) = &self.qr_layer {
            composite(&mut frame, qr, BlendMode::Normal, 1.0);
        }

        if let Some(chrome) = chrome
            && !chrome.is_empty()
        {
            self.draw_chrome(&mut frame, state, chrome);
        }

        self.surface = Some(frame);
    }

    fn draw_chrome(&self, frame: &mut RgbaImage, state: &DesignState, chrome: &ChromeOverlay) {
        let (w, h) = (self.width as f32, self.height as f32);
        if chrome.snapped_x {
            vertical_guide(frame, w / 2.0, GUIDE_PX, GUIDE_COLOR);
        }
        if chrome.snapped_y {
            horizontal_guide(frame, h / 2.0, GUIDE_PX, GUIDE_COLOR);
        }

        if !(chrome.hovering || chrome.selected) {
            return;
        }
        let qr_box = self.qr_box(state);
        let square = RotatedSquare::new(
            qr_box.center_x,
            qr_box.center_y,
            qr_box.half(),
            state.qr().rotation_degrees,
        );
        stroke_square(frame, square, OUTLINE_PX, SELECTION_COLOR);

        if chrome.selected {
            let half = self.handle_size_px / 2.0;
            for (cx, cy) in square.corners() {
                let handle = RotatedSquare::new(cx, cy, half, square.rotation_deg);
                fill_rounded_square(frame, handle, 0.0, Rgba::WHITE);
                stroke_square(frame, handle, OUTLINE_PX / 1.5, SELECTION_COLOR);
            }
        }
    }
}
