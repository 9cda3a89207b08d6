//! QR artifact rendering.
//!
//! The payload is encoded once into a [`QrMatrix`] and colored into a tiny
//! bitmap with one pixel per module. Drawing maps every target pixel back
//! into that bitmap (nearest neighbour), so the artifact stays crisp at any
//! scale, rotation or export resolution.
//!
//! ```text
//!   ┌─────────────────────┐  plate: side + border, rounded corners
//!   │  ┌───────────────┐  │
//!   │  │ ▓▓ ░░ ▓▓ ░░ ▓ │  │  QR: `side` = scale × min(w, h)
//!   │  │ ░░ ▓▓ ░░ ▓▓ ░ │  │
//!   │  └───────────────┘  │
//!   └─────────────────────┘
//! ```

use std::time::{Duration, Instant};

use image::RgbaImage;
use qrcode::{EcLevel, QrCode};

use crate::color::Rgba;
use crate::design::{QrBox, QrSpec, QrStyle};
use crate::error::{QrwallError, Result};
use crate::render::composer::{BlendMode, blend_pixel};
use crate::render::shapes::{RotatedSquare, fill_rounded_square};
use crate::shader::{coverage, sd_rounded_box};

/// A square grid of dark/light modules, without quiet zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrMatrix {
    width: usize,
    dark: Vec<bool>,
}

impl QrMatrix {
    pub fn new(width: usize, dark: Vec<bool>) -> Result<Self> {
        if width == 0 || dark.len() != width * width {
            return Err(QrwallError::QrEncode(format!(
                "matrix of width {} needs {} modules, got {}",
                width,
                width * width,
                dark.len()
            )));
        }
        Ok(Self { width, dark })
    }

    /// Modules per side.
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        self.dark[y * self.width + x]
    }
}

/// Turns payload text into a module matrix.
pub trait QrEncoder: Send + Sync {
    fn encode(&self, payload: &str) -> Result<QrMatrix>;
}

/// [`QrEncoder`] backed by the `qrcode` crate.
#[derive(Debug, Clone, Copy)]
pub struct QrcodeEncoder {
    level: EcLevel,
}

impl QrcodeEncoder {
    pub fn new(level: EcLevel) -> Self {
        Self { level }
    }
}

impl Default for QrcodeEncoder {
    fn default() -> Self {
        Self::new(EcLevel::M)
    }
}

impl QrEncoder for QrcodeEncoder {
    fn encode(&self, payload: &str) -> Result<QrMatrix> {
        let code = QrCode::with_error_correction_level(payload, self.level)
            .map_err(|e| QrwallError::QrEncode(format!("QR code generation failed: {}", e)))?;
        let dark = code
            .to_colors()
            .into_iter()
            .map(|c| c == qrcode::Color::Dark)
            .collect();
        QrMatrix::new(code.width(), dark)
    }
}

/// Color a matrix into a `side_px × side_px` bitmap.
pub fn rasterize(matrix: &QrMatrix, style: &QrStyle, side_px: u32) -> RgbaImage {
    let side = side_px.max(1);
    let n = matrix.width();
    let dark = style.primary_color.to_pixel();
    let light = style.secondary_color.to_pixel();
    RgbaImage::from_fn(side, side, |x, y| {
        let mx = (x as usize * n / side as usize).min(n - 1);
        let my = (y as usize * n / side as usize).min(n - 1);
        if matrix.is_dark(mx, my) { dark } else { light }
    })
}

/// Encode `payload` and rasterize it at `side_px`.
pub fn generate(
    encoder: &dyn QrEncoder,
    payload: &str,
    style: &QrStyle,
    side_px: u32,
) -> Result<RgbaImage> {
    let matrix = encoder.encode(payload)?;
    Ok(rasterize(&matrix, style, side_px))
}

/// Border plate dimensions for a QR of side `qr_side` pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BorderGeometry {
    /// Added to the QR side; negative shrinks the plate under the QR
    pub border: f32,
    pub plate_side: f32,
    pub corner_radius: f32,
}

impl BorderGeometry {
    pub fn new(qr_side: f32, style: &QrStyle) -> Self {
        let border = qr_side * style.border_size_ratio / 100.0;
        let plate_side = qr_side + border;
        // Fraction of the plate's half side, so 100% is a full pill
        let corner_radius = (plate_side / 2.0) * style.corner_radius_ratio / 100.0;
        Self {
            border,
            plate_side,
            corner_radius,
        }
    }

    pub fn has_plate(&self) -> bool {
        self.plate_side > 0.0
    }
}

/// Draw the bordered QR onto `layer`, centered on `qr_box` and rotated by
/// `qr.rotation_degrees`. `bitmap` holds one pixel per module.
pub fn draw_artifact(layer: &mut RgbaImage, bitmap: Option<&RgbaImage>, qr: &QrSpec, qr_box: QrBox) {
    let square = RotatedSquare::new(qr_box.center_x, qr_box.center_y, qr_box.half(), qr.rotation_degrees);
    let border = BorderGeometry::new(qr_box.side, &qr.style);

    if border.has_plate() {
        let plate = RotatedSquare {
            half: border.plate_side / 2.0,
            ..square
        };
        fill_rounded_square(layer, plate, border.corner_radius, qr.style.border_color);
    }

    let Some(bitmap) = bitmap else {
        return;
    };
    let (bw, bh) = bitmap.dimensions();
    if bw == 0 || bh == 0 || square.half <= 0.0 {
        return;
    }
    let Some((x0, y0, x1, y1)) = square.pixel_bounds(1.0, layer.width(), layer.height()) else {
        return;
    };

    let side = qr_box.side;
    for y in y0..y1 {
        for x in x0..x1 {
            let (lx, ly) = square.to_local(x as f32 + 0.5, y as f32 + 0.5);
            let cov = coverage(sd_rounded_box(lx, ly, square.half, square.half, 0.0));
            if cov <= 0.0 {
                continue;
            }
            let u = ((lx + square.half) / side * bw as f32).floor().clamp(0.0, (bw - 1) as f32);
            let v = ((ly + square.half) / side * bh as f32).floor().clamp(0.0, (bh - 1) as f32);
            let src = *bitmap.get_pixel(u as u32, v as u32);
            blend_pixel(layer.get_pixel_mut(x, y), src, BlendMode::Normal, cov);
        }
    }
}

/// Holds the encoded matrix and its colored module bitmap.
pub struct QrRenderer {
    encoder: Box<dyn QrEncoder>,
    matrix: Option<(String, QrMatrix)>,
    bitmap: Option<RgbaImage>,
    colors: Option<(Rgba, Rgba)>,
}

impl std::fmt::Debug for QrRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QrRenderer")
            .field("payload", &self.matrix.as_ref().map(|(p, _)| p))
            .field("colors", &self.colors)
            .finish_non_exhaustive()
    }
}

impl Default for QrRenderer {
    fn default() -> Self {
        Self::new(Box::new(QrcodeEncoder::default()))
    }
}

impl QrRenderer {
    pub fn new(encoder: Box<dyn QrEncoder>) -> Self {
        Self {
            encoder,
            matrix: None,
            bitmap: None,
            colors: None,
        }
    }

    /// Check that `payload` encodes, caching the result.
    pub fn prepare(&mut self, payload: &str) -> Result<()> {
        if matches!(&self.matrix, Some((p, _)) if p == payload) {
            return Ok(());
        }
        let matrix = self.encoder.encode(payload)?;
        tracing::debug!(modules = matrix.width(), "QR payload encoded");
        self.matrix = Some((payload.to_string(), matrix));
        // Bitmap belongs to the old matrix
        self.bitmap = None;
        self.colors = None;
        Ok(())
    }

    /// Bring the bitmap in line with the payload and module colors of `qr`.
    pub fn regenerate(&mut self, qr: &QrSpec) -> Result<()> {
        self.prepare(&qr.payload_url)?;
        let colors = (qr.style.primary_color, qr.style.secondary_color);
        if self.bitmap.is_some() && self.colors == Some(colors) {
            return Ok(());
        }
        if let Some((_, matrix)) = &self.matrix {
            let n = matrix.width() as u32;
            self.bitmap = Some(rasterize(matrix, &qr.style, n));
            self.colors = Some(colors);
        }
        Ok(())
    }

    /// True when payload or module colors differ from the cached bitmap.
    pub fn is_stale(&self, qr: &QrSpec) -> bool {
        let payload_matches = matches!(&self.matrix, Some((p, _)) if *p == qr.payload_url);
        !payload_matches
            || self.bitmap.is_none()
            || self.colors != Some((qr.style.primary_color, qr.style.secondary_color))
    }

    pub fn bitmap(&self) -> Option<&RgbaImage> {
        self.bitmap.as_ref()
    }

    pub fn draw(&self, layer: &mut RgbaImage, qr: &QrSpec, qr_box: QrBox) {
        draw_artifact(layer, self.bitmap(), qr, qr_box);
    }
}

/// Coalesces bursts of color edits into one regeneration.
#[derive(Debug, Clone)]
pub struct RegenDebouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl RegenDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Push the deadline to `now + delay`.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Fires once when the deadline has passed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

impl Default for RegenDebouncer {
    fn default() -> Self {
        Self::new(Duration::from_millis(300))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::Percent2;

    struct Checkerboard(usize);

    impl QrEncoder for Checkerboard {
        fn encode(&self, _payload: &str) -> Result<QrMatrix> {
            let n = self.0;
            QrMatrix::new(n, (0..n * n).map(|i| (i % n + i / n) % 2 == 0).collect())
        }
    }

    fn spec_at(side: f32, border: f32, corner: f32) -> (QrSpec, QrBox) {
        let qr = QrSpec {
            position_percent: Percent2::CENTER,
            style: QrStyle {
                primary_color: Rgba::BLACK,
                secondary_color: Rgba::WHITE,
                border_color: Rgba::rgb(255, 0, 0),
                border_size_ratio: border,
                corner_radius_ratio: corner,
            },
            ..Default::default()
        };
        let qr_box = QrBox {
            center_x: 50.0,
            center_y: 50.0,
            side,
        };
        (qr, qr_box)
    }

    #[test]
    fn test_qrcode_encoder() {
        let matrix = QrcodeEncoder::default().encode("https://example.com").unwrap();
        assert!(matrix.width() >= 21);
        // Finder pattern corner is dark
        assert!(matrix.is_dark(0, 0));
    }

    #[test]
    fn test_payload_too_long() {
        let payload = "x".repeat(8000);
        assert!(matches!(
            QrcodeEncoder::default().encode(&payload),
            Err(QrwallError::QrEncode(_))
        ));
    }

    #[test]
    fn test_matrix_size_mismatch() {
        assert!(QrMatrix::new(3, vec![true; 8]).is_err());
    }

    #[test]
    fn test_rasterize_nearest_neighbour() {
        let matrix = Checkerboard(2).encode("").unwrap();
        let img = rasterize(&matrix, &QrStyle::default(), 4);
        assert_eq!(*img.get_pixel(0, 0), Rgba::BLACK.to_pixel());
        assert_eq!(*img.get_pixel(1, 1), Rgba::BLACK.to_pixel());
        assert_eq!(*img.get_pixel(2, 0), Rgba::WHITE.to_pixel());
        assert_eq!(*img.get_pixel(3, 3), Rgba::BLACK.to_pixel());
    }

    #[test]
    fn test_generate_uses_encoder() {
        let img = generate(&Checkerboard(3), "p", &QrStyle::default(), 9).unwrap();
        assert_eq!(img.dimensions(), (9, 9));
    }

    #[test]
    fn test_border_geometry() {
        let style = QrStyle {
            border_size_ratio: 10.0,
            corner_radius_ratio: 50.0,
            ..Default::default()
        };
        let g = BorderGeometry::new(200.0, &style);
        assert_eq!(g.border, 20.0);
        assert_eq!(g.plate_side, 220.0);
        assert_eq!(g.corner_radius, 55.0);
    }

    #[test]
    fn test_negative_border_shrinks_plate() {
        let style = QrStyle {
            border_size_ratio: -1.0,
            ..Default::default()
        };
        let g = BorderGeometry::new(100.0, &style);
        assert_eq!(g.plate_side, 99.0);
        assert!(g.has_plate());
    }

    #[test]
    fn test_draw_artifact_plate_behind_qr() {
        let mut renderer = QrRenderer::new(Box::new(Checkerboard(2)));
        let (qr, qr_box) = spec_at(40.0, 50.0, 0.0);
        renderer.regenerate(&qr).unwrap();

        let mut layer = RgbaImage::new(100, 100);
        renderer.draw(&mut layer, &qr, qr_box);

        // QR spans 30..70; top-left module is dark
        assert_eq!(*layer.get_pixel(35, 35), Rgba::BLACK.to_pixel());
        assert_eq!(*layer.get_pixel(65, 35), Rgba::WHITE.to_pixel());
        // Plate spans 20..80 and shows only outside the QR
        assert_eq!(*layer.get_pixel(25, 50), Rgba::rgb(255, 0, 0).to_pixel());
        assert_eq!(layer.get_pixel(10, 50)[3], 0);
    }

    #[test]
    fn test_draw_without_bitmap_draws_plate_only() {
        let (qr, qr_box) = spec_at(40.0, 10.0, 0.0);
        let mut layer = RgbaImage::new(100, 100);
        draw_artifact(&mut layer, None, &qr, qr_box);
        assert_eq!(*layer.get_pixel(50, 50), Rgba::rgb(255, 0, 0).to_pixel());
    }

    #[test]
    fn test_renderer_staleness() {
        let mut renderer = QrRenderer::new(Box::new(Checkerboard(3)));
        let (mut qr, _) = spec_at(40.0, 0.0, 0.0);
        assert!(renderer.is_stale(&qr));
        renderer.regenerate(&qr).unwrap();
        assert!(!renderer.is_stale(&qr));

        qr.style.primary_color = Rgba::rgb(0, 0, 255);
        assert!(renderer.is_stale(&qr));
        renderer.regenerate(&qr).unwrap();
        assert_eq!(renderer.bitmap().unwrap().get_pixel(0, 0)[2], 255);

        qr.payload_url = "https://other.example".into();
        assert!(renderer.is_stale(&qr));
    }

    #[test]
    fn test_debouncer_coalesces() {
        let start = Instant::now();
        let mut debouncer = RegenDebouncer::default();
        assert!(!debouncer.poll(start));

        debouncer.schedule(start);
        debouncer.schedule(start + Duration::from_millis(200));
        assert!(!debouncer.poll(start + Duration::from_millis(350)));
        assert!(debouncer.poll(start + Duration::from_millis(500)));
        // Fires once
        assert!(!debouncer.poll(start + Duration::from_millis(900)));
        assert!(!debouncer.is_pending());
    }
}
