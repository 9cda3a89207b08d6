//! # Rendering Module
//!
//! Layer rasterizers for the wallpaper composition. Each produces a
//! straight-alpha [`image::RgbaImage`] sized to the target surface; the
//! [`crate::scene`] host caches them and composites in z-order.
//!
//! ## Modules
//!
//! - [`background`]: solid, gradient and cover-scaled image fills
//! - [`gradient`]: linear/radial geometry and color ramps
//! - [`grain`]: tileable noise overlay
//! - [`qr`]: QR encoding, bordered artifact drawing, regeneration debounce
//! - [`shapes`]: anti-aliased rotated squares and guide lines
//! - [`composer`]: blend modes and layer compositing
//!
//! ## Usage Example
//!
//! ```
//! use qrwall::color::Rgba;
//! use qrwall::design::{GradientSpec, GradientStop};
//! use qrwall::render::gradient::render_gradient;
//!
//! let spec = GradientSpec::linear(
//!     135.0,
//!     vec![
//!         GradientStop::new(0.0, Rgba::rgb(255, 94, 98)),
//!         GradientStop::new(1.0, Rgba::rgb(255, 195, 113)),
//!     ],
//! );
//! let layer = render_gradient(&spec, 1290, 2796);
//! assert_eq!(layer.dimensions(), (1290, 2796));
//! ```

pub mod background;
pub mod composer;
pub mod gradient;
pub mod grain;
pub mod qr;
pub mod shapes;
