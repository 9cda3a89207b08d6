//! # qrwall - QR Code Wallpaper Compositor
//!
//! qrwall builds phone wallpapers that carry a scannable QR code. It provides:
//!
//! - **Design model**: a normalized, serializable description of a wallpaper
//! - **Background compositor**: solid, gradient and cover-fit image fills with grain
//! - **QR artifact**: an optionally bordered, rounded, rotated QR code
//! - **Interaction**: pointer-driven move, resize and rotate with snapping
//! - **History**: bounded undo/redo of whole-design snapshots
//! - **Export**: resolution-independent PNG/JPEG output
//!
//! ## Quick Start
//!
//! ```
//! use qrwall::{
//!     config::EditorConfig,
//!     design::{BackgroundSpec, DesignState, GradientSpec, GradientStop, QrSpec},
//!     color::Rgba,
//!     device::DeviceProfile,
//!     editor::Editor,
//!     export::ExportOptions,
//! };
//!
//! let canvas = DeviceProfile::IPHONE_SE.canvas();
//! let background = BackgroundSpec::gradient(GradientSpec::linear(
//!     135.0,
//!     vec![
//!         GradientStop::new(0.0, Rgba::rgb(255, 94, 98)),
//!         GradientStop::new(1.0, Rgba::rgb(255, 195, 113)),
//!     ],
//! ));
//! let state = DesignState::new(canvas, background, QrSpec::default());
//!
//! let mut editor = Editor::new(state, EditorConfig::default());
//! editor.render();
//! let png = editor.export_image_blocking(&ExportOptions::png(1.0))?;
//! assert_eq!((png.width, png.height), (750, 1334));
//! # Ok::<(), qrwall::error::QrwallError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`design`] | Design state, invariants, patches and documents |
//! | [`render`] | Background, grain, QR and layer compositing |
//! | [`shader`] | Per-pixel math primitives |
//! | [`scene`] | Layered drawing surface with dirty tracking |
//! | [`interaction`] | Transform controller for the QR artifact |
//! | [`history`] | Undo/redo engine |
//! | [`export`] | Scaled rasterization and encoding |
//! | [`editor`] | Facade tying all of the above together |
//! | [`loader`] | Async background image loading |
//! | [`server`] | HTTP API |
//! | [`error`] | Error types |

pub mod color;
pub mod config;
pub mod design;
pub mod device;
pub mod editor;
pub mod error;
pub mod export;
pub mod history;
pub mod interaction;
pub mod loader;
pub mod render;
pub mod resources;
pub mod scene;
pub mod server;
pub mod shader;

// Re-exports for convenience
pub use config::EditorConfig;
pub use design::{DesignDocument, DesignState};
pub use device::DeviceProfile;
pub use editor::Editor;
pub use error::QrwallError;
