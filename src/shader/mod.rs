//! # Pixel Math Primitives
//!
//! Small, allocation-free building blocks shared by the background
//! compositor, the QR artifact renderer and the scene chrome. They mirror the
//! operations a fragment shader would perform per pixel.
//!
//! - [`blend`]: interpolation and separable blend functions
//! - [`distance`]: Euclidean distance and signed distance fields
//! - [`noise`]: integer hashing and tileable value noise
//! - [`transform`]: rotation and angle helpers

pub mod blend;
pub mod distance;
pub mod noise;
pub mod transform;

pub use blend::*;
pub use distance::*;
pub use noise::*;
pub use transform::*;
