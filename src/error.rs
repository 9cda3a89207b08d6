//! # Error Types
//!
//! This module defines error types used throughout the qrwall library.
//!
//! Out-of-range design values are never errors: they are clamped where they
//! are written (see [`crate::design::invariants`]). Only resource, encoding
//! and export failures surface here.

use thiserror::Error;

/// Main error type for qrwall operations
#[derive(Debug, Error)]
pub enum QrwallError {
    /// A color string could not be parsed as hex
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// The QR payload could not be encoded (e.g. too long for any version)
    #[error("QR encoding failed: {0}")]
    QrEncode(String),

    /// Image fetch, read or decode failure
    #[error("Image load error: {0}")]
    ImageLoad(String),

    /// Encoding the rasterized output failed
    #[error("Image encoding error: {0}")]
    ImageEncode(String),

    /// Export was requested before the scene was ever drawn
    #[error("Drawing surface is not initialized; render the scene before exporting")]
    SurfaceUninitialized,

    /// Export options out of their accepted domain
    #[error("Invalid export options: {0}")]
    InvalidExport(String),

    /// A serialized design document could not be restored
    #[error("Invalid design document: {0}")]
    Document(String),

    /// HTTP service errors (bind, serve)
    #[error("Server error: {0}")]
    Server(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error wrapper
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, QrwallError>;
