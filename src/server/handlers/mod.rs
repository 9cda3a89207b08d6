//! HTTP API handlers.

pub mod catalog;
pub mod remix;
pub mod render;

use axum::{Json, http::StatusCode};
use serde_json::{Value, json};

use crate::error::QrwallError;

/// Error response shared by every handler: status plus `{"error": "..."}`.
pub type ApiError = (StatusCode, Json<Value>);

pub(crate) fn api_error(err: QrwallError) -> ApiError {
    let status = match err {
        QrwallError::InvalidColor(_)
        | QrwallError::QrEncode(_)
        | QrwallError::InvalidExport(_)
        | QrwallError::Document(_)
        | QrwallError::Json(_) => StatusCode::BAD_REQUEST,
        QrwallError::ImageLoad(_) => StatusCode::BAD_GATEWAY,
        QrwallError::ImageEncode(_)
        | QrwallError::SurfaceUninitialized
        | QrwallError::Server(_)
        | QrwallError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": err.to_string() })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let (status, body) = api_error(QrwallError::QrEncode("data too long".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.0["error"].as_str().unwrap().contains("data too long"));

        let (status, _) = api_error(QrwallError::ImageLoad("timeout".into()));
        assert_eq!(status, StatusCode::BAD_GATEWAY);

        let (status, _) = api_error(QrwallError::SurfaceUninitialized);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
