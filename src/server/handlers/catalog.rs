//! Health and device catalog handlers.

use axum::{Json, extract::State};
use serde::Serialize;
use std::sync::Arc;

use crate::device::DeviceProfile;

use super::super::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub boot_time: String,
    pub stored_remixes: usize,
}

/// GET /api/health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let stored_remixes = state.remixes.read().await.len();
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        boot_time: state.boot_time.to_rfc3339(),
        stored_remixes,
    })
}

/// GET /api/devices
pub async fn devices() -> Json<&'static [DeviceProfile]> {
    Json(DeviceProfile::ALL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::server::ServerConfig;

    #[tokio::test]
    async fn test_health_reports_ok() {
        let state = Arc::new(
            AppState::new(ServerConfig {
                listen_addr: "127.0.0.1:0".into(),
                editor: EditorConfig::default(),
            })
            .unwrap(),
        );
        let Json(body) = health(State(state)).await;
        assert_eq!(body.status, "ok");
        assert_eq!(body.stored_remixes, 0);
    }

    #[tokio::test]
    async fn test_devices_lists_catalog() {
        let Json(list) = devices().await;
        assert!(list.iter().any(|d| d.name == "iPhone 15 Pro Max"));
    }
}
