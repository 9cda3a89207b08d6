//! # HTTP Server for Rendering and Sharing Designs
//!
//! A small JSON API around the export pipeline.
//!
//! ## Usage
//!
//! ```bash
//! qrwall serve --listen 0.0.0.0:8080
//! ```
//!
//! | Method | Path | Body | Response |
//! |--------|------|------|----------|
//! | GET | `/api/health` | | status JSON |
//! | GET | `/api/devices` | | device catalog |
//! | POST | `/api/render?format&scale&quality` | design document | PNG/JPEG bytes |
//! | POST | `/api/remix` | design document | `{"id": uuid}` |
//! | GET | `/api/remix/:id` | | design document |

mod handlers;
mod state;

pub use state::{AppState, ServerConfig};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::trace::TraceLayer;

use crate::error::QrwallError;
use state::REMIX_EXPIRATION_SECS;

/// Design documents are small; anything larger is not a design.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Build the API router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(handlers::catalog::health))
        .route("/api/devices", get(handlers::catalog::devices))
        .route("/api/render", post(handlers::render::render))
        .route("/api/remix", post(handlers::remix::create))
        .route("/api/remix/:id", get(handlers::remix::get))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use qrwall::config::EditorConfig;
/// use qrwall::server::{serve, ServerConfig};
///
/// # async fn example() -> Result<(), qrwall::error::QrwallError> {
/// let config = ServerConfig {
///     listen_addr: "0.0.0.0:8080".to_string(),
///     editor: EditorConfig::default(),
/// };
///
/// serve(config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig) -> Result<(), QrwallError> {
    let app_state = Arc::new(AppState::new(config.clone())?);

    tokio::spawn(cleanup_remixes(app_state.clone()));

    let app = router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| {
            QrwallError::Server(format!("Failed to bind to {}: {}", config.listen_addr, e))
        })?;

    tracing::info!(addr = %config.listen_addr, "qrwall HTTP server listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| QrwallError::Server(format!("Server error: {}", e)))?;

    Ok(())
}

/// Background task dropping remixes nobody has read for a while.
async fn cleanup_remixes(state: Arc<AppState>) {
    let mut interval = tokio::time::interval(Duration::from_secs(60));
    let expiration = Duration::from_secs(REMIX_EXPIRATION_SECS);

    loop {
        interval.tick().await;
        let now = Instant::now();

        let mut remixes = state.remixes.write().await;
        let before = remixes.len();
        remixes.retain(|_, v| now.duration_since(v.last_accessed) < expiration);
        let after = remixes.len();
        if before != after {
            tracing::info!(
                removed = before - after,
                remaining = after,
                "cleaned up expired remixes"
            );
        }
    }
}
