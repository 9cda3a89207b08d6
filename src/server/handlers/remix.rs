//! Shared design ("remix") storage handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use std::{sync::Arc, time::Instant};
use uuid::Uuid;

use crate::design::{DesignDocument, from_serializable, to_serializable};

use super::super::state::{AppState, StoredRemix};
use super::{ApiError, api_error};

#[derive(Debug, Serialize)]
pub struct RemixCreated {
    pub id: Uuid,
}

/// POST /api/remix
///
/// Stores the document after re-applying all design invariants.
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(document): Json<DesignDocument>,
) -> Result<Json<RemixCreated>, ApiError> {
    let design = from_serializable(document).map_err(api_error)?;
    let id = Uuid::new_v4();
    let remix = StoredRemix {
        document: to_serializable(&design),
        created_at: Utc::now(),
        last_accessed: Instant::now(),
    };
    state.remixes.write().await.insert(id, remix);
    tracing::info!(%id, "stored remix");
    Ok(Json(RemixCreated { id }))
}

/// GET /api/remix/:id
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DesignDocument>, ApiError> {
    let mut remixes = state.remixes.write().await;
    let remix = remixes.get_mut(&id).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("remix {} not found", id) })),
        )
    })?;
    remix.last_accessed = Instant::now();
    Ok(Json(remix.document.clone()))
}
