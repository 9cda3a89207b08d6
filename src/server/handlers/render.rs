//! Design rendering handler.

use axum::{
    Json,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};
use image::DynamicImage;
use serde::Deserialize;
use std::sync::Arc;

use crate::design::{BackgroundFill, DesignDocument, DesignState, ImageSource, from_serializable};
use crate::error::QrwallError;
use crate::export::{ExportFormat, ExportOptions, render_design};
use crate::loader::{ImageLoader, LoadRequest};

use super::super::state::AppState;
use super::{ApiError, api_error};

/// Query parameters for the render endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct RenderQuery {
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub scale: Option<f32>,
    #[serde(default)]
    pub quality: Option<f32>,
}

impl RenderQuery {
    fn options(&self) -> Result<ExportOptions, QrwallError> {
        let defaults = ExportOptions::default();
        let format = match &self.format {
            Some(name) => name.parse::<ExportFormat>()?,
            None => defaults.format,
        };
        Ok(ExportOptions {
            format,
            quality: self.quality.unwrap_or(defaults.quality),
            scale: self.scale.unwrap_or(defaults.scale),
        })
    }
}

/// POST /api/render?format=png&scale=2
///
/// Body is a design document; response is the encoded image.
pub async fn render(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RenderQuery>,
    Json(document): Json<DesignDocument>,
) -> Result<impl IntoResponse, ApiError> {
    let options = query.options().map_err(api_error)?;
    let design = from_serializable(document).map_err(api_error)?;
    let background = fetch_background(&state.loader, &design).await;
    let config = state.config.editor.clone();

    let exported = tokio::task::spawn_blocking(move || {
        render_design(&design, background, &config, &options)
    })
    .await
    .map_err(|e| api_error(QrwallError::Server(format!("Render task failed: {}", e))))?
    .map_err(api_error)?;

    tracing::info!(
        width = exported.width,
        height = exported.height,
        format = %exported.format,
        bytes = exported.bytes.len(),
        "rendered design"
    );

    Ok((
        [(header::CONTENT_TYPE, exported.format.mime_type())],
        exported.bytes,
    ))
}

/// Only remote images are fetched for HTTP clients; a failed fetch renders
/// the white fallback instead of failing the request.
async fn fetch_background(loader: &ImageLoader, design: &DesignState) -> Option<DynamicImage> {
    let BackgroundFill::Image { source } = &design.background().fill else {
        return None;
    };
    let ImageSource::Url(url) = source else {
        tracing::warn!(?source, "only URL backgrounds can be rendered over HTTP");
        return None;
    };
    match loader.load(LoadRequest::Url(url.clone())).await {
        Ok(image) => Some(image),
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "background fetch failed, using fallback fill");
            None
        }
    }
}
