//! Health and metadata extraction handlers.

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};
use tracing::info;
use vidrelay_core::youtube;

use super::MediaRequest;
use crate::error::ApiError;
use crate::server::AppState;

/// Service name reported by the health probe.
const SERVICE_NAME: &str = "Vidrelay API";

/// `GET /health` - liveness probe, always 200.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "service": SERVICE_NAME,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// `POST /extract` - validate the URL, resolve metadata, return it as JSON.
///
/// All failures here are user-input shaped and map to 400, never 500.
pub async fn extract_media(
    State(state): State<AppState>,
    Json(request): Json<MediaRequest>,
) -> Result<Json<Value>, ApiError> {
    let url = request.required_url()?;
    let video = youtube::validate(url).map_err(|error| ApiError::extract_validation(&error))?;

    let resolved = state
        .resolver
        .resolve(&video)
        .await
        .map_err(|error| ApiError::extraction_failed(&error))?;

    info!(id = video.id(), title = %resolved.metadata.title, "metadata extracted");
    Ok(Json(json!({
        "success": true,
        "data": resolved.metadata,
    })))
}
