//! Streaming download handler.
//!
//! Orchestrates validate → resolve → select → open → relay. Everything up
//! to stream-open fails as 400 JSON; once the response headers are sent,
//! failures can only end the body and close the connection.

use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::http::{Response, StatusCode, header};
use tracing::{info, warn};
use vidrelay_core::streaming::{RelayStream, TransferSession, download_headers};
use vidrelay_core::youtube::{self, select_rendition};

use super::MediaRequest;
use crate::error::ApiError;
use crate::server::AppState;

/// `POST /download` - stream the selected rendition to the client.
pub async fn download_media(
    State(state): State<AppState>,
    Json(request): Json<MediaRequest>,
) -> Result<Response<Body>, ApiError> {
    let url = request.required_url()?;
    let video = youtube::validate(url).map_err(|error| {
        warn!(%error, "download request rejected");
        ApiError::download_validation(&error)
    })?;

    let resolved = state
        .resolver
        .resolve(&video)
        .await
        .map_err(|error| ApiError::download_failed(&error))?;

    let rendition = select_rendition(&resolved.renditions)
        .map_err(|error| ApiError::no_format(&error))?
        .clone();

    let stream = state
        .resolver
        .open_stream(&rendition)
        .await
        .map_err(|error| {
            warn!(id = video.id(), %error, "stream open failed");
            ApiError::download_init_failed(&error)
        })?;

    let headers = download_headers(&resolved.metadata, &rendition, chrono::Utc::now());
    let content_length = headers.content_length.or(stream.content_length);

    info!(
        id = video.id(),
        itag = rendition.itag,
        container = %rendition.container,
        content_length,
        "starting download stream"
    );

    let session = TransferSession::new();
    let relay = RelayStream::new(stream.bytes, session);

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, &headers.content_type)
        .header(header::CONTENT_DISPOSITION, headers.content_disposition())
        .header(header::CACHE_CONTROL, "no-cache")
        .header(
            "Access-Control-Expose-Headers",
            "Content-Disposition, Content-Length",
        );
    if let Some(length) = content_length {
        builder = builder.header(header::CONTENT_LENGTH, length);
    }

    builder
        .body(Body::from_stream(relay))
        .map_err(|_| ApiError::internal())
}
