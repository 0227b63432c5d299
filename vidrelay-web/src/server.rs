//! HTTP server assembly for Vidrelay.
//!
//! Builds the router over a shared [`Resolver`] and serves it. The
//! resolver is the only shared state; it is stateless across requests,
//! so no cross-request coordination exists.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tracing::info;
use vidrelay_core::config::VidrelayConfig;
use vidrelay_core::youtube::{InnertubeSource, Resolver, RetryPolicy, RotatingIdentities};

use crate::handlers::{download_media, extract_media, health};

/// Shared application state, cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<Resolver>,
}

impl AppState {
    /// State backed by the production Innertube source.
    ///
    /// # Errors
    /// Returns an error when the upstream HTTP client cannot be built.
    pub fn new(config: &VidrelayConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let source = Arc::new(InnertubeSource::new(&config.upstream)?);
        let resolver = Resolver::new(
            source,
            Arc::new(RotatingIdentities::new()),
            RetryPolicy::from_config(&config.retry),
        );
        Ok(Self::with_resolver(resolver))
    }

    /// State over an arbitrary resolver; used by tests to inject a
    /// scripted upstream.
    pub fn with_resolver(resolver: Resolver) -> Self {
        Self {
            resolver: Arc::new(resolver),
        }
    }
}

/// Builds the API router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/extract", post(extract_media))
        .route("/download", post(download_media))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Runs the server until the process is stopped.
pub async fn run_server(config: VidrelayConfig) -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::new(&config)?;
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Vidrelay API running on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
