//! Upstream access seam.
//!
//! Everything that touches the network goes through [`VideoSource`], so
//! the resolver and relay can be driven by a scripted fake in tests. The
//! production implementation talks to the Innertube player endpoint and
//! fetches rendition bytes with plain GETs.

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use crate::config::UpstreamConfig;
use crate::types::Rendition;

use super::identity::BrowserIdentity;
use super::player::PlayerResponse;

/// Client version presented alongside the web client context.
const WEB_CLIENT_VERSION: &str = "2.20240726.00.00";

/// Transport-level failure from an upstream call.
///
/// Carries enough to classify the failure; the raw reqwest error shapes
/// never leave this module.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// Upstream answered with a non-success HTTP status.
    #[error("upstream returned status {code}: {message}")]
    Status {
        /// HTTP status code
        code: u16,
        /// Response body snippet or status text
        message: String,
    },

    /// Request failed before a response arrived.
    #[error("upstream network error: {reason}")]
    Network {
        /// The reason for the network error
        reason: String,
    },

    /// Response arrived but could not be decoded.
    #[error("upstream response parse error: {reason}")]
    Parse {
        /// The reason for the parse error
        reason: String,
    },
}

impl From<reqwest::Error> for SourceError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            SourceError::Parse {
                reason: error.to_string(),
            }
        } else {
            SourceError::Network {
                reason: error.to_string(),
            }
        }
    }
}

/// A live upstream byte stream for one rendition.
pub struct MediaStream {
    /// Incremental chunks; never buffered whole.
    pub bytes: BoxStream<'static, Result<Bytes, SourceError>>,
    /// Total length when the upstream reports one.
    pub content_length: Option<u64>,
}

impl std::fmt::Debug for MediaStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaStream")
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Upstream video platform, reduced to the two calls the core needs.
#[async_trait]
pub trait VideoSource: Send + Sync + std::fmt::Debug {
    /// Fetches the raw player response for a video id.
    async fn player_info(
        &self,
        video_id: &str,
        identity: &BrowserIdentity,
    ) -> Result<PlayerResponse, SourceError>;

    /// Opens the byte stream for a selected rendition.
    async fn open_stream(
        &self,
        rendition: &Rendition,
        identity: &BrowserIdentity,
    ) -> Result<MediaStream, SourceError>;
}

/// Production source backed by the Innertube player API.
#[derive(Debug)]
pub struct InnertubeSource {
    client: reqwest::Client,
    player_endpoint: String,
}

impl InnertubeSource {
    /// Builds a source from upstream configuration.
    ///
    /// # Errors
    /// - `SourceError::Network` - HTTP client construction failed
    pub fn new(config: &UpstreamConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(SourceError::from)?;

        Ok(Self {
            client,
            player_endpoint: config.player_endpoint.clone(),
        })
    }

    fn player_payload(video_id: &str) -> serde_json::Value {
        json!({
            "context": {
                "client": {
                    "clientName": "WEB",
                    "clientVersion": WEB_CLIENT_VERSION,
                }
            },
            "videoId": video_id,
        })
    }
}

#[async_trait]
impl VideoSource for InnertubeSource {
    async fn player_info(
        &self,
        video_id: &str,
        identity: &BrowserIdentity,
    ) -> Result<PlayerResponse, SourceError> {
        let mut request = self
            .client
            .post(&self.player_endpoint)
            .json(&Self::player_payload(video_id));
        for (name, value) in identity.headers() {
            request = request.header(name, value);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                code: status.as_u16(),
                message: snippet(&message),
            });
        }

        debug!(video_id, "player info fetched");
        response
            .json::<PlayerResponse>()
            .await
            .map_err(|e| SourceError::Parse {
                reason: e.to_string(),
            })
    }

    async fn open_stream(
        &self,
        rendition: &Rendition,
        identity: &BrowserIdentity,
    ) -> Result<MediaStream, SourceError> {
        let mut request = self.client.get(&rendition.stream_url);
        for (name, value) in identity.headers() {
            request = request.header(name, value);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                code: status.as_u16(),
                message: status.canonical_reason().unwrap_or("stream open denied").to_string(),
            });
        }

        let content_length = response.content_length().or(rendition.content_length);
        let bytes = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(SourceError::from))
            .boxed();

        debug!(itag = rendition.itag, content_length, "stream opened");
        Ok(MediaStream {
            bytes,
            content_length,
        })
    }
}

/// Bounds upstream error text carried in our own errors.
fn snippet(text: &str) -> String {
    const MAX: usize = 200;
    if text.len() <= MAX {
        text.to_string()
    } else {
        let mut end = MAX;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        text[..end].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_payload_shape() {
        let payload = InnertubeSource::player_payload("dQw4w9WgXcQ");

        assert_eq!(payload["videoId"], "dQw4w9WgXcQ");
        assert_eq!(payload["context"]["client"]["clientName"], "WEB");
        assert!(
            payload["context"]["client"]["clientVersion"]
                .as_str()
                .is_some()
        );
    }

    #[test]
    fn test_snippet_bounds_long_bodies() {
        let long = "x".repeat(1000);
        assert_eq!(snippet(&long).len(), 200);
        assert_eq!(snippet("short"), "short");
    }
}
