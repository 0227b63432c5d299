//! Request handlers for the Vidrelay API.

pub mod api;
pub mod download;

pub use api::{extract_media, health};
pub use download::download_media;

use serde::Deserialize;

use crate::error::ApiError;

/// Shared request body for `/extract` and `/download`.
///
/// `url` is kept as loose JSON so a missing field and a wrong-typed field
/// can be told apart and mapped to their distinct error codes.
#[derive(Debug, Deserialize)]
pub struct MediaRequest {
    #[serde(default)]
    pub url: Option<serde_json::Value>,
    /// Accepted for compatibility; only video delivery is supported.
    #[serde(rename = "type", default)]
    pub media_type: Option<String>,
}

impl MediaRequest {
    /// Extracts the URL string or the matching input error.
    pub fn required_url(&self) -> Result<&str, ApiError> {
        match &self.url {
            None | Some(serde_json::Value::Null) => Err(ApiError::missing_url()),
            Some(serde_json::Value::String(url)) => Ok(url),
            Some(_) => Err(ApiError::invalid_url_type()),
        }
    }
}
