//! Error-to-HTTP mapping.
//!
//! Everything the core can fail with is translated here into the wire
//! taxonomy: a 400-class JSON body with a stable `code` and a concrete
//! `error` message. Raw upstream error shapes never cross this boundary.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use vidrelay_core::youtube::{ResolveError, SelectionError, SourceError, ValidationError};

/// A structured API failure: HTTP status plus the `{error, code}` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code,
            message: message.into(),
        }
    }

    pub fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INTERNAL_ERROR",
            message: "Internal server error".to_string(),
        }
    }

    /// Missing `url` field in the request body.
    pub fn missing_url() -> Self {
        Self::bad_request("MISSING_URL", "URL is required")
    }

    /// `url` field present but not a string.
    pub fn invalid_url_type() -> Self {
        Self::bad_request("INVALID_URL_TYPE", "URL must be a string")
    }

    /// Extract-path failure: validation and resolution collapse onto one
    /// code, with the concrete reason in the message.
    pub fn extraction_failed(message: impl std::fmt::Display) -> Self {
        Self::bad_request(
            "EXTRACTION_FAILED",
            format!("Failed to extract YouTube media: {message}"),
        )
    }

    /// Extract-path validation failure: a blank URL keeps its own code,
    /// everything else collapses onto `EXTRACTION_FAILED`.
    pub fn extract_validation(error: &ValidationError) -> Self {
        match error {
            ValidationError::Empty => Self::missing_url(),
            _ => Self::extraction_failed(error),
        }
    }

    /// Download-path validation failure: pattern mismatches and host or
    /// id rejections carry distinct codes.
    pub fn download_validation(error: &ValidationError) -> Self {
        match error {
            ValidationError::Empty => Self::missing_url(),
            ValidationError::InvalidFormat => {
                Self::bad_request("INVALID_URL_FORMAT", error.to_string())
            }
            ValidationError::HostNotSupported { .. } | ValidationError::MalformedId { .. } => {
                Self::bad_request("INVALID_YOUTUBE_URL", error.to_string())
            }
        }
    }

    /// Download-path resolution failure.
    pub fn download_failed(error: &ResolveError) -> Self {
        Self::bad_request(
            "DOWNLOAD_FAILED",
            format!("Failed to download YouTube video: {error}"),
        )
    }

    /// No deliverable rendition in the resolved set.
    pub fn no_format(error: &SelectionError) -> Self {
        Self::bad_request(
            "DOWNLOAD_FAILED",
            format!("Failed to download YouTube video: {error}"),
        )
    }

    /// Stream open was denied before any body byte was sent.
    pub fn download_init_failed(error: &SourceError) -> Self {
        Self::bad_request(
            "DOWNLOAD_INIT_FAILED",
            format!("Failed to open video stream: {error}"),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "code": self.code,
        }));
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_validation_codes() {
        assert_eq!(
            ApiError::extract_validation(&ValidationError::Empty).code,
            "MISSING_URL"
        );
        assert_eq!(
            ApiError::extract_validation(&ValidationError::InvalidFormat).code,
            "EXTRACTION_FAILED"
        );
        assert_eq!(
            ApiError::extract_validation(&ValidationError::MalformedId {
                id: "x".to_string()
            })
            .code,
            "EXTRACTION_FAILED"
        );
    }

    #[test]
    fn test_download_validation_codes() {
        assert_eq!(
            ApiError::download_validation(&ValidationError::Empty).code,
            "MISSING_URL"
        );
        assert_eq!(
            ApiError::download_validation(&ValidationError::InvalidFormat).code,
            "INVALID_URL_FORMAT"
        );
        assert_eq!(
            ApiError::download_validation(&ValidationError::HostNotSupported {
                host: "vimeo.com".to_string()
            })
            .code,
            "INVALID_YOUTUBE_URL"
        );
        assert_eq!(
            ApiError::download_validation(&ValidationError::MalformedId {
                id: "x".to_string()
            })
            .code,
            "INVALID_YOUTUBE_URL"
        );
    }

    #[test]
    fn test_resolve_errors_keep_actionable_messages() {
        let blocked = ApiError::download_failed(&ResolveError::UpstreamBlocked { attempts: 5 });
        assert_eq!(blocked.code, "DOWNLOAD_FAILED");
        assert!(blocked.message.contains("blocking automated access"));

        let private = ApiError::extraction_failed(ResolveError::VideoPrivate);
        assert_eq!(private.code, "EXTRACTION_FAILED");
        assert!(private.message.contains("private"));
    }

    #[test]
    fn test_all_input_failures_are_400() {
        for error in [
            ApiError::missing_url(),
            ApiError::invalid_url_type(),
            ApiError::extraction_failed("x"),
            ApiError::no_format(&SelectionError::NoSuitableFormat),
        ] {
            assert_eq!(error.status, StatusCode::BAD_REQUEST);
        }
        assert_eq!(
            ApiError::internal().status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
