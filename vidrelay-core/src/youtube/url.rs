//! YouTube URL validation and video id extraction.
//!
//! Two intentionally redundant checks are applied: a pattern match over the
//! known watch/short/embed link forms, and an independent structural check
//! over the parsed URL. Both must accept the input before a [`VideoRef`]
//! is produced.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use url::Url;

use crate::types::VideoRef;

/// Link forms that identify a single video. Each capture group yields the id.
static URL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?:youtube\.com/watch\?(?:.*&)?v=|youtu\.be/|youtube\.com/embed/)([^&\n?#/]+)")
            .expect("valid watch/short/embed pattern"),
        Regex::new(r"youtube\.com/v/([^&\n?#/]+)").expect("valid /v/ pattern"),
    ]
});

/// Hosts accepted by the structural check.
const KNOWN_HOSTS: &[&str] = &[
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "music.youtube.com",
    "youtu.be",
];

/// Errors produced by URL validation. Never retried, always user-facing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Input was empty or whitespace-only.
    #[error("URL is required")]
    Empty,

    /// Input does not match any supported video link form.
    #[error("Invalid YouTube URL format")]
    InvalidFormat,

    /// Input matched a link form but the parsed URL is not a YouTube host.
    #[error("Invalid YouTube URL: unsupported host '{host}'")]
    HostNotSupported {
        /// The host that was rejected
        host: String,
    },

    /// Input matched a link form but the extracted id is malformed.
    #[error("Invalid YouTube URL: malformed video id '{id}'")]
    MalformedId {
        /// The id that was rejected
        id: String,
    },
}

/// Validates an input string as a YouTube video URL.
///
/// Pure function: no I/O, deterministic. The returned [`VideoRef`] is the
/// only way a URL enters the resolver, so everything downstream can assume
/// a well-formed id.
///
/// # Errors
/// - `ValidationError::Empty` - Blank input
/// - `ValidationError::InvalidFormat` - No supported link form matched
/// - `ValidationError::HostNotSupported` - Structural check rejected the host
/// - `ValidationError::MalformedId` - Extracted id is not a valid video id
pub fn validate(input: &str) -> Result<VideoRef, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty);
    }

    let id = extract_video_id(trimmed).ok_or(ValidationError::InvalidFormat)?;

    // Independent structural check, deliberately redundant with the
    // pattern match above.
    let parsed = Url::parse(trimmed).map_err(|_| ValidationError::InvalidFormat)?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ValidationError::InvalidFormat);
    }
    let host = parsed.host_str().unwrap_or_default();
    if !KNOWN_HOSTS.contains(&host) {
        return Err(ValidationError::HostNotSupported {
            host: host.to_string(),
        });
    }
    if !is_valid_video_id(&id) {
        return Err(ValidationError::MalformedId { id });
    }

    Ok(VideoRef::new(trimmed.to_string(), id))
}

/// Extracts the video id from any supported link form.
pub fn extract_video_id(url: &str) -> Option<String> {
    URL_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(url))
        .map(|captures| captures[1].to_string())
}

/// Video ids are exactly 11 characters of the base64url alphabet.
fn is_valid_video_id(id: &str) -> bool {
    id.len() == 11
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_watch_url() {
        let video = validate("https://www.youtube.com/watch?v=dQw4w9WgXcQ").unwrap();
        assert_eq!(video.id(), "dQw4w9WgXcQ");
        assert_eq!(video.url(), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
    }

    #[test]
    fn test_accepts_short_link() {
        let video = validate("https://youtu.be/dQw4w9WgXcQ").unwrap();
        assert_eq!(video.id(), "dQw4w9WgXcQ");
    }

    #[test]
    fn test_accepts_embed_link() {
        let video = validate("https://www.youtube.com/embed/dQw4w9WgXcQ").unwrap();
        assert_eq!(video.id(), "dQw4w9WgXcQ");
    }

    #[test]
    fn test_accepts_v_link() {
        let video = validate("https://www.youtube.com/v/dQw4w9WgXcQ").unwrap();
        assert_eq!(video.id(), "dQw4w9WgXcQ");
    }

    #[test]
    fn test_accepts_watch_url_with_extra_params() {
        let video = validate("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s").unwrap();
        assert_eq!(video.id(), "dQw4w9WgXcQ");
    }

    #[test]
    fn test_rejects_empty_input() {
        assert_eq!(validate(""), Err(ValidationError::Empty));
        assert_eq!(validate("   "), Err(ValidationError::Empty));
    }

    #[test]
    fn test_rejects_non_url_input() {
        assert_eq!(validate("not a url"), Err(ValidationError::InvalidFormat));
    }

    #[test]
    fn test_rejects_other_video_hosts() {
        assert_eq!(
            validate("https://vimeo.com/watch?v=dQw4w9WgXcQ"),
            Err(ValidationError::InvalidFormat)
        );
    }

    #[test]
    fn test_rejects_lookalike_host() {
        // Pattern matches the substring but the structural check sees the
        // real host.
        let result = validate("https://evil.example/youtube.com/watch?v=dQw4w9WgXcQ");
        assert_eq!(
            result,
            Err(ValidationError::HostNotSupported {
                host: "evil.example".to_string()
            })
        );
    }

    #[test]
    fn test_rejects_malformed_id() {
        assert_eq!(
            validate("https://www.youtube.com/watch?v=tooshort"),
            Err(ValidationError::MalformedId {
                id: "tooshort".to_string()
            })
        );
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        assert_eq!(
            validate("ftp://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Err(ValidationError::InvalidFormat)
        );
    }

    #[test]
    fn test_extract_video_id_without_validation() {
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ?si=share"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(extract_video_id("https://example.com/page"), None);
    }
}
