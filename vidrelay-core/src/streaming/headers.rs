//! Download response metadata, derived once before streaming begins.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::types::{MediaMetadata, Rendition};

/// Longest sanitized title carried into the attachment filename.
const MAX_TITLE_LEN: usize = 50;

/// Response metadata for one download. Built exactly once, before any
/// body bytes are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadHeaders {
    pub content_type: String,
    /// Attachment filename carried in Content-Disposition
    pub filename: String,
    /// Set only when the rendition reports a known byte length;
    /// never guessed.
    pub content_length: Option<u64>,
}

impl DownloadHeaders {
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.filename)
    }
}

/// Derives the response metadata for a selected rendition.
///
/// The filename combines a sanitized title, a timestamp component to
/// avoid collisions between repeated downloads, and the container
/// extension.
pub fn download_headers(
    metadata: &MediaMetadata,
    rendition: &Rendition,
    now: DateTime<Utc>,
) -> DownloadHeaders {
    let timestamp = now
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    let safe_title = sanitize_title(&metadata.title);

    DownloadHeaders {
        content_type: format!("video/{}", rendition.container),
        filename: format!("youtube-{safe_title}-{timestamp}.{}", rendition.container),
        content_length: rendition.content_length,
    }
}

/// Keeps alphanumerics and spaces, bounded to [`MAX_TITLE_LEN`] chars.
fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .take(MAX_TITLE_LEN)
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::types::Composition;

    fn metadata(title: &str) -> MediaMetadata {
        MediaMetadata {
            title: title.to_string(),
            description: String::new(),
            thumbnail_url: String::new(),
            source_url: String::new(),
            media_type: "video",
            author: "YouTube".to_string(),
            board: "",
            video_id: "dQw4w9WgXcQ".to_string(),
            duration: None,
            view_count: None,
        }
    }

    fn rendition(container: &str, content_length: Option<u64>) -> Rendition {
        Rendition {
            itag: 18,
            container: container.to_string(),
            composition: Composition::AudioVideo,
            content_length,
            quality_label: None,
            mime_type: format!("video/{container}"),
            stream_url: "https://r1.example/18".to_string(),
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 26, 12, 30, 45).unwrap()
    }

    #[test]
    fn test_header_derivation() {
        let headers = download_headers(
            &metadata("My Video: The Sequel!"),
            &rendition("mp4", Some(12345)),
            fixed_now(),
        );

        assert_eq!(headers.content_type, "video/mp4");
        assert_eq!(headers.content_length, Some(12345));
        assert!(headers.filename.starts_with("youtube-My Video The Sequel-"));
        assert!(headers.filename.ends_with(".mp4"));
        assert!(!headers.filename.contains(':'));
        assert_eq!(
            headers.content_disposition(),
            format!("attachment; filename=\"{}\"", headers.filename)
        );
    }

    #[test]
    fn test_unknown_length_is_omitted_not_guessed() {
        let headers = download_headers(&metadata("Title"), &rendition("webm", None), fixed_now());
        assert_eq!(headers.content_length, None);
        assert_eq!(headers.content_type, "video/webm");
    }

    #[test]
    fn test_title_is_sanitized_and_truncated() {
        let long_title = "x".repeat(200);
        let headers =
            download_headers(&metadata(&long_title), &rendition("mp4", None), fixed_now());

        let title_part = headers
            .filename
            .strip_prefix("youtube-")
            .unwrap()
            .split('-')
            .next()
            .unwrap();
        assert_eq!(title_part.len(), MAX_TITLE_LEN);

        let tricky = download_headers(
            &metadata("<script>alert('x')</script> / ../../etc"),
            &rendition("mp4", None),
            fixed_now(),
        );
        assert!(tricky.filename.starts_with("youtube-scriptalertxscript"));
        assert!(!tricky.filename.contains('/'));
        assert!(!tricky.filename.contains('<'));
    }

    #[test]
    fn test_timestamp_differs_between_calls() {
        let first = download_headers(
            &metadata("Title"),
            &rendition("mp4", None),
            Utc.with_ymd_and_hms(2024, 7, 26, 12, 30, 45).unwrap(),
        );
        let second = download_headers(
            &metadata("Title"),
            &rendition("mp4", None),
            Utc.with_ymd_and_hms(2024, 7, 26, 12, 30, 46).unwrap(),
        );
        assert_ne!(first.filename, second.filename);
    }
}
