//! Domain types shared across the resolution and streaming pipeline.

use serde::Serialize;

/// A validated reference to a single YouTube video.
///
/// Can only be constructed through [`crate::youtube::url::validate`], so
/// holding one proves the URL passed both acceptance checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRef {
    url: String,
    id: String,
}

impl VideoRef {
    pub(crate) fn new(url: String, id: String) -> Self {
        Self { url, id }
    }

    /// The raw URL the client submitted.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The extracted 11-character video id.
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Normalized metadata for one video, produced once per request.
///
/// Missing upstream fields are replaced with fixed fallbacks during
/// normalization, so every field here is ready for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaMetadata {
    pub title: String,
    pub description: String,
    #[serde(rename = "imageUrl")]
    pub thumbnail_url: String,
    #[serde(rename = "videoUrl")]
    pub source_url: String,
    #[serde(rename = "type")]
    pub media_type: &'static str,
    pub author: String,
    pub board: &'static str,
    pub video_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_count: Option<u64>,
}

/// Stream composition of a rendition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Composition {
    /// Muxed audio and video in one stream
    AudioVideo,
    /// Video track only
    VideoOnly,
    /// Audio track only
    AudioOnly,
}

/// One encoded variant of a video, as offered by the upstream.
///
/// The `stream_url` is an opaque handle: it is only ever passed back to
/// [`crate::youtube::VideoSource::open_stream`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendition {
    pub itag: u64,
    pub container: String,
    pub composition: Composition,
    pub content_length: Option<u64>,
    pub quality_label: Option<String>,
    pub mime_type: String,
    pub stream_url: String,
}

/// Result of a successful resolution: metadata plus the full rendition set.
///
/// The rendition order is the upstream's own; preference is imposed later
/// by the selector.
#[derive(Debug, Clone)]
pub struct ResolvedVideo {
    pub metadata: MediaMetadata,
    pub renditions: Vec<Rendition>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_wire_shape() {
        let metadata = MediaMetadata {
            title: "A Video".to_string(),
            description: String::new(),
            thumbnail_url: "https://img.youtube.com/vi/abc/maxresdefault.jpg".to_string(),
            source_url: "https://www.youtube.com/watch?v=abc".to_string(),
            media_type: "video",
            author: "YouTube".to_string(),
            board: "",
            video_id: "abc".to_string(),
            duration: Some(120),
            view_count: None,
        };

        let value = serde_json::to_value(&metadata).unwrap();
        assert_eq!(value["title"], "A Video");
        assert_eq!(value["imageUrl"], "https://img.youtube.com/vi/abc/maxresdefault.jpg");
        assert_eq!(value["videoUrl"], "https://www.youtube.com/watch?v=abc");
        assert_eq!(value["type"], "video");
        assert_eq!(value["videoId"], "abc");
        assert_eq!(value["duration"], 120);
        // Absent optionals are omitted, not null
        assert!(value.get("viewCount").is_none());
    }
}
