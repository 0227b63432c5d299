//! Serde models for the upstream player response.
//!
//! Only the fields the resolver consumes are modeled; everything else in
//! the (large) upstream payload is ignored. Numeric fields arrive as JSON
//! strings and are parsed during normalization, not here.

use serde::Deserialize;

/// Raw player response returned by the upstream page-info lookup.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResponse {
    #[serde(default)]
    pub playability_status: PlayabilityStatus,
    #[serde(default)]
    pub video_details: Option<VideoDetails>,
    #[serde(default)]
    pub streaming_data: Option<StreamingData>,
}

/// Whether the upstream considers the video playable, and why not.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayabilityStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub reason: Option<String>,
}

impl PlayabilityStatus {
    pub fn is_ok(&self) -> bool {
        self.status == "OK"
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetails {
    #[serde(default)]
    pub video_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    /// Duration in whole seconds, as a decimal string
    #[serde(default)]
    pub length_seconds: Option<String>,
    /// View count, as a decimal string
    #[serde(default)]
    pub view_count: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<ThumbnailSet>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailSet {
    #[serde(default)]
    pub thumbnails: Vec<Thumbnail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thumbnail {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// Available encodings: `formats` are progressive (muxed audio+video),
/// `adaptive_formats` carry a single track each.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamingData {
    #[serde(default)]
    pub formats: Vec<RawFormat>,
    #[serde(default)]
    pub adaptive_formats: Vec<RawFormat>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFormat {
    #[serde(default)]
    pub itag: u64,
    /// Direct stream URL. Absent for signature-ciphered formats, which
    /// are skipped during normalization.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Byte length as a decimal string, when the upstream knows it
    #[serde(default)]
    pub content_length: Option<String>,
    #[serde(default)]
    pub quality_label: Option<String>,
    #[serde(default)]
    pub bitrate: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_minimal_player_response() {
        let raw = serde_json::json!({
            "playabilityStatus": {"status": "OK"},
            "videoDetails": {
                "videoId": "dQw4w9WgXcQ",
                "title": "Test",
                "lengthSeconds": "212",
                "viewCount": "1000",
                "thumbnail": {"thumbnails": [{"url": "https://i.ytimg.com/a.jpg", "width": 120, "height": 90}]}
            },
            "streamingData": {
                "formats": [{"itag": 18, "url": "https://r1.example/v", "mimeType": "video/mp4; codecs=\"avc1\"", "contentLength": "12345"}],
                "adaptiveFormats": []
            }
        });

        let response: PlayerResponse = serde_json::from_value(raw).unwrap();
        assert!(response.playability_status.is_ok());

        let details = response.video_details.unwrap();
        assert_eq!(details.video_id.as_deref(), Some("dQw4w9WgXcQ"));
        assert_eq!(details.length_seconds.as_deref(), Some("212"));

        let streaming = response.streaming_data.unwrap();
        assert_eq!(streaming.formats.len(), 1);
        assert_eq!(streaming.formats[0].itag, 18);
    }

    #[test]
    fn test_parses_denied_response_without_streaming_data() {
        let raw = serde_json::json!({
            "playabilityStatus": {
                "status": "LOGIN_REQUIRED",
                "reason": "Sign in to confirm you're not a bot"
            }
        });

        let response: PlayerResponse = serde_json::from_value(raw).unwrap();
        assert!(!response.playability_status.is_ok());
        assert!(response.streaming_data.is_none());
    }
}
