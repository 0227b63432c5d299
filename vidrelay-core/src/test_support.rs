//! Scripted upstream for tests.
//!
//! Lets resolver and handler tests script an exact sequence of upstream
//! outcomes without any network access, and observe how many calls were
//! actually made.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use parking_lot::Mutex;

use crate::types::Rendition;
use crate::youtube::identity::BrowserIdentity;
use crate::youtube::player::{
    PlayabilityStatus, PlayerResponse, RawFormat, StreamingData, Thumbnail, ThumbnailSet,
    VideoDetails,
};
use crate::youtube::source::{MediaStream, SourceError, VideoSource};

/// Upstream fake that replays a scripted sequence of outcomes.
///
/// Each `player_info` call consumes the next scripted outcome in order.
/// `open_stream` serves the configured chunk sequence.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    player_script: Mutex<VecDeque<Result<PlayerResponse, SourceError>>>,
    stream_chunks: Mutex<Vec<Result<Bytes, SourceError>>>,
    stream_length: Mutex<Option<u64>>,
    player_calls: AtomicU32,
    stream_opens: AtomicU32,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one outcome to the player-info script.
    pub fn push_player(&self, outcome: Result<PlayerResponse, SourceError>) {
        self.player_script.lock().push_back(outcome);
    }

    /// Configures the byte stream served by `open_stream`.
    pub fn set_stream(&self, chunks: Vec<Result<Bytes, SourceError>>, length: Option<u64>) {
        *self.stream_chunks.lock() = chunks;
        *self.stream_length.lock() = length;
    }

    /// Number of `player_info` calls made so far.
    pub fn player_calls(&self) -> u32 {
        self.player_calls.load(Ordering::SeqCst)
    }

    /// Number of `open_stream` calls made so far.
    pub fn stream_opens(&self) -> u32 {
        self.stream_opens.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoSource for ScriptedSource {
    async fn player_info(
        &self,
        _video_id: &str,
        _identity: &BrowserIdentity,
    ) -> Result<PlayerResponse, SourceError> {
        self.player_calls.fetch_add(1, Ordering::SeqCst);
        self.player_script
            .lock()
            .pop_front()
            .unwrap_or_else(|| {
                Err(SourceError::Network {
                    reason: "scripted outcomes exhausted".to_string(),
                })
            })
    }

    async fn open_stream(
        &self,
        _rendition: &Rendition,
        _identity: &BrowserIdentity,
    ) -> Result<MediaStream, SourceError> {
        self.stream_opens.fetch_add(1, Ordering::SeqCst);
        let chunks = self.stream_chunks.lock().clone();
        let content_length = *self.stream_length.lock();
        Ok(MediaStream {
            bytes: futures::stream::iter(chunks).boxed(),
            content_length,
        })
    }
}

/// A playable response with the given id and title and one muxed mp4
/// format plus one video-only webm format.
pub fn playable_response(video_id: &str, title: &str) -> PlayerResponse {
    PlayerResponse {
        playability_status: PlayabilityStatus {
            status: "OK".to_string(),
            reason: None,
        },
        video_details: Some(VideoDetails {
            video_id: Some(video_id.to_string()),
            title: Some(title.to_string()),
            short_description: Some("A description".to_string()),
            author: Some("A Channel".to_string()),
            length_seconds: Some("212".to_string()),
            view_count: Some("31415".to_string()),
            thumbnail: Some(ThumbnailSet {
                thumbnails: vec![Thumbnail {
                    url: format!("https://i.ytimg.com/vi/{video_id}/hqdefault.jpg"),
                    width: Some(480),
                    height: Some(360),
                }],
            }),
        }),
        streaming_data: Some(StreamingData {
            formats: vec![RawFormat {
                itag: 18,
                url: Some(format!("https://r1.example/{video_id}/18")),
                mime_type: Some("video/mp4; codecs=\"avc1.42001E, mp4a.40.2\"".to_string()),
                content_length: Some("5000".to_string()),
                quality_label: Some("360p".to_string()),
                bitrate: Some(500_000),
            }],
            adaptive_formats: vec![RawFormat {
                itag: 247,
                url: Some(format!("https://r1.example/{video_id}/247")),
                mime_type: Some("video/webm; codecs=\"vp9\"".to_string()),
                content_length: Some("9000".to_string()),
                quality_label: Some("720p".to_string()),
                bitrate: Some(1_500_000),
            }],
        }),
    }
}

/// A playable response with no thumbnails and empty optional fields, for
/// exercising normalization fallbacks.
pub fn bare_playable_response(video_id: &str) -> PlayerResponse {
    let mut response = playable_response(video_id, "ignored");
    response.video_details = Some(VideoDetails {
        video_id: Some(video_id.to_string()),
        ..VideoDetails::default()
    });
    response
}

/// A denied response with the given playability status and reason.
pub fn denied_response(status: &str, reason: Option<&str>) -> PlayerResponse {
    PlayerResponse {
        playability_status: PlayabilityStatus {
            status: status.to_string(),
            reason: reason.map(str::to_string),
        },
        video_details: None,
        streaming_data: None,
    }
}

/// The standard bot-wall denial.
pub fn bot_denial() -> PlayerResponse {
    denied_response(
        "LOGIN_REQUIRED",
        Some("Sign in to confirm you're not a bot"),
    )
}
