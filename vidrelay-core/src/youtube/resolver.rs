//! Upstream metadata resolution with retry, pacing, and identity rotation.
//!
//! The upstream actively resists automated access: denials arrive as HTTP
//! 403/429, bot-wall playability statuses, or free-text reasons, and are
//! a priori indistinguishable from transient failures. The resolver
//! retries up to a fixed attempt cap, pacing attempts like a human and
//! backing off harder after a detected denial.

use std::sync::Arc;
use std::time::Duration;

use rand::{Rng, rng};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::RetryConfig;
use crate::types::{Composition, MediaMetadata, Rendition, ResolvedVideo, VideoRef};

use super::classify::{self, FailureKind};
use super::identity::IdentityProvider;
use super::player::{PlayerResponse, RawFormat, StreamingData};
use super::source::{MediaStream, SourceError, VideoSource};

/// Terminal resolution failures, mapped from upstream signals.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// Every attempt ended in an adversarial-denial signal.
    #[error(
        "YouTube is blocking automated access for this video; try again later"
    )]
    UpstreamBlocked {
        /// Attempts made before giving up
        attempts: u32,
    },

    /// The video is private.
    #[error("This video is private")]
    VideoPrivate,

    /// The video was removed or never existed.
    #[error("Video unavailable: {reason}")]
    VideoUnavailable {
        /// Upstream-provided reason
        reason: String,
    },

    /// The video requires age verification.
    #[error("This video is age-restricted")]
    AgeRestricted,

    /// Attempts exhausted on non-adversarial failures.
    #[error("{reason}")]
    ExtractionFailed {
        /// Last upstream failure message
        reason: String,
    },
}

/// Retry policy: attempt cap plus per-failure-kind delay distributions.
///
/// Delay draws are methods here so the bounds are testable without
/// sleeping or network calls.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_backoff: Duration,
    adversarial_backoff_ms: (u64, u64),
    pacing_ms: (u64, u64),
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_backoff: config.base_backoff,
            adversarial_backoff_ms: config.adversarial_backoff_ms,
            pacing_ms: config.pacing_ms,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay slept after `failed_attempt` (1-based) before the next try.
    ///
    /// Adversarial denials draw from a long uniform range; everything
    /// else scales the base delay linearly with the attempt number.
    pub fn backoff_delay(&self, kind: FailureKind, failed_attempt: u32) -> Duration {
        match kind {
            FailureKind::Adversarial => uniform_ms(self.adversarial_backoff_ms),
            _ => self.base_backoff * failed_attempt,
        }
    }

    /// Human-pacing delay slept before every attempt after the first.
    pub fn pacing_delay(&self) -> Duration {
        uniform_ms(self.pacing_ms)
    }

    /// Inclusive bounds of [`Self::backoff_delay`] for a given failure.
    pub fn backoff_bounds(&self, kind: FailureKind, failed_attempt: u32) -> (Duration, Duration) {
        match kind {
            FailureKind::Adversarial => (
                Duration::from_millis(self.adversarial_backoff_ms.0),
                Duration::from_millis(self.adversarial_backoff_ms.1),
            ),
            _ => {
                let fixed = self.base_backoff * failed_attempt;
                (fixed, fixed)
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

fn uniform_ms((low, high): (u64, u64)) -> Duration {
    if high <= low {
        Duration::from_millis(low)
    } else {
        Duration::from_millis(rng().random_range(low..=high))
    }
}

/// Resolves validated video references into metadata plus renditions, and
/// opens rendition byte streams with the same identity rotation.
///
/// Stateless across requests: no cache, no session. Resolving the same
/// video twice issues two full upstream lookups.
#[derive(Debug, Clone)]
pub struct Resolver {
    source: Arc<dyn VideoSource>,
    identities: Arc<dyn IdentityProvider>,
    policy: RetryPolicy,
}

impl Resolver {
    pub fn new(
        source: Arc<dyn VideoSource>,
        identities: Arc<dyn IdentityProvider>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            source,
            identities,
            policy,
        }
    }

    /// Fetches and normalizes metadata for a validated video.
    ///
    /// Issues at most `max_attempts` upstream calls. Permanent denials
    /// (private, unavailable, age-restricted) are surfaced immediately;
    /// adversarial and transient failures are retried with their
    /// respective backoff distributions.
    ///
    /// # Errors
    /// - `ResolveError::UpstreamBlocked` - Attempts exhausted on denial signals
    /// - `ResolveError::VideoPrivate` - Upstream reports a private video
    /// - `ResolveError::VideoUnavailable` - Upstream reports the video gone
    /// - `ResolveError::AgeRestricted` - Upstream requires age verification
    /// - `ResolveError::ExtractionFailed` - Attempts exhausted on other failures
    pub async fn resolve(&self, video: &VideoRef) -> Result<ResolvedVideo, ResolveError> {
        let mut last_failure: Option<(FailureKind, String)> = None;

        for attempt in 1..=self.policy.max_attempts() {
            if attempt > 1 {
                tokio::time::sleep(self.policy.pacing_delay()).await;
            }

            let identity = self.identities.next_identity();
            let failure = match self.source.player_info(video.id(), &identity).await {
                Ok(player) if player.playability_status.is_ok() => {
                    debug!(id = video.id(), attempt, "resolved video metadata");
                    return Ok(normalize(video, player));
                }
                Ok(player) => {
                    let status = player.playability_status;
                    let kind = classify::classify_playability(&status);
                    let reason = status
                        .reason
                        .unwrap_or_else(|| format!("playability status {}", status.status));
                    (kind, reason)
                }
                Err(error) => (classify::classify_source_error(&error), error.to_string()),
            };

            let (kind, reason) = failure;
            match kind {
                FailureKind::Private => return Err(ResolveError::VideoPrivate),
                FailureKind::Unavailable => {
                    return Err(ResolveError::VideoUnavailable { reason });
                }
                FailureKind::AgeRestricted => return Err(ResolveError::AgeRestricted),
                FailureKind::Adversarial | FailureKind::Transient => {
                    warn!(
                        id = video.id(),
                        attempt,
                        kind = ?kind,
                        %reason,
                        "upstream attempt failed"
                    );
                    if attempt < self.policy.max_attempts() {
                        tokio::time::sleep(self.policy.backoff_delay(kind, attempt)).await;
                    }
                    last_failure = Some((kind, reason));
                }
            }
        }

        match last_failure {
            Some((FailureKind::Adversarial, _)) => Err(ResolveError::UpstreamBlocked {
                attempts: self.policy.max_attempts(),
            }),
            Some((_, reason)) => Err(ResolveError::ExtractionFailed { reason }),
            None => Err(ResolveError::ExtractionFailed {
                reason: "no upstream attempts were made".to_string(),
            }),
        }
    }

    /// Opens the byte stream for a selected rendition, presenting a
    /// freshly rotated identity. The upstream applies the same
    /// anti-automation defenses to the stream endpoint.
    ///
    /// # Errors
    /// - `SourceError` - Stream open was denied or the request failed
    pub async fn open_stream(&self, rendition: &Rendition) -> Result<MediaStream, SourceError> {
        let identity = self.identities.next_identity();
        self.source.open_stream(rendition, &identity).await
    }
}

/// Normalizes a playable upstream response into display-ready metadata
/// plus the full rendition set. Missing fields get fixed fallbacks.
fn normalize(video: &VideoRef, player: PlayerResponse) -> ResolvedVideo {
    let details = player.video_details.unwrap_or_default();
    let video_id = details
        .video_id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| video.id().to_string());

    let thumbnail_url = details
        .thumbnail
        .as_ref()
        .and_then(|set| set.thumbnails.first())
        .map(|thumb| thumb.url.clone())
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| format!("https://img.youtube.com/vi/{video_id}/maxresdefault.jpg"));

    let metadata = MediaMetadata {
        title: details
            .title
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| "YouTube Video".to_string()),
        description: details
            .short_description
            .unwrap_or_else(|| "YouTube video content".to_string()),
        thumbnail_url,
        source_url: video.url().to_string(),
        media_type: "video",
        author: details
            .author
            .filter(|author| !author.is_empty())
            .unwrap_or_else(|| "YouTube".to_string()),
        board: "",
        video_id,
        duration: details.length_seconds.and_then(|s| s.parse().ok()),
        view_count: details.view_count.and_then(|s| s.parse().ok()),
    };

    ResolvedVideo {
        metadata,
        renditions: collect_renditions(player.streaming_data),
    }
}

/// Flattens upstream format lists into renditions, preserving the
/// upstream's own order. Progressive formats are muxed audio+video;
/// adaptive formats carry one track each. Signature-ciphered formats
/// (no direct URL) are skipped.
fn collect_renditions(data: Option<StreamingData>) -> Vec<Rendition> {
    let Some(data) = data else {
        return Vec::new();
    };

    let mut renditions = Vec::new();
    for raw in data.formats {
        if let Some(rendition) = rendition_from_raw(raw, Composition::AudioVideo) {
            renditions.push(rendition);
        }
    }
    for raw in data.adaptive_formats {
        let composition = match raw.mime_type.as_deref() {
            Some(mime) if mime.starts_with("audio/") => Composition::AudioOnly,
            _ => Composition::VideoOnly,
        };
        if let Some(rendition) = rendition_from_raw(raw, composition) {
            renditions.push(rendition);
        }
    }
    renditions
}

fn rendition_from_raw(raw: RawFormat, composition: Composition) -> Option<Rendition> {
    let stream_url = raw.url?;
    let mime_type = raw.mime_type.unwrap_or_default();
    Some(Rendition {
        itag: raw.itag,
        container: container_from_mime(&mime_type),
        composition,
        content_length: raw.content_length.and_then(|s| s.parse().ok()),
        quality_label: raw.quality_label,
        mime_type,
        stream_url,
    })
}

/// `video/mp4; codecs="..."` → `mp4`. Unknown shapes fall back to `mp4`.
fn container_from_mime(mime: &str) -> String {
    mime.split(';')
        .next()
        .and_then(|media_type| media_type.split('/').nth(1))
        .map(|container| container.trim().to_string())
        .filter(|container| !container.is_empty())
        .unwrap_or_else(|| "mp4".to_string())
}
