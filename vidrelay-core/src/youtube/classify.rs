//! Failure classification for upstream responses.
//!
//! The upstream reports problems through a mix of HTTP status codes,
//! playability status tags, and free-text reasons. This module is the
//! single place that maps those signals onto [`FailureKind`], as an
//! explicit table rather than string-contains checks scattered through
//! the resolver.

use super::player::PlayabilityStatus;
use super::source::SourceError;

/// How a single upstream failure should be treated by the retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Bot-detection style denial: retried with long randomized backoff.
    Adversarial,
    /// Video is private: permanent, never retried.
    Private,
    /// Video removed or otherwise unavailable: permanent, never retried.
    Unavailable,
    /// Video requires age verification: permanent, never retried.
    AgeRestricted,
    /// Network or parse hiccup: retried with linear backoff.
    Transient,
}

impl FailureKind {
    /// Permanent failures are surfaced immediately instead of retried.
    pub fn is_permanent(self) -> bool {
        matches!(
            self,
            FailureKind::Private | FailureKind::Unavailable | FailureKind::AgeRestricted
        )
    }
}

/// Reason substrings checked case-insensitively, first match wins.
const REASON_TABLE: &[(&str, FailureKind)] = &[
    ("confirm your age", FailureKind::AgeRestricted),
    ("confirm you're not a bot", FailureKind::Adversarial),
    ("confirm you\u{2019}re not a bot", FailureKind::Adversarial),
    ("sign in to confirm", FailureKind::Adversarial),
    ("unusual traffic", FailureKind::Adversarial),
    ("captcha", FailureKind::Adversarial),
    ("bot", FailureKind::Adversarial),
    ("age", FailureKind::AgeRestricted),
    ("private", FailureKind::Private),
    ("unavailable", FailureKind::Unavailable),
    ("removed", FailureKind::Unavailable),
    ("does not exist", FailureKind::Unavailable),
];

/// Classifies a non-OK playability status.
///
/// The status tag decides the broad family; the free-text reason
/// disambiguates `LOGIN_REQUIRED`, which covers both bot walls and
/// genuinely gated videos.
pub fn classify_playability(status: &PlayabilityStatus) -> FailureKind {
    let reason = status.reason.as_deref().unwrap_or_default();

    match status.status.as_str() {
        "LOGIN_REQUIRED" => match classify_reason(reason) {
            Some(kind) => kind,
            // Login walls with no recognizable reason are treated as
            // private content.
            None => FailureKind::Private,
        },
        "AGE_VERIFICATION_REQUIRED" | "AGE_CHECK_REQUIRED" | "CONTENT_CHECK_REQUIRED" => {
            FailureKind::AgeRestricted
        }
        "ERROR" | "UNPLAYABLE" => classify_reason(reason).unwrap_or(FailureKind::Unavailable),
        _ => classify_reason(reason).unwrap_or(FailureKind::Transient),
    }
}

/// Classifies a transport-level failure from the upstream call itself.
pub fn classify_source_error(error: &SourceError) -> FailureKind {
    match error {
        SourceError::Status { code: 403 | 429, .. } => FailureKind::Adversarial,
        SourceError::Status { .. } => FailureKind::Transient,
        SourceError::Network { .. } => FailureKind::Transient,
        SourceError::Parse { .. } => FailureKind::Transient,
    }
}

fn classify_reason(reason: &str) -> Option<FailureKind> {
    if reason.is_empty() {
        return None;
    }
    let lowered = reason.to_lowercase();
    REASON_TABLE
        .iter()
        .find(|(needle, _)| lowered.contains(needle))
        .map(|(_, kind)| *kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(tag: &str, reason: Option<&str>) -> PlayabilityStatus {
        PlayabilityStatus {
            status: tag.to_string(),
            reason: reason.map(str::to_string),
        }
    }

    #[test]
    fn test_bot_wall_is_adversarial() {
        let denial = status(
            "LOGIN_REQUIRED",
            Some("Sign in to confirm you're not a bot"),
        );
        assert_eq!(classify_playability(&denial), FailureKind::Adversarial);
    }

    #[test]
    fn test_plain_login_wall_is_private() {
        let denial = status("LOGIN_REQUIRED", Some("This video is private"));
        assert_eq!(classify_playability(&denial), FailureKind::Private);

        let bare = status("LOGIN_REQUIRED", None);
        assert_eq!(classify_playability(&bare), FailureKind::Private);
    }

    #[test]
    fn test_error_status_is_unavailable() {
        let denial = status("ERROR", Some("Video unavailable"));
        assert_eq!(classify_playability(&denial), FailureKind::Unavailable);

        let removed = status("UNPLAYABLE", Some("This video has been removed by the uploader"));
        assert_eq!(classify_playability(&removed), FailureKind::Unavailable);
    }

    #[test]
    fn test_age_gate_statuses() {
        let gate = status("AGE_VERIFICATION_REQUIRED", None);
        assert_eq!(classify_playability(&gate), FailureKind::AgeRestricted);

        let login_age = status("LOGIN_REQUIRED", Some("Sign in to confirm your age"));
        assert_eq!(classify_playability(&login_age), FailureKind::AgeRestricted);
    }

    #[test]
    fn test_unknown_status_is_transient() {
        let odd = status("LIVE_STREAM_OFFLINE", None);
        assert_eq!(classify_playability(&odd), FailureKind::Transient);
    }

    #[test]
    fn test_http_denial_codes_are_adversarial() {
        for code in [403, 429] {
            let error = SourceError::Status {
                code,
                message: "denied".to_string(),
            };
            assert_eq!(classify_source_error(&error), FailureKind::Adversarial);
        }
    }

    #[test]
    fn test_other_transport_failures_are_transient() {
        let server_error = SourceError::Status {
            code: 502,
            message: "bad gateway".to_string(),
        };
        assert_eq!(classify_source_error(&server_error), FailureKind::Transient);

        let network = SourceError::Network {
            reason: "connection reset".to_string(),
        };
        assert_eq!(classify_source_error(&network), FailureKind::Transient);

        let parse = SourceError::Parse {
            reason: "unexpected token".to_string(),
        };
        assert_eq!(classify_source_error(&parse), FailureKind::Transient);
    }

    #[test]
    fn test_permanence() {
        assert!(FailureKind::Private.is_permanent());
        assert!(FailureKind::Unavailable.is_permanent());
        assert!(FailureKind::AgeRestricted.is_permanent());
        assert!(!FailureKind::Adversarial.is_permanent());
        assert!(!FailureKind::Transient.is_permanent());
    }
}
