//! Browser identity rotation for upstream requests.
//!
//! The upstream fingerprints automated clients, so every attempt presents
//! a randomly chosen realistic browser identity: a user-agent string with
//! a matched set of browser-like headers. The rotation strategy sits
//! behind a trait so it can be swapped or disabled without touching retry
//! or streaming logic.

use rand::{Rng, rng};

/// One realistic browser identity: user-agent plus matched headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrowserIdentity {
    pub user_agent: &'static str,
    pub accept: &'static str,
    pub accept_language: &'static str,
}

impl BrowserIdentity {
    /// Header name/value pairs to attach to an upstream request.
    pub fn headers(&self) -> [(&'static str, &'static str); 3] {
        [
            ("User-Agent", self.user_agent),
            ("Accept", self.accept),
            ("Accept-Language", self.accept_language),
        ]
    }
}

const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

/// Identity pool covering the common desktop browsers.
const IDENTITIES: &[BrowserIdentity] = &[
    BrowserIdentity {
        user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
        accept: HTML_ACCEPT,
        accept_language: "en-US,en;q=0.9",
    },
    BrowserIdentity {
        user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
        accept: HTML_ACCEPT,
        accept_language: "en-US,en;q=0.9",
    },
    BrowserIdentity {
        user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
        accept: "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        accept_language: "en-US,en;q=0.5",
    },
    BrowserIdentity {
        user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
        accept: "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        accept_language: "en-US,en;q=0.9",
    },
    BrowserIdentity {
        user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36 Edg/124.0.0.0",
        accept: HTML_ACCEPT,
        accept_language: "en-US,en;q=0.9",
    },
];

/// Strategy for picking the identity presented on each upstream attempt.
pub trait IdentityProvider: Send + Sync + std::fmt::Debug {
    /// Returns the identity for the next attempt.
    fn next_identity(&self) -> BrowserIdentity;
}

/// Draws a fresh identity uniformly at random for every attempt.
#[derive(Debug, Default)]
pub struct RotatingIdentities;

impl RotatingIdentities {
    pub fn new() -> Self {
        Self
    }
}

impl IdentityProvider for RotatingIdentities {
    fn next_identity(&self) -> BrowserIdentity {
        IDENTITIES[rng().random_range(0..IDENTITIES.len())]
    }
}

/// Presents the same identity on every attempt. Used to disable rotation
/// and in tests that need deterministic headers.
#[derive(Debug)]
pub struct FixedIdentity(pub BrowserIdentity);

impl Default for FixedIdentity {
    fn default() -> Self {
        Self(IDENTITIES[0])
    }
}

impl IdentityProvider for FixedIdentity {
    fn next_identity(&self) -> BrowserIdentity {
        self.0
    }
}
