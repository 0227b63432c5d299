//! Centralized configuration for Vidrelay.
//!
//! All tunable parameters and settings are defined here to avoid
//! hard-coded values scattered throughout the codebase.

use std::time::Duration;

/// Central configuration for all Vidrelay components.
///
/// Groups related configuration settings into logical sections.
/// Supports environment variable overrides for runtime customization.
#[derive(Debug, Clone, Default)]
pub struct VidrelayConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub retry: RetryConfig,
}

/// HTTP server bind configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind the HTTP listener to
    pub host: String,
    /// Port to bind the HTTP listener to
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5001,
        }
    }
}

/// Upstream (YouTube) communication configuration.
///
/// Controls the Innertube endpoint and HTTP client timeouts for both
/// the metadata lookup and the byte-stream fetch.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Innertube player endpoint used for metadata lookups
    pub player_endpoint: String,
    /// Timeout for the metadata request
    pub request_timeout: Duration,
    /// TCP connect timeout for upstream requests
    pub connect_timeout: Duration,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            player_endpoint: "https://www.youtube.com/youtubei/v1/player".to_string(),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Retry and pacing configuration for upstream metadata resolution.
///
/// The upstream intermittently denies automated access, so retries are
/// paced to look like a human and backed off harder when a denial signal
/// is detected.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of upstream attempts per resolution
    pub max_attempts: u32,
    /// Base delay for transient failures, scaled linearly by attempt number
    pub base_backoff: Duration,
    /// Delay range in milliseconds after an adversarial-denial signal
    pub adversarial_backoff_ms: (u64, u64),
    /// Delay range in milliseconds before every attempt after the first
    pub pacing_ms: (u64, u64),
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_backoff: Duration::from_millis(1000),
            adversarial_backoff_ms: (5000, 10000),
            pacing_ms: (2000, 5000),
        }
    }
}

impl RetryConfig {
    /// Creates a configuration with no delays for fast deterministic tests.
    pub fn no_delays() -> Self {
        Self {
            max_attempts: 5,
            base_backoff: Duration::ZERO,
            adversarial_backoff_ms: (0, 0),
            pacing_ms: (0, 0),
        }
    }
}

impl VidrelayConfig {
    /// Creates configuration with environment variable overrides.
    ///
    /// Allows runtime configuration via environment variables while
    /// maintaining sensible defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(host) = std::env::var("VIDRELAY_HOST") {
            config.server.host = host;
        }

        if let Ok(port) = std::env::var("VIDRELAY_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                config.server.port = port;
            }
        }

        if let Ok(timeout) = std::env::var("VIDRELAY_REQUEST_TIMEOUT") {
            if let Ok(seconds) = timeout.parse::<u64>() {
                config.upstream.request_timeout = Duration::from_secs(seconds);
            }
        }

        if let Ok(attempts) = std::env::var("VIDRELAY_MAX_ATTEMPTS") {
            if let Ok(count) = attempts.parse::<u32>() {
                config.retry.max_attempts = count.max(1);
            }
        }

        config
    }

    /// Creates a configuration optimized for testing.
    pub fn for_testing() -> Self {
        Self {
            retry: RetryConfig::no_delays(),
            ..Default::default()
        }
    }
}
