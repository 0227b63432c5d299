//! Vidrelay Core - Video resolution and streaming relay functionality
//!
//! This crate provides the building blocks for resolving a YouTube video
//! URL into metadata plus a set of renditions, selecting the rendition to
//! deliver, and relaying its byte stream to an HTTP response without
//! persisting anything server-side.

pub mod config;
pub mod streaming;
pub mod types;
pub mod youtube;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_support;

// Re-export main types for convenient access
pub use config::VidrelayConfig;
pub use streaming::{RelayStream, TransferOutcome, TransferSession};
pub use types::{MediaMetadata, Rendition, ResolvedVideo, VideoRef};
pub use youtube::{
    InnertubeSource, Resolver, ResolveError, RetryPolicy, SelectionError, ValidationError,
    VideoSource,
};
