//! Byte-stream relay: transfer session lifecycle and response metadata.

pub mod headers;
pub mod relay;

pub use headers::{DownloadHeaders, download_headers};
pub use relay::{RelayStream, TransferOutcome, TransferSession};
