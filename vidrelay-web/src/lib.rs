//! Vidrelay Web - HTTP surface for the resolve-and-stream service
//!
//! Exposes three endpoints: a health probe, metadata extraction, and a
//! streaming download. All failures up to the first body byte are
//! reported as structured JSON; mid-stream failures close the connection.

pub mod error;
pub mod handlers;
pub mod server;

pub use error::ApiError;
pub use server::{AppState, build_router, run_server};
