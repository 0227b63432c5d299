//! YouTube resolution pipeline: URL validation, upstream metadata
//! retrieval with retry and identity rotation, and rendition selection.

pub mod classify;
pub mod identity;
pub mod player;
pub mod resolver;
pub mod selector;
pub mod source;
pub mod url;

pub use classify::FailureKind;
pub use identity::{BrowserIdentity, FixedIdentity, IdentityProvider, RotatingIdentities};
pub use resolver::{ResolveError, Resolver, RetryPolicy};
pub use selector::{SelectionError, select_rendition};
pub use source::{InnertubeSource, MediaStream, SourceError, VideoSource};
pub use url::{ValidationError, validate};
