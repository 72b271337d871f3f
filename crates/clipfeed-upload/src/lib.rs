//! Media upload pipeline for clipfeed.
//!
//! Takes a local file, checks it against a per-call-site [`SizePolicy`], uploads it to the
//! media host with bounded retries (exponential backoff with jitter, one per-call timeout)
//! and returns an [`UploadResult`] the caller stores as a reference in its post or story.
//! Uploaded assets can be removed again with signed deletion.
//!
//! [`SizePolicy`]: clipfeed_core::SizePolicy
//! [`UploadResult`]: clipfeed_core::UploadResult

pub mod backoff;
pub mod cleanup;
pub mod http;
pub mod naming;
pub mod pipeline;
pub mod signing;
pub mod transport;

// Re-export commonly used types
pub use backoff::BackoffPolicy;
pub use cleanup::CommitError;
pub use http::HttpTransport;
pub use pipeline::UploadPipeline;
pub use transport::{HostResponse, MediaTransport, TransportError, UploadForm};

pub use tokio_util::sync::CancellationToken;
