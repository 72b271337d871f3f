//! Media host transport abstraction
//!
//! The pipeline never talks HTTP directly. Everything that leaves the process goes through
//! [`MediaTransport`], so the retry/backoff logic can be driven by a scripted transport in
//! tests and by [`crate::HttpTransport`] in production.

use async_trait::async_trait;
use bytes::Bytes;
use clipfeed_core::MediaKind;
use thiserror::Error;

/// Transport-level failures
#[derive(Debug, Error)]
pub enum TransportError {
    /// The in-flight request was aborted by the caller's abort signal. Client-side timeouts
    /// are reported as [`TransportError::Network`] instead.
    #[error("Request aborted")]
    Aborted,

    #[error("Network error: {0}")]
    Network(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Raw host reply. Status interpretation is left to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostResponse {
    pub status: u16,
    pub body: String,
}

impl HostResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Multipart upload description. The file itself is read by the transport on every attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadForm {
    pub source_uri: String,
    /// Generated `upload_{millis}.{ext}` name sent as the part's file name.
    pub file_name: String,
    pub content_type: String,
    pub upload_preset: String,
}

/// Media host transport trait
#[async_trait]
pub trait MediaTransport: Send + Sync {
    /// Load the source as a byte blob (used to measure its size).
    async fn fetch_blob(&self, source_uri: &str) -> Result<Bytes, TransportError>;

    /// Cheap reachability check against the host.
    async fn probe_host(&self) -> Result<(), TransportError>;

    /// `POST {endpoint}/{cloud}/{kind}/upload`
    async fn send_upload(
        &self,
        kind: MediaKind,
        form: &UploadForm,
    ) -> Result<HostResponse, TransportError>;

    /// `POST {endpoint}/{cloud}/{kind}/destroy` with already-signed fields.
    async fn send_destroy(
        &self,
        kind: MediaKind,
        fields: &[(String, String)],
    ) -> Result<HostResponse, TransportError>;
}
