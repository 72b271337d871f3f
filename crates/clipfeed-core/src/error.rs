//! Error types module
//!
//! All upload pipeline failures are unified under [`UploadError`]. The `Display` text of every
//! variant is shown to the user as-is (next to a Retry button), so messages are full sentences
//! and never leak transport internals beyond a short diagnostic.

use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::models::MediaKind;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like oversized files
    Debug,
    /// Warning level - for recoverable issues like network trouble
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Machine-readable classification of pipeline failures.
///
/// `NetworkProbeFailed` is a diagnostic-only kind: it is logged when the pre-attempt
/// reachability probe fails and is never returned from the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadErrorKind {
    TooLarge,
    TimedOut,
    UploadFailed,
    RemoteRejected,
    NetworkProbeFailed,
    Cancelled,
    InvalidInput,
    Config,
}

impl Display for UploadErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let s = match self {
            UploadErrorKind::TooLarge => "too_large",
            UploadErrorKind::TimedOut => "timed_out",
            UploadErrorKind::UploadFailed => "upload_failed",
            UploadErrorKind::RemoteRejected => "remote_rejected",
            UploadErrorKind::NetworkProbeFailed => "network_probe_failed",
            UploadErrorKind::Cancelled => "cancelled",
            UploadErrorKind::InvalidInput => "invalid_input",
            UploadErrorKind::Config => "config",
        };
        write!(f, "{}", s)
    }
}

/// Describes how an error should be presented to the user
pub trait UploadErrorMetadata {
    /// Machine-readable error code (e.g., "UPLOAD_TOO_LARGE")
    fn error_code(&self) -> &'static str;

    fn kind(&self) -> UploadErrorKind;

    /// Whether offering a Retry button makes sense for this error
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the user
    fn suggested_action(&self) -> Option<&'static str>;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("The {kind} is too large ({size_mb:.1} MB). The maximum allowed size is {limit_mb} MB.")]
    TooLarge {
        kind: MediaKind,
        size_mb: f64,
        limit_mb: u64,
    },

    #[error("The upload timed out. Please check your connection or try a smaller file.")]
    TimedOut,

    #[error("The upload failed after {attempts} attempts: {last_error}")]
    UploadFailed { attempts: u32, last_error: String },

    #[error("The media host rejected the request: {0}")]
    RemoteRejected(String),

    #[error("The upload was cancelled.")]
    Cancelled,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Upload configuration error: {0}")]
    Config(String),
}

impl UploadError {
    pub fn too_large(kind: MediaKind, size_mb: f64, limit_mb: u64) -> Self {
        UploadError::TooLarge {
            kind,
            size_mb,
            limit_mb,
        }
    }
}

impl From<serde_json::Error> for UploadError {
    fn from(err: serde_json::Error) -> Self {
        UploadError::RemoteRejected(format!("Malformed response from media host: {}", err))
    }
}

/// Static metadata for each variant: (kind, error_code, recoverable, suggested_action, log_level).
fn upload_error_static_metadata(
    err: &UploadError,
) -> (
    UploadErrorKind,
    &'static str,
    bool,
    Option<&'static str>,
    LogLevel,
) {
    match err {
        UploadError::TooLarge { .. } => (
            UploadErrorKind::TooLarge,
            "UPLOAD_TOO_LARGE",
            false,
            Some("Choose a smaller file or trim the video"),
            LogLevel::Debug,
        ),
        UploadError::TimedOut => (
            UploadErrorKind::TimedOut,
            "UPLOAD_TIMED_OUT",
            true,
            Some("Check your connection or try a smaller file"),
            LogLevel::Warn,
        ),
        UploadError::UploadFailed { .. } => (
            UploadErrorKind::UploadFailed,
            "UPLOAD_FAILED",
            true,
            Some("Retry after a short delay"),
            LogLevel::Warn,
        ),
        UploadError::RemoteRejected(_) => (
            UploadErrorKind::RemoteRejected,
            "UPLOAD_REJECTED",
            false,
            Some("Check the file format and try a different file"),
            LogLevel::Warn,
        ),
        UploadError::Cancelled => (
            UploadErrorKind::Cancelled,
            "UPLOAD_CANCELLED",
            true,
            None,
            LogLevel::Debug,
        ),
        UploadError::InvalidInput(_) => (
            UploadErrorKind::InvalidInput,
            "INVALID_INPUT",
            false,
            Some("Check the selected file and try again"),
            LogLevel::Debug,
        ),
        UploadError::Config(_) => (
            UploadErrorKind::Config,
            "CONFIG_ERROR",
            false,
            Some("Contact support if this error persists"),
            LogLevel::Error,
        ),
    }
}

impl UploadErrorMetadata for UploadError {
    fn error_code(&self) -> &'static str {
        upload_error_static_metadata(self).1
    }

    fn kind(&self) -> UploadErrorKind {
        upload_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        upload_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        upload_error_static_metadata(self).3
    }

    fn log_level(&self) -> LogLevel {
        upload_error_static_metadata(self).4
    }
}
