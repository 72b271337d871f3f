//! Clipfeed Core Library
//!
//! This crate provides the domain models, error types and configuration shared by the
//! upload pipeline, the playback coordinator and the CLI.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{SizePolicy, UploadConfig};
pub use error::{LogLevel, UploadError, UploadErrorKind, UploadErrorMetadata};
pub use models::{MediaKind, PlaybackStatus, UploadRequest, UploadResult, VideoId};
