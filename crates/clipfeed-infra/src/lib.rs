//! Clipfeed Infrastructure Library
//!
//! Shared infrastructure for clipfeed binaries:
//! - Telemetry initialization (tracing subscriber)

pub mod telemetry;

pub use telemetry::{init_telemetry, shutdown_telemetry, LogFormat};
