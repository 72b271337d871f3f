use std::path::Path;

use clipfeed_core::{MediaKind, SizePolicy, UploadConfig};
use serde_json::json;

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "m4v", "webm", "mkv", "avi", "3gp"];

/// Guess the media kind from a file extension. Anything not recognised as video is an image.
pub fn infer_kind(path: &Path) -> MediaKind {
    let is_video = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| VIDEO_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false);
    if is_video {
        MediaKind::Video
    } else {
        MediaKind::Image
    }
}

pub fn parse_policy(name: &str) -> anyhow::Result<SizePolicy> {
    SizePolicy::by_name(name).ok_or_else(|| {
        anyhow::anyhow!("Unknown size policy '{}', expected posts or stories", name)
    })
}

/// Printable view of the effective configuration. The secret is masked.
pub fn config_summary(config: &UploadConfig) -> serde_json::Value {
    let config = config.redacted();
    let policies: Vec<serde_json::Value> = [SizePolicy::POSTS, SizePolicy::STORIES]
        .iter()
        .map(|p| {
            json!({
                "name": p.name,
                "image_max_mb": p.image_max_mb,
                "video_max_mb": p.video_max_mb,
            })
        })
        .collect();

    json!({
        "endpoint": config.endpoint,
        "cloud_name": config.cloud_name,
        "upload_preset": config.upload_preset,
        "api_key": config.api_key,
        "api_secret": config.api_secret,
        "max_attempts": config.max_attempts,
        "upload_timeout_secs": config.upload_timeout.as_secs(),
        "backoff_base_ms": config.backoff_base.as_millis() as u64,
        "backoff_jitter_ms": config.backoff_jitter.as_millis() as u64,
        "backoff_max_ms": config.backoff_max.as_millis() as u64,
        "probe_enabled": config.probe_enabled,
        "can_delete": config.can_sign(),
        "size_policies": policies,
    })
}

/// Text posts have no remote asset, so the CLI only accepts image or video.
pub fn require_media_kind(kind: MediaKind) -> anyhow::Result<MediaKind> {
    match kind {
        MediaKind::Image | MediaKind::Video => Ok(kind),
        MediaKind::Text => anyhow::bail!("Media kind must be image or video, got text"),
    }
}

/// Initialize tracing for the CLI. Logs go to stderr so stdout stays valid JSON.
pub fn init_tracing() {
    let format = std::env::var("CLIPFEED_LOG_FORMAT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or_default();
    let _ = clipfeed_infra::init_telemetry("clipfeed-cli", Some("clipfeed=info"), format);
}
