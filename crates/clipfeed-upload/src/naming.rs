//! Upload file naming and content types.

use clipfeed_core::constants::DEFAULT_FILE_EXTENSION;
use clipfeed_core::MediaKind;

/// Lowercase extension of the URI's last path segment, or `jpg` when none is detectable.
pub fn file_extension(source_uri: &str) -> String {
    let without_query = source_uri.split(['?', '#']).next().unwrap_or("");
    let last_segment = without_query.rsplit(['/', '\\']).next().unwrap_or("");

    match last_segment.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && !ext.is_empty()
                && ext.len() <= 5
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            ext.to_lowercase()
        }
        _ => DEFAULT_FILE_EXTENSION.to_string(),
    }
}

/// `upload_{unix_millis}.{ext}`
pub fn generated_file_name(source_uri: &str, unix_millis: i64) -> String {
    format!("upload_{}.{}", unix_millis, file_extension(source_uri))
}

pub fn content_type(kind: MediaKind, ext: &str) -> String {
    match kind {
        MediaKind::Image => match ext {
            "jpg" | "jpeg" => "image/jpeg".to_string(),
            "svg" => "image/svg+xml".to_string(),
            other => format!("image/{}", other),
        },
        MediaKind::Video => match ext {
            "mov" => "video/quicktime".to_string(),
            "mkv" => "video/x-matroska".to_string(),
            other => format!("video/{}", other),
        },
        MediaKind::Text => "application/octet-stream".to_string(),
    }
}
