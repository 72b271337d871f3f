//! Upload and playback constants.

/// Default media host API root.
pub const DEFAULT_MEDIA_ENDPOINT: &str = "https://api.cloudinary.com/v1_1";

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 180;
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 2000;
pub const DEFAULT_BACKOFF_JITTER_MS: u64 = 2000;
pub const DEFAULT_BACKOFF_MAX_MS: u64 = 15000;

/// Longest the pre-upload size check may take before the upload goes ahead unmeasured.
pub const SIZE_CHECK_TIMEOUT_SECS: u64 = 30;

/// Extension used when the source URI has none.
pub const DEFAULT_FILE_EXTENSION: &str = "jpg";

pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// How long a user-initiated pause keeps the pause icon on screen.
pub const PAUSE_ICON_MILLIS: u64 = 800;

/// A press must be held longer than this to count as a long press.
pub const LONG_PRESS_MILLIS: u64 = 300;
