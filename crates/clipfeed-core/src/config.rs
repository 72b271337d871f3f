//! Configuration module
//!
//! Upload pipeline settings are read from the environment (with `.env` support). Size
//! ceilings are not part of the environment: each call site picks its own [`SizePolicy`].

use std::env;
use std::time::Duration;

use crate::constants::{
    DEFAULT_BACKOFF_BASE_MS, DEFAULT_BACKOFF_JITTER_MS, DEFAULT_BACKOFF_MAX_MS,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_MEDIA_ENDPOINT, DEFAULT_UPLOAD_TIMEOUT_SECS,
};
use crate::models::MediaKind;

/// Per-call-site size ceilings, in MB.
///
/// Posts and stories use different ceilings. They are separate values on purpose and must
/// not be merged into one shared constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizePolicy {
    pub name: &'static str,
    pub image_max_mb: u64,
    pub video_max_mb: u64,
}

impl SizePolicy {
    /// Feed posts, reels and confessions.
    pub const POSTS: SizePolicy = SizePolicy {
        name: "posts",
        image_max_mb: 5,
        video_max_mb: 50,
    };

    pub const STORIES: SizePolicy = SizePolicy {
        name: "stories",
        image_max_mb: 5,
        video_max_mb: 70,
    };

    /// Ceiling for a kind; `None` for text, which has nothing to measure.
    pub fn ceiling_mb(&self, kind: MediaKind) -> Option<u64> {
        match kind {
            MediaKind::Image => Some(self.image_max_mb),
            MediaKind::Video => Some(self.video_max_mb),
            MediaKind::Text => None,
        }
    }

    pub fn by_name(name: &str) -> Option<SizePolicy> {
        match name.to_lowercase().as_str() {
            "posts" | "post" => Some(SizePolicy::POSTS),
            "stories" | "story" => Some(SizePolicy::STORIES),
            _ => None,
        }
    }
}

/// Upload pipeline configuration
#[derive(Clone, Debug)]
pub struct UploadConfig {
    /// Media host API root, e.g. `https://api.cloudinary.com/v1_1`.
    pub endpoint: String,
    pub cloud_name: String,
    pub upload_preset: String,
    // Only needed for signed deletion
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub max_attempts: u32,
    /// Budget for the whole upload call, attempts and backoff sleeps included.
    pub upload_timeout: Duration,
    pub backoff_base: Duration,
    pub backoff_jitter: Duration,
    pub backoff_max: Duration,
    pub probe_enabled: bool,
}

impl UploadConfig {
    pub fn new(cloud_name: impl Into<String>, upload_preset: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_MEDIA_ENDPOINT.to_string(),
            cloud_name: cloud_name.into(),
            upload_preset: upload_preset.into(),
            api_key: None,
            api_secret: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            upload_timeout: Duration::from_secs(DEFAULT_UPLOAD_TIMEOUT_SECS),
            backoff_base: Duration::from_millis(DEFAULT_BACKOFF_BASE_MS),
            backoff_jitter: Duration::from_millis(DEFAULT_BACKOFF_JITTER_MS),
            backoff_max: Duration::from_millis(DEFAULT_BACKOFF_MAX_MS),
            probe_enabled: true,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_credentials(
        mut self,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        self.api_key = Some(api_key.into());
        self.api_secret = Some(api_secret.into());
        self
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source (the process environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let cloud_name = lookup("CLIPFEED_CLOUD_NAME")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("CLIPFEED_CLOUD_NAME must be set"))?;

        let upload_preset = lookup("CLIPFEED_UPLOAD_PRESET")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("CLIPFEED_UPLOAD_PRESET must be set"))?;

        let endpoint = lookup("CLIPFEED_MEDIA_ENDPOINT")
            .unwrap_or_else(|| DEFAULT_MEDIA_ENDPOINT.to_string())
            .trim_end_matches('/')
            .to_string();

        let parse_u64 = |key: &str, default: u64| -> u64 {
            lookup(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(default)
        };

        let max_attempts = lookup("CLIPFEED_UPLOAD_MAX_ATTEMPTS")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .unwrap_or(DEFAULT_MAX_ATTEMPTS);

        let probe_enabled = lookup("CLIPFEED_PROBE_ENABLED")
            .map(|v| !matches!(v.trim().to_lowercase().as_str(), "false" | "0" | "no"))
            .unwrap_or(true);

        Ok(Self {
            endpoint,
            cloud_name: cloud_name.trim().to_string(),
            upload_preset: upload_preset.trim().to_string(),
            api_key: lookup("CLIPFEED_API_KEY").filter(|v| !v.is_empty()),
            api_secret: lookup("CLIPFEED_API_SECRET").filter(|v| !v.is_empty()),
            max_attempts,
            upload_timeout: Duration::from_secs(parse_u64(
                "CLIPFEED_UPLOAD_TIMEOUT_SECS",
                DEFAULT_UPLOAD_TIMEOUT_SECS,
            )),
            backoff_base: Duration::from_millis(parse_u64(
                "CLIPFEED_BACKOFF_BASE_MS",
                DEFAULT_BACKOFF_BASE_MS,
            )),
            backoff_jitter: Duration::from_millis(parse_u64(
                "CLIPFEED_BACKOFF_JITTER_MS",
                DEFAULT_BACKOFF_JITTER_MS,
            )),
            backoff_max: Duration::from_millis(parse_u64(
                "CLIPFEED_BACKOFF_MAX_MS",
                DEFAULT_BACKOFF_MAX_MS,
            )),
            probe_enabled,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.cloud_name.trim().is_empty() {
            return Err(anyhow::anyhow!("CLIPFEED_CLOUD_NAME must not be empty"));
        }

        if self.upload_preset.trim().is_empty() {
            return Err(anyhow::anyhow!("CLIPFEED_UPLOAD_PRESET must not be empty"));
        }

        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "CLIPFEED_MEDIA_ENDPOINT must be an http(s) URL"
            ));
        }

        if self.max_attempts == 0 {
            return Err(anyhow::anyhow!(
                "CLIPFEED_UPLOAD_MAX_ATTEMPTS must be at least 1"
            ));
        }

        if self.upload_timeout.is_zero() {
            return Err(anyhow::anyhow!(
                "CLIPFEED_UPLOAD_TIMEOUT_SECS must be greater than 0"
            ));
        }

        if self.backoff_base > self.backoff_max {
            return Err(anyhow::anyhow!(
                "CLIPFEED_BACKOFF_BASE_MS must not exceed CLIPFEED_BACKOFF_MAX_MS"
            ));
        }

        Ok(())
    }

    /// True when deletion credentials are present.
    pub fn can_sign(&self) -> bool {
        self.api_key.is_some() && self.api_secret.is_some()
    }

    /// `{endpoint}/{cloud_name}/{kind}/{action}`
    pub fn action_url(&self, kind: MediaKind, action: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.endpoint.trim_end_matches('/'),
            self.cloud_name,
            kind.as_resource_type(),
            action
        )
    }

    /// Copy safe to print: the secret is masked.
    pub fn redacted(&self) -> UploadConfig {
        let mut copy = self.clone();
        if copy.api_secret.is_some() {
            copy.api_secret = Some("********".to_string());
        }
        copy
    }
}
