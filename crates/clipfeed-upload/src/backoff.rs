//! Exponential backoff with jitter between upload attempts.

use clipfeed_core::UploadConfig;
use rand::Rng;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub base: Duration,
    pub jitter: Duration,
    pub max: Duration,
}

impl BackoffPolicy {
    pub fn from_config(config: &UploadConfig) -> Self {
        Self {
            base: config.backoff_base,
            jitter: config.backoff_jitter,
            max: config.backoff_max,
        }
    }

    /// `min(base * 2^attempts_used + jitter, max)`.
    ///
    /// `attempts_used` counts failed attempts so far, so the wait before the second attempt
    /// uses `attempts_used == 1`.
    pub fn delay_with_jitter(&self, attempts_used: u32, jitter: Duration) -> Duration {
        let exponential = self
            .base
            .saturating_mul(2_u32.saturating_pow(attempts_used));
        exponential.saturating_add(jitter).min(self.max)
    }

    /// Delay with a uniformly random jitter in `[0, jitter]`.
    pub fn delay(&self, attempts_used: u32) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        let jitter = if jitter_ms == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(rand::rng().random_range(0..=jitter_ms))
        };
        self.delay_with_jitter(attempts_used, jitter)
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(clipfeed_core::constants::DEFAULT_BACKOFF_BASE_MS),
            jitter: Duration::from_millis(clipfeed_core::constants::DEFAULT_BACKOFF_JITTER_MS),
            max: Duration::from_millis(clipfeed_core::constants::DEFAULT_BACKOFF_MAX_MS),
        }
    }
}
