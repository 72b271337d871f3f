//! Upload pipeline: size check, bounded retries with backoff, response validation, and
//! signed deletion of remote assets.
//!
//! Attempts are strictly sequential. One deadline (`upload_timeout`) is computed when the call
//! starts and bounds the size check and every probe, attempt and backoff sleep; hitting it
//! aborts the in-flight request and fails with [`UploadError::TimedOut`] without retrying.
//! The size check also has its own shorter budget and never fails the call on its own.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use clipfeed_core::constants::{BYTES_PER_MB, SIZE_CHECK_TIMEOUT_SECS};
use clipfeed_core::{
    MediaKind, SizePolicy, UploadConfig, UploadError, UploadErrorKind, UploadRequest,
    UploadResult,
};
use serde::Deserialize;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::backoff::BackoffPolicy;
use crate::naming::{content_type, file_extension, generated_file_name};
use crate::signing::signed_destroy_fields;
use crate::transport::{HostResponse, MediaTransport, TransportError, UploadForm};

/// Longest slice of a host error body kept in diagnostics.
const MAX_DIAGNOSTIC_BODY: usize = 300;

#[derive(Debug, Deserialize)]
struct HostError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct HostUploadBody {
    secure_url: Option<String>,
    public_id: Option<String>,
    resource_type: Option<String>,
    error: Option<HostError>,
}

#[derive(Debug, Deserialize)]
struct HostDestroyBody {
    result: Option<String>,
    error: Option<HostError>,
}

enum Race<T> {
    Done(T),
    Expired,
    Cancelled,
}

async fn race<F: Future>(
    deadline: Instant,
    cancel: &CancellationToken,
    fut: F,
) -> Race<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Race::Cancelled,
        _ = tokio::time::sleep_until(deadline) => Race::Expired,
        out = fut => Race::Done(out),
    }
}

fn truncate_body(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(MAX_DIAGNOSTIC_BODY) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

/// Host error message embedded in a body, if any.
fn embedded_error(body: &str) -> Option<String> {
    serde_json::from_str::<HostUploadBody>(body)
        .ok()
        .and_then(|b| b.error)
        .map(|e| e.message)
}

fn describe_failed_response(response: &HostResponse) -> String {
    match embedded_error(&response.body) {
        Some(message) => format!("HTTP {}: {}", response.status, message),
        None => format!(
            "HTTP {}: {}",
            response.status,
            truncate_body(&response.body)
        ),
    }
}

fn parse_upload_response(body: &str, kind: MediaKind) -> Result<UploadResult, UploadError> {
    let parsed: HostUploadBody = serde_json::from_str(body)?;

    if let Some(error) = parsed.error {
        return Err(UploadError::RemoteRejected(error.message));
    }

    let remote_url = parsed.secure_url.filter(|u| !u.is_empty()).ok_or_else(|| {
        UploadError::RemoteRejected("The media host response has no secure_url".to_string())
    })?;
    let public_id = parsed.public_id.filter(|p| !p.is_empty()).ok_or_else(|| {
        UploadError::RemoteRejected("The media host response has no public_id".to_string())
    })?;

    Ok(UploadResult {
        remote_url,
        public_id,
        resource_kind: parsed
            .resource_type
            .unwrap_or_else(|| kind.as_resource_type().to_string()),
    })
}

/// Upload pipeline bound to one size policy.
///
/// Posts and stories each get their own instance (see [`UploadPipeline::for_posts`] and
/// [`UploadPipeline::for_stories`]).
#[derive(Clone)]
pub struct UploadPipeline {
    config: UploadConfig,
    transport: Arc<dyn MediaTransport>,
    policy: SizePolicy,
    backoff: BackoffPolicy,
}

impl UploadPipeline {
    pub fn new(
        config: UploadConfig,
        transport: Arc<dyn MediaTransport>,
        policy: SizePolicy,
    ) -> Self {
        let backoff = BackoffPolicy::from_config(&config);
        Self {
            config,
            transport,
            policy,
            backoff,
        }
    }

    pub fn for_posts(config: UploadConfig, transport: Arc<dyn MediaTransport>) -> Self {
        Self::new(config, transport, SizePolicy::POSTS)
    }

    pub fn for_stories(config: UploadConfig, transport: Arc<dyn MediaTransport>) -> Self {
        Self::new(config, transport, SizePolicy::STORIES)
    }

    pub fn policy(&self) -> SizePolicy {
        self.policy
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Upload a local file and return its remote reference.
    pub async fn upload(&self, request: &UploadRequest) -> Result<UploadResult, UploadError> {
        self.upload_with_cancel(request, CancellationToken::new()).await
    }

    /// Same as [`upload`](Self::upload), aborting with [`UploadError::Cancelled`] once
    /// `cancel` fires.
    #[tracing::instrument(skip_all, fields(kind = %request.media_kind))]
    pub async fn upload_with_cancel(
        &self,
        request: &UploadRequest,
        cancel: CancellationToken,
    ) -> Result<UploadResult, UploadError> {
        if request.is_text() {
            tracing::debug!("Nothing to upload for text post");
            return Ok(UploadResult::text());
        }

        let deadline = Instant::now() + self.config.upload_timeout;
        self.check_size(request, deadline, &cancel).await?;

        let ext = file_extension(&request.source_uri);
        let form = UploadForm {
            source_uri: request.source_uri.clone(),
            file_name: generated_file_name(
                &request.source_uri,
                chrono::Utc::now().timestamp_millis(),
            ),
            content_type: content_type(request.media_kind, &ext),
            upload_preset: self.config.upload_preset.clone(),
        };

        let response = self
            .send_with_retries(request.media_kind, &form, deadline, &cancel)
            .await?;

        let result = parse_upload_response(&response.body, request.media_kind)?;
        tracing::info!(
            public_id = %result.public_id,
            resource_kind = %result.resource_kind,
            "Upload completed"
        );
        Ok(result)
    }

    /// Reject oversized files before any upload call. Failing to measure, or measuring
    /// too slowly, is not fatal.
    async fn check_size(
        &self,
        request: &UploadRequest,
        deadline: Instant,
        cancel: &CancellationToken,
    ) -> Result<(), UploadError> {
        let Some(limit_mb) = self.policy.ceiling_mb(request.media_kind) else {
            return Ok(());
        };

        let check_deadline =
            deadline.min(Instant::now() + Duration::from_secs(SIZE_CHECK_TIMEOUT_SECS));
        let blob = match race(
            check_deadline,
            cancel,
            self.transport.fetch_blob(&request.source_uri),
        )
        .await
        {
            Race::Done(blob) => blob,
            Race::Cancelled => return Err(UploadError::Cancelled),
            Race::Expired => {
                tracing::warn!(
                    source_uri = %request.source_uri,
                    "Size check timed out, continuing with upload"
                );
                return Ok(());
            }
        };

        match blob {
            Ok(blob) => {
                let size_mb = blob.len() as f64 / BYTES_PER_MB;
                if size_mb > limit_mb as f64 {
                    tracing::debug!(
                        size_mb,
                        limit_mb,
                        policy = self.policy.name,
                        "Rejecting oversized upload"
                    );
                    return Err(UploadError::too_large(
                        request.media_kind,
                        size_mb,
                        limit_mb,
                    ));
                }
                tracing::debug!(size_mb, limit_mb, "Size check passed");
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    source_uri = %request.source_uri,
                    "Size check failed, continuing with upload"
                );
            }
        }

        Ok(())
    }

    async fn send_with_retries(
        &self,
        kind: MediaKind,
        form: &UploadForm,
        deadline: Instant,
        cancel: &CancellationToken,
    ) -> Result<HostResponse, UploadError> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;

            if self.config.probe_enabled {
                match race(deadline, cancel, self.transport.probe_host()).await {
                    Race::Done(Ok(())) => {}
                    Race::Done(Err(e)) => {
                        tracing::warn!(
                            kind = %UploadErrorKind::NetworkProbeFailed,
                            attempt = attempts,
                            error = %e,
                            "Media host probe failed, attempting upload anyway"
                        );
                    }
                    Race::Expired => return Err(self.timed_out(attempts)),
                    Race::Cancelled => return Err(UploadError::Cancelled),
                }
            }

            tracing::debug!(attempt = attempts, max_attempts, "Sending upload");

            let outcome = race(deadline, cancel, self.transport.send_upload(kind, form)).await;
            let failure = match outcome {
                Race::Done(Ok(response)) if response.is_success() => return Ok(response),
                Race::Done(Ok(response)) => describe_failed_response(&response),
                Race::Done(Err(TransportError::Aborted)) | Race::Expired => {
                    return Err(self.timed_out(attempts))
                }
                Race::Done(Err(e)) => e.to_string(),
                Race::Cancelled => return Err(UploadError::Cancelled),
            };

            if attempts >= max_attempts {
                tracing::error!(
                    attempts,
                    error = %failure,
                    "Upload failed, no attempts left"
                );
                return Err(UploadError::UploadFailed {
                    attempts,
                    last_error: failure,
                });
            }

            let delay = self.backoff.delay(attempts);
            tracing::warn!(
                attempt = attempts,
                delay_ms = delay.as_millis() as u64,
                error = %failure,
                "Upload attempt failed, retrying"
            );

            match race(deadline, cancel, tokio::time::sleep(delay)).await {
                Race::Done(()) => {}
                Race::Expired => return Err(self.timed_out(attempts)),
                Race::Cancelled => return Err(UploadError::Cancelled),
            }
        }
    }

    fn timed_out(&self, attempts: u32) -> UploadError {
        tracing::warn!(
            attempts,
            timeout_secs = self.config.upload_timeout.as_secs(),
            "Upload timed out"
        );
        UploadError::TimedOut
    }

    /// Delete a remote asset with a signed destroy call. At most once, never retried.
    #[tracing::instrument(skip(self))]
    pub async fn delete_remote_asset(
        &self,
        public_id: &str,
        kind: MediaKind,
    ) -> Result<(), UploadError> {
        if public_id.trim().is_empty() {
            return Err(UploadError::InvalidInput(
                "public_id must not be empty".to_string(),
            ));
        }
        if kind == MediaKind::Text {
            tracing::debug!("Text posts have no remote asset");
            return Ok(());
        }

        let (Some(api_key), Some(api_secret)) =
            (self.config.api_key.as_deref(), self.config.api_secret.as_deref())
        else {
            return Err(UploadError::Config(
                "Deleting media requires CLIPFEED_API_KEY and CLIPFEED_API_SECRET".to_string(),
            ));
        };

        let fields = signed_destroy_fields(
            public_id,
            chrono::Utc::now().timestamp(),
            api_key,
            api_secret,
        );

        let response = match tokio::time::timeout(
            self.config.upload_timeout,
            self.transport.send_destroy(kind, &fields),
        )
        .await
        {
            Ok(Ok(response)) => response,
            Ok(Err(TransportError::Aborted)) | Err(_) => return Err(UploadError::TimedOut),
            Ok(Err(e)) => {
                return Err(UploadError::UploadFailed {
                    attempts: 1,
                    last_error: e.to_string(),
                })
            }
        };

        let parsed = serde_json::from_str::<HostDestroyBody>(&response.body).ok();
        if let Some(error) = parsed.as_ref().and_then(|b| b.error.as_ref()) {
            return Err(UploadError::RemoteRejected(error.message.clone()));
        }
        if !response.is_success() {
            return Err(UploadError::UploadFailed {
                attempts: 1,
                last_error: describe_failed_response(&response),
            });
        }

        match parsed.and_then(|b| b.result) {
            Some(result) if result == "ok" => {
                tracing::info!("Remote asset deleted");
            }
            other => {
                tracing::warn!(result = ?other, "Media host did not confirm deletion");
            }
        }

        Ok(())
    }

    /// Best-effort deletion for cleanup paths. Failures are logged, never returned.
    pub async fn discard_remote_asset(&self, public_id: &str, kind: MediaKind) {
        if let Err(e) = self.delete_remote_asset(public_id, kind).await {
            tracing::warn!(
                public_id = %public_id,
                error = %e,
                "Failed to delete remote asset, it may be orphaned"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_success_body() {
        let body = r#"{"secure_url":"https://res.example/demo/image/upload/v1/a.jpg","public_id":"a","resource_type":"image","bytes":123}"#;
        let result = parse_upload_response(body, MediaKind::Image).unwrap();
        assert_eq!(
            result.remote_url,
            "https://res.example/demo/image/upload/v1/a.jpg"
        );
        assert_eq!(result.public_id, "a");
        assert_eq!(result.resource_kind, "image");
    }

    #[test]
    fn parse_embedded_error() {
        let body = r#"{"error":{"message":"Invalid image file"}}"#;
        match parse_upload_response(body, MediaKind::Image) {
            Err(UploadError::RemoteRejected(msg)) => assert_eq!(msg, "Invalid image file"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn parse_missing_fields_is_rejected() {
        let body = r#"{"public_id":"a"}"#;
        assert!(matches!(
            parse_upload_response(body, MediaKind::Video),
            Err(UploadError::RemoteRejected(_))
        ));
        assert!(matches!(
            parse_upload_response("<html>502</html>", MediaKind::Video),
            Err(UploadError::RemoteRejected(_))
        ));
    }

    #[test]
    fn resource_type_falls_back_to_kind() {
        let body = r#"{"secure_url":"https://x/v.mp4","public_id":"v"}"#;
        let result = parse_upload_response(body, MediaKind::Video).unwrap();
        assert_eq!(result.resource_kind, "video");
    }

    #[test]
    fn failed_response_prefers_host_message() {
        let response = HostResponse::new(400, r#"{"error":{"message":"Upload preset not found"}}"#);
        assert_eq!(
            describe_failed_response(&response),
            "HTTP 400: Upload preset not found"
        );

        let long = "x".repeat(1000);
        let described = describe_failed_response(&HostResponse::new(502, long));
        assert!(described.ends_with("..."));
        assert!(described.len() < 400);
    }
}
