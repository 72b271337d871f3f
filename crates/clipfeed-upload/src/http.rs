//! reqwest-backed media host transport.

use async_trait::async_trait;
use bytes::Bytes;
use clipfeed_core::{MediaKind, UploadConfig, UploadError};
use reqwest::Client;
use std::time::Duration;

use crate::transport::{HostResponse, MediaTransport, TransportError, UploadForm};

const CONNECT_TIMEOUT_SECS: u64 = 30;

// Client-side timeouts (connect included) are ordinary failures that consume a retry. Only
// the pipeline's call deadline ends an upload as timed out.
impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Network(format!("Request timed out: {}", err))
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

/// HTTP transport for the media host.
///
/// No overall request timeout is set on the client: the pipeline owns the per-call deadline
/// and drops the in-flight request when it fires.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
    config: UploadConfig,
}

impl HttpTransport {
    pub fn new(config: UploadConfig) -> Result<Self, UploadError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| UploadError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn is_remote(source_uri: &str) -> bool {
        source_uri.starts_with("http://") || source_uri.starts_with("https://")
    }

    async fn read_source(&self, source_uri: &str) -> Result<Bytes, TransportError> {
        if Self::is_remote(source_uri) {
            let bytes = self
                .client
                .get(source_uri)
                .send()
                .await?
                .error_for_status()?
                .bytes()
                .await?;
            return Ok(bytes);
        }

        let path = source_uri.strip_prefix("file://").unwrap_or(source_uri);
        let data = tokio::fs::read(path).await?;
        Ok(Bytes::from(data))
    }

    async fn into_host_response(
        response: reqwest::Response,
    ) -> Result<HostResponse, TransportError> {
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HostResponse { status, body })
    }
}

#[async_trait]
impl MediaTransport for HttpTransport {
    async fn fetch_blob(&self, source_uri: &str) -> Result<Bytes, TransportError> {
        self.read_source(source_uri).await
    }

    async fn probe_host(&self) -> Result<(), TransportError> {
        // Any HTTP answer means the host is reachable.
        self.client.head(&self.config.endpoint).send().await?;
        Ok(())
    }

    async fn send_upload(
        &self,
        kind: MediaKind,
        form: &UploadForm,
    ) -> Result<HostResponse, TransportError> {
        let data = self.read_source(&form.source_uri).await?;

        let len = data.len() as u64;
        let part = reqwest::multipart::Part::stream_with_length(data, len)
            .file_name(form.file_name.clone())
            .mime_str(&form.content_type)?;
        let multipart = reqwest::multipart::Form::new()
            .part("file", part)
            .text("upload_preset", form.upload_preset.clone());

        let response = self
            .client
            .post(self.config.action_url(kind, "upload"))
            .multipart(multipart)
            .send()
            .await?;

        Self::into_host_response(response).await
    }

    async fn send_destroy(
        &self,
        kind: MediaKind,
        fields: &[(String, String)],
    ) -> Result<HostResponse, TransportError> {
        let response = self
            .client
            .post(self.config.action_url(kind, "destroy"))
            .form(fields)
            .send()
            .await?;

        Self::into_host_response(response).await
    }
}
