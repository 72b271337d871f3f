//! Scripted transport for driving the pipeline without a network.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use clipfeed_core::MediaKind;
use clipfeed_upload::{HostResponse, MediaTransport, TransportError, UploadForm};
use tokio::time::Instant;

/// Outcome of one scripted upload attempt.
#[derive(Debug, Clone)]
pub enum Scripted {
    Respond(u16, String),
    Fail(String),
    Abort,
    Hang,
}

impl Scripted {
    pub fn ok(body: &str) -> Self {
        Scripted::Respond(200, body.to_string())
    }
}

pub struct MockTransport {
    blob: Result<usize, String>,
    blob_hangs: bool,
    probe_fails: bool,
    uploads: Mutex<VecDeque<Scripted>>,
    fallback: Scripted,
    destroy_response: HostResponse,
    fetch_calls: AtomicUsize,
    probe_calls: AtomicUsize,
    upload_times: Mutex<Vec<Instant>>,
    upload_forms: Mutex<Vec<(MediaKind, UploadForm)>>,
    destroy_calls: Mutex<Vec<(MediaKind, Vec<(String, String)>)>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            blob: Ok(1024),
            blob_hangs: false,
            probe_fails: false,
            uploads: Mutex::new(VecDeque::new()),
            fallback: Scripted::Fail("connection reset by peer".to_string()),
            destroy_response: HostResponse::new(200, r#"{"result":"ok"}"#),
            fetch_calls: AtomicUsize::new(0),
            probe_calls: AtomicUsize::new(0),
            upload_times: Mutex::new(Vec::new()),
            upload_forms: Mutex::new(Vec::new()),
            destroy_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_blob_size(mut self, bytes: usize) -> Self {
        self.blob = Ok(bytes);
        self
    }

    pub fn with_blob_error(mut self, message: &str) -> Self {
        self.blob = Err(message.to_string());
        self
    }

    /// The size-check fetch never completes.
    pub fn with_hanging_blob(mut self) -> Self {
        self.blob_hangs = true;
        self
    }

    pub fn with_failing_probe(mut self) -> Self {
        self.probe_fails = true;
        self
    }

    /// Attempts consume the script in order; once empty, every attempt gets `fallback`.
    pub fn with_uploads(self, script: Vec<Scripted>) -> Self {
        *self.uploads.lock().unwrap() = script.into();
        self
    }

    pub fn with_fallback(mut self, fallback: Scripted) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_destroy_response(mut self, response: HostResponse) -> Self {
        self.destroy_response = response;
        self
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn probe_calls(&self) -> usize {
        self.probe_calls.load(Ordering::SeqCst)
    }

    pub fn upload_calls(&self) -> usize {
        self.upload_times.lock().unwrap().len()
    }

    pub fn upload_times(&self) -> Vec<Instant> {
        self.upload_times.lock().unwrap().clone()
    }

    pub fn upload_forms(&self) -> Vec<(MediaKind, UploadForm)> {
        self.upload_forms.lock().unwrap().clone()
    }

    pub fn destroy_calls(&self) -> Vec<(MediaKind, Vec<(String, String)>)> {
        self.destroy_calls.lock().unwrap().clone()
    }

    pub fn network_calls(&self) -> usize {
        self.fetch_calls() + self.probe_calls() + self.upload_calls() + self.destroy_calls().len()
    }
}

#[async_trait]
impl MediaTransport for MockTransport {
    async fn fetch_blob(&self, _source_uri: &str) -> Result<Bytes, TransportError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.blob_hangs {
            return std::future::pending().await;
        }
        match &self.blob {
            Ok(size) => Ok(Bytes::from(vec![0u8; *size])),
            Err(message) => Err(TransportError::Network(message.clone())),
        }
    }

    async fn probe_host(&self) -> Result<(), TransportError> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        if self.probe_fails {
            Err(TransportError::Network("dns lookup failed".to_string()))
        } else {
            Ok(())
        }
    }

    async fn send_upload(
        &self,
        kind: MediaKind,
        form: &UploadForm,
    ) -> Result<HostResponse, TransportError> {
        self.upload_times.lock().unwrap().push(Instant::now());
        self.upload_forms.lock().unwrap().push((kind, form.clone()));

        let step = self
            .uploads
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        match step {
            Scripted::Respond(status, body) => Ok(HostResponse::new(status, body)),
            Scripted::Fail(message) => Err(TransportError::Network(message)),
            Scripted::Abort => Err(TransportError::Aborted),
            Scripted::Hang => std::future::pending().await,
        }
    }

    async fn send_destroy(
        &self,
        kind: MediaKind,
        fields: &[(String, String)],
    ) -> Result<HostResponse, TransportError> {
        self.destroy_calls
            .lock()
            .unwrap()
            .push((kind, fields.to_vec()));
        Ok(self.destroy_response.clone())
    }
}
