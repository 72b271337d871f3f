//! Upload-then-persist with orphan cleanup.
//!
//! When the step after a successful upload fails (typically the database insert describing
//! the new post or story), the uploaded asset is deleted again so remote storage does not
//! accumulate orphans.

use std::fmt::Display;
use std::future::Future;

use clipfeed_core::{UploadError, UploadRequest, UploadResult};

use crate::pipeline::UploadPipeline;

#[derive(Debug, thiserror::Error)]
pub enum CommitError<E: Display> {
    #[error(transparent)]
    Upload(UploadError),

    #[error("{0}")]
    Commit(E),
}

impl UploadPipeline {
    /// Upload `request`, then hand the result to `commit`.
    ///
    /// If `commit` fails, the uploaded asset is discarded (best effort) and the commit error
    /// is returned. Text posts have nothing to clean up.
    pub async fn upload_and_commit<F, Fut, T, E>(
        &self,
        request: &UploadRequest,
        commit: F,
    ) -> Result<T, CommitError<E>>
    where
        F: FnOnce(UploadResult) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let uploaded = self.upload(request).await.map_err(CommitError::Upload)?;
        let public_id = uploaded.public_id.clone();
        let kind = uploaded.media_kind().unwrap_or(request.media_kind);

        match commit(uploaded).await {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::warn!(
                    public_id = %public_id,
                    error = %e,
                    "Persisting upload failed, discarding remote asset"
                );
                if !public_id.is_empty() {
                    self.discard_remote_asset(&public_id, kind).await;
                }
                Err(CommitError::Commit(e))
            }
        }
    }
}
