//! One file's upload attempt: validate → compress → upload.
//!
//! The reducer in [`state`](super::state) decides which transitions are legal;
//! this module performs the side effects between them. Every failure ends the
//! attempt in `Error` with a user-facing message. Nothing is returned to the
//! caller as an `Err`.

use folio_core::{
    ErrorMetadata, ImageBlob, LogLevel, PhotoFormFields, PhotoRecord, PhotoSubmitter,
    SharedSettings,
};
use std::sync::Arc;
use uuid::Uuid;

use super::state::{FileState, Transition};
use super::traits::{ProgressSink, VariantProcessor};
use super::types::{FailedUpload, FileOutcome, SourceFile, UploadedPhoto};
use crate::error::UploadError;

#[derive(Clone)]
pub struct FilePipeline {
    variants: Arc<dyn VariantProcessor>,
    submitter: Arc<dyn PhotoSubmitter>,
}

impl FilePipeline {
    pub fn new(variants: Arc<dyn VariantProcessor>, submitter: Arc<dyn PhotoSubmitter>) -> Self {
        Self {
            variants,
            submitter,
        }
    }

    pub fn variants(&self) -> &Arc<dyn VariantProcessor> {
        &self.variants
    }

    /// Run one attempt for a file that has already been moved to `Validating`.
    ///
    /// Retries call this again from the start; no derived output is cached
    /// between attempts.
    pub async fn process(
        &self,
        file_id: Uuid,
        source: &SourceFile,
        settings: &SharedSettings,
        state: FileState,
        sink: &dyn ProgressSink,
    ) -> FileOutcome {
        let mut state = state;

        match self.attempt(file_id, source, settings, &mut state, sink).await {
            Ok(record) => {
                tracing::info!(
                    file_id = %file_id,
                    filename = %source.filename,
                    remote_id = %record.id,
                    "Photo uploaded"
                );
                FileOutcome::Uploaded(UploadedPhoto::new(file_id, &record))
            }
            Err(err) => {
                log_failure(file_id, &source.filename, &err);
                let reason = err.client_message();
                advance(file_id, &mut state, Transition::Fail(reason.clone()), sink).await;
                FileOutcome::Failed(FailedUpload {
                    file_id,
                    filename: source.filename.clone(),
                    reason,
                })
            }
        }
    }

    async fn attempt(
        &self,
        file_id: Uuid,
        source: &SourceFile,
        settings: &SharedSettings,
        state: &mut FileState,
        sink: &dyn ProgressSink,
    ) -> Result<PhotoRecord, UploadError> {
        let (width, height) = self.variants.read_dimensions(source).await?;
        advance(file_id, state, Transition::Validated, sink).await;

        // Both derivations start before either is awaited.
        let (thumbnail, preview) = tokio::join!(
            self.variants.derive_thumbnail(source),
            self.variants.derive_preview(source)
        );
        let thumbnail = thumbnail?;
        let preview = preview?;
        tracing::debug!(
            file_id = %file_id,
            thumbnail_bytes = thumbnail.data.len(),
            preview_bytes = preview.data.len(),
            "Variants derived"
        );
        advance(file_id, state, Transition::Compressed, sink).await;

        let fields = PhotoFormFields::new(
            &source.filename,
            settings,
            width,
            height,
            source.len() as u64,
        );
        let record = self
            .submitter
            .submit_photo(
                fields,
                ImageBlob::jpeg(thumbnail.filename, thumbnail.data),
                ImageBlob::jpeg(preview.filename, preview.data),
            )
            .await?;
        advance(file_id, state, Transition::Uploaded, sink).await;

        Ok(record)
    }
}

async fn advance(
    file_id: Uuid,
    state: &mut FileState,
    transition: Transition,
    sink: &dyn ProgressSink,
) {
    match state.apply(transition) {
        Ok(next) => {
            *state = next;
            sink.record(file_id, state).await;
        }
        Err(err) => {
            tracing::warn!(
                file_id = %file_id,
                error = %err,
                "Ignoring out-of-order transition"
            );
        }
    }
}

fn log_failure(file_id: Uuid, filename: &str, err: &UploadError) {
    let code = err.error_code();
    let recoverable = err.is_recoverable();
    let action = err.suggested_action().unwrap_or("");
    match err.log_level() {
        LogLevel::Debug => tracing::debug!(
            file_id = %file_id,
            filename = %filename,
            error_code = code,
            recoverable,
            action,
            error = %err,
            "Upload failed"
        ),
        LogLevel::Warn => tracing::warn!(
            file_id = %file_id,
            filename = %filename,
            error_code = code,
            recoverable,
            action,
            error = %err,
            "Upload failed"
        ),
        LogLevel::Error => tracing::error!(
            file_id = %file_id,
            filename = %filename,
            error_code = code,
            recoverable,
            action,
            error = %err,
            "Upload failed"
        ),
    }
}
