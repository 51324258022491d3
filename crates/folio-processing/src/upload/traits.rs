//! Traits for the upload pipeline.

use async_trait::async_trait;
use uuid::Uuid;

use super::state::FileState;
use super::types::SourceFile;
use crate::error::ResizeError;
use crate::image::ResizeOutcome;

/// Image work needed for one file. Implemented by
/// [`VariantDeriver`](crate::image::VariantDeriver).
#[async_trait]
pub trait VariantProcessor: Send + Sync {
    /// Native size of the original, read from the header.
    async fn read_dimensions(&self, source: &SourceFile) -> Result<(u32, u32), ResizeError>;

    async fn derive_thumbnail(&self, source: &SourceFile) -> Result<ResizeOutcome, ResizeError>;

    async fn derive_preview(&self, source: &SourceFile) -> Result<ResizeOutcome, ResizeError>;

    /// Tiny rendition for the pending-file list. Defaults to the thumbnail.
    async fn derive_list_preview(
        &self,
        source: &SourceFile,
    ) -> Result<ResizeOutcome, ResizeError> {
        self.derive_thumbnail(source).await
    }
}

/// Receives every state a file passes through.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn record(&self, file_id: Uuid, state: &FileState);
}

