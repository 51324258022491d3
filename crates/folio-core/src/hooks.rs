//! Hooks and traits for the hosted backend
//!
//! The upload pipeline never talks to the backend directly. It depends on
//! these two traits; the API client implements them over HTTP and tests
//! implement them with in-memory fakes.

use async_trait::async_trait;

use crate::error::SubmitError;
use crate::models::{ImageBlob, PhotoFormFields, PhotoRecord, Usage};

/// Persists one processed photo.
///
/// Called once per file after both variants were derived. A returned error is
/// recorded against that file only; it never aborts the batch.
#[async_trait]
pub trait PhotoSubmitter: Send + Sync {
    async fn submit_photo(
        &self,
        fields: PhotoFormFields,
        thumbnail: ImageBlob,
        preview: ImageBlob,
    ) -> Result<PhotoRecord, SubmitError>;
}

/// Source of truth for the account's photo usage.
///
/// Refreshed once after every batch run so locally tracked usage resyncs
/// with what the backend actually stored.
#[async_trait]
pub trait QuotaSource: Send + Sync {
    async fn refresh(&self) -> Result<Usage, SubmitError>;
}

/// Fixed usage, for offline runs and tests
pub struct StaticQuotaSource {
    usage: Usage,
}

impl StaticQuotaSource {
    pub fn new(usage: Usage) -> Self {
        Self { usage }
    }
}

#[async_trait]
impl QuotaSource for StaticQuotaSource {
    async fn refresh(&self) -> Result<Usage, SubmitError> {
        Ok(self.usage)
    }
}
