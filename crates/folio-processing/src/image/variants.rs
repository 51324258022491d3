//! Thumbnail and preview derivation
//!
//! Every accepted photo is stored as two JPEG variants: a small thumbnail for
//! grids and a larger preview for the detail view. The original never leaves
//! the machine.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::ResizeError;
use crate::image::processor::ImageProcessor;
use crate::image::resize::{Resampler, ResizeOptions, ResizeOutcome};
use crate::upload::traits::VariantProcessor;
use crate::upload::types::SourceFile;

/// Grid thumbnail: 400px, stronger sharpening to survive the heavier reduction.
pub const THUMBNAIL: ResizeOptions = ResizeOptions {
    max_dimension: 400,
    quality: 0.85,
    unsharp_amount: 80.0,
    unsharp_radius: 0.6,
    unsharp_threshold: 2,
};

/// Detail-view preview: 1200px.
pub const PREVIEW: ResizeOptions = ResizeOptions {
    max_dimension: 1200,
    quality: 0.90,
    unsharp_amount: 60.0,
    unsharp_radius: 0.5,
    unsharp_threshold: 2,
};

/// Inline rendition for the pending-file list. Never uploaded.
pub const LIST_PREVIEW: ResizeOptions = ResizeOptions {
    max_dimension: 160,
    quality: 0.7,
    unsharp_amount: 0.0,
    unsharp_radius: 0.0,
    unsharp_threshold: 0,
};

/// Derives both variants through one shared [`Resampler`].
#[derive(Debug, Clone)]
pub struct VariantDeriver {
    resampler: Arc<Resampler>,
}

impl Default for VariantDeriver {
    fn default() -> Self {
        Self::new(Arc::new(Resampler::default()))
    }
}

impl VariantDeriver {
    pub fn new(resampler: Arc<Resampler>) -> Self {
        Self { resampler }
    }

    pub fn resampler(&self) -> &Arc<Resampler> {
        &self.resampler
    }

    async fn derive(
        &self,
        source: &SourceFile,
        options: ResizeOptions,
    ) -> Result<ResizeOutcome, ResizeError> {
        self.resampler
            .clone()
            .resize_async(source.data.clone(), source.filename.clone(), options)
            .await
    }
}

#[async_trait]
impl VariantProcessor for VariantDeriver {
    async fn read_dimensions(&self, source: &SourceFile) -> Result<(u32, u32), ResizeError> {
        let data = source.data.clone();
        tokio::task::spawn_blocking(move || ImageProcessor::read_dimensions(&data)).await?
    }

    async fn derive_thumbnail(&self, source: &SourceFile) -> Result<ResizeOutcome, ResizeError> {
        self.derive(source, THUMBNAIL).await
    }

    async fn derive_preview(&self, source: &SourceFile) -> Result<ResizeOutcome, ResizeError> {
        self.derive(source, PREVIEW).await
    }

    async fn derive_list_preview(
        &self,
        source: &SourceFile,
    ) -> Result<ResizeOutcome, ResizeError> {
        self.derive(source, LIST_PREVIEW).await
    }
}
