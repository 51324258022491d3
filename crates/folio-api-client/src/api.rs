//! Photo and usage endpoints.
//!
//! `ApiClient` implements the collaborator traits from `folio_core` so a batch
//! session can run against the real backend.

use async_trait::async_trait;
use folio_core::{
    ImageBlob, PhotoFormFields, PhotoRecord, PhotoSubmitter, QuotaSource, SubmitError, Usage,
};
use reqwest::multipart::{Form, Part};

use crate::ApiClient;

fn file_part(blob: ImageBlob) -> Result<Part, SubmitError> {
    Part::bytes(blob.data.to_vec())
        .file_name(blob.filename)
        .mime_str(&blob.content_type)
        .map_err(|e| SubmitError::Transport(e.to_string()))
}

/// Multipart body for `POST /photos`: metadata as text fields, then both variants.
pub fn photo_form(
    fields: PhotoFormFields,
    thumbnail: ImageBlob,
    preview: ImageBlob,
) -> Result<Form, SubmitError> {
    let mut form = Form::new()
        .text("title", fields.title)
        .text("is_published", fields.is_published.to_string())
        .text("width", fields.width.to_string())
        .text("height", fields.height.to_string())
        .text("file_size", fields.file_size.to_string());
    if let Some(category_id) = fields.category_id {
        form = form.text("category_id", category_id.to_string());
    }

    Ok(form
        .part("thumbnail", file_part(thumbnail)?)
        .part("preview", file_part(preview)?))
}

impl ApiClient {
    /// Create a photo from its two derived variants.
    pub async fn create_photo(
        &self,
        fields: PhotoFormFields,
        thumbnail: ImageBlob,
        preview: ImageBlob,
    ) -> Result<PhotoRecord, SubmitError> {
        let title = fields.title.clone();
        let form = photo_form(fields, thumbnail, preview)?;
        let record: PhotoRecord = self
            .post_multipart(&format!("{}/photos", self.api_prefix()), form)
            .await?;
        tracing::debug!(title = %title, photo_id = %record.id, "Photo created");
        Ok(record)
    }

    /// Current photo count and limit for the account.
    pub async fn usage(&self) -> Result<Usage, SubmitError> {
        self.get(&format!("{}/usage", self.api_prefix())).await
    }
}

#[async_trait]
impl PhotoSubmitter for ApiClient {
    async fn submit_photo(
        &self,
        fields: PhotoFormFields,
        thumbnail: ImageBlob,
        preview: ImageBlob,
    ) -> Result<PhotoRecord, SubmitError> {
        self.create_photo(fields, thumbnail, preview).await
    }
}

#[async_trait]
impl QuotaSource for ApiClient {
    async fn refresh(&self) -> Result<Usage, SubmitError> {
        self.usage().await
    }
}
