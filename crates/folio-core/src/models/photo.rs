use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Settings applied identically to every file of a batch at submission time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedSettings {
    pub category_id: Option<Uuid>,
    pub publish_immediately: bool,
}

/// Metadata sent alongside the two derived variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoFormFields {
    pub title: String,
    pub category_id: Option<Uuid>,
    pub is_published: bool,
    /// Native dimensions of the original, not of the variants.
    pub width: u32,
    pub height: u32,
    /// Size of the original source file in bytes.
    pub file_size: u64,
}

impl PhotoFormFields {
    pub fn new(
        filename: &str,
        settings: &SharedSettings,
        width: u32,
        height: u32,
        file_size: u64,
    ) -> Self {
        Self {
            title: title_from_filename(filename),
            category_id: settings.category_id,
            is_published: settings.publish_immediately,
            width,
            height,
            file_size,
        }
    }
}

/// Default photo title: the filename with its extension stripped.
pub fn title_from_filename(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => filename.to_string(),
    }
}

/// An encoded JPEG variant with the filename it is uploaded under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBlob {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

impl ImageBlob {
    pub fn jpeg(filename: impl Into<String>, data: Bytes) -> Self {
        Self {
            filename: filename.into(),
            content_type: "image/jpeg".to_string(),
            data,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Photo record created by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoRecord {
    pub id: Uuid,
    pub title: String,
    pub thumbnail_url: String,
    pub preview_url: String,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}
