//! Types for the upload pipeline.

use bytes::Bytes;
use folio_core::{PhotoRecord, UploadStatus};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use uuid::Uuid;

use super::state::FileState;
use crate::validator::ValidationError;

/// A file as handed over by the caller, before admission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFile {
    pub filename: String,
    /// Declared by the caller; not sniffed.
    pub content_type: String,
    pub data: Bytes,
}

impl SourceFile {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn extension(&self) -> Option<String> {
        Path::new(&self.filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
    }
}

/// One admitted file and its upload state.
#[derive(Clone, Debug)]
pub struct UploadableFile {
    pub id: Uuid,
    pub source: SourceFile,
    /// Small inline preview for display; filled independently of processing.
    pub preview_data_url: Option<String>,
    pub(crate) state: FileState,
}

impl UploadableFile {
    pub fn new(source: SourceFile) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            preview_data_url: None,
            state: FileState::default(),
        }
    }

    pub fn state(&self) -> &FileState {
        &self.state
    }

    pub fn status(&self) -> UploadStatus {
        self.state.status
    }

    pub fn progress(&self) -> u8 {
        self.state.progress
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    pub fn snapshot(&self) -> FileSnapshot {
        FileSnapshot {
            id: self.id,
            filename: self.source.filename.clone(),
            status: self.state.status,
            progress: self.state.progress,
            error: self.state.error.clone(),
            has_preview: self.preview_data_url.is_some(),
        }
    }
}

/// Read-only view of a file for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FileSnapshot {
    pub id: Uuid,
    pub filename: String,
    pub status: UploadStatus,
    pub progress: u8,
    pub error: Option<String>,
    pub has_preview: bool,
}

/// Broadcast on every state transition of a file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FileEvent {
    pub file_id: Uuid,
    pub status: UploadStatus,
    pub progress: u8,
    pub error: Option<String>,
}

impl FileEvent {
    pub fn new(file_id: Uuid, state: &FileState) -> Self {
        Self {
            file_id,
            status: state.status,
            progress: state.progress,
            error: state.error.clone(),
        }
    }
}

/// Why a file was refused at admission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    UnsupportedType,
    Empty,
    TooLarge,
    /// The batch already holds the maximum number of files.
    BatchFull,
    /// The account has no photo quota left for this file.
    QuotaExceeded,
    /// The caller could not read the file's bytes.
    Unreadable,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            RejectionReason::UnsupportedType => "only JPEG photos can be uploaded",
            RejectionReason::Empty => "file is empty",
            RejectionReason::TooLarge => "file exceeds the size limit",
            RejectionReason::BatchFull => "batch is full",
            RejectionReason::QuotaExceeded => "photo limit reached",
            RejectionReason::Unreadable => "file could not be read",
        };
        f.write_str(message)
    }
}

impl From<&ValidationError> for RejectionReason {
    fn from(err: &ValidationError) -> Self {
        match err {
            ValidationError::UnsupportedType { .. } => RejectionReason::UnsupportedType,
            ValidationError::EmptyFile => RejectionReason::Empty,
            ValidationError::FileTooLarge { .. } => RejectionReason::TooLarge,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub filename: String,
    pub reason: RejectionReason,
}

/// Result of adding files to a session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Admission {
    pub admitted: Vec<Uuid>,
    pub rejected: Vec<Rejection>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UploadedPhoto {
    pub file_id: Uuid,
    pub remote_id: Uuid,
    pub thumbnail_url: String,
    pub preview_url: String,
}

impl UploadedPhoto {
    pub fn new(file_id: Uuid, record: &PhotoRecord) -> Self {
        Self {
            file_id,
            remote_id: record.id,
            thumbnail_url: record.thumbnail_url.clone(),
            preview_url: record.preview_url.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FailedUpload {
    pub file_id: Uuid,
    pub filename: String,
    pub reason: String,
}

/// Terminal result of one upload attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FileOutcome {
    Uploaded(UploadedPhoto),
    Failed(FailedUpload),
}

impl FileOutcome {
    pub fn file_id(&self) -> Uuid {
        match self {
            FileOutcome::Uploaded(photo) => photo.file_id,
            FileOutcome::Failed(failure) => failure.file_id,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FileOutcome::Uploaded(_))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BatchCounts {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Aggregate of one batch run, in session order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    pub succeeded: Vec<UploadedPhoto>,
    pub failed: Vec<FailedUpload>,
    pub counts: BatchCounts,
}

impl BatchResult {
    pub fn push(&mut self, outcome: FileOutcome) {
        self.counts.total += 1;
        match outcome {
            FileOutcome::Uploaded(photo) => {
                self.counts.succeeded += 1;
                self.succeeded.push(photo);
            }
            FileOutcome::Failed(failure) => {
                self.counts.failed += 1;
                self.failed.push(failure);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.counts.total == 0
    }

    pub fn has_failures(&self) -> bool {
        self.counts.failed > 0
    }

    pub fn summary(&self) -> String {
        self.to_string()
    }
}

impl FromIterator<FileOutcome> for BatchResult {
    fn from_iter<I: IntoIterator<Item = FileOutcome>>(iter: I) -> Self {
        let mut result = BatchResult::default();
        for outcome in iter {
            result.push(outcome);
        }
        result
    }
}

impl fmt::Display for BatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "uploaded {}, {} failed",
            self.counts.succeeded, self.counts.failed
        )
    }
}
