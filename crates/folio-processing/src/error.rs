//! Per-file pipeline errors.
//!
//! Both error types implement [`ErrorMetadata`] so the pipeline can turn any
//! failure into the message shown next to the file and log it at the right level.

use folio_core::{ErrorMetadata, LogLevel, SubmitError};

/// Any failure while decoding, resampling or encoding one image.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResizeError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Cannot allocate a {width}x{height} working surface")]
    Surface { width: u32, height: u32 },

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Image worker failed: {0}")]
    Worker(String),
}

impl From<image::ImageError> for ResizeError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Limits(_) => ResizeError::Surface {
                width: 0,
                height: 0,
            },
            other => ResizeError::Decode(other.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for ResizeError {
    fn from(err: tokio::task::JoinError) -> Self {
        ResizeError::Worker(err.to_string())
    }
}

impl ErrorMetadata for ResizeError {
    fn error_code(&self) -> &'static str {
        match self {
            ResizeError::Decode(_) => "IMAGE_DECODE_ERROR",
            ResizeError::Surface { .. } => "IMAGE_SURFACE_ERROR",
            ResizeError::Encode(_) => "IMAGE_ENCODE_ERROR",
            ResizeError::Worker(_) => "IMAGE_WORKER_ERROR",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, ResizeError::Worker(_))
    }

    fn suggested_action(&self) -> Option<&'static str> {
        match self {
            ResizeError::Decode(_) => Some("Check the file is a valid JPEG and try again"),
            ResizeError::Surface { .. } => Some("Export the photo at a smaller size"),
            ResizeError::Encode(_) | ResizeError::Worker(_) => Some("Retry the upload"),
        }
    }

    fn client_message(&self) -> String {
        match self {
            ResizeError::Decode(_) => "This file could not be read as a JPEG image".to_string(),
            ResizeError::Surface { .. } => "This image is too large to process".to_string(),
            ResizeError::Encode(_) => "Could not compress this image".to_string(),
            ResizeError::Worker(_) => "Image processing was interrupted".to_string(),
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            ResizeError::Decode(_) | ResizeError::Surface { .. } => LogLevel::Warn,
            ResizeError::Encode(_) | ResizeError::Worker(_) => LogLevel::Error,
        }
    }
}

/// Failure of one file's upload attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error(transparent)]
    Resize(#[from] ResizeError),

    #[error(transparent)]
    Submit(#[from] SubmitError),
}

impl ErrorMetadata for UploadError {
    fn error_code(&self) -> &'static str {
        match self {
            UploadError::Resize(e) => e.error_code(),
            UploadError::Submit(e) => e.error_code(),
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            UploadError::Resize(e) => e.is_recoverable(),
            UploadError::Submit(e) => e.is_recoverable(),
        }
    }

    fn suggested_action(&self) -> Option<&'static str> {
        match self {
            UploadError::Resize(e) => e.suggested_action(),
            UploadError::Submit(e) => e.suggested_action(),
        }
    }

    fn client_message(&self) -> String {
        match self {
            UploadError::Resize(e) => e.client_message(),
            UploadError::Submit(e) => e.client_message(),
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            UploadError::Resize(e) => e.log_level(),
            UploadError::Submit(e) => e.log_level(),
        }
    }
}
