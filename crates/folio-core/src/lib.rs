//! Folio Core Library
//!
//! This crate provides the domain models, error types, configuration, and the
//! collaborator traits shared by the upload pipeline, the API client and the CLI.

pub mod config;
pub mod error;
pub mod hooks;
pub mod models;

// Re-export commonly used types
pub use config::UploadConfig;
pub use error::{ErrorMetadata, LogLevel, SubmitError};
pub use hooks::{PhotoSubmitter, QuotaSource, StaticQuotaSource};
pub use models::{ImageBlob, PhotoFormFields, PhotoRecord, SharedSettings, UploadStatus, Usage};
