//! Data models for the upload pipeline
//!
//! Each sub-module represents one concern: the photo as the backend sees it,
//! the account usage, and the per-file upload status.

mod photo;
mod upload;
mod usage;

// Re-export all models for convenient imports
pub use photo::*;
pub use upload::*;
pub use usage::*;
