//! Folio Photo Processing Library
//!
//! Client-side half of the photo upload: every JPEG is downscaled into a
//! thumbnail and a preview here, and only those two variants are sent to the
//! backend. The batch session drives that per file and aggregates the results.

pub mod compression;
pub mod error;
pub mod image;
pub mod upload;
pub mod validator;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export commonly used types
pub use compression::{JpegCompressor, JpegQuality};
pub use error::{ResizeError, UploadError};
pub use crate::image::{
    ImageProcessor, Resampler, ResizeOptions, ResizeOutcome, UnsharpMask, VariantDeriver,
};
pub use upload::{
    Admission, BatchResult, BatchSession, FileEvent, FileOutcome, FileSnapshot, Rejection,
    RejectionReason, SessionError, SourceFile, VariantProcessor,
};
pub use validator::{PhotoValidator, ValidationError};
