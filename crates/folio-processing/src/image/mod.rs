//! Image processing module
//!
//! - Header inspection and decode (processor)
//! - Lanczos3 downscaling with a working-canvas clamp (resize)
//! - Unsharp mask applied after resampling (filters)
//! - Thumbnail and preview presets (variants)

pub mod filters;
pub mod processor;
pub mod resize;
pub mod variants;

pub use filters::UnsharpMask;
pub use processor::ImageProcessor;
pub use resize::{fit_within, Resampler, ResizeOptions, ResizeOutcome};
pub use variants::{VariantDeriver, LIST_PREVIEW, PREVIEW, THUMBNAIL};
