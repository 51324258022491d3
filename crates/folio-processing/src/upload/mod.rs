//! Batch upload: admit → validate → compress → upload, one file at a time.

pub mod admission;
pub mod pipeline;
pub mod preview;
pub mod session;
pub mod state;
pub mod traits;
pub mod types;

pub use admission::{admit, AdmissionPlan, Slots};
pub use pipeline::FilePipeline;
pub use session::{BatchSession, SessionError};
pub use state::{FileState, InvalidTransition, Transition};
pub use traits::{ProgressSink, VariantProcessor};
pub use types::{
    Admission, BatchCounts, BatchResult, FailedUpload, FileEvent, FileOutcome, FileSnapshot,
    Rejection, RejectionReason, SourceFile, UploadableFile, UploadedPhoto,
};
