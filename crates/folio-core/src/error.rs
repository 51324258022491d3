//! Error types module
//!
//! Errors raised by the remote collaborators, plus the `ErrorMetadata` trait
//! every per-file failure implements so the upload pipeline can turn it into a
//! user-facing message and pick a log level without matching on concrete types.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like a rejected upload
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Describes how an error should be presented to the person uploading.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "SUBMIT_REJECTED")
    fn error_code(&self) -> &'static str;

    /// Whether retrying the same file can succeed
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the user
    fn suggested_action(&self) -> Option<&'static str>;

    /// Human-readable message shown next to the failed file
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Failure reported by the persistence or usage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    /// The backend answered with a non-2xx status.
    #[error("Upload rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl SubmitError {
    /// Message used when the backend gives no usable error envelope.
    pub fn generic_message(status: u16) -> String {
        format!("Upload failed (HTTP {})", status)
    }
}

impl ErrorMetadata for SubmitError {
    fn error_code(&self) -> &'static str {
        match self {
            SubmitError::Rejected { .. } => "SUBMIT_REJECTED",
            SubmitError::Transport(_) => "SUBMIT_TRANSPORT_ERROR",
            SubmitError::InvalidResponse(_) => "SUBMIT_INVALID_RESPONSE",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            // 4xx means the payload or quota is wrong; 5xx may clear up.
            SubmitError::Rejected { status, .. } => *status >= 500 || *status == 429,
            SubmitError::Transport(_) => true,
            SubmitError::InvalidResponse(_) => false,
        }
    }

    fn suggested_action(&self) -> Option<&'static str> {
        match self {
            SubmitError::Rejected { status, .. } if *status >= 500 => {
                Some("Retry after a short delay")
            }
            SubmitError::Rejected { .. } => Some("Check the photo and your remaining quota"),
            SubmitError::Transport(_) => Some("Check your connection and retry"),
            SubmitError::InvalidResponse(_) => Some("Contact support if this error persists"),
        }
    }

    fn client_message(&self) -> String {
        match self {
            SubmitError::Rejected { message, .. } => message.clone(),
            SubmitError::Transport(_) => "Could not reach the server".to_string(),
            SubmitError::InvalidResponse(_) => "The server sent an unexpected response".to_string(),
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            SubmitError::Rejected { status, .. } if *status < 500 => LogLevel::Warn,
            _ => LogLevel::Error,
        }
    }
}
