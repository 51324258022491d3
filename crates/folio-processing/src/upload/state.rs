//! Per-file upload state machine.
//!
//! ```text
//! Pending -Begin-> Validating -Validated-> Compressing -Compressed-> Uploading -Uploaded-> Success
//!                  \______________________ Fail ______________________/
//!                                           v
//!                                         Error -Retry-> Pending
//! ```
//!
//! [`FileState::apply`] is pure; the pipeline decides when to fire transitions.

use folio_core::UploadStatus;
use serde::Serialize;
use std::fmt;

const PROGRESS_VALIDATING: u8 = 5;
const PROGRESS_COMPRESSING: u8 = 10;
const PROGRESS_UPLOADING: u8 = 60;
const PROGRESS_DONE: u8 = 100;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FileState {
    pub status: UploadStatus,
    /// 0-100
    pub progress: u8,
    /// Present only in [`UploadStatus::Error`].
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    Begin,
    Validated,
    Compressed,
    Uploaded,
    Fail(String),
    Retry,
}

impl Transition {
    pub fn name(&self) -> &'static str {
        match self {
            Transition::Begin => "begin",
            Transition::Validated => "validated",
            Transition::Compressed => "compressed",
            Transition::Uploaded => "uploaded",
            Transition::Fail(_) => "fail",
            Transition::Retry => "retry",
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Cannot apply '{transition}' to a file that is {from}")]
pub struct InvalidTransition {
    pub from: UploadStatus,
    pub transition: &'static str,
}

impl FileState {
    fn at(status: UploadStatus, progress: u8) -> Self {
        Self {
            status,
            progress,
            error: None,
        }
    }

    pub fn apply(&self, transition: Transition) -> Result<FileState, InvalidTransition> {
        use UploadStatus::*;

        let next = match (self.status, &transition) {
            (Pending, Transition::Begin) => Self::at(Validating, PROGRESS_VALIDATING),
            (Validating, Transition::Validated) => Self::at(Compressing, PROGRESS_COMPRESSING),
            (Compressing, Transition::Compressed) => Self::at(Uploading, PROGRESS_UPLOADING),
            (Uploading, Transition::Uploaded) => Self::at(Success, PROGRESS_DONE),
            (Validating | Compressing | Uploading, Transition::Fail(message)) => FileState {
                status: Error,
                progress: 0,
                error: Some(message.clone()),
            },
            (Error, Transition::Retry) => Self::at(Pending, 0),
            _ => {
                return Err(InvalidTransition {
                    from: self.status,
                    transition: transition.name(),
                })
            }
        };
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use UploadStatus::*;

    fn walk(transitions: Vec<Transition>) -> Vec<FileState> {
        let mut state = FileState::default();
        let mut seen = Vec::new();
        for transition in transitions {
            state = state.apply(transition).unwrap();
            seen.push(state.clone());
        }
        seen
    }

    #[test]
    fn test_happy_path_progress() {
        let states = walk(vec![
            Transition::Begin,
            Transition::Validated,
            Transition::Compressed,
            Transition::Uploaded,
        ]);
        let observed: Vec<(UploadStatus, u8)> =
            states.iter().map(|s| (s.status, s.progress)).collect();
        assert_eq!(
            observed,
            vec![
                (Validating, 5),
                (Compressing, 10),
                (Uploading, 60),
                (Success, 100)
            ]
        );
        assert!(states.iter().all(|s| s.error.is_none()));
    }

    #[test]
    fn test_fail_from_every_working_state() {
        let prefixes = [
            vec![Transition::Begin],
            vec![Transition::Begin, Transition::Validated],
            vec![
                Transition::Begin,
                Transition::Validated,
                Transition::Compressed,
            ],
        ];
        for prefix in prefixes {
            let state = walk(prefix).pop().unwrap();
            let failed = state.apply(Transition::Fail("boom".to_string())).unwrap();
            assert_eq!(failed.status, Error);
            assert_eq!(failed.progress, 0);
            assert_eq!(failed.error.as_deref(), Some("boom"));
        }
    }

    #[test]
    fn test_retry_resets_state() {
        let failed = walk(vec![
            Transition::Begin,
            Transition::Validated,
            Transition::Fail("decode".to_string()),
        ])
        .pop()
        .unwrap();

        let retried = failed.apply(Transition::Retry).unwrap();
        assert_eq!(retried, FileState::default());
    }

    #[test]
    fn test_invalid_transitions_are_rejected() {
        let pending = FileState::default();
        assert_eq!(
            pending.apply(Transition::Uploaded),
            Err(InvalidTransition {
                from: Pending,
                transition: "uploaded"
            })
        );
        assert!(pending.apply(Transition::Fail("x".to_string())).is_err());
        assert!(pending.apply(Transition::Retry).is_err());

        let success = walk(vec![
            Transition::Begin,
            Transition::Validated,
            Transition::Compressed,
            Transition::Uploaded,
        ])
        .pop()
        .unwrap();
        assert!(success.apply(Transition::Begin).is_err());
        assert!(success.apply(Transition::Retry).is_err());
        assert!(success.apply(Transition::Fail("late".to_string())).is_err());
    }

    #[test]
    fn test_invalid_transition_message() {
        let err = FileState::default().apply(Transition::Retry).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot apply 'retry' to a file that is pending"
        );
    }
}
