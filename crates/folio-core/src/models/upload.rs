use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Lifecycle of one file in a batch session.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    #[default]
    Pending,
    Validating,
    Compressing,
    Uploading,
    Success,
    Error,
}

impl UploadStatus {
    /// Whether a batch run should pick this file up.
    pub fn is_runnable(self) -> bool {
        matches!(self, UploadStatus::Pending | UploadStatus::Error)
    }

    /// Whether the file is being worked on right now.
    pub fn is_in_flight(self) -> bool {
        matches!(
            self,
            UploadStatus::Validating | UploadStatus::Compressing | UploadStatus::Uploading
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, UploadStatus::Success | UploadStatus::Error)
    }
}

impl Display for UploadStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            UploadStatus::Pending => write!(f, "pending"),
            UploadStatus::Validating => write!(f, "validating"),
            UploadStatus::Compressing => write!(f, "compressing"),
            UploadStatus::Uploading => write!(f, "uploading"),
            UploadStatus::Success => write!(f, "success"),
            UploadStatus::Error => write!(f, "error"),
        }
    }
}

impl FromStr for UploadStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(UploadStatus::Pending),
            "validating" => Ok(UploadStatus::Validating),
            "compressing" => Ok(UploadStatus::Compressing),
            "uploading" => Ok(UploadStatus::Uploading),
            "success" => Ok(UploadStatus::Success),
            "error" => Ok(UploadStatus::Error),
            _ => Err(anyhow::anyhow!("Invalid upload status: {}", s)),
        }
    }
}
