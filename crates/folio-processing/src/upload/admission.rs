//! Admission of new files into a batch.
//!
//! Pure: given the candidate files, the validator and the free slots, decide
//! which files enter the batch. Files failing type or size checks never consume
//! a slot, so where they sit in the input does not change which valid files
//! get in.

use folio_core::Usage;

use super::types::{Rejection, RejectionReason, SourceFile};
use crate::validator::PhotoValidator;

/// Free capacity at the moment of admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slots {
    /// Room left under the per-batch file cap.
    pub batch: usize,
    /// Room left under the account's photo limit.
    pub quota: usize,
}

impl Slots {
    /// `queued` counts every file in the batch. `unsubmitted` counts the ones
    /// not uploaded yet; uploaded files are already part of `usage` once it has
    /// been refreshed.
    pub fn new(batch_cap: usize, queued: usize, usage: Usage, unsubmitted: usize) -> Self {
        Self {
            batch: batch_cap.saturating_sub(queued),
            quota: usage.remaining().saturating_sub(unsubmitted),
        }
    }

    pub fn available(&self) -> usize {
        self.batch.min(self.quota)
    }
}

/// Files accepted into the batch (input order preserved) and the ones turned away.
#[derive(Debug, Default)]
pub struct AdmissionPlan {
    pub accepted: Vec<SourceFile>,
    pub rejected: Vec<Rejection>,
}

pub fn admit(files: Vec<SourceFile>, validator: &PhotoValidator, slots: Slots) -> AdmissionPlan {
    let mut plan = AdmissionPlan::default();

    for file in files {
        if let Err(err) = validator.validate_all(&file.filename, &file.content_type, file.len()) {
            tracing::debug!(filename = %file.filename, error = %err, "File rejected");
            plan.rejected.push(Rejection {
                filename: file.filename,
                reason: RejectionReason::from(&err),
            });
            continue;
        }

        let taken = plan.accepted.len();
        if taken >= slots.available() {
            // The quota is the harder limit: a new batch does not free it.
            let reason = if taken >= slots.quota {
                RejectionReason::QuotaExceeded
            } else {
                RejectionReason::BatchFull
            };
            plan.rejected.push(Rejection {
                filename: file.filename,
                reason,
            });
            continue;
        }

        plan.accepted.push(file);
    }

    if !plan.rejected.is_empty() {
        tracing::info!(
            accepted = plan.accepted.len(),
            rejected = plan.rejected.len(),
            "Some files were not admitted"
        );
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jpeg(name: &str) -> SourceFile {
        SourceFile::new(name, "image/jpeg", vec![0xFFu8; 16])
    }

    fn names(files: &[SourceFile]) -> Vec<&str> {
        files.iter().map(|f| f.filename.as_str()).collect()
    }

    #[test]
    fn test_slots() {
        let slots = Slots::new(100, 0, Usage::new(195, 200), 0);
        assert_eq!(slots, Slots { batch: 100, quota: 5 });
        assert_eq!(slots.available(), 5);

        // Uploaded files still occupy the batch but not the quota
        let slots = Slots::new(100, 10, Usage::new(150, 200), 4);
        assert_eq!(slots, Slots { batch: 90, quota: 46 });

        // Over-limit accounts saturate at zero
        let slots = Slots::new(100, 0, Usage::new(250, 200), 0);
        assert_eq!(slots.available(), 0);
    }

    #[test]
    fn test_quota_truncates_admission() {
        let files: Vec<SourceFile> = (0..10).map(|i| jpeg(&format!("{}.jpg", i))).collect();
        let plan = admit(
            files,
            &PhotoValidator::default(),
            Slots::new(100, 0, Usage::new(195, 200), 0),
        );

        assert_eq!(names(&plan.accepted), vec!["0.jpg", "1.jpg", "2.jpg", "3.jpg", "4.jpg"]);
        assert_eq!(plan.rejected.len(), 5);
        assert!(plan
            .rejected
            .iter()
            .all(|r| r.reason == RejectionReason::QuotaExceeded));
    }

    #[test]
    fn test_batch_cap_truncates_admission() {
        let files: Vec<SourceFile> = (0..4).map(|i| jpeg(&format!("{}.jpg", i))).collect();
        let plan = admit(
            files,
            &PhotoValidator::default(),
            Slots::new(100, 98, Usage::new(0, 200), 0),
        );

        assert_eq!(plan.accepted.len(), 2);
        assert_eq!(
            plan.rejected,
            vec![
                Rejection {
                    filename: "2.jpg".to_string(),
                    reason: RejectionReason::BatchFull
                },
                Rejection {
                    filename: "3.jpg".to_string(),
                    reason: RejectionReason::BatchFull
                },
            ]
        );
    }

    #[test]
    fn test_type_and_size_rejections() {
        let validator = PhotoValidator::new(
            32,
            vec!["jpg".to_string(), "jpeg".to_string()],
            vec!["image/jpeg".to_string()],
        );
        let files = vec![
            jpeg("ok.jpg"),
            SourceFile::new("scan.png", "image/png", vec![1u8; 8]),
            SourceFile::new("empty.jpg", "image/jpeg", Vec::new()),
            SourceFile::new("huge.jpg", "image/jpeg", vec![1u8; 33]),
            SourceFile::new("renamed.JPEG", "application/octet-stream", vec![1u8; 8]),
        ];
        let plan = admit(files, &validator, Slots::new(100, 0, Usage::new(0, 200), 0));

        assert_eq!(names(&plan.accepted), vec!["ok.jpg", "renamed.JPEG"]);
        let reasons: Vec<(&str, RejectionReason)> = plan
            .rejected
            .iter()
            .map(|r| (r.filename.as_str(), r.reason))
            .collect();
        assert_eq!(
            reasons,
            vec![
                ("scan.png", RejectionReason::UnsupportedType),
                ("empty.jpg", RejectionReason::Empty),
                ("huge.jpg", RejectionReason::TooLarge),
            ]
        );
    }

    #[test]
    fn test_invalid_files_do_not_consume_slots() {
        let slots = Slots::new(100, 0, Usage::new(198, 200), 0);
        let invalid_first = vec![
            SourceFile::new("a.gif", "image/gif", vec![1u8; 8]),
            SourceFile::new("b.gif", "image/gif", vec![1u8; 8]),
            jpeg("c.jpg"),
            jpeg("d.jpg"),
        ];
        let invalid_last = vec![
            jpeg("c.jpg"),
            jpeg("d.jpg"),
            SourceFile::new("a.gif", "image/gif", vec![1u8; 8]),
            SourceFile::new("b.gif", "image/gif", vec![1u8; 8]),
        ];

        let first = admit(invalid_first, &PhotoValidator::default(), slots);
        let last = admit(invalid_last, &PhotoValidator::default(), slots);
        assert_eq!(names(&first.accepted), vec!["c.jpg", "d.jpg"]);
        assert_eq!(names(&first.accepted), names(&last.accepted));
    }

    #[test]
    fn test_no_slots_rejects_everything_valid() {
        let plan = admit(
            vec![jpeg("a.jpg")],
            &PhotoValidator::default(),
            Slots::new(100, 0, Usage::new(200, 200), 0),
        );
        assert!(plan.accepted.is_empty());
        assert_eq!(plan.rejected[0].reason, RejectionReason::QuotaExceeded);
    }
}
