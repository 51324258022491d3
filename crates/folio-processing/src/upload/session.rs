//! Batch orchestration.
//!
//! A [`BatchSession`] owns the ordered list of files the photographer queued,
//! admits new files under the batch cap and the account quota, and runs the
//! per-file pipeline over them one at a time. A failed file never stops the
//! batch; it is reported in the [`BatchResult`] and can be retried on its own.

use async_trait::async_trait;
use folio_core::{
    PhotoSubmitter, QuotaSource, SharedSettings, SubmitError, UploadConfig, UploadStatus, Usage,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use uuid::Uuid;

use super::admission::{self, Slots};
use super::pipeline::FilePipeline;
use super::preview::jpeg_data_url;
use super::state::{FileState, Transition};
use super::traits::{ProgressSink, VariantProcessor};
use super::types::{
    Admission, BatchResult, FileEvent, FileOutcome, FileSnapshot, SourceFile, UploadableFile,
};
use crate::validator::PhotoValidator;

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("File {0} is not in this batch")]
    NotFound(Uuid),

    #[error("File {id} cannot be started while {status}")]
    NotRunnable { id: Uuid, status: UploadStatus },
}

struct SessionState {
    files: Vec<UploadableFile>,
    settings: SharedSettings,
    usage: Usage,
}

impl SessionState {
    fn file_mut(&mut self, id: Uuid) -> Option<&mut UploadableFile> {
        self.files.iter_mut().find(|f| f.id == id)
    }
}

/// Clears the submitting flag when the run ends, however it ends.
struct SubmittingGuard<'a>(&'a AtomicBool);

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct BatchSession {
    // Never held across a collaborator await.
    state: Mutex<SessionState>,
    is_submitting: AtomicBool,
    validator: PhotoValidator,
    batch_cap: usize,
    pipeline: FilePipeline,
    quota: Arc<dyn QuotaSource>,
    events: broadcast::Sender<FileEvent>,
}

impl BatchSession {
    /// Usage starts at zero photos out of the configured limit until the
    /// first [`refresh_usage`](Self::refresh_usage).
    pub fn new(
        config: &UploadConfig,
        variants: Arc<dyn VariantProcessor>,
        submitter: Arc<dyn PhotoSubmitter>,
        quota: Arc<dyn QuotaSource>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: Mutex::new(SessionState {
                files: Vec::new(),
                settings: SharedSettings::default(),
                usage: Usage::new(0, config.photo_limit),
            }),
            is_submitting: AtomicBool::new(false),
            validator: PhotoValidator::from_config(config),
            batch_cap: config.max_batch_files,
            pipeline: FilePipeline::new(variants, submitter),
            quota,
            events,
        }
    }

    /// Start from a known usage instead of an empty account.
    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.state.get_mut().usage = usage;
        self
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting.load(Ordering::Acquire)
    }

    pub async fn usage(&self) -> Usage {
        self.state.lock().await.usage
    }

    pub async fn shared_settings(&self) -> SharedSettings {
        self.state.lock().await.settings.clone()
    }

    /// Applies to every file submitted from now on, including the rest of a
    /// run in progress.
    pub async fn set_shared_settings(&self, settings: SharedSettings) {
        self.state.lock().await.settings = settings;
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FileEvent> {
        self.events.subscribe()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.files.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.files.is_empty()
    }

    /// Every file in session order.
    pub async fn snapshot(&self) -> Vec<FileSnapshot> {
        let state = self.state.lock().await;
        state.files.iter().map(UploadableFile::snapshot).collect()
    }

    pub async fn file(&self, id: Uuid) -> Option<FileSnapshot> {
        let state = self.state.lock().await;
        state.files.iter().find(|f| f.id == id).map(UploadableFile::snapshot)
    }

    pub async fn preview_data_url(&self, id: Uuid) -> Option<String> {
        let state = self.state.lock().await;
        state
            .files
            .iter()
            .find(|f| f.id == id)
            .and_then(|f| f.preview_data_url.clone())
    }

    /// Add files to the end of the batch. Files that fail type or size checks,
    /// or that do not fit under the batch cap or the account quota, are
    /// returned as rejections instead.
    pub async fn admit(&self, files: Vec<SourceFile>) -> Admission {
        let mut state = self.state.lock().await;

        let unsubmitted = state
            .files
            .iter()
            .filter(|f| f.status() != UploadStatus::Success)
            .count();
        let slots = Slots::new(self.batch_cap, state.files.len(), state.usage, unsubmitted);
        let plan = admission::admit(files, &self.validator, slots);

        let admitted = plan
            .accepted
            .into_iter()
            .map(|source| {
                let file = UploadableFile::new(source);
                let id = file.id;
                tracing::debug!(
                    file_id = %id,
                    filename = %file.source.filename,
                    "File admitted"
                );
                state.files.push(file);
                id
            })
            .collect();

        Admission {
            admitted,
            rejected: plan.rejected,
        }
    }

    /// Drop a file from the list. A file already in flight finishes its
    /// attempt and is still reported by the run.
    pub async fn remove(&self, id: Uuid) -> bool {
        let mut state = self.state.lock().await;
        let before = state.files.len();
        state.files.retain(|f| f.id != id);
        before != state.files.len()
    }

    pub async fn clear(&self) {
        self.state.lock().await.files.clear();
    }

    /// Upload every `Pending` or `Error` file in order, one at a time.
    ///
    /// Returns `None` without doing anything if a run is already active.
    /// Files already uploaded are skipped, so running twice is harmless.
    pub async fn run(&self) -> Option<BatchResult> {
        if self
            .is_submitting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("Batch run already in progress, ignoring");
            return None;
        }
        let _guard = SubmittingGuard(&self.is_submitting);

        let queue: Vec<Uuid> = {
            let state = self.state.lock().await;
            state
                .files
                .iter()
                .filter(|f| f.status().is_runnable())
                .map(|f| f.id)
                .collect()
        };
        tracing::info!(files = queue.len(), "Starting batch run");

        let mut result = BatchResult::default();
        for id in queue {
            let (source, settings, started) = match self.begin(id, true).await {
                Ok(ready) => ready,
                Err(err) => {
                    // Removed, or picked up by a concurrent retry
                    tracing::debug!(file_id = %id, error = %err, "Skipping file");
                    continue;
                }
            };
            let outcome = self
                .pipeline
                .process(id, &source, &settings, started, self)
                .await;
            result.push(outcome);
        }

        if let Err(err) = self.refresh_usage().await {
            tracing::warn!(error = %err, "Failed to refresh usage after batch run");
        }

        tracing::info!(
            total = result.counts.total,
            succeeded = result.counts.succeeded,
            failed = result.counts.failed,
            "Batch run finished"
        );
        Some(result)
    }

    /// Rerun a single failed file from scratch, outside any batch run.
    pub async fn retry(&self, id: Uuid) -> Result<FileOutcome, SessionError> {
        let (source, settings, started) = self.begin(id, false).await?;
        tracing::info!(file_id = %id, filename = %source.filename, "Retrying upload");
        Ok(self
            .pipeline
            .process(id, &source, &settings, started, self)
            .await)
    }

    /// Pull the account usage from the backend and keep it for admission.
    pub async fn refresh_usage(&self) -> Result<Usage, SubmitError> {
        let usage = self.quota.refresh().await?;
        self.state.lock().await.usage = usage;
        tracing::debug!(
            current = usage.current_photo_count,
            limit = usage.photo_limit,
            "Usage refreshed"
        );
        Ok(usage)
    }

    /// Fill in the inline preview of every file that has none yet. Returns how
    /// many were rendered; failures are logged and leave the preview empty.
    pub async fn render_previews(&self) -> usize {
        let missing: Vec<(Uuid, SourceFile)> = {
            let state = self.state.lock().await;
            state
                .files
                .iter()
                .filter(|f| f.preview_data_url.is_none())
                .map(|f| (f.id, f.source.clone()))
                .collect()
        };

        let mut rendered = 0;
        for (id, source) in missing {
            match self.pipeline.variants().derive_list_preview(&source).await {
                Ok(outcome) => {
                    let url = jpeg_data_url(&outcome.data);
                    let mut state = self.state.lock().await;
                    if let Some(file) = state.file_mut(id) {
                        file.preview_data_url = Some(url);
                        rendered += 1;
                    }
                }
                Err(err) => {
                    tracing::warn!(
                        file_id = %id,
                        filename = %source.filename,
                        error = %err,
                        "Failed to render preview"
                    );
                }
            }
        }
        rendered
    }

    /// Move a file to `Validating` under the lock, so a run and a retry can
    /// never start the same file twice. `Error` files pass through `Retry`
    /// first; `Pending` files are only accepted when `allow_pending` is set.
    async fn begin(
        &self,
        id: Uuid,
        allow_pending: bool,
    ) -> Result<(SourceFile, SharedSettings, FileState), SessionError> {
        let mut state = self.state.lock().await;
        let settings = state.settings.clone();
        let file = state.file_mut(id).ok_or(SessionError::NotFound(id))?;

        let status = file.status();
        let not_runnable = || SessionError::NotRunnable { id, status };

        if status == UploadStatus::Error {
            let reset = file.state.apply(Transition::Retry).map_err(|_| not_runnable())?;
            file.state = reset;
            let _ = self.events.send(FileEvent::new(id, &file.state));
        } else if !(allow_pending && status == UploadStatus::Pending) {
            return Err(not_runnable());
        }

        let started = file.state.apply(Transition::Begin).map_err(|_| not_runnable())?;
        file.state = started.clone();
        let _ = self.events.send(FileEvent::new(id, &started));

        Ok((file.source.clone(), settings, started))
    }
}

#[async_trait]
impl ProgressSink for BatchSession {
    async fn record(&self, file_id: Uuid, state: &FileState) {
        {
            let mut session = self.state.lock().await;
            if let Some(file) = session.file_mut(file_id) {
                file.state = state.clone();
            }
        }
        // No subscribers is fine
        let _ = self.events.send(FileEvent::new(file_id, state));
    }
}
