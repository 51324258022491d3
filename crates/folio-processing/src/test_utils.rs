//! Shared helpers for tests: fixture images and in-memory collaborators.

use async_trait::async_trait;
use bytes::Bytes;
use folio_core::{
    ImageBlob, PhotoFormFields, PhotoRecord, PhotoSubmitter, QuotaSource, SubmitError,
    UploadStatus, Usage,
};
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::Barrier;
use uuid::Uuid;

use crate::error::ResizeError;
use crate::image::{fit_within, ResizeOutcome};
use crate::upload::state::FileState;
use crate::upload::traits::{ProgressSink, VariantProcessor};
use crate::upload::types::SourceFile;

/// Encode a gradient of the given size as a JPEG.
pub fn jpeg_fixture(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
        ])
    });

    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, 90)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .expect("Failed to encode test JPEG");
    out
}

/// Tracks how many callers are inside a section at once.
#[derive(Default)]
struct ConcurrencyProbe {
    active: AtomicUsize,
    max: AtomicUsize,
}

impl ConcurrencyProbe {
    fn enter(&self) {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }

    fn max(&self) -> usize {
        self.max.load(Ordering::SeqCst)
    }
}

/// Image work without decoding: every source reports the same dimensions.
pub struct FakeVariants {
    width: u32,
    height: u32,
    broken: HashSet<String>,
    unencodable: HashSet<String>,
    overlap: Option<Barrier>,
    probe: ConcurrencyProbe,
}

impl FakeVariants {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            broken: HashSet::new(),
            unencodable: HashSet::new(),
            overlap: None,
            probe: ConcurrencyProbe::default(),
        }
    }

    /// Fail to read `filename` as if it were corrupt.
    pub fn fail_on(mut self, filename: &str) -> Self {
        self.broken.insert(filename.to_string());
        self
    }

    /// Read `filename` fine but fail to encode its preview.
    pub fn fail_preview_on(mut self, filename: &str) -> Self {
        self.unencodable.insert(filename.to_string());
        self
    }

    /// Each derivation waits for the other one; fails if they never overlap.
    pub fn require_concurrent_derivation(mut self) -> Self {
        self.overlap = Some(Barrier::new(2));
        self
    }

    pub fn max_concurrent_derivations(&self) -> usize {
        self.probe.max()
    }

    async fn derive(&self, source: &SourceFile, max: u32) -> Result<ResizeOutcome, ResizeError> {
        self.probe.enter();
        let waited = match &self.overlap {
            Some(barrier) => tokio::time::timeout(Duration::from_secs(2), barrier.wait())
                .await
                .map(|_| ())
                .map_err(|_| ResizeError::Worker("derivations did not overlap".to_string())),
            None => {
                tokio::task::yield_now().await;
                Ok(())
            }
        };
        self.probe.leave();
        waited?;

        let (width, height) = fit_within(self.width, self.height, max);
        Ok(ResizeOutcome {
            data: Bytes::from_static(&[0xFF, 0xD8, 0xFF, 0xD9]),
            width,
            height,
            filename: source.filename.clone(),
        })
    }
}

#[async_trait]
impl VariantProcessor for FakeVariants {
    async fn read_dimensions(&self, source: &SourceFile) -> Result<(u32, u32), ResizeError> {
        if self.broken.contains(&source.filename) {
            return Err(ResizeError::Decode("unexpected end of file".to_string()));
        }
        Ok((self.width, self.height))
    }

    async fn derive_thumbnail(&self, source: &SourceFile) -> Result<ResizeOutcome, ResizeError> {
        self.derive(source, 400).await
    }

    async fn derive_preview(&self, source: &SourceFile) -> Result<ResizeOutcome, ResizeError> {
        let outcome = self.derive(source, 1200).await?;
        if self.unencodable.contains(&source.filename) {
            return Err(ResizeError::Encode("scanline buffer overflow".to_string()));
        }
        Ok(outcome)
    }
}

#[derive(Debug, Clone)]
pub struct SubmitCall {
    pub fields: PhotoFormFields,
    pub thumbnail_filename: String,
    pub preview_filename: String,
}

struct Rejection {
    error: SubmitError,
    once: bool,
}

/// Records submissions and answers with a fresh record, unless told to reject.
pub struct FakeSubmitter {
    calls: Mutex<Vec<SubmitCall>>,
    rejections: Mutex<HashMap<String, Rejection>>,
    delay: Option<Duration>,
    probe: ConcurrencyProbe,
}

impl FakeSubmitter {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            rejections: Mutex::new(HashMap::new()),
            delay: None,
            probe: ConcurrencyProbe::default(),
        }
    }

    /// Always reject the file uploaded as `filename`.
    pub fn reject(self, filename: &str, error: SubmitError) -> Self {
        self.add_rejection(filename, error, false)
    }

    /// Reject only the first attempt for `filename`.
    pub fn reject_once(self, filename: &str, error: SubmitError) -> Self {
        self.add_rejection(filename, error, true)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn add_rejection(self, filename: &str, error: SubmitError, once: bool) -> Self {
        self.rejections
            .lock()
            .unwrap()
            .insert(filename.to_string(), Rejection { error, once });
        self
    }

    pub fn calls(&self) -> Vec<SubmitCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn max_concurrent(&self) -> usize {
        self.probe.max()
    }
}

#[async_trait]
impl PhotoSubmitter for FakeSubmitter {
    async fn submit_photo(
        &self,
        fields: PhotoFormFields,
        thumbnail: ImageBlob,
        preview: ImageBlob,
    ) -> Result<PhotoRecord, SubmitError> {
        self.calls.lock().unwrap().push(SubmitCall {
            fields: fields.clone(),
            thumbnail_filename: thumbnail.filename.clone(),
            preview_filename: preview.filename.clone(),
        });

        self.probe.enter();
        match self.delay {
            Some(delay) => tokio::time::sleep(delay).await,
            None => tokio::task::yield_now().await,
        }
        self.probe.leave();

        {
            let mut rejections = self.rejections.lock().unwrap();
            if let Some(rejection) = rejections.get(&thumbnail.filename) {
                let error = rejection.error.clone();
                if rejection.once {
                    rejections.remove(&thumbnail.filename);
                }
                return Err(error);
            }
        }

        let id = Uuid::new_v4();
        Ok(PhotoRecord {
            id,
            title: fields.title,
            thumbnail_url: format!("https://cdn.example.com/{}/thumbnail.jpg", id),
            preview_url: format!("https://cdn.example.com/{}/preview.jpg", id),
            category_id: fields.category_id,
            is_published: fields.is_published,
            width: Some(fields.width),
            height: Some(fields.height),
            created_at: None,
        })
    }
}

/// Quota source that counts refreshes.
pub struct FakeQuota {
    usage: Option<Usage>,
    refreshes: AtomicUsize,
}

impl FakeQuota {
    pub fn new(usage: Usage) -> Self {
        Self {
            usage: Some(usage),
            refreshes: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            usage: None,
            refreshes: AtomicUsize::new(0),
        }
    }

    pub fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuotaSource for FakeQuota {
    async fn refresh(&self) -> Result<Usage, SubmitError> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        self.usage
            .ok_or_else(|| SubmitError::Transport("connection refused".to_string()))
    }
}

/// Keeps every state a file passed through.
#[derive(Default)]
pub struct RecordingSink {
    states: Mutex<Vec<(Uuid, FileState)>>,
}

impl RecordingSink {
    pub fn progress(&self, file_id: Uuid) -> Vec<(UploadStatus, u8)> {
        self.states
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| *id == file_id)
            .map(|(_, state)| (state.status, state.progress))
            .collect()
    }

    pub fn last(&self, file_id: Uuid) -> Option<FileState> {
        self.states
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(id, _)| *id == file_id)
            .map(|(_, state)| state.clone())
    }
}

#[async_trait]
impl ProgressSink for RecordingSink {
    async fn record(&self, file_id: Uuid, state: &FileState) {
        self.states.lock().unwrap().push((file_id, state.clone()));
    }
}
