use bytes::Bytes;
use image::imageops::{self, FilterType};
use std::sync::Arc;

use crate::compression::{JpegCompressor, JpegQuality};
use crate::error::ResizeError;
use crate::image::filters::UnsharpMask;
use crate::image::processor::ImageProcessor;

/// Largest edge the resampler decodes into before pre-scaling.
pub const DEFAULT_MAX_CANVAS_DIMENSION: u32 = 8192;

/// Ceiling on the decoded pixel buffer of one source.
pub const DEFAULT_MAX_DECODE_BYTES: u64 = 1024 * 1024 * 1024;

/// Decoder scratch space on top of the RGB buffer itself.
const DECODE_HEADROOM_BYTES: u64 = 64 * 1024 * 1024;

/// Resize request: longest output edge, JPEG quality and sharpening.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeOptions {
    pub max_dimension: u32,
    /// 0.0–1.0
    pub quality: f32,
    pub unsharp_amount: f32,
    pub unsharp_radius: f32,
    pub unsharp_threshold: u8,
}

impl ResizeOptions {
    pub fn unsharp_mask(&self) -> UnsharpMask {
        UnsharpMask::new(
            self.unsharp_amount,
            self.unsharp_radius,
            self.unsharp_threshold,
        )
    }

    pub fn jpeg_quality(&self) -> JpegQuality {
        JpegQuality::new(self.quality)
    }
}

/// Encoded output of one resize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeOutcome {
    pub data: Bytes,
    pub width: u32,
    pub height: u32,
    pub filename: String,
}

/// Scale `(width, height)` so the longer edge is at most `max`, keeping the
/// aspect ratio. Sizes that already fit are returned unchanged.
pub fn fit_within(width: u32, height: u32, max: u32) -> (u32, u32) {
    if width <= max && height <= max {
        return (width, height);
    }

    let max = max.max(1);
    if width >= height {
        let h = (height as f64 * max as f64 / width as f64).round() as u32;
        (max, h.max(1))
    } else {
        let w = (width as f64 * max as f64 / height as f64).round() as u32;
        (w.max(1), max)
    }
}

/// High-quality JPEG downscaler: Lanczos3 resampling followed by an unsharp mask.
#[derive(Debug, Clone)]
pub struct Resampler {
    max_canvas_dimension: u32,
    max_decode_bytes: u64,
}

impl Default for Resampler {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CANVAS_DIMENSION)
    }
}

impl Resampler {
    pub fn new(max_canvas_dimension: u32) -> Self {
        Self {
            max_canvas_dimension: max_canvas_dimension.max(1),
            max_decode_bytes: DEFAULT_MAX_DECODE_BYTES,
        }
    }

    pub fn with_max_decode_bytes(mut self, max_decode_bytes: u64) -> Self {
        self.max_decode_bytes = max_decode_bytes.max(1);
        self
    }

    pub fn max_canvas_dimension(&self) -> u32 {
        self.max_canvas_dimension
    }

    pub fn max_decode_bytes(&self) -> u64 {
        self.max_decode_bytes
    }

    /// Allocation allowed for decoding a `width` x `height` source: its RGB
    /// buffer plus headroom, never above the configured ceiling. `None` when
    /// the pixels alone exceed the ceiling.
    pub fn decode_budget(&self, width: u32, height: u32) -> Option<u64> {
        let pixels = u64::from(width) * u64::from(height) * 3;
        if pixels > self.max_decode_bytes {
            return None;
        }
        Some((pixels + DECODE_HEADROOM_BYTES).min(self.max_decode_bytes))
    }

    /// Resize an encoded image. CPU-bound; callers on an async runtime should
    /// run it on the blocking pool.
    ///
    /// 1. Sources larger than the working canvas are pre-scaled to fit it
    /// 2. The longer edge is scaled down to `max_dimension` with Lanczos3
    /// 3. The unsharp mask restores edge contrast lost in resampling
    /// 4. The result is re-encoded as JPEG
    ///
    /// A source that already fits is returned byte-for-byte without decoding.
    pub fn resize(
        &self,
        data: &Bytes,
        filename: &str,
        options: &ResizeOptions,
    ) -> Result<ResizeOutcome, ResizeError> {
        let (src_width, src_height) = ImageProcessor::read_dimensions(data)?;

        let canvas = fit_within(src_width, src_height, self.max_canvas_dimension);
        let clamped = canvas != (src_width, src_height);
        let target = fit_within(canvas.0, canvas.1, options.max_dimension);

        if !clamped && target == (src_width, src_height) {
            tracing::debug!(
                filename = %filename,
                width = src_width,
                height = src_height,
                "Source fits, skipping resize"
            );
            return Ok(ResizeOutcome {
                data: data.clone(),
                width: src_width,
                height: src_height,
                filename: filename.to_string(),
            });
        }

        let budget = self
            .decode_budget(src_width, src_height)
            .ok_or(ResizeError::Surface {
                width: src_width,
                height: src_height,
            })?;
        let img = ImageProcessor::decode(data, (src_width, src_height), budget)?;
        let mut rgb = img.into_rgb8();

        if clamped {
            tracing::debug!(
                filename = %filename,
                from_width = src_width,
                from_height = src_height,
                to_width = canvas.0,
                to_height = canvas.1,
                "Clamping source to working canvas"
            );
            rgb = imageops::resize(&rgb, canvas.0, canvas.1, FilterType::Triangle);
        }

        if target != canvas {
            rgb = imageops::resize(&rgb, target.0, target.1, FilterType::Lanczos3);
            options.unsharp_mask().apply(&mut rgb);
        }

        let encoded = JpegCompressor::compress(&rgb, options.jpeg_quality())
            .map_err(|e| ResizeError::Encode(e.to_string()))?;

        tracing::debug!(
            filename = %filename,
            width = target.0,
            height = target.1,
            bytes = encoded.len(),
            "Resized image"
        );

        Ok(ResizeOutcome {
            data: encoded,
            width: target.0,
            height: target.1,
            filename: filename.to_string(),
        })
    }

    /// [`resize`](Self::resize) on the blocking pool.
    pub async fn resize_async(
        self: Arc<Self>,
        data: Bytes,
        filename: String,
        options: ResizeOptions,
    ) -> Result<ResizeOutcome, ResizeError> {
        tokio::task::spawn_blocking(move || self.resize(&data, &filename, &options)).await?
    }
}
