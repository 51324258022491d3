use bytes::Bytes;
use image::RgbImage;
use std::io;

/// Lossy JPEG quality on the continuous 0.0–1.0 scale used by the presets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JpegQuality(f32);

impl JpegQuality {
    /// Clamps to 0.0–1.0; NaN falls back to the default.
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self::default();
        }
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Get quality value for the encoder (1-100)
    pub fn encoder_quality(self) -> u8 {
        ((self.0 * 100.0).round() as u8).max(1)
    }
}

impl Default for JpegQuality {
    fn default() -> Self {
        Self(0.9)
    }
}

/// JPEG encoder backed by mozjpeg
pub struct JpegCompressor;

impl JpegCompressor {
    /// Encode an RGB buffer to a baseline JPEG.
    pub fn compress(img: &RgbImage, quality: JpegQuality) -> io::Result<Bytes> {
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "cannot encode an empty image",
            ));
        }

        let mut comp = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
        // The default profile writes progressive scans
        comp.set_fastest_defaults();
        comp.set_size(width as usize, height as usize);
        comp.set_quality(quality.encoder_quality() as f32);
        comp.set_optimize_coding(true);

        let mut comp = comp.start_compress(Vec::new())?;
        comp.write_scanlines(img.as_raw())?;
        let jpeg_data = comp.finish()?;

        tracing::trace!(
            width = width,
            height = height,
            quality = quality.encoder_quality(),
            bytes = jpeg_data.len(),
            "Encoded JPEG"
        );

        Ok(Bytes::from(jpeg_data))
    }
}
