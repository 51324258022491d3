//! Image processor - header inspection and full decode

use crate::error::ResizeError;
use image::{DynamicImage, ImageError, ImageReader, Limits};
use std::io::Cursor;

pub struct ImageProcessor;

impl ImageProcessor {
    /// Native pixel dimensions, read from the header without decoding pixels.
    pub fn read_dimensions(data: &[u8]) -> Result<(u32, u32), ResizeError> {
        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| ResizeError::Decode(e.to_string()))?;
        let (width, height) = reader.into_dimensions()?;

        if width == 0 || height == 0 {
            return Err(ResizeError::Surface { width, height });
        }
        Ok((width, height))
    }

    /// Decode the full image, allowing the decoder at most `max_alloc` bytes.
    /// `dimensions` are only used to describe an allocation failure.
    pub fn decode(
        data: &[u8],
        dimensions: (u32, u32),
        max_alloc: u64,
    ) -> Result<DynamicImage, ResizeError> {
        let mut reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| ResizeError::Decode(e.to_string()))?;
        let mut limits = Limits::no_limits();
        limits.max_alloc = Some(max_alloc);
        reader.limits(limits);

        reader.decode().map_err(|e| match e {
            ImageError::Limits(_) => ResizeError::Surface {
                width: dimensions.0,
                height: dimensions.1,
            },
            other => ResizeError::Decode(other.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::jpeg_fixture;
    use image::GenericImageView;

    #[test]
    fn test_read_dimensions() {
        let data = jpeg_fixture(120, 80);
        assert_eq!(ImageProcessor::read_dimensions(&data), Ok((120, 80)));
    }

    #[test]
    fn test_read_dimensions_invalid() {
        let result = ImageProcessor::read_dimensions(b"not an image");
        assert!(matches!(result, Err(ResizeError::Decode(_))));
    }

    #[test]
    fn test_decode() {
        let data = jpeg_fixture(40, 30);
        let img = ImageProcessor::decode(&data, (40, 30), 1 << 20).unwrap();
        assert_eq!(img.dimensions(), (40, 30));
    }

    #[test]
    fn test_decode_invalid() {
        let result = ImageProcessor::decode(b"not an image", (1, 1), 1 << 20);
        assert!(matches!(result, Err(ResizeError::Decode(_))));
    }

    #[test]
    fn test_decode_over_budget() {
        let data = jpeg_fixture(200, 100);
        let result = ImageProcessor::decode(&data, (200, 100), 1024);
        assert_eq!(
            result.unwrap_err(),
            ResizeError::Surface {
                width: 200,
                height: 100
            }
        );
    }
}
