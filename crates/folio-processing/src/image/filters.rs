use image::{imageops, ImageBuffer, Luma, RgbImage};

/// Sharpening is skipped below this blur radius.
const MIN_RADIUS: f32 = 0.5;
/// Wider radii produce halos on small outputs.
const MAX_RADIUS: f32 = 2.0;

/// Unsharp-mask parameters.
///
/// - `amount`: strength in percent (80 = add 80% of the local contrast back)
/// - `radius`: standard deviation of the Gaussian blur, in pixels
/// - `threshold`: minimum lightness difference (0-255) before a pixel is touched,
///   so flat areas with sensor noise are left alone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnsharpMask {
    pub amount: f32,
    pub radius: f32,
    pub threshold: u8,
}

impl UnsharpMask {
    pub fn new(amount: f32, radius: f32, threshold: u8) -> Self {
        Self {
            amount,
            radius,
            threshold,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.amount > 0.0 && self.radius >= MIN_RADIUS
    }

    /// Sharpen in place.
    ///
    /// Works on lightness (max of R, G, B) and rescales each RGB triplet by the
    /// corrected lightness, so edges gain contrast without shifting hue.
    pub fn apply(&self, img: &mut RgbImage) {
        if !self.is_enabled() {
            return;
        }

        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return;
        }

        // Lightness normalized to 0.0-1.0, the range `imageops` keeps float pixels in
        let lightness: ImageBuffer<Luma<f32>, Vec<f32>> =
            ImageBuffer::from_fn(width, height, |x, y| {
                let p = img.get_pixel(x, y).0;
                Luma([p[0].max(p[1]).max(p[2]) as f32 / 255.0])
            });
        let blurred = imageops::blur(&lightness, self.radius.min(MAX_RADIUS));

        let amount = self.amount / 100.0;
        let threshold = self.threshold as f32 / 255.0;

        for (x, y, pixel) in img.enumerate_pixels_mut() {
            let original = lightness.get_pixel(x, y).0[0];
            let diff = original - blurred.get_pixel(x, y).0[0];
            if diff.abs() < threshold || original <= 0.0 {
                continue;
            }

            let corrected = (original + amount * diff).clamp(0.0, 1.0);
            let ratio = corrected / original;
            for channel in pixel.0.iter_mut() {
                *channel = (*channel as f32 * ratio).round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}
