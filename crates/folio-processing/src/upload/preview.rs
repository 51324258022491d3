//! Inline previews for the pending-file list.

use base64::{engine::general_purpose::STANDARD, Engine as _};

/// `data:` URL for an encoded JPEG.
pub fn jpeg_data_url(data: &[u8]) -> String {
    format!("data:image/jpeg;base64,{}", STANDARD.encode(data))
}
