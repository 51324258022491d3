//! Configuration module
//!
//! Limits and processing settings for the batch upload pipeline. Every value
//! can be overridden from the environment (or a `.env` file); the defaults
//! match the hosted backend's account limits.

use std::env;
use std::str::FromStr;

// Common constants
const MAX_FILE_SIZE_MB: usize = 50;
const MAX_BATCH_FILES: usize = 100;
const PHOTO_LIMIT: usize = 200;
const MAX_CANVAS_DIMENSION: u32 = 8192;
const MAX_DECODE_MB: usize = 1024;
const BYTES_PER_MB: usize = 1024 * 1024;

/// Upload pipeline configuration
#[derive(Clone, Debug, PartialEq)]
pub struct UploadConfig {
    /// Per-file ceiling for the original source bytes.
    pub max_file_size_bytes: usize,
    /// Maximum number of files queued in one batch session.
    pub max_batch_files: usize,
    /// Account-wide photo quota, used until the backend reports its own.
    pub photo_limit: usize,
    /// Largest width or height the resampler works on before pre-scaling.
    pub max_canvas_dimension: u32,
    /// Ceiling on the pixel buffer a single source may decode into.
    pub max_decode_bytes: u64,
    pub allowed_extensions: Vec<String>,
    pub allowed_content_types: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: MAX_FILE_SIZE_MB * BYTES_PER_MB,
            max_batch_files: MAX_BATCH_FILES,
            photo_limit: PHOTO_LIMIT,
            max_canvas_dimension: MAX_CANVAS_DIMENSION,
            max_decode_bytes: (MAX_DECODE_MB * BYTES_PER_MB) as u64,
            allowed_extensions: vec!["jpg".to_string(), "jpeg".to_string()],
            allowed_content_types: vec!["image/jpeg".to_string()],
        }
    }
}

impl UploadConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let max_file_size_mb: usize = parse_var("MAX_FILE_SIZE_MB", MAX_FILE_SIZE_MB)?;
        let max_decode_mb: usize = parse_var("MAX_DECODE_MB", MAX_DECODE_MB)?;

        let allowed_extensions = env::var("ALLOWED_EXTENSIONS")
            .unwrap_or_else(|_| "jpg,jpeg".to_string())
            .split(',')
            .map(|s| s.trim().trim_start_matches('.').to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let allowed_content_types = env::var("ALLOWED_CONTENT_TYPES")
            .unwrap_or_else(|_| "image/jpeg".to_string())
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let config = UploadConfig {
            max_file_size_bytes: max_file_size_mb.saturating_mul(BYTES_PER_MB),
            max_batch_files: parse_var("MAX_BATCH_FILES", MAX_BATCH_FILES)?,
            photo_limit: parse_var("PHOTO_LIMIT", PHOTO_LIMIT)?,
            max_canvas_dimension: parse_var("MAX_CANVAS_DIMENSION", MAX_CANVAS_DIMENSION)?,
            max_decode_bytes: max_decode_mb.saturating_mul(BYTES_PER_MB) as u64,
            allowed_extensions,
            allowed_content_types,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }

        if self.max_batch_files == 0 {
            return Err(anyhow::anyhow!("MAX_BATCH_FILES must be greater than 0"));
        }

        if self.max_decode_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_DECODE_MB must be greater than 0"));
        }

        // Both presets must fit inside the working canvas.
        if self.max_canvas_dimension < 1200 {
            return Err(anyhow::anyhow!(
                "MAX_CANVAS_DIMENSION must be at least 1200 pixels"
            ));
        }

        if self.allowed_extensions.is_empty() && self.allowed_content_types.is_empty() {
            return Err(anyhow::anyhow!(
                "ALLOWED_EXTENSIONS and ALLOWED_CONTENT_TYPES cannot both be empty"
            ));
        }

        Ok(())
    }

    pub fn max_file_size_mb(&self) -> usize {
        self.max_file_size_bytes / BYTES_PER_MB
    }
}

/// Read a numeric variable, falling back to `default` only when it is unset.
fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, anyhow::Error> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a valid number", name)),
        Err(_) => Ok(default),
    }
}
