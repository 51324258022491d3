use folio_core::UploadConfig;
use std::path::Path;

/// Reasons a file is refused before it ever enters a batch
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Unsupported file type: {filename} ({content_type})")]
    UnsupportedType {
        filename: String,
        content_type: String,
    },

    #[error("Empty file")]
    EmptyFile,

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },
}

/// Photo admission validator
///
/// A file passes the type check when EITHER its declared content type OR its
/// extension is on the allow-list. Browsers and file pickers disagree on
/// content types for JPEGs, so neither signal alone is required.
#[derive(Debug, Clone)]
pub struct PhotoValidator {
    max_file_size: usize,
    allowed_extensions: Vec<String>,
    allowed_content_types: Vec<String>,
}

impl PhotoValidator {
    pub fn new(
        max_file_size: usize,
        allowed_extensions: Vec<String>,
        allowed_content_types: Vec<String>,
    ) -> Self {
        Self {
            max_file_size,
            allowed_extensions: allowed_extensions
                .into_iter()
                .map(|e| e.to_lowercase())
                .collect(),
            allowed_content_types: allowed_content_types
                .into_iter()
                .map(|c| c.to_lowercase())
                .collect(),
        }
    }

    pub fn from_config(config: &UploadConfig) -> Self {
        Self::new(
            config.max_file_size_bytes,
            config.allowed_extensions.clone(),
            config.allowed_content_types.clone(),
        )
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    /// Validate file size
    pub fn validate_file_size(&self, size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Validate the declared content type or, failing that, the extension
    pub fn validate_type(&self, filename: &str, content_type: &str) -> Result<(), ValidationError> {
        let normalized = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        if self.allowed_content_types.iter().any(|ct| ct == &normalized) {
            return Ok(());
        }

        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());
        if let Some(extension) = extension {
            if self.allowed_extensions.contains(&extension) {
                return Ok(());
            }
        }

        Err(ValidationError::UnsupportedType {
            filename: filename.to_string(),
            content_type: content_type.to_string(),
        })
    }

    /// Type first, then size
    pub fn validate_all(
        &self,
        filename: &str,
        content_type: &str,
        file_size: usize,
    ) -> Result<(), ValidationError> {
        self.validate_type(filename, content_type)?;
        self.validate_file_size(file_size)?;
        Ok(())
    }
}

impl Default for PhotoValidator {
    fn default() -> Self {
        Self::from_config(&UploadConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_validator() -> PhotoValidator {
        PhotoValidator::new(
            1024 * 1024, // 1MB
            vec!["jpg".to_string(), "JPEG".to_string()],
            vec!["image/jpeg".to_string()],
        )
    }

    #[test]
    fn test_validate_file_size_ok() {
        let validator = test_validator();
        assert!(validator.validate_file_size(512 * 1024).is_ok());
        assert!(validator.validate_file_size(1024 * 1024).is_ok());
    }

    #[test]
    fn test_validate_file_size_too_large() {
        let validator = test_validator();
        assert_eq!(
            validator.validate_file_size(1024 * 1024 + 1),
            Err(ValidationError::FileTooLarge {
                size: 1024 * 1024 + 1,
                max: 1024 * 1024
            })
        );
    }

    #[test]
    fn test_validate_file_size_empty() {
        let validator = test_validator();
        assert_eq!(
            validator.validate_file_size(0),
            Err(ValidationError::EmptyFile)
        );
    }

    #[test]
    fn test_content_type_alone_is_enough() {
        let validator = test_validator();
        assert!(validator.validate_type("camera_export", "image/jpeg").is_ok());
        assert!(validator.validate_type("photo.bin", "IMAGE/JPEG").is_ok());
        assert!(validator
            .validate_type("photo", "image/jpeg; charset=binary")
            .is_ok());
    }

    #[test]
    fn test_extension_alone_is_enough() {
        let validator = test_validator();
        assert!(validator
            .validate_type("IMG_1.JPG", "application/octet-stream")
            .is_ok());
        assert!(validator.validate_type("IMG_1.jpeg", "").is_ok());
    }

    #[test]
    fn test_validate_type_rejects_other_images() {
        let validator = test_validator();
        assert!(matches!(
            validator.validate_type("scan.png", "image/png"),
            Err(ValidationError::UnsupportedType { .. })
        ));
        assert!(validator.validate_type("noextension", "").is_err());
    }

    #[test]
    fn test_validate_all_checks_type_before_size() {
        let validator = test_validator();
        assert!(validator
            .validate_all("test.jpg", "image/jpeg", 512 * 1024)
            .is_ok());
        assert!(matches!(
            validator.validate_all("clip.mp4", "video/mp4", 0),
            Err(ValidationError::UnsupportedType { .. })
        ));
        assert_eq!(
            validator.validate_all("test.jpg", "image/jpeg", 0),
            Err(ValidationError::EmptyFile)
        );
    }

    #[test]
    fn test_default_uses_config_limits() {
        let validator = PhotoValidator::default();
        assert_eq!(validator.max_file_size(), 50 * 1024 * 1024);
        assert!(validator.validate_type("a.jpg", "").is_ok());
    }
}
