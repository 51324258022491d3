use anyhow::Context;
use folio_processing::{PhotoValidator, Rejection, RejectionReason, SourceFile};
use std::path::{Path, PathBuf};

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Content type declared for a local file, from its extension.
pub fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        _ => "application/octet-stream",
    }
}

/// Read a local file into an upload source.
pub fn read_source(path: &Path) -> anyhow::Result<SourceFile> {
    let data =
        std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Invalid file name: {}", path.display()))?;

    Ok(SourceFile::new(filename, content_type_for(path), data))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Load the files worth admitting. Type and size are checked from the path
/// and metadata before any bytes are read; files that fail those checks or
/// cannot be read come back as rejections instead of aborting the batch.
pub fn collect_sources(
    paths: &[PathBuf],
    validator: &PhotoValidator,
) -> (Vec<SourceFile>, Vec<Rejection>) {
    let mut sources = Vec::new();
    let mut rejected = Vec::new();

    for path in paths {
        let filename = display_name(path);
        let loaded = std::fs::metadata(path)
            .with_context(|| format!("Failed to stat file: {}", path.display()))
            .and_then(|meta| {
                let valid = validator
                    .validate_type(&filename, content_type_for(path))
                    .and_then(|_| validator.validate_file_size(meta.len() as usize));
                match valid {
                    Ok(()) => read_source(path).map(Ok),
                    Err(err) => Ok(Err(err)),
                }
            });

        let reason = match loaded {
            Ok(Ok(source)) => {
                sources.push(source);
                continue;
            }
            Ok(Err(err)) => RejectionReason::from(&err),
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "Skipping unreadable file"
                );
                RejectionReason::Unreadable
            }
        };
        rejected.push(Rejection { filename, reason });
    }

    (sources, rejected)
}

/// One line per file that was not admitted.
pub fn format_rejection(rejection: &Rejection) -> String {
    format!(
        "{}: {}",
        truncate_string(&rejection.filename, 60),
        rejection.reason
    )
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
