//! Upload checks that run before anything is sent.

use std::path::Path;

use super::error::ValidationError;

pub const MAX_UPLOAD_BYTES: u64 = 200 * 1024 * 1024;
pub const SUPPORTED_EXTENSIONS: [&str; 2] = ["mp4", "mov"];

/// MIME type for a supported video extension.
pub fn mime_type_for_extension(ext: &str) -> Option<&'static str> {
    match ext {
        "mp4" => Some("video/mp4"),
        "mov" => Some("video/quicktime"),
        _ => None,
    }
}

/// Check a file on disk and return its size.
pub fn validate_video(path: &Path) -> Result<u64, ValidationError> {
    let metadata =
        std::fs::metadata(path).map_err(|_| ValidationError::NotFound(path.to_path_buf()))?;
    if !metadata.is_file() {
        return Err(ValidationError::NotFound(path.to_path_buf()));
    }
    check_constraints(&extension_of(path), metadata.len())?;
    Ok(metadata.len())
}

/// Extension and size rules, independent of the filesystem.
pub fn check_constraints(ext: &str, size: u64) -> Result<(), ValidationError> {
    let ext = ext.to_lowercase();
    if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(ValidationError::UnsupportedFormat(ext));
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(ValidationError::TooLarge {
            size,
            limit: MAX_UPLOAD_BYTES,
        });
    }
    Ok(())
}

pub(crate) fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}
