//! File-based import and export of songs.

use crate::error::AppError;
use crate::models::song::Composition;
use crate::render::render_plain;
use crate::serialization::{from_json_str, to_exported};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;

/// Write the export document (persisted shape stamped with `exported_at`).
///
/// # Errors
/// Returns an error if encoding or writing fails.
pub fn export_to_path(
    composition: &Composition,
    path: impl AsRef<Path>,
    exported_at: DateTime<Utc>,
) -> Result<(), AppError> {
    let path = path.as_ref();
    let document = serde_json::to_string_pretty(&to_exported(composition, exported_at))?;
    fs::write(path, document)?;
    tracing::debug!(path = %path.display(), "exported song");
    Ok(())
}

/// Write the plain-text rendering, as copied to the clipboard.
///
/// # Errors
/// Returns an error if writing fails.
pub fn export_text_to_path(composition: &Composition, path: impl AsRef<Path>) -> Result<(), AppError> {
    fs::write(path, render_plain(composition))?;
    Ok(())
}

/// Read and parse an exported (or saved) song document.
///
/// # Errors
/// [`AppError::Io`] when the file cannot be read, [`AppError::MalformedInput`]
/// when its content is not a song document.
pub fn import_from_path(path: impl AsRef<Path>) -> Result<Composition, AppError> {
    let raw = fs::read_to_string(path.as_ref())?;
    from_json_str(&raw)
}
