//! Validation of a file selection before it is submitted for import.

use std::path::Path;

use crate::error::CoreError;

/// Spreadsheet extensions the import endpoint is meant for.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["xlsx", "xls"];

/// Message shown when a submission is attempted with no files.
pub const EMPTY_SELECTION_MESSAGE: &str = "Select at least one Excel file (.xlsx/.xls).";

/// Reject an empty selection before any request is issued.
pub fn validate_selection<P: AsRef<Path>>(files: &[P]) -> Result<(), CoreError> {
    if files.is_empty() {
        return Err(CoreError::Validation(EMPTY_SELECTION_MESSAGE.to_string()));
    }
    Ok(())
}

/// Whether `path` carries one of [`ACCEPTED_EXTENSIONS`] (case-insensitive).
pub fn has_accepted_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .is_some_and(|e| ACCEPTED_EXTENSIONS.contains(&e.as_str()))
}

/// File name sent with a multipart part; falls back to `upload`.
pub fn upload_file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or("upload")
        .to_string()
}
