//! Result of the one-shot pivot transform.

use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;

/// File name used when the backend does not name the pivot workbook.
pub const DEFAULT_PIVOT_FILENAME: &str = "pivot.xlsx";

/// A pivot workbook returned by `POST /cr-ponds/pivot`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PivotFile {
    /// Sanitised file name, safe to join onto a directory.
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl PivotFile {
    pub fn new(filename: Option<String>, bytes: Vec<u8>) -> Self {
        let filename = filename
            .as_deref()
            .and_then(sanitize_filename)
            .unwrap_or_else(|| DEFAULT_PIVOT_FILENAME.to_string());
        Self { filename, bytes }
    }

    /// Write the workbook into `dir`, returning the written path.
    pub async fn save_into(&self, dir: &Path) -> std::io::Result<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(&self.filename);
        tokio::fs::write(&path, &self.bytes).await?;
        Ok(path)
    }
}

/// Extract the file name from a `Content-Disposition` header value.
///
/// Prefers the RFC 5987 `filename*=UTF-8''...` form over plain
/// `filename=...`.
pub fn filename_from_disposition(header: &str) -> Option<String> {
    let params: Vec<(String, &str)> = header
        .split(';')
        .skip(1)
        .filter_map(|p| {
            let (key, value) = p.split_once('=')?;
            Some((key.trim().to_ascii_lowercase(), value.trim()))
        })
        .collect();

    let extended = params
        .iter()
        .find(|(k, _)| k == "filename*")
        .and_then(|(_, v)| {
            let (charset, rest) = v.split_once('\'')?;
            let (_lang, encoded) = rest.split_once('\'')?;
            if !charset.eq_ignore_ascii_case("utf-8") {
                return None;
            }
            let encoded = encoded.trim_matches('"');
            Some(percent_decode_str(encoded).decode_utf8_lossy().into_owned())
        });

    extended.or_else(|| {
        params
            .iter()
            .find(|(k, _)| k == "filename")
            .map(|(_, v)| v.trim_matches('"').to_string())
    })
}

/// Keep only the final path component; reject names that would escape
/// the target directory.
fn sanitize_filename(raw: &str) -> Option<String> {
    let name = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    match name {
        "" | "." | ".." => None,
        n => Some(n.to_string()),
    }
}
