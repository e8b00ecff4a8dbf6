//! Errors from the backend API layer.

use sheetport_core::error::CoreError;

/// Errors from talking to the import/query backend.
///
/// The `Display` text of every variant is the message shown to the user.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("{message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message from the JSON error body, or a synthesised fallback.
        message: String,
    },

    /// The response could not be turned into a usable value.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ApiError {
    /// HTTP status of a [`ApiError::Status`] error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Request(e) => e.status().map(|s| s.as_u16()),
            ApiError::Core(_) => None,
        }
    }
}

/// Build the user-facing message for a failed response.
///
/// Uses the body's `error` string, then its `detail` string, and falls back
/// to `"<action> failed (HTTP <status>)"` when the body is not JSON or
/// carries neither field.
pub fn error_message(body: &[u8], action: &str, status: u16) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_slice(body).ok();

    parsed
        .as_ref()
        .and_then(|v| {
            ["error", "detail"].iter().find_map(|key| {
                v.get(*key)
                    .and_then(|m| m.as_str())
                    .map(str::trim)
                    .filter(|m| !m.is_empty())
            })
        })
        .map(str::to_string)
        .unwrap_or_else(|| format!("{action} failed (HTTP {status})"))
}
