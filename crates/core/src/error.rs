//! Domain errors. The `Display` text is what the user sees.

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Rejected before any request is issued.
    #[error("{0}")]
    Validation(String),

    #[error("Invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("{0}")]
    UnexpectedResponse(String),
}
