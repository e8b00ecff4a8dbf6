/// Saved queries are keyed by the backend's BIGSERIAL primary key.
pub type SavedQueryId = i64;

/// Import jobs are keyed by an opaque, backend-assigned string.
pub type JobId = String;

/// A query result row: column name to JSON value.
pub type Row = serde_json::Map<String, serde_json::Value>;
