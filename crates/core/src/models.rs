//! Wire models for the import/query backend.
//!
//! Every field the backend may omit carries `#[serde(default)]`: a missing
//! or partial body is treated as "no data" rather than a decode failure.

use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{JobId, Row, SavedQueryId};

// ---------------------------------------------------------------------------
// Imports
// ---------------------------------------------------------------------------

/// Body of `POST /imports/excel`.
///
/// The backend answers either with `job_ids` or with a single `job_id`;
/// see [`JobIdSet::from_submit`](crate::job::JobIdSet::from_submit).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitResponse {
    #[serde(default)]
    pub job_ids: Option<Vec<JobId>>,
    #[serde(default)]
    pub job_id: Option<JobId>,
}

/// Status snapshot of one import job, as returned by `GET /imports/{id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobStatus {
    pub id: JobId,
    /// `None` when the backend did not report a status.
    pub status: Option<String>,
    pub processed_rows: u64,
    pub total_rows: u64,
    pub filename: Option<String>,
    pub error_message: Option<String>,
}

impl JobStatus {
    /// Read a status body leniently.
    ///
    /// Non-numeric counters become `0` and non-string text fields become
    /// `None`, so a half-populated job never aborts a poll cycle.
    pub fn from_value(id: &str, body: &serde_json::Value) -> Self {
        let text = |key: &str| body.get(key).and_then(|v| v.as_str()).map(str::to_string);
        let count = |key: &str| body.get(key).and_then(|v| v.as_u64()).unwrap_or(0);

        Self {
            id: id.to_string(),
            status: text("status"),
            processed_rows: count("processed_rows"),
            total_rows: count("total_rows"),
            filename: text("filename"),
            error_message: text("error_message"),
        }
    }
}

/// An import job as listed by `GET /imports` and `GET /imports/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportJob {
    #[serde(default)]
    pub id: JobId,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub total_rows: u64,
    #[serde(default)]
    pub processed_rows: u64,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// A staged row of an import, as listed by `GET /imports/{id}/rows`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportRow {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub import_id: JobId,
    #[serde(default)]
    pub row_index: i64,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub created_at: Option<String>,
}

// ---------------------------------------------------------------------------
// Saved queries
// ---------------------------------------------------------------------------

/// A saved query owned by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedQuery {
    #[serde(default)]
    pub id: SavedQueryId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sql: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Body of `POST /queries` and `PUT /queries/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct SavedQueryPayload<'a> {
    pub name: &'a str,
    pub sql: &'a str,
}

/// Locally edited copy of a saved query while its detail view is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedQueryDraft {
    pub id: SavedQueryId,
    pub name: String,
    pub sql: String,
}

impl From<SavedQuery> for SavedQueryDraft {
    fn from(query: SavedQuery) -> Self {
        Self {
            id: query.id,
            name: query.name,
            sql: query.sql,
        }
    }
}

// ---------------------------------------------------------------------------
// Listings and result pages
// ---------------------------------------------------------------------------

/// `{ items, total }` envelope of the offset-paginated list endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Listing<T> {
    #[serde(default = "Vec::new", deserialize_with = "null_as_default")]
    pub items: Vec<T>,
    #[serde(default)]
    pub total: u64,
}

impl<T> Default for Listing<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }
}

/// Body of the two query-run endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct RunPageRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<&'a str>,
    pub limit: u64,
    pub offset: u64,
}

/// One page of query results.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QueryPage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub columns: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<Row>,
    #[serde(default)]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

/// Treat an explicit `null` like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
