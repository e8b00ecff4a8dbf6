//! Query sources, input validation, and the paging state of a query run.
//!
//! [`ResultSet`] holds everything a result view renders: the columns, the
//! rows accumulated so far, which page comes next and whether another page
//! is believed to exist. The async runner in `sheetport-client` drives it.

use crate::error::CoreError;
use crate::models::QueryPage;
use crate::types::{Row, SavedQueryId};

/// Rows per page for ad-hoc and saved-query execution.
pub const DEFAULT_PAGE_SIZE: u64 = 100;

/// Example statement shown in a fresh SQL explorer.
pub const DEFAULT_SQL: &str = "select id, row_index, data from staging_rows order by row_index asc";

/// Offset of page `page` (0-based) for a given page size.
pub fn page_offset(page: u64, limit: u64) -> u64 {
    page * limit
}

// ---------------------------------------------------------------------------
// Sources and validation
// ---------------------------------------------------------------------------

/// What a query run executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuerySource {
    /// Ad-hoc SQL text sent to `POST /query/sql`.
    Sql(String),
    /// A saved query executed through `POST /queries/{id}/run`.
    Saved(SavedQueryId),
}

impl std::fmt::Display for QuerySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuerySource::Sql(_) => f.write_str("ad-hoc sql"),
            QuerySource::Saved(id) => write!(f, "saved query {id}"),
        }
    }
}

/// Whether `sql` looks like a read-only `SELECT` statement.
pub fn is_select(sql: &str) -> bool {
    sql.trim().to_lowercase().starts_with("select")
}

/// Reject anything that is not a `SELECT` before it reaches the backend.
pub fn validate_select(sql: &str) -> Result<(), CoreError> {
    if is_select(sql) {
        Ok(())
    } else {
        Err(CoreError::Validation(
            "only read-only SELECT queries can be run".to_string(),
        ))
    }
}

/// Validate and trim the name a query is saved under.
pub fn validate_query_name(name: &str) -> Result<&str, CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("query name is required".to_string()));
    }
    Ok(trimmed)
}

// ---------------------------------------------------------------------------
// Result set
// ---------------------------------------------------------------------------

/// Accumulated result of one query run.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    limit: u64,
    columns: Vec<String>,
    rows: Vec<Row>,
    next_page: u64,
    has_more: bool,
    loading: bool,
    error: Option<String>,
}

impl ResultSet {
    pub fn new(limit: u64) -> Self {
        Self {
            limit: limit.max(1),
            columns: Vec::new(),
            rows: Vec::new(),
            next_page: 0,
            has_more: true,
            loading: false,
            error: None,
        }
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// 0-based index of the page the next fetch should request.
    pub fn next_page(&self) -> u64 {
        self.next_page
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Every page has been fetched and at least one row was returned.
    pub fn is_exhausted(&self) -> bool {
        !self.has_more && self.error.is_none() && !self.rows.is_empty()
    }

    /// Forget everything from a previous run.
    pub fn reset(&mut self) {
        self.columns.clear();
        self.rows.clear();
        self.next_page = 0;
        self.has_more = true;
        self.loading = false;
        self.error = None;
    }

    /// Whether a proximity trigger should fetch another page now.
    pub fn should_fetch_next(&self) -> bool {
        !self.loading && self.has_more
    }

    /// Mark the start of a page fetch; returns the `(page, offset)` to request.
    pub fn begin_fetch(&mut self) -> (u64, u64) {
        self.loading = true;
        (self.next_page, page_offset(self.next_page, self.limit))
    }

    /// Apply a fetched page.
    ///
    /// Page 0 replaces columns and rows; later pages only append rows. "More
    /// pages" is decided only by whether the page came back full.
    pub fn apply_page(&mut self, page: u64, result: QueryPage) {
        let received = result.items.len() as u64;

        if page == 0 {
            self.columns = result.columns;
            self.rows = result.items;
        } else {
            self.rows.extend(result.items);
        }

        self.has_more = received == self.limit;
        self.next_page = page + 1;
        self.loading = false;
    }

    /// Record a failed fetch; rows already loaded stay visible.
    pub fn apply_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.has_more = false;
        self.loading = false;
    }
}
