//! REST client for the import/query backend.
//!
//! Wraps every backend endpoint using [`reqwest`]. Non-2xx responses become
//! [`ApiError::Status`] carrying the backend's own message when it sent
//! one; success bodies that are missing or malformed decode as empty values.

use reqwest::header::CONTENT_DISPOSITION;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sheetport_core::api_path::ApiBase;
use sheetport_core::job::JobIdSet;
use sheetport_core::models::{
    ImportJob, ImportRow, JobStatus, Listing, QueryPage, RunPageRequest, SavedQuery,
    SavedQueryPayload, SubmitResponse,
};
use sheetport_core::types::SavedQueryId;

use crate::config::ClientConfig;
use crate::error::{error_message, ApiError};
use crate::pivot::{filename_from_disposition, PivotFile};

/// A file read into memory for a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// Name sent as the part's file name.
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// HTTP client for one backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base: ApiBase,
}

impl ApiClient {
    /// Create a client with a default [`reqwest::Client`].
    pub fn new(base: ApiBase) -> Self {
        Self {
            client: reqwest::Client::new(),
            base,
        }
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base: ApiBase) -> Self {
        Self { client, base }
    }

    /// Create a client honouring the configured request timeout.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_client(builder.build()?, config.api_base.clone()))
    }

    pub fn base(&self) -> &ApiBase {
        &self.base
    }

    // ---- imports ----

    /// Upload spreadsheets as one multipart submission.
    ///
    /// Sends `POST /imports/excel` with one `files` part per file and
    /// returns the normalised set of created job ids.
    pub async fn submit_import(&self, files: Vec<UploadFile>) -> Result<JobIdSet, ApiError> {
        let count = files.len();
        let response = self
            .client
            .post(self.base.endpoint(&["imports", "excel"]))
            .multipart(files_form(files))
            .send()
            .await?;

        let body: SubmitResponse = Self::parse_response(response, "Start import").await?;
        let ids = JobIdSet::from_submit(body)?;
        tracing::info!(files = count, jobs = ids.len(), "Import submitted");
        Ok(ids)
    }

    /// Fetch the current status of one import job (`GET /imports/{id}`).
    pub async fn job_status(&self, id: &str) -> Result<JobStatus, ApiError> {
        let response = self
            .send(Method::GET, &["imports", id], None::<&()>, &[])
            .await?;
        let action = format!("Job status {id}");
        let body: serde_json::Value = Self::parse_response(response, &action).await?;
        Ok(JobStatus::from_value(id, &body))
    }

    /// List import jobs (`GET /imports?limit&offset`).
    pub async fn list_imports(
        &self,
        limit: u64,
        offset: u64,
    ) -> Result<Listing<ImportJob>, ApiError> {
        let response = self
            .send(Method::GET, &["imports"], None::<&()>, &page_query(limit, offset))
            .await?;
        Self::parse_response(response, "Load import list").await
    }

    /// Fetch one import job with its metadata (`GET /imports/{id}`).
    pub async fn get_import(&self, id: &str) -> Result<ImportJob, ApiError> {
        let response = self
            .send(Method::GET, &["imports", id], None::<&()>, &[])
            .await?;
        Self::parse_response(response, "Load import job").await
    }

    /// List the staged rows of one import (`GET /imports/{id}/rows`).
    pub async fn list_import_rows(
        &self,
        id: &str,
        limit: u64,
        offset: u64,
    ) -> Result<Listing<ImportRow>, ApiError> {
        let response = self
            .send(
                Method::GET,
                &["imports", id, "rows"],
                None::<&()>,
                &page_query(limit, offset),
            )
            .await?;
        Self::parse_response(response, "Load rows").await
    }

    // ---- saved queries ----

    /// List saved queries (`GET /queries?limit&offset`).
    pub async fn list_queries(
        &self,
        limit: u64,
        offset: u64,
    ) -> Result<Listing<SavedQuery>, ApiError> {
        let response = self
            .send(Method::GET, &["queries"], None::<&()>, &page_query(limit, offset))
            .await?;
        Self::parse_response(response, "Load query list").await
    }

    /// Fetch one saved query (`GET /queries/{id}`).
    pub async fn get_query(&self, id: SavedQueryId) -> Result<SavedQuery, ApiError> {
        let id = id.to_string();
        let response = self
            .send(Method::GET, &["queries", id.as_str()], None::<&()>, &[])
            .await?;
        Self::parse_response(response, "Load query").await
    }

    /// Save a new query (`POST /queries`).
    pub async fn create_query(&self, name: &str, sql: &str) -> Result<(), ApiError> {
        let payload = SavedQueryPayload { name, sql };
        let response = self
            .send(Method::POST, &["queries"], Some(&payload), &[])
            .await?;
        Self::check_status(response, "Save query").await?;
        tracing::info!(name, "Query saved");
        Ok(())
    }

    /// Overwrite the name and SQL of a saved query (`PUT /queries/{id}`).
    pub async fn update_query(
        &self,
        id: SavedQueryId,
        name: &str,
        sql: &str,
    ) -> Result<(), ApiError> {
        let payload = SavedQueryPayload { name, sql };
        let path_id = id.to_string();
        let response = self
            .send(Method::PUT, &["queries", path_id.as_str()], Some(&payload), &[])
            .await?;
        Self::check_status(response, "Save query").await?;
        tracing::info!(query_id = id, "Query updated");
        Ok(())
    }

    /// Delete a saved query (`DELETE /queries/{id}`).
    pub async fn delete_query(&self, id: SavedQueryId) -> Result<(), ApiError> {
        let path_id = id.to_string();
        let response = self
            .send(Method::DELETE, &["queries", path_id.as_str()], None::<&()>, &[])
            .await?;
        Self::check_status(response, "Delete query").await?;
        tracing::info!(query_id = id, "Query deleted");
        Ok(())
    }

    // ---- query execution ----

    /// Run one page of a saved query (`POST /queries/{id}/run`).
    pub async fn run_saved_query(
        &self,
        id: SavedQueryId,
        limit: u64,
        offset: u64,
    ) -> Result<QueryPage, ApiError> {
        let body = RunPageRequest {
            sql: None,
            limit,
            offset,
        };
        let path_id = id.to_string();
        let response = self
            .send(Method::POST, &["queries", path_id.as_str(), "run"], Some(&body), &[])
            .await?;
        Self::parse_response(response, "Run query").await
    }

    /// Run one page of ad-hoc SQL (`POST /query/sql`).
    pub async fn run_sql(&self, sql: &str, limit: u64, offset: u64) -> Result<QueryPage, ApiError> {
        let body = RunPageRequest {
            sql: Some(sql),
            limit,
            offset,
        };
        let response = self
            .send(Method::POST, &["query", "sql"], Some(&body), &[])
            .await?;
        Self::parse_response(response, "Run query").await
    }

    // ---- pivot ----

    /// Turn uploaded spreadsheets into a pivot workbook in one request
    /// (`POST /cr-ponds/pivot`).
    pub async fn pivot(&self, files: Vec<UploadFile>) -> Result<PivotFile, ApiError> {
        let response = self
            .client
            .post(self.base.endpoint(&["cr-ponds", "pivot"]))
            .multipart(files_form(files))
            .send()
            .await?;

        let response = Self::ensure_success(response, "Generate pivot").await?;
        let disposition = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?;

        let file = PivotFile::new(
            disposition.as_deref().and_then(filename_from_disposition),
            bytes.to_vec(),
        );
        tracing::info!(filename = %file.filename, size = file.bytes.len(), "Pivot received");
        Ok(file)
    }

    // ---- private helpers ----

    /// Send a request with an optional JSON body and query string.
    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
        query: &[(&str, u64)],
    ) -> Result<reqwest::Response, ApiError> {
        let url = self.base.endpoint(segments);
        tracing::debug!(method = %method, path = url.path(), "Backend request");

        let mut request = self.client.request(method, url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    /// Ensure the response has a success status code. Returns the response
    /// unchanged on success, or an [`ApiError::Status`] with the message
    /// extracted from the error body.
    async fn ensure_success(
        response: reqwest::Response,
        action: &str,
    ) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let path = response.url().path().to_string();
        let body = response.bytes().await.unwrap_or_default();
        let message = error_message(&body, action, status.as_u16());
        tracing::warn!(status = status.as_u16(), path = %path, error = %message, "Backend request failed");

        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    /// Decode a successful JSON body; an empty or malformed body decodes as
    /// `T::default()`.
    async fn parse_response<T: DeserializeOwned + Default>(
        response: reqwest::Response,
        action: &str,
    ) -> Result<T, ApiError> {
        let response = Self::ensure_success(response, action).await?;
        let bytes = response.bytes().await?;
        Ok(decode_lenient(&bytes))
    }

    /// Assert the response has a success status code, discarding the body.
    async fn check_status(response: reqwest::Response, action: &str) -> Result<(), ApiError> {
        Self::ensure_success(response, action).await?;
        Ok(())
    }
}

fn page_query(limit: u64, offset: u64) -> [(&'static str, u64); 2] {
    [("limit", limit), ("offset", offset)]
}

fn files_form(files: Vec<UploadFile>) -> Form {
    files.into_iter().fold(Form::new(), |form, file| {
        form.part("files", Part::bytes(file.bytes).file_name(file.file_name))
    })
}

fn decode_lenient<T: DeserializeOwned + Default>(bytes: &[u8]) -> T {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return T::default();
    }
    match serde_json::from_slice(bytes) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "Unreadable response body, treating as empty");
            T::default()
        }
    }
}
