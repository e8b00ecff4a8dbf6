//! Seams between the long-running client behaviours and the HTTP layer.
//!
//! The poller, paginator and import session only need a handful of
//! backend calls. Expressing them as traits lets tests drive those
//! behaviours with scripted responses instead of a live server.

use async_trait::async_trait;
use sheetport_core::job::JobIdSet;
use sheetport_core::models::{JobStatus, QueryPage};
use sheetport_core::query::QuerySource;

use crate::api::{ApiClient, UploadFile};
use crate::error::ApiError;

/// Backend calls needed to submit imports and track their jobs.
#[async_trait]
pub trait ImportBackend: Send + Sync {
    /// Submit files as one import; returns the created job ids.
    async fn submit_import(&self, files: Vec<UploadFile>) -> Result<JobIdSet, ApiError>;

    /// Fetch the latest status of one job.
    async fn job_status(&self, id: &str) -> Result<JobStatus, ApiError>;
}

/// Backend calls needed to page through query results.
#[async_trait]
pub trait QueryBackend: Send + Sync {
    /// Fetch `limit` rows of `source` starting at `offset`.
    async fn run_page(
        &self,
        source: &QuerySource,
        limit: u64,
        offset: u64,
    ) -> Result<QueryPage, ApiError>;
}

#[async_trait]
impl ImportBackend for ApiClient {
    async fn submit_import(&self, files: Vec<UploadFile>) -> Result<JobIdSet, ApiError> {
        ApiClient::submit_import(self, files).await
    }

    async fn job_status(&self, id: &str) -> Result<JobStatus, ApiError> {
        ApiClient::job_status(self, id).await
    }
}

#[async_trait]
impl QueryBackend for ApiClient {
    async fn run_page(
        &self,
        source: &QuerySource,
        limit: u64,
        offset: u64,
    ) -> Result<QueryPage, ApiError> {
        match source {
            QuerySource::Sql(sql) => self.run_sql(sql, limit, offset).await,
            QuerySource::Saved(id) => self.run_saved_query(*id, limit, offset).await,
        }
    }
}
