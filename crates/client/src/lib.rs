//! HTTP client, job status poller and paginated query runner for the
//! sheetport import/query backend.
//!
//! [`api::ApiClient`] wraps every backend endpoint. The long-running
//! behaviours are generic over the [`backend`] traits so they can be
//! driven by the real client or by a scripted fake:
//!
//! - [`poller::JobPoller`] polls submitted import jobs until all of them
//!   reach a terminal status.
//! - [`paginator::QueryRunner`] fetches query results page by page on
//!   demand.
//! - [`session::ImportSession`] uploads files and starts the poller.

pub mod api;
pub mod backend;
pub mod config;
pub mod error;
pub mod paginator;
pub mod pivot;
pub mod poller;
pub mod session;
