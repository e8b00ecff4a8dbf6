//! Pure domain types and logic for the sheetport import/query client.
//!
//! Nothing in this crate performs I/O or spawns tasks; the HTTP client,
//! poller and paginator in `sheetport-client` build on these types.

pub mod api_path;
pub mod display;
pub mod error;
pub mod job;
pub mod models;
pub mod pagination;
pub mod query;
pub mod types;
pub mod upload;
