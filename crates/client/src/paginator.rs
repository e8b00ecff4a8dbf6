//! Demand-driven query runner.
//!
//! A [`QueryRunner`] owns the [`ResultSet`] of one query source. Callers
//! start a run with [`QueryRunner::run`] and pull further pages with
//! [`QueryRunner::load_more`] whenever the view nears the end of the loaded
//! rows. A failed page stops paging; rows already loaded stay.

use std::sync::Arc;

use sheetport_core::query::{validate_select, QuerySource, ResultSet, DEFAULT_PAGE_SIZE};

use crate::backend::QueryBackend;

pub struct QueryRunner<B: ?Sized> {
    backend: Arc<B>,
    source: QuerySource,
    results: ResultSet,
}

impl<B> QueryRunner<B>
where
    B: QueryBackend + ?Sized,
{
    pub fn new(backend: Arc<B>, source: QuerySource) -> Self {
        Self::with_page_size(backend, source, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(backend: Arc<B>, source: QuerySource, page_size: u64) -> Self {
        Self {
            backend,
            source,
            results: ResultSet::new(page_size),
        }
    }

    pub fn source(&self) -> &QuerySource {
        &self.source
    }

    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    /// Switch to another source. Results of the previous source are dropped
    /// immediately; nothing is fetched until [`QueryRunner::run`].
    pub fn set_source(&mut self, source: QuerySource) {
        self.source = source;
        self.results.reset();
    }

    /// Start a new run of the current source and fetch its first page.
    ///
    /// Ad-hoc SQL that is not a `SELECT` never reaches the backend; the
    /// validation message is recorded on the result set instead.
    pub async fn run(&mut self) {
        self.results.reset();

        if let QuerySource::Sql(sql) = &self.source {
            if let Err(e) = validate_select(sql) {
                self.results.apply_error(e.to_string());
                return;
            }
        }

        tracing::debug!(source = %self.source, "Query run started");
        self.fetch_next().await;
    }

    /// Fetch the next page if one is believed to exist and no fetch is in
    /// progress. Returns whether a request was issued.
    pub async fn load_more(&mut self) -> bool {
        if !self.results.should_fetch_next() {
            return false;
        }
        self.fetch_next().await;
        true
    }

    /// Keep fetching until the source is exhausted, a page fails, or
    /// `max_pages` pages (including those already loaded) are present.
    ///
    /// Returns the number of pages fetched by this call.
    pub async fn load_all(&mut self, max_pages: Option<u64>) -> u64 {
        let mut fetched = 0;
        while max_pages.map_or(true, |max| self.results.next_page() < max) {
            if !self.load_more().await {
                break;
            }
            fetched += 1;
        }
        fetched
    }

    async fn fetch_next(&mut self) {
        let (page, offset) = self.results.begin_fetch();
        let limit = self.results.limit();

        match self.backend.run_page(&self.source, limit, offset).await {
            Ok(result) => {
                let received = result.items.len();
                self.results.apply_page(page, result);
                tracing::debug!(
                    source = %self.source,
                    page,
                    rows = received,
                    has_more = self.results.has_more(),
                    "Query page loaded",
                );
            }
            Err(e) => {
                tracing::warn!(source = %self.source, page, error = %e, "Query page failed");
                self.results.apply_error(e.to_string());
            }
        }
    }
}
