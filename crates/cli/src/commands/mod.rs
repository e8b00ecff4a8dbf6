//! Subcommand implementations and the helpers they share.

pub mod imports;
pub mod pivot;
pub mod queries;
pub mod sql;
pub mod upload;

use std::future::Future;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use sheetport_client::api::UploadFile;
use sheetport_client::backend::QueryBackend;
use sheetport_client::error::ApiError;
use sheetport_client::paginator::QueryRunner;
use sheetport_core::models::Listing;
use sheetport_core::pagination::{clamp_page, limit_offset, total_pages};
use sheetport_core::upload::{upload_file_name, validate_selection};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::render;

/// How many result pages to pull without asking.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct PagingArgs {
    /// Fetch every page without prompting
    #[arg(long, conflicts_with = "pages")]
    pub all: bool,

    /// Fetch at most N pages without prompting
    #[arg(long, value_name = "N")]
    pub pages: Option<u64>,
}

impl PagingArgs {
    fn is_interactive(&self) -> bool {
        !self.all && self.pages.is_none()
    }
}

/// Line-oriented questions on stdin.
pub struct Prompt {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompt {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Print `question` and read one line; `None` on end of input.
    pub async fn ask(&mut self, question: &str) -> anyhow::Result<Option<String>> {
        print!("{question}");
        std::io::stdout().flush()?;
        Ok(self.lines.next_line().await?.map(|l| l.trim().to_string()))
    }

    pub async fn confirm(&mut self, question: &str) -> anyhow::Result<bool> {
        let answer = self.ask(&format!("{question} [y/N] ")).await?;
        Ok(matches!(answer.as_deref(), Some("y" | "Y" | "yes")))
    }
}

/// 1-based page number from the command line as a 0-based index.
pub fn page_index(page: u64) -> u64 {
    page.saturating_sub(1)
}

/// Fetch one page of a listing. A page past the end is clamped to the last
/// page and fetched again.
pub async fn fetch_page<T, F, Fut>(
    page: u64,
    page_size: u64,
    fetch: F,
) -> Result<(u64, Listing<T>), ApiError>
where
    F: Fn(u64, u64) -> Fut,
    Fut: Future<Output = Result<Listing<T>, ApiError>>,
{
    let (limit, offset) = limit_offset(page, page_size);
    let listing = fetch(limit, offset).await?;

    let clamped = clamp_page(page, total_pages(listing.total, page_size));
    if clamped == page {
        return Ok((page, listing));
    }

    tracing::debug!(requested = page, clamped, "Page out of range");
    let (limit, offset) = limit_offset(clamped, page_size);
    Ok((clamped, fetch(limit, offset).await?))
}

/// Read files for a one-shot multipart request.
pub async fn read_uploads(paths: &[PathBuf]) -> anyhow::Result<Vec<UploadFile>> {
    validate_selection(paths)?;
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        files.push(UploadFile {
            file_name: upload_file_name(path),
            bytes,
        });
    }
    Ok(files)
}

/// Run a query and print its rows page by page.
///
/// Interactively, each Enter pulls the next page; otherwise pages are
/// fetched up to the requested limit. A failed page is reported after the
/// rows that did load.
pub async fn page_through<B>(runner: &mut QueryRunner<B>, paging: &PagingArgs) -> anyhow::Result<()>
where
    B: QueryBackend + ?Sized,
{
    runner.run().await;
    let mut shown = print_new_rows(runner, 0);

    if paging.is_interactive() {
        let mut prompt = Prompt::new();
        while runner.results().should_fetch_next() {
            let question = format!("-- {shown} rows loaded, Enter for more, q to quit -- ");
            match prompt.ask(&question).await?.as_deref() {
                None | Some("q" | "Q") => break,
                Some(_) => {}
            }
            runner.load_more().await;
            shown = print_new_rows(runner, shown);
        }
    } else {
        let max_pages = if paging.all { None } else { paging.pages };
        runner.load_all(max_pages).await;
        shown = print_new_rows(runner, shown);
    }

    let results = runner.results();
    if let Some(error) = results.error() {
        anyhow::bail!("{error}");
    }
    if shown == 0 {
        println!("No rows.");
    } else if results.is_exhausted() {
        println!("All data loaded ({shown} rows).");
    } else {
        println!("{shown} rows loaded, more available.");
    }
    Ok(())
}

/// Print rows that arrived since `shown`; returns the new count.
fn print_new_rows<B: ?Sized>(runner: &QueryRunner<B>, shown: usize) -> usize
where
    B: QueryBackend,
{
    let results = runner.results();
    let rows = results.rows();
    if rows.len() > shown {
        println!("{}", render::results(results.columns(), &rows[shown..]));
    }
    rows.len()
}
