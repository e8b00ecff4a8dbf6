//! `sheetport` -- terminal front end for the spreadsheet import/query backend.
//!
//! Uploads Excel workbooks and follows their import jobs, browses import
//! history and staged rows, manages saved queries and runs read-only SQL
//! with on-demand paging.
//!
//! # Environment variables
//!
//! | Variable                         | Default                 | Description                          |
//! |----------------------------------|-------------------------|--------------------------------------|
//! | `SHEETPORT_API_BASE`             | --                      | Backend base URL                     |
//! | `SHEETPORT_ORIGIN`               | `http://localhost:5173` | Origin whose `/api` proxy is used    |
//! | `SHEETPORT_POLL_INTERVAL_MS`     | `2000`                  | Job status poll interval             |
//! | `SHEETPORT_REQUEST_TIMEOUT_SECS` | --                      | Per-request timeout                  |
//! | `RUST_LOG`                       | `sheetport=info,...`    | Log filter                           |

mod commands;
mod render;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use sheetport_client::api::ApiClient;
use sheetport_client::config::ClientConfig;
use sheetport_core::types::SavedQueryId;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::PagingArgs;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload Excel files and follow their import jobs
    Upload {
        /// Workbooks to import (.xlsx/.xls)
        #[arg(value_name = "FILES")]
        files: Vec<PathBuf>,

        /// Submit only; do not poll job status
        #[arg(long)]
        no_watch: bool,

        /// Poll interval in milliseconds (overrides SHEETPORT_POLL_INTERVAL_MS)
        #[arg(long, value_name = "MS", value_parser = clap::value_parser!(u64).range(1..))]
        interval_ms: Option<u64>,
    },
    /// List import jobs
    Imports {
        #[arg(long, default_value_t = 1)]
        page: u64,
    },
    /// Show one import job and its staged rows
    ImportShow {
        id: String,

        #[arg(long, default_value_t = 1)]
        page: u64,
    },
    /// List saved queries
    Queries {
        #[arg(long, default_value_t = 1)]
        page: u64,
    },
    /// Show a saved query
    QueryShow { id: SavedQueryId },
    /// Save a new query
    QuerySave {
        #[arg(long)]
        name: String,

        #[arg(long)]
        sql: String,
    },
    /// Change the name and/or SQL of a saved query
    QueryUpdate {
        id: SavedQueryId,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        sql: Option<String>,
    },
    /// Delete a saved query
    QueryDelete {
        id: SavedQueryId,

        /// Do not ask for confirmation
        #[arg(long, short)]
        yes: bool,
    },
    /// Run a saved query
    QueryRun {
        id: SavedQueryId,

        #[command(flatten)]
        paging: PagingArgs,
    },
    /// Run an ad-hoc SELECT
    Sql {
        /// Statement to run; defaults to a sample over staging_rows
        sql: Option<String>,

        /// Also save the statement under this name
        #[arg(long, value_name = "NAME")]
        save: Option<String>,

        #[command(flatten)]
        paging: PagingArgs,
    },
    /// Turn workbooks into a pivot workbook
    Pivot {
        #[arg(value_name = "FILES")]
        files: Vec<PathBuf>,

        /// Directory the pivot workbook is written to
        #[arg(long, value_name = "DIR", default_value = ".")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    if let Err(e) = run(cli.command).await {
        tracing::debug!(error = ?e, "Command failed");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sheetport=info,sheetport_client=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run(command: Command) -> anyhow::Result<()> {
    let config = ClientConfig::from_env()?;
    tracing::debug!(api_base = %config.api_base, "Configuration loaded");
    let client = Arc::new(ApiClient::from_config(&config)?);

    match command {
        Command::Upload {
            files,
            no_watch,
            interval_ms,
        } => {
            let interval = interval_ms
                .map(Duration::from_millis)
                .unwrap_or(config.poll_interval);
            commands::upload::run(client, &files, interval, !no_watch).await
        }
        Command::Imports { page } => commands::imports::list(&client, page).await,
        Command::ImportShow { id, page } => commands::imports::show(&client, &id, page).await,
        Command::Queries { page } => commands::queries::list(&client, page).await,
        Command::QueryShow { id } => commands::queries::show(&client, id).await,
        Command::QuerySave { name, sql } => commands::queries::save(&client, &name, &sql).await,
        Command::QueryUpdate { id, name, sql } => {
            commands::queries::update(&client, id, name, sql).await
        }
        Command::QueryDelete { id, yes } => commands::queries::delete(&client, id, yes).await,
        Command::QueryRun { id, paging } => commands::queries::run(client, id, &paging).await,
        Command::Sql { sql, save, paging } => commands::sql::run(client, sql, save, &paging).await,
        Command::Pivot { files, out } => commands::pivot::run(&client, &files, &out).await,
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn paging_flags_conflict() {
        let parsed = Cli::try_parse_from(["sheetport", "sql", "select 1", "--all", "--pages", "2"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn upload_accepts_many_files() {
        let cli = Cli::try_parse_from(["sheetport", "upload", "a.xlsx", "b.xls", "--no-watch"])
            .unwrap();
        match cli.command {
            Command::Upload {
                files, no_watch, ..
            } => {
                assert_eq!(files.len(), 2);
                assert!(no_watch);
            }
            _ => panic!("expected upload"),
        }
    }
}
