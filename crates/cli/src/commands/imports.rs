//! Import history: the job list and one job with its staged rows.

use sheetport_client::api::ApiClient;
use sheetport_core::display::{display_progress, display_timestamp};
use sheetport_core::pagination::{page_summary, IMPORTS_PAGE_SIZE, IMPORT_ROWS_PAGE_SIZE};

use super::{fetch_page, page_index};
use crate::render;

pub async fn list(client: &ApiClient, page: u64) -> anyhow::Result<()> {
    let (page, listing) = fetch_page(page_index(page), IMPORTS_PAGE_SIZE, move |limit, offset| {
        client.list_imports(limit, offset)
    })
    .await?;

    if listing.items.is_empty() {
        println!("No imports yet.");
    } else {
        println!("{}", render::imports(&listing.items));
    }
    println!("{}", page_summary(page, listing.total, IMPORTS_PAGE_SIZE));
    Ok(())
}

pub async fn show(client: &ApiClient, id: &str, page: u64) -> anyhow::Result<()> {
    let job = client.get_import(id).await?;

    println!("Import   {}", job.id);
    println!("File     {}", job.filename);
    println!("Status   {}", job.status);
    println!(
        "Rows     {}",
        display_progress(job.processed_rows, job.total_rows)
    );
    println!("Created  {}", display_timestamp(job.created_at.as_deref()));
    println!("Updated  {}", display_timestamp(job.updated_at.as_deref()));
    if let Some(error) = job.error_message.as_deref().filter(|e| !e.is_empty()) {
        println!("Error    {error}");
    }
    println!();

    let (page, rows) = fetch_page(page_index(page), IMPORT_ROWS_PAGE_SIZE, move |limit, offset| {
        client.list_import_rows(id, limit, offset)
    })
    .await?;

    if rows.items.is_empty() {
        println!("No staged rows.");
    } else {
        println!("{}", render::import_rows(&rows.items));
    }
    println!("{}", page_summary(page, rows.total, IMPORT_ROWS_PAGE_SIZE));
    Ok(())
}
