//! Saved query management and execution.

use std::sync::Arc;

use sheetport_client::api::ApiClient;
use sheetport_client::paginator::QueryRunner;
use sheetport_core::display::display_timestamp;
use sheetport_core::models::SavedQueryDraft;
use sheetport_core::pagination::{page_summary, QUERIES_PAGE_SIZE};
use sheetport_core::query::{validate_query_name, QuerySource};
use sheetport_core::types::SavedQueryId;

use super::{fetch_page, page_index, page_through, PagingArgs, Prompt};
use crate::render;

pub async fn list(client: &ApiClient, page: u64) -> anyhow::Result<()> {
    let (page, listing) = fetch_page(page_index(page), QUERIES_PAGE_SIZE, move |limit, offset| {
        client.list_queries(limit, offset)
    })
    .await?;

    if listing.items.is_empty() {
        println!("No saved queries.");
    } else {
        println!("{}", render::queries(&listing.items));
    }
    println!("{}", page_summary(page, listing.total, QUERIES_PAGE_SIZE));
    Ok(())
}

pub async fn show(client: &ApiClient, id: SavedQueryId) -> anyhow::Result<()> {
    let query = client.get_query(id).await?;
    println!("Query    {}", query.id);
    println!("Name     {}", query.name);
    println!("Updated  {}", display_timestamp(query.updated_at.as_deref()));
    println!();
    println!("{}", query.sql);
    Ok(())
}

pub async fn save(client: &ApiClient, name: &str, sql: &str) -> anyhow::Result<()> {
    let name = validate_query_name(name)?;
    client.create_query(name, sql).await?;
    println!("Saved query \"{name}\".");
    Ok(())
}

/// Overwrite the name and/or SQL of a saved query, keeping whatever is not
/// given.
pub async fn update(
    client: &ApiClient,
    id: SavedQueryId,
    name: Option<String>,
    sql: Option<String>,
) -> anyhow::Result<()> {
    let mut draft = SavedQueryDraft::from(client.get_query(id).await?);
    if let Some(name) = name {
        draft.name = name;
    }
    if let Some(sql) = sql {
        draft.sql = sql;
    }

    let name = validate_query_name(&draft.name)?;
    client.update_query(draft.id, name, &draft.sql).await?;
    println!("Updated query {id}.");
    Ok(())
}

pub async fn delete(client: &ApiClient, id: SavedQueryId, yes: bool) -> anyhow::Result<()> {
    if !yes {
        let confirmed = Prompt::new()
            .confirm(&format!("Delete saved query {id}?"))
            .await?;
        if !confirmed {
            println!("Cancelled.");
            return Ok(());
        }
    }
    client.delete_query(id).await?;
    println!("Deleted query {id}.");
    Ok(())
}

pub async fn run(client: Arc<ApiClient>, id: SavedQueryId, paging: &PagingArgs) -> anyhow::Result<()> {
    let mut runner = QueryRunner::new(client, QuerySource::Saved(id));
    page_through(&mut runner, paging).await
}
