//! SQL explorer: run ad-hoc `SELECT`s and optionally save them.

use std::sync::Arc;

use sheetport_client::api::ApiClient;
use sheetport_client::paginator::QueryRunner;
use sheetport_core::query::{validate_query_name, validate_select, QuerySource, DEFAULT_SQL};

use super::{page_through, PagingArgs};

pub async fn run(
    client: Arc<ApiClient>,
    sql: Option<String>,
    save_as: Option<String>,
    paging: &PagingArgs,
) -> anyhow::Result<()> {
    let sql = sql
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SQL.to_string());
    validate_select(&sql)?;

    if let Some(name) = save_as.as_deref() {
        let name = validate_query_name(name)?;
        client.create_query(name, &sql).await?;
        println!("Saved query \"{name}\".");
    }

    let mut runner = QueryRunner::new(client, QuerySource::Sql(sql));
    page_through(&mut runner, paging).await
}
