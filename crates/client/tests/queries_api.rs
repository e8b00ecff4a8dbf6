//! Saved queries, query execution and the pivot download against a fake
//! backend.

mod common;

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use sheetport_client::api::UploadFile;
use sheetport_client::paginator::QueryRunner;
use sheetport_core::query::QuerySource;

use common::Recorder;

/// `(method + path, JSON body)` of each received request.
type Requests = Recorder<(String, Value)>;

fn rows(offset: u64, count: u64) -> Vec<Value> {
    (offset..offset + count)
        .map(|i| json!({ "id": i, "row_index": i, "data": { "pond": format!("P{i}") } }))
        .collect()
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

/// Serves `total` rows of ad-hoc SQL in whatever window is requested.
async fn sql_window(State(log): State<Requests>, Json(body): Json<Value>) -> Json<Value> {
    log.push(("POST /query/sql".into(), body.clone()));
    let total: u64 = 137;
    let limit = body["limit"].as_u64().unwrap_or(0);
    let offset = body["offset"].as_u64().unwrap_or(0);
    let count = limit.min(total.saturating_sub(offset));
    Json(json!({
        "columns": ["id", "row_index", "data"],
        "items": rows(offset, count),
        "limit": limit,
        "offset": offset,
    }))
}

#[tokio::test]
async fn ad_hoc_sql_pages_until_a_short_page() {
    let log = Requests::default();
    let router = Router::new()
        .route("/query/sql", post(sql_window))
        .with_state(log.clone());
    let server = common::spawn(router).await;

    let sql = "select id, row_index, data from staging_rows order by row_index asc";
    let mut runner = QueryRunner::new(Arc::new(server.client()), QuerySource::Sql(sql.into()));

    runner.run().await;
    assert_eq!(runner.results().rows().len(), 100);
    assert_eq!(runner.results().columns(), ["id", "row_index", "data"]);
    assert!(runner.load_more().await);
    assert_eq!(runner.results().rows().len(), 137);
    assert!(!runner.results().has_more());

    assert!(!runner.load_more().await);
    let sent = log.entries();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].1, json!({ "sql": sql, "limit": 100, "offset": 0 }));
    assert_eq!(sent[1].1["offset"], 100);
}

#[tokio::test]
async fn saved_query_error_surfaces_backend_message() {
    let router = Router::new().route(
        "/queries/{id}/run",
        post(|Path(id): Path<i64>, Json(body): Json<Value>| async move {
            if body["offset"] == 0 {
                Ok(Json(json!({
                    "columns": ["id"],
                    "items": (0..100).map(|i| json!({ "id": i })).collect::<Vec<_>>(),
                    "limit": 100,
                    "offset": 0,
                    "query": id,
                })))
            } else {
                Err((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "syntax error" })),
                ))
            }
        }),
    );
    let server = common::spawn(router).await;

    let mut runner = QueryRunner::new(Arc::new(server.client()), QuerySource::Saved(9));
    runner.run().await;
    runner.load_more().await;

    let results = runner.results();
    assert_eq!(results.error(), Some("syntax error"));
    assert_eq!(results.rows().len(), 100);
    assert!(!results.has_more());
}

#[tokio::test]
async fn saved_query_run_sends_no_sql() {
    let log = Requests::default();
    let router = Router::new()
        .route(
            "/queries/{id}/run",
            post(
                |State(log): State<Requests>, Path(id): Path<i64>, Json(body): Json<Value>| async move {
                    log.push((format!("POST /queries/{id}/run"), body));
                    Json(json!({ "columns": [], "items": [] }))
                },
            ),
        )
        .with_state(log.clone());
    let server = common::spawn(router).await;

    let page = server.client().run_saved_query(4, 100, 200).await.unwrap();
    assert!(page.items.is_empty());
    assert_eq!(
        log.entries(),
        vec![(
            "POST /queries/4/run".to_string(),
            json!({ "limit": 100, "offset": 200 })
        )]
    );
}

// ---------------------------------------------------------------------------
// Saved query CRUD
// ---------------------------------------------------------------------------

#[tokio::test]
async fn saved_query_crud_round() {
    let log = Requests::default();
    let router = Router::new()
        .route(
            "/queries",
            get(
                |State(log): State<Requests>, Query(q): Query<HashMap<String, String>>| async move {
                    log.push(("GET /queries".into(), json!(q)));
                    Json(json!({
                        "items": [{ "id": 1, "name": "daily", "sql": "select 1", "updated_at": "2024-05-01T08:00:00Z" }],
                        "total": 1
                    }))
                },
            )
            .post(|State(log): State<Requests>, Json(body): Json<Value>| async move {
                log.push(("POST /queries".into(), body));
                (StatusCode::CREATED, Json(json!({ "id": 2 })))
            }),
        )
        .route(
            "/queries/{id}",
            get(|Path(id): Path<i64>| async move {
                Json(json!({ "id": id, "name": "daily", "sql": "select 1" }))
            })
            .put(
                |State(log): State<Requests>, Path(id): Path<i64>, Json(body): Json<Value>| async move {
                    log.push((format!("PUT /queries/{id}"), body));
                    StatusCode::OK
                },
            )
            .delete(|State(log): State<Requests>, Path(id): Path<i64>| async move {
                log.push((format!("DELETE /queries/{id}"), Value::Null));
                StatusCode::NO_CONTENT
            }),
        )
        .with_state(log.clone());
    let server = common::spawn(router).await;
    let client = server.client();

    let listing = client.list_queries(20, 0).await.unwrap();
    assert_eq!(listing.items[0].name, "daily");

    let query = client.get_query(1).await.unwrap();
    assert_eq!(query.sql, "select 1");

    client.create_query("weekly", "select 2").await.unwrap();
    client.update_query(1, "daily v2", "select 3").await.unwrap();
    client.delete_query(1).await.unwrap();

    let sent = log.entries();
    assert_eq!(sent[0], ("GET /queries".into(), json!({ "limit": "20", "offset": "0" })));
    assert_eq!(
        sent[1],
        ("POST /queries".into(), json!({ "name": "weekly", "sql": "select 2" }))
    );
    assert_eq!(
        sent[2],
        ("PUT /queries/1".into(), json!({ "name": "daily v2", "sql": "select 3" }))
    );
    assert_eq!(sent[3], ("DELETE /queries/1".into(), Value::Null));
}

#[tokio::test]
async fn delete_failure_reports_detail_message() {
    let router = Router::new().route(
        "/queries/{id}",
        axum::routing::delete(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "detail": "query not found" })),
            )
        }),
    );
    let server = common::spawn(router).await;

    let err = server.client().delete_query(99).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.to_string(), "query not found");
}

// ---------------------------------------------------------------------------
// Pivot
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pivot_returns_named_workbook() {
    let parts: Recorder<String> = Recorder::default();
    let router = Router::new()
        .route(
            "/cr-ponds/pivot",
            post(|State(parts): State<Recorder<String>>, mut multipart: Multipart| async move {
                while let Some(field) = multipart.next_field().await.unwrap() {
                    parts.push(field.name().unwrap_or_default().to_string());
                }
                (
                    [
                        (
                            CONTENT_TYPE,
                            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
                        ),
                        (CONTENT_DISPOSITION, "attachment; filename=\"pivot_may.xlsx\""),
                    ],
                    b"PK\x03\x04pivot".to_vec(),
                )
            }),
        )
        .with_state(parts.clone());
    let server = common::spawn(router).await;

    let file = server
        .client()
        .pivot(vec![UploadFile {
            file_name: "ponds.xlsx".into(),
            bytes: b"x".to_vec(),
        }])
        .await
        .unwrap();

    assert_eq!(file.filename, "pivot_may.xlsx");
    assert_eq!(file.bytes, b"PK\x03\x04pivot");
    assert_eq!(parts.entries(), vec!["files".to_string()]);

    let dir = tempfile::tempdir().unwrap();
    let path = file.save_into(dir.path()).await.unwrap();
    assert_eq!(std::fs::read(path).unwrap(), b"PK\x03\x04pivot");
}

#[tokio::test]
async fn pivot_without_disposition_uses_default_name() {
    let router = Router::new().route(
        "/cr-ponds/pivot",
        post(|_multipart: Multipart| async { b"PK".to_vec() }),
    );
    let server = common::spawn(router).await;

    let file = server
        .client()
        .pivot(vec![UploadFile {
            file_name: "ponds.xlsx".into(),
            bytes: b"x".to_vec(),
        }])
        .await
        .unwrap();
    assert_eq!(file.filename, "pivot.xlsx");
}
