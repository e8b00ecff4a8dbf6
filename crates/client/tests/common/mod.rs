//! In-process fake backend for client integration tests.
//!
//! Each test builds an [`axum::Router`] with just the routes it needs and
//! serves it on an ephemeral port of `127.0.0.1`. The returned
//! [`TestServer`] hands out an [`ApiClient`] pointed at it.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::Router;
use sheetport_client::api::ApiClient;
use sheetport_core::api_path::ApiBase;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A running fake backend. Aborted on drop.
pub struct TestServer {
    pub base_url: String,
    task: JoinHandle<()>,
}

impl TestServer {
    /// Client whose API base is the server root (no `/api` prefix).
    pub fn client(&self) -> ApiClient {
        let base = ApiBase::resolve(Some(self.base_url.as_str()), "http://unused.invalid").unwrap();
        ApiClient::new(base)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Serve `router` on `127.0.0.1:0`.
pub async fn spawn(router: Router) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let task = tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    TestServer {
        base_url: format!("http://{addr}"),
        task,
    }
}

/// Shared request log a handler can append to.
#[derive(Debug, Clone)]
pub struct Recorder<T> {
    entries: Arc<Mutex<Vec<T>>>,
}

impl<T> Default for Recorder<T> {
    fn default() -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<T: Clone> Recorder<T> {
    pub fn push(&self, entry: T) {
        self.entries.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<T> {
        self.entries.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}
