//! MockStore - an in-process key endpoint for driving the harness over HTTP
//!
//! Each mock binds 127.0.0.1 on an ephemeral port and serves `/s/key` with a
//! private in-memory map. Statuses can be forced per method to simulate a
//! misbehaving node, and every received request is recorded.

#![allow(dead_code)]

use axum::extract::{Query, State};
use axum::http::{Method, StatusCode};
use axum::routing::post;
use axum::Router;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;

use kvmesh_bench::KEY_PATH;

/// One request as the mock saw it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedRequest {
    pub method: Method,
    pub key: Option<String>,
    pub body: String,
}

#[derive(Default)]
struct StoreState {
    values: Mutex<HashMap<String, String>>,
    forced: Mutex<HashMap<Method, StatusCode>>,
    received: Mutex<Vec<ReceivedRequest>>,
}

/// A running mock node
pub struct MockStore {
    pub port: u16,
    state: Arc<StoreState>,
}

impl MockStore {
    /// Bind and serve until the test runtime shuts down
    pub async fn start() -> Self {
        let state = Arc::new(StoreState::default());
        let app = Router::new()
            .route(KEY_PATH, post(handle).get(handle).delete(handle))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { port, state }
    }

    /// Answer every `method` request with `status`, skipping the store
    pub fn force_status(&self, method: Method, status: StatusCode) {
        self.state.forced.lock().insert(method, status);
    }

    pub fn received(&self) -> Vec<ReceivedRequest> {
        self.state.received.lock().clone()
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.state.values.lock().get(key).cloned()
    }
}

async fn handle(
    State(state): State<Arc<StoreState>>,
    method: Method,
    Query(query): Query<HashMap<String, String>>,
    body: String,
) -> (StatusCode, String) {
    let posted: Option<serde_json::Value> = serde_json::from_str(&body).ok();
    let key = query.get("key").cloned().or_else(|| {
        posted
            .as_ref()
            .and_then(|v| v["key"].as_str())
            .map(str::to_string)
    });

    state.received.lock().push(ReceivedRequest {
        method: method.clone(),
        key: key.clone(),
        body: body.clone(),
    });

    if let Some(status) = state.forced.lock().get(&method).copied() {
        return (status, format!("forced {}", status.as_u16()));
    }

    let Some(key) = key else {
        return (StatusCode::BAD_REQUEST, "missing key".to_string());
    };

    let mut values = state.values.lock();
    match method {
        Method::POST => {
            let value = posted
                .as_ref()
                .and_then(|v| v["value"].as_str())
                .unwrap_or_default()
                .to_string();
            values.insert(key, value);
            (StatusCode::OK, "stored".to_string())
        }
        Method::GET => match values.get(&key) {
            Some(value) => (StatusCode::OK, value.clone()),
            None => (StatusCode::NOT_FOUND, "not found".to_string()),
        },
        Method::DELETE => match values.remove(&key) {
            Some(_) => (StatusCode::OK, "deleted".to_string()),
            None => (StatusCode::NOT_FOUND, "not found".to_string()),
        },
        _ => (StatusCode::METHOD_NOT_ALLOWED, String::new()),
    }
}

/// A port nothing listens on
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

/// A node that sends `status` with a promised body it never finishes
///
/// Headers announce more bytes than are written before the connection
/// closes, so the status arrives but reading the body fails.
pub async fn truncated_body_node(status: u16) -> u16 {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut request = [0u8; 4096];
                let _ = socket.read(&mut request).await;
                let head = format!(
                    "HTTP/1.1 {status} OK\r\nContent-Length: 100\r\nConnection: close\r\n\r\npartial"
                );
                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.shutdown().await;
                // Drain until the client hangs up so closing never resets the stream
                while matches!(socket.read(&mut request).await, Ok(n) if n > 0) {}
            });
        }
    });
    port
}
