//! HTTP access to store nodes
//!
//! Every node serves the same key endpoint:
//! - `POST /s/key` with JSON `{"key", "value"}`
//! - `GET /s/key?key=<key>`
//! - `DELETE /s/key?key=<key>`

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use kvmesh_core::{Operation, WorkloadItem};

use crate::error::{BenchError, Result, TransportError};

/// Path of the key endpoint on every node
pub const KEY_PATH: &str = "/s/key";

/// Prefix of the body text recorded when the body could not be read
pub const BODY_READ_ERROR_PREFIX: &str = "Failed to read response body";

/// Status and raw body of a store response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreReply {
    pub status: u16,
    pub body: String,
}

/// Sends one key operation to one node
#[async_trait]
pub trait StoreClient: Send + Sync {
    async fn send(
        &self,
        port: u16,
        operation: Operation,
        item: &WorkloadItem,
    ) -> std::result::Result<StoreReply, TransportError>;
}

#[derive(Serialize)]
struct KeyValueBody<'a> {
    key: &'a str,
    value: &'a str,
}

/// reqwest-backed store client
#[derive(Debug, Clone)]
pub struct HttpStoreClient {
    client: Client,
    host: String,
}

impl HttpStoreClient {
    /// Client for nodes on `host` with a per-request timeout
    pub fn new(host: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BenchError::Client(e.to_string()))?;
        Ok(Self {
            client,
            host: host.into(),
        })
    }

    /// Key endpoint URL of the node on `port`
    pub fn endpoint(&self, port: u16) -> String {
        format!("http://{}:{}{}", self.host, port, KEY_PATH)
    }
}

#[async_trait]
impl StoreClient for HttpStoreClient {
    async fn send(
        &self,
        port: u16,
        operation: Operation,
        item: &WorkloadItem,
    ) -> std::result::Result<StoreReply, TransportError> {
        let url = self.endpoint(port);
        let key_query = [("key", item.key.as_str())];

        let request = match operation {
            Operation::Post => self.client.post(&url).json(&KeyValueBody {
                key: &item.key,
                value: &item.value,
            }),
            Operation::Get => self.client.get(&url).query(&key_query),
            Operation::Delete => self.client.delete(&url).query(&key_query),
        };

        let response = request.send().await?;
        let status = response.status().as_u16();
        // The status already arrived; a broken body does not erase it
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                tracing::debug!(port, status, error = %err, "Failed to read response body");
                format!("{BODY_READ_ERROR_PREFIX}: {err}")
            }
        };

        Ok(StoreReply { status, body })
    }
}
