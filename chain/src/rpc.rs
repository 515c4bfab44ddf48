//! HTTP JSON-RPC fact source.

use std::time::Duration;

use async_trait::async_trait;
use dareboard_types::SubjectId;
use serde::Deserialize;
use tracing::debug;

use crate::{ChainError, Fact, FactSource};

/// JSON-RPC method the chain node exposes for subject facts.
pub const FACT_METHOD: &str = "dareboard_getFact";

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<Fact>,
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// Fetches facts from a chain node over HTTP JSON-RPC.
///
/// Wraps `reqwest::Client` with the node's URL. The request timeout bounds a
/// single call; the verification engine applies its own deadline on top.
#[derive(Clone)]
pub struct RpcFactSource {
    http: reqwest::Client,
    node_url: String,
}

impl RpcFactSource {
    pub fn new(node_url: impl Into<String>, timeout: Duration) -> Result<Self, ChainError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| ChainError::Unavailable(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            node_url: node_url.into(),
        })
    }
}

#[async_trait]
impl FactSource for RpcFactSource {
    async fn fetch_fact(&self, subject: &SubjectId) -> Result<Fact, ChainError> {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": FACT_METHOD,
            "params": [subject.as_str()],
        });

        let response = self
            .http
            .post(&self.node_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChainError::Unavailable(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ChainError::Unavailable(format!(
                "node returned HTTP {}",
                response.status()
            )));
        }

        let decoded: RpcResponse = response
            .json()
            .await
            .map_err(|e| ChainError::Malformed(e.to_string()))?;

        if let Some(err) = decoded.error {
            return Err(ChainError::Rpc(format!("{} ({})", err.message, err.code)));
        }

        let fact = decoded
            .result
            .ok_or_else(|| ChainError::Malformed(format!("no fact for subject {subject}")))?;
        debug!(%subject, finalized = fact.is_finalized(), "fetched chain fact");
        Ok(fact)
    }
}
