use super::protocol::{ENDPOINT_RPC, ErrorReply, Operation, Request};
use crate::error::{NodeError, Result};
use crate::membership::types::NodeUrl;

use serde_json::Value;
use std::time::Duration;

/// Outbound side of the messaging endpoint: one request, one reply, bounded
/// by a timeout.
///
/// Idle connections are not pooled, so every call opens its own connection
/// and releases it when the call returns, whether it succeeded, failed or
/// timed out.
#[derive(Debug, Clone)]
pub struct PeerClient {
    http_client: reqwest::Client,
    timeout: Duration,
}

impl PeerClient {
    pub fn new(timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Falling back to default HTTP client: {}", e);
                reqwest::Client::new()
            });

        Self {
            http_client,
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn request(&self, url: &NodeUrl, request: &Request) -> Result<Value> {
        self.send_raw(url, &request.to_json()).await
    }

    pub async fn call(&self, url: &NodeUrl, operation: Operation) -> Result<Value> {
        self.request(url, &Request::Call(operation)).await
    }

    /// Asks the node at `url` to leave its serving loop.
    pub async fn stop(&self, url: &NodeUrl) -> Result<Value> {
        self.request(url, &Request::Stop).await
    }

    /// Sends an arbitrary JSON request body and waits for the single reply.
    pub async fn send_raw(&self, url: &NodeUrl, body: &Value) -> Result<Value> {
        let endpoint = format!("{}{}", url, ENDPOINT_RPC);

        let response = self
            .http_client
            .post(endpoint)
            .json(body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorReply>().await {
                Ok(reply) => reply.error,
                Err(_) => status.to_string(),
            };
            return Err(NodeError::Rejected {
                url: url.clone(),
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| transport_error(url, e))?;

        Ok(serde_json::from_slice(&bytes)?)
    }
}

fn transport_error(url: &NodeUrl, error: reqwest::Error) -> NodeError {
    if error.is_timeout() {
        NodeError::Timeout { url: url.clone() }
    } else {
        NodeError::Transport {
            url: url.clone(),
            source: error,
        }
    }
}
