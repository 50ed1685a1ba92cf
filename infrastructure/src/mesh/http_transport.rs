//! HTTP adapter for the mesh transport port.
//!
//! - Agent cards are read from `GET {endpoint}/.well-known/agent-card.json`.
//! - Envelopes are delivered as JSON-RPC 2.0 via `POST {endpoint}/api/a2a`.
//!
//! Each call is one attempt bounded by the timeout the caller passes in.

use async_trait::async_trait;
use bridge_application::{MeshTransport, TransportError};
use bridge_domain::{AgentCard, AgentEndpoint, MeshEnvelope};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, trace};

/// Well-known location of an agent's self-description
pub const AGENT_CARD_PATH: &str = ".well-known/agent-card.json";

/// JSON-RPC endpoint for message delivery
pub const MESSAGE_PATH: &str = "api/a2a";

const USER_AGENT: &str = concat!("a2a-bridge/", env!("CARGO_PKG_VERSION"));

/// Mesh transport over plain HTTP(S) using a shared `reqwest` client.
#[derive(Clone)]
pub struct HttpMeshTransport {
    client: Client,
}

impl HttpMeshTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Use a preconfigured client (proxies, TLS roots, ...).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn map_error(err: reqwest::Error, timeout: Duration) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(timeout)
        } else if err.is_connect() {
            TransportError::Connection(err.to_string())
        } else {
            TransportError::Other(err.to_string())
        }
    }

    async fn read_body(
        response: reqwest::Response,
        timeout: Duration,
    ) -> Result<String, TransportError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Self::map_error(e, timeout))?;

        if !status.is_success() {
            let message = if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("Unknown").to_string()
            } else {
                body.trim().to_string()
            };
            return Err(TransportError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }
}

impl Default for HttpMeshTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MeshTransport for HttpMeshTransport {
    async fn fetch_card(
        &self,
        endpoint: &AgentEndpoint,
        timeout: Duration,
    ) -> Result<AgentCard, TransportError> {
        let url = endpoint.join(AGENT_CARD_PATH);
        debug!(url = %url, "Fetching agent card");

        let response = self
            .client
            .get(&url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/json")
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| Self::map_error(e, timeout))?;

        let body = Self::read_body(response, timeout).await?;
        let value: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| TransportError::InvalidCard(format!("not JSON: {}", e)))?;

        AgentCard::from_value(&value)
            .ok_or_else(|| TransportError::InvalidCard("missing 'name'".to_string()))
    }

    async fn dispatch(
        &self,
        endpoint: &AgentEndpoint,
        envelope: &MeshEnvelope,
        timeout: Duration,
    ) -> Result<String, TransportError> {
        let url = endpoint.join(MESSAGE_PATH);
        debug!(
            url = %url,
            correlation_id = %envelope.correlation_id,
            "Dispatching envelope"
        );

        let response = self
            .client
            .post(&url)
            .header("User-Agent", USER_AGENT)
            .json(&envelope.to_request())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| Self::map_error(e, timeout))?;

        let body = Self::read_body(response, timeout).await?;
        trace!(bytes = body.len(), "Received mesh reply");
        Ok(body)
    }
}
