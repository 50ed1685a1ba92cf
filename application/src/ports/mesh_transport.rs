//! Mesh transport port
//!
//! Defines how the application layer reaches remote agents. The core treats
//! both calls as single opaque attempts: no retries, no pooling assumptions.
//! Implementations (adapters) live in the infrastructure layer.

use async_trait::async_trait;
use bridge_domain::{AgentCard, AgentEndpoint, BridgeError, MeshEnvelope};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while talking to a remote agent
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Invalid agent card: {0}")]
    InvalidCard(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl From<TransportError> for BridgeError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout(d) => BridgeError::Timeout(d.as_millis() as u64),
            other => BridgeError::Transport(other.to_string()),
        }
    }
}

/// Outbound access to the mesh
#[async_trait]
pub trait MeshTransport: Send + Sync {
    /// Fetch the agent card published at `endpoint`.
    async fn fetch_card(
        &self,
        endpoint: &AgentEndpoint,
        timeout: Duration,
    ) -> Result<AgentCard, TransportError>;

    /// Deliver one envelope and return the raw reply body.
    async fn dispatch(
        &self,
        endpoint: &AgentEndpoint,
        envelope: &MeshEnvelope,
        timeout: Duration,
    ) -> Result<String, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_errors_map_to_reason_codes() {
        let timeout: BridgeError = TransportError::Timeout(Duration::from_millis(1500)).into();
        assert_eq!(timeout, BridgeError::Timeout(1500));

        let status: BridgeError = TransportError::Status {
            status: 502,
            message: "bad gateway".to_string(),
        }
        .into();
        assert_eq!(status.reason(), "transport-error");
    }
}
