//! Domain error types

use crate::policy::decision::DenyReason;
use thiserror::Error;

/// Errors surfaced by the bridge.
///
/// Every variant maps to a stable, kebab-case [`reason`](Self::reason) code
/// that is reported to the Host side. None of them is retried inside the core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Agent not found: {0}")]
    NotFound(String),

    #[error("Policy denied: {0}")]
    PolicyDenied(DenyReason),

    #[error("Unsupported tool: {0}")]
    UnsupportedTool(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Dispatch timed out after {0} ms")]
    Timeout(u64),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BridgeError {
    /// Stable reason code reported in tool results.
    pub fn reason(&self) -> &'static str {
        match self {
            BridgeError::Validation(_) => "validation-error",
            BridgeError::NotFound(_) => "not-found",
            BridgeError::PolicyDenied(reason) => reason.as_str(),
            BridgeError::UnsupportedTool(_) => "unsupported-tool",
            BridgeError::Transport(_) => "transport-error",
            BridgeError::Timeout(_) => "timeout",
            BridgeError::Protocol(_) => "protocol-error",
            BridgeError::Internal(_) => "internal-error",
        }
    }
}
