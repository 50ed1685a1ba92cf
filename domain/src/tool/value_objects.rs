//! Tool domain value objects: the decoded result of a mesh exchange
//!
//! A [`ToolResult`] is what the Protocol Translator hands back after a
//! successful remote reply. Failures never become a `ToolResult`; they stay
//! typed errors until the orchestrator folds them into a Host response.

use crate::mesh::envelope::CorrelationId;
use serde::{Deserialize, Serialize};

/// Successful outcome of a tool that reached a remote agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Name of the tool that was executed
    pub tool_name: String,
    /// Reply content
    pub output: String,
    /// Metadata about the exchange
    #[serde(default)]
    pub metadata: ToolResultMetadata,
}

/// Structured metadata about a mesh exchange.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolResultMetadata {
    /// Correlation id shared by request and reply
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<CorrelationId>,
    /// Agent that produced the reply
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    /// Raw `result` object, when the reply carried more than text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured: Option<serde_json::Value>,
}

impl ToolResult {
    pub fn new(tool_name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            output: output.into(),
            metadata: ToolResultMetadata::default(),
        }
    }

    pub fn with_correlation(mut self, id: CorrelationId) -> Self {
        self.metadata.correlation_id = Some(id);
        self
    }

    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.metadata.agent = Some(agent.into());
        self
    }

    pub fn with_structured(mut self, value: serde_json::Value) -> Self {
        self.metadata.structured = Some(value);
        self
    }

    pub fn output(&self) -> &str {
        &self.output
    }
}
