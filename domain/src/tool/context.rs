//! Per-invocation context

use super::entities::{BridgeTool, ToolCall};
use crate::core::error::BridgeError;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Everything known about one Host tool call.
///
/// Built once per call and never mutated. `requested_at` is the clock every
/// governance decision for this call is evaluated against.
#[derive(Debug, Clone)]
pub struct ToolInvocationContext {
    tool: BridgeTool,
    caller_identity: String,
    target_agent_name: Option<String>,
    requested_at: DateTime<Utc>,
    arguments: HashMap<String, serde_json::Value>,
}

impl ToolInvocationContext {
    /// Builds the context for a call to one of the bridge's tools.
    pub fn from_call(
        call: ToolCall,
        caller_identity: impl Into<String>,
        requested_at: DateTime<Utc>,
    ) -> Result<Self, BridgeError> {
        let tool = BridgeTool::from_name(&call.tool_name)
            .ok_or_else(|| BridgeError::UnsupportedTool(call.tool_name.clone()))?;

        let target_agent_name = if tool.targets_agent() {
            call.get_string("agent_name").map(str::to_string)
        } else {
            None
        };

        Ok(Self {
            tool,
            caller_identity: caller_identity.into(),
            target_agent_name,
            requested_at,
            arguments: call.arguments,
        })
    }

    pub fn tool(&self) -> BridgeTool {
        self.tool
    }

    pub fn tool_name(&self) -> &'static str {
        self.tool.name()
    }

    pub fn caller_identity(&self) -> &str {
        &self.caller_identity
    }

    pub fn target_agent_name(&self) -> Option<&str> {
        self.target_agent_name.as_deref()
    }

    pub fn requested_at(&self) -> DateTime<Utc> {
        self.requested_at
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }

    /// Required string argument, or a validation error naming it.
    pub fn require_string(&self, key: &str) -> Result<&str, BridgeError> {
        self.get_string(key).ok_or_else(|| {
            BridgeError::Validation(format!("Missing required argument: {}", key))
        })
    }
}
