//! Protocol Translator
//!
//! Converts a Host tool invocation into a [`MeshEnvelope`] and a raw mesh
//! reply into a [`ToolResult`]. Stateless: the only configuration is the
//! identity the bridge signs outbound envelopes with.

use super::envelope::MeshEnvelope;
use super::wire::{MeshResponse, extract_text};
use crate::agent::entities::AgentRecord;
use crate::core::error::BridgeError;
use crate::tool::context::ToolInvocationContext;
use crate::tool::entities::BridgeTool;
use crate::tool::value_objects::ToolResult;
use thiserror::Error;

/// Errors raised while translating between the two protocols.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslateError {
    #[error("Unsupported tool: {0}")]
    UnsupportedTool(String),

    #[error("Tool '{0}' is a local registry operation and has no mesh message")]
    LocalOperation(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Malformed mesh response: {0}")]
    Protocol(String),

    #[error("Remote agent error (code {code}): {message}")]
    Remote { code: i64, message: String },
}

impl From<TranslateError> for BridgeError {
    fn from(err: TranslateError) -> Self {
        match err {
            TranslateError::UnsupportedTool(name) => BridgeError::UnsupportedTool(name),
            TranslateError::LocalOperation(name) => BridgeError::Internal(format!(
                "no mesh message for local tool '{}'",
                name
            )),
            TranslateError::InvalidArgument(msg) => BridgeError::Validation(msg),
            TranslateError::Protocol(msg) => BridgeError::Protocol(msg),
            TranslateError::Remote { code, message } => {
                BridgeError::Protocol(format!("remote agent error {}: {}", code, message))
            }
        }
    }
}

/// Host ↔ Mesh translation.
#[derive(Debug, Clone)]
pub struct ProtocolTranslator {
    identity: String,
}

impl ProtocolTranslator {
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
        }
    }

    /// Builds the single outbound envelope for a `a2a_send` call.
    pub fn encode(
        &self,
        context: &ToolInvocationContext,
        agent: &AgentRecord,
    ) -> Result<MeshEnvelope, TranslateError> {
        match context.tool() {
            BridgeTool::Send => {}
            tool if tool.is_local() => {
                return Err(TranslateError::LocalOperation(tool.name().to_string()));
            }
            tool => return Err(TranslateError::UnsupportedTool(tool.name().to_string())),
        }

        let message = context
            .get_string("message")
            .ok_or_else(|| TranslateError::InvalidArgument("message is required".to_string()))?;
        if message.trim().is_empty() {
            return Err(TranslateError::InvalidArgument(
                "message must not be empty".to_string(),
            ));
        }

        Ok(MeshEnvelope::new(
            self.identity.as_str(),
            agent.name.clone(),
            message,
        ))
    }

    /// Decodes the raw reply to `envelope`.
    pub fn decode(&self, envelope: &MeshEnvelope, raw: &str) -> Result<ToolResult, TranslateError> {
        let response: MeshResponse = serde_json::from_str(raw)
            .map_err(|e| TranslateError::Protocol(format!("unparseable reply: {}", e)))?;

        if let Some(id) = response.id_str()
            && id != envelope.correlation_id.as_str()
        {
            return Err(TranslateError::Protocol(format!(
                "reply id '{}' does not match request '{}'",
                id, envelope.correlation_id
            )));
        }

        if let Some(error) = response.error {
            return Err(TranslateError::Remote {
                code: error.code,
                message: error.message,
            });
        }

        let result = response
            .result
            .ok_or_else(|| TranslateError::Protocol("reply has neither result nor error".to_string()))?;

        let base = |output: String| {
            ToolResult::new(BridgeTool::Send.name(), output)
                .with_correlation(envelope.correlation_id.clone())
                .with_agent(envelope.to_agent.as_str())
        };

        Ok(match extract_text(&result) {
            Some(text) => base(text),
            None => {
                let output = match &result {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                base(output).with_structured(result)
            }
        })
    }
}
