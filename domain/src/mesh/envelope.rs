//! Mesh message envelope
//!
//! One [`MeshEnvelope`] per logical outbound message. The correlation id is
//! reused as the JSON-RPC request id and as the message id, so a reply can
//! be paired with its request.

use crate::agent::value_objects::AgentName;
use serde::{Deserialize, Serialize};
use std::fmt;

/// JSON-RPC method used for every outbound message.
pub const MESSAGE_SEND: &str = "message/send";

/// Pairs a request with its response.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// A fresh random id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Message author role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Agent,
}

/// One part of a mesh message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MessagePart {
    Text { text: String },
    Data { data: serde_json::Value },
}

impl MessagePart {
    pub fn text(text: impl Into<String>) -> Self {
        MessagePart::Text { text: text.into() }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            MessagePart::Text { text } => Some(text),
            MessagePart::Data { .. } => None,
        }
    }
}

/// Mesh message body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshMessage {
    pub role: MessageRole,
    pub parts: Vec<MessagePart>,
    pub message_id: String,
}

impl MeshMessage {
    /// A single-part text message from the bridge's side.
    pub fn user_text(text: impl Into<String>, message_id: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            parts: vec![MessagePart::text(text)],
            message_id: message_id.into(),
        }
    }

    /// All text parts, joined by newlines.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(MessagePart::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// An outbound message addressed to one remote agent.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshEnvelope {
    pub from_agent: String,
    pub to_agent: AgentName,
    pub payload: MeshMessage,
    pub correlation_id: CorrelationId,
}

impl MeshEnvelope {
    pub fn new(from_agent: impl Into<String>, to_agent: AgentName, text: impl Into<String>) -> Self {
        let correlation_id = CorrelationId::generate();
        let payload = MeshMessage::user_text(text, correlation_id.as_str());
        Self {
            from_agent: from_agent.into(),
            to_agent,
            payload,
            correlation_id,
        }
    }

    /// Replaces the generated correlation id, keeping the message id in step.
    pub fn with_correlation(mut self, id: CorrelationId) -> Self {
        self.payload.message_id = id.as_str().to_string();
        self.correlation_id = id;
        self
    }

    pub fn text(&self) -> String {
        self.payload.text()
    }

    /// JSON-RPC request body for this envelope.
    pub fn to_request(&self) -> serde_json::Value {
        serde_json::json!({
            "jsonrpc": "2.0",
            "id": self.correlation_id.as_str(),
            "method": MESSAGE_SEND,
            "params": {
                "message": self.payload,
                "metadata": {
                    "fromAgent": self.from_agent,
                    "toAgent": self.to_agent.as_str(),
                },
            },
        })
    }
}
