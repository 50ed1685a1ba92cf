//! JSON-RPC protocol types for the Host side (stdio).
//!
//! # Protocol Overview
//!
//! - **Requests**: Host → bridge (`initialize`, `tools/list`, `tools/call`, `ping`)
//! - **Responses**: bridge → Host (result or error), one JSON object per line
//! - **Notifications**: Host → bridge (no `id`), accepted and ignored

use bridge_domain::{BridgeResponse, ToolSpec};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

/// Protocol revision reported when the Host does not ask for one.
pub const PROTOCOL_VERSION: &str = "2025-06-18";

pub const SERVER_NAME: &str = "a2a-bridge";

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;

/// Errors that end a Host session
#[derive(Error, Debug)]
pub enum HostProtocolError {
    #[error("I/O error on host stream: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Response writer closed")]
    WriterClosed,
}

/// Method a Host request can name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostMethod {
    Initialize,
    ListTools,
    CallTool,
    Ping,
}

impl HostMethod {
    pub fn as_str(&self) -> &str {
        match self {
            HostMethod::Initialize => "initialize",
            HostMethod::ListTools => "tools/list",
            HostMethod::CallTool => "tools/call",
            HostMethod::Ping => "ping",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "initialize" => Some(HostMethod::Initialize),
            "tools/list" => Some(HostMethod::ListTools),
            "tools/call" => Some(HostMethod::CallTool),
            "ping" => Some(HostMethod::Ping),
            _ => None,
        }
    }
}

/// An incoming JSON-RPC frame from the Host.
///
/// A frame without `id` is a notification.
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub params: Option<Value>,
}

impl IncomingMessage {
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// JSON-RPC error object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}

/// JSON-RPC response sent from the bridge to the Host.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponseOut {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl JsonRpcResponseOut {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, error: RpcError) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// Result of `initialize`. Echoes the Host's protocol version when given.
pub fn initialize_result(params: Option<&Value>) -> Value {
    let version = params
        .and_then(|p| p.get("protocolVersion"))
        .and_then(Value::as_str)
        .unwrap_or(PROTOCOL_VERSION);

    json!({
        "protocolVersion": version,
        "capabilities": {"tools": {"listChanged": false}},
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION"),
        },
    })
}

/// Result of `tools/list`.
pub fn tool_listing(spec: &ToolSpec) -> Value {
    let tools: Vec<Value> = spec
        .all()
        .map(|tool| {
            json!({
                "name": tool.name,
                "description": tool.description,
                "inputSchema": tool.input_schema(),
            })
        })
        .collect();
    json!({ "tools": tools })
}

/// Result of `tools/call`.
///
/// The bridge response goes out twice: as the text content and as
/// `structuredContent`. Anything but `ok` is flagged with `isError`.
pub fn tool_call_result(response: &BridgeResponse) -> Result<Value, serde_json::Error> {
    let structured = serde_json::to_value(response)?;
    let text = serde_json::to_string(&structured)?;
    Ok(json!({
        "content": [{"type": "text", "text": text}],
        "structuredContent": structured,
        "isError": !response.is_ok(),
    }))
}
