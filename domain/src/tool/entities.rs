//! Tool domain entities

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Tool name: discover or refresh an agent at an endpoint.
pub const A2A_DISCOVER: &str = "a2a_discover";
/// Tool name: list known agents.
pub const A2A_LIST_AGENTS: &str = "a2a_list_agents";
/// Tool name: send a message to a known agent.
pub const A2A_SEND: &str = "a2a_send";

/// The closed set of tools the bridge serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BridgeTool {
    Discover,
    ListAgents,
    Send,
}

impl BridgeTool {
    pub const ALL: [BridgeTool; 3] = [BridgeTool::Discover, BridgeTool::ListAgents, BridgeTool::Send];

    pub fn name(&self) -> &'static str {
        match self {
            BridgeTool::Discover => A2A_DISCOVER,
            BridgeTool::ListAgents => A2A_LIST_AGENTS,
            BridgeTool::Send => A2A_SEND,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    /// Whether the tool addresses one existing agent.
    pub fn targets_agent(&self) -> bool {
        matches!(self, BridgeTool::Send)
    }

    /// Local registry operations never produce a mesh message.
    pub fn is_local(&self) -> bool {
        matches!(self, BridgeTool::Discover | BridgeTool::ListAgents)
    }

    pub fn definition(&self) -> ToolDefinition {
        match self {
            BridgeTool::Discover => ToolDefinition::new(
                A2A_DISCOVER,
                "Discover an A2A agent at a given endpoint",
            )
            .with_parameter(ToolParameter::new(
                "endpoint",
                "The base URL of the A2A agent",
                true,
            )),
            BridgeTool::ListAgents => {
                ToolDefinition::new(A2A_LIST_AGENTS, "List all discovered A2A agents")
            }
            BridgeTool::Send => ToolDefinition::new(
                A2A_SEND,
                "Send a message to a discovered A2A agent",
            )
            .with_parameter(ToolParameter::new(
                "agent_name",
                "Name of the discovered agent",
                true,
            ))
            .with_parameter(ToolParameter::new("message", "Message to send", true)),
        }
    }
}

/// Definition of a tool exposed to the Host side
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique name of the tool (e.g., "a2a_send")
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Parameter specifications
    pub parameters: Vec<ToolParameter>,
}

/// Parameter specification for a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameter {
    /// Parameter name
    pub name: String,
    /// Parameter description
    pub description: String,
    /// Whether this parameter is required
    pub required: bool,
    /// JSON Schema type (e.g., "string", "number")
    pub param_type: String,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, param: ToolParameter) -> Self {
        self.parameters.push(param);
        self
    }

    /// JSON Schema for the tool's arguments.
    pub fn input_schema(&self) -> serde_json::Value {
        let properties: serde_json::Map<String, serde_json::Value> = self
            .parameters
            .iter()
            .map(|p| {
                (
                    p.name.clone(),
                    serde_json::json!({
                        "type": p.param_type,
                        "description": p.description,
                    }),
                )
            })
            .collect();

        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

impl ToolParameter {
    pub fn new(name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required,
            param_type: "string".to_string(),
        }
    }

    pub fn with_type(mut self, param_type: impl Into<String>) -> Self {
        self.param_type = param_type.into();
        self
    }
}

/// Specification of the tools the bridge serves
#[derive(Debug, Clone, Default)]
pub struct ToolSpec {
    tools: Vec<ToolDefinition>,
}

impl ToolSpec {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// The bridge's three tools, in a stable order.
    pub fn bridge_tools() -> Self {
        BridgeTool::ALL
            .into_iter()
            .fold(Self::new(), |spec, tool| spec.register(tool.definition()))
    }

    pub fn register(mut self, tool: ToolDefinition) -> Self {
        self.tools.retain(|t| t.name != tool.name);
        self.tools.push(tool);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.iter().find(|t| t.name == name)
    }

    pub fn all(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.iter().map(|t| t.name.as_str())
    }
}

/// A call to a tool with arguments, as received from the Host side
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Name of the tool to call
    #[serde(rename = "name")]
    pub tool_name: String,
    /// Arguments passed to the tool
    #[serde(default)]
    pub arguments: HashMap<String, serde_json::Value>,
}

impl ToolCall {
    pub fn new(tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments: HashMap::new(),
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    /// Get a string argument
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }
}
