//! Tool domain module
//!
//! The Host-facing side of the bridge: the three tools it serves, the
//! shape of an incoming [`ToolCall`], and the immutable
//! [`ToolInvocationContext`] every governance decision is made against.
//!
//! ```text
//! ┌──────────────┐    ┌───────────────────────┐    ┌──────────────┐
//! │ ToolCall     │───▶│ ToolInvocationContext │───▶│ ToolResult   │
//! │ (Host input) │    │ (one per call)        │    │ (mesh reply) │
//! └──────────────┘    └───────────────────────┘    └──────────────┘
//! ```
//!
//! | Tool | Target agent | Mesh message |
//! |------|--------------|--------------|
//! | `a2a_discover` | - | no (registry upsert) |
//! | `a2a_list_agents` | - | no (registry read) |
//! | `a2a_send` | yes | yes |

pub mod context;
pub mod entities;
pub mod traits;
pub mod value_objects;

pub use context::ToolInvocationContext;
pub use entities::{
    A2A_DISCOVER, A2A_LIST_AGENTS, A2A_SEND, BridgeTool, ToolCall, ToolDefinition, ToolParameter,
    ToolSpec,
};
pub use traits::{DefaultToolValidator, ToolValidator};
pub use value_objects::{ToolResult, ToolResultMetadata};
