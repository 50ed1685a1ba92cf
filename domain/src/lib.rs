//! Domain layer for a2a-bridge
//!
//! This crate contains the core rules of the bridge: agent identity and trust
//! posture, admission rules, etiquette advice and the translation between
//! Host tool calls and Mesh messages. It has no dependencies on
//! infrastructure or presentation concerns and performs no I/O.
//!
//! # Core Concepts
//!
//! ## Trust zones
//!
//! Every remote agent sits in one of three zones: `trusted`, `experimental`
//! (the default for newly discovered agents) or `blocked`. Failures demote an
//! agent automatically; promotion is always an explicit external action.
//!
//! ## Governance that decides vs. governance that comments
//!
//! - **Policy** ([`policy`]): admission rules. Can deny a call.
//! - **Etiquette** ([`etiquette`]): advisory annotations. Never changes
//!   whether or where a call goes.

pub mod agent;
pub mod bridge;
pub mod core;
pub mod etiquette;
pub mod mesh;
pub mod policy;
pub mod tool;

// Re-export commonly used types
pub use agent::{
    entities::{AgentCard, AgentRecord, RegistrationStatus},
    value_objects::{AgentEndpoint, AgentName, PersonalityMode, TrustZone},
};
pub use bridge::{
    phase::{BridgePhase, PhaseTrail},
    response::{BridgeFailure, BridgeResponse, BridgeStatus},
};
pub use core::error::BridgeError;
pub use etiquette::{
    advisor::{EtiquetteAdvisor, EtiquetteRules},
    annotation::{EtiquetteAnnotation, ToneHint},
};
pub use mesh::{
    envelope::{CorrelationId, MeshEnvelope, MeshMessage, MessagePart, MessageRole},
    translator::{ProtocolTranslator, TranslateError},
};
pub use policy::{
    decision::{DenyReason, PolicyDecision},
    rate_window::{RateKey, RateLimit, RateWindow},
    seeds::{ZoneSeed, ZoneSeeds},
    trust::TrustRules,
};
pub use tool::{
    context::ToolInvocationContext,
    entities::{BridgeTool, ToolCall, ToolDefinition, ToolParameter, ToolSpec},
    traits::{DefaultToolValidator, ToolValidator},
    value_objects::{ToolResult, ToolResultMetadata},
};
