//! Application layer for a2a-bridge
//!
//! This crate contains the stateful services (agent registry, trust & rate
//! policy), port definitions, the bridge use case and runtime configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod services;
pub mod use_cases;

// Re-export commonly used types
pub use config::BridgeConfig;
pub use ports::{
    interaction_logger::{InteractionEvent, InteractionLogger, NoInteractionLogger},
    mesh_transport::{MeshTransport, TransportError},
};
pub use services::{
    agent_registry::{AgentListing, AgentRegistry, Registration},
    trust_policy::{OutcomeReport, TrustRatePolicy},
};
pub use use_cases::bridge_call::BridgeOrchestrator;
