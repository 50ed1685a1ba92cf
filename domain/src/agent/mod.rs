//! Agent domain module
//!
//! Remote agents known to the bridge: their identity ([`AgentName`],
//! [`AgentEndpoint`]), their published [`AgentCard`], and the
//! [`AgentRecord`] the registry keeps for each of them.
//!
//! # Trust zones
//!
//! | Zone | Admission | Reached by |
//! |------|-----------|------------|
//! | `trusted` | allowed | external promotion only |
//! | `experimental` | allowed | default for new agents |
//! | `blocked` | always denied | demotion after repeated failures, or configuration |
//!
//! Zones only move down automatically. Moving up is an explicit,
//! external decision.

pub mod entities;
pub mod value_objects;

pub use entities::{AgentCard, AgentRecord, RegistrationStatus};
pub use value_objects::{AgentEndpoint, AgentName, PersonalityMode, TrustZone};
