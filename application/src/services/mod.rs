//! Stateful services shared by all invocations
//!
//! - [`agent_registry`]: the directory of known agents
//! - [`trust_policy`]: admission, rate windows and trust updates

pub mod agent_registry;
pub mod trust_policy;
