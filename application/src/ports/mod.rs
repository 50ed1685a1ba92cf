//! Port definitions (interfaces for external adapters)

pub mod interaction_logger;
pub mod mesh_transport;
