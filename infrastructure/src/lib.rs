//! Infrastructure layer for a2a-bridge
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: configuration file loading, the HTTP mesh
//! transport, the stdio Host server and the JSONL interaction log.

pub mod config;
pub mod host;
pub mod logging;
pub mod mesh;

// Re-export commonly used types
pub use config::{ConfigLoader, ConfigValidationError, FileConfig};
pub use host::{HostProtocolError, StdioHostServer};
pub use logging::JsonlInteractionLogger;
pub use mesh::HttpMeshTransport;
