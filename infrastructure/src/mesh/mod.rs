//! Mesh-side adapters

mod http_transport;

pub use http_transport::{AGENT_CARD_PATH, HttpMeshTransport, MESSAGE_PATH};
