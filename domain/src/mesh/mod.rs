//! Mesh side of the bridge
//!
//! - [`envelope`]: outbound messages and correlation ids
//! - [`wire`]: JSON-RPC reply shapes
//! - [`translator`]: Host tool call ↔ mesh message conversion

pub mod envelope;
pub mod translator;
pub mod wire;

pub use envelope::{CorrelationId, MeshEnvelope, MeshMessage, MessagePart, MessageRole};
pub use translator::{ProtocolTranslator, TranslateError};
pub use wire::{MeshResponse, MeshRpcError};
