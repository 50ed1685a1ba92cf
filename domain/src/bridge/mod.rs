//! Bridge invocation state and result shape

pub mod phase;
pub mod response;

pub use phase::{BridgePhase, PhaseTrail};
pub use response::{BridgeFailure, BridgeResponse, BridgeStatus};
