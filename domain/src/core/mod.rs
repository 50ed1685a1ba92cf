//! Core domain concepts shared across all subdomains.
//!
//! - [`error::BridgeError`]: the bridge's error taxonomy

pub mod error;
