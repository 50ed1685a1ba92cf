//! Application-level configuration.
//!
//! - [`BridgeConfig`]: quotas, trust rules, seeds, etiquette overrides and
//!   dispatch bounds, read-only after startup

pub mod bridge_config;

pub use bridge_config::BridgeConfig;
