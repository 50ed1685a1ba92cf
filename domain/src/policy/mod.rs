//! Governance rules that decide.
//!
//! Everything here is pure: the application layer owns the shared state
//! (rate windows, registry) and calls into these types under its locks.
//!
//! - [`RateWindow`]: fixed-window call quota per `(tool, agent)`
//! - [`PolicyDecision`]: admission verdict, with a [`DenyReason`]
//! - [`TrustRules`]: admission ordering and failure-driven demotion
//! - [`ZoneSeeds`]: startup mapping from agent-name patterns to zones

pub mod decision;
pub mod rate_window;
pub mod seeds;
pub mod trust;

pub use decision::{DenyReason, PolicyDecision};
pub use rate_window::{RateKey, RateLimit, RateWindow};
pub use seeds::{ZoneSeed, ZoneSeeds};
pub use trust::TrustRules;
