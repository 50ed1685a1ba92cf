//! Admission decisions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why an invocation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DenyReason {
    /// Target agent sits in the `blocked` zone.
    ZoneBlocked,
    /// The `(tool, agent)` window has no quota left.
    RateLimited,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::ZoneBlocked => "zone-blocked",
            DenyReason::RateLimited => "rate-limited",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Verdict of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDecision {
    Allow,
    Deny(DenyReason),
}

impl PolicyDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, PolicyDecision::Allow)
    }

    pub fn deny_reason(&self) -> Option<DenyReason> {
        match self {
            PolicyDecision::Allow => None,
            PolicyDecision::Deny(reason) => Some(*reason),
        }
    }
}
