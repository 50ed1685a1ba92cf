//! Trust rules
//!
//! Admission is evaluated in a fixed order, first match wins:
//!
//! 1. target agent is `blocked` → deny `zone-blocked`
//! 2. rate window at or above its limit → deny `rate-limited`
//! 3. otherwise → allow
//!
//! Demotion is automatic and one step at a time; promotion never is.

use super::decision::{DenyReason, PolicyDecision};
use crate::agent::value_objects::TrustZone;
use serde::{Deserialize, Serialize};

/// Failure-driven trust rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustRules {
    /// Consecutive failures that trigger a one-step demotion.
    pub failure_threshold: u32,
}

impl TrustRules {
    pub fn new(failure_threshold: u32) -> Self {
        Self { failure_threshold }
    }

    /// Whether a failure streak of this length demotes the agent.
    ///
    /// Fires every time the streak reaches a multiple of the threshold, so
    /// an agent that keeps failing keeps sliding down. A threshold of zero
    /// disables demotion.
    pub fn should_demote(&self, consecutive_failures: u32) -> bool {
        self.failure_threshold > 0
            && consecutive_failures > 0
            && consecutive_failures % self.failure_threshold == 0
    }

    /// Ordered admission evaluation.
    ///
    /// `zone` is `None` for operations without a target agent.
    pub fn evaluate(zone: Option<TrustZone>, window_exhausted: bool) -> PolicyDecision {
        if zone.is_some_and(|z| z.is_blocked()) {
            return PolicyDecision::Deny(DenyReason::ZoneBlocked);
        }
        if window_exhausted {
            return PolicyDecision::Deny(DenyReason::RateLimited);
        }
        PolicyDecision::Allow
    }
}
