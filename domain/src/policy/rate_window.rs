//! Fixed-window rate limiting
//!
//! A [`RateWindow`] counts admissions for one [`RateKey`]. The window opens
//! at the first admission and resets as a whole once `period_seconds` have
//! elapsed since it opened.

use crate::agent::value_objects::AgentName;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Quota of `limit` calls per `period_seconds`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimit {
    pub limit: u32,
    pub period_seconds: u64,
}

impl RateLimit {
    pub fn new(limit: u32, period_seconds: u64) -> Self {
        Self {
            limit,
            period_seconds,
        }
    }

    pub fn period(&self) -> TimeDelta {
        i64::try_from(self.period_seconds)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX)
    }
}

/// Identifies a window: a tool, optionally scoped to one agent.
///
/// Agent names are case-folded, so `Elara` and `elara` share a window.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RateKey {
    tool: String,
    agent: Option<String>,
}

impl RateKey {
    pub fn for_agent(tool: impl Into<String>, agent: &AgentName) -> Self {
        Self {
            tool: tool.into(),
            agent: Some(agent.key()),
        }
    }

    /// Coarse per-tool key, used when there is no target agent.
    pub fn for_tool(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            agent: None,
        }
    }
}

/// Admission counter for one key.
///
/// `count` never exceeds `limit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateWindow {
    window_start: DateTime<Utc>,
    count: u32,
    limit: RateLimit,
}

impl RateWindow {
    pub fn new(limit: RateLimit, now: DateTime<Utc>) -> Self {
        Self {
            window_start: now,
            count: 0,
            limit,
        }
    }

    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.window_start) >= self.limit.period()
    }

    /// Count as seen at `now`, treating an elapsed window as reset.
    fn effective_count(&self, now: DateTime<Utc>) -> u32 {
        if self.is_expired(now) { 0 } else { self.count }
    }

    /// Whether another admission at `now` would exceed the quota.
    ///
    /// A `limit` of zero is always exhausted.
    pub fn is_exhausted(&self, now: DateTime<Utc>) -> bool {
        self.effective_count(now) >= self.limit.limit
    }

    pub fn remaining(&self, now: DateTime<Utc>) -> u32 {
        self.limit.limit.saturating_sub(self.effective_count(now))
    }

    /// Takes one unit of quota, resetting the window first if it elapsed.
    ///
    /// Returns `false` (and changes nothing but the reset) when exhausted.
    pub fn try_acquire(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_expired(now) {
            self.window_start = now;
            self.count = 0;
        }
        if self.count >= self.limit.limit {
            return false;
        }
        self.count += 1;
        true
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn limit(&self) -> RateLimit {
        self.limit
    }

    pub fn window_start(&self) -> DateTime<Utc> {
        self.window_start
    }
}
