//! Trust & Rate Policy
//!
//! Decides whether a call may proceed and keeps trust posture up to date
//! after it finishes. The only component that can deny a call.
//!
//! Rate windows are fixed windows keyed by `(tool, agent)`, or by the tool
//! alone for operations without a target agent. Checking a window and
//! taking a unit of quota happen under one lock in
//! [`admit_and_record`](TrustRatePolicy::admit_and_record), so concurrent
//! calls can never overshoot a limit.

use super::agent_registry::AgentRegistry;
use crate::config::BridgeConfig;
use bridge_domain::{
    AgentName, AgentRecord, BridgeError, PolicyDecision, RateKey, RateLimit, RateWindow,
    ToolInvocationContext, TrustRules, TrustZone,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

/// Trust posture after an outcome was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutcomeReport {
    pub previous_zone: TrustZone,
    pub zone: TrustZone,
    pub consecutive_failures: u32,
}

impl OutcomeReport {
    pub fn demoted(&self) -> bool {
        self.zone < self.previous_zone
    }
}

/// Admission and trust bookkeeping shared by all invocations.
#[derive(Debug)]
pub struct TrustRatePolicy {
    registry: Arc<AgentRegistry>,
    windows: Mutex<HashMap<RateKey, RateWindow>>,
    default_limit: RateLimit,
    tool_limits: HashMap<String, RateLimit>,
    rules: TrustRules,
}

impl TrustRatePolicy {
    pub fn new(registry: Arc<AgentRegistry>, config: &BridgeConfig) -> Self {
        Self {
            registry,
            windows: Mutex::new(HashMap::new()),
            default_limit: config.default_rate_limit,
            tool_limits: config.tool_rate_limits.clone(),
            rules: config.trust_rules,
        }
    }

    pub fn rules(&self) -> TrustRules {
        self.rules
    }

    /// Quota for a tool; unknown tools get the default.
    pub fn limit_for(&self, tool: &str) -> RateLimit {
        self.tool_limits
            .get(tool)
            .copied()
            .unwrap_or(self.default_limit)
    }

    fn key_for(tool: &str, agent: Option<&AgentName>) -> RateKey {
        match agent {
            Some(name) => RateKey::for_agent(tool, name),
            None => RateKey::for_tool(tool),
        }
    }

    /// Zone as currently registered; `agent` may be a stale snapshot.
    fn current_zone(&self, agent: &AgentRecord) -> TrustZone {
        self.registry
            .resolve(agent.name.as_str())
            .map(|record| record.trust_zone)
            .unwrap_or(agent.trust_zone)
    }

    /// Evaluates admission without consuming quota.
    ///
    /// `agent` is `None` for discovery and listing, which only face the
    /// coarse per-tool window.
    pub fn admit(
        &self,
        context: &ToolInvocationContext,
        agent: Option<&AgentRecord>,
    ) -> PolicyDecision {
        let tool = context.tool_name();
        let key = Self::key_for(tool, agent.map(|a| &a.name));
        let now = context.requested_at();

        let windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        let exhausted = match windows.get(&key) {
            Some(window) => window.is_exhausted(now),
            None => self.limit_for(tool).limit == 0,
        };

        TrustRules::evaluate(agent.map(|a| self.current_zone(a)), exhausted)
    }

    /// Takes one unit of quota. Called only after an `Allow`.
    pub fn record_admission(&self, tool: &str, agent: Option<&AgentName>, at: DateTime<Utc>) {
        let key = Self::key_for(tool, agent);
        let limit = self.limit_for(tool);
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        let window = windows
            .entry(key)
            .or_insert_with(|| RateWindow::new(limit, at));
        if !window.try_acquire(at) {
            warn!(tool, "Admission recorded against an exhausted window");
        }
    }

    /// [`admit`](Self::admit) and [`record_admission`](Self::record_admission)
    /// as one atomic step.
    pub fn admit_and_record(
        &self,
        context: &ToolInvocationContext,
        agent: Option<&AgentRecord>,
    ) -> PolicyDecision {
        let tool = context.tool_name();
        let key = Self::key_for(tool, agent.map(|a| &a.name));
        let now = context.requested_at();
        let limit = self.limit_for(tool);

        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        let window = windows
            .entry(key)
            .or_insert_with(|| RateWindow::new(limit, now));

        let zone = agent.map(|a| self.current_zone(a));
        let decision = TrustRules::evaluate(zone, window.is_exhausted(now));
        if decision.is_allowed() {
            window.try_acquire(now);
        }

        if let Some(reason) = decision.deny_reason() {
            debug!(
                tool,
                agent = agent.map(|a| a.name.as_str()),
                reason = reason.as_str(),
                "Admission denied"
            );
        }
        decision
    }

    /// Records an interaction outcome and applies automatic demotion.
    ///
    /// The failure count and the zone change are applied under the
    /// registry's write lock. Demotion happens each time the streak reaches a
    /// multiple of the failure threshold; nothing here ever promotes.
    pub fn on_outcome(
        &self,
        name: &str,
        success: bool,
        at: DateTime<Utc>,
    ) -> Result<OutcomeReport, BridgeError> {
        let rules = self.rules;
        let report = self.registry.update(name, |record| {
            let previous_zone = record.trust_zone;
            record.record_outcome(success, at);
            if !success && rules.should_demote(record.consecutive_failures) {
                record.trust_zone = record.trust_zone.demoted();
            }
            OutcomeReport {
                previous_zone,
                zone: record.trust_zone,
                consecutive_failures: record.consecutive_failures,
            }
        })?;

        if report.demoted() {
            warn!(
                agent = name,
                from = %report.previous_zone,
                to = %report.zone,
                failures = report.consecutive_failures,
                "Agent demoted"
            );
        }
        Ok(report)
    }

    /// Explicit zone assignment. Returns the previous zone.
    pub fn set_zone(&self, name: &str, zone: TrustZone) -> Result<TrustZone, BridgeError> {
        let previous = self.registry.update(name, |record| {
            std::mem::replace(&mut record.trust_zone, zone)
        })?;
        info!(agent = name, from = %previous, to = %zone, "Trust zone set");
        Ok(previous)
    }

    /// Explicit one-step promotion. Returns the new zone.
    pub fn promote(&self, name: &str) -> Result<TrustZone, BridgeError> {
        let zone = self.registry.update(name, |record| {
            record.trust_zone = record.trust_zone.promoted();
            record.trust_zone
        })?;
        info!(agent = name, to = %zone, "Agent promoted");
        Ok(zone)
    }

    /// Quota left for `(tool, agent)` at `now`.
    pub fn remaining(&self, tool: &str, agent: Option<&AgentName>, now: DateTime<Utc>) -> u32 {
        let key = Self::key_for(tool, agent);
        let windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        match windows.get(&key) {
            Some(window) => window.remaining(now),
            None => self.limit_for(tool).limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_domain::{DenyReason, ToolCall};
    use chrono::{TimeDelta, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn setup(config: BridgeConfig) -> (Arc<AgentRegistry>, TrustRatePolicy) {
        let registry = Arc::new(AgentRegistry::new());
        registry
            .register("Elara", "https://elara.a2a.mesh", TrustZone::Experimental, t0())
            .unwrap();
        let policy = TrustRatePolicy::new(Arc::clone(&registry), &config);
        (registry, policy)
    }

    fn send_at(at: DateTime<Utc>) -> ToolInvocationContext {
        let call = ToolCall::new("a2a_send")
            .with_arg("agent_name", "Elara")
            .with_arg("message", "hi");
        ToolInvocationContext::from_call(call, "host", at).unwrap()
    }

    #[test]
    fn test_nth_allowed_n_plus_first_denied() {
        let config = BridgeConfig::default().with_tool_rate_limit("a2a_send", RateLimit::new(3, 60));
        let (registry, policy) = setup(config);
        let agent = registry.resolve("Elara").unwrap();

        for _ in 0..3 {
            assert!(policy.admit_and_record(&send_at(t0()), Some(&agent)).is_allowed());
        }
        assert_eq!(
            policy.admit_and_record(&send_at(t0()), Some(&agent)),
            PolicyDecision::Deny(DenyReason::RateLimited)
        );
    }

    #[test]
    fn test_stale_snapshot_sees_blocked_zone() {
        let (registry, policy) = setup(BridgeConfig::default());
        let snapshot = registry.resolve("Elara").unwrap();
        policy.set_zone("Elara", TrustZone::Blocked).unwrap();

        assert_eq!(snapshot.trust_zone, TrustZone::Experimental);
        assert_eq!(
            policy.admit(&send_at(t0()), Some(&snapshot)),
            PolicyDecision::Deny(DenyReason::ZoneBlocked)
        );
        assert_eq!(
            policy.admit_and_record(&send_at(t0()), Some(&snapshot)),
            PolicyDecision::Deny(DenyReason::ZoneBlocked)
        );
        assert_eq!(policy.remaining("a2a_send", Some(&snapshot.name), t0()), 60);
    }

    #[test]
    fn test_window_resets_after_period() {
        let config = BridgeConfig::default().with_tool_rate_limit("a2a_send", RateLimit::new(1, 60));
        let (registry, policy) = setup(config);
        let agent = registry.resolve("Elara").unwrap();

        assert!(policy.admit_and_record(&send_at(t0()), Some(&agent)).is_allowed());
        assert!(!policy.admit(&send_at(t0() + TimeDelta::seconds(59)), Some(&agent)).is_allowed());
        assert!(policy.admit_and_record(&send_at(t0() + TimeDelta::seconds(60)), Some(&agent)).is_allowed());
    }

    #[test]
    fn test_split_admit_and_record() {
        let config = BridgeConfig::default().with_tool_rate_limit("a2a_send", RateLimit::new(2, 60));
        let (registry, policy) = setup(config);
        let agent = registry.resolve("Elara").unwrap();

        assert!(policy.admit(&send_at(t0()), Some(&agent)).is_allowed());
        policy.record_admission("a2a_send", Some(&agent.name), t0());
        policy.record_admission("a2a_send", Some(&agent.name), t0());
        assert_eq!(policy.remaining("a2a_send", Some(&agent.name), t0()), 0);
        assert!(!policy.admit(&send_at(t0()), Some(&agent)).is_allowed());
    }

    #[test]
    fn test_blocked_denied_regardless_of_window() {
        let (registry, policy) = setup(BridgeConfig::default());
        policy.set_zone("Elara", TrustZone::Blocked).unwrap();
        let agent = registry.resolve("Elara").unwrap();

        assert_eq!(
            policy.admit(&send_at(t0()), Some(&agent)),
            PolicyDecision::Deny(DenyReason::ZoneBlocked)
        );
        assert_eq!(policy.remaining("a2a_send", Some(&agent.name), t0()), 60);
    }

    #[test]
    fn test_zero_limit_always_denies() {
        let config = BridgeConfig::default().with_tool_rate_limit("a2a_send", RateLimit::new(0, 60));
        let (registry, policy) = setup(config);
        let agent = registry.resolve("Elara").unwrap();

        assert!(!policy.admit(&send_at(t0()), Some(&agent)).is_allowed());
        assert!(!policy.admit_and_record(&send_at(t0()), Some(&agent)).is_allowed());
    }

    #[test]
    fn test_windows_are_per_agent() {
        let config = BridgeConfig::default().with_tool_rate_limit("a2a_send", RateLimit::new(1, 60));
        let (registry, policy) = setup(config);
        registry
            .register("Orin", "https://orin.a2a.mesh", TrustZone::Experimental, t0())
            .unwrap();
        let elara = registry.resolve("Elara").unwrap();
        let orin = registry.resolve("Orin").unwrap();

        assert!(policy.admit_and_record(&send_at(t0()), Some(&elara)).is_allowed());
        assert!(policy.admit_and_record(&send_at(t0()), Some(&orin)).is_allowed());
        assert!(!policy.admit_and_record(&send_at(t0()), Some(&elara)).is_allowed());
    }

    #[test]
    fn test_demotion_is_monotonic_under_failures() {
        let (_registry, policy) = setup(BridgeConfig::default().with_trust_rules(TrustRules::new(2)));
        policy.set_zone("Elara", TrustZone::Trusted).unwrap();

        let mut zones = Vec::new();
        for _ in 0..6 {
            zones.push(policy.on_outcome("Elara", false, t0()).unwrap().zone);
        }

        assert_eq!(
            zones,
            vec![
                TrustZone::Trusted,
                TrustZone::Experimental,
                TrustZone::Experimental,
                TrustZone::Blocked,
                TrustZone::Blocked,
                TrustZone::Blocked,
            ]
        );
        assert!(zones.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn test_success_never_promotes() {
        let (_registry, policy) = setup(BridgeConfig::default().with_trust_rules(TrustRules::new(1)));
        let report = policy.on_outcome("Elara", false, t0()).unwrap();
        assert_eq!(report.zone, TrustZone::Blocked);
        assert!(report.demoted());

        let report = policy.on_outcome("Elara", true, t0()).unwrap();
        assert_eq!(report.zone, TrustZone::Blocked);
        assert_eq!(report.consecutive_failures, 0);

        assert_eq!(policy.promote("Elara").unwrap(), TrustZone::Experimental);
    }

    #[test]
    fn test_outcome_for_unknown_agent() {
        let (_registry, policy) = setup(BridgeConfig::default());
        let err = policy.on_outcome("Ghost", false, t0()).unwrap_err();
        assert_eq!(err.reason(), "not-found");
    }

    #[test]
    fn test_concurrent_admissions_never_exceed_limit() {
        let config = BridgeConfig::default().with_tool_rate_limit("a2a_send", RateLimit::new(5, 60));
        let (registry, policy) = setup(config);
        let policy = Arc::new(policy);
        let agent = registry.resolve("Elara").unwrap();

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let policy = Arc::clone(&policy);
                let agent = agent.clone();
                std::thread::spawn(move || {
                    policy
                        .admit_and_record(&send_at(t0()), Some(&agent))
                        .is_allowed()
                })
            })
            .collect();

        let allowed = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|allowed| *allowed)
            .count();
        assert_eq!(allowed, 5);
    }
}
