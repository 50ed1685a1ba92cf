//! Bridge configuration, as consumed by the core.
//!
//! [`BridgeConfig`] is built once at startup (from files, by the
//! infrastructure layer, or directly in tests) and is read-only afterwards.

use bridge_domain::{EtiquetteRules, PersonalityMode, RateLimit, TrustRules, ZoneSeeds};
use std::collections::HashMap;
use std::time::Duration;

/// Runtime configuration of the bridge.
///
/// | Concern | Field |
/// |---------|-------|
/// | Outbound identity | `identity` |
/// | Dispatch bound | `dispatch_timeout` |
/// | Quotas | `default_rate_limit`, `tool_rate_limits` |
/// | Trust | `trust_rules`, `zone_seeds` |
/// | Etiquette | `etiquette` (overrides of the built-in rules) |
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Sender name on outbound envelopes.
    pub identity: String,
    /// Upper bound on one dispatch to a remote agent.
    pub dispatch_timeout: Duration,
    /// Quota for tools without an entry in `tool_rate_limits`.
    pub default_rate_limit: RateLimit,
    pub tool_rate_limits: HashMap<String, RateLimit>,
    pub trust_rules: TrustRules,
    /// Initial zone and personality by agent-name pattern.
    pub zone_seeds: ZoneSeeds,
    pub etiquette: HashMap<PersonalityMode, EtiquetteRules>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            identity: "mcp-a2a-bridge".to_string(),
            dispatch_timeout: Duration::from_secs(30),
            default_rate_limit: RateLimit::new(60, 60),
            tool_rate_limits: HashMap::new(),
            trust_rules: TrustRules::new(3),
            zone_seeds: ZoneSeeds::default(),
            etiquette: HashMap::new(),
        }
    }
}

impl BridgeConfig {
    // ==================== Builder Methods ====================

    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = identity.into();
        self
    }

    pub fn with_dispatch_timeout(mut self, timeout: Duration) -> Self {
        self.dispatch_timeout = timeout;
        self
    }

    pub fn with_default_rate_limit(mut self, limit: RateLimit) -> Self {
        self.default_rate_limit = limit;
        self
    }

    pub fn with_tool_rate_limit(mut self, tool: impl Into<String>, limit: RateLimit) -> Self {
        self.tool_rate_limits.insert(tool.into(), limit);
        self
    }

    pub fn with_trust_rules(mut self, rules: TrustRules) -> Self {
        self.trust_rules = rules;
        self
    }

    pub fn with_zone_seeds(mut self, seeds: ZoneSeeds) -> Self {
        self.zone_seeds = seeds;
        self
    }

    pub fn with_etiquette(mut self, mode: PersonalityMode, rules: EtiquetteRules) -> Self {
        self.etiquette.insert(mode, rules);
        self
    }

    // ==================== Lookups ====================

    /// Quota for a tool, falling back to the default.
    pub fn rate_limit_for(&self, tool: &str) -> RateLimit {
        self.tool_rate_limits
            .get(tool)
            .copied()
            .unwrap_or(self.default_rate_limit)
    }
}
