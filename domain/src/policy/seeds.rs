//! Startup trust seeding
//!
//! Operators map agent-name glob patterns to an initial trust zone (and
//! optionally a personality). Seeds apply only when a record is created.

use crate::agent::value_objects::{AgentName, PersonalityMode, TrustZone};
use crate::core::error::BridgeError;
use glob::{MatchOptions, Pattern};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// One `pattern → zone` mapping.
#[derive(Debug, Clone)]
pub struct ZoneSeed {
    pattern: Pattern,
    pub zone: TrustZone,
    pub personality: Option<PersonalityMode>,
}

impl ZoneSeed {
    pub fn new(
        pattern: &str,
        zone: TrustZone,
        personality: Option<PersonalityMode>,
    ) -> Result<Self, BridgeError> {
        let pattern = Pattern::new(pattern.trim()).map_err(|e| {
            BridgeError::Validation(format!("invalid agent pattern '{}': {}", pattern, e))
        })?;
        Ok(Self {
            pattern,
            zone,
            personality,
        })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn matches(&self, name: &AgentName) -> bool {
        self.pattern.matches_with(name.as_str(), MATCH_OPTIONS)
    }
}

/// Ordered seed list; the first matching seed wins.
#[derive(Debug, Clone, Default)]
pub struct ZoneSeeds(Vec<ZoneSeed>);

impl ZoneSeeds {
    pub fn new(seeds: Vec<ZoneSeed>) -> Self {
        Self(seeds)
    }

    pub fn lookup(&self, name: &AgentName) -> Option<&ZoneSeed> {
        self.0.iter().find(|seed| seed.matches(name))
    }

    /// Initial zone for a newly discovered agent.
    pub fn zone_for(&self, name: &AgentName) -> TrustZone {
        self.lookup(name).map(|seed| seed.zone).unwrap_or_default()
    }

    pub fn personality_for(&self, name: &AgentName) -> Option<PersonalityMode> {
        self.lookup(name).and_then(|seed| seed.personality)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
