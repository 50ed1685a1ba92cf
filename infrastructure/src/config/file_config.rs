//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted to the application's
//! [`BridgeConfig`] by [`FileConfig::to_bridge_config`], which is where
//! validation happens.

use bridge_application::BridgeConfig;
use bridge_domain::{
    EtiquetteRules, PersonalityMode, RateLimit, ToneHint, TrustRules, TrustZone, ZoneSeed,
    ZoneSeeds,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("bridge.identity cannot be empty")]
    EmptyIdentity,

    #[error("bridge.dispatch_timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("rate limit period_seconds cannot be 0 ({0})")]
    InvalidPeriod(String),

    #[error("trust.failure_threshold cannot be 0")]
    InvalidThreshold,

    #[error("invalid agent pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("unknown trust zone '{0}' (expected trusted, experimental or blocked)")]
    UnknownZone(String),

    #[error("unknown personality mode '{0}'")]
    UnknownPersonality(String),

    #[error("unknown tone '{tone}' in [etiquette.{mode}]")]
    UnknownTone { mode: String, tone: String },
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub bridge: FileBridgeConfig,
    pub rate_limits: FileRateLimitsConfig,
    pub trust: FileTrustConfig,
    /// Etiquette overrides keyed by personality mode
    pub etiquette: BTreeMap<String, FileEtiquetteRules>,
}

/// `[bridge]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBridgeConfig {
    /// Sender name on outbound envelopes
    pub identity: String,
    /// Upper bound on one dispatch, in seconds
    pub dispatch_timeout_seconds: u64,
}

impl Default for FileBridgeConfig {
    fn default() -> Self {
        Self {
            identity: "mcp-a2a-bridge".to_string(),
            dispatch_timeout_seconds: 30,
        }
    }
}

/// One `{ limit, period_seconds }` entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRateLimit {
    pub limit: u32,
    pub period_seconds: u64,
}

impl Default for FileRateLimit {
    fn default() -> Self {
        Self {
            limit: 60,
            period_seconds: 60,
        }
    }
}

impl FileRateLimit {
    fn to_rate_limit(self, label: &str) -> Result<RateLimit, ConfigValidationError> {
        if self.period_seconds == 0 {
            return Err(ConfigValidationError::InvalidPeriod(label.to_string()));
        }
        Ok(RateLimit::new(self.limit, self.period_seconds))
    }
}

/// `[rate_limits]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRateLimitsConfig {
    /// Quota for tools without their own entry
    pub default: FileRateLimit,
    /// Per-tool quotas
    pub tools: BTreeMap<String, FileRateLimit>,
}

/// `[trust]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileTrustConfig {
    pub failure_threshold: u32,
    pub seeds: Vec<FileZoneSeed>,
}

impl Default for FileTrustConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            seeds: Vec::new(),
        }
    }
}

/// `[[trust.seeds]]` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileZoneSeed {
    /// Glob over agent names, matched case-insensitively
    pub pattern: String,
    pub zone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personality: Option<String>,
}

/// `[etiquette.<mode>]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEtiquetteRules {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
    pub caution_flags: Vec<String>,
    pub base_delay_ms: u64,
}

impl FileConfig {
    /// Validates the file and converts it to the runtime configuration.
    pub fn to_bridge_config(&self) -> Result<BridgeConfig, ConfigValidationError> {
        let identity = self.bridge.identity.trim();
        if identity.is_empty() {
            return Err(ConfigValidationError::EmptyIdentity);
        }
        if self.bridge.dispatch_timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }
        if self.trust.failure_threshold == 0 {
            return Err(ConfigValidationError::InvalidThreshold);
        }

        let default_rate_limit = self.rate_limits.default.to_rate_limit("default")?;
        let tool_rate_limits = self
            .rate_limits
            .tools
            .iter()
            .map(|(tool, limit)| Ok((tool.clone(), limit.to_rate_limit(tool)?)))
            .collect::<Result<HashMap<_, _>, ConfigValidationError>>()?;

        let seeds = self
            .trust
            .seeds
            .iter()
            .map(Self::parse_seed)
            .collect::<Result<Vec<_>, _>>()?;

        let etiquette = self
            .etiquette
            .iter()
            .map(|(mode, rules)| Self::parse_etiquette(mode, rules))
            .collect::<Result<HashMap<_, _>, _>>()?;

        Ok(BridgeConfig {
            identity: identity.to_string(),
            dispatch_timeout: Duration::from_secs(self.bridge.dispatch_timeout_seconds),
            default_rate_limit,
            tool_rate_limits,
            trust_rules: TrustRules::new(self.trust.failure_threshold),
            zone_seeds: ZoneSeeds::new(seeds),
            etiquette,
        })
    }

    fn parse_seed(seed: &FileZoneSeed) -> Result<ZoneSeed, ConfigValidationError> {
        let zone: TrustZone = seed
            .zone
            .parse()
            .map_err(|_| ConfigValidationError::UnknownZone(seed.zone.clone()))?;

        let personality = seed.personality.as_deref().map(|p| {
            let mode = PersonalityMode::parse_or_neutral(p);
            if mode.as_str() != p.trim().to_lowercase() {
                warn!(pattern = %seed.pattern, personality = p, "Unknown personality; using neutral");
            }
            mode
        });

        ZoneSeed::new(&seed.pattern, zone, personality).map_err(|e| {
            ConfigValidationError::InvalidPattern {
                pattern: seed.pattern.clone(),
                message: e.to_string(),
            }
        })
    }

    fn parse_etiquette(
        mode: &str,
        rules: &FileEtiquetteRules,
    ) -> Result<(PersonalityMode, EtiquetteRules), ConfigValidationError> {
        let personality: PersonalityMode = mode
            .parse()
            .map_err(|_| ConfigValidationError::UnknownPersonality(mode.to_string()))?;

        let tone = rules
            .tone
            .as_deref()
            .map(|t| {
                t.parse::<ToneHint>()
                    .map_err(|_| ConfigValidationError::UnknownTone {
                        mode: mode.to_string(),
                        tone: t.to_string(),
                    })
            })
            .transpose()?;

        Ok((
            personality,
            EtiquetteRules {
                tone,
                caution_flags: rules.caution_flags.clone(),
                base_delay_ms: rules.base_delay_ms,
            },
        ))
    }
}
