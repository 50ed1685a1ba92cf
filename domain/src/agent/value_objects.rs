//! Agent value objects - immutable identity and classification types.
//!
//! # Identity
//! - [`AgentName`] - Logical agent name, compared case-insensitively
//! - [`AgentEndpoint`] - Validated base URI of a remote agent
//!
//! # Classification
//! - [`TrustZone`] - Coarse trust classification gating admission
//! - [`PersonalityMode`] - Closed set of etiquette personalities

use crate::core::error::BridgeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use url::Url;

/// Logical name of a remote agent.
///
/// Two names are equal when they match ignoring ASCII/Unicode case; the
/// spelling used at first registration is kept for display.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct AgentName(String);

impl AgentName {
    /// Creates a name, rejecting empty or whitespace-only input.
    pub fn new(name: impl Into<String>) -> Result<Self, BridgeError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(BridgeError::Validation(
                "agent name cannot be empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Derives a name from an endpoint.
    ///
    /// Domain hosts use their first DNS label (`https://elara.a2a.mesh` →
    /// `elara`); IP hosts use `host:port`.
    pub fn from_endpoint(endpoint: &AgentEndpoint) -> Result<Self, BridgeError> {
        let url = endpoint.url();
        match url.domain() {
            Some(domain) => Self::new(domain.split('.').next().unwrap_or(domain)),
            None => {
                let host = url.host_str().unwrap_or_default();
                match url.port() {
                    Some(port) => Self::new(format!("{host}:{port}")),
                    None => Self::new(host),
                }
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-folded registry key.
    pub fn key(&self) -> String {
        self.0.to_lowercase()
    }
}

impl PartialEq for AgentName {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for AgentName {}

impl Hash for AgentName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl<'de> Deserialize<'de> for AgentName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        AgentName::new(raw).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for AgentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated base URI of a remote agent.
///
/// Serialized without a trailing slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentEndpoint(Url);

impl AgentEndpoint {
    /// Parses and validates an endpoint. The URI must be absolute http(s)
    /// and carry a host.
    pub fn parse(raw: &str) -> Result<Self, BridgeError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(BridgeError::Validation(
                "endpoint cannot be empty".to_string(),
            ));
        }

        let url = Url::parse(trimmed).map_err(|e| {
            BridgeError::Validation(format!("invalid endpoint '{}': {}", trimmed, e))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(BridgeError::Validation(format!(
                "endpoint '{}' must use http or https, not '{}'",
                trimmed,
                url.scheme()
            )));
        }

        if !url.has_host() {
            return Err(BridgeError::Validation(format!(
                "endpoint '{}' has no host",
                trimmed
            )));
        }

        Ok(Self(url))
    }

    pub fn url(&self) -> &Url {
        &self.0
    }

    /// Endpoint without a trailing slash.
    pub fn as_str(&self) -> &str {
        self.0.as_str().trim_end_matches('/')
    }

    /// Appends a path below the endpoint, keeping any base path.
    pub fn join(&self, path: &str) -> String {
        format!("{}/{}", self.as_str(), path.trim_start_matches('/'))
    }
}

impl Serialize for AgentEndpoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AgentEndpoint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        AgentEndpoint::parse(&raw).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for AgentEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coarse trust classification of an agent.
///
/// Ordered from least to most trusted, so `Blocked < Experimental < Trusted`.
/// `Blocked` acts as a soft delete: the record stays, admission is refused.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TrustZone {
    Blocked,
    #[default]
    Experimental,
    Trusted,
}

impl TrustZone {
    pub fn as_str(&self) -> &str {
        match self {
            TrustZone::Blocked => "blocked",
            TrustZone::Experimental => "experimental",
            TrustZone::Trusted => "trusted",
        }
    }

    /// One step down; `Blocked` stays `Blocked`.
    pub fn demoted(self) -> Self {
        match self {
            TrustZone::Trusted => TrustZone::Experimental,
            TrustZone::Experimental | TrustZone::Blocked => TrustZone::Blocked,
        }
    }

    /// One step up; `Trusted` stays `Trusted`.
    pub fn promoted(self) -> Self {
        match self {
            TrustZone::Blocked => TrustZone::Experimental,
            TrustZone::Experimental | TrustZone::Trusted => TrustZone::Trusted,
        }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, TrustZone::Blocked)
    }
}

impl fmt::Display for TrustZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TrustZone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "blocked" => Ok(TrustZone::Blocked),
            "experimental" => Ok(TrustZone::Experimental),
            "trusted" => Ok(TrustZone::Trusted),
            other => Err(format!("unknown trust zone: {}", other)),
        }
    }
}

/// Personality an agent is addressed with.
///
/// A closed set: anything unrecognised resolves to [`PersonalityMode::Neutral`]
/// through [`PersonalityMode::parse_or_neutral`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonalityMode {
    #[default]
    Neutral,
    Formal,
    Collaborative,
    Concise,
    Playful,
}

impl PersonalityMode {
    pub const ALL: [PersonalityMode; 5] = [
        PersonalityMode::Neutral,
        PersonalityMode::Formal,
        PersonalityMode::Collaborative,
        PersonalityMode::Concise,
        PersonalityMode::Playful,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            PersonalityMode::Neutral => "neutral",
            PersonalityMode::Formal => "formal",
            PersonalityMode::Collaborative => "collaborative",
            PersonalityMode::Concise => "concise",
            PersonalityMode::Playful => "playful",
        }
    }

    pub fn parse_or_neutral(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl fmt::Display for PersonalityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PersonalityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        PersonalityMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == needle)
            .ok_or_else(|| format!("unknown personality mode: {}", s))
    }
}
