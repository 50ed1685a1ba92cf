//! Agent domain entities
//!
//! [`AgentRecord`] is the registry's unit of bookkeeping: identity, trust
//! posture and interaction history of one remote agent. [`AgentCard`] is the
//! self-description an agent publishes at discovery time.

use super::value_objects::{AgentEndpoint, AgentName, PersonalityMode, TrustZone};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a registration created a new record or refreshed an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    Created,
    Refreshed,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &str {
        match self {
            RegistrationStatus::Created => "created",
            RegistrationStatus::Refreshed => "refreshed",
        }
    }
}

/// Self-description published by a remote agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentCard {
    pub name: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_type: Option<String>,
}

impl AgentCard {
    /// Reads a card from its JSON form.
    ///
    /// `capabilities` may be a list of strings or an object of boolean
    /// flags (only the enabled ones are kept). Returns `None` without a
    /// string `name`.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        let name = value.get("name")?.as_str()?.trim().to_string();

        let capabilities = match value.get("capabilities") {
            Some(serde_json::Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            Some(serde_json::Value::Object(flags)) => flags
                .iter()
                .filter(|(_, enabled)| enabled.as_bool().unwrap_or(false))
                .map(|(flag, _)| flag.clone())
                .collect(),
            _ => Vec::new(),
        };

        let auth_type = value
            .get("auth")
            .and_then(|auth| auth.get("type"))
            .and_then(|t| t.as_str())
            .map(str::to_string);

        Some(Self {
            name,
            capabilities,
            auth_type,
        })
    }
}

/// Registry entry for a known remote agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRecord {
    pub name: AgentName,
    pub endpoint: AgentEndpoint,
    pub trust_zone: TrustZone,
    pub discovered_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_success_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_failure_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub consecutive_failures: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personality_mode: Option<PersonalityMode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capabilities: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_type: Option<String>,
}

impl AgentRecord {
    pub fn new(
        name: AgentName,
        endpoint: AgentEndpoint,
        trust_zone: TrustZone,
        discovered_at: DateTime<Utc>,
    ) -> Self {
        Self {
            name,
            endpoint,
            trust_zone,
            discovered_at,
            last_success_at: None,
            last_failure_at: None,
            consecutive_failures: 0,
            personality_mode: None,
            capabilities: Vec::new(),
            auth_type: None,
        }
    }

    pub fn with_personality(mut self, mode: Option<PersonalityMode>) -> Self {
        self.personality_mode = mode;
        self
    }

    pub fn with_card(mut self, card: Option<&AgentCard>) -> Self {
        if let Some(card) = card {
            self.capabilities = card.capabilities.clone();
            self.auth_type = card.auth_type.clone();
        }
        self
    }

    /// Applies a rediscovery of the same agent.
    ///
    /// Endpoint and card data are refreshed. Trust zone, history and
    /// `discovered_at` are kept: rediscovery never changes trust.
    pub fn refresh_from(&mut self, candidate: AgentRecord) {
        self.endpoint = candidate.endpoint;
        if !candidate.capabilities.is_empty() {
            self.capabilities = candidate.capabilities;
        }
        if candidate.auth_type.is_some() {
            self.auth_type = candidate.auth_type;
        }
        if self.personality_mode.is_none() {
            self.personality_mode = candidate.personality_mode;
        }
    }

    /// Records the outcome of one interaction.
    pub fn record_outcome(&mut self, success: bool, at: DateTime<Utc>) {
        if success {
            self.last_success_at = Some(at);
            self.consecutive_failures = 0;
        } else {
            self.last_failure_at = Some(at);
            self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.trust_zone.is_blocked()
    }

    pub fn personality(&self) -> PersonalityMode {
        self.personality_mode.unwrap_or_default()
    }

    pub fn has_succeeded(&self) -> bool {
        self.last_success_at.is_some()
    }

    /// True when the most recent recorded interaction was a failure.
    pub fn last_interaction_failed(&self) -> bool {
        match (self.last_failure_at, self.last_success_at) {
            (Some(failure), Some(success)) => failure > success,
            (Some(_), None) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record() -> AgentRecord {
        AgentRecord::new(
            AgentName::new("Elara").unwrap(),
            AgentEndpoint::parse("https://elara.a2a.mesh").unwrap(),
            TrustZone::Experimental,
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_record_outcome_resets_on_success() {
        let mut agent = record();
        let t = Utc.with_ymd_and_hms(2026, 1, 1, 0, 1, 0).unwrap();

        agent.record_outcome(false, t);
        agent.record_outcome(false, t);
        assert_eq!(agent.consecutive_failures, 2);
        assert!(agent.last_interaction_failed());

        agent.record_outcome(true, t + chrono::TimeDelta::seconds(1));
        assert_eq!(agent.consecutive_failures, 0);
        assert!(agent.has_succeeded());
        assert!(!agent.last_interaction_failed());
        assert!(agent.last_failure_at.is_some());
    }

    #[test]
    fn test_refresh_keeps_trust_and_history() {
        let mut agent = record();
        agent.trust_zone = TrustZone::Blocked;
        agent.consecutive_failures = 4;

        let candidate = AgentRecord::new(
            AgentName::new("elara").unwrap(),
            AgentEndpoint::parse("https://elara-v2.a2a.mesh").unwrap(),
            TrustZone::Trusted,
            Utc::now(),
        );
        agent.refresh_from(candidate);

        assert_eq!(agent.endpoint.as_str(), "https://elara-v2.a2a.mesh");
        assert_eq!(agent.trust_zone, TrustZone::Blocked);
        assert_eq!(agent.consecutive_failures, 4);
        assert_eq!(agent.name.as_str(), "Elara");
    }

    #[test]
    fn test_card_from_value_with_list_capabilities() {
        let value = serde_json::json!({
            "name": "Elara",
            "capabilities": ["chat", "summarize"],
            "auth": {"type": "api_key"}
        });
        let card = AgentCard::from_value(&value).unwrap();
        assert_eq!(card.name, "Elara");
        assert_eq!(card.capabilities, vec!["chat", "summarize"]);
        assert_eq!(card.auth_type.as_deref(), Some("api_key"));
    }

    #[test]
    fn test_card_from_value_with_flag_capabilities() {
        let value = serde_json::json!({
            "name": "Orin",
            "capabilities": {"streaming": false, "pushNotifications": true}
        });
        let card = AgentCard::from_value(&value).unwrap();
        assert_eq!(card.capabilities, vec!["pushNotifications"]);
        assert!(card.auth_type.is_none());
    }

    #[test]
    fn test_card_without_name() {
        assert!(AgentCard::from_value(&serde_json::json!({"capabilities": []})).is_none());
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let json = serde_json::to_value(record()).unwrap();
        assert_eq!(json["trustZone"], "experimental");
        assert_eq!(json["endpoint"], "https://elara.a2a.mesh");
        assert!(json.get("lastSuccessAt").is_none());
    }
}
