//! Etiquette advisor
//!
//! A deterministic lookup from `(trust zone, personality, history)` to an
//! [`EtiquetteAnnotation`].
//!
//! | Zone | Default tone | Flag |
//! |------|--------------|------|
//! | `trusted` | collegial | - |
//! | `experimental` | cautious | `unverified-agent` |
//! | `blocked` | guarded (always) | `blocked-agent` |
//!
//! A personality's tone replaces the zone tone, except for blocked agents.

use super::annotation::{EtiquetteAnnotation, ToneHint, flags};
use crate::agent::entities::AgentRecord;
use crate::agent::value_objects::{PersonalityMode, TrustZone};
use crate::tool::context::ToolInvocationContext;
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Extra advisory delay per consecutive failure.
const FAILURE_BACKOFF_MS: u64 = 250;

/// Failures beyond this no longer grow the delay.
const MAX_BACKOFF_STEPS: u32 = 8;

/// Advisory delay for agents in the blocked zone.
const BLOCKED_DELAY_MS: u64 = 1_000;

/// An agent counts as newly discovered for this long.
const NEWLY_DISCOVERED_SECS: i64 = 60;

/// Etiquette rules for one personality mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EtiquetteRules {
    /// Tone that replaces the zone's default tone.
    pub tone: Option<ToneHint>,
    /// Flags always attached for this personality.
    pub caution_flags: Vec<String>,
    /// Delay added before any history-based backoff.
    pub base_delay_ms: u64,
}

impl EtiquetteRules {
    /// Built-in rules for a personality.
    pub fn builtin(mode: PersonalityMode) -> Self {
        match mode {
            PersonalityMode::Neutral => Self::default(),
            PersonalityMode::Formal => Self {
                tone: Some(ToneHint::Formal),
                ..Self::default()
            },
            PersonalityMode::Collaborative => Self {
                tone: Some(ToneHint::Warm),
                ..Self::default()
            },
            PersonalityMode::Concise => Self {
                tone: Some(ToneHint::Brief),
                ..Self::default()
            },
            PersonalityMode::Playful => Self {
                tone: Some(ToneHint::Playful),
                caution_flags: vec!["informal-register".to_string()],
                base_delay_ms: 0,
            },
        }
    }
}

/// Derives etiquette annotations. Holds read-only rules; no interior state.
#[derive(Debug, Clone)]
pub struct EtiquetteAdvisor {
    rules: HashMap<PersonalityMode, EtiquetteRules>,
}

impl Default for EtiquetteAdvisor {
    fn default() -> Self {
        Self::new(HashMap::new())
    }
}

impl EtiquetteAdvisor {
    /// Built-in rules, with `overrides` replacing them per personality.
    pub fn new(overrides: HashMap<PersonalityMode, EtiquetteRules>) -> Self {
        let mut rules: HashMap<PersonalityMode, EtiquetteRules> = PersonalityMode::ALL
            .into_iter()
            .map(|mode| (mode, EtiquetteRules::builtin(mode)))
            .collect();
        rules.extend(overrides);
        Self { rules }
    }

    /// Rules for a personality, falling back to the neutral ones.
    pub fn rules_for(&self, mode: PersonalityMode) -> EtiquetteRules {
        self.rules
            .get(&mode)
            .or_else(|| self.rules.get(&PersonalityMode::Neutral))
            .cloned()
            .unwrap_or_default()
    }

    /// Annotation for an interaction with a known agent.
    pub fn advise(
        &self,
        agent: &AgentRecord,
        context: &ToolInvocationContext,
    ) -> EtiquetteAnnotation {
        let rules = self.rules_for(agent.personality());

        let tone = match agent.trust_zone {
            TrustZone::Blocked => ToneHint::Guarded,
            zone => rules.tone.unwrap_or_else(|| zone_tone(zone)),
        };

        let mut annotation = EtiquetteAnnotation::new(tone);
        for flag in &rules.caution_flags {
            annotation = annotation.with_flag(flag.clone());
        }

        match agent.trust_zone {
            TrustZone::Blocked => annotation = annotation.with_flag(flags::BLOCKED_AGENT),
            TrustZone::Experimental => annotation = annotation.with_flag(flags::UNVERIFIED_AGENT),
            TrustZone::Trusted => {}
        }

        if !agent.has_succeeded() && !agent.is_blocked() {
            annotation = annotation.with_flag(flags::FIRST_CONTACT);
        }
        if agent.consecutive_failures > 0 {
            annotation = annotation.with_flag(flags::RECENT_FAILURES);
        }
        if agent.last_interaction_failed() {
            annotation = annotation.with_flag(flags::LAST_INTERACTION_FAILED);
        }

        let since_discovery = context
            .requested_at()
            .signed_duration_since(agent.discovered_at);
        if since_discovery < TimeDelta::seconds(NEWLY_DISCOVERED_SECS) {
            annotation = annotation.with_flag(flags::NEWLY_DISCOVERED);
        }

        let backoff = FAILURE_BACKOFF_MS * u64::from(agent.consecutive_failures.min(MAX_BACKOFF_STEPS));
        let zone_delay = if agent.is_blocked() { BLOCKED_DELAY_MS } else { 0 };

        annotation.with_delay_ms(rules.base_delay_ms + backoff + zone_delay)
    }

    /// Annotation when no agent record is involved (listing, unknown target).
    pub fn advise_without_agent(&self, context: &ToolInvocationContext) -> EtiquetteAnnotation {
        let annotation = EtiquetteAnnotation::new(ToneHint::Neutral);
        if context.target_agent_name().is_some() {
            annotation.with_flag(flags::UNKNOWN_AGENT)
        } else {
            annotation
        }
    }
}

fn zone_tone(zone: TrustZone) -> ToneHint {
    match zone {
        TrustZone::Trusted => ToneHint::Collegial,
        TrustZone::Experimental => ToneHint::Cautious,
        TrustZone::Blocked => ToneHint::Guarded,
    }
}
