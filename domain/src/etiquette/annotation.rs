//! Etiquette annotation value objects

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Caution flag vocabulary.
pub mod flags {
    pub const UNVERIFIED_AGENT: &str = "unverified-agent";
    pub const BLOCKED_AGENT: &str = "blocked-agent";
    pub const UNKNOWN_AGENT: &str = "unknown-agent";
    pub const FIRST_CONTACT: &str = "first-contact";
    pub const NEWLY_DISCOVERED: &str = "newly-discovered";
    pub const RECENT_FAILURES: &str = "recent-failures";
    pub const LAST_INTERACTION_FAILED: &str = "last-interaction-failed";
}

/// Suggested register for addressing an agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToneHint {
    #[default]
    Neutral,
    Collegial,
    Cautious,
    Guarded,
    Formal,
    Warm,
    Brief,
    Playful,
}

impl ToneHint {
    pub const ALL: [ToneHint; 8] = [
        ToneHint::Neutral,
        ToneHint::Collegial,
        ToneHint::Cautious,
        ToneHint::Guarded,
        ToneHint::Formal,
        ToneHint::Warm,
        ToneHint::Brief,
        ToneHint::Playful,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            ToneHint::Neutral => "neutral",
            ToneHint::Collegial => "collegial",
            ToneHint::Cautious => "cautious",
            ToneHint::Guarded => "guarded",
            ToneHint::Formal => "formal",
            ToneHint::Warm => "warm",
            ToneHint::Brief => "brief",
            ToneHint::Playful => "playful",
        }
    }
}

impl fmt::Display for ToneHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ToneHint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        ToneHint::ALL
            .into_iter()
            .find(|tone| tone.as_str() == needle)
            .ok_or_else(|| format!("unknown tone: {}", s))
    }
}

/// Advisory metadata attached to every bridge result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtiquetteAnnotation {
    pub tone_hint: ToneHint,
    pub caution_flags: BTreeSet<String>,
    /// Advisory only; nothing in the bridge waits on it.
    pub suggested_delay_ms: u64,
}

impl EtiquetteAnnotation {
    pub fn new(tone_hint: ToneHint) -> Self {
        Self {
            tone_hint,
            caution_flags: BTreeSet::new(),
            suggested_delay_ms: 0,
        }
    }

    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.caution_flags.insert(flag.into());
        self
    }

    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.suggested_delay_ms = delay_ms;
        self
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.caution_flags.contains(flag)
    }
}
