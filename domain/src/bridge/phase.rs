//! Per-invocation state machine
//!
//! ```text
//! Received ─▶ Resolving ─▶ Admitting ─▶ [Denied]
//!                              │
//!                              ├─▶ Encoding ─▶ Dispatching ─▶ Decoding ─▶ Updating ─▶ [Completed]
//!                              │                    │             │            │
//!                              │                    └─────────────┴──▶ Updating ─▶ [Failed]
//!                              └─▶ Updating / [Completed]   (discover, list)
//! ```
//!
//! Any non-terminal phase may also go straight to `Failed` (validation,
//! unknown agent, internal faults).

use crate::core::error::BridgeError;
use serde::{Deserialize, Serialize};

/// Phase of one bridge invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BridgePhase {
    Received,
    Resolving,
    Admitting,
    Encoding,
    Dispatching,
    Decoding,
    Updating,
    Denied,
    Completed,
    Failed,
}

impl BridgePhase {
    pub fn as_str(&self) -> &str {
        match self {
            BridgePhase::Received => "RECEIVED",
            BridgePhase::Resolving => "RESOLVING",
            BridgePhase::Admitting => "ADMITTING",
            BridgePhase::Encoding => "ENCODING",
            BridgePhase::Dispatching => "DISPATCHING",
            BridgePhase::Decoding => "DECODING",
            BridgePhase::Updating => "UPDATING",
            BridgePhase::Denied => "DENIED",
            BridgePhase::Completed => "COMPLETED",
            BridgePhase::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BridgePhase::Denied | BridgePhase::Completed | BridgePhase::Failed
        )
    }

    pub fn can_transition_to(&self, next: BridgePhase) -> bool {
        use BridgePhase::*;

        if self.is_terminal() {
            return false;
        }
        if next == Failed {
            return true;
        }

        matches!(
            (self, next),
            (Received, Resolving)
                | (Received, Admitting)
                | (Resolving, Admitting)
                | (Admitting, Denied)
                | (Admitting, Encoding)
                | (Admitting, Updating)
                | (Admitting, Completed)
                | (Encoding, Dispatching)
                | (Dispatching, Decoding)
                | (Dispatching, Updating)
                | (Decoding, Updating)
                | (Updating, Completed)
        )
    }
}

impl std::fmt::Display for BridgePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The phases one invocation has passed through, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseTrail {
    phases: Vec<BridgePhase>,
}

impl Default for PhaseTrail {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseTrail {
    /// A trail starting at `Received`.
    pub fn new() -> Self {
        Self {
            phases: vec![BridgePhase::Received],
        }
    }

    /// Moves to `next`, rejecting transitions the state machine does not allow.
    pub fn advance(&mut self, next: BridgePhase) -> Result<(), BridgeError> {
        let current = self.current();
        if !current.can_transition_to(next) {
            return Err(BridgeError::Internal(format!(
                "illegal phase transition {} -> {}",
                current, next
            )));
        }
        self.phases.push(next);
        Ok(())
    }

    /// Ends the trail in `Failed` unless it already reached a terminal phase.
    pub fn fail(&mut self) {
        if !self.current().is_terminal() {
            self.phases.push(BridgePhase::Failed);
        }
    }

    pub fn current(&self) -> BridgePhase {
        self.phases
            .last()
            .copied()
            .unwrap_or(BridgePhase::Received)
    }

    pub fn phases(&self) -> &[BridgePhase] {
        &self.phases
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use BridgePhase::*;

    #[test]
    fn test_successful_send_path() {
        let mut trail = PhaseTrail::new();
        for phase in [Resolving, Admitting, Encoding, Dispatching, Decoding, Updating, Completed] {
            trail.advance(phase).unwrap();
        }
        assert_eq!(trail.current(), Completed);
        assert_eq!(trail.phases().len(), 8);
    }

    #[test]
    fn test_dispatch_failure_path() {
        let mut trail = PhaseTrail::new();
        for phase in [Resolving, Admitting, Encoding, Dispatching, Updating, Failed] {
            trail.advance(phase).unwrap();
        }
        assert!(trail.current().is_terminal());
    }

    #[test]
    fn test_terminal_phases_are_final() {
        let mut trail = PhaseTrail::new();
        trail.advance(Admitting).unwrap();
        trail.advance(Denied).unwrap();
        assert!(trail.advance(Failed).is_err());

        trail.fail();
        assert_eq!(trail.current(), Denied);
    }

    #[test]
    fn test_skipping_dispatch_is_rejected() {
        let mut trail = PhaseTrail::new();
        trail.advance(Resolving).unwrap();
        trail.advance(Admitting).unwrap();
        trail.advance(Encoding).unwrap();
        let err = trail.advance(Decoding).unwrap_err();
        assert_eq!(err.reason(), "internal-error");
    }

    #[test]
    fn test_fail_from_any_open_phase() {
        let mut trail = PhaseTrail::new();
        trail.advance(Resolving).unwrap();
        trail.fail();
        assert_eq!(trail.phases(), &[Received, Resolving, Failed]);
    }
}
