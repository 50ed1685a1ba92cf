//! Structured result returned for every tool call

use super::phase::BridgePhase;
use crate::core::error::BridgeError;
use crate::etiquette::annotation::EtiquetteAnnotation;
use crate::mesh::envelope::CorrelationId;
use crate::policy::decision::DenyReason;
use serde::{Deserialize, Serialize};

/// Outcome class of a tool call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BridgeStatus {
    Ok,
    Denied,
    Failed,
}

impl BridgeStatus {
    pub fn as_str(&self) -> &str {
        match self {
            BridgeStatus::Ok => "ok",
            BridgeStatus::Denied => "denied",
            BridgeStatus::Failed => "failed",
        }
    }
}

/// Error details on a failed call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeFailure {
    pub code: String,
    pub message: String,
}

/// `{status, annotation, data | error}` for one invocation.
///
/// Every call produces one of these, whatever happened along the way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeResponse {
    pub status: BridgeStatus,
    pub annotation: EtiquetteAnnotation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<BridgeFailure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<CorrelationId>,
    pub terminal_phase: BridgePhase,
}

impl BridgeResponse {
    pub fn ok(data: serde_json::Value, annotation: EtiquetteAnnotation) -> Self {
        Self {
            status: BridgeStatus::Ok,
            annotation,
            data: Some(data),
            reason: None,
            error: None,
            correlation_id: None,
            terminal_phase: BridgePhase::Completed,
        }
    }

    pub fn denied(reason: DenyReason, annotation: EtiquetteAnnotation) -> Self {
        Self {
            status: BridgeStatus::Denied,
            annotation,
            data: None,
            reason: Some(reason.as_str().to_string()),
            error: None,
            correlation_id: None,
            terminal_phase: BridgePhase::Denied,
        }
    }

    pub fn failed(error: &BridgeError, annotation: EtiquetteAnnotation) -> Self {
        Self {
            status: BridgeStatus::Failed,
            annotation,
            data: None,
            reason: Some(error.reason().to_string()),
            error: Some(BridgeFailure {
                code: error.reason().to_string(),
                message: error.to_string(),
            }),
            correlation_id: None,
            terminal_phase: BridgePhase::Failed,
        }
    }

    pub fn with_correlation(mut self, id: Option<CorrelationId>) -> Self {
        self.correlation_id = id;
        self
    }

    pub fn with_phase(mut self, phase: BridgePhase) -> Self {
        self.terminal_phase = phase;
        self
    }

    pub fn is_ok(&self) -> bool {
        self.status == BridgeStatus::Ok
    }
}
