//! Agent Registry
//!
//! In-memory directory of known remote agents. The registry is the only
//! owner of [`AgentRecord`] lifetimes: records are created by discovery,
//! mutated after interactions and never removed (the `blocked` zone is the
//! soft delete).
//!
//! All mutation goes through a single `RwLock`, so an upsert racing another
//! upsert of the same name, or a failure count racing a demotion, is always
//! applied as one atomic step.

use bridge_domain::{
    AgentEndpoint, AgentName, AgentRecord, BridgeError, RegistrationStatus, TrustZone,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, warn};

/// Result of a register / upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub record: AgentRecord,
    pub status: RegistrationStatus,
}

#[derive(Debug, Default)]
struct RegistryState {
    /// Records in discovery order.
    records: Vec<AgentRecord>,
    /// Case-folded name → position in `records`.
    index: HashMap<String, usize>,
}

/// Lock-protected agent directory, shared by reference (`Arc`).
#[derive(Debug, Default)]
pub struct AgentRegistry {
    state: RwLock<RegistryState>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `name` and `endpoint`, then upserts.
    pub fn register(
        &self,
        name: &str,
        endpoint: &str,
        trust_zone: TrustZone,
        at: DateTime<Utc>,
    ) -> Result<Registration, BridgeError> {
        let name = AgentName::new(name)?;
        let endpoint = AgentEndpoint::parse(endpoint)?;
        Ok(self.upsert(AgentRecord::new(name, endpoint, trust_zone, at)))
    }

    /// Inserts `candidate`, or refreshes the existing record with the same name.
    ///
    /// A refresh keeps trust zone and history; see
    /// [`AgentRecord::refresh_from`].
    pub fn upsert(&self, candidate: AgentRecord) -> Registration {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let key = candidate.name.key();

        let existing = state.index.get(&key).copied();
        if let Some(pos) = existing {
            let record = &mut state.records[pos];
            record.refresh_from(candidate);
            debug!(agent = %record.name, endpoint = %record.endpoint, "Refreshed agent");
            return Registration {
                record: record.clone(),
                status: RegistrationStatus::Refreshed,
            };
        }

        debug!(agent = %candidate.name, endpoint = %candidate.endpoint, zone = %candidate.trust_zone, "Registered agent");
        let pos = state.records.len();
        state.index.insert(key, pos);
        state.records.push(candidate.clone());
        Registration {
            record: candidate,
            status: RegistrationStatus::Created,
        }
    }

    /// Snapshot of the record registered under `name` (case-insensitive).
    pub fn resolve(&self, name: &str) -> Result<AgentRecord, BridgeError> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state
            .index
            .get(&name.trim().to_lowercase())
            .map(|&pos| state.records[pos].clone())
            .ok_or_else(|| BridgeError::NotFound(name.to_string()))
    }

    /// All records, in discovery order.
    pub fn list(&self) -> AgentListing {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        AgentListing {
            records: state.records.clone().into(),
        }
    }

    /// Records the outcome of one interaction. Unknown names are ignored.
    pub fn record_outcome(&self, name: &str, success: bool, at: DateTime<Utc>) {
        if self
            .update(name, |record| record.record_outcome(success, at))
            .is_err()
        {
            warn!(agent = name, "Outcome for unknown agent ignored");
        }
    }

    /// Applies `f` to the record under the write lock.
    pub fn update<R>(
        &self,
        name: &str,
        f: impl FnOnce(&mut AgentRecord) -> R,
    ) -> Result<R, BridgeError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let pos = *state
            .index
            .get(&name.trim().to_lowercase())
            .ok_or_else(|| BridgeError::NotFound(name.to_string()))?;
        Ok(f(&mut state.records[pos]))
    }

    pub fn len(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .records
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Point-in-time view of the registry.
///
/// Iterating does not hold any lock, and [`iter`](Self::iter) can be called
/// any number of times, always starting from the first-discovered agent.
#[derive(Debug, Clone)]
pub struct AgentListing {
    records: Arc<[AgentRecord]>,
}

impl AgentListing {
    pub fn iter(&self) -> std::slice::Iter<'_, AgentRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a AgentListing {
    type Item = &'a AgentRecord;
    type IntoIter = std::slice::Iter<'a, AgentRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn test_register_then_resolve() {
        let registry = AgentRegistry::new();
        let reg = registry
            .register("Elara", "https://elara.a2a.mesh", TrustZone::Experimental, now())
            .unwrap();
        assert_eq!(reg.status, RegistrationStatus::Created);

        let record = registry.resolve("elara").unwrap();
        assert_eq!(record.endpoint.as_str(), "https://elara.a2a.mesh");
        assert_eq!(record.trust_zone, TrustZone::Experimental);
    }

    #[test]
    fn test_reregister_updates_in_place() {
        let registry = AgentRegistry::new();
        registry
            .register("Elara", "https://elara.a2a.mesh", TrustZone::Experimental, now())
            .unwrap();
        registry.update("Elara", |r| r.trust_zone = TrustZone::Trusted).unwrap();

        let reg = registry
            .register("ELARA", "https://elara-2.a2a.mesh", TrustZone::Experimental, now())
            .unwrap();

        assert_eq!(reg.status, RegistrationStatus::Refreshed);
        assert_eq!(registry.len(), 1);
        let record = registry.resolve("Elara").unwrap();
        assert_eq!(record.endpoint.as_str(), "https://elara-2.a2a.mesh");
        assert_eq!(record.trust_zone, TrustZone::Trusted);
    }

    #[test]
    fn test_register_validation() {
        let registry = AgentRegistry::new();
        let err = registry
            .register("", "https://elara.a2a.mesh", TrustZone::Experimental, now())
            .unwrap_err();
        assert_eq!(err.reason(), "validation-error");

        let err = registry
            .register("Elara", "not a uri", TrustZone::Experimental, now())
            .unwrap_err();
        assert_eq!(err.reason(), "validation-error");
        assert!(registry.is_empty());
    }

    #[test]
    fn test_resolve_unknown() {
        let registry = AgentRegistry::new();
        assert_eq!(
            registry.resolve("Ghost").unwrap_err(),
            BridgeError::NotFound("Ghost".to_string())
        );
    }

    #[test]
    fn test_list_is_ordered_and_restartable() {
        let registry = AgentRegistry::new();
        for name in ["Zed", "Alpha", "Mid"] {
            registry
                .register(name, &format!("https://{}.a2a.mesh", name), TrustZone::Experimental, now())
                .unwrap();
        }

        let listing = registry.list();
        let first: Vec<&str> = listing.iter().map(|r| r.name.as_str()).collect();
        let second: Vec<&str> = listing.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(first, vec!["Zed", "Alpha", "Mid"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_record_outcome() {
        let registry = AgentRegistry::new();
        registry
            .register("Elara", "https://elara.a2a.mesh", TrustZone::Experimental, now())
            .unwrap();

        registry.record_outcome("Elara", false, now());
        registry.record_outcome("Elara", false, now());
        assert_eq!(registry.resolve("Elara").unwrap().consecutive_failures, 2);

        registry.record_outcome("Elara", true, now());
        let record = registry.resolve("Elara").unwrap();
        assert_eq!(record.consecutive_failures, 0);
        assert!(record.last_success_at.is_some());
        assert!(record.last_failure_at.is_some());

        registry.record_outcome("Ghost", true, now());
    }

    #[test]
    fn test_concurrent_upserts_of_same_name() {
        let registry = Arc::new(AgentRegistry::new());
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    registry
                        .register(
                            "Elara",
                            &format!("https://node-{}.a2a.mesh", i),
                            TrustZone::Experimental,
                            Utc::now(),
                        )
                        .unwrap()
                        .status
                })
            })
            .collect();

        let created = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|s| *s == RegistrationStatus::Created)
            .count();

        assert_eq!(created, 1);
        assert_eq!(registry.len(), 1);
    }
}
