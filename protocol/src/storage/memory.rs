//! # In-Memory Backend
//!
//! DashMap-backed implementation of both storage traits. State evaporates
//! on drop, which is exactly what tests and `--ephemeral` deployments want.
//!
//! DashMap's sharded locking gives us the atomic insert-if-absent that
//! registration needs (via the entry API) and keeps operations on distinct
//! agents from contending with each other.

use dashmap::DashMap;

use crate::identity::{AgentId, AgentIdentity};
use crate::memory::MemoryVersion;

use super::backend::{IdentityBackend, StorageError, VersionBackend};

/// Volatile storage for identities and memory versions.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    identities: DashMap<AgentId, AgentIdentity>,
    versions: DashMap<AgentId, Vec<MemoryVersion>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdentityBackend for MemoryBackend {
    fn insert_identity(&self, identity: &AgentIdentity) -> Result<bool, StorageError> {
        // entry() holds the shard lock across the vacancy check and the
        // insert, so two racing registrations of the same ID cannot both
        // see "absent".
        match self.identities.entry(identity.agent_id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Ok(false),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(identity.clone());
                Ok(true)
            }
        }
    }

    fn get_identity(&self, agent_id: &AgentId) -> Result<Option<AgentIdentity>, StorageError> {
        Ok(self.identities.get(agent_id).map(|entry| entry.clone()))
    }

    fn identity_count(&self) -> Result<u64, StorageError> {
        Ok(self.identities.len() as u64)
    }
}

impl VersionBackend for MemoryBackend {
    fn max_version(&self, agent_id: &AgentId) -> Result<Option<u64>, StorageError> {
        Ok(self
            .versions
            .get(agent_id)
            .and_then(|list| list.last().map(|v| v.version_number)))
    }

    fn append_version(&self, version: &MemoryVersion) -> Result<(), StorageError> {
        // Each agent's list stays sorted by version number, so reads are
        // ascending and `last()` is the max even when callers append out
        // of order (the sled engine gets the same property from its
        // big-endian composite keys).
        let mut list = self.versions.entry(version.agent_id.clone()).or_default();
        let at = list
            .binary_search_by_key(&version.version_number, |v| v.version_number)
            .unwrap_or_else(|missing_at| missing_at);
        list.insert(at, version.clone());
        Ok(())
    }

    fn latest_version(&self, agent_id: &AgentId) -> Result<Option<MemoryVersion>, StorageError> {
        Ok(self
            .versions
            .get(agent_id)
            .and_then(|list| list.last().cloned()))
    }

    fn all_versions(&self, agent_id: &AgentId) -> Result<Vec<MemoryVersion>, StorageError> {
        Ok(self
            .versions
            .get(agent_id)
            .map(|list| list.clone())
            .unwrap_or_default())
    }

    fn delete_all_versions(&self, agent_id: &AgentId) -> Result<u64, StorageError> {
        Ok(self
            .versions
            .remove(agent_id)
            .map(|(_, list)| list.len() as u64)
            .unwrap_or(0))
    }

    fn version_count(&self) -> Result<u64, StorageError> {
        Ok(self
            .versions
            .iter()
            .map(|entry| entry.value().len() as u64)
            .sum())
    }
}
