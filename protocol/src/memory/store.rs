//! # Memory Store
//!
//! The version-sequencing layer over a [`VersionBackend`]. The backend
//! knows how to append, scan, and delete records; this layer owns the one
//! invariant the backend can't enforce alone: version numbers per agent are
//! dense, start at 1, and restart at 1 after a clear.
//!
//! Sequencing is protected by a per-agent mutex, so concurrent stores for
//! the *same* agent serialize (each gets a unique, consecutive number)
//! while stores for different agents proceed in parallel. Clear takes the
//! same lock, which is what makes "clear then store yields version 1"
//! hold under concurrency.

use chrono::Utc;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;

use crate::identity::AgentId;
use crate::storage::backend::{StorageError, VersionBackend};

use super::MemoryVersion;

/// Errors from memory operations.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// The agent has no stored versions (never stored, or cleared).
    #[error("no memory versions stored for agent")]
    NoVersions,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Append-only versioned blob store for all agents.
#[derive(Clone)]
pub struct MemoryStore {
    versions: Arc<dyn VersionBackend>,
    /// One mutex per agent that has touched the store this process
    /// lifetime. Entries are tiny and never need eviction at the scale
    /// this runs at.
    sequencers: Arc<DashMap<AgentId, Arc<Mutex<()>>>>,
}

impl MemoryStore {
    pub fn new(versions: Arc<dyn VersionBackend>) -> Self {
        Self {
            versions,
            sequencers: Arc::new(DashMap::new()),
        }
    }

    fn sequencer(&self, agent_id: &AgentId) -> Arc<Mutex<()>> {
        self.sequencers
            .entry(agent_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Append a new version for an agent and return the record.
    ///
    /// The blob is opaque: empty, huge, or bit-identical to the previous
    /// version are all fine, and each store still gets its own number.
    pub fn store(
        &self,
        agent_id: &AgentId,
        encrypted_blob: Vec<u8>,
    ) -> Result<MemoryVersion, MemoryError> {
        let lock = self.sequencer(agent_id);
        let _guard = lock.lock();

        let next = self.versions.max_version(agent_id)?.unwrap_or(0) + 1;
        let version = MemoryVersion {
            agent_id: agent_id.clone(),
            version_number: next,
            encrypted_blob,
            created_at: Utc::now(),
        };
        self.versions.append_version(&version)?;

        tracing::debug!(
            agent_id = %agent_id.short(),
            version = next,
            bytes = version.encrypted_blob.len(),
            "memory version stored"
        );
        Ok(version)
    }

    /// The latest version for an agent.
    pub fn retrieve(&self, agent_id: &AgentId) -> Result<MemoryVersion, MemoryError> {
        self.versions
            .latest_version(agent_id)?
            .ok_or(MemoryError::NoVersions)
    }

    /// Every version for an agent, ascending. An agent with no versions
    /// gets an empty list, not an error — "nothing stored yet" is a normal
    /// answer to a history question.
    pub fn history(&self, agent_id: &AgentId) -> Result<Vec<MemoryVersion>, MemoryError> {
        Ok(self.versions.all_versions(agent_id)?)
    }

    /// Remove every version for an agent. Returns how many were removed;
    /// clearing an agent with nothing stored is a no-op success with 0.
    ///
    /// The next store after a clear starts over at version 1.
    pub fn clear(&self, agent_id: &AgentId) -> Result<u64, MemoryError> {
        let lock = self.sequencer(agent_id);
        let _guard = lock.lock();

        let removed = self.versions.delete_all_versions(agent_id)?;
        tracing::info!(
            agent_id = %agent_id.short(),
            removed,
            "memory cleared"
        );
        Ok(removed)
    }

    /// Total versions across all agents. Feeds `/stats`.
    pub fn total_versions(&self) -> Result<u64, MemoryError> {
        Ok(self.versions.version_count()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::AgentKeypair;
    use crate::storage::MemoryBackend;

    fn store() -> (MemoryStore, AgentId) {
        let backend = Arc::new(MemoryBackend::new());
        let agent_id = AgentId::derive(&AgentKeypair::generate().public_key());
        (MemoryStore::new(backend), agent_id)
    }

    #[test]
    fn versions_start_at_one_and_increment() {
        let (store, agent) = store();
        assert_eq!(store.store(&agent, b"v1".to_vec()).unwrap().version_number, 1);
        assert_eq!(store.store(&agent, b"v2".to_vec()).unwrap().version_number, 2);
        assert_eq!(store.store(&agent, b"v3".to_vec()).unwrap().version_number, 3);
    }

    #[test]
    fn retrieve_returns_latest() {
        let (store, agent) = store();
        store.store(&agent, b"old".to_vec()).unwrap();
        store.store(&agent, b"new".to_vec()).unwrap();

        let latest = store.retrieve(&agent).unwrap();
        assert_eq!(latest.version_number, 2);
        assert_eq!(latest.encrypted_blob, b"new");
    }

    #[test]
    fn retrieve_with_nothing_stored_fails() {
        let (store, agent) = store();
        assert!(matches!(store.retrieve(&agent), Err(MemoryError::NoVersions)));
    }

    #[test]
    fn history_is_ascending_and_complete() {
        let (store, agent) = store();
        for i in 1u8..=5 {
            store.store(&agent, vec![i]).unwrap();
        }

        let history = store.history(&agent).unwrap();
        assert_eq!(history.len(), 5);
        for (i, v) in history.iter().enumerate() {
            assert_eq!(v.version_number, i as u64 + 1);
            assert_eq!(v.encrypted_blob, vec![i as u8 + 1]);
        }
    }

    #[test]
    fn history_of_fresh_agent_is_empty() {
        let (store, agent) = store();
        assert!(store.history(&agent).unwrap().is_empty());
    }

    #[test]
    fn clear_removes_everything_and_resets_numbering() {
        let (store, agent) = store();
        store.store(&agent, b"a".to_vec()).unwrap();
        store.store(&agent, b"b".to_vec()).unwrap();

        assert_eq!(store.clear(&agent).unwrap(), 2);
        assert!(store.history(&agent).unwrap().is_empty());
        assert!(matches!(store.retrieve(&agent), Err(MemoryError::NoVersions)));

        // Numbering restarts, it does not resume.
        assert_eq!(store.store(&agent, b"c".to_vec()).unwrap().version_number, 1);
    }

    #[test]
    fn clear_is_idempotent() {
        let (store, agent) = store();
        store.store(&agent, b"a".to_vec()).unwrap();
        assert_eq!(store.clear(&agent).unwrap(), 1);
        assert_eq!(store.clear(&agent).unwrap(), 0);
    }

    #[test]
    fn identical_blobs_still_get_distinct_versions() {
        let (store, agent) = store();
        let blob = vec![0xaa; 64];
        let v1 = store.store(&agent, blob.clone()).unwrap();
        let v2 = store.store(&agent, blob.clone()).unwrap();
        assert_ne!(v1.version_number, v2.version_number);
        assert_eq!(v1.encrypted_blob, v2.encrypted_blob);
    }

    #[test]
    fn agents_do_not_share_sequences() {
        let (store, agent_a) = store();
        let agent_b = AgentId::derive(&AgentKeypair::generate().public_key());

        store.store(&agent_a, b"a1".to_vec()).unwrap();
        store.store(&agent_a, b"a2".to_vec()).unwrap();
        let b1 = store.store(&agent_b, b"b1".to_vec()).unwrap();

        assert_eq!(b1.version_number, 1);
        assert_eq!(store.history(&agent_a).unwrap().len(), 2);
        assert_eq!(store.history(&agent_b).unwrap().len(), 1);
    }

    #[test]
    fn concurrent_stores_get_unique_consecutive_versions() {
        let (store, agent) = store();
        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            let agent = agent.clone();
            handles.push(std::thread::spawn(move || {
                (0..25)
                    .map(|_| store.store(&agent, b"blob".to_vec()).unwrap().version_number)
                    .collect::<Vec<u64>>()
            }));
        }

        let mut seen: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        seen.sort_unstable();

        let expected: Vec<u64> = (1..=200).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn total_versions_counts_across_agents() {
        let (store, agent_a) = store();
        let agent_b = AgentId::derive(&AgentKeypair::generate().public_key());
        store.store(&agent_a, b"a".to_vec()).unwrap();
        store.store(&agent_b, b"b".to_vec()).unwrap();
        store.store(&agent_b, b"b2".to_vec()).unwrap();
        assert_eq!(store.total_versions().unwrap(), 3);
    }
}
