//! # ClawDb — Persistent Storage Engine
//!
//! The persistence layer for the memory service, built on sled's embedded
//! key-value store. All on-disk data flows through this module.
//!
//! ## Tree Layout
//!
//! sled organizes data into named "trees" (analogous to column families in
//! RocksDB or tables in SQL). Each tree is an independent B+ tree with its
//! own keyspace:
//!
//! | Tree         | Key                              | Value                    |
//! |--------------|----------------------------------|--------------------------|
//! | `identities` | `agent_id` (64B hex, UTF-8)      | `bincode(AgentIdentity)` |
//! | `versions`   | `agent_id` ‖ `version` (8B BE)   | `bincode(MemoryVersion)` |
//!
//! Agent IDs are fixed-width (64 hex characters), so the composite version
//! key has a fixed-width prefix and sled's lexicographic ordering within a
//! prefix matches numeric version ordering — big-endian version bytes make
//! "all versions, ascending" a plain prefix scan and "max version" the last
//! element of that scan.
//!
//! ## Atomicity
//!
//! `clear` collects every key under the agent's prefix and removes them in
//! a single atomic `Batch`: either all versions go or none do. Identity
//! insertion uses compare-and-swap so two racing registrations of the same
//! ID cannot both succeed.

use sled::{Batch, Db, Tree};
use std::path::Path;

use crate::identity::{AgentId, AgentIdentity};
use crate::memory::MemoryVersion;

use super::backend::{IdentityBackend, StorageError, VersionBackend};

/// Persistent storage engine for agent identities and memory versions.
///
/// Wraps a sled `Db` instance and exposes the two backend traits. All
/// serialization uses bincode for compactness and speed.
///
/// # Thread Safety
///
/// sled is inherently thread-safe — trees support lock-free concurrent
/// reads and serialized writes. `ClawDb` can be shared across threads via
/// `Arc<ClawDb>` without external synchronization.
#[derive(Debug, Clone)]
pub struct ClawDb {
    /// The underlying sled database handle.
    db: Db,
    /// Identity records keyed by agent ID.
    identities: Tree,
    /// Memory versions keyed by agent ID + big-endian version number.
    versions: Tree,
}

impl ClawDb {
    /// Open or create a database at the given filesystem path.
    ///
    /// If the directory doesn't exist, sled creates it. If the database
    /// already exists, all existing identities and memories are available
    /// immediately.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// Create a temporary database that lives in memory and is cleaned up
    /// automatically when the `ClawDb` is dropped.
    ///
    /// Ideal for unit tests — no filesystem side effects, no cleanup needed.
    pub fn open_temporary() -> Result<Self, StorageError> {
        let config = sled::Config::new().temporary(true);
        let db = config.open()?;
        Self::from_db(db)
    }

    /// Internal constructor: opens named trees from an existing sled `Db`.
    fn from_db(db: Db) -> Result<Self, StorageError> {
        let identities = db.open_tree("identities")?;
        let versions = db.open_tree("versions")?;
        Ok(Self {
            db,
            identities,
            versions,
        })
    }

    /// Composite key for a version row: agent ID bytes followed by the
    /// big-endian version number.
    fn version_key(agent_id: &AgentId, version_number: u64) -> Vec<u8> {
        let mut key = Vec::with_capacity(agent_id.as_str().len() + 8);
        key.extend_from_slice(agent_id.as_str().as_bytes());
        key.extend_from_slice(&version_number.to_be_bytes());
        key
    }

    fn decode_version(bytes: &[u8]) -> Result<MemoryVersion, StorageError> {
        bincode::deserialize(bytes).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    /// Force a flush of all pending writes to disk.
    ///
    /// sled buffers writes in memory for performance. This call blocks
    /// until all data is durable on the underlying storage device.
    pub fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }
}

impl IdentityBackend for ClawDb {
    fn insert_identity(&self, identity: &AgentIdentity) -> Result<bool, StorageError> {
        let key = identity.agent_id.as_str().as_bytes().to_vec();
        let value = bincode::serialize(identity)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        // compare_and_swap with expected=None is an atomic insert-if-absent.
        let swapped = self
            .identities
            .compare_and_swap(key, None as Option<&[u8]>, Some(value))?;

        if swapped.is_ok() {
            self.db.flush()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn get_identity(&self, agent_id: &AgentId) -> Result<Option<AgentIdentity>, StorageError> {
        match self.identities.get(agent_id.as_str().as_bytes())? {
            Some(bytes) => {
                let identity: AgentIdentity = bincode::deserialize(&bytes)
                    .map_err(|e| StorageError::Serialization(e.to_string()))?;
                Ok(Some(identity))
            }
            None => Ok(None),
        }
    }

    fn identity_count(&self) -> Result<u64, StorageError> {
        Ok(self.identities.len() as u64)
    }
}

impl VersionBackend for ClawDb {
    fn max_version(&self, agent_id: &AgentId) -> Result<Option<u64>, StorageError> {
        // Big-endian keys: the last entry under the prefix is the highest
        // version. No full scan of the values needed.
        match self.versions.scan_prefix(agent_id.as_str().as_bytes()).last() {
            Some(entry) => {
                let (key, _) = entry?;
                let suffix: [u8; 8] = key[key.len() - 8..]
                    .try_into()
                    .map_err(|_| StorageError::Serialization("invalid version key".into()))?;
                Ok(Some(u64::from_be_bytes(suffix)))
            }
            None => Ok(None),
        }
    }

    fn append_version(&self, version: &MemoryVersion) -> Result<(), StorageError> {
        let key = Self::version_key(&version.agent_id, version.version_number);
        let value =
            bincode::serialize(version).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.versions.insert(key, value)?;
        self.db.flush()?;
        Ok(())
    }

    fn latest_version(&self, agent_id: &AgentId) -> Result<Option<MemoryVersion>, StorageError> {
        match self.versions.scan_prefix(agent_id.as_str().as_bytes()).last() {
            Some(entry) => {
                let (_, value) = entry?;
                Ok(Some(Self::decode_version(&value)?))
            }
            None => Ok(None),
        }
    }

    fn all_versions(&self, agent_id: &AgentId) -> Result<Vec<MemoryVersion>, StorageError> {
        let mut versions = Vec::new();
        for entry in self.versions.scan_prefix(agent_id.as_str().as_bytes()) {
            let (_, value) = entry?;
            versions.push(Self::decode_version(&value)?);
        }
        Ok(versions)
    }

    fn delete_all_versions(&self, agent_id: &AgentId) -> Result<u64, StorageError> {
        let mut keys = Vec::new();
        for entry in self.versions.scan_prefix(agent_id.as_str().as_bytes()) {
            let (key, _) = entry?;
            keys.push(key);
        }

        if keys.is_empty() {
            return Ok(0);
        }

        let mut batch = Batch::default();
        for key in &keys {
            batch.remove(key.clone());
        }
        self.versions.apply_batch(batch)?;
        self.db.flush()?;

        Ok(keys.len() as u64)
    }

    fn version_count(&self) -> Result<u64, StorageError> {
        Ok(self.versions.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::AgentKeypair;
    use chrono::Utc;

    fn test_identity() -> AgentIdentity {
        let kp = AgentKeypair::generate();
        AgentIdentity {
            agent_id: AgentId::derive(&kp.public_key()),
            public_key: kp.public_key(),
            created_at: Utc::now(),
        }
    }

    fn test_version(agent_id: &AgentId, number: u64) -> MemoryVersion {
        MemoryVersion {
            agent_id: agent_id.clone(),
            version_number: number,
            encrypted_blob: format!("ciphertext-{number}").into_bytes(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn open_temporary_database() {
        let db = ClawDb::open_temporary().expect("should create temp db");
        assert_eq!(db.identity_count().unwrap(), 0);
        assert_eq!(db.version_count().unwrap(), 0);
    }

    #[test]
    fn open_persistent_database_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let identity = test_identity();

        {
            let db = ClawDb::open(dir.path()).expect("should open db");
            assert!(db.insert_identity(&identity).unwrap());
            db.append_version(&test_version(&identity.agent_id, 1)).unwrap();
        }

        let db = ClawDb::open(dir.path()).expect("should reopen db");
        assert!(db.get_identity(&identity.agent_id).unwrap().is_some());
        assert_eq!(db.max_version(&identity.agent_id).unwrap(), Some(1));
    }

    #[test]
    fn insert_identity_is_first_writer_wins() {
        let db = ClawDb::open_temporary().unwrap();
        let identity = test_identity();

        assert!(db.insert_identity(&identity).unwrap());
        assert!(!db.insert_identity(&identity).unwrap());
        assert_eq!(db.identity_count().unwrap(), 1);
    }

    #[test]
    fn identity_roundtrip_preserves_fields() {
        let db = ClawDb::open_temporary().unwrap();
        let identity = test_identity();
        db.insert_identity(&identity).unwrap();

        let found = db.get_identity(&identity.agent_id).unwrap().unwrap();
        assert_eq!(found.agent_id, identity.agent_id);
        assert_eq!(found.public_key, identity.public_key);
        assert_eq!(found.created_at, identity.created_at);
    }

    #[test]
    fn versions_scan_in_ascending_order() {
        let db = ClawDb::open_temporary().unwrap();
        let agent_id = test_identity().agent_id;

        // Insert out of order; the BE key layout must still sort them.
        for n in [3u64, 1, 2] {
            db.append_version(&test_version(&agent_id, n)).unwrap();
        }

        let all = db.all_versions(&agent_id).unwrap();
        let numbers: Vec<u64> = all.iter().map(|v| v.version_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(db.max_version(&agent_id).unwrap(), Some(3));
        assert_eq!(
            db.latest_version(&agent_id).unwrap().unwrap().version_number,
            3
        );
    }

    #[test]
    fn version_ordering_beyond_one_byte() {
        // A lexicographic (non-BE) layout would sort 256 before 2.
        let db = ClawDb::open_temporary().unwrap();
        let agent_id = test_identity().agent_id;

        for n in [2u64, 256, 10] {
            db.append_version(&test_version(&agent_id, n)).unwrap();
        }

        let numbers: Vec<u64> = db
            .all_versions(&agent_id)
            .unwrap()
            .iter()
            .map(|v| v.version_number)
            .collect();
        assert_eq!(numbers, vec![2, 10, 256]);
        assert_eq!(db.max_version(&agent_id).unwrap(), Some(256));
    }

    #[test]
    fn versions_are_isolated_per_agent() {
        let db = ClawDb::open_temporary().unwrap();
        let a = test_identity().agent_id;
        let b = test_identity().agent_id;

        db.append_version(&test_version(&a, 1)).unwrap();
        db.append_version(&test_version(&a, 2)).unwrap();
        db.append_version(&test_version(&b, 1)).unwrap();

        assert_eq!(db.all_versions(&a).unwrap().len(), 2);
        assert_eq!(db.all_versions(&b).unwrap().len(), 1);
        assert_eq!(db.version_count().unwrap(), 3);
    }

    #[test]
    fn delete_all_versions_is_atomic_and_scoped() {
        let db = ClawDb::open_temporary().unwrap();
        let a = test_identity().agent_id;
        let b = test_identity().agent_id;

        for n in 1..=4 {
            db.append_version(&test_version(&a, n)).unwrap();
        }
        db.append_version(&test_version(&b, 1)).unwrap();

        assert_eq!(db.delete_all_versions(&a).unwrap(), 4);
        assert!(db.all_versions(&a).unwrap().is_empty());
        // Other agents untouched.
        assert_eq!(db.all_versions(&b).unwrap().len(), 1);
        // Repeat delete is a no-op.
        assert_eq!(db.delete_all_versions(&a).unwrap(), 0);
    }

    #[test]
    fn blob_bytes_survive_roundtrip_untouched() {
        let db = ClawDb::open_temporary().unwrap();
        let agent_id = test_identity().agent_id;

        // Opaque means opaque: arbitrary bytes, including zeros and high bits.
        let blob: Vec<u8> = (0..=255u8).collect();
        let version = MemoryVersion {
            agent_id: agent_id.clone(),
            version_number: 1,
            encrypted_blob: blob.clone(),
            created_at: Utc::now(),
        };
        db.append_version(&version).unwrap();

        let stored = db.latest_version(&agent_id).unwrap().unwrap();
        assert_eq!(stored.encrypted_blob, blob);
    }

    #[test]
    fn concurrent_reads_do_not_block() {
        use std::sync::Arc;
        use std::thread;

        let db = Arc::new(ClawDb::open_temporary().unwrap());
        let agent_id = test_identity().agent_id;
        for n in 1..=10 {
            db.append_version(&test_version(&agent_id, n)).unwrap();
        }

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let db = Arc::clone(&db);
                let agent_id = agent_id.clone();
                thread::spawn(move || {
                    for _ in 0..10 {
                        let all = db.all_versions(&agent_id).unwrap();
                        assert_eq!(all.len(), 10);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("reader thread should not panic");
        }
    }
}
