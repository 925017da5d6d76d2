//! # Backend Traits
//!
//! The two capability sets the core needs from persistence, expressed as
//! traits so the engine is an injection point rather than ambient state.
//!
//! All methods are synchronous: the core's contract is plain
//! request/response, and both shipped engines (DashMap, sled) are
//! synchronous internally. An async engine would wrap these calls in
//! `spawn_blocking` at the transport layer, not change the trait.

use thiserror::Error;

use crate::identity::{AgentId, AgentIdentity};
use crate::memory::MemoryVersion;

/// Errors surfaced by storage backends.
///
/// These are service-side failures: the request was well-formed and
/// authorized, the engine just couldn't complete it. The core never
/// retries them — the caller may resubmit the whole request.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Identity table capabilities: insert-if-absent and lookup.
///
/// Identities are immutable once written — there is deliberately no update
/// or delete. Public keys never rotate in this design, and `clear` removes
/// memories, not the identity.
pub trait IdentityBackend: Send + Sync {
    /// Insert an identity record if no record exists for its agent ID.
    ///
    /// Returns `true` if the record was inserted, `false` if the ID was
    /// already taken. The check-and-insert must be atomic — this is what
    /// makes the registration collision-retry loop sound under concurrent
    /// registrations.
    fn insert_identity(&self, identity: &AgentIdentity) -> Result<bool, StorageError>;

    /// Look up an identity by agent ID.
    fn get_identity(&self, agent_id: &AgentId) -> Result<Option<AgentIdentity>, StorageError>;

    /// Total number of registered identities. Feeds `/stats`.
    fn identity_count(&self) -> Result<u64, StorageError>;
}

/// Version table capabilities: append, ordered reads, delete-all.
///
/// Versions are append-only and never mutated in place. The backend does
/// not assign version numbers — [`crate::memory::MemoryStore`] computes
/// them under a per-agent lock and hands down complete records.
pub trait VersionBackend: Send + Sync {
    /// The highest version number stored for an agent, or `None` if the
    /// agent has no versions (never stored, or cleared).
    fn max_version(&self, agent_id: &AgentId) -> Result<Option<u64>, StorageError>;

    /// Append a fully-formed version record.
    fn append_version(&self, version: &MemoryVersion) -> Result<(), StorageError>;

    /// The version record with the highest version number for an agent.
    fn latest_version(&self, agent_id: &AgentId) -> Result<Option<MemoryVersion>, StorageError>;

    /// All version records for an agent in ascending version order.
    /// Empty vector (not an error) when the agent has none.
    fn all_versions(&self, agent_id: &AgentId) -> Result<Vec<MemoryVersion>, StorageError>;

    /// Remove every version for an agent atomically. Returns the number
    /// of versions removed. Partial deletion is not an acceptable outcome:
    /// either all rows go or the prior set stays intact.
    fn delete_all_versions(&self, agent_id: &AgentId) -> Result<u64, StorageError>;

    /// Total number of stored versions across all agents. Feeds `/stats`.
    fn version_count(&self) -> Result<u64, StorageError>;
}
