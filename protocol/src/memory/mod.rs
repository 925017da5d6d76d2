//! # Versioned Memory
//!
//! Append-only, per-agent storage of opaque encrypted blobs. Every store
//! creates a new version; nothing is ever overwritten. The version record
//! and the store that manages the sequence live here; the bytes themselves
//! are ciphertext the service cannot read and never inspects.

pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::AgentId;

pub use store::{MemoryError, MemoryStore};

/// One immutable memory snapshot.
///
/// `encrypted_blob` is exactly what the client sent — no framing, no
/// compression, no inspection. The service stores bytes and hands back
/// bytes; whether they decrypt is between the agent and its key.
/// Base64 framing belongs to the wire layer ([`crate::wire`]); in here and
/// in storage the blob is raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryVersion {
    /// Owner of this version.
    pub agent_id: AgentId,
    /// Position in the agent's version sequence. Starts at 1, increments
    /// by 1 per store, and restarts at 1 after a clear.
    pub version_number: u64,
    /// The opaque ciphertext, verbatim.
    pub encrypted_blob: Vec<u8>,
    /// When the version was written, service clock.
    pub created_at: DateTime<Utc>,
}
