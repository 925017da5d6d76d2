//! # Wire Types
//!
//! The JSON request and response shapes shared by the client library and
//! the service facade. Everything binary crosses the wire as base64 in a
//! `String` field; decoding back to bytes (and rejecting garbage with a
//! validation error) is the facade's first move on every request.
//!
//! These types are the contract. Field names are load-bearing: clients in
//! the field serialize against them, so renames are protocol breaks.

use serde::{Deserialize, Serialize};

/// Response to `register`. The recovery phrase appears here and in no
/// other message, ever.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    /// 64-character lowercase hex digest of the public key.
    pub agent_id: String,
    /// Ed25519 public key, base64.
    pub public_key: String,
    /// 24 space-separated words. Shown once; never retrievable again.
    pub recovery_phrase: String,
}

/// Request to `recover`.
///
/// Carries the re-derived public key, not the phrase: the phrase is seed
/// material and never crosses to the service. The client decodes it
/// locally, regenerates the keypair, and presents only the public half.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoverRequest {
    /// Ed25519 public key regenerated from the recovery phrase, base64.
    pub public_key: String,
}

/// Response to `recover`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoverResponse {
    pub agent_id: String,
    pub public_key: String,
}

/// Request to `store` a new memory version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreRequest {
    pub agent_id: String,
    /// The encrypted blob, base64. Opaque to the service.
    pub encrypted_data: String,
    /// Ed25519 signature over the canonical message, base64.
    pub signature: String,
    /// RFC 3339 UTC timestamp, exactly as signed.
    pub timestamp: String,
}

/// Response to `store`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreResponse {
    /// The version number assigned to the stored blob.
    pub version_number: u64,
}

/// A signed request with no body: `retrieve`, `history`, and `clear` all
/// share this shape and differ only in the operation token that was signed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedRequest {
    pub agent_id: String,
    pub signature: String,
    pub timestamp: String,
}

/// One version as it appears in `retrieve` and `history` responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionEntry {
    pub version_number: u64,
    /// The encrypted blob, base64, byte-for-byte what was stored.
    pub encrypted_data: String,
    /// RFC 3339 UTC timestamp of when the version was written.
    pub created_at: String,
}

/// Response to `history`: every version in ascending order. Empty is a
/// normal answer, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub versions: Vec<VersionEntry>,
}

/// Response to `clear`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearResponse {
    /// Always `true` on success; present so the response has a body.
    pub deleted: bool,
    /// How many versions were removed. Zero if nothing was stored.
    pub versions_removed: u64,
}

/// Response to `stats`. Unauthenticated aggregate counters only — nothing
/// here identifies an agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_agents: u64,
    pub total_memories: u64,
    pub average_versions_per_agent: f64,
}
