//! # Agent IDs
//!
//! An agent ID is the SHA-256 digest of the agent's Ed25519 public key,
//! encoded as 64 lowercase hex characters. It is the primary key for both
//! persisted tables and the identifier agents quote in every signed request.
//!
//! The invariant that keeps this honest: the service never trusts a
//! client-supplied ID on its own. Registration and recovery derive the ID
//! from the public key server-side; request authentication looks the ID up
//! and verifies the signature against the *stored* key. A forged ID either
//! misses the table or fails verification.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::config::AGENT_ID_LENGTH;
use crate::crypto::keys::AgentPublicKey;
use crate::crypto::sha256_hex;

/// Errors parsing an agent ID from untrusted input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AgentIdError {
    #[error("agent id must be {AGENT_ID_LENGTH} characters, got {0}")]
    WrongLength(usize),

    #[error("agent id must be lowercase hex")]
    NotHex,
}

/// A deterministic, collision-resistant identifier for one agent.
///
/// Internally a validated 64-character lowercase hex string. Cheap to
/// clone, hashable, and ordered — suitable as a map key everywhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    /// Derive the agent ID from a public key: `hex(sha256(public_key))`.
    ///
    /// This is the only way a *new* ID ever comes into existence. Parsing
    /// ([`parse`](Self::parse)) only re-validates IDs that were originally
    /// derived here.
    pub fn derive(public_key: &AgentPublicKey) -> Self {
        Self(sha256_hex(public_key.as_bytes()))
    }

    /// Validate an ID received from the wire.
    ///
    /// Checks length and character set only — whether the ID actually
    /// exists is the identity table's business, and whether the caller
    /// *owns* it is the signature verifier's.
    pub fn parse(s: &str) -> Result<Self, AgentIdError> {
        if s.len() != AGENT_ID_LENGTH {
            return Err(AgentIdError::WrongLength(s.len()));
        }
        if !s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)) {
            return Err(AgentIdError::NotHex);
        }
        Ok(Self(s.to_string()))
    }

    /// The hex string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for logs: first 16 hex characters.
    ///
    /// Agent IDs are not secret, but full 64-character IDs make log lines
    /// unreadable. 64 bits of prefix is plenty to correlate.
    pub fn short(&self) -> &str {
        &self.0[..16]
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
