//! # Signature Verifier
//!
//! Validates that an inbound request was signed by the private key behind
//! a registered agent ID and that its timestamp falls inside the freshness
//! window. Every authenticated operation passes through here before any
//! storage work happens — a failed verification has zero side effects.
//!
//! ## Check order
//!
//! Timestamp parse → freshness → identity lookup → signature. Cheapest
//! first, and the signature check (the only expensive one) runs last so
//! garbage requests are shed early. The *internal* error taxonomy is
//! precise for logs and tests; the transport layer collapses all of it
//! into a uniform "unauthorized" so callers can't use error differences
//! as an oracle to distinguish unknown agents from bad signatures.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::DEFAULT_FRESHNESS_WINDOW;
use crate::crypto::keys::AgentSignature;
use crate::identity::{AgentId, AgentIdentity};
use crate::storage::backend::{IdentityBackend, StorageError};

use super::{canonical_message, Operation};

/// Reasons a request fails authentication.
///
/// All terminal for the request — the verifier never retries anything.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No registered identity for the claimed agent ID.
    #[error("unknown agent")]
    UnknownAgent,

    /// The signature does not verify against the registered public key.
    #[error("invalid signature")]
    InvalidSignature,

    /// The timestamp is outside the freshness window (either direction).
    #[error("request timestamp outside the freshness window")]
    StaleTimestamp,

    /// The timestamp could not be parsed as RFC 3339.
    #[error("malformed request timestamp")]
    MalformedTimestamp,

    /// The identity lookup itself failed. A service-side fault, not an
    /// authentication verdict — the facade maps this back out of the
    /// auth taxonomy.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Stateless verifier for signed memory operations.
#[derive(Clone)]
pub struct SignatureVerifier {
    identities: Arc<dyn IdentityBackend>,
    freshness_window: Duration,
}

impl SignatureVerifier {
    /// Create a verifier with the default five-minute freshness window.
    pub fn new(identities: Arc<dyn IdentityBackend>) -> Self {
        Self::with_window(identities, DEFAULT_FRESHNESS_WINDOW)
    }

    /// Create a verifier with a custom freshness window.
    pub fn with_window(identities: Arc<dyn IdentityBackend>, freshness_window: Duration) -> Self {
        Self {
            identities,
            freshness_window,
        }
    }

    /// Verify one signed request.
    ///
    /// On success returns the registered identity so the caller doesn't
    /// have to look it up a second time. On failure, nothing has happened:
    /// the verifier reads the identity table and touches nothing else.
    pub fn verify(
        &self,
        agent_id: &AgentId,
        operation: Operation,
        payload_digest: &str,
        timestamp: &str,
        signature: &AgentSignature,
    ) -> Result<AgentIdentity, AuthError> {
        let sent_at = DateTime::parse_from_rfc3339(timestamp)
            .map_err(|_| AuthError::MalformedTimestamp)?
            .with_timezone(&Utc);

        // abs(): client clocks run fast as often as slow, and a timestamp
        // from the future is just as suspect as one from the past.
        let skew = (Utc::now() - sent_at).abs();
        let window = chrono::Duration::from_std(self.freshness_window)
            .unwrap_or_else(|_| chrono::Duration::max_value());
        if skew > window {
            tracing::debug!(
                agent_id = %agent_id.short(),
                %operation,
                skew_seconds = skew.num_seconds(),
                "rejected stale request"
            );
            return Err(AuthError::StaleTimestamp);
        }

        let identity = self
            .identities
            .get_identity(agent_id)?
            .ok_or(AuthError::UnknownAgent)?;

        let message = canonical_message(operation, payload_digest, timestamp);
        if !identity.public_key.verify(&message, signature) {
            tracing::debug!(
                agent_id = %agent_id.short(),
                %operation,
                "rejected request with invalid signature"
            );
            return Err(AuthError::InvalidSignature);
        }

        Ok(identity)
    }
}
