//! # Identity Manager
//!
//! Registration and re-linking of agent identities against the identity
//! table. This is the only component that ever *creates* key material on
//! the service side, and it does so with a strict discipline: the private
//! seed and the recovery phrase live exactly as long as the registration
//! call, travel out in the response, and are never written anywhere.
//!
//! Recovery is deliberately asymmetric: the phrase never comes back to the
//! service. The agent decodes it locally ([`crate::client`]), regenerates
//! the keypair, and presents only the public key; [`IdentityManager::relink`]
//! re-derives the agent ID and confirms it matches the stored record.

use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::config::{IDENTITY_SEED_LENGTH, MAX_REGISTRATION_ATTEMPTS};
use crate::crypto::keys::{AgentKeypair, AgentPublicKey};
use crate::identity::agent_id::AgentId;
use crate::identity::recovery;
use crate::storage::backend::{IdentityBackend, StorageError};

/// Errors from identity operations.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Every registration attempt derived an agent ID that already exists.
    /// With a 256-bit digest this indicates a broken RNG, not bad luck.
    #[error("agent id collision persisted across {MAX_REGISTRATION_ATTEMPTS} attempts")]
    Collision,

    /// No identity record exists for the presented public key.
    #[error("no registered identity for the presented public key")]
    UnknownAgent,

    /// An identity record exists but holds a different public key.
    /// Should be impossible while agent IDs are full digests of the key;
    /// seeing this means the identity table has been corrupted.
    #[error("stored public key does not match the presented public key")]
    PublicKeyMismatch,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// The persisted identity record — the public half only.
///
/// Immutable once written: the public key never rotates and `clear` does
/// not touch it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentIdentity {
    /// SHA-256 digest of `public_key`, hex-encoded.
    pub agent_id: AgentId,
    /// The agent's Ed25519 public key.
    pub public_key: AgentPublicKey,
    /// When the identity was registered.
    pub created_at: DateTime<Utc>,
}

/// What a fresh registration hands back to the caller — exactly once.
///
/// Contains the recovery phrase, which is seed material. This struct must
/// go straight into the transport response and then out of scope; it is
/// intentionally not `Serialize`-able into storage types and carries no
/// secret beyond the phrase itself.
#[derive(Debug, Clone)]
pub struct RegisteredIdentity {
    pub agent_id: AgentId,
    pub public_key: AgentPublicKey,
    /// 24 words. The one and only time the service ever sees them.
    pub recovery_phrase: String,
}

/// Creates identities and re-links recovered ones.
#[derive(Clone)]
pub struct IdentityManager {
    identities: Arc<dyn IdentityBackend>,
}

impl IdentityManager {
    pub fn new(identities: Arc<dyn IdentityBackend>) -> Self {
        Self { identities }
    }

    /// Register a brand-new agent identity.
    ///
    /// Draws 32 bytes from the OS CSPRNG, derives the keypair and agent ID,
    /// encodes the recovery phrase from the same entropy, and persists only
    /// `{agent_id, public_key, created_at}`. The seed and phrase exist in
    /// the return value and nowhere else.
    ///
    /// If the derived agent ID is already taken (first-writer-wins at the
    /// backend), regenerates from fresh entropy up to
    /// [`MAX_REGISTRATION_ATTEMPTS`] times before giving up.
    pub fn register(&self) -> Result<RegisteredIdentity, IdentityError> {
        for attempt in 1..=MAX_REGISTRATION_ATTEMPTS {
            let mut seed = [0u8; IDENTITY_SEED_LENGTH];
            rand::rngs::OsRng.fill_bytes(&mut seed);

            let keypair = AgentKeypair::from_seed(&seed);
            let public_key = keypair.public_key();
            let agent_id = AgentId::derive(&public_key);
            let recovery_phrase = recovery::encode_phrase(&seed)
                .expect("identity seed length is a supported entropy length");

            let identity = AgentIdentity {
                agent_id: agent_id.clone(),
                public_key: public_key.clone(),
                created_at: Utc::now(),
            };

            if self.identities.insert_identity(&identity)? {
                tracing::info!(agent_id = %agent_id.short(), "agent registered");
                return Ok(RegisteredIdentity {
                    agent_id,
                    public_key,
                    recovery_phrase,
                });
            }

            tracing::warn!(
                agent_id = %agent_id.short(),
                attempt,
                "agent id collision on registration, regenerating"
            );
        }

        Err(IdentityError::Collision)
    }

    /// Re-link a recovered identity from its public key.
    ///
    /// The client has already decoded the phrase and regenerated the
    /// keypair locally; all that crosses the boundary is the public key.
    /// We re-derive the agent ID, look up the stored record, and confirm
    /// the stored key matches before handing the descriptor back.
    pub fn relink(&self, public_key: &AgentPublicKey) -> Result<AgentIdentity, IdentityError> {
        let agent_id = AgentId::derive(public_key);

        let identity = self
            .identities
            .get_identity(&agent_id)?
            .ok_or(IdentityError::UnknownAgent)?;

        if identity.public_key != *public_key {
            return Err(IdentityError::PublicKeyMismatch);
        }

        tracing::info!(agent_id = %agent_id.short(), "identity re-linked");
        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::sha256_hex;
    use crate::storage::MemoryBackend;

    fn manager() -> (IdentityManager, Arc<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new());
        (IdentityManager::new(backend.clone()), backend)
    }

    #[test]
    fn register_derives_id_from_public_key() {
        let (manager, _) = manager();
        let registered = manager.register().unwrap();
        assert_eq!(
            registered.agent_id.as_str(),
            sha256_hex(registered.public_key.as_bytes())
        );
    }

    #[test]
    fn register_persists_only_the_public_half() {
        let (manager, backend) = manager();
        let registered = manager.register().unwrap();

        let stored = backend
            .get_identity(&registered.agent_id)
            .unwrap()
            .expect("identity should be persisted");
        assert_eq!(stored.public_key, registered.public_key);

        // The record type has no field that could hold the phrase or seed;
        // this assertion documents that the stored form is just the triple.
        let json = serde_json::to_string(&stored).unwrap();
        assert!(!json.contains(&registered.recovery_phrase));
    }

    #[test]
    fn phrase_regenerates_the_registered_keypair() {
        let (manager, _) = manager();
        let registered = manager.register().unwrap();

        let entropy = recovery::decode_phrase(&registered.recovery_phrase).unwrap();
        let seed: [u8; 32] = entropy.as_slice().try_into().unwrap();
        let keypair = AgentKeypair::from_seed(&seed);

        assert_eq!(keypair.public_key(), registered.public_key);
        assert_eq!(AgentId::derive(&keypair.public_key()), registered.agent_id);
    }

    #[test]
    fn registrations_produce_distinct_identities() {
        let (manager, _) = manager();
        let a = manager.register().unwrap();
        let b = manager.register().unwrap();
        assert_ne!(a.agent_id, b.agent_id);
        assert_ne!(a.recovery_phrase, b.recovery_phrase);
    }

    #[test]
    fn relink_returns_the_registered_identity() {
        let (manager, _) = manager();
        let registered = manager.register().unwrap();

        let relinked = manager.relink(&registered.public_key).unwrap();
        assert_eq!(relinked.agent_id, registered.agent_id);
        assert_eq!(relinked.public_key, registered.public_key);
    }

    #[test]
    fn relink_unknown_key_fails() {
        let (manager, _) = manager();
        let stranger = AgentKeypair::generate();
        assert!(matches!(
            manager.relink(&stranger.public_key()),
            Err(IdentityError::UnknownAgent)
        ));
    }

    #[test]
    fn collision_exhausts_bounded_retries() {
        /// A backend where every agent ID is somehow already taken.
        struct SaturatedBackend;

        impl IdentityBackend for SaturatedBackend {
            fn insert_identity(&self, _: &AgentIdentity) -> Result<bool, StorageError> {
                Ok(false)
            }
            fn get_identity(&self, _: &AgentId) -> Result<Option<AgentIdentity>, StorageError> {
                Ok(None)
            }
            fn identity_count(&self) -> Result<u64, StorageError> {
                Ok(u64::MAX)
            }
        }

        let manager = IdentityManager::new(Arc::new(SaturatedBackend));
        assert!(matches!(manager.register(), Err(IdentityError::Collision)));
    }
}
