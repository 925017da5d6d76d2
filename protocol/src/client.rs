//! # Agent Client
//!
//! The key-holding half of the protocol. Everything that touches private
//! material lives here and runs in the *agent's* process: keeping the
//! signing key, decoding the recovery phrase, and producing signed request
//! payloads. The service side only ever sees what these builders emit —
//! public keys, agent IDs, signatures, and ciphertext.
//!
//! A client comes into existence one of two ways:
//!
//! - from the recovery phrase handed back by `register` (the normal path,
//!   [`AgentClient::from_phrase`]), or
//! - from a raw 32-byte seed the agent kept itself
//!   ([`AgentClient::from_seed`]).
//!
//! Either way the same keypair and agent ID fall out deterministically.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::auth::{canonical_message, Operation};
use crate::config::IDENTITY_SEED_LENGTH;
use crate::crypto::{payload_digest, AgentKeypair};
use crate::identity::recovery::{self, RecoveryError};
use crate::identity::AgentId;
use crate::wire::{RecoverRequest, SignedRequest, StoreRequest};

/// Errors constructing a client from recovery material.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClientError {
    #[error(transparent)]
    Recovery(#[from] RecoveryError),

    /// The phrase decoded cleanly but to the wrong amount of entropy.
    /// Identity seeds are always 32 bytes (24 words); a 12-word phrase is
    /// a valid BIP-39 phrase but not a valid *identity*.
    #[error("phrase decodes to {0} bytes of entropy, identity seeds are {IDENTITY_SEED_LENGTH}")]
    WrongSeedLength(usize),
}

/// A signing agent: keypair plus the derived agent ID.
#[derive(Clone)]
pub struct AgentClient {
    keypair: AgentKeypair,
    agent_id: AgentId,
}

impl std::fmt::Debug for AgentClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The keypair's own Debug already refuses to print secrets; the
        // short agent ID is all anyone needs from a log line.
        write!(f, "AgentClient({})", self.agent_id.short())
    }
}

impl AgentClient {
    /// Rebuild the client from a recovery phrase.
    ///
    /// This is the decode path that never runs server-side. Accepts messy
    /// whitespace and case the same way [`recovery::decode_phrase`] does.
    pub fn from_phrase(phrase: &str) -> Result<Self, ClientError> {
        let entropy = recovery::decode_phrase(phrase)?;
        let seed: [u8; IDENTITY_SEED_LENGTH] = entropy
            .as_slice()
            .try_into()
            .map_err(|_| ClientError::WrongSeedLength(entropy.len()))?;
        Ok(Self::from_seed(&seed))
    }

    /// Rebuild the client from the raw seed.
    pub fn from_seed(seed: &[u8; IDENTITY_SEED_LENGTH]) -> Self {
        let keypair = AgentKeypair::from_seed(seed);
        let agent_id = AgentId::derive(&keypair.public_key());
        Self { keypair, agent_id }
    }

    pub fn agent_id(&self) -> &AgentId {
        &self.agent_id
    }

    /// The public key in the base64 form the wire expects.
    pub fn public_key_base64(&self) -> String {
        self.keypair.public_key().to_base64()
    }

    /// Build the `recover` request: just the regenerated public key.
    pub fn recover_request(&self) -> RecoverRequest {
        RecoverRequest {
            public_key: self.public_key_base64(),
        }
    }

    /// Build a signed `store` request for an encrypted blob, timestamped now.
    pub fn store_request(&self, encrypted_blob: &[u8]) -> StoreRequest {
        self.store_request_at(encrypted_blob, Utc::now())
    }

    /// [`store_request`](Self::store_request) with an explicit timestamp.
    /// Exists so freshness-window behavior is testable without sleeping.
    pub fn store_request_at(
        &self,
        encrypted_blob: &[u8],
        timestamp: DateTime<Utc>,
    ) -> StoreRequest {
        let ts = timestamp.to_rfc3339();
        let signature = self.sign(Operation::Store, encrypted_blob, &ts);
        StoreRequest {
            agent_id: self.agent_id.as_str().to_string(),
            encrypted_data: BASE64.encode(encrypted_blob),
            signature,
            timestamp: ts,
        }
    }

    /// Build a signed `retrieve` request, timestamped now.
    pub fn retrieve_request(&self) -> SignedRequest {
        self.signed_request_at(Operation::Retrieve, Utc::now())
    }

    /// Build a signed `history` request, timestamped now.
    pub fn history_request(&self) -> SignedRequest {
        self.signed_request_at(Operation::History, Utc::now())
    }

    /// Build a signed `clear` request, timestamped now.
    pub fn clear_request(&self) -> SignedRequest {
        self.signed_request_at(Operation::Clear, Utc::now())
    }

    /// Build any body-less signed request with an explicit timestamp.
    pub fn signed_request_at(
        &self,
        operation: Operation,
        timestamp: DateTime<Utc>,
    ) -> SignedRequest {
        let ts = timestamp.to_rfc3339();
        SignedRequest {
            agent_id: self.agent_id.as_str().to_string(),
            signature: self.sign(operation, b"", &ts),
            timestamp: ts,
        }
    }

    fn sign(&self, operation: Operation, payload: &[u8], timestamp: &str) -> String {
        let digest = payload_digest(payload);
        let message = canonical_message(operation, &digest, timestamp);
        self.keypair.sign(&message).to_base64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::AgentPublicKey;
    use crate::crypto::keys::AgentSignature;

    fn client() -> AgentClient {
        AgentClient::from_seed(&[0x42; 32])
    }

    #[test]
    fn same_seed_same_identity() {
        let a = AgentClient::from_seed(&[7; 32]);
        let b = AgentClient::from_seed(&[7; 32]);
        assert_eq!(a.agent_id(), b.agent_id());
        assert_eq!(a.public_key_base64(), b.public_key_base64());
    }

    #[test]
    fn phrase_and_seed_agree() {
        let seed = [0x42u8; 32];
        let phrase = recovery::encode_phrase(&seed).unwrap();

        let from_seed = AgentClient::from_seed(&seed);
        let from_phrase = AgentClient::from_phrase(&phrase).unwrap();
        assert_eq!(from_seed.agent_id(), from_phrase.agent_id());
    }

    #[test]
    fn twelve_word_phrase_is_not_an_identity() {
        let phrase = recovery::encode_phrase(&[0u8; 16]).unwrap();
        assert_eq!(
            AgentClient::from_phrase(&phrase).unwrap_err(),
            ClientError::WrongSeedLength(16)
        );
    }

    #[test]
    fn garbage_phrase_surfaces_the_decode_error() {
        assert!(matches!(
            AgentClient::from_phrase("not a phrase at all"),
            Err(ClientError::Recovery(RecoveryError::InvalidPhraseLength(5)))
        ));
    }

    #[test]
    fn store_request_signature_verifies() {
        let client = client();
        let blob = b"ciphertext bytes";
        let req = client.store_request(blob);

        let public_key =
            AgentPublicKey::from_base64(&client.public_key_base64()).unwrap();
        let signature = AgentSignature::from_base64(&req.signature).unwrap();
        let message = canonical_message(
            Operation::Store,
            &payload_digest(blob),
            &req.timestamp,
        );
        assert!(public_key.verify(&message, &signature));

        assert_eq!(BASE64.decode(&req.encrypted_data).unwrap(), blob);
        assert_eq!(req.agent_id, client.agent_id().as_str());
    }

    #[test]
    fn bodyless_requests_sign_the_empty_digest() {
        let client = client();
        let req = client.retrieve_request();

        let public_key =
            AgentPublicKey::from_base64(&client.public_key_base64()).unwrap();
        let signature = AgentSignature::from_base64(&req.signature).unwrap();
        let message = canonical_message(
            Operation::Retrieve,
            &payload_digest(b""),
            &req.timestamp,
        );
        assert!(public_key.verify(&message, &signature));
    }

    #[test]
    fn operations_do_not_share_signatures() {
        let client = client();
        let ts = Utc::now();
        let retrieve = client.signed_request_at(Operation::Retrieve, ts);
        let clear = client.signed_request_at(Operation::Clear, ts);
        assert_ne!(retrieve.signature, clear.signature);
    }
}
