//! # Memory Service Facade
//!
//! The one type the transport layer talks to. Wires together the identity
//! manager, the signature verifier, and the memory store over a shared
//! pair of storage backends, and exposes exactly the seven operations of
//! the protocol: register, recover, store, retrieve, history, clear, stats.
//!
//! Responsibilities at this layer, in order, on every request:
//!
//! 1. **Parse** — decode base64 fields and validate the agent ID shape.
//!    Failures here are [`ServiceError::Validation`]; nothing has been
//!    looked up yet, let alone written.
//! 2. **Authenticate** — hand the parsed pieces to the verifier (signed
//!    operations only). Failures collapse to "unauthorized" on the wire.
//! 3. **Execute** — call the domain layer and shape the wire response.
//!
//! The facade is `Clone` and `Send + Sync`; one instance serves the whole
//! process.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{Operation, SignatureVerifier};
use crate::config::DEFAULT_FRESHNESS_WINDOW;
use crate::crypto::keys::{AgentPublicKey, AgentSignature};
use crate::crypto::payload_digest;
use crate::error::ServiceError;
use crate::identity::{AgentId, IdentityManager};
use crate::memory::{MemoryStore, MemoryVersion};
use crate::storage::{IdentityBackend, VersionBackend};
use crate::wire::{
    ClearResponse, HistoryResponse, RecoverRequest, RecoverResponse, RegisterResponse,
    SignedRequest, StatsResponse, StoreRequest, StoreResponse, VersionEntry,
};

/// Tunables for a service instance.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Maximum tolerated skew between a request timestamp and server time.
    pub freshness_window: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            freshness_window: DEFAULT_FRESHNESS_WINDOW,
        }
    }
}

/// The assembled service.
#[derive(Clone)]
pub struct MemoryService {
    identities: Arc<dyn IdentityBackend>,
    manager: IdentityManager,
    verifier: SignatureVerifier,
    memories: MemoryStore,
}

impl MemoryService {
    /// Assemble a service over the given backends.
    ///
    /// `identities` and `versions` may be the same object (sled serves
    /// both trees) or different ones (tests mix and match).
    pub fn new(
        identities: Arc<dyn IdentityBackend>,
        versions: Arc<dyn VersionBackend>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            manager: IdentityManager::new(identities.clone()),
            verifier: SignatureVerifier::with_window(identities.clone(), config.freshness_window),
            memories: MemoryStore::new(versions),
            identities,
        }
    }

    /// A service over in-memory backends with default config. Tests.
    pub fn in_memory() -> Self {
        let backend = Arc::new(crate::storage::MemoryBackend::new());
        Self::new(backend.clone(), backend, ServiceConfig::default())
    }

    // --- identity operations -------------------------------------------

    /// Register a new agent. Unauthenticated by nature: there is no key
    /// to sign with until this returns.
    pub fn register(&self) -> Result<RegisterResponse, ServiceError> {
        let registered = self.manager.register()?;
        Ok(RegisterResponse {
            agent_id: registered.agent_id.as_str().to_string(),
            public_key: registered.public_key.to_base64(),
            recovery_phrase: registered.recovery_phrase,
        })
    }

    /// Re-link a recovered identity from its public key.
    pub fn recover(&self, req: &RecoverRequest) -> Result<RecoverResponse, ServiceError> {
        let public_key = AgentPublicKey::from_base64(&req.public_key)
            .map_err(|_| ServiceError::Validation("public_key is not a valid key".into()))?;

        let identity = self.manager.relink(&public_key)?;
        Ok(RecoverResponse {
            agent_id: identity.agent_id.as_str().to_string(),
            public_key: identity.public_key.to_base64(),
        })
    }

    // --- memory operations ----------------------------------------------

    /// Store a new memory version.
    pub fn store(&self, req: &StoreRequest) -> Result<StoreResponse, ServiceError> {
        let agent_id = parse_agent_id(&req.agent_id)?;
        let blob = BASE64
            .decode(&req.encrypted_data)
            .map_err(|_| ServiceError::Validation("encrypted_data is not valid base64".into()))?;
        let signature = parse_signature(&req.signature)?;

        self.verifier.verify(
            &agent_id,
            Operation::Store,
            &payload_digest(&blob),
            &req.timestamp,
            &signature,
        )?;

        let version = self.memories.store(&agent_id, blob)?;
        Ok(StoreResponse {
            version_number: version.version_number,
        })
    }

    /// Retrieve the latest memory version.
    pub fn retrieve(&self, req: &SignedRequest) -> Result<VersionEntry, ServiceError> {
        let agent_id = self.verify_bodyless(req, Operation::Retrieve)?;
        let version = self.memories.retrieve(&agent_id)?;
        Ok(version_entry(&version))
    }

    /// List every memory version, ascending.
    pub fn history(&self, req: &SignedRequest) -> Result<HistoryResponse, ServiceError> {
        let agent_id = self.verify_bodyless(req, Operation::History)?;
        let versions = self.memories.history(&agent_id)?;
        Ok(HistoryResponse {
            versions: versions.iter().map(version_entry).collect(),
        })
    }

    /// Delete every memory version for the agent.
    pub fn clear(&self, req: &SignedRequest) -> Result<ClearResponse, ServiceError> {
        let agent_id = self.verify_bodyless(req, Operation::Clear)?;
        let removed = self.memories.clear(&agent_id)?;
        Ok(ClearResponse {
            deleted: true,
            versions_removed: removed,
        })
    }

    // --- aggregates -------------------------------------------------------

    /// Unauthenticated aggregate counters.
    pub fn stats(&self) -> Result<StatsResponse, ServiceError> {
        let total_agents = self.identities.identity_count()?;
        let total_memories = self.memories.total_versions()?;
        let average = if total_agents == 0 {
            0.0
        } else {
            total_memories as f64 / total_agents as f64
        };
        Ok(StatsResponse {
            total_agents,
            total_memories,
            average_versions_per_agent: average,
        })
    }

    fn verify_bodyless(
        &self,
        req: &SignedRequest,
        operation: Operation,
    ) -> Result<AgentId, ServiceError> {
        let agent_id = parse_agent_id(&req.agent_id)?;
        let signature = parse_signature(&req.signature)?;
        self.verifier.verify(
            &agent_id,
            operation,
            &payload_digest(b""),
            &req.timestamp,
            &signature,
        )?;
        Ok(agent_id)
    }
}

fn parse_agent_id(s: &str) -> Result<AgentId, ServiceError> {
    AgentId::parse(s).map_err(|e| ServiceError::Validation(format!("agent_id: {e}")))
}

fn parse_signature(s: &str) -> Result<AgentSignature, ServiceError> {
    AgentSignature::from_base64(s)
        .map_err(|_| ServiceError::Validation("signature is not a valid base64 signature".into()))
}

fn version_entry(version: &MemoryVersion) -> VersionEntry {
    VersionEntry {
        version_number: version.version_number,
        encrypted_data: BASE64.encode(&version.encrypted_blob),
        created_at: version.created_at.to_rfc3339(),
    }
}
