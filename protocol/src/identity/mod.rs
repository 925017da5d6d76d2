//! # Identity Module
//!
//! Self-sovereign identity management for Claw agents. Every agent is
//! identified by an Ed25519 keypair, from which we derive a fixed-width
//! hex agent ID (SHA-256 of the public key).
//!
//! The identity stack is layered:
//!
//! 1. **Keypair** — Raw Ed25519 key material. Signs things, proves ownership.
//!    (Lives in [`crate::crypto::keys`]; re-exported here.)
//! 2. **Agent ID** — SHA-256 digest of the public key, hex-encoded. This is
//!    what the service keys everything by. Always recomputed server-side,
//!    never accepted from the client as-is.
//! 3. **Recovery** — A checksummed 24-word phrase (BIP-39 construction)
//!    encoding the 32-byte seed. Transcribable by a human onto paper;
//!    decodable back into the exact same keypair years later.
//! 4. **Manager** — Registration and re-linking against the identity table.
//!
//! ## Design Decisions
//!
//! - Ed25519 via `ed25519-dalek` (RFC 8032 compliant): fast, compact,
//!   deterministic signatures.
//! - The agent ID is the *full* 256-bit digest. Truncating would save
//!   bytes and invite collisions; we do not truncate.
//! - The recovery phrase encodes the seed, not the expanded private key.
//!   In Ed25519 the 32-byte seed *is* the secret, so phrase ⇄ seed ⇄
//!   keypair is an exact round-trip with no extra state.

pub mod agent_id;
pub mod manager;
pub mod recovery;

pub use crate::crypto::keys::{AgentKeypair, AgentPublicKey, AgentSignature};
pub use agent_id::AgentId;
pub use manager::{AgentIdentity, IdentityError, IdentityManager, RegisteredIdentity};
pub use recovery::{decode_phrase, encode_phrase, RecoveryError};
