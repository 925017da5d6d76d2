//! # Cryptographic Primitives
//!
//! Ed25519 key material and SHA-256 digests — everything the identity and
//! authentication layers build on. Nothing in here knows about agents,
//! memories, or wire formats; it's keys, signatures, and hashes, full stop.
//!
//! Ed25519 was chosen for its deterministic signatures, small key and
//! signature sizes, and well-audited constant-time implementations. We use
//! the `ed25519-dalek` crate (RFC 8032 compliant). SHA-256 is used for agent
//! ID derivation and payload digests because the recovery-phrase checksum
//! (BIP-39) already commits us to SHA-256 — one hash function, no debates.

pub mod hash;
pub mod keys;

pub use hash::{payload_digest, sha256, sha256_array, sha256_hex};
pub use keys::{AgentKeypair, AgentPublicKey, AgentSignature, KeyError};
