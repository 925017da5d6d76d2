//! # Key Management
//!
//! Ed25519 keypair generation and serialization for agent identities.
//!
//! Every agent has exactly one Ed25519 keypair. The public half is what the
//! service stores and what the agent ID is derived from; the private half
//! never leaves the agent's process.
//!
//! ## Security considerations
//!
//! - Private keys are zeroized on drop (thanks, ed25519-dalek).
//! - Fresh keys come from the OS CSPRNG (`OsRng`). If your OS RNG is broken,
//!   you have bigger problems than Claw.
//! - Key bytes are never logged. If you add logging to this module, you
//!   will be asked to leave.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use ed25519_dalek::{
    Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey, SECRET_KEY_LENGTH,
};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// Errors that can occur during key operations.
///
/// Intentionally vague about *why* something failed — leaking details about
/// key material through error messages is a classic footgun.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid secret key bytes: wrong length or not a valid scalar")]
    InvalidSecretKey,

    #[error("invalid public key bytes: not a valid Ed25519 point")]
    InvalidPublicKey,

    #[error("invalid signature bytes: expected 64 bytes")]
    InvalidSignature,
}

/// An agent's Ed25519 keypair — the root of its identity.
///
/// Everything else (the agent ID, the recovery phrase, every signed request)
/// derives from this. The `SigningKey` is the crown jewel: it exists only in
/// the agent's own process, never in the service.
///
/// ## Serialization
///
/// `AgentKeypair` intentionally does NOT implement `Serialize`/`Deserialize`.
/// Serializing private keys should be a deliberate, conscious act, not
/// something that happens because someone shoved a keypair into a JSON
/// response. Use `seed_bytes()` / `from_seed()` explicitly.
pub struct AgentKeypair {
    /// The Ed25519 signing (private) key. 32 bytes of pure responsibility.
    signing_key: SigningKey,
}

/// The public half of an agent identity, safe to share with the world.
///
/// This is what the service persists at registration and verifies signed
/// requests against. Losing it is inconvenient but not catastrophic — it
/// can always be re-derived from the signing key.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentPublicKey {
    bytes: [u8; 32],
}

/// An Ed25519 signature over a canonical request message.
///
/// 64 bytes, deterministic for a given (key, message) pair. Stored as
/// `Vec<u8>` for serde compatibility, but always exactly 64 bytes. If
/// someone hands you an `AgentSignature` that isn't 64 bytes, verification
/// will simply fail — no panics, no undefined behavior, just `false`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSignature {
    bytes: Vec<u8>,
}

impl AgentKeypair {
    /// Generate a fresh keypair from the OS cryptographic RNG.
    ///
    /// Used when the caller does not need a recovery phrase (tests, mostly).
    /// Identity registration goes through [`from_seed`](Self::from_seed)
    /// instead so the seed entropy can double as phrase entropy.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self { signing_key }
    }

    /// Construct a keypair deterministically from a 32-byte seed.
    ///
    /// The seed is used directly as the Ed25519 secret key. This is the
    /// bridge between recovery phrases and keys: the phrase encodes exactly
    /// these 32 bytes, so decoding a phrase regenerates the same keypair.
    ///
    /// **Warning**: a weak seed means a weak key. Seeds must come from a
    /// CSPRNG or from a phrase that originally encoded CSPRNG output.
    pub fn from_seed(seed: &[u8; SECRET_KEY_LENGTH]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Returns the public key associated with this keypair.
    pub fn public_key(&self) -> AgentPublicKey {
        AgentPublicKey {
            bytes: self.signing_key.verifying_key().to_bytes(),
        }
    }

    /// Raw public key bytes (32 bytes). Safe to share, log, print on a mug.
    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Sign a message and return an `AgentSignature`.
    ///
    /// Ed25519 signatures are deterministic — same key, same message, same
    /// signature, every time. No nonce management, no RNG needed at signing
    /// time, no PlayStation-3-style key leaks.
    pub fn sign(&self, message: &[u8]) -> AgentSignature {
        let sig = self.signing_key.sign(message);
        AgentSignature {
            bytes: sig.to_bytes().to_vec(),
        }
    }

    /// Verify a signature against this keypair's own public key.
    pub fn verify(&self, message: &[u8], signature: &AgentSignature) -> bool {
        self.public_key().verify(message, signature)
    }

    /// Export the raw 32-byte seed.
    ///
    /// **Handle with extreme care.** This is the only secret standing
    /// between an attacker and full control of the agent's memory. Don't
    /// log it, don't send it anywhere, don't store it server-side — the
    /// recovery phrase is its one sanctioned at-rest form, and that lives
    /// with the human.
    pub fn seed_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }
}

impl Clone for AgentKeypair {
    /// Cloning a keypair is allowed but should make you uncomfortable.
    /// Every copy of a private key is another thing to protect.
    fn clone(&self) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&self.signing_key.to_bytes()),
        }
    }
}

impl fmt::Debug for AgentKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print secret key material in debug output. Not even
        // "partially" — a partial leak is still a leak.
        write!(f, "AgentKeypair(pub={})", self.public_key().to_hex())
    }
}

impl PartialEq for AgentKeypair {
    /// Two keypairs are equal if their public keys match. Comparing secret
    /// material in a non-constant-time way is a bad habit, and for identity
    /// purposes the public key is what matters.
    fn eq(&self, other: &Self) -> bool {
        self.public_key_bytes() == other.public_key_bytes()
    }
}

impl Eq for AgentKeypair {}

// ---------------------------------------------------------------------------
// AgentPublicKey
// ---------------------------------------------------------------------------

impl AgentPublicKey {
    /// Create a public key from raw bytes, trusting the caller.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    /// Try to create a public key from an untrusted byte slice.
    ///
    /// Validates the length and that the bytes represent a valid Ed25519
    /// point. We don't just accept any 32 bytes — some values aren't valid
    /// points on the curve, and low-order points lead to weird behavior.
    pub fn try_from_slice(slice: &[u8]) -> Result<Self, KeyError> {
        if slice.len() != 32 {
            return Err(KeyError::InvalidPublicKey);
        }
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(slice);

        VerifyingKey::from_bytes(&bytes).map_err(|_| KeyError::InvalidPublicKey)?;

        Ok(Self { bytes })
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// Verify a signature against this public key.
    ///
    /// Returns `true` if the signature is valid, `false` otherwise. A
    /// boolean (rather than `Result`) because the vast majority of callers
    /// want a yes/no answer, and the authentication layer deliberately does
    /// not distinguish failure modes to its own callers.
    pub fn verify(&self, message: &[u8], signature: &AgentSignature) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(&self.bytes) else {
            return false;
        };
        let sig_bytes: [u8; 64] = match signature.bytes.as_slice().try_into() {
            Ok(b) => b,
            Err(_) => return false,
        };
        let dalek_sig = DalekSignature::from_bytes(&sig_bytes);
        verifying_key.verify(message, &dalek_sig).is_ok()
    }

    /// Hex-encoded representation. 64 characters for 32 bytes.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Base64-encoded representation — the wire format for public keys.
    pub fn to_base64(&self) -> String {
        BASE64.encode(self.bytes)
    }

    /// Parse a base64-encoded public key from the wire.
    pub fn from_base64(s: &str) -> Result<Self, KeyError> {
        let bytes = BASE64.decode(s).map_err(|_| KeyError::InvalidPublicKey)?;
        Self::try_from_slice(&bytes)
    }
}

impl Hash for AgentPublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}

impl fmt::Display for AgentPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for AgentPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AgentPublicKey({})", &self.to_hex()[..16])
    }
}

// ---------------------------------------------------------------------------
// AgentSignature
// ---------------------------------------------------------------------------

impl AgentSignature {
    /// Create a signature from its raw 64-byte representation.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }

    /// The raw signature bytes (always 64 for a valid Ed25519 signature).
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Base64-encoded representation — the wire format for signatures.
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }

    /// Parse a base64-encoded signature from the wire.
    ///
    /// Length is validated here so malformed input surfaces as a parse
    /// error at the boundary instead of an opaque verification failure.
    pub fn from_base64(s: &str) -> Result<Self, KeyError> {
        let bytes = BASE64.decode(s).map_err(|_| KeyError::InvalidSignature)?;
        if bytes.len() != 64 {
            return Err(KeyError::InvalidSignature);
        }
        Ok(Self { bytes })
    }
}

impl fmt::Display for AgentSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.bytes))
    }
}

impl fmt::Debug for AgentSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex_str = hex::encode(&self.bytes);
        if hex_str.len() >= 128 {
            write!(f, "AgentSignature({}...{})", &hex_str[..8], &hex_str[120..])
        } else {
            write!(f, "AgentSignature({})", hex_str)
        }
    }
}
