//! # Hashing Utilities
//!
//! SHA-256, used in two places: deriving agent IDs from public keys, and
//! digesting request payloads for the canonical signed message. One hash
//! function for the whole protocol — the recovery-phrase checksum (BIP-39)
//! is SHA-256 by definition, so anything else would just be a second
//! primitive to audit for no benefit.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of the input data.
///
/// Returns a 32-byte digest as a `Vec<u8>`. Why `Vec<u8>` and not
/// `[u8; 32]`? Because half the callers immediately pass it to functions
/// that want `&[u8]`. The heap allocation is noise compared to the cost
/// of the hash itself. Use [`sha256_array`] in paths where the fixed-size
/// type propagates naturally.
pub fn sha256(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// Compute the SHA-256 hash and return a fixed-size array.
pub fn sha256_array(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// SHA-256 as a lowercase hex string. 64 characters.
///
/// This is the exact form agent IDs and payload digests take on the wire,
/// so both derivations funnel through here.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256_array(data))
}

/// Digest a request payload for the canonical signed message.
///
/// Takes the *raw encrypted blob bytes* (after base64 decoding), not the
/// base64 text — signing the decoded bytes means a re-encoding of the same
/// ciphertext still verifies. Body-less operations (retrieve, history,
/// clear) digest the empty slice, which keeps the canonical message shape
/// uniform across all four operations.
pub fn payload_digest(payload: &[u8]) -> String {
    sha256_hex(payload)
}
