//! # Protocol Configuration & Constants
//!
//! Every magic number in the Claw protocol lives here. If you're hardcoding
//! a constant somewhere else, you're doing it wrong and you owe the team
//! coffee.
//!
//! Several of these values are load-bearing for interoperability: the agent
//! ID digest, the canonical message separator, and the phrase word counts
//! are all part of the signed/derived material that clients and servers must
//! agree on. Changing them invalidates every existing identity.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Protocol Version
// ---------------------------------------------------------------------------

/// Protocol version string, reported by `/health` and the CLI.
pub const PROTOCOL_VERSION: &str = "0.1.0";

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// Ed25519 — deterministic signatures, compact keys, no nonce footguns.
pub const SIGNING_ALGORITHM: &str = "Ed25519";

/// Ed25519 secret keys (seeds) are 32 bytes.
pub const SIGNING_KEY_LENGTH: usize = 32;

/// Ed25519 public keys are 32 bytes.
pub const VERIFYING_KEY_LENGTH: usize = 32;

/// Ed25519 signatures are always 64 bytes.
pub const SIGNATURE_LENGTH: usize = 64;

/// Agent IDs are the full SHA-256 digest of the public key, hex-encoded.
/// 32 bytes -> 64 lowercase hex characters.
pub const AGENT_ID_LENGTH: usize = 64;

// ---------------------------------------------------------------------------
// Recovery Phrase Parameters
// ---------------------------------------------------------------------------

/// Entropy sizes (in bytes) the recovery codec round-trips.
///
/// 16 bytes -> 12 words, 32 bytes -> 24 words. Identity seeds always use
/// 32 bytes — the Ed25519 seed *is* the phrase entropy — but the codec
/// itself supports both so shorter secrets can reuse it.
pub const SUPPORTED_ENTROPY_LENGTHS: [usize; 2] = [16, 32];

/// Word counts corresponding to [`SUPPORTED_ENTROPY_LENGTHS`].
pub const SUPPORTED_PHRASE_LENGTHS: [usize; 2] = [12, 24];

/// Entropy size used for identity seeds. A 24-word phrase.
pub const IDENTITY_SEED_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Authentication Parameters
// ---------------------------------------------------------------------------

/// Separator between fields of the canonical signed message.
///
/// The canonical message is `"{operation}:{payload_digest}:{timestamp}"`.
/// None of the three fields can contain a colon (operations are fixed
/// tokens, digests are hex, timestamps are RFC 3339), so the encoding is
/// unambiguous.
pub const CANONICAL_SEPARATOR: char = ':';

/// Default freshness window for signed requests.
///
/// A request whose timestamp is more than this far from server time (in
/// either direction — client clocks run fast as often as slow) is rejected
/// as a potential replay. Five minutes tolerates realistic clock skew while
/// keeping the replay surface small. The window is configurable per
/// deployment via [`crate::service::ServiceConfig`].
pub const DEFAULT_FRESHNESS_WINDOW: Duration = Duration::from_secs(300);

// ---------------------------------------------------------------------------
// Registration Parameters
// ---------------------------------------------------------------------------

/// Maximum attempts to generate a non-colliding agent ID at registration.
///
/// A SHA-256 collision between two 32-byte public keys is astronomically
/// unlikely, but the retry bound keeps the failure mode defined rather
/// than looping forever on a broken RNG.
pub const MAX_REGISTRATION_ATTEMPTS: u32 = 3;

// ---------------------------------------------------------------------------
// Service Defaults
// ---------------------------------------------------------------------------

/// Default port for the HTTP API.
pub const DEFAULT_API_PORT: u16 = 8473;

/// Default port for the Prometheus metrics endpoint.
pub const DEFAULT_METRICS_PORT: u16 = 8474;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entropy_and_phrase_lengths_correspond() {
        // BIP-39: words = (entropy_bits + entropy_bits/32) / 11.
        for (bytes, words) in SUPPORTED_ENTROPY_LENGTHS
            .iter()
            .zip(SUPPORTED_PHRASE_LENGTHS.iter())
        {
            let bits = bytes * 8;
            assert_eq!((bits + bits / 32) / 11, *words);
        }
    }

    #[test]
    fn identity_seed_is_a_supported_entropy_length() {
        assert!(SUPPORTED_ENTROPY_LENGTHS.contains(&IDENTITY_SEED_LENGTH));
    }

    #[test]
    fn agent_id_length_matches_sha256_hex() {
        assert_eq!(AGENT_ID_LENGTH, 32 * 2);
    }
}
