//! # Recovery Phrases
//!
//! Deterministic, reversible mapping between raw seed entropy and a
//! human-transcribable word phrase. This is the BIP-39 construction:
//!
//! ```text
//! entropy (16 or 32 bytes)
//!     ‖ checksum (leading entropy_bits/32 bits of SHA-256(entropy))
//!     -> split into 11-bit groups
//!     -> each group indexes the fixed, ordered 2048-word English list
//!     -> words joined with single spaces
//! ```
//!
//! 16 bytes of entropy yield 12 words; 32 bytes yield 24. Identity seeds
//! always use 32 bytes (see [`crate::config::IDENTITY_SEED_LENGTH`]), so an
//! agent's recovery phrase is 24 words.
//!
//! We build on the `bip39` crate rather than hand-rolling the bit fiddling:
//! it carries the canonical wordlist and is what everyone's hardware wallet
//! already implements, which means an agent's phrase survives being typed
//! into any standard BIP-39 tool. The error taxonomy, however, is ours —
//! callers get told exactly which way a phrase is broken.
//!
//! ## Where this runs
//!
//! Encoding happens once, at registration, and the phrase goes straight
//! into the response. Decoding happens **client-side only**: the service
//! never receives a phrase, because a phrase *is* the seed and the seed is
//! the private key. See [`crate::client`].

use bip39::{Language, Mnemonic};
use thiserror::Error;

use crate::config::{SUPPORTED_ENTROPY_LENGTHS, SUPPORTED_PHRASE_LENGTHS};

/// Errors from encoding or decoding a recovery phrase.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecoveryError {
    /// Entropy length is not in the supported set (16 or 32 bytes).
    #[error("unsupported entropy length: {0} bytes (expected 16 or 32)")]
    InvalidEntropyLength(usize),

    /// Word count matches no supported entropy length (12 or 24 words).
    #[error("invalid phrase length: {0} words (expected 12 or 24)")]
    InvalidPhraseLength(usize),

    /// A word is not in the 2048-word list.
    #[error("unknown word in phrase: {0:?}")]
    UnknownWord(String),

    /// The recomputed checksum does not match the trailing checksum bits.
    /// The phrase is well-formed but was mis-transcribed somewhere.
    #[error("phrase checksum mismatch")]
    Checksum,
}

/// Encode seed entropy as a recovery phrase.
///
/// Exact inverse of [`decode_phrase`] for every supported entropy length.
pub fn encode_phrase(entropy: &[u8]) -> Result<String, RecoveryError> {
    if !SUPPORTED_ENTROPY_LENGTHS.contains(&entropy.len()) {
        return Err(RecoveryError::InvalidEntropyLength(entropy.len()));
    }

    let mnemonic = Mnemonic::from_entropy_in(Language::English, entropy)
        // Length was checked above; the crate accepts all our sizes.
        .map_err(|_| RecoveryError::InvalidEntropyLength(entropy.len()))?;

    Ok(mnemonic.to_string())
}

/// Decode a recovery phrase back into seed entropy.
///
/// Tolerates leading/trailing/repeated whitespace and mixed case — phrases
/// get hand-typed, and "Abandon  ability..." should not strand an agent.
/// Everything else is strict: word count, membership in the word list, and
/// the checksum all have to hold.
pub fn decode_phrase(phrase: &str) -> Result<Vec<u8>, RecoveryError> {
    let words: Vec<String> = phrase
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect();

    if !SUPPORTED_PHRASE_LENGTHS.contains(&words.len()) {
        return Err(RecoveryError::InvalidPhraseLength(words.len()));
    }

    let normalized = words.join(" ");
    let mnemonic =
        Mnemonic::parse_in_normalized(Language::English, &normalized).map_err(|e| match e {
            bip39::Error::UnknownWord(index) => {
                RecoveryError::UnknownWord(words[index].clone())
            }
            bip39::Error::InvalidChecksum => RecoveryError::Checksum,
            // Word count was validated above; anything else the crate
            // reports is a malformed phrase of some shape.
            _ => RecoveryError::InvalidPhraseLength(words.len()),
        })?;

    Ok(mnemonic.to_entropy())
}
