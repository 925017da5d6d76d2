//! # Request Authentication
//!
//! Proves that a memory operation was requested by the holder of the
//! private key behind an agent ID, and that the request is fresh enough
//! not to be a replay.
//!
//! The scheme is deliberately stateless: the signed material includes a
//! timestamp, and the verifier rejects anything outside a configurable
//! freshness window. That bounds replay without a persisted nonce set, at
//! the cost of tolerating replays *within* the window — an intentional
//! trade-off for a verifier that keeps no per-request state.
//!
//! ## Canonical message
//!
//! ```text
//! "{operation}:{payload_digest}:{timestamp}"
//! ```
//!
//! - `operation` — one of the fixed tokens `store`, `retrieve`, `history`,
//!   `clear`. Binding the operation into the signature means a captured
//!   `store` signature can't be replayed as a `clear`.
//! - `payload_digest` — lowercase hex SHA-256 of the raw encrypted blob
//!   (digest of the empty slice for body-less operations), binding the
//!   signature to the exact payload.
//! - `timestamp` — RFC 3339 UTC, as sent in the request.
//!
//! None of the fields can contain the `:` separator, so the encoding is
//! unambiguous without length prefixes.

pub mod verifier;

use std::fmt;

pub use verifier::{AuthError, SignatureVerifier};

/// The four authenticated memory operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Store,
    Retrieve,
    History,
    Clear,
}

impl Operation {
    /// The fixed token that appears in the canonical signed message.
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Store => "store",
            Operation::Retrieve => "retrieve",
            Operation::History => "history",
            Operation::Clear => "clear",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the canonical message that gets signed and verified.
///
/// Client ([`crate::client`]) and verifier both call this — the format
/// lives in exactly one place.
pub fn canonical_message(operation: Operation, payload_digest: &str, timestamp: &str) -> Vec<u8> {
    format!("{operation}:{payload_digest}:{timestamp}").into_bytes()
}
