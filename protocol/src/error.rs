//! # Service Error Taxonomy
//!
//! The single error type the facade ([`crate::service`]) exposes to the
//! transport layer. Five kinds, each with one transport meaning:
//!
//! | Kind         | Transport mapping | Client action            |
//! |--------------|-------------------|--------------------------|
//! | `Validation` | 400               | fix the request, resend  |
//! | `Auth`       | 401               | re-sign, check the clock |
//! | `NotFound`   | 404               | nothing to fetch         |
//! | `Conflict`   | 409               | retry the whole request  |
//! | `Storage`    | 500               | retry later              |
//!
//! `Auth` deliberately flattens to the single word "unauthorized" on the
//! wire: the precise failure (unknown agent vs. bad signature vs. stale
//! timestamp) is logged server-side but never disclosed, so the error
//! channel can't be used as an oracle to probe which agent IDs exist.

use thiserror::Error;

use crate::auth::AuthError;
use crate::identity::IdentityError;
use crate::memory::MemoryError;
use crate::storage::StorageError;

/// Every way a service operation can fail.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request is malformed: bad base64, an ill-formed agent ID, a
    /// missing field. The message names the offending field.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Authentication failed. The inner error keeps the precise cause for
    /// logging; [`client_message`](Self::client_message) hides it.
    #[error("authentication failed: {0}")]
    Auth(AuthError),

    /// Nothing stored to return.
    #[error("not found")]
    NotFound,

    /// A uniqueness conflict that exhausted its bounded retries.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The storage engine failed. Service-side; the request was fine.
    #[error("storage failure: {0}")]
    Storage(StorageError),
}

impl ServiceError {
    /// The message safe to put in a response body.
    ///
    /// Everything except `Auth` and `Storage` echoes its display form;
    /// auth failures collapse to "unauthorized" and storage failures to a
    /// generic service message so neither leaks internals.
    pub fn client_message(&self) -> String {
        match self {
            ServiceError::Auth(_) => "unauthorized".to_string(),
            ServiceError::Storage(_) => "internal storage failure".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        match err {
            // A backend fault during verification is a service failure,
            // not an authentication verdict.
            AuthError::Storage(e) => ServiceError::Storage(e),
            other => ServiceError::Auth(other),
        }
    }
}

impl From<IdentityError> for ServiceError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::Collision => {
                ServiceError::Conflict("agent id collision, retry registration".to_string())
            }
            IdentityError::UnknownAgent => ServiceError::NotFound,
            IdentityError::PublicKeyMismatch => {
                ServiceError::Conflict("identity record does not match the presented key".to_string())
            }
            IdentityError::Storage(e) => ServiceError::Storage(e),
        }
    }
}

impl From<MemoryError> for ServiceError {
    fn from(err: MemoryError) -> Self {
        match err {
            MemoryError::NoVersions => ServiceError::NotFound,
            MemoryError::Storage(e) => ServiceError::Storage(e),
        }
    }
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Storage(err)
    }
}
