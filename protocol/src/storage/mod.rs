//! # Storage Abstraction
//!
//! The persisted state of the service is two tables: identities (keyed by
//! agent ID) and memory versions (keyed by agent ID + version number).
//! Rather than baking in one engine, this module models them as a pair of
//! capability traits — identity lookup/insert and version append/read/
//! delete-all — so the backing store is swappable without touching the
//! identity, authentication, or memory layers.
//!
//! Two implementations ship:
//!
//! - [`MemoryBackend`] — DashMap-based, zero persistence. Tests and
//!   ephemeral deployments.
//! - [`ClawDb`] — sled embedded key-value store. The production default.
//!
//! Both are `Send + Sync` and safe to share behind an `Arc`.

pub mod backend;
pub mod db;
pub mod memory;

pub use backend::{IdentityBackend, StorageError, VersionBackend};
pub use db::ClawDb;
pub use memory::MemoryBackend;
