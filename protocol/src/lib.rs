// Copyright (c) 2026 OpenClaw Contributors. MIT License.
// See LICENSE for details.

//! # Claw Protocol — Core Library
//!
//! The identity and authenticated versioned-storage core of the Claw agent
//! memory service. An autonomous agent establishes a self-sovereign Ed25519
//! identity, persists encrypted memory snapshots under that identity across
//! sessions, and can recover the identity later from a 24-word phrase — all
//! without the service ever seeing plaintext memory or private key material.
//!
//! ## Architecture
//!
//! The crate is split into modules that mirror the actual trust boundaries
//! of the system:
//!
//! - **crypto** — Ed25519 keys and SHA-256 digests. Don't roll your own.
//! - **identity** — Agent IDs, recovery phrases, registration and re-linking.
//! - **auth** — Signature verification with a timestamp freshness window.
//! - **memory** — Append-only, per-agent versioned blob storage.
//! - **storage** — Swappable persistence backends (in-memory and sled).
//! - **service** — The facade the transport layer calls into.
//! - **client** — The key-holding half. Lives in the agent's process,
//!   never in the service.
//! - **wire** — The JSON payload shapes shared by client and service.
//! - **config** — Protocol constants and defaults.
//!
//! ## Design Philosophy
//!
//! 1. The service only ever handles public values: public keys, agent IDs,
//!    signatures, and opaque ciphertext. Private keys and recovery phrases
//!    exist exclusively on the client side of the boundary.
//! 2. Every memory version is immutable once written. `clear` is the only
//!    destructive operation, and it is all-or-nothing.
//! 3. If it authenticates a request, it has tests. Plural.

pub mod auth;
pub mod client;
pub mod config;
pub mod crypto;
pub mod error;
pub mod identity;
pub mod memory;
pub mod service;
pub mod storage;
pub mod wire;
