// Copyright (c) 2026 Filament Labs. MIT License.
// See LICENSE for details.

//! # Filament Protocol — Identity Core
//!
//! This is the naming layer of Filament: a peer-to-peer overlay where every
//! node carries a self-certifying identity instead of renting a name from
//! somebody's database. An identity binds a 40-bit address to public key
//! material; the address is *derived from* the key, so possession of the
//! private half is ownership of the name. No registrar, no revocation
//! hotline, no asking permission.
//!
//! ## Architecture
//!
//! The crate is split into modules that mirror the actual concerns:
//!
//! - **identity** — Addresses, cipher suites, and the `Identity` aggregate:
//!   canonical text codec, JSON contract, equality, and the crypto façade.
//! - **engine** — The `CryptoEngine` capability trait the identity layer
//!   delegates all curve math to, plus a pure-Rust software engine for the
//!   Curve25519 suite.
//! - **inet** — The minimal `ip/port` endpoint type root specifications
//!   advertise. No sockets are dialed here.
//! - **config** — Protocol bounds and constants. Every magic number, one
//!   place.
//!
//! ## Design Philosophy
//!
//! 1. Parsing is pure; cryptography is a capability you hand in.
//! 2. Verification never errors — it degrades to `false`. Untrusted is
//!    untrusted, whatever the reason.
//! 3. Engine handles are owned resources, released exactly once on drop.
//! 4. No unsafe code, no hand-rolled crypto, no exceptions to either.

pub mod config;
pub mod engine;
pub mod identity;
pub mod inet;

pub use engine::{CryptoEngine, EngineError, EngineHandle, GeneratedIdentity, HandleId};
pub use identity::{Address, AddressError, CipherSuite, Identity, IdentityError};
pub use inet::{InetAddress, SocketStorage};
