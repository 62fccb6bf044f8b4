//! # The Cryptographic Engine Capability
//!
//! Everything in the identity layer that involves actual elliptic-curve
//! math is delegated through the [`CryptoEngine`] trait. The identity type
//! owns names, encodings, and invariants; the engine owns keys, signatures,
//! and address derivation. This split means the protocol layer never rolls
//! its own crypto and an embedder can swap in a hardware-backed or native
//! engine without touching a line of parsing code.
//!
//! Engines hand out opaque [`HandleId`] tokens for materialized identities.
//! A handle is a live engine-side resource; the [`EngineHandle`] wrapper
//! pairs it with the engine that issued it and releases it exactly once on
//! drop. Nobody calls `release` by hand, and nobody forgets to.
//!
//! A pure-Rust engine for the Curve25519 suite ships in
//! [`software`](crate::engine::software). P384 requires an external engine.

pub mod software;

use crate::identity::{Address, CipherSuite};
use crate::inet::SocketStorage;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by a cryptographic engine.
///
/// Intentionally coarse: engines must not leak key material or curve-level
/// detail through error messages.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine does not implement the requested cipher suite.
    #[error("cipher suite {0} is not supported by this engine")]
    UnsupportedSuite(CipherSuite),

    /// A zero, unknown, or already-released handle was used.
    #[error("invalid or already-released engine handle")]
    InvalidParameter,

    /// The engine produced a result it should never produce.
    #[error("engine failure: {0}")]
    Internal(String),
}

/// An opaque token naming an identity materialized inside an engine.
///
/// Zero is never a valid handle; the constructor enforces it so a
/// `HandleId` in hand is always a token some engine actually issued.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleId(u64);

impl HandleId {
    /// Wrap a raw engine token. Returns `None` for zero.
    pub fn new(raw: u64) -> Option<Self> {
        (raw != 0).then_some(Self(raw))
    }

    /// The raw token value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HandleId({})", self.0)
    }
}

/// Fresh key material produced by [`CryptoEngine::generate`].
///
/// The address is derived from the public key by the engine; the identity
/// layer trusts the binding but checks the key lengths against the suite
/// table before accepting the result.
pub struct GeneratedIdentity {
    /// Address derived from the new public key.
    pub address: Address,
    /// Public key bytes at the suite's exact public length.
    pub public_key: Vec<u8>,
    /// Private key bytes at the suite's exact private length.
    pub private_key: Vec<u8>,
}

impl fmt::Debug for GeneratedIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Private key bytes stay out of debug output, always.
        write!(f, "GeneratedIdentity({})", self.address)
    }
}

/// The capability set consumed by the identity layer.
///
/// All methods are synchronous, prompt, pure computation. Implementations
/// must be thread-safe for concurrent calls on independent handles; the
/// identity layer serializes access to any single handle itself.
///
/// The soft-failure channels are part of the contract: `sign` and
/// `make_root_specification` return an **empty vector** on failure, and
/// `verify`/`validate` degrade to `false`. Only `generate` and
/// `text_from_handle` return typed errors.
pub trait CryptoEngine: Send + Sync {
    /// Generate fresh key material and its derived address for a suite.
    fn generate(&self, suite: CipherSuite) -> Result<GeneratedIdentity, EngineError>;

    /// Materialize a handle from a canonical identity string (public or
    /// secret form). `None` if the text is rejected.
    fn handle_from_text(&self, text: &str) -> Option<HandleId>;

    /// The canonical string for a handle, secret form when the engine
    /// holds the private key.
    fn text_from_handle(&self, handle: HandleId) -> Result<String, EngineError>;

    /// Self-consistency check: address correctly derived from the public
    /// key, private half (if any) consistent with the public half.
    fn validate(&self, handle: HandleId) -> bool;

    /// Sign a message. Empty output on failure (no private key, unknown
    /// handle, or a signature that would exceed `max_sig_len`).
    fn sign(&self, handle: HandleId, message: &[u8], max_sig_len: usize) -> Vec<u8>;

    /// Verify a signature. `false` on any failure.
    fn verify(&self, handle: HandleId, message: &[u8], signature: &[u8]) -> bool;

    /// Build a signed root specification binding this identity, a
    /// timestamp, and a list of static endpoints. Empty output on failure —
    /// most commonly because the identity has no private key.
    fn make_root_specification(
        &self,
        handle: HandleId,
        timestamp_ms: i64,
        addresses: &[SocketStorage],
        max_len: usize,
    ) -> Vec<u8>;

    /// Release a handle. Idempotent; called at most once per handle by
    /// [`EngineHandle`].
    fn release(&self, handle: HandleId);
}

/// Owning wrapper around an engine handle.
///
/// Pairs the token with the engine that issued it so delegation can never
/// cross engines, and releases the handle exactly once when dropped. This
/// is the explicit-ownership replacement for finalizer-style cleanup: the
/// handle's lifetime is the wrapper's lifetime, end of story.
pub struct EngineHandle {
    engine: Arc<dyn CryptoEngine>,
    id: HandleId,
}

impl EngineHandle {
    /// Take ownership of a handle issued by `engine`.
    pub fn new(engine: Arc<dyn CryptoEngine>, id: HandleId) -> Self {
        Self { engine, id }
    }

    /// The underlying token.
    pub fn id(&self) -> HandleId {
        self.id
    }

    /// Delegate to [`CryptoEngine::validate`].
    pub fn validate(&self) -> bool {
        self.engine.validate(self.id)
    }

    /// Delegate to [`CryptoEngine::sign`].
    pub fn sign(&self, message: &[u8], max_sig_len: usize) -> Vec<u8> {
        self.engine.sign(self.id, message, max_sig_len)
    }

    /// Delegate to [`CryptoEngine::verify`].
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        self.engine.verify(self.id, message, signature)
    }

    /// Delegate to [`CryptoEngine::make_root_specification`].
    pub fn make_root_specification(
        &self,
        timestamp_ms: i64,
        addresses: &[SocketStorage],
        max_len: usize,
    ) -> Vec<u8> {
        self.engine
            .make_root_specification(self.id, timestamp_ms, addresses, max_len)
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.engine.release(self.id);
    }
}

impl fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EngineHandle({:?})", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_handle_is_never_valid() {
        assert!(HandleId::new(0).is_none());
        assert_eq!(HandleId::new(7).unwrap().as_u64(), 7);
    }
}
