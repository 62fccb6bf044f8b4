//! # Software Cryptographic Engine
//!
//! A pure-Rust [`CryptoEngine`] for the Curve25519 suite, built on audited
//! implementations: `ed25519-dalek` for signatures, `x25519-dalek` for the
//! exchange half, `sha2` for address derivation. We deliberately chose
//! boring, well-reviewed cryptography — if you're tempted to optimize
//! these functions, go read about timing attacks and come back when
//! you've lost the urge.
//!
//! ## Key layout (suite 0)
//!
//! ```text
//! public  (64 bytes) = x25519 public (32) ‖ ed25519 public (32)
//! private (64 bytes) = x25519 secret (32) ‖ ed25519 seed   (32)
//! ```
//!
//! The node address is the first five bytes of SHA-512 over the 64-byte
//! public key; generation rolls fresh keys until the result lands outside
//! the reserved range, so every identity this engine produces survives
//! [`CryptoEngine::validate`].
//!
//! P384 identities are refused — that suite needs an external engine.

use crate::engine::{CryptoEngine, EngineError, GeneratedIdentity, HandleId};
use crate::identity::{Address, CipherSuite, Identity};
use crate::inet::SocketStorage;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use parking_lot::RwLock;
use rand::rngs::OsRng;
use sha2::{Digest, Sha512};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace};
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};

const PUBLIC_KEY_LEN: usize = 64;
const PRIVATE_KEY_LEN: usize = 64;
const SIGNATURE_LEN: usize = 64;

/// Engine-side state behind one handle.
struct HandleState {
    address: Address,
    public_key: Vec<u8>,
    private_key: Option<Vec<u8>>,
}

/// In-process engine for the Curve25519 suite.
///
/// Handles are small integers into an internal table; the table is behind
/// an `RwLock` so independent handles can be used concurrently, matching
/// the engine thread-safety contract.
pub struct SoftwareEngine {
    handles: RwLock<HashMap<u64, HandleState>>,
    next_id: AtomicU64,
}

impl SoftwareEngine {
    /// Create an engine with an empty handle table.
    pub fn new() -> Self {
        Self {
            handles: RwLock::new(HashMap::new()),
            // Zero is reserved as "no handle" everywhere; never issue it.
            next_id: AtomicU64::new(1),
        }
    }

    /// Number of live handles. Exposed for leak checks in tests and
    /// diagnostics; an idle node should trend toward its identity count.
    pub fn live_handles(&self) -> usize {
        self.handles.read().len()
    }
}

impl Default for SoftwareEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// First five bytes of SHA-512 over the public key, rejected if the
/// result is zero or carries the reserved prefix.
fn derive_address(public_key: &[u8]) -> Option<Address> {
    let digest = Sha512::digest(public_key);
    let raw = digest[..5]
        .iter()
        .fold(0u64, |acc, &b| (acc << 8) | u64::from(b));
    Address::from_u64(raw).filter(|a| !a.is_reserved())
}

/// Extract the ed25519 seed from the private half.
fn signing_key(private_key: &[u8]) -> Option<SigningKey> {
    let seed = <[u8; 32]>::try_from(private_key.get(32..64)?).ok()?;
    Some(SigningKey::from_bytes(&seed))
}

impl CryptoEngine for SoftwareEngine {
    fn generate(&self, suite: CipherSuite) -> Result<GeneratedIdentity, EngineError> {
        if suite != CipherSuite::Curve25519 {
            return Err(EngineError::UnsupportedSuite(suite));
        }
        loop {
            let exchange_secret = StaticSecret::random_from_rng(OsRng);
            let signing = SigningKey::generate(&mut OsRng);

            let mut public_key = Vec::with_capacity(PUBLIC_KEY_LEN);
            public_key.extend_from_slice(X25519PublicKey::from(&exchange_secret).as_bytes());
            public_key.extend_from_slice(signing.verifying_key().as_bytes());

            // Reserved-range addresses force a reroll of the whole keypair.
            let Some(address) = derive_address(&public_key) else {
                continue;
            };

            let mut private_key = Vec::with_capacity(PRIVATE_KEY_LEN);
            private_key.extend_from_slice(&exchange_secret.to_bytes());
            private_key.extend_from_slice(&signing.to_bytes());

            debug!(%address, "generated curve25519 identity");
            return Ok(GeneratedIdentity {
                address,
                public_key,
                private_key,
            });
        }
    }

    fn handle_from_text(&self, text: &str) -> Option<HandleId> {
        let identity: Identity = text.parse().ok()?;
        if identity.suite() != CipherSuite::Curve25519 {
            return None;
        }
        // Lenient suite-0 parsing means lengths must be re-checked here;
        // a handle only exists for key material this engine can operate on.
        if identity.public_key().len() != PUBLIC_KEY_LEN {
            return None;
        }
        if let Some(private) = identity.private_key() {
            if private.len() != PRIVATE_KEY_LEN {
                return None;
            }
        }

        let raw = self.next_id.fetch_add(1, Ordering::Relaxed);
        let state = HandleState {
            address: identity.address(),
            public_key: identity.public_key().to_vec(),
            private_key: identity.private_key().map(<[u8]>::to_vec),
        };
        self.handles.write().insert(raw, state);
        trace!(handle = raw, address = %identity.address(), "materialized engine handle");
        HandleId::new(raw)
    }

    fn text_from_handle(&self, handle: HandleId) -> Result<String, EngineError> {
        let handles = self.handles.read();
        let state = handles
            .get(&handle.as_u64())
            .ok_or(EngineError::InvalidParameter)?;
        let public_hex = hex::encode(&state.public_key);
        Ok(match &state.private_key {
            Some(private) => format!("{}:0:{}:{}", state.address, public_hex, hex::encode(private)),
            None => format!("{}:0:{}", state.address, public_hex),
        })
    }

    fn validate(&self, handle: HandleId) -> bool {
        let handles = self.handles.read();
        let Some(state) = handles.get(&handle.as_u64()) else {
            return false;
        };
        if state.public_key.len() != PUBLIC_KEY_LEN {
            return false;
        }
        // The address must be exactly what the public key derives to.
        if derive_address(&state.public_key) != Some(state.address) {
            return false;
        }
        if let Some(private) = &state.private_key {
            if private.len() != PRIVATE_KEY_LEN {
                return false;
            }
            // Both private halves must reproduce their public halves.
            let Some(signing) = signing_key(private) else {
                return false;
            };
            if state.public_key[32..] != signing.verifying_key().to_bytes()[..] {
                return false;
            }
            let Ok(exchange) = <[u8; 32]>::try_from(&private[..32]) else {
                return false;
            };
            let exchange_public = X25519PublicKey::from(&StaticSecret::from(exchange));
            if state.public_key[..32] != exchange_public.as_bytes()[..] {
                return false;
            }
        }
        true
    }

    fn sign(&self, handle: HandleId, message: &[u8], max_sig_len: usize) -> Vec<u8> {
        if max_sig_len < SIGNATURE_LEN {
            return Vec::new();
        }
        let handles = self.handles.read();
        let Some(state) = handles.get(&handle.as_u64()) else {
            return Vec::new();
        };
        let Some(private) = &state.private_key else {
            trace!(handle = handle.as_u64(), "sign refused: no private key");
            return Vec::new();
        };
        match signing_key(private) {
            Some(signing) => signing.sign(message).to_bytes().to_vec(),
            None => Vec::new(),
        }
    }

    fn verify(&self, handle: HandleId, message: &[u8], signature: &[u8]) -> bool {
        let Ok(sig_bytes) = <[u8; SIGNATURE_LEN]>::try_from(signature) else {
            return false;
        };
        let handles = self.handles.read();
        let Some(state) = handles.get(&handle.as_u64()) else {
            return false;
        };
        if state.public_key.len() != PUBLIC_KEY_LEN {
            return false;
        }
        let Ok(vk_bytes) = <[u8; 32]>::try_from(&state.public_key[32..]) else {
            return false;
        };
        let Ok(verifying) = VerifyingKey::from_bytes(&vk_bytes) else {
            return false;
        };
        verifying
            .verify(message, &Signature::from_bytes(&sig_bytes))
            .is_ok()
    }

    fn make_root_specification(
        &self,
        handle: HandleId,
        timestamp_ms: i64,
        addresses: &[SocketStorage],
        max_len: usize,
    ) -> Vec<u8> {
        let handles = self.handles.read();
        let Some(state) = handles.get(&handle.as_u64()) else {
            return Vec::new();
        };
        let Some(private) = &state.private_key else {
            trace!(handle = handle.as_u64(), "root spec refused: no private key");
            return Vec::new();
        };
        let Some(signing) = signing_key(private) else {
            return Vec::new();
        };
        let Ok(endpoint_count) = u16::try_from(addresses.len()) else {
            return Vec::new();
        };

        // Body: address | suite | public key | timestamp | endpoints.
        // The signature over the body is appended so peers can check the
        // root spec against the identity it advertises.
        let mut spec = Vec::new();
        spec.extend_from_slice(&state.address.to_bytes());
        spec.push(CipherSuite::Curve25519 as u8);
        spec.extend_from_slice(&state.public_key);
        spec.extend_from_slice(&timestamp_ms.to_be_bytes());
        spec.extend_from_slice(&endpoint_count.to_be_bytes());
        for storage in addresses {
            spec.extend_from_slice(storage.as_bytes());
        }
        let signature = signing.sign(&spec);
        spec.extend_from_slice(&signature.to_bytes());

        if spec.len() > max_len {
            return Vec::new();
        }
        spec
    }

    fn release(&self, handle: HandleId) {
        if self.handles.write().remove(&handle.as_u64()).is_none() {
            trace!(handle = handle.as_u64(), "release of unknown handle ignored");
        }
    }
}
