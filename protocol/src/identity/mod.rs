//! # Node Identity
//!
//! Every node on the Filament overlay is named by an [`Identity`]: a
//! self-certifying binding between a 40-bit [`Address`] and the public key
//! material of one of two [`CipherSuite`]s, optionally carrying the private
//! half so the node can prove it *is* that name.
//!
//! The identity stack is layered:
//!
//! 1. **Address** — the 10-hex-digit short name, derived from the public key.
//! 2. **Suite** — the closed two-entry table of key geometry and encodings.
//! 3. **Identity** — the aggregate: canonical text codec, JSON contract,
//!    equality, and a façade over the [`CryptoEngine`] capability for
//!    signing, verification, self-validation, and root export.
//!
//! ## The canonical string
//!
//! ```text
//! <address:10 hex>:<suite 0|1>:<public key>[:<private key>]
//! ```
//!
//! Suite 0 keys are lowercase hex; suite 1 keys are lowercase unpadded
//! base-32. The three-field form is the **public** identity (what goes in
//! JSON, logs, and peer lists); the four-field form is the **secret** and
//! never leaves the node on purpose.
//!
//! ## Engine handles
//!
//! Parsing and construction are pure. The first operation that needs real
//! cryptography materializes an engine-side handle from the canonical
//! string and caches it in the identity; the handle is released exactly
//! once when the identity is dropped. Lazy creation is mutex-guarded, so
//! hammering one identity from several threads creates one handle, not a
//! leak.

mod address;
mod suite;

pub use address::{Address, AddressError, ADDRESS_HEX_LEN};
pub use suite::{CipherSuite, KeyDecodeError, KeyEncoding, SuiteParams};

use crate::config::{MAX_ROOT_SPEC_LEN, MAX_SIGNATURE_LEN};
use crate::engine::{CryptoEngine, EngineError, EngineHandle, HandleId};
use crate::inet::InetAddress;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors produced by identity parsing, construction, and the crypto façade.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The text did not have at least `address:suite:publickey`.
    #[error("malformed identity: expected at least 3 colon-separated fields")]
    Malformed,

    /// The address field was rejected; the address parser's verdict is
    /// passed through unchanged.
    #[error(transparent)]
    Address(#[from] AddressError),

    /// The suite field was something other than `"0"` or `"1"`.
    #[error("unrecognized cipher suite tag {0:?}")]
    UnrecognizedSuite(String),

    /// A key field failed to decode from hex or base-32.
    #[error(transparent)]
    KeyDecode(#[from] KeyDecodeError),

    /// Wrong key length for the suite, or a signing precondition failed
    /// (most commonly: no private key behind the engine handle).
    #[error("invalid key: wrong length for suite or unusable key material")]
    InvalidKey,

    /// A root specification needs at least one static endpoint.
    #[error("at least one static endpoint is required for a root specification")]
    EmptyAddressList,

    /// An endpoint in the root list could not be packed for the engine.
    #[error("invalid endpoint address in root specification list")]
    InvalidAddress,

    /// The engine refused to materialize a handle for this identity.
    #[error("failed to initialize an engine handle for this identity")]
    EngineInit,

    /// The engine could not produce a root specification. The usual cause
    /// is an identity with no private key.
    #[error("engine could not produce a root specification (is the private key present?)")]
    RootSpecification,

    /// The engine returned a result that violates its own contract.
    #[error("cryptographic engine returned an unusable result")]
    InternalEngine,

    /// A typed engine failure, passed through from generation or handle
    /// introspection.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// The address and associated keys of a Filament node.
///
/// Value semantics for the public parts: equality, hashing, cloning, and
/// serialization look only at address, suite, and key bytes. The cached
/// engine handle is per-instance plumbing — a clone starts with an empty
/// handle slot and materializes its own on first use.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use filament_protocol::engine::{software::SoftwareEngine, CryptoEngine};
/// use filament_protocol::identity::{CipherSuite, Identity};
///
/// let engine: Arc<dyn CryptoEngine> = Arc::new(SoftwareEngine::new());
/// let identity = Identity::generate(&engine, CipherSuite::Curve25519).unwrap();
///
/// let public: Identity = identity.public_string().parse().unwrap();
/// let signature = identity.sign(&engine, b"hello").unwrap();
/// assert!(public.verify(&engine, b"hello", &signature));
/// ```
pub struct Identity {
    address: Address,
    suite: CipherSuite,
    public_key: Vec<u8>,
    private_key: Option<Vec<u8>>,
    handle: Mutex<Option<EngineHandle>>,
}

impl Identity {
    /// Generate a fresh identity of the given suite.
    ///
    /// Delegates key generation and address derivation to the engine, then
    /// checks the returned key lengths against the suite table — an engine
    /// that hands back misshapen keys is broken and its output is refused.
    pub fn generate(
        engine: &Arc<dyn CryptoEngine>,
        suite: CipherSuite,
    ) -> Result<Self, IdentityError> {
        let generated = engine.generate(suite)?;
        let params = suite.params();
        if generated.public_key.len() != params.public_key_len
            || generated.private_key.len() != params.private_key_len
        {
            warn!(%suite, "engine produced keys with wrong lengths");
            return Err(IdentityError::InternalEngine);
        }
        debug!(address = %generated.address, %suite, "generated new identity");
        Ok(Self {
            address: generated.address,
            suite,
            public_key: generated.public_key,
            private_key: Some(generated.private_key),
            handle: Mutex::new(None),
        })
    }

    /// Materialize an identity from a handle the engine already holds.
    ///
    /// Used when the engine is the source of truth — e.g. an embedder's
    /// native core hands us an identity it created. The handle is adopted:
    /// this identity owns it from here on and will release it on drop.
    pub fn from_engine_handle(
        engine: &Arc<dyn CryptoEngine>,
        handle: HandleId,
    ) -> Result<Self, IdentityError> {
        let text = engine.text_from_handle(handle)?;
        let identity: Identity = text.parse()?;
        *identity.handle.lock() = Some(EngineHandle::new(Arc::clone(engine), handle));
        Ok(identity)
    }

    /// This identity's 40-bit address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// This identity's cipher suite.
    pub fn suite(&self) -> CipherSuite {
        self.suite
    }

    /// The raw public key bytes.
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    /// The raw private key bytes, if this identity carries its secret half.
    pub fn private_key(&self) -> Option<&[u8]> {
        self.private_key.as_deref()
    }

    /// True if this identity holds its own private key and can sign.
    pub fn has_private(&self) -> bool {
        self.private_key.is_some()
    }

    /// A copy of this identity with the private key stripped.
    pub fn to_public(&self) -> Identity {
        Identity {
            address: self.address,
            suite: self.suite,
            public_key: self.public_key.clone(),
            private_key: None,
            handle: Mutex::new(None),
        }
    }

    /// The canonical public form: `address:suite:publickey`.
    ///
    /// Returns an **empty string** if the stored public key is not at the
    /// suite's exact length — "this identity cannot currently be
    /// represented" is a checkable condition here, not a hard error.
    /// Callers must check before using the result.
    pub fn public_string(&self) -> String {
        let params = self.suite.params();
        if self.public_key.len() != params.public_key_len {
            return String::new();
        }
        format!(
            "{}:{}:{}",
            self.address,
            self.suite.wire_tag(),
            self.suite.encode_key(&self.public_key)
        )
    }

    /// The canonical secret form: `address:suite:publickey:privatekey`.
    ///
    /// Returns an empty string unless **both** keys are present at their
    /// exact suite lengths. A public-only identity has no secret string.
    pub fn secret_string(&self) -> String {
        let params = self.suite.params();
        let Some(private_key) = self.private_key.as_deref() else {
            return String::new();
        };
        if self.public_key.len() != params.public_key_len
            || private_key.len() != params.private_key_len
        {
            return String::new();
        }
        format!(
            "{}:{}:{}:{}",
            self.address,
            self.suite.wire_tag(),
            self.suite.encode_key(&self.public_key),
            self.suite.encode_key(private_key)
        )
    }

    /// Local self-validation: asks the engine whether the key material is
    /// self-consistent and the address is correctly derived from the
    /// public key. Returns `false` on any handle-acquisition failure.
    pub fn locally_validate(&self, engine: &Arc<dyn CryptoEngine>) -> bool {
        self.with_handle(engine, EngineHandle::validate).unwrap_or(false)
    }

    /// Sign a message with this identity.
    ///
    /// Fails with [`IdentityError::InvalidKey`] if the engine handle cannot
    /// be acquired or the engine produces no signature — a public-only
    /// identity fails here, since signing needs the private half.
    pub fn sign(
        &self,
        engine: &Arc<dyn CryptoEngine>,
        message: &[u8],
    ) -> Result<Vec<u8>, IdentityError> {
        let signature = self
            .with_handle(engine, |h| h.sign(message, MAX_SIGNATURE_LEN))
            .map_err(|_| IdentityError::InvalidKey)?;
        if signature.is_empty() {
            return Err(IdentityError::InvalidKey);
        }
        Ok(signature)
    }

    /// Verify a signature against this identity's public key.
    ///
    /// Fails closed: an empty signature, a handle-acquisition failure, or
    /// any engine-internal problem all yield `false`. Verification failure
    /// and verification-couldn't-run are both "untrusted".
    pub fn verify(
        &self,
        engine: &Arc<dyn CryptoEngine>,
        message: &[u8],
        signature: &[u8],
    ) -> bool {
        if signature.is_empty() {
            return false;
        }
        self.with_handle(engine, |h| h.verify(message, signature))
            .unwrap_or(false)
    }

    /// Build a signed root specification: this identity plus a timestamped
    /// list of the static endpoints a root listens on.
    ///
    /// Requires at least one endpoint and a private key. Every endpoint
    /// must pack into the engine's storage form or the whole call fails —
    /// there is no partial output.
    pub fn make_root(
        &self,
        engine: &Arc<dyn CryptoEngine>,
        addresses: &[InetAddress],
        now: DateTime<Utc>,
    ) -> Result<Vec<u8>, IdentityError> {
        if addresses.is_empty() {
            return Err(IdentityError::EmptyAddressList);
        }
        self.with_handle(engine, |handle| {
            let mut storage = Vec::with_capacity(addresses.len());
            for address in addresses {
                storage.push(
                    address
                        .to_socket_storage()
                        .ok_or(IdentityError::InvalidAddress)?,
                );
            }
            let spec =
                handle.make_root_specification(now.timestamp_millis(), &storage, MAX_ROOT_SPEC_LEN);
            if spec.is_empty() {
                return Err(IdentityError::RootSpecification);
            }
            Ok(spec)
        })?
    }

    /// Run `op` against this identity's engine handle, creating the handle
    /// first if this is the first crypto operation.
    ///
    /// The handle is materialized from the secret string when we have one,
    /// else the public string, and cached under the mutex — concurrent
    /// first calls race for the lock, not for the engine. Any acquisition
    /// failure is [`IdentityError::EngineInit`].
    fn with_handle<T>(
        &self,
        engine: &Arc<dyn CryptoEngine>,
        op: impl FnOnce(&EngineHandle) -> T,
    ) -> Result<T, IdentityError> {
        let mut slot = self.handle.lock();
        if let Some(handle) = slot.as_ref() {
            return Ok(op(handle));
        }
        let text = {
            let secret = self.secret_string();
            if secret.is_empty() {
                self.public_string()
            } else {
                secret
            }
        };
        if text.is_empty() {
            return Err(IdentityError::EngineInit);
        }
        let Some(id) = engine.handle_from_text(&text) else {
            warn!(address = %self.address, "cryptographic engine rejected identity text");
            return Err(IdentityError::EngineInit);
        };
        let handle = EngineHandle::new(Arc::clone(engine), id);
        let out = op(&handle);
        *slot = Some(handle);
        Ok(out)
    }
}

impl FromStr for Identity {
    type Err = IdentityError;

    /// Parse the canonical text form, public or secret.
    ///
    /// Surrounding whitespace is trimmed. Fields past the fourth are
    /// ignored, matching the original wire behavior. Suite 1 key lengths
    /// are enforced exactly here; suite 0 lengths are deliberately not —
    /// see [`SuiteParams::enforce_parse_lengths`].
    fn from_str(s: &str) -> Result<Self, IdentityError> {
        let fields: Vec<&str> = s.trim().split(':').collect();
        if fields.len() < 3 {
            return Err(IdentityError::Malformed);
        }

        let address: Address = fields[0].parse()?;
        let suite = CipherSuite::from_wire_tag(fields[1])
            .ok_or_else(|| IdentityError::UnrecognizedSuite(fields[1].to_string()))?;
        let params = suite.params();

        let public_key = suite.decode_key(fields[2])?;
        if params.enforce_parse_lengths && public_key.len() != params.public_key_len {
            return Err(IdentityError::InvalidKey);
        }

        let private_key = match fields.get(3) {
            Some(field) => {
                let key = suite.decode_key(field)?;
                if params.enforce_parse_lengths && key.len() != params.private_key_len {
                    return Err(IdentityError::InvalidKey);
                }
                Some(key)
            }
            None => None,
        };

        Ok(Self {
            address,
            suite,
            public_key,
            private_key,
            handle: Mutex::new(None),
        })
    }
}

impl PartialEq for Identity {
    /// Structural equality over address, suite, and both key fields —
    /// including private-key *absence*. A public-only identity is never
    /// equal to its private-key-bearing twin.
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
            && self.suite == other.suite
            && self.public_key == other.public_key
            && self.private_key == other.private_key
    }
}

impl Eq for Identity {}

impl Hash for Identity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Consistent with PartialEq: everything except the handle slot.
        self.address.hash(state);
        self.suite.hash(state);
        self.public_key.hash(state);
        self.private_key.hash(state);
    }
}

impl Clone for Identity {
    /// Clones the value fields only. The clone owns no engine handle and
    /// will lazily create its own.
    fn clone(&self) -> Self {
        Self {
            address: self.address,
            suite: self.suite,
            public_key: self.public_key.clone(),
            private_key: self.private_key.clone(),
            handle: Mutex::new(None),
        }
    }
}

impl fmt::Display for Identity {
    /// The canonical public form (empty for an unrepresentable identity).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.public_string())
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print private key material, not even "partially".
        write!(
            f,
            "Identity({}{})",
            self.public_string(),
            if self.has_private() { ", +secret" } else { "" }
        )
    }
}

impl Serialize for Identity {
    /// Serializes as a single string holding exactly the public canonical
    /// form. The private key never rides along, even when present.
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.public_string())
    }
}

impl<'de> Deserialize<'de> for Identity {
    /// Parses the same canonical form; a malformed string fails with the
    /// text parser's taxonomy. On success the value is replaced wholly.
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::software::SoftwareEngine;

    fn engine() -> Arc<dyn CryptoEngine> {
        Arc::new(SoftwareEngine::new())
    }

    fn suite1_key(len: usize) -> String {
        CipherSuite::P384.encode_key(&vec![0x5a; len])
    }

    #[test]
    fn parse_requires_three_fields() {
        for text in ["", "deadbeef01", "deadbeef01:0", "   "] {
            assert!(
                matches!(text.parse::<Identity>(), Err(IdentityError::Malformed)),
                "accepted {text:?}"
            );
        }
    }

    #[test]
    fn parse_trims_whitespace() {
        let identity: Identity = "  deadbeef01:0:aabbcc \n".parse().unwrap();
        assert_eq!(identity.address().to_string(), "deadbeef01");
    }

    #[test]
    fn address_errors_propagate() {
        assert!(matches!(
            "zzzzzzzzzz:0:aabb".parse::<Identity>(),
            Err(IdentityError::Address(AddressError::InvalidHex))
        ));
        assert!(matches!(
            "0000000000:0:aabb".parse::<Identity>(),
            Err(IdentityError::Address(AddressError::Zero))
        ));
    }

    #[test]
    fn unknown_suite_tag_rejected() {
        // Well-formed address and key fields do not save an unknown tag.
        let err = format!("deadbeef01:2:{}", suite1_key(114))
            .parse::<Identity>()
            .unwrap_err();
        assert!(matches!(err, IdentityError::UnrecognizedSuite(tag) if tag == "2"));
    }

    #[test]
    fn key_decode_errors_propagate() {
        assert!(matches!(
            "deadbeef01:0:not-hex".parse::<Identity>(),
            Err(IdentityError::KeyDecode(KeyDecodeError::Hex(_)))
        ));
        assert!(matches!(
            "deadbeef01:1:UPPERCASE".parse::<Identity>(),
            Err(IdentityError::KeyDecode(KeyDecodeError::Base32(_)))
        ));
    }

    #[test]
    fn suite1_public_key_length_enforced() {
        for bad_len in [113, 115] {
            let text = format!("deadbeef01:1:{}", suite1_key(bad_len));
            assert!(
                matches!(text.parse::<Identity>(), Err(IdentityError::InvalidKey)),
                "accepted {bad_len}-byte public key"
            );
        }
        let ok = format!("deadbeef01:1:{}", suite1_key(114));
        assert!(ok.parse::<Identity>().is_ok());
    }

    #[test]
    fn suite1_private_key_length_enforced() {
        let text = format!("deadbeef01:1:{}:{}", suite1_key(114), suite1_key(111));
        assert!(matches!(text.parse::<Identity>(), Err(IdentityError::InvalidKey)));
        let ok = format!("deadbeef01:1:{}:{}", suite1_key(114), suite1_key(112));
        let identity: Identity = ok.parse().unwrap();
        assert!(identity.has_private());
    }

    // Suite 0 key lengths are deliberately not checked at parse time; nodes
    // in the field depend on the leniency. The identity is parseable but
    // not serializable — the soft-failure serializers return "".
    #[test]
    fn suite0_parse_length_leniency() {
        let identity: Identity = "deadbeef01:0:aabb".parse().unwrap();
        assert_eq!(identity.public_key().len(), 2);
        assert_eq!(identity.public_string(), "");
        assert_eq!(identity.secret_string(), "");
    }

    #[test]
    fn extra_fields_ignored() {
        let hex64 = hex::encode([7u8; 64]);
        let text = format!("deadbeef01:0:{hex64}:{hex64}:junk:more-junk");
        let identity: Identity = text.parse().unwrap();
        assert!(identity.has_private());
    }

    #[test]
    fn generated_identity_roundtrips_public() {
        let engine = engine();
        let identity = Identity::generate(&engine, CipherSuite::Curve25519).unwrap();
        let reparsed: Identity = identity.public_string().parse().unwrap();
        assert_eq!(reparsed, identity.to_public());
        assert!(!reparsed.has_private());
    }

    #[test]
    fn generated_identity_roundtrips_secret() {
        let engine = engine();
        let identity = Identity::generate(&engine, CipherSuite::Curve25519).unwrap();
        let reparsed: Identity = identity.secret_string().parse().unwrap();
        assert_eq!(reparsed, identity);
    }

    #[test]
    fn suite1_roundtrip_from_text() {
        // No software engine for P384, but parse and re-serialize are pure.
        let text = format!("deadbeef01:1:{}:{}", suite1_key(114), suite1_key(112));
        let identity: Identity = text.parse().unwrap();
        assert_eq!(identity.secret_string(), text);
        let public: Identity = identity.public_string().parse().unwrap();
        assert_eq!(public, identity.to_public());
    }

    #[test]
    fn equality_distinguishes_private_presence() {
        let engine = engine();
        let identity = Identity::generate(&engine, CipherSuite::Curve25519).unwrap();
        let public = identity.to_public();
        assert_eq!(public.address(), identity.address());
        assert_eq!(public.public_key(), identity.public_key());
        assert_ne!(public, identity);
    }

    #[test]
    fn equality_is_nil_safe_through_option() {
        let engine = engine();
        let identity = Identity::generate(&engine, CipherSuite::Curve25519).unwrap();
        let none: Option<Identity> = None;
        assert_eq!(none, None);
        assert_ne!(Some(identity.clone()), None);
        assert_eq!(Some(identity.clone()), Some(identity));
    }

    #[test]
    fn clone_is_equal_but_owns_no_handle() {
        let engine = engine();
        let identity = Identity::generate(&engine, CipherSuite::Curve25519).unwrap();
        assert!(identity.locally_validate(&engine));
        let cloned = identity.clone();
        assert_eq!(cloned, identity);
        assert!(cloned.handle.lock().is_none());
    }

    #[test]
    fn json_contract_is_public_string() {
        let engine = engine();
        let identity = Identity::generate(&engine, CipherSuite::Curve25519).unwrap();
        let json = serde_json::to_string(&identity).unwrap();
        assert_eq!(json, format!("\"{}\"", identity.public_string()));
        assert!(!json.contains(&identity.suite().encode_key(identity.private_key().unwrap())));

        let back: Identity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, identity.to_public());
    }

    #[test]
    fn json_malformed_string_rejected() {
        assert!(serde_json::from_str::<Identity>("\"deadbeef01:2:aabb\"").is_err());
        assert!(serde_json::from_str::<Identity>("\"\"").is_err());
        assert!(serde_json::from_str::<Identity>("42").is_err());
    }

    #[test]
    fn display_matches_public_string() {
        let engine = engine();
        let identity = Identity::generate(&engine, CipherSuite::Curve25519).unwrap();
        assert_eq!(identity.to_string(), identity.public_string());
    }

    #[test]
    fn debug_never_leaks_private_key() {
        let engine = engine();
        let identity = Identity::generate(&engine, CipherSuite::Curve25519).unwrap();
        let debug = format!("{identity:?}");
        let private_hex = hex::encode(identity.private_key().unwrap());
        assert!(!debug.contains(&private_hex));
        assert!(debug.ends_with("+secret)"));
    }

    #[test]
    fn sign_requires_private_key() {
        let engine = engine();
        let identity = Identity::generate(&engine, CipherSuite::Curve25519).unwrap();
        let public = identity.to_public();
        assert!(matches!(
            public.sign(&engine, b"test"),
            Err(IdentityError::InvalidKey)
        ));
    }

    #[test]
    fn sign_fails_on_unserializable_identity() {
        let engine = engine();
        // Lenient parse lets this in; handle acquisition cannot serialize it.
        let identity: Identity = "deadbeef01:0:aabb".parse().unwrap();
        assert!(matches!(
            identity.sign(&engine, b"test"),
            Err(IdentityError::InvalidKey)
        ));
        assert!(!identity.locally_validate(&engine));
    }

    #[test]
    fn verify_fails_closed_on_empty_signature() {
        let engine = engine();
        let identity = Identity::generate(&engine, CipherSuite::Curve25519).unwrap();
        assert!(!identity.verify(&engine, b"test", &[]));
    }

    #[test]
    fn make_root_requires_endpoints() {
        let engine = engine();
        let identity = Identity::generate(&engine, CipherSuite::Curve25519).unwrap();
        assert!(matches!(
            identity.make_root(&engine, &[], Utc::now()),
            Err(IdentityError::EmptyAddressList)
        ));
    }

    #[test]
    fn make_root_rejects_unpackable_endpoint() {
        let engine = engine();
        let identity = Identity::generate(&engine, CipherSuite::Curve25519).unwrap();
        let good: InetAddress = "198.51.100.7/9993".parse().unwrap();
        let bad: InetAddress = "0.0.0.0/9993".parse().unwrap();
        assert!(matches!(
            identity.make_root(&engine, &[good, bad], Utc::now()),
            Err(IdentityError::InvalidAddress)
        ));
    }

    #[test]
    fn make_root_requires_private_key() {
        let engine = engine();
        let identity = Identity::generate(&engine, CipherSuite::Curve25519).unwrap();
        let public = identity.to_public();
        let endpoint: InetAddress = "198.51.100.7/9993".parse().unwrap();
        assert!(matches!(
            public.make_root(&engine, &[endpoint], Utc::now()),
            Err(IdentityError::RootSpecification)
        ));
    }

    #[test]
    fn make_root_produces_output() {
        let engine = engine();
        let identity = Identity::generate(&engine, CipherSuite::Curve25519).unwrap();
        let endpoints: Vec<InetAddress> = vec![
            "198.51.100.7/9993".parse().unwrap(),
            "2001:db8::1/9993".parse().unwrap(),
        ];
        let spec = identity.make_root(&engine, &endpoints, Utc::now()).unwrap();
        assert!(!spec.is_empty());
    }

    #[test]
    fn from_engine_handle_adopts_the_handle() {
        let engine = engine();
        let seed = Identity::generate(&engine, CipherSuite::Curve25519).unwrap();
        let raw = engine.handle_from_text(&seed.secret_string()).unwrap();

        let identity = Identity::from_engine_handle(&engine, raw).unwrap();
        assert_eq!(identity, seed);
        // The adopted handle is live and usable without re-materialization.
        assert!(identity.locally_validate(&engine));
    }

    #[test]
    fn from_engine_handle_rejects_unknown_handle() {
        let engine = engine();
        let bogus = HandleId::new(0xdead_beef).unwrap();
        assert!(matches!(
            Identity::from_engine_handle(&engine, bogus),
            Err(IdentityError::Engine(EngineError::InvalidParameter))
        ));
    }

    #[test]
    fn generate_unsupported_suite_propagates_engine_error() {
        let engine = engine();
        assert!(matches!(
            Identity::generate(&engine, CipherSuite::P384),
            Err(IdentityError::Engine(EngineError::UnsupportedSuite(CipherSuite::P384)))
        ));
    }
}
