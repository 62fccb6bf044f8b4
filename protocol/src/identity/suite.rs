//! # Cipher Suites
//!
//! Filament identities come in exactly two flavors, and everything that
//! distinguishes them — key sizes, text encoding, parse-time strictness —
//! lives in one table in this module. If you find yourself matching on a
//! suite somewhere else to pick a key length, stop and add it here.
//!
//! - **Suite 0 (Curve25519)** — the original composite key: an X25519
//!   exchange key and an Ed25519 signing key, 64 bytes of public material,
//!   hex-encoded in text form.
//! - **Suite 1 (P384)** — the NIST-curve composite introduced later: 114
//!   public / 112 private bytes, base-32 encoded (lowercase standard
//!   alphabet, no padding) to keep the longer keys readable.
//!
//! The wire tag is a single ASCII digit and is closed: anything other than
//! `"0"` or `"1"` is an unrecognized suite, full stop.

use data_encoding::{Encoding, Specification};
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

/// Textual encoding used for a suite's key fields.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum KeyEncoding {
    /// Lowercase hexadecimal.
    Hex,
    /// Lowercase RFC 4648 standard base-32, no padding.
    Base32Lower,
}

/// Fixed parameters of a cipher suite.
///
/// This table is the single source of truth for key geometry. It is owned
/// entirely by this module; no other component carries its own copy of
/// these numbers.
#[derive(Debug)]
pub struct SuiteParams {
    /// Exact public key length in bytes. No other length is valid.
    pub public_key_len: usize,
    /// Exact private key length in bytes. No other length is valid.
    pub private_key_len: usize,
    /// How key bytes appear in the canonical text form.
    pub encoding: KeyEncoding,
    /// Whether key lengths are enforced when *parsing* text.
    ///
    /// Suite 0 identities have historically been accepted with any hex key
    /// length, and deployed nodes depend on that leniency. Serialization
    /// enforces exact lengths for every suite regardless.
    pub enforce_parse_lengths: bool,
}

static CURVE25519_PARAMS: SuiteParams = SuiteParams {
    public_key_len: 64,
    private_key_len: 64,
    encoding: KeyEncoding::Hex,
    enforce_parse_lengths: false,
};

static P384_PARAMS: SuiteParams = SuiteParams {
    public_key_len: 114,
    private_key_len: 112,
    encoding: KeyEncoding::Base32Lower,
    enforce_parse_lengths: true,
};

/// A key field failed to decode from its textual form.
///
/// These wrap the underlying codec errors unchanged so callers can see
/// exactly what the decoder objected to.
#[derive(Debug, Error)]
pub enum KeyDecodeError {
    /// Suite 0 key field was not valid hex.
    #[error("invalid hex key field: {0}")]
    Hex(#[from] hex::FromHexError),

    /// Suite 1 key field was not valid lowercase base-32.
    #[error("invalid base32 key field: {0}")]
    Base32(#[from] data_encoding::DecodeError),
}

/// The two supported identity cipher suites.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(u8)]
pub enum CipherSuite {
    /// X25519 + Ed25519 composite. Wire tag `0`.
    Curve25519 = 0,
    /// NIST P-384 composite. Wire tag `1`.
    P384 = 1,
}

impl CipherSuite {
    /// The fixed parameter table entry for this suite.
    pub fn params(self) -> &'static SuiteParams {
        match self {
            Self::Curve25519 => &CURVE25519_PARAMS,
            Self::P384 => &P384_PARAMS,
        }
    }

    /// Parse the single-digit wire tag. Anything but `"0"` or `"1"` is
    /// unrecognized — including `"01"`, whitespace, and future tags.
    pub fn from_wire_tag(tag: &str) -> Option<Self> {
        match tag {
            "0" => Some(Self::Curve25519),
            "1" => Some(Self::P384),
            _ => None,
        }
    }

    /// The tag as it appears between colons in the canonical text form.
    pub const fn wire_tag(self) -> &'static str {
        match self {
            Self::Curve25519 => "0",
            Self::P384 => "1",
        }
    }

    /// Encode raw key bytes into this suite's text form.
    pub fn encode_key(self, raw: &[u8]) -> String {
        match self.params().encoding {
            KeyEncoding::Hex => hex::encode(raw),
            KeyEncoding::Base32Lower => base32_lower().encode(raw),
        }
    }

    /// Decode a key field from this suite's text form.
    ///
    /// This is a pure codec step — length checks are the parser's job.
    pub fn decode_key(self, text: &str) -> Result<Vec<u8>, KeyDecodeError> {
        match self.params().encoding {
            KeyEncoding::Hex => Ok(hex::decode(text)?),
            KeyEncoding::Base32Lower => Ok(base32_lower().decode(text.as_bytes())?),
        }
    }
}

impl fmt::Display for CipherSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Curve25519 => write!(f, "c25519"),
            Self::P384 => write!(f, "p384"),
        }
    }
}

/// Lowercase standard base-32, no padding. The RFC 4648 alphabet shifted to
/// lowercase so identity strings are case-uniform end to end.
fn base32_lower() -> &'static Encoding {
    static ENCODING: OnceLock<Encoding> = OnceLock::new();
    ENCODING.get_or_init(|| {
        let mut spec = Specification::new();
        spec.symbols.push_str("abcdefghijklmnopqrstuvwxyz234567");
        spec.encoding().expect("static base32 alphabet is valid")
    })
}
