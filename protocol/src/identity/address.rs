//! # Node Addresses
//!
//! A Filament address is the 40-bit short name of a node: ten lowercase hex
//! digits, derived by the cryptographic engine from the node's public key.
//! It is the first field of every serialized identity and the thing humans
//! actually read off a screen when comparing nodes.
//!
//! Forty bits is a deliberate trade-off: short enough to eyeball and type,
//! long enough that collisions are an engineering concern for the address
//! derivation function, not for this module. We store it in a `u64` and
//! never let the upper 24 bits be anything but zero.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Canonical textual length of an address: ten hex digits for forty bits.
pub const ADDRESS_HEX_LEN: usize = 10;

/// All forty significant bits set.
const ADDRESS_MASK: u64 = 0xff_ffff_ffff;

/// Addresses whose leading byte is `0xff` are reserved by the engine for
/// internal use and are never assigned to real nodes.
const RESERVED_PREFIX: u64 = 0xff;

/// Errors signalled by the address parser.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    /// The input was not exactly ten characters long.
    #[error("address must be exactly {ADDRESS_HEX_LEN} hex digits, got {0}")]
    InvalidLength(usize),

    /// The input contained a character outside `[0-9a-fA-F]`.
    #[error("address contains non-hexadecimal characters")]
    InvalidHex,

    /// The all-zero address. It is not a valid node name anywhere in the
    /// protocol, so the parser refuses to produce it.
    #[error("the zero address is not a valid node address")]
    Zero,
}

/// A 40-bit node address.
///
/// # Examples
///
/// ```
/// use filament_protocol::identity::Address;
///
/// let addr: Address = "deadbeef01".parse().unwrap();
/// assert_eq!(addr.to_string(), "deadbeef01");
/// assert_eq!(addr.as_u64(), 0xdead_beef_01);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(u64);

impl Address {
    /// Construct an address from a raw integer.
    ///
    /// Returns `None` if the value is zero or does not fit in forty bits.
    /// Reserved addresses are representable — whether they are *usable* is
    /// the engine's call, not ours. See [`is_reserved`](Self::is_reserved).
    pub fn from_u64(raw: u64) -> Option<Self> {
        if raw == 0 || raw > ADDRESS_MASK {
            None
        } else {
            Some(Self(raw))
        }
    }

    /// The raw 40-bit value.
    pub fn as_u64(self) -> u64 {
        self.0
    }

    /// Big-endian five-byte form, as the engine stores addresses on the wire.
    pub fn to_bytes(self) -> [u8; 5] {
        let b = self.0.to_be_bytes();
        [b[3], b[4], b[5], b[6], b[7]]
    }

    /// Reconstruct an address from its five-byte wire form.
    ///
    /// Returns `None` for the zero address.
    pub fn from_bytes(bytes: [u8; 5]) -> Option<Self> {
        let raw = bytes.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b));
        Self::from_u64(raw)
    }

    /// True for addresses the engine will never assign to a node: zero and
    /// anything with the `0xff` leading byte.
    pub fn is_reserved(self) -> bool {
        self.0 == 0 || (self.0 >> 32) == RESERVED_PREFIX
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, AddressError> {
        if s.len() != ADDRESS_HEX_LEN {
            return Err(AddressError::InvalidLength(s.len()));
        }
        // `from_str_radix` tolerates a leading sign, which we do not.
        if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(AddressError::InvalidHex);
        }
        let raw = u64::from_str_radix(s, 16).map_err(|_| AddressError::InvalidHex)?;
        if raw == 0 {
            return Err(AddressError::Zero);
        }
        Ok(Self(raw))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:010x}", self.0)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({:010x})", self.0)
    }
}

impl From<Address> for u64 {
    fn from(addr: Address) -> u64 {
        addr.0
    }
}

impl Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.collect_str(self)
        } else {
            serializer.serialize_u64(self.0)
        }
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(serde::de::Error::custom)
        } else {
            let raw = u64::deserialize(deserializer)?;
            Address::from_u64(raw)
                .ok_or_else(|| serde::de::Error::custom("address out of range or zero"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_display_roundtrip() {
        let addr: Address = "89e92ceee5".parse().unwrap();
        assert_eq!(addr.to_string(), "89e92ceee5");
        assert_eq!(addr.as_u64(), 0x89e9_2cee_e5);
    }

    #[test]
    fn parse_accepts_uppercase_but_displays_lowercase() {
        let addr: Address = "DEADBEEF01".parse().unwrap();
        assert_eq!(addr.to_string(), "deadbeef01");
    }

    #[test]
    fn wrong_length_rejected() {
        assert_eq!(
            "deadbeef".parse::<Address>().unwrap_err(),
            AddressError::InvalidLength(8)
        );
        assert_eq!(
            "deadbeef0123".parse::<Address>().unwrap_err(),
            AddressError::InvalidLength(12)
        );
        assert_eq!("".parse::<Address>().unwrap_err(), AddressError::InvalidLength(0));
    }

    #[test]
    fn non_hex_rejected() {
        assert_eq!(
            "deadbeefzz".parse::<Address>().unwrap_err(),
            AddressError::InvalidHex
        );
        // A leading sign is ten characters but not an address.
        assert_eq!(
            "+deadbeef0".parse::<Address>().unwrap_err(),
            AddressError::InvalidHex
        );
    }

    #[test]
    fn zero_address_rejected() {
        assert_eq!("0000000000".parse::<Address>().unwrap_err(), AddressError::Zero);
        assert!(Address::from_u64(0).is_none());
    }

    #[test]
    fn forty_bit_range_enforced() {
        assert!(Address::from_u64(ADDRESS_MASK).is_some());
        assert!(Address::from_u64(ADDRESS_MASK + 1).is_none());
    }

    #[test]
    fn reserved_prefix_detected() {
        let reserved: Address = "ff00000001".parse().unwrap();
        assert!(reserved.is_reserved());
        let normal: Address = "fe00000001".parse().unwrap();
        assert!(!normal.is_reserved());
    }

    #[test]
    fn byte_roundtrip() {
        let addr: Address = "0123456789".parse().unwrap();
        assert_eq!(addr.to_bytes(), [0x01, 0x23, 0x45, 0x67, 0x89]);
        assert_eq!(Address::from_bytes(addr.to_bytes()), Some(addr));
    }

    #[test]
    fn serde_json_is_hex_string() {
        let addr: Address = "89e92ceee5".parse().unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"89e92ceee5\"");
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }
}
