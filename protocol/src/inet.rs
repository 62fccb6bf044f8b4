//! # Static Endpoints
//!
//! The one place the identity layer touches IP networking: root
//! specifications advertise the static endpoints a root node listens on.
//! [`InetAddress`] is the human-facing `ip/port` form; [`SocketStorage`]
//! is the fixed-size blob the engine consumes, one packed record per
//! endpoint. Nothing here dials sockets — transport is someone else's job.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use thiserror::Error;

/// Errors from the `ip/port` endpoint parser.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InetAddressError {
    /// No `/` separating IP from port.
    #[error("endpoint must have the form ip/port")]
    MissingSeparator,

    /// The IP half did not parse as an IPv4 or IPv6 literal.
    #[error("invalid IP literal in endpoint")]
    InvalidIp,

    /// The port half did not parse as a 16-bit integer.
    #[error("invalid port in endpoint")]
    InvalidPort,
}

/// An IP endpoint in the protocol's canonical `ip/port` notation.
///
/// # Examples
///
/// ```
/// use filament_protocol::inet::InetAddress;
///
/// let ep: InetAddress = "198.51.100.7/9993".parse().unwrap();
/// assert_eq!(ep.to_string(), "198.51.100.7/9993");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct InetAddress {
    /// The IP address, v4 or v6.
    pub ip: IpAddr,
    /// The UDP/TCP port.
    pub port: u16,
}

impl InetAddress {
    /// Construct an endpoint from parts.
    pub fn new(ip: IpAddr, port: u16) -> Self {
        Self { ip, port }
    }

    /// Pack into the engine's native storage form.
    ///
    /// Returns `None` for endpoints no peer could ever reach: unspecified
    /// addresses (`0.0.0.0`, `::`) and port zero.
    pub fn to_socket_storage(&self) -> Option<SocketStorage> {
        if self.ip.is_unspecified() || self.port == 0 {
            return None;
        }
        Some(SocketStorage::pack(self.ip, self.port))
    }
}

impl From<SocketAddr> for InetAddress {
    fn from(addr: SocketAddr) -> Self {
        Self::new(addr.ip(), addr.port())
    }
}

impl FromStr for InetAddress {
    type Err = InetAddressError;

    fn from_str(s: &str) -> Result<Self, InetAddressError> {
        let (ip, port) = s.rsplit_once('/').ok_or(InetAddressError::MissingSeparator)?;
        let ip: IpAddr = ip.parse().map_err(|_| InetAddressError::InvalidIp)?;
        let port: u16 = port.parse().map_err(|_| InetAddressError::InvalidPort)?;
        Ok(Self { ip, port })
    }
}

impl fmt::Display for InetAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.ip, self.port)
    }
}

impl Serialize for InetAddress {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for InetAddress {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Length of a packed endpoint record: family byte, 16 address bytes,
/// 2 port bytes.
pub const SOCKET_STORAGE_LEN: usize = 19;

const FAMILY_IPV4: u8 = 4;
const FAMILY_IPV6: u8 = 6;

/// An endpoint packed into the engine's fixed-size record.
///
/// Layout: `family (1) | address (16, v4 left-aligned and zero-padded) |
/// port (2, big-endian)`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SocketStorage([u8; SOCKET_STORAGE_LEN]);

impl SocketStorage {
    fn pack(ip: IpAddr, port: u16) -> Self {
        let mut buf = [0u8; SOCKET_STORAGE_LEN];
        match ip {
            IpAddr::V4(v4) => {
                buf[0] = FAMILY_IPV4;
                buf[1..5].copy_from_slice(&v4.octets());
            }
            IpAddr::V6(v6) => {
                buf[0] = FAMILY_IPV6;
                buf[1..17].copy_from_slice(&v6.octets());
            }
        }
        buf[17..19].copy_from_slice(&port.to_be_bytes());
        Self(buf)
    }

    /// The raw packed record.
    pub fn as_bytes(&self) -> &[u8; SOCKET_STORAGE_LEN] {
        &self.0
    }
}

impl fmt::Debug for SocketStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SocketStorage({})", hex::encode(self.0))
    }
}
