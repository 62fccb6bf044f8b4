//! # Protocol Constants
//!
//! Every magic number in the Filament identity layer lives here. If you're
//! hardcoding a constant somewhere else, you're doing it wrong and you owe
//! the team coffee.
//!
//! These bounds are part of the wire contract with the cryptographic engine.
//! Changing them after identities exist in the wild is somewhere between
//! "difficult" and "career-ending", so choose wisely.

/// Upper bound on signature length accepted from the engine, in bytes.
///
/// Large enough for every suite we speak: Ed25519-family signatures are
/// 64 bytes, the P384 composite scheme produces up to 96.
pub const MAX_SIGNATURE_LEN: usize = 96;

/// Upper bound on a serialized root specification, in bytes.
///
/// A root spec carries a full identity, a timestamp, and a list of static
/// endpoints. 8 KiB is generous; an engine that needs more than this is
/// confused and its output is discarded.
pub const MAX_ROOT_SPEC_LEN: usize = 8192;

/// The identity protocol version string, assembled at compile time so we
/// don't allocate for something this trivial at runtime.
pub const PROTOCOL_VERSION: &str = env!("CARGO_PKG_VERSION");
