//! Binary container format.
//!
//! A sealed file has this layout:
//!
//! ```text
//! [magic: 27 bytes][NUL: 1 byte][version: 2 bytes LE][token: N bytes]
//! ```
//!
//! - **Magic** (`SQLSEAL ENCRYPTED CONTAINER`): identifies the format.
//! - **Version**: container format revision (currently `2`, stored `02 00`).
//! - **Token**: the Fernet token wrapping the plaintext.  It carries its
//!   own IV, timestamp and HMAC, so the header is never authenticated
//!   separately and is the only readable part of the file.

use std::fmt;
use std::time::Duration;

use crate::crypto::{token, DerivedKey};
use crate::errors::{FormatError, Result, SealError};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic bytes at the start of every container.
pub const MAGIC: &[u8; 27] = b"SQLSEAL ENCRYPTED CONTAINER";

/// Terminates the magic literal.
const TERMINATOR: u8 = 0x00;

/// Magic plus terminator.
pub const MAGIC_LEN: usize = MAGIC.len() + 1;

/// Fixed prefix before the payload: magic + terminator + 2-byte version.
pub const HEADER_LEN: usize = MAGIC_LEN + 2;

// ---------------------------------------------------------------------------
// Header types
// ---------------------------------------------------------------------------

/// Container format revision, stored little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContainerVersion(pub u16);

impl ContainerVersion {
    /// The revision written by this crate.
    pub const CURRENT: ContainerVersion = ContainerVersion(2);

    pub fn to_bytes(self) -> [u8; 2] {
        self.0.to_le_bytes()
    }

    pub fn from_bytes(bytes: [u8; 2]) -> Self {
        Self(u16::from_le_bytes(bytes))
    }

    pub fn is_current(self) -> bool {
        self == Self::CURRENT
    }
}

impl fmt::Display for ContainerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The plaintext header of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    pub version: ContainerVersion,
}

impl ContainerHeader {
    /// Serialize to the fixed 30-byte prefix.
    pub fn to_bytes(self) -> [u8; HEADER_LEN] {
        let mut buf = [0u8; HEADER_LEN];
        buf[..MAGIC.len()].copy_from_slice(MAGIC);
        buf[MAGIC.len()] = TERMINATOR;
        buf[MAGIC_LEN..].copy_from_slice(&self.version.to_bytes());
        buf
    }
}

/// The prefix every container written by `encode` starts with.
pub fn expected_prefix() -> [u8; HEADER_LEN] {
    ContainerHeader {
        version: ContainerVersion::CURRENT,
    }
    .to_bytes()
}

// ---------------------------------------------------------------------------
// Decode options
// ---------------------------------------------------------------------------

/// Caller-side policy applied on top of plain decoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Reject tokens older than this.  `None` accepts any age.
    pub ttl: Option<Duration>,

    /// Reject containers whose version is not `ContainerVersion::CURRENT`.
    /// Off by default: any version after a matching magic is passed through.
    pub require_current_version: bool,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Split a container into its header and payload.
///
/// Only the magic and terminator are checked; the version is returned
/// as-is.
pub fn parse_header(bytes: &[u8]) -> std::result::Result<(ContainerHeader, &[u8]), FormatError> {
    if bytes.len() < HEADER_LEN {
        // A short buffer that does not even start with the magic is
        // reported as a magic mismatch.
        let probe = bytes.len().min(MAGIC_LEN);
        if bytes[..probe] != expected_prefix()[..probe] {
            return Err(FormatError::BadMagic);
        }
        return Err(FormatError::TooShort { len: bytes.len() });
    }

    if bytes[..MAGIC.len()] != MAGIC[..] || bytes[MAGIC.len()] != TERMINATOR {
        return Err(FormatError::BadMagic);
    }

    let version = ContainerVersion::from_bytes([bytes[MAGIC_LEN], bytes[MAGIC_LEN + 1]]);
    Ok((ContainerHeader { version }, &bytes[HEADER_LEN..]))
}

/// Encrypt `plaintext` under `key` and frame it as a container.
pub fn encode(plaintext: &[u8], key: &DerivedKey) -> Result<Vec<u8>> {
    let token_key = key.token_key().map_err(SealError::Encryption)?;
    let payload = token::encrypt(&token_key, plaintext).map_err(SealError::Encryption)?;

    let mut buf = Vec::with_capacity(HEADER_LEN + payload.len());
    buf.extend_from_slice(&expected_prefix()); // 30 bytes
    buf.extend_from_slice(payload.as_bytes()); // token

    tracing::debug!(
        plaintext_len = plaintext.len(),
        container_len = buf.len(),
        "encoded container"
    );
    Ok(buf)
}

/// Validate the header and decrypt the payload.
///
/// Fails with `SealError::Format` on a header mismatch and
/// `SealError::Authentication` when the payload does not authenticate.
pub fn decode(container: &[u8], key: &DerivedKey) -> Result<Vec<u8>> {
    decode_with_options(container, key, &DecodeOptions::default())
}

/// `decode` with an explicit TTL and version policy.
pub fn decode_with_options(
    container: &[u8],
    key: &DerivedKey,
    options: &DecodeOptions,
) -> Result<Vec<u8>> {
    let (header, payload) = parse_header(container)?;
    check_version(header, options)?;

    let token_key = key.token_key()?;
    let plaintext = token::decrypt(&token_key, payload, options.ttl)?;

    tracing::debug!(
        version = %header.version,
        plaintext_len = plaintext.len(),
        "decoded container"
    );
    Ok(plaintext)
}

/// Apply the caller's version policy to a parsed header.
pub fn check_version(header: ContainerHeader, options: &DecodeOptions) -> Result<()> {
    if options.require_current_version && !header.version.is_current() {
        return Err(FormatError::UnsupportedVersion {
            found: header.version.0,
            expected: ContainerVersion::CURRENT.0,
        }
        .into());
    }
    Ok(())
}
