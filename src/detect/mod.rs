//! Classify a database file without a passphrase.
//!
//! Looks only at the first bytes of the file, plus a read-only open
//! through SQLite when the file claims to be a plain database.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use rusqlite::{Connection, OpenFlags};
use serde::Serialize;

use crate::container::format::{self, ContainerVersion, HEADER_LEN};
use crate::errors::{Result, SealError};

/// The 16-byte header every plain SQLite 3 file starts with.
pub const SQLITE_MAGIC: &[u8; 16] = b"SQLite format 3\0";

/// Leading bytes used by some encrypted SQLite variants.
const ENCRYPTED_MARKER: [u8; 4] = [0x17, 0x07, 0x17, 0x07];

/// What a file looks like from its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Detection {
    /// A container written by this crate (any version).
    SealedContainer { version: u16 },
    /// A plain SQLite database that opens and can be queried.
    Unencrypted,
    /// Looks encrypted by something else, or is a SQLite header that
    /// cannot be queried.
    Encrypted,
    Unknown,
}

impl Detection {
    /// Whether the file is one of our containers.
    pub fn is_sealed(&self) -> bool {
        matches!(self, Detection::SealedContainer { .. })
    }

    pub fn sealed_version(&self) -> Option<ContainerVersion> {
        match self {
            Detection::SealedContainer { version } => Some(ContainerVersion(*version)),
            _ => None,
        }
    }
}

impl fmt::Display for Detection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Detection::SealedContainer { version } => {
                write!(f, "sealed container (version {version})")
            }
            Detection::Unencrypted => f.write_str("unencrypted SQLite database"),
            Detection::Encrypted => f.write_str("encrypted (unrecognized scheme)"),
            Detection::Unknown => f.write_str("unknown"),
        }
    }
}

/// Classify the file at `path`.
pub fn detect_file(path: &Path) -> Result<Detection> {
    if !path.exists() {
        return Err(SealError::ContainerNotFound(path.to_path_buf()));
    }

    let mut head = Vec::with_capacity(HEADER_LEN);
    File::open(path)?
        .take(HEADER_LEN as u64)
        .read_to_end(&mut head)?;

    let detection = match classify_header(&head) {
        Detection::Unencrypted if !can_query(path) => Detection::Encrypted,
        other => other,
    };
    tracing::debug!(path = %path.display(), %detection, "detected file type");
    Ok(detection)
}

/// Classify from header bytes alone.
///
/// A SQLite header is reported as `Unencrypted`; `detect_file` downgrades
/// it to `Encrypted` when the database cannot actually be read.
pub fn classify_header(head: &[u8]) -> Detection {
    if let Ok((header, _)) = format::parse_header(head) {
        return Detection::SealedContainer {
            version: header.version.0,
        };
    }

    if head.len() >= SQLITE_MAGIC.len() && head[..SQLITE_MAGIC.len()] == SQLITE_MAGIC[..] {
        return Detection::Unencrypted;
    }

    if head.starts_with(&ENCRYPTED_MARKER) {
        return Detection::Encrypted;
    }

    // Random-looking salt area where a plain file would have zeros.
    let salt_area = head.get(4..head.len().min(16)).unwrap_or_default();
    if salt_area.iter().any(|&b| b != 0) {
        return Detection::Encrypted;
    }

    Detection::Unknown
}

/// Open read-only and run a trivial query against the schema table.
fn can_query(path: &Path) -> bool {
    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let Ok(conn) = Connection::open_with_flags(path, flags) else {
        return false;
    };
    conn.query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| {
        row.get::<_, i64>(0)
    })
    .is_ok()
}
