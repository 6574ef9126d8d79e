//! Reading, writing and verifying container files on disk.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::format::{self, ContainerHeader, DecodeOptions, HEADER_LEN};
use crate::crypto::{derive, token};
use crate::errors::{FormatError, Result, SealError};

/// Outcome of a successful verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verified {
    pub header: ContainerHeader,
    /// Size of the recovered plaintext in bytes.
    pub plaintext_len: usize,
}

/// What can be learned about a container without its passphrase.
#[derive(Debug, Clone, Serialize)]
pub struct ContainerInfo {
    pub version: u16,
    pub current_version: bool,
    pub header_len: usize,
    pub payload_len: usize,
    /// Creation time stamped into the token, if the token is well-formed.
    pub created_at: Option<DateTime<Utc>>,
}

/// Write container bytes to disk **atomically**.
///
/// Writes to a temp file in the same directory and renames it over
/// `path`, so readers never see a half-written container.
pub fn write_container(path: &Path, bytes: &[u8]) -> Result<()> {
    write_atomic(path, bytes)
}

/// Write arbitrary bytes atomically with owner-only permissions.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    let result = write_owner_only(&tmp_path, bytes).and_then(|()| fs::rename(&tmp_path, path));
    if result.is_err() {
        // The temp file may hold plaintext; never leave it behind.
        let _ = fs::remove_file(&tmp_path);
    }
    Ok(result?)
}

/// Create (or truncate) `path` owner-only and write `bytes` to it.
fn write_owner_only(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;

    // `mode` only applies on creation; tighten a stale leftover too.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }

    file.write_all(bytes)?;
    file.sync_all()
}

/// Read a whole container file.
pub fn read_container(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(SealError::ContainerNotFound(path.to_path_buf()));
    }
    Ok(fs::read(path)?)
}

/// Check that `path` is a container that `passphrase` decrypts.
///
/// The 30-byte prefix is read and validated first; on a mismatch the
/// payload is never read or decrypted.
pub fn verify_file(path: &Path, passphrase: &str, options: &DecodeOptions) -> Result<Verified> {
    if !path.exists() {
        return Err(SealError::ContainerNotFound(path.to_path_buf()));
    }

    let mut file = File::open(path)?;
    let mut container = Vec::with_capacity(HEADER_LEN);
    (&mut file)
        .take(HEADER_LEN as u64)
        .read_to_end(&mut container)?;
    let (header, _) = format::parse_header(&container)?;
    format::check_version(header, options)?;

    file.read_to_end(&mut container)?;

    let key = derive(passphrase);
    let plaintext = format::decode_with_options(&container, &key, options)?;

    Ok(Verified {
        header,
        plaintext_len: plaintext.len(),
    })
}

/// Boolean convenience over `verify_file` with default options.
///
/// Failures are reported as `warn` diagnostics only.
pub fn verify(path: &Path, passphrase: &str) -> bool {
    match verify_file(path, passphrase, &DecodeOptions::default()) {
        Ok(verified) => {
            tracing::info!(
                path = %path.display(),
                version = %verified.header.version,
                plaintext_len = verified.plaintext_len,
                "container verified"
            );
            true
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "container verification failed");
            false
        }
    }
}

/// Describe a container without decrypting it.
pub fn inspect(bytes: &[u8]) -> std::result::Result<ContainerInfo, FormatError> {
    let (header, payload) = format::parse_header(bytes)?;

    let created_at = token::timestamp(payload)
        .ok()
        .and_then(|ts| i64::try_from(ts).ok())
        .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0));

    Ok(ContainerInfo {
        version: header.version.0,
        current_version: header.version.is_current(),
        header_len: HEADER_LEN,
        payload_len: payload.len(),
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::format::{encode, ContainerVersion};
    use tempfile::TempDir;

    #[test]
    fn write_then_read_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.db");
        write_container(&path, b"bytes").unwrap();
        assert_eq!(read_container(&path).unwrap(), b"bytes");
        assert!(!dir.path().join(".out.db.tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn written_container_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.db");
        write_container(&path, b"bytes").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn failed_rename_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("plain.db");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("occupant"), b"x").unwrap();

        let result = write_atomic(&target, b"SQLite format 3\0secret rows");
        assert!(result.is_err());
        assert!(!dir.path().join(".plain.db.tmp").exists());
        assert!(target.join("occupant").exists());
    }

    #[cfg(unix)]
    #[test]
    fn stale_temp_file_is_tightened_and_replaced() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let tmp = dir.path().join(".out.db.tmp");
        fs::write(&tmp, b"leftover from a crash").unwrap();
        fs::set_permissions(&tmp, fs::Permissions::from_mode(0o644)).unwrap();

        let path = dir.path().join("out.db");
        write_container(&path, b"fresh").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"fresh");
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn read_missing_container_fails() {
        let dir = TempDir::new().unwrap();
        let err = read_container(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, SealError::ContainerNotFound(_)));
    }

    #[test]
    fn verify_file_reports_plaintext_len() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sealed.db");
        write_container(&path, &encode(b"twelve bytes", &derive("pw")).unwrap()).unwrap();

        let verified = verify_file(&path, "pw", &DecodeOptions::default()).unwrap();
        assert_eq!(verified.plaintext_len, 12);
        assert_eq!(verified.header.version, ContainerVersion::CURRENT);
    }

    #[test]
    fn verify_file_short_file_is_format_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("short.db");
        fs::write(&path, b"tiny").unwrap();

        let err = verify_file(&path, "pw", &DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, SealError::Format(FormatError::BadMagic)));
    }

    #[test]
    fn verify_missing_file_is_false() {
        let dir = TempDir::new().unwrap();
        assert!(!verify(&dir.path().join("missing.db"), "pw"));
    }

    #[test]
    fn inspect_reads_header_and_timestamp() {
        let before = Utc::now().timestamp();
        let sealed = encode(b"abc", &derive("pw")).unwrap();
        let info = inspect(&sealed).unwrap();

        assert_eq!(info.version, 2);
        assert!(info.current_version);
        assert_eq!(info.payload_len, sealed.len() - HEADER_LEN);
        let created = info.created_at.unwrap().timestamp();
        assert!(created >= before && created <= Utc::now().timestamp());
    }

    #[test]
    fn inspect_tolerates_garbage_payload() {
        let mut bytes = format::expected_prefix().to_vec();
        bytes.extend_from_slice(b"not a token");
        let info = inspect(&bytes).unwrap();
        assert!(info.created_at.is_none());
        assert_eq!(info.payload_len, 11);
    }
}
