use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in SQLSeal.
#[derive(Debug, Error)]
pub enum SealError {
    // --- Container errors ---
    #[error("Not a recognized container: {0}")]
    Format(#[from] FormatError),

    #[error("Authentication failed — wrong password or corrupted payload ({0})")]
    Authentication(#[source] TokenError),

    #[error("Container not found at {0}")]
    ContainerNotFound(PathBuf),

    #[error("Output already exists at {0} (use --force to overwrite)")]
    ContainerAlreadyExists(PathBuf),

    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    Encryption(#[source] TokenError),

    // --- Database errors ---
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

/// Why a byte sequence was rejected before any decryption was attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("input is {len} bytes, shorter than the 30-byte header")]
    TooShort { len: usize },

    #[error("magic header does not match")]
    BadMagic,

    #[error("container version {found} is not supported (expected {expected})")]
    UnsupportedVersion { found: u16, expected: u16 },
}

/// Failures reported by the token layer.
///
/// Surfaces to container callers as `SealError::Authentication`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("key is not 32 bytes of url-safe base64")]
    InvalidKey,

    #[error("token is not valid url-safe base64 or is truncated")]
    Malformed,

    #[error("unsupported token version 0x{0:02x}")]
    UnsupportedVersion(u8),

    #[error("token has expired")]
    Expired,

    #[error("token timestamp is too far in the future")]
    FromTheFuture,

    #[error("signature mismatch")]
    InvalidSignature,

    #[error("invalid ciphertext padding")]
    InvalidPadding,
}

impl From<TokenError> for SealError {
    fn from(err: TokenError) -> Self {
        SealError::Authentication(err)
    }
}

/// Convenience type alias for SQLSeal results.
pub type Result<T> = std::result::Result<T, SealError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn encryption_failure_keeps_token_error_as_source() {
        let err = SealError::Encryption(TokenError::InvalidKey);
        assert!(err.to_string().starts_with("Encryption failed"));
        let source = err.source().and_then(|s| s.downcast_ref::<TokenError>());
        assert_eq!(source, Some(&TokenError::InvalidKey));
    }

    #[test]
    fn token_errors_convert_to_authentication() {
        let err: SealError = TokenError::InvalidSignature.into();
        assert!(matches!(
            err,
            SealError::Authentication(TokenError::InvalidSignature)
        ));
    }
}
