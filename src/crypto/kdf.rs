//! Passphrase-to-key derivation.
//!
//! The key is `SHA-256(passphrase || SALT)`, then url-safe base64 encoded
//! because that is the key format the token layer consumes.
//!
//! This is a single unstretched hash under an application-wide salt.  It
//! offers no resistance to offline guessing beyond one SHA-256 per guess.
//! Every container ever written depends on it, so changing either the
//! salt or the hash requires a new container version.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, Zeroizing};

use super::token::TokenKey;
use crate::errors::TokenError;

/// Application salt appended to every passphrase.
pub const SALT: &str = "sqlseal/static-salt/v2";

/// Length of the derived key in bytes (256 bits).
pub const KEY_LEN: usize = 32;

/// A 32-byte key derived from a passphrase.
///
/// Zeroes its memory when dropped.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct DerivedKey {
    bytes: [u8; KEY_LEN],
}

impl DerivedKey {
    /// Access the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    /// The key in url-safe base64 (padded), as the token layer expects it.
    pub fn encoded(&self) -> Zeroizing<String> {
        Zeroizing::new(URL_SAFE.encode(self.bytes))
    }

    /// Parse the encoded form into a token key.
    pub fn token_key(&self) -> Result<TokenKey, TokenError> {
        TokenKey::from_encoded(&self.encoded())
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Derive the container key for `passphrase`.
///
/// Pure function of the passphrase: the same input always yields the same
/// key.  Empty passphrases are accepted.
pub fn derive(passphrase: &str) -> DerivedKey {
    let mut hasher = Sha256::new();
    hasher.update(passphrase.as_bytes());
    hasher.update(SALT.as_bytes());

    let mut bytes = [0u8; KEY_LEN];
    bytes.copy_from_slice(&hasher.finalize());
    DerivedKey { bytes }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_is_deterministic() {
        assert_eq!(
            derive("securepassword123").as_bytes(),
            derive("securepassword123").as_bytes()
        );
    }

    #[test]
    fn different_passphrases_give_different_keys() {
        assert_ne!(derive("one").as_bytes(), derive("two").as_bytes());
    }

    #[test]
    fn digest_covers_passphrase_then_salt() {
        let expected = Sha256::digest(format!("abc{SALT}").as_bytes());
        assert_eq!(derive("abc").as_bytes().as_slice(), expected.as_slice());
    }

    #[test]
    fn encoded_key_is_stable() {
        // Produced independently with Python's hashlib + base64.urlsafe_b64encode.
        assert_eq!(
            derive("securepassword123").encoded().as_str(),
            "2TdEQnhwaylVlixgfw8ShB4po7eUw6oqNAtatE8clis="
        );
        assert_eq!(
            derive("").encoded().as_str(),
            "TTaZgetYl1LhjlhzA-V0QLyaoNx-5x_jmrrfW6YUR4U="
        );
    }

    #[test]
    fn encoded_key_parses_as_token_key() {
        assert!(derive("anything").token_key().is_ok());
    }

    #[test]
    fn debug_output_is_redacted() {
        let rendered = format!("{:?}", derive("secret"));
        assert!(rendered.contains("REDACTED"));
    }
}
