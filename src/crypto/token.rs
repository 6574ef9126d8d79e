//! Fernet-compatible authenticated tokens (AES-128-CBC + HMAC-SHA256).
//!
//! Each call to `encrypt` generates a fresh random 16-byte IV and stamps
//! the current unix time into the token.  `decrypt` checks the HMAC in
//! constant time before touching the ciphertext.
//!
//! Layout of the decoded token buffer:
//!   [ 0x80 | timestamp: 8 bytes BE | IV: 16 bytes | ciphertext | HMAC-SHA256: 32 bytes ]
//!
//! The token handed to callers is the url-safe base64 encoding of that
//! buffer, so it is byte-compatible with Python's `cryptography.fernet`.

use std::time::Duration;

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use zeroize::{Zeroize, Zeroizing};

use crate::errors::TokenError;

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;
type HmacSha256 = Hmac<Sha256>;

/// Length of an encoded token key once base64-decoded.
pub const KEY_LEN: usize = 32;

/// Size of the CBC initialization vector in bytes.
pub const IV_LEN: usize = 16;

const VERSION: u8 = 0x80;
const TIMESTAMP_LEN: usize = 8;
const HALF_KEY_LEN: usize = KEY_LEN / 2;
const BLOCK_LEN: usize = 16;
const MAC_LEN: usize = 32;

/// version + timestamp + IV.
const PREFIX_LEN: usize = 1 + TIMESTAMP_LEN + IV_LEN;

/// Smallest well-formed token: prefix, one padded block and the tag.
const MIN_TOKEN_LEN: usize = PREFIX_LEN + BLOCK_LEN + MAC_LEN;

/// Tokens stamped further than this into the future are rejected when a TTL is set.
const MAX_CLOCK_SKEW_SECS: u64 = 60;

/// A token key split into its signing and encryption halves.
///
/// Wiped from memory on drop.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct TokenKey {
    signing: [u8; HALF_KEY_LEN],
    encryption: [u8; HALF_KEY_LEN],
}

impl TokenKey {
    /// Parse a url-safe base64 key holding exactly 32 bytes.
    pub fn from_encoded(encoded: &str) -> Result<Self, TokenError> {
        let raw = Zeroizing::new(
            URL_SAFE
                .decode(encoded.as_bytes())
                .map_err(|_| TokenError::InvalidKey)?,
        );
        if raw.len() != KEY_LEN {
            return Err(TokenError::InvalidKey);
        }

        let mut signing = [0u8; HALF_KEY_LEN];
        let mut encryption = [0u8; HALF_KEY_LEN];
        signing.copy_from_slice(&raw[..HALF_KEY_LEN]);
        encryption.copy_from_slice(&raw[HALF_KEY_LEN..]);
        Ok(Self {
            signing,
            encryption,
        })
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        <HmacSha256 as Mac>::new_from_slice(&self.signing).map_err(|_| TokenError::InvalidKey)
    }
}

impl std::fmt::Debug for TokenKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenKey").finish_non_exhaustive()
    }
}

/// Encrypt `plaintext` into a token stamped with the current time.
pub fn encrypt(key: &TokenKey, plaintext: &[u8]) -> Result<String, TokenError> {
    let mut iv = [0u8; IV_LEN];
    rand::rng().fill_bytes(&mut iv);
    encrypt_at(key, plaintext, unix_now(), &iv)
}

/// Encrypt with an explicit timestamp and IV.
///
/// Same inputs always produce the same token.  Only `encrypt` should be
/// used for real data since IV reuse leaks plaintext equality.
pub fn encrypt_at(
    key: &TokenKey,
    plaintext: &[u8],
    timestamp: u64,
    iv: &[u8; IV_LEN],
) -> Result<String, TokenError> {
    let ciphertext = Aes128CbcEnc::new_from_slices(&key.encryption, iv)
        .map_err(|_| TokenError::InvalidKey)?
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let mut data = Vec::with_capacity(PREFIX_LEN + ciphertext.len() + MAC_LEN);
    data.push(VERSION);
    data.extend_from_slice(&timestamp.to_be_bytes());
    data.extend_from_slice(iv);
    data.extend_from_slice(&ciphertext);

    let mut mac = key.mac()?;
    mac.update(&data);
    data.extend_from_slice(&mac.finalize().into_bytes());

    Ok(URL_SAFE.encode(data))
}

/// Authenticate and decrypt a token.
///
/// With `ttl` set, tokens older than `ttl` (or stamped more than a minute
/// in the future) are rejected before the signature is checked.
pub fn decrypt(
    key: &TokenKey,
    token: &[u8],
    ttl: Option<Duration>,
) -> Result<Vec<u8>, TokenError> {
    decrypt_at(key, token, ttl, unix_now())
}

/// `decrypt` against an explicit clock reading (unix seconds).
pub fn decrypt_at(
    key: &TokenKey,
    token: &[u8],
    ttl: Option<Duration>,
    now: u64,
) -> Result<Vec<u8>, TokenError> {
    let data = decode_token(token)?;

    if let Some(ttl) = ttl {
        let issued = read_timestamp(&data);
        if issued.saturating_add(ttl.as_secs()) < now {
            return Err(TokenError::Expired);
        }
        if now.saturating_add(MAX_CLOCK_SKEW_SECS) < issued {
            return Err(TokenError::FromTheFuture);
        }
    }

    let (signed, tag) = data.split_at(data.len() - MAC_LEN);
    let mut mac = key.mac()?;
    mac.update(signed);
    mac.verify_slice(tag).map_err(|_| TokenError::InvalidSignature)?;

    let iv = &signed[1 + TIMESTAMP_LEN..PREFIX_LEN];
    let ciphertext = &signed[PREFIX_LEN..];
    if ciphertext.len() % BLOCK_LEN != 0 {
        return Err(TokenError::InvalidPadding);
    }

    Aes128CbcDec::new_from_slices(&key.encryption, iv)
        .map_err(|_| TokenError::InvalidKey)?
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| TokenError::InvalidPadding)
}

/// Read the creation time embedded in a token without verifying it.
pub fn timestamp(token: &[u8]) -> Result<u64, TokenError> {
    let data = decode_token(token)?;
    Ok(read_timestamp(&data))
}

/// Base64-decode a token and check its version byte and minimum length.
fn decode_token(token: &[u8]) -> Result<Vec<u8>, TokenError> {
    let data = URL_SAFE.decode(token).map_err(|_| TokenError::Malformed)?;

    match data.first() {
        Some(&VERSION) => {}
        Some(&other) => return Err(TokenError::UnsupportedVersion(other)),
        None => return Err(TokenError::Malformed),
    }
    if data.len() < MIN_TOKEN_LEN {
        return Err(TokenError::Malformed);
    }

    Ok(data)
}

/// Callers must have validated the length through `decode_token`.
fn read_timestamp(data: &[u8]) -> u64 {
    let mut raw = [0u8; TIMESTAMP_LEN];
    raw.copy_from_slice(&data[1..1 + TIMESTAMP_LEN]);
    u64::from_be_bytes(raw)
}

fn unix_now() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Key, IV, timestamp and token from the published Fernet test vectors.
    const VECTOR_KEY: &str = "cw_0x689RpI-jtRR7oE8h_eQsKImvJapLeSbXpwF4e4=";
    const VECTOR_TIMESTAMP: u64 = 499_162_800;
    const VECTOR_TOKEN: &str = "gAAAAAAdwJ6wAAECAwQFBgcICQoLDA0ODy021cpGVWKZ_eEwCGM4BLLF_5CV9dOPmrhuVUPgJobwOz7JcbmrR64jVmpU4IwqDA==";

    fn vector_iv() -> [u8; IV_LEN] {
        let mut iv = [0u8; IV_LEN];
        for (i, b) in iv.iter_mut().enumerate() {
            *b = i as u8;
        }
        iv
    }

    fn key() -> TokenKey {
        TokenKey::from_encoded(VECTOR_KEY).unwrap()
    }

    #[test]
    fn encrypt_at_matches_reference_vector() {
        let token = encrypt_at(&key(), b"hello", VECTOR_TIMESTAMP, &vector_iv()).unwrap();
        assert_eq!(token, VECTOR_TOKEN);
    }

    #[test]
    fn decrypts_reference_vector() {
        let plain = decrypt(&key(), VECTOR_TOKEN.as_bytes(), None).unwrap();
        assert_eq!(plain, b"hello");
    }

    #[test]
    fn roundtrip_with_random_iv() {
        let token = encrypt(&key(), b"some bytes").unwrap();
        assert_eq!(decrypt(&key(), token.as_bytes(), None).unwrap(), b"some bytes");
    }

    #[test]
    fn roundtrip_empty_plaintext() {
        let token = encrypt(&key(), b"").unwrap();
        assert!(decrypt(&key(), token.as_bytes(), None).unwrap().is_empty());
    }

    #[test]
    fn two_encryptions_differ() {
        let a = encrypt(&key(), b"same").unwrap();
        let b = encrypt(&key(), b"same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn wrong_key_is_rejected() {
        let other = TokenKey::from_encoded("AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=").unwrap();
        let result = decrypt(&other, VECTOR_TOKEN.as_bytes(), None);
        assert_eq!(result, Err(TokenError::InvalidSignature));
    }

    #[test]
    fn tampered_ciphertext_is_rejected() {
        let mut raw = URL_SAFE.decode(VECTOR_TOKEN).unwrap();
        raw[PREFIX_LEN] ^= 0x01;
        let tampered = URL_SAFE.encode(raw);
        assert_eq!(
            decrypt(&key(), tampered.as_bytes(), None),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn expired_token_is_rejected_with_ttl() {
        let ttl = Some(Duration::from_secs(30));
        let result = decrypt_at(&key(), VECTOR_TOKEN.as_bytes(), ttl, VECTOR_TIMESTAMP + 31);
        assert_eq!(result, Err(TokenError::Expired));

        let fresh = decrypt_at(&key(), VECTOR_TOKEN.as_bytes(), ttl, VECTOR_TIMESTAMP + 30);
        assert_eq!(fresh.unwrap(), b"hello");
    }

    #[test]
    fn future_token_is_rejected_with_ttl() {
        let ttl = Some(Duration::from_secs(30));
        let result = decrypt_at(&key(), VECTOR_TOKEN.as_bytes(), ttl, VECTOR_TIMESTAMP - 61);
        assert_eq!(result, Err(TokenError::FromTheFuture));
    }

    #[test]
    fn ttl_is_ignored_when_unset() {
        let result = decrypt_at(&key(), VECTOR_TOKEN.as_bytes(), None, u64::MAX);
        assert_eq!(result.unwrap(), b"hello");
    }

    #[test]
    fn unknown_version_byte_is_rejected() {
        let mut raw = URL_SAFE.decode(VECTOR_TOKEN).unwrap();
        raw[0] = 0x81;
        let token = URL_SAFE.encode(raw);
        assert_eq!(
            decrypt(&key(), token.as_bytes(), None),
            Err(TokenError::UnsupportedVersion(0x81))
        );
    }

    #[test]
    fn non_base64_and_short_tokens_are_malformed() {
        assert_eq!(decrypt(&key(), b"not base64!!", None), Err(TokenError::Malformed));
        assert_eq!(decrypt(&key(), b"", None), Err(TokenError::Malformed));

        let short = URL_SAFE.encode([VERSION; 20]);
        assert_eq!(decrypt(&key(), short.as_bytes(), None), Err(TokenError::Malformed));
    }

    #[test]
    fn timestamp_is_readable_without_key() {
        assert_eq!(timestamp(VECTOR_TOKEN.as_bytes()).unwrap(), VECTOR_TIMESTAMP);
    }

    #[test]
    fn from_encoded_rejects_bad_keys() {
        assert!(TokenKey::from_encoded("too-short").is_err());
        assert!(TokenKey::from_encoded("AAAA").is_err());
        // Standard alphabet characters are not url-safe.
        assert!(TokenKey::from_encoded("cw/0x689RpI+jtRR7oE8h/eQsKImvJapLeSbXpwF4e4=").is_err());
    }
}
