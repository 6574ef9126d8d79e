//! Cryptographic primitives for SQLSeal.
//!
//! This module provides:
//! - Passphrase-to-key derivation (`kdf`)
//! - Fernet-compatible AES-128-CBC + HMAC-SHA256 tokens (`token`)

pub mod kdf;
pub mod token;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{derive, DerivedKey, ...};
pub use kdf::{derive, DerivedKey, SALT};
pub use token::TokenKey;
