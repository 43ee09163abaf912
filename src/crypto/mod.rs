//! Key-material primitives
//!
//! This module provides the derivation core used by every wallet type:
//! - Bit/byte string codec
//! - 12-word mnemonic codec with a leading 4-bit SHA-256 checksum
//! - Vault seed detection (HMAC-SHA512 prefix fingerprint)
//! - PBKDF2 private keys and secp256k1 key pairs
//!
//! Everything here is synchronous and pure.

pub mod bits;
pub mod kdf;
pub mod mnemonic;
pub mod vault_seed;

pub use bits::{bits_to_bytes, bytes_to_bits};
pub use kdf::{
    derive_private_key, mnemonic_to_key_pair, private_key_to_key_pair, public_key_from_private,
    Digest, KdfParams, KeyPair,
};
pub use mnemonic::{decode, encode, generate, verify_checksum, ENTROPY_LEN, WORD_COUNT};
pub use vault_seed::{is_vault_mnemonic, vault_seed_kind, VaultSeedKind, VAULT_SEED_KEY};

use thiserror::Error;

/// Errors raised by the derivation primitives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Bit string length {len} is not a multiple of 8")]
    Length { len: usize },

    #[error("No wordlist index for word \"{word}\"")]
    UnknownWord { word: String },

    #[error("Invalid format: {0}")]
    Format(String),

    #[error("Invalid mnemonic: received {got} words, expected {want}")]
    WordCount { got: usize, want: usize },

    #[error("Key derivation failed: {0}")]
    Kdf(String),
}

pub type CryptoResult<T> = Result<T, CryptoError>;
