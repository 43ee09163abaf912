//! 12-word mnemonic codec
//!
//! Layout of the 132 encoded bits:
//!
//! ```text
//! | 4 bits: SHA256(entropy)[0] >> 4 | 128 bits: entropy |
//! ```
//!
//! The checksum nibble sits *before* the entropy, unlike BIP-39 which
//! appends it. The bits are cut into twelve 11-bit big-endian chunks, each
//! indexing the English BIP-39 wordlist.
//!
//! Decoding is lenient: the checksum nibble is dropped without being
//! compared. Mnemonics issued by older key generators depend on this, so
//! strict checking lives in the separate [`verify_checksum`].

use std::collections::HashMap;

use bip39::Language;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::bits::{bits_to_bytes, bytes_to_bits};
use super::{CryptoError, CryptoResult};

/// Entropy length in bytes.
pub const ENTROPY_LEN: usize = 16;
/// Words per mnemonic.
pub const WORD_COUNT: usize = 12;

const CHECKSUM_BITS: usize = 4;
const WORD_BITS: usize = 11;

lazy_static::lazy_static! {
    /// Word -> index, built once from the fixed English list.
    static ref WORD_INDEX: HashMap<&'static str, u16> = wordlist()
        .iter()
        .enumerate()
        .map(|(i, word)| (*word, i as u16))
        .collect();
}

/// The fixed 2048-entry wordlist.
pub fn wordlist() -> &'static [&'static str; 2048] {
    Language::English.word_list()
}

/// Index of `word` in the wordlist.
pub fn word_index(word: &str) -> Option<u16> {
    WORD_INDEX.get(word).copied()
}

fn checksum_bits(entropy: &[u8]) -> String {
    let hash = Sha256::digest(entropy);
    bytes_to_bits(&hash[..1])[..CHECKSUM_BITS].to_string()
}

/// Encode 16 bytes of entropy as a 12-word mnemonic.
pub fn encode(entropy: &[u8]) -> CryptoResult<String> {
    if entropy.len() != ENTROPY_LEN {
        return Err(CryptoError::Format(format!(
            "entropy must be {} bytes, got {}",
            ENTROPY_LEN,
            entropy.len()
        )));
    }

    let bits = Zeroizing::new(checksum_bits(entropy) + &bytes_to_bits(entropy));
    let list = wordlist();

    let words = bits
        .as_bytes()
        .chunks(WORD_BITS)
        .map(|chunk| {
            let index = chunk
                .iter()
                .fold(0usize, |acc, bit| (acc << 1) | usize::from(*bit == b'1'));
            list[index]
        })
        .collect::<Vec<_>>();

    Ok(words.join(" "))
}

/// Concatenate the 11-bit index of every word. Fails on the first word
/// missing from the list.
fn mnemonic_to_bits(words: &[&str]) -> CryptoResult<Zeroizing<String>> {
    let mut bits = Zeroizing::new(String::with_capacity(words.len() * WORD_BITS));
    for word in words {
        let index = word_index(word).ok_or_else(|| CryptoError::UnknownWord {
            word: (*word).to_string(),
        })?;
        bits.push_str(&format!("{:011b}", index));
    }
    Ok(bits)
}

fn split_words(mnemonic: &str) -> CryptoResult<Vec<&str>> {
    let words: Vec<&str> = mnemonic.split_whitespace().collect();
    if words.len() != WORD_COUNT {
        return Err(CryptoError::Format(format!(
            "mnemonic must have {} words, got {}",
            WORD_COUNT,
            words.len()
        )));
    }
    Ok(words)
}

/// Decode a 12-word mnemonic back to its 16 entropy bytes.
///
/// The leading checksum nibble is discarded unchecked.
pub fn decode(mnemonic: &str) -> CryptoResult<Zeroizing<Vec<u8>>> {
    let words = split_words(mnemonic)?;
    let bits = mnemonic_to_bits(&words)?;
    Ok(Zeroizing::new(bits_to_bytes(&bits[CHECKSUM_BITS..])?))
}

/// Whether the checksum nibble of `mnemonic` matches its entropy.
pub fn verify_checksum(mnemonic: &str) -> CryptoResult<bool> {
    let words = split_words(mnemonic)?;
    let bits = mnemonic_to_bits(&words)?;
    let entropy = Zeroizing::new(bits_to_bytes(&bits[CHECKSUM_BITS..])?);
    Ok(bits[..CHECKSUM_BITS] == checksum_bits(&entropy))
}

/// Fresh mnemonic from 128 bits of OS randomness.
pub fn generate() -> CryptoResult<String> {
    let mut entropy = Zeroizing::new([0u8; ENTROPY_LEN]);
    OsRng.fill_bytes(entropy.as_mut());
    encode(entropy.as_ref())
}
