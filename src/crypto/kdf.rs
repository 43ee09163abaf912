//! Private key derivation and secp256k1 key pairs
//!
//! A 12-word mnemonic becomes a key pair in three steps:
//! decode to 16 bytes of entropy, stretch those bytes with PBKDF2 using the
//! entropy as both password and salt, and use the 32-byte result as the
//! secp256k1 scalar.
//!
//! SECURITY: derived key bytes are wrapped in `Zeroizing` and the secret
//! scalar of a [`KeyPair`] is erased on drop.

use std::fmt;
use std::str::FromStr;

use bitcoin::secp256k1::{PublicKey, Secp256k1, SecretKey};
use bitcoin::{Network, PrivateKey};
use hmac::Hmac;
use sha2::{Sha256, Sha512};
use zeroize::Zeroizing;

use super::mnemonic::{self, WORD_COUNT};
use super::{CryptoError, CryptoResult};

/// PRF digest for PBKDF2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Digest {
    Sha256,
    Sha512,
}

impl FromStr for Digest {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" => Ok(Digest::Sha256),
            "sha512" => Ok(Digest::Sha512),
            other => Err(CryptoError::Kdf(format!("unsupported digest '{}'", other))),
        }
    }
}

/// PBKDF2 parameters. The defaults are the ones used for mnemonic keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    pub iterations: u32,
    pub keylen: usize,
    pub digest: Digest,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            iterations: 512,
            keylen: 32,
            digest: Digest::Sha256,
        }
    }
}

/// Stretch `password` with PBKDF2-HMAC.
pub fn derive_private_key(
    password: &[u8],
    salt: &[u8],
    params: &KdfParams,
) -> CryptoResult<Zeroizing<Vec<u8>>> {
    if params.iterations == 0 {
        return Err(CryptoError::Kdf("iteration count must be positive".into()));
    }
    if params.keylen == 0 {
        return Err(CryptoError::Kdf("key length must be positive".into()));
    }

    let mut key = Zeroizing::new(vec![0u8; params.keylen]);
    let result = match params.digest {
        Digest::Sha256 => {
            pbkdf2::pbkdf2::<Hmac<Sha256>>(password, salt, params.iterations, &mut key)
        }
        Digest::Sha512 => {
            pbkdf2::pbkdf2::<Hmac<Sha512>>(password, salt, params.iterations, &mut key)
        }
    };
    result.map_err(|e| CryptoError::Kdf(e.to_string()))?;
    Ok(key)
}

/// Uncompressed SEC1 public key (65 bytes, hex) for a private scalar.
pub fn public_key_from_private(private_key: &[u8]) -> CryptoResult<String> {
    let secp = Secp256k1::new();
    let secret = SecretKey::from_slice(private_key)
        .map_err(|e| CryptoError::Kdf(format!("invalid private scalar: {}", e)))?;
    let public = PublicKey::from_secret_key(&secp, &secret);
    Ok(hex::encode(public.serialize_uncompressed()))
}

/// A secp256k1 key pair tagged with the network it was derived for.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPair {
    secret_key: SecretKey,
    public_key: PublicKey,
    network: Network,
}

impl KeyPair {
    pub fn from_private_key(private_key: &[u8], network: Network) -> CryptoResult<Self> {
        let secp = Secp256k1::new();
        let secret_key = SecretKey::from_slice(private_key)
            .map_err(|e| CryptoError::Kdf(format!("invalid private scalar: {}", e)))?;
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        Ok(Self {
            secret_key,
            public_key,
            network,
        })
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn public_key(&self) -> PublicKey {
        self.public_key
    }

    /// Compressed public key, hex.
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key.serialize())
    }

    /// Uncompressed public key, hex.
    pub fn public_key_uncompressed_hex(&self) -> String {
        hex::encode(self.public_key.serialize_uncompressed())
    }

    pub fn private_key_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.secret_key.secret_bytes()))
    }

    /// Compressed WIF for the key pair's network.
    pub fn to_wif(&self) -> Zeroizing<String> {
        Zeroizing::new(PrivateKey::new(self.secret_key, self.network).to_wif())
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key_hex())
            .field("network", &self.network)
            .finish_non_exhaustive()
    }
}

impl Drop for KeyPair {
    fn drop(&mut self) {
        self.secret_key.non_secure_erase();
    }
}

/// Key pair from a raw hex private key.
pub fn private_key_to_key_pair(private_key_hex: &str, network: Network) -> CryptoResult<KeyPair> {
    let bytes = Zeroizing::new(
        hex::decode(private_key_hex.trim())
            .map_err(|e| CryptoError::Format(format!("private key is not hex: {}", e)))?,
    );
    KeyPair::from_private_key(&bytes, network)
}

/// Key pair for a 12-word mnemonic.
pub fn mnemonic_to_key_pair(mnemonic: &str, network: Network) -> CryptoResult<KeyPair> {
    let got = mnemonic.split_whitespace().count();
    if got != WORD_COUNT {
        return Err(CryptoError::WordCount {
            got,
            want: WORD_COUNT,
        });
    }

    let entropy = mnemonic::decode(mnemonic)?;
    let private_key = derive_private_key(&entropy, &entropy, &KdfParams::default())?;
    KeyPair::from_private_key(&private_key, network)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZERO_MNEMONIC: &str =
        "copy abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon";

    #[test]
    fn test_derive_private_key_defaults() {
        let key = derive_private_key(b"password", b"salt", &KdfParams::default()).unwrap();
        assert_eq!(key.len(), 32);

        let again = derive_private_key(b"password", b"salt", &KdfParams::default()).unwrap();
        assert_eq!(key, again);

        let other_salt = derive_private_key(b"password", b"pepper", &KdfParams::default()).unwrap();
        assert_ne!(key, other_salt);
    }

    #[test]
    fn test_pbkdf2_sha256_vector() {
        // RFC 7914 section 11, first 32 bytes.
        let params = KdfParams {
            iterations: 1,
            keylen: 32,
            digest: Digest::Sha256,
        };
        let key = derive_private_key(b"passwd", b"salt", &params).unwrap();
        assert_eq!(
            hex::encode(key.as_slice()),
            "55ac046e56e3089fec1691c22544b605f94185216dde0465e68b9d57c20dacbc"
        );
    }

    #[test]
    fn test_invalid_kdf_params() {
        let zero_rounds = KdfParams {
            iterations: 0,
            ..KdfParams::default()
        };
        assert!(matches!(
            derive_private_key(b"p", b"s", &zero_rounds),
            Err(CryptoError::Kdf(_))
        ));

        let zero_len = KdfParams {
            keylen: 0,
            ..KdfParams::default()
        };
        assert!(matches!(
            derive_private_key(b"p", b"s", &zero_len),
            Err(CryptoError::Kdf(_))
        ));

        assert!(matches!("md5".parse::<Digest>(), Err(CryptoError::Kdf(_))));
        assert_eq!("SHA512".parse::<Digest>().unwrap(), Digest::Sha512);
    }

    #[test]
    fn test_public_key_from_private() {
        // Scalar 1 maps to the generator point.
        let mut one = [0u8; 32];
        one[31] = 1;
        assert_eq!(
            public_key_from_private(&one).unwrap(),
            "0479be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798\
             483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8"
        );
        assert!(public_key_from_private(&[0u8; 32]).is_err());
    }

    #[test]
    fn test_mnemonic_to_key_pair_deterministic() {
        let first = mnemonic_to_key_pair(ZERO_MNEMONIC, Network::Bitcoin).unwrap();
        let second = mnemonic_to_key_pair(ZERO_MNEMONIC, Network::Bitcoin).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.public_key_hex().len(), 66);
        assert_eq!(first.public_key_uncompressed_hex().len(), 130);
    }

    #[test]
    fn test_mnemonic_key_uses_entropy_as_password_and_salt() {
        let pair = mnemonic_to_key_pair(ZERO_MNEMONIC, Network::Bitcoin).unwrap();
        let expected = derive_private_key(&[0u8; 16], &[0u8; 16], &KdfParams::default()).unwrap();
        assert_eq!(pair.private_key_hex().as_str(), hex::encode(expected.as_slice()));
    }

    #[test]
    fn test_word_count_boundaries() {
        let eleven = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon";
        let thirteen = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon";

        assert_eq!(
            mnemonic_to_key_pair(eleven, Network::Bitcoin),
            Err(CryptoError::WordCount { got: 11, want: 12 })
        );
        assert_eq!(
            mnemonic_to_key_pair(thirteen, Network::Bitcoin),
            Err(CryptoError::WordCount { got: 13, want: 12 })
        );
    }

    #[test]
    fn test_network_tagging() {
        let mainnet = mnemonic_to_key_pair(ZERO_MNEMONIC, Network::Bitcoin).unwrap();
        let testnet = mnemonic_to_key_pair(ZERO_MNEMONIC, Network::Testnet).unwrap();
        assert_eq!(mainnet.public_key(), testnet.public_key());
        assert!(mainnet.to_wif().starts_with('K') || mainnet.to_wif().starts_with('L'));
        assert!(testnet.to_wif().starts_with('c'));
    }

    #[test]
    fn test_private_key_hex_roundtrip() {
        let pair = mnemonic_to_key_pair(ZERO_MNEMONIC, Network::Bitcoin).unwrap();
        let again = private_key_to_key_pair(&pair.private_key_hex(), Network::Bitcoin).unwrap();
        assert_eq!(pair, again);
        assert!(private_key_to_key_pair("zz", Network::Bitcoin).is_err());
    }
}
