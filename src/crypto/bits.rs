//! Bit string codec
//!
//! Bit strings are `'0'`/`'1'` characters, most significant bit first,
//! eight characters per byte.

use super::{CryptoError, CryptoResult};

/// Render bytes as a bit string.
pub fn bytes_to_bits(bytes: &[u8]) -> String {
    let mut bits = String::with_capacity(bytes.len() * 8);
    for byte in bytes {
        bits.push_str(&format!("{:08b}", byte));
    }
    bits
}

/// Parse a bit string back into bytes.
pub fn bits_to_bytes(bits: &str) -> CryptoResult<Vec<u8>> {
    if bits.len() % 8 != 0 {
        return Err(CryptoError::Length { len: bits.len() });
    }

    bits.as_bytes()
        .chunks(8)
        .map(|chunk| {
            chunk.iter().try_fold(0u8, |acc, bit| match bit {
                b'0' => Ok(acc << 1),
                b'1' => Ok((acc << 1) | 1),
                other => Err(CryptoError::Format(format!(
                    "unexpected character '{}' in bit string",
                    *other as char
                ))),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_to_bits_msb_first() {
        assert_eq!(bytes_to_bits(&[0x80]), "10000000");
        assert_eq!(bytes_to_bits(&[0x01, 0xff]), "0000000111111111");
        assert_eq!(bytes_to_bits(&[]), "");
    }

    #[test]
    fn test_bits_to_bytes() {
        assert_eq!(bits_to_bytes("0000000111111111").unwrap(), vec![0x01, 0xff]);
        assert_eq!(bits_to_bytes("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_length_error() {
        assert_eq!(
            bits_to_bytes("1010101"),
            Err(CryptoError::Length { len: 7 })
        );
    }

    #[test]
    fn test_rejects_non_binary_characters() {
        assert!(matches!(bits_to_bytes("00000002"), Err(CryptoError::Format(_))));
    }
}
