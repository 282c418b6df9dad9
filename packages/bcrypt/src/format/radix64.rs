//! bcrypt's radix-64 encoding
//!
//! Same bit grouping as base64 but with the alphabet
//! `./ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789` and no
//! padding. Interoperability depends on this table byte for byte.

use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};

/// The bcrypt alphabet in index order
pub const ALPHABET: &[u8; 64] = b"./ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

// Trailing bits are tolerated: 22 characters carry 132 bits for a 128-bit salt.
const BCRYPT_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::BCRYPT,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::RequireNone)
        .with_decode_allow_trailing_bits(true),
);

/// Number of characters needed for `len` bytes
#[must_use]
pub const fn encoded_len(len: usize) -> usize {
    (len * 8).div_ceil(6)
}

/// Whether `byte` belongs to the bcrypt alphabet
#[must_use]
pub fn is_radix64_char(byte: u8) -> bool {
    matches!(byte, b'.' | b'/' | b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9')
}

/// Encode bytes without padding
#[must_use]
pub fn encode(bytes: &[u8]) -> String {
    BCRYPT_ENGINE.encode(bytes)
}

/// Decode exactly `N` bytes from `text`
///
/// Returns `None` if `text` has the wrong length for `N` bytes or contains a
/// character outside the alphabet.
#[must_use]
pub fn decode_exact<const N: usize>(text: &[u8]) -> Option<[u8; N]> {
    if text.len() != encoded_len(N) || !text.iter().copied().all(is_radix64_char) {
        return None;
    }
    let decoded = BCRYPT_ENGINE.decode(text).ok()?;
    decoded.try_into().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabet_order() {
        // 000000 000001 000010 000011 selects the first four symbols
        assert_eq!(encode(&[0x00, 0x10, 0x83]), "./AB");
        // 111111 repeated selects the last symbol
        assert_eq!(encode(&[0xff, 0xff, 0xff]), "9999");
        for (index, &symbol) in ALPHABET.iter().enumerate() {
            assert!(is_radix64_char(symbol), "symbol {index} rejected");
        }
    }

    #[test]
    fn test_lengths() {
        assert_eq!(encoded_len(16), 22);
        assert_eq!(encoded_len(23), 31);
        assert_eq!(encode(&[0u8; 16]), "......................");
        assert_eq!(encode(&[0u8; 23]).len(), 31);
    }

    #[test]
    fn test_trailing_bits_are_ignored() {
        let canonical = decode_exact::<16>(b"CCCCCCCCCCCCCCCCCCCCC.");
        let noisy = decode_exact::<16>(b"CCCCCCCCCCCCCCCCCCCCCA");
        assert!(canonical.is_some());
        assert_eq!(canonical, noisy);
    }

    #[test]
    fn test_rejects_foreign_characters() {
        assert!(decode_exact::<16>(b"CCCCCCCCCCCCCCCCCCCCC+").is_none());
        assert!(decode_exact::<16>(b"CCCCCCCCCCCCCCCCCCCCC=").is_none());
        assert!(decode_exact::<16>(b"CCCCCCCCCCCCCCCCCCCCC").is_none());
    }
}
