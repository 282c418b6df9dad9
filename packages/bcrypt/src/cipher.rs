//! The EksBlowfish digest primitive
//!
//! Key setup and the 64-fold encryption of "OrpheanBeholderScryDoubt" come
//! from the `blowfish` crate. This module only shapes the key bytes for each
//! version and owns the iteration loop.

use crate::format::{Cost, Version, SALT_LEN};
use blowfish::Blowfish;
use zeroize::Zeroizing;

/// Raw digest length produced by the cipher
pub(crate) const RAW_DIGEST_LEN: usize = 24;

/// Effective key length; Blowfish's P-array consumes 18 words
pub const MAX_KEY_LEN: usize = 72;

// "OrpheanBeholderScryDoubt" as big-endian words
#[allow(clippy::unreadable_literal)]
const MAGIC: [u32; 6] = [
    0x4f727068, 0x65616e42, 0x65686f6c, 0x64657253, 0x63727944, 0x6f756274,
];

/// Compute the 24-byte digest for `password` under `salt`, `cost` and `version`
///
/// Inputs must already be validated; every argument here is in range by type.
pub(crate) fn derive_digest(
    password: &[u8],
    salt: &[u8; SALT_LEN],
    cost: Cost,
    version: Version,
) -> Zeroizing<[u8; RAW_DIGEST_LEN]> {
    let key = key_stream(password, version);

    let mut state = Blowfish::bc_init_state();
    state.salted_expand_key(salt, &key[..]);
    for _ in 0..cost.rounds() {
        state.bc_expand_key(&key[..]);
        state.bc_expand_key(salt);
    }

    let mut ctext = MAGIC;
    let mut output = Zeroizing::new([0_u8; RAW_DIGEST_LEN]);
    for (i, pair) in ctext.chunks_exact_mut(2).enumerate() {
        for _ in 0..64 {
            let [l, r] = state.bc_encrypt([pair[0], pair[1]]);
            pair[0] = l;
            pair[1] = r;
        }
        output[i * 8..i * 8 + 4].copy_from_slice(&pair[0].to_be_bytes());
        output[i * 8 + 4..i * 8 + 8].copy_from_slice(&pair[1].to_be_bytes());
    }
    output
}

/// The exact 72 bytes the key schedule reads from the key
///
/// Blowfish reads the key cyclically over its declared length, so the stream
/// is `key[i % key_len]`. Passing the 72-byte stream instead of the short key
/// is equivalent and lets the `2x` quirk be expressed on whole words.
///
/// `2` and `2a` keep the declared length (password plus terminator) in a
/// single byte, so keys of 255 bytes and more wrap around. A declared length
/// of zero still reads the first byte. The later versions cap the password
/// at 72 bytes before adding the terminator.
fn key_stream(password: &[u8], version: Version) -> Zeroizing<[u8; MAX_KEY_LEN]> {
    let terminator = usize::from(version.terminates_key());
    let key_len = match version {
        Version::V2 | Version::V2a => (password.len() + terminator) % 256,
        Version::V2b | Version::V2x | Version::V2y => {
            password.len().min(MAX_KEY_LEN) + terminator
        }
    };
    if password.len() > MAX_KEY_LEN {
        tracing::debug!("password exceeds {MAX_KEY_LEN} bytes; extra bytes do not contribute");
    }

    // bytes past the password are the NUL terminator
    let window = key_len.clamp(1, MAX_KEY_LEN);
    let mut stream = Zeroizing::new([0_u8; MAX_KEY_LEN]);
    for (i, byte) in stream.iter_mut().enumerate() {
        *byte = password.get(i % window).copied().unwrap_or(0);
    }

    if version == Version::V2x {
        sign_extend_words(&mut stream);
    }
    stream
}

/// Rebuild each key word the way crypt_blowfish did before its 2011 fix:
/// bytes were OR-ed in as sign-extended `char`s, so a high byte smears ones
/// over the bytes already accumulated.
fn sign_extend_words(stream: &mut [u8; MAX_KEY_LEN]) {
    for chunk in stream.chunks_exact_mut(4) {
        let mut word: u32 = 0;
        for &byte in chunk.iter() {
            word = (word << 8) | i32::from(byte as i8) as u32;
        }
        chunk.copy_from_slice(&word.to_be_bytes());
    }
}
