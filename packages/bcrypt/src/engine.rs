//! Salt generation, digest derivation and verification

use crate::cipher::derive_digest;
use crate::compare::constant_time_eq;
use crate::format::{Cost, HashRecord, Version, DIGEST_LEN, DIGEST_TEXT_LEN, SALT_LEN};
use crate::random::SeedSource;
use crate::{BcryptError, Result};
use bcryypt_common::LoggingTransformer;

/// Render a salt-only record from caller-supplied seed bytes
///
/// Pure: the same inputs always give the same salt text. Randomness is the
/// caller's job (see `SeedSource`), which keeps this reproducible in tests.
///
/// # Errors
///
/// Returns `BcryptError::InvalidArgument` if `seed` is not exactly 16 bytes
/// or `cost` is out of range.
pub fn gen_salt(version: Version, cost: u32, seed: &[u8]) -> Result<String> {
    let cost = Cost::new(cost)?;
    let salt: [u8; SALT_LEN] = seed.try_into().map_err(|_| {
        BcryptError::invalid_argument(format!(
            "seed must be exactly {SALT_LEN} bytes, got {}",
            seed.len()
        ))
    })?;
    Ok(HashRecord::salt_only(version, cost, salt).salt_text())
}

/// Draw a fresh seed from `seeds` and render a salt-only record
///
/// # Errors
///
/// Returns `BcryptError::InsecureRandomness` if no secure seed could be
/// drawn, or `BcryptError::InvalidArgument` for an out-of-range cost.
pub fn gen_salt_random(seeds: &SeedSource, version: Version, cost: u32) -> Result<String> {
    let cost = Cost::new(cost)?;
    let seed = seeds.generate_seed(SALT_LEN)?;
    gen_salt(version, cost.get(), &seed)
}

/// Hash `password` under a salt-only record or an existing hash
///
/// The record is validated before the cipher runs; any digest already present
/// in `salt_or_hash` is ignored. Password bytes are used as-is; only the first
/// 72 contribute.
///
/// # Errors
///
/// Returns `BcryptError::MalformedSalt` if `salt_or_hash` fails validation.
pub fn derive(password: &[u8], salt_or_hash: &str) -> Result<String> {
    let record = parse_salt(salt_or_hash)?;
    Ok(derive_from(password, &record))
}

/// Parse salt text for derivation, reporting failures as `MalformedSalt`
pub(crate) fn parse_salt(salt_or_hash: &str) -> Result<HashRecord> {
    HashRecord::parse(salt_or_hash).map_err(|e| BcryptError::MalformedSalt(e.to_string()))
}

/// Hash `password` under an already validated record
pub(crate) fn derive_from(password: &[u8], record: &HashRecord) -> String {
    derive_record(password, record).to_string()
}

/// Hash `password` under a freshly generated salt
///
/// # Errors
///
/// Returns `BcryptError::InvalidArgument` for an out-of-range cost or
/// `BcryptError::InsecureRandomness` if no secure seed could be drawn.
pub fn hash_with_cost(
    seeds: &SeedSource,
    password: &[u8],
    version: Version,
    cost: u32,
) -> Result<String> {
    let salt = gen_salt_random(seeds, version, cost)?;
    derive(password, &salt)
}

/// Check `password` against a stored hash
///
/// Malformed hashes and salt-only records yield `false`. The derived digest
/// is compared in constant time against the stored digest text as written,
/// so altered trailing bits in its last character do not verify.
#[must_use]
pub fn verify(password: &[u8], hash: &str) -> bool {
    let Ok(stored) = HashRecord::parse(hash) else {
        tracing::debug!(
            hash = %LoggingTransformer::fingerprint(hash.as_bytes()),
            "verification against malformed hash"
        );
        return false;
    };
    verify_parsed(password, &stored, hash)
}

/// Verify against a record already parsed from `hash`
pub(crate) fn verify_parsed(password: &[u8], stored: &HashRecord, hash: &str) -> bool {
    if stored.digest().is_none() {
        tracing::debug!("verification against salt-only record");
        return false;
    }
    let Some(expected) = hash
        .len()
        .checked_sub(DIGEST_TEXT_LEN)
        .and_then(|start| hash.as_bytes().get(start..))
    else {
        return false;
    };

    let derived = derive_record(password, stored);
    let Some(actual) = derived.digest_text() else {
        return false;
    };
    constant_time_eq(actual.as_bytes(), expected)
}

/// Cost factor of a stored hash
///
/// # Errors
///
/// Returns `BcryptError::InvalidHash` if the cost cannot be extracted.
pub fn get_rounds(hash: &str) -> Result<u32> {
    crate::format::parse_cost(hash)
        .map(Cost::get)
        .map_err(|e| BcryptError::InvalidHash(e.to_string()))
}

fn derive_record(password: &[u8], record: &HashRecord) -> HashRecord {
    let raw = derive_digest(password, record.salt(), record.cost(), record.version());
    let mut digest = [0_u8; DIGEST_LEN];
    digest.copy_from_slice(&raw[..DIGEST_LEN]);
    HashRecord::with_digest(record.version(), record.cost(), *record.salt(), digest)
}
