//! The canonical textual hash record

use super::cost::Cost;
use super::radix64;
use super::version::Version;
use crate::{BcryptError, Result};
use std::fmt;
use std::str::FromStr;

/// Raw salt length in bytes
pub const SALT_LEN: usize = 16;
/// Digest bytes kept in the textual record (the cipher yields 24, the last is dropped)
pub const DIGEST_LEN: usize = 23;
/// Encoded salt length in characters
pub const SALT_TEXT_LEN: usize = radix64::encoded_len(SALT_LEN);
/// Encoded digest length in characters
pub const DIGEST_TEXT_LEN: usize = radix64::encoded_len(DIGEST_LEN);

/// A parsed `$<version>$<cost>$<salt>[<digest>]` record
///
/// Salt-only records (what salt generation produces) carry no digest.
/// Records are immutable; `Display` renders the canonical text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HashRecord {
    version: Version,
    cost: Cost,
    salt: [u8; SALT_LEN],
    digest: Option<[u8; DIGEST_LEN]>,
}

impl HashRecord {
    /// Build a salt-only record
    #[must_use]
    pub fn salt_only(version: Version, cost: Cost, salt: [u8; SALT_LEN]) -> Self {
        Self {
            version,
            cost,
            salt,
            digest: None,
        }
    }

    /// Build a complete record
    #[must_use]
    pub fn with_digest(
        version: Version,
        cost: Cost,
        salt: [u8; SALT_LEN],
        digest: [u8; DIGEST_LEN],
    ) -> Self {
        Self {
            version,
            cost,
            salt,
            digest: Some(digest),
        }
    }

    /// Parse a record under the strict grammar
    ///
    /// # Errors
    ///
    /// Returns `BcryptError::MalformedHash` naming the first part of `text`
    /// that breaks the grammar.
    pub fn parse(text: &str) -> Result<Self> {
        let bytes = text.as_bytes();

        let Some(rest) = bytes.strip_prefix(b"$") else {
            return Err(BcryptError::malformed_hash("missing leading '$'"));
        };

        let (version, rest) = match rest {
            [b'2', b'$', rest @ ..] => (Version::V2, rest),
            [b'2', minor, b'$', rest @ ..] => {
                let version = Version::from_minor(Some(*minor))
                    .ok_or_else(|| BcryptError::malformed_hash("unrecognized version tag"))?;
                (version, rest)
            }
            _ => return Err(BcryptError::malformed_hash("unrecognized version tag")),
        };

        let (cost, rest) = match rest {
            [tens @ b'0'..=b'9', ones @ b'0'..=b'9', b'$', rest @ ..] => {
                (u32::from(*tens - b'0') * 10 + u32::from(*ones - b'0'), rest)
            }
            _ => return Err(BcryptError::malformed_hash("cost must be two digits followed by '$'")),
        };
        let cost = Cost::new(cost).map_err(|e| BcryptError::MalformedHash(e.to_string()))?;

        let (salt_text, digest_text) = match rest.len() {
            SALT_TEXT_LEN => (rest, None),
            n if n == SALT_TEXT_LEN + DIGEST_TEXT_LEN => {
                let (salt, digest) = rest.split_at(SALT_TEXT_LEN);
                (salt, Some(digest))
            }
            n => {
                return Err(BcryptError::MalformedHash(format!(
                    "salt segment has {n} characters, expected {SALT_TEXT_LEN} or {}",
                    SALT_TEXT_LEN + DIGEST_TEXT_LEN
                )))
            }
        };

        let salt = radix64::decode_exact::<SALT_LEN>(salt_text)
            .ok_or_else(|| BcryptError::malformed_hash("salt is not valid radix-64"))?;
        let digest = digest_text
            .map(|d| {
                radix64::decode_exact::<DIGEST_LEN>(d)
                    .ok_or_else(|| BcryptError::malformed_hash("digest is not valid radix-64"))
            })
            .transpose()?;

        Ok(Self {
            version,
            cost,
            salt,
            digest,
        })
    }

    /// Hashing variant
    #[must_use]
    pub fn version(&self) -> Version {
        self.version
    }

    /// Cost factor
    #[must_use]
    pub fn cost(&self) -> Cost {
        self.cost
    }

    /// Raw salt bytes
    #[must_use]
    pub fn salt(&self) -> &[u8; SALT_LEN] {
        &self.salt
    }

    /// Raw digest bytes, absent on salt-only records
    #[must_use]
    pub fn digest(&self) -> Option<&[u8; DIGEST_LEN]> {
        self.digest.as_ref()
    }

    /// The `$<version>$<cost>$<salt>` prefix
    #[must_use]
    pub fn salt_text(&self) -> String {
        format!(
            "${}${}${}",
            self.version,
            self.cost,
            radix64::encode(&self.salt)
        )
    }

    /// The 31-character digest segment, absent on salt-only records
    #[must_use]
    pub fn digest_text(&self) -> Option<String> {
        self.digest.as_ref().map(|d| radix64::encode(d))
    }

    /// Length of the canonical text for this record's version and shape
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        let header = 1 + self.version.tag().len() + 1 + 2 + 1;
        let digest = if self.digest.is_some() {
            DIGEST_TEXT_LEN
        } else {
            0
        };
        header + SALT_TEXT_LEN + digest
    }
}

impl fmt::Display for HashRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.salt_text())?;
        if let Some(digest) = self.digest_text() {
            f.write_str(&digest)?;
        }
        Ok(())
    }
}

impl FromStr for HashRecord {
    type Err = BcryptError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
