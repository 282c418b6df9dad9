//! bcrypt version tags

use crate::{BcryptError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hashing variant identified by the tag between the first two `$`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Version {
    /// Original OpenBSD format, key used without its NUL terminator
    #[serde(rename = "2")]
    V2,
    /// NUL-terminated key
    #[serde(rename = "2a")]
    V2a,
    /// Current OpenBSD format with the 72-byte key cap
    #[default]
    #[serde(rename = "2b")]
    V2b,
    /// crypt_blowfish compatibility mode reproducing its sign-extension bug
    #[serde(rename = "2x")]
    V2x,
    /// crypt_blowfish's name for the corrected algorithm; identical to `2b`
    #[serde(rename = "2y")]
    V2y,
}

impl Version {
    /// All supported versions
    pub const ALL: [Self; 5] = [Self::V2, Self::V2a, Self::V2b, Self::V2x, Self::V2y];

    /// Textual tag, e.g. `"2b"`
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::V2 => "2",
            Self::V2a => "2a",
            Self::V2b => "2b",
            Self::V2x => "2x",
            Self::V2y => "2y",
        }
    }

    /// Minor letter following the major `2`, if any
    #[must_use]
    pub fn minor(self) -> Option<u8> {
        match self {
            Self::V2 => None,
            Self::V2a => Some(b'a'),
            Self::V2b => Some(b'b'),
            Self::V2x => Some(b'x'),
            Self::V2y => Some(b'y'),
        }
    }

    /// Version for a minor letter, `None` meaning the bare `2`
    #[must_use]
    pub fn from_minor(minor: Option<u8>) -> Option<Self> {
        match minor {
            None => Some(Self::V2),
            Some(b'a') => Some(Self::V2a),
            Some(b'b') => Some(Self::V2b),
            Some(b'x') => Some(Self::V2x),
            Some(b'y') => Some(Self::V2y),
            Some(_) => None,
        }
    }

    /// Whether the key is NUL terminated before expansion
    #[must_use]
    pub fn terminates_key(self) -> bool {
        self != Self::V2
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Version {
    type Err = BcryptError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|v| v.tag() == s)
            .ok_or_else(|| BcryptError::invalid_argument(format!("unknown bcrypt version {s:?}")))
    }
}
