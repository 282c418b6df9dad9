//! Cost factor bounds
//!
//! The bounds are format policy, kept here so they can be tightened without
//! touching the cipher.

use crate::{BcryptError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Smallest encodable cost
pub const MIN_COST: u32 = 4;
/// Largest encodable cost
pub const MAX_COST: u32 = 31;
/// Cost used when the caller does not choose one
pub const DEFAULT_COST: u32 = 10;
/// Floor on `2^cost`, enforced independently of the numeric range
pub const MIN_ROUNDS: u64 = 16;

/// Validated log2 of the key-schedule iteration count
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Cost(u32);

impl Cost {
    /// Validate a cost factor
    ///
    /// # Errors
    ///
    /// Returns `BcryptError::InvalidArgument` if `cost` lies outside
    /// `MIN_COST..=MAX_COST` or `2^cost` is below `MIN_ROUNDS`.
    pub fn new(cost: u32) -> Result<Self> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(BcryptError::invalid_argument(format!(
                "cost {cost} outside {MIN_COST}..={MAX_COST}"
            )));
        }
        if (1_u64 << cost) < MIN_ROUNDS {
            return Err(BcryptError::invalid_argument(format!(
                "cost {cost} yields fewer than {MIN_ROUNDS} rounds"
            )));
        }
        Ok(Self(cost))
    }

    /// Clamp any integer into the valid range
    #[must_use]
    pub fn saturating(cost: u32) -> Self {
        Self(cost.clamp(MIN_COST, MAX_COST))
    }

    /// The cost factor
    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }

    /// Number of key-schedule iterations, `2^cost`
    #[must_use]
    pub fn rounds(self) -> u64 {
        1_u64 << self.0
    }
}

impl Default for Cost {
    fn default() -> Self {
        Self(DEFAULT_COST)
    }
}

impl TryFrom<u32> for Cost {
    type Error = BcryptError;

    fn try_from(cost: u32) -> Result<Self> {
        Self::new(cost)
    }
}

impl From<Cost> for u32 {
    fn from(cost: Cost) -> Self {
        cost.0
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}
