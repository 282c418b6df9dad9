//! Error handling for the bcrypt lifecycle

use thiserror::Error;

/// bcrypt-specific errors
///
/// Messages describe the shape of the problem only; password bytes never
/// appear in an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BcryptError {
    /// Salt text rejected before any derivation was attempted
    #[error("Invalid salt. Salt must be in the form of: $Vers$log2(NumRounds)$saltvalue ({0})")]
    MalformedSalt(String),

    /// Hash text does not satisfy the record grammar
    #[error("Malformed hash: {0}")]
    MalformedHash(String),

    /// Cost could not be extracted from the hash
    #[error("Invalid hash provided: {0}")]
    InvalidHash(String),

    /// Neither the OS generator nor the fallback produced random bytes
    #[error("Insecure randomness: {0}")]
    InsecureRandomness(String),

    /// Wrong buffer size or out-of-range parameter
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The offloaded task could not deliver a result
    #[error("Task failure: {0}")]
    Task(String),

    /// Configuration could not be parsed or is inconsistent
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl BcryptError {
    /// Create an `InvalidArgument` error
    #[must_use]
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a `MalformedHash` error
    #[must_use]
    pub fn malformed_hash(msg: impl Into<String>) -> Self {
        Self::MalformedHash(msg.into())
    }
}

impl From<async_task::TaskError> for BcryptError {
    fn from(error: async_task::TaskError) -> Self {
        Self::Task(error.to_string())
    }
}

/// Result type for bcrypt operations
pub type Result<T> = std::result::Result<T, BcryptError>;
