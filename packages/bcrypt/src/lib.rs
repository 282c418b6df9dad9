//! bcrypt password hashing with sync and worker-pool execution
//!
//! Salts and hashes use the modular crypt layout `$2b$10$<salt><digest>`.
//! Every operation has a blocking `_sync` form and an `_async` form that runs
//! on a bounded worker pool and resolves through an [`AsyncBcryptResult`].
//!
//! ```no_run
//! # async fn demo() -> bcryypt::Result<()> {
//! let hash = bcryypt::Bcrypt::hasher().with_cost(12).hash("hunter2").await?;
//! assert!(bcryypt::compare_async("hunter2", hash).await?);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod api;
pub mod async_result;
mod cipher;
pub mod compare;
pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod random;
pub mod scheduler;

use once_cell::sync::OnceCell;

// Re-export error types
pub use error::{BcryptError, Result};

pub use api::{BcryptBuilder, BcryptBuilderWithHandler};
pub use async_result::{AsyncBcryptResult, AsyncBcryptResultWithHandler};
pub use cipher::MAX_KEY_LEN;
pub use compare::constant_time_eq;
pub use config::BcryptConfig;
pub use format::{encode, parse_cost, validate, Cost, HashRecord, Version};
pub use random::{EntropySource, SeedSource};
pub use scheduler::HashScheduler;

// Re-export common handlers from bcryypt_common
pub use bcryypt_common::{on_error, on_result};

static SCHEDULER: OnceCell<HashScheduler> = OnceCell::new();

/// Install the process-wide scheduler
///
/// The first successful call wins. Later calls, and the implicit default
/// installed by any free function that runs first, leave the scheduler
/// untouched and return `Ok(false)`.
///
/// # Errors
///
/// Returns `BcryptError::Configuration` if `config` fails validation.
pub fn init(config: BcryptConfig) -> Result<bool> {
    config.validate()?;
    let mut installed = false;
    SCHEDULER.get_or_init(|| {
        installed = true;
        tracing::info!(
            default_cost = config.default_cost,
            default_version = %config.default_version,
            worker_threads = config.worker_threads,
            "bcrypt scheduler installed"
        );
        HashScheduler::new(config)
    });
    if !installed {
        tracing::debug!("bcrypt scheduler already installed; init ignored");
    }
    Ok(installed)
}

/// The process-wide scheduler, installed with defaults on first use
pub fn scheduler() -> &'static HashScheduler {
    SCHEDULER.get_or_init(HashScheduler::default)
}

/// Main entry point
pub struct Bcrypt;

impl Bcrypt {
    /// Builder over the process-wide scheduler
    #[must_use]
    pub fn hasher() -> BcryptBuilder {
        BcryptBuilder::new()
    }
}

/// Salt from 16 caller-supplied seed bytes, on this thread
///
/// # Errors
///
/// `BcryptError::InvalidArgument` for a seed that is not 16 bytes or a cost
/// outside `4..=31`.
pub fn gen_salt_sync(version: Version, cost: u32, seed: &[u8]) -> Result<String> {
    scheduler().gen_salt_sync(version, cost, seed)
}

/// Salt from 16 caller-supplied seed bytes, on the worker pool
pub fn gen_salt_async(
    version: Version,
    cost: u32,
    seed: impl Into<Vec<u8>>,
) -> AsyncBcryptResult<String> {
    scheduler().gen_salt_async(version, cost, seed)
}

/// Salt from a fresh OS seed, on this thread
///
/// # Errors
///
/// `BcryptError::InsecureRandomness` if no secure seed is available, or
/// `BcryptError::InvalidArgument` for an out-of-range cost.
pub fn gen_salt(version: Version, cost: u32) -> Result<String> {
    scheduler().gen_salt_random_sync(version, cost)
}

/// Hash `password` under a salt or an existing hash, on this thread
///
/// # Errors
///
/// `BcryptError::MalformedSalt` if `salt_or_hash` is not a valid salt or hash.
pub fn hash_sync(password: impl AsRef<[u8]>, salt_or_hash: &str) -> Result<String> {
    scheduler().hash_sync(password.as_ref(), salt_or_hash)
}

/// Hash `password` under a salt or an existing hash, on the worker pool
pub fn hash_async(
    password: impl Into<Vec<u8>>,
    salt_or_hash: impl Into<String>,
) -> AsyncBcryptResult<String> {
    scheduler().hash_async(password, salt_or_hash)
}

/// Hash `password` under a fresh salt of the default version, on this thread
///
/// # Errors
///
/// `BcryptError::InvalidArgument` for an out-of-range cost or
/// `BcryptError::InsecureRandomness` if no secure seed is available.
pub fn hash_with_cost(password: impl AsRef<[u8]>, cost: u32) -> Result<String> {
    scheduler().hash_with_cost_sync(password.as_ref(), cost)
}

/// Check `password` against `hash` on this thread
///
/// Malformed hashes give `false`.
#[must_use]
pub fn compare_sync(password: impl AsRef<[u8]>, hash: &str) -> bool {
    scheduler().compare_sync(password.as_ref(), hash)
}

/// Check `password` against `hash` on the worker pool
pub fn compare_async(
    password: impl Into<Vec<u8>>,
    hash: impl Into<String>,
) -> AsyncBcryptResult<bool> {
    scheduler().compare_async(password, hash)
}

/// Cost factor recorded in a salt or hash
///
/// # Errors
///
/// `BcryptError::InvalidHash` if no cost can be read from `hash`.
pub fn get_rounds(hash: &str) -> Result<u32> {
    scheduler().get_rounds(hash)
}
