//! Sync and offloaded execution of bcrypt operations
//!
//! Every operation exists twice. The `_sync` form runs on the caller's thread
//! and blocks for the full cost of the cipher. The `_async` form moves owned
//! copies of its inputs into a job on the bounded worker pool and returns an
//! `AsyncBcryptResult` that resolves once. Each job owns its password, salt and
//! digest buffers; nothing mutable is shared between jobs.

use crate::async_result::AsyncBcryptResult;
use crate::config::BcryptConfig;
use crate::engine;
use crate::format::{HashRecord, Version};
use crate::random::SeedSource;
use crate::Result;
use async_task::{AsyncExecutor, ExecutorMetrics};
use bcryypt_common::LoggingTransformer;
use std::time::Instant;
use zeroize::Zeroizing;

/// Runs bcrypt operations inline or on the worker pool
#[derive(Debug, Clone)]
pub struct HashScheduler {
    executor: AsyncExecutor,
    seeds: SeedSource,
    config: BcryptConfig,
}

impl Default for HashScheduler {
    fn default() -> Self {
        Self::new(BcryptConfig::default())
    }
}

impl HashScheduler {
    /// Build a scheduler with the OS seed source
    #[must_use]
    pub fn new(config: BcryptConfig) -> Self {
        Self::with_seed_source(config, SeedSource::default())
    }

    /// Build a scheduler with an explicit seed source
    #[must_use]
    pub fn with_seed_source(config: BcryptConfig, seeds: SeedSource) -> Self {
        Self {
            executor: AsyncExecutor::new(config.executor_config()),
            seeds,
            config,
        }
    }

    /// Settings this scheduler was built with
    #[must_use]
    pub fn config(&self) -> &BcryptConfig {
        &self.config
    }

    /// Worker pool counters
    #[must_use]
    pub fn metrics(&self) -> ExecutorMetrics {
        self.executor.metrics()
    }

    /// Salt from caller-supplied seed bytes, on this thread
    ///
    /// # Errors
    ///
    /// `BcryptError::InvalidArgument` for a seed that is not 16 bytes or an
    /// out-of-range cost.
    pub fn gen_salt_sync(&self, version: Version, cost: u32, seed: &[u8]) -> Result<String> {
        engine::gen_salt(version, cost, seed)
    }

    /// Salt from caller-supplied seed bytes, on the worker pool
    pub fn gen_salt_async(
        &self,
        version: Version,
        cost: u32,
        seed: impl Into<Vec<u8>>,
    ) -> AsyncBcryptResult<String> {
        let seed = Zeroizing::new(seed.into());
        self.offload("gen_salt", cost, move || engine::gen_salt(version, cost, &seed))
    }

    /// Salt from a freshly drawn OS seed, on this thread
    ///
    /// # Errors
    ///
    /// `BcryptError::InsecureRandomness` if no secure seed is available, or
    /// `BcryptError::InvalidArgument` for an out-of-range cost.
    pub fn gen_salt_random_sync(&self, version: Version, cost: u32) -> Result<String> {
        engine::gen_salt_random(&self.seeds, version, cost)
    }

    /// Salt from a freshly drawn OS seed, on the worker pool
    ///
    /// The seed is drawn inside the job, on the worker thread.
    pub fn gen_salt_random_async(&self, version: Version, cost: u32) -> AsyncBcryptResult<String> {
        let seeds = self.seeds.clone();
        self.offload("gen_salt", cost, move || {
            engine::gen_salt_random(&seeds, version, cost)
        })
    }

    /// Hash under a salt or existing hash, on this thread
    ///
    /// # Errors
    ///
    /// `BcryptError::MalformedSalt` if `salt_or_hash` fails validation.
    pub fn hash_sync(&self, password: &[u8], salt_or_hash: &str) -> Result<String> {
        engine::derive(password, salt_or_hash)
    }

    /// Hash under a salt or existing hash, on the worker pool
    ///
    /// The record is validated on the calling thread; a malformed one resolves
    /// to `BcryptError::MalformedSalt` without occupying a worker.
    pub fn hash_async(
        &self,
        password: impl Into<Vec<u8>>,
        salt_or_hash: impl Into<String>,
    ) -> AsyncBcryptResult<String> {
        let salt: String = salt_or_hash.into();
        let record = match engine::parse_salt(&salt) {
            Ok(record) => record,
            Err(e) => {
                LoggingTransformer::log_crypto_error("hash", &e);
                return AsyncBcryptResult::error(e);
            }
        };
        let password = Zeroizing::new(password.into());
        self.offload("hash", record.cost().get(), move || {
            Ok(engine::derive_from(&password, &record))
        })
    }

    /// Hash under a fresh salt of the given cost, on this thread
    ///
    /// # Errors
    ///
    /// `BcryptError::InvalidArgument` for an out-of-range cost or
    /// `BcryptError::InsecureRandomness` if no secure seed is available.
    pub fn hash_with_cost_sync(&self, password: &[u8], cost: u32) -> Result<String> {
        engine::hash_with_cost(&self.seeds, password, self.config.default_version, cost)
    }

    /// Hash under a fresh salt of the given cost, on the worker pool
    pub fn hash_with_cost_async(
        &self,
        password: impl Into<Vec<u8>>,
        cost: u32,
    ) -> AsyncBcryptResult<String> {
        self.hash_with_params_async(password, self.config.default_version, cost)
    }

    /// Hash under a fresh salt of the given version and cost, on the worker pool
    ///
    /// Seed drawing, salt rendering and derivation all run in one job.
    pub fn hash_with_params_async(
        &self,
        password: impl Into<Vec<u8>>,
        version: Version,
        cost: u32,
    ) -> AsyncBcryptResult<String> {
        let password = Zeroizing::new(password.into());
        let seeds = self.seeds.clone();
        self.offload("hash", cost, move || {
            engine::hash_with_cost(&seeds, &password, version, cost)
        })
    }

    /// Verify on this thread; malformed hashes give `false`
    #[must_use]
    pub fn compare_sync(&self, password: &[u8], hash: &str) -> bool {
        engine::verify(password, hash)
    }

    /// Verify on the worker pool; malformed hashes give `Ok(false)`
    ///
    /// A hash that does not parse resolves immediately without occupying a
    /// worker.
    pub fn compare_async(
        &self,
        password: impl Into<Vec<u8>>,
        hash: impl Into<String>,
    ) -> AsyncBcryptResult<bool> {
        let hash = hash.into();
        let Ok(record) = HashRecord::parse(&hash) else {
            tracing::debug!(
                hash = %LoggingTransformer::fingerprint(hash.as_bytes()),
                "verification against malformed hash"
            );
            return AsyncBcryptResult::ready(Ok(false));
        };
        let password = Zeroizing::new(password.into());
        self.offload("compare", record.cost().get(), move || {
            Ok(engine::verify_parsed(&password, &record, &hash))
        })
    }

    /// Cost factor of a stored hash
    ///
    /// # Errors
    ///
    /// `BcryptError::InvalidHash` if the cost cannot be extracted.
    pub fn get_rounds(&self, hash: &str) -> Result<u32> {
        engine::get_rounds(hash)
    }

    fn offload<T, F>(&self, operation: &'static str, cost: u32, job: F) -> AsyncBcryptResult<T>
    where
        F: FnOnce() -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        tracing::debug!(operation, cost, "queueing bcrypt task");
        let handle = self.executor.submit(move || {
            let started = Instant::now();
            let result = job();
            if let Err(e) = &result {
                LoggingTransformer::log_crypto_error(operation, e);
            }
            LoggingTransformer::log_hash_operation(operation, cost, result.is_ok());
            LoggingTransformer::log_performance_metric(operation, started.elapsed(), result.is_ok());
            result
        });
        AsyncBcryptResult::new(handle)
    }
}
