//! bcrypt builder

use crate::async_result::AsyncBcryptResult;
use crate::format::Version;
use crate::scheduler::HashScheduler;
use crate::{scheduler, Result};

/// bcrypt builder; unset options fall back to the scheduler's configuration
#[derive(Debug, Clone)]
pub struct BcryptBuilder {
    scheduler: &'static HashScheduler,
    cost: Option<u32>,
    version: Option<Version>,
}

/// bcrypt builder with result handler
pub struct BcryptBuilderWithHandler<F> {
    inner: BcryptBuilder,
    result_handler: F,
}

impl Default for BcryptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BcryptBuilder {
    /// Create a builder bound to the process-wide scheduler
    #[must_use]
    pub fn new() -> Self {
        Self {
            scheduler: scheduler(),
            cost: None,
            version: None,
        }
    }

    /// Set the cost factor for generated salts
    #[must_use]
    pub fn with_cost(mut self, cost: u32) -> Self {
        self.cost = Some(cost);
        self
    }

    /// Set the version tag for generated salts
    #[must_use]
    pub fn with_version(mut self, version: Version) -> Self {
        self.version = Some(version);
        self
    }

    /// Add `on_result` handler
    #[must_use]
    pub fn on_result<F, T>(self, handler: F) -> BcryptBuilderWithHandler<F>
    where
        F: FnOnce(Result<String>) -> T + Send + 'static,
    {
        BcryptBuilderWithHandler {
            inner: self,
            result_handler: handler,
        }
    }

    fn cost(&self) -> u32 {
        self.cost.unwrap_or(self.scheduler.config().default_cost)
    }

    fn version(&self) -> Version {
        self.version.unwrap_or(self.scheduler.config().default_version)
    }

    /// Generate a random salt
    #[must_use]
    pub fn salt(self) -> AsyncBcryptResult<String> {
        self.scheduler
            .gen_salt_random_async(self.version(), self.cost())
    }

    /// Hash a password under a fresh salt
    #[must_use]
    pub fn hash<P: Into<Vec<u8>>>(self, password: P) -> AsyncBcryptResult<String> {
        self.scheduler
            .hash_with_params_async(password, self.version(), self.cost())
    }

    /// Verify a password against a stored hash
    #[must_use]
    pub fn verify<P: Into<Vec<u8>>, H: Into<String>>(
        self,
        password: P,
        hash: H,
    ) -> AsyncBcryptResult<bool> {
        self.scheduler.compare_async(password, hash)
    }
}

impl<F, T> BcryptBuilderWithHandler<F>
where
    F: FnOnce(Result<String>) -> T + Send + Unpin + 'static,
{
    /// Hash a password and hand the outcome to the handler
    pub async fn hash<P: Into<Vec<u8>>>(self, password: P) -> T {
        let handler = self.result_handler;
        let outcome = self.inner.hash(password).await;
        handler(outcome)
    }

    /// Generate a salt and hand the outcome to the handler
    pub async fn salt(self) -> T {
        let handler = self.result_handler;
        let outcome = self.inner.salt().await;
        handler(outcome)
    }
}
