use crate::format::{Cost, Version, DEFAULT_COST};
use crate::{BcryptError, Result};
use async_task::ExecutorConfig;
use serde::{Deserialize, Serialize};

/// Process-wide settings applied by `bcryypt::init`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BcryptConfig {
    /// Cost used when a call does not name one
    #[serde(default = "default_cost")]
    pub default_cost: u32,
    /// Version tag used for generated salts
    #[serde(default)]
    pub default_version: Version,
    /// Upper bound on hashes computed at the same time
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,
    /// Collect executor timings
    #[serde(default)]
    pub enable_metrics: bool,
}

fn default_cost() -> u32 {
    DEFAULT_COST
}

fn default_worker_threads() -> usize {
    num_cpus::get().max(1)
}

impl Default for BcryptConfig {
    fn default() -> Self {
        Self {
            default_cost: default_cost(),
            default_version: Version::default(),
            worker_threads: default_worker_threads(),
            enable_metrics: false,
        }
    }
}

impl BcryptConfig {
    /// Parse a JSON document; missing fields take their defaults
    ///
    /// # Errors
    ///
    /// Returns `BcryptError::Configuration` if the document is not valid JSON
    /// for this shape or fails `validate`.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| BcryptError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the settings for consistency
    ///
    /// # Errors
    ///
    /// Returns `BcryptError::Configuration` for an out-of-range default cost
    /// or a zero-sized worker pool.
    pub fn validate(&self) -> Result<()> {
        Cost::new(self.default_cost).map_err(|e| BcryptError::Configuration(e.to_string()))?;
        if self.worker_threads == 0 {
            return Err(BcryptError::Configuration(
                "worker_threads must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Executor settings derived from this configuration
    #[must_use]
    pub fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig {
            max_concurrent_tasks: self.worker_threads.max(1),
            enable_metrics: self.enable_metrics,
        }
    }
}
