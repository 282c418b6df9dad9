//! Structured logging infrastructure
//!
//! Provides env_logger-based logging with secure handling of sensitive data.
//! Library code emits `tracing` events; the `log` feature of `tracing` forwards
//! them to whatever `log` logger is installed, which is `env_logger` here.

use log::{debug, error, info, warn};
use sha2::{Digest, Sha256};
use std::sync::Once;
use std::time::Duration;

static INIT_LOGGER: Once = Once::new();

/// Logging infrastructure using `env_logger`
pub struct LoggingTransformer;

impl LoggingTransformer {
    /// Initialize logging system (should be called once at application startup)
    ///
    /// Configure logging levels via `RUST_LOG` environment variable:
    /// - `RUST_LOG=debug` - Enable all debug logs
    /// - `RUST_LOG=info` - Enable info and above (recommended for production)
    /// - `RUST_LOG=bcryypt=debug,async_task=info` - Module-specific levels
    pub fn init() {
        INIT_LOGGER.call_once(|| {
            if env_logger::Builder::from_default_env()
                .format_timestamp_micros()
                .try_init()
                .is_ok()
            {
                info!("Structured logging initialized");
            }
        });
    }

    /// Initialize logging for test environments
    ///
    /// Safe to call from every test; only the first call installs the logger
    pub fn init_test() {
        let _ = env_logger::Builder::from_default_env()
            .is_test(true)
            .try_init();
    }

    /// Log a password-hash operation without any secret material
    ///
    /// Only the operation name, the cost factor and the outcome are recorded
    pub fn log_hash_operation(operation: &str, cost: u32, success: bool) {
        if success {
            debug!("bcrypt {operation} succeeded (cost: {cost})");
        } else {
            warn!("bcrypt {operation} failed (cost: {cost})");
        }
    }

    /// Secure logging of cryptographic errors
    ///
    /// Callers pass errors whose messages carry no secret material
    pub fn log_crypto_error(operation: &str, error: &dyn std::error::Error) {
        error!("Cryptographic operation failed: {operation} ({error})");
    }

    /// Log performance metrics and timing information
    pub fn log_performance_metric(operation: &str, duration: Duration, success: bool) {
        let duration_ms = duration.as_millis();
        if success {
            debug!("Performance: {operation} completed in {duration_ms}ms");
        } else {
            warn!("Performance: {operation} failed after {duration_ms}ms");
        }
    }

    /// Short SHA-256 fingerprint of a sensitive value for log correlation
    ///
    /// Returns `#` followed by the first 12 hex characters of the digest
    #[must_use]
    pub fn fingerprint(value: &[u8]) -> String {
        let hash = Sha256::digest(value);
        let hex_hash = format!("{hash:x}");
        format!("#{}", &hex_hash[..12])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_stable_and_short() {
        LoggingTransformer::init_test();

        let a = LoggingTransformer::fingerprint(b"$2b$10$abcdefghijklmnopqrstuu");
        let b = LoggingTransformer::fingerprint(b"$2b$10$abcdefghijklmnopqrstuv");

        assert_ne!(a, b);
        assert_eq!(a, LoggingTransformer::fingerprint(b"$2b$10$abcdefghijklmnopqrstuu"));
        assert!(a.starts_with('#'));
        assert_eq!(a.len(), 13);
    }

    #[test]
    fn test_logging_operations() {
        LoggingTransformer::init_test();

        // These should not panic
        LoggingTransformer::log_hash_operation("hash", 10, true);
        LoggingTransformer::log_hash_operation("compare", 4, false);
        LoggingTransformer::log_performance_metric("hash", Duration::from_millis(80), true);
        let err = std::io::Error::other("entropy");
        LoggingTransformer::log_crypto_error("gen_salt", &err);
    }
}
