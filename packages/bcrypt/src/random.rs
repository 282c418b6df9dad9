//! Random seed sourcing for salt generation
//!
//! The OS generator is the primary source. A thread-local ChaCha12 generator,
//! keyed with 32 bytes of OS entropy the first time the primary succeeds on
//! that thread, is the only fallback: it keeps a 256-bit security margin and
//! never falls back to anything weaker. When both fail, the call fails.

use crate::{BcryptError, Result};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;
use zeroize::Zeroizing;

/// Failure of a single entropy source
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{source_name}: {reason}")]
pub struct EntropyError {
    /// Name of the failing source
    pub source_name: &'static str,
    /// What went wrong
    pub reason: String,
}

/// A cryptographically secure byte generator
pub trait EntropySource: Send + Sync {
    /// Short name used in logs and errors
    fn name(&self) -> &'static str;

    /// Fill `buf` entirely with random bytes
    ///
    /// # Errors
    ///
    /// Returns an `EntropyError` if the source cannot produce bytes.
    fn fill(&self, buf: &mut [u8]) -> std::result::Result<(), EntropyError>;
}

/// The operating system CSPRNG via `getrandom`
#[derive(Debug, Default, Clone, Copy)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn name(&self) -> &'static str {
        "os"
    }

    fn fill(&self, buf: &mut [u8]) -> std::result::Result<(), EntropyError> {
        getrandom::fill(buf).map_err(|e| EntropyError {
            source_name: self.name(),
            reason: e.to_string(),
        })?;
        ReserveEntropy::arm_current_thread();
        Ok(())
    }
}

thread_local! {
    static RESERVE: RefCell<Option<StdRng>> = const { RefCell::new(None) };
}

/// Thread-local ChaCha12 generator armed from the OS source
///
/// Only usable on threads where `OsEntropy` has succeeded at least once.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReserveEntropy;

impl ReserveEntropy {
    /// Key this thread's reserve generator from the OS if it is not keyed yet
    fn arm_current_thread() {
        RESERVE.with(|slot| {
            let mut slot = slot.borrow_mut();
            if slot.is_none() {
                let mut seed = Zeroizing::new([0_u8; 32]);
                if getrandom::fill(&mut seed[..]).is_ok() {
                    *slot = Some(StdRng::from_seed(*seed));
                }
            }
        });
    }

    /// Whether this thread's reserve generator has been keyed
    #[must_use]
    pub fn is_armed() -> bool {
        RESERVE.with(|slot| slot.borrow().is_some())
    }
}

impl EntropySource for ReserveEntropy {
    fn name(&self) -> &'static str {
        "thread-reserve"
    }

    fn fill(&self, buf: &mut [u8]) -> std::result::Result<(), EntropyError> {
        RESERVE.with(|slot| match slot.borrow_mut().as_mut() {
            Some(rng) => {
                rng.fill_bytes(buf);
                Ok(())
            }
            None => Err(EntropyError {
                source_name: self.name(),
                reason: "never keyed from the OS on this thread".to_string(),
            }),
        })
    }
}

/// Primary source plus optional fallback
#[derive(Clone)]
pub struct SeedSource {
    primary: Arc<dyn EntropySource>,
    fallback: Option<Arc<dyn EntropySource>>,
}

impl fmt::Debug for SeedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeedSource")
            .field("primary", &self.primary.name())
            .field("fallback", &self.fallback.as_ref().map(|s| s.name()))
            .finish()
    }
}

impl Default for SeedSource {
    fn default() -> Self {
        Self::new(Arc::new(OsEntropy), Some(Arc::new(ReserveEntropy)))
    }
}

impl SeedSource {
    /// Build a source from explicit parts
    #[must_use]
    pub fn new(
        primary: Arc<dyn EntropySource>,
        fallback: Option<Arc<dyn EntropySource>>,
    ) -> Self {
        Self { primary, fallback }
    }

    /// Produce `size` random bytes
    ///
    /// # Errors
    ///
    /// Returns `BcryptError::InsecureRandomness` when the primary source and
    /// the fallback both fail. There is no retry.
    pub fn generate_seed(&self, size: usize) -> Result<Zeroizing<Vec<u8>>> {
        let mut seed = Zeroizing::new(vec![0_u8; size]);

        let primary_error = match self.primary.fill(&mut seed) {
            Ok(()) => return Ok(seed),
            Err(e) => e,
        };
        tracing::warn!("primary entropy source failed: {primary_error}");

        let Some(fallback) = &self.fallback else {
            tracing::error!("no fallback entropy source configured");
            return Err(BcryptError::InsecureRandomness(primary_error.to_string()));
        };

        match fallback.fill(&mut seed) {
            Ok(()) => {
                tracing::warn!("seed drawn from fallback source {}", fallback.name());
                Ok(seed)
            }
            Err(fallback_error) => {
                tracing::error!("fallback entropy source failed: {fallback_error}");
                Err(BcryptError::InsecureRandomness(format!(
                    "{primary_error}; {fallback_error}"
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl EntropySource for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn fill(&self, _buf: &mut [u8]) -> std::result::Result<(), EntropyError> {
            Err(EntropyError {
                source_name: "broken",
                reason: "unavailable".to_string(),
            })
        }
    }

    #[test]
    fn test_os_source_fills() {
        let seeds = SeedSource::default();
        let a = seeds.generate_seed(16);
        let b = seeds.generate_seed(16);
        assert!(a.is_ok() && b.is_ok());
        let (Ok(a), Ok(b)) = (a, b) else { return };
        assert_eq!(a.len(), 16);
        assert_ne!(a[..], b[..]);
    }

    #[test]
    fn test_fallback_after_primary_failure() {
        assert!(OsEntropy.fill(&mut [0_u8; 4]).is_ok());
        assert!(ReserveEntropy::is_armed());

        let seeds = SeedSource::new(Arc::new(Broken), Some(Arc::new(ReserveEntropy)));
        assert_eq!(seeds.generate_seed(16).map(|s| s.len()), Ok(16));
    }

    #[test]
    fn test_both_sources_failing_is_insecure() {
        let seeds = SeedSource::new(Arc::new(Broken), Some(Arc::new(Broken)));
        assert!(matches!(
            seeds.generate_seed(16),
            Err(BcryptError::InsecureRandomness(_))
        ));

        let no_fallback = SeedSource::new(Arc::new(Broken), None);
        assert!(matches!(
            no_fallback.generate_seed(16),
            Err(BcryptError::InsecureRandomness(_))
        ));
    }

    #[test]
    fn test_unarmed_reserve_refuses() {
        let result = std::thread::spawn(|| {
            let mut buf = [0_u8; 8];
            ReserveEntropy.fill(&mut buf)
        })
        .join();
        assert!(matches!(result, Ok(Err(_))));
    }
}
