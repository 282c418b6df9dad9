//! # Async Task Coordination Library
//!
//! Runs CPU-bound closures on a bounded pool of blocking worker threads and
//! hands the caller a future that resolves exactly once with the closure's
//! result. The submitting thread never blocks, which keeps single-threaded
//! runtimes responsive while expensive work runs elsewhere.

pub mod executor;
pub mod task;

pub use executor::{AsyncExecutor, ExecutorConfig, ExecutorMetrics};
pub use task::{TaskError, TaskHandle, TaskResult, TaskState};

/// Re-export common types
pub type Result<T> = std::result::Result<T, TaskError>;
