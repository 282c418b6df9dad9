//! Bounded executor for blocking work without blocking the caller

use crate::task::{StateCell, TaskError, TaskHandle, TaskResult, TaskState};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::sync::{oneshot, Semaphore};

/// Configuration for the executor
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Upper bound on jobs running at the same time
    pub max_concurrent_tasks: usize,
    /// Record execution counts and timings
    pub enable_metrics: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_tasks: num_cpus::get().max(1),
            enable_metrics: false,
        }
    }
}

/// Snapshot of executor performance counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutorMetrics {
    /// Jobs that returned normally
    pub tasks_executed: u64,
    /// Jobs that panicked or could not be started
    pub tasks_failed: u64,
    /// Mean wall time spent on a worker
    pub average_execution_time: Duration,
}

#[derive(Debug, Default)]
struct MetricCounters {
    executed: AtomicU64,
    failed: AtomicU64,
    total_nanos: AtomicU64,
}

impl MetricCounters {
    fn record<T>(&self, result: &TaskResult<T>, elapsed: Duration) {
        match result {
            Ok(_) => self.executed.fetch_add(1, Ordering::Relaxed),
            Err(_) => self.failed.fetch_add(1, Ordering::Relaxed),
        };
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        self.total_nanos.fetch_add(nanos, Ordering::Relaxed);
    }

    fn snapshot(&self) -> ExecutorMetrics {
        let tasks_executed = self.executed.load(Ordering::Relaxed);
        let tasks_failed = self.failed.load(Ordering::Relaxed);
        let total = tasks_executed + tasks_failed;
        let average_execution_time = if total > 0 {
            Duration::from_nanos(self.total_nanos.load(Ordering::Relaxed) / total)
        } else {
            Duration::ZERO
        };
        ExecutorMetrics {
            tasks_executed,
            tasks_failed,
            average_execution_time,
        }
    }
}

/// Executor that runs blocking jobs on tokio's blocking pool, at most
/// `max_concurrent_tasks` at a time
///
/// The executor itself needs no runtime to be constructed; a job runs on the
/// runtime current at `submit`, or failing that, the one that first polls it.
#[derive(Debug, Clone)]
pub struct AsyncExecutor {
    config: ExecutorConfig,
    semaphore: Arc<Semaphore>,
    metrics: Arc<MetricCounters>,
}

impl Default for AsyncExecutor {
    fn default() -> Self {
        Self::new(ExecutorConfig::default())
    }
}

impl AsyncExecutor {
    /// Create new executor
    #[must_use]
    pub fn new(config: ExecutorConfig) -> Self {
        let permits = config.max_concurrent_tasks.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(permits)),
            config,
            metrics: Arc::new(MetricCounters::default()),
        }
    }

    /// Configuration this executor was built with
    #[must_use]
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Queue a blocking job and return its completion handle
    ///
    /// The job waits for a permit, then runs on a blocking worker thread. A
    /// panic inside the job is reported as `TaskError::ExecutionFailed` on this
    /// handle only. Called outside of a tokio runtime, the job is held until
    /// the handle is first polled and then queued on that poller's runtime; a
    /// handle polled outside any runtime resolves to `TaskError::NoRuntime`
    /// and the job is never run.
    pub fn submit<F, T>(&self, job: F) -> TaskHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let state = StateCell::new();
        let (tx, rx) = oneshot::channel();

        if let Ok(runtime) = Handle::try_current() {
            self.launch(&runtime, job, Arc::clone(&state), tx);
            return TaskHandle::new(rx, state);
        }

        tracing::debug!("task submitted outside of a tokio runtime, deferred to first poll");
        let executor = self.clone();
        let task_state = Arc::clone(&state);
        TaskHandle::deferred(
            rx,
            state,
            Box::new(move |runtime: &Handle| executor.launch(runtime, job, task_state, tx)),
        )
    }

    fn launch<F, T>(
        &self,
        runtime: &Handle,
        job: F,
        state: Arc<StateCell>,
        tx: oneshot::Sender<TaskResult<T>>,
    ) where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let semaphore = Arc::clone(&self.semaphore);
        let metrics = self.config.enable_metrics.then(|| Arc::clone(&self.metrics));

        runtime.spawn(async move {
            let result = match semaphore.acquire_owned().await {
                Ok(permit) => {
                    let started = Instant::now();
                    let running = Arc::clone(&state);
                    let joined = tokio::task::spawn_blocking(move || {
                        let _permit = permit;
                        running.set(TaskState::Running);
                        job()
                    })
                    .await;
                    let result = joined.map_err(|e| TaskError::ExecutionFailed(e.to_string()));
                    if let Some(metrics) = metrics {
                        metrics.record(&result, started.elapsed());
                    }
                    result
                }
                Err(_) => Err(TaskError::PoolClosed),
            };

            if let Err(e) = &result {
                tracing::error!("offloaded task failed: {e}");
            }
            state.set(TaskState::Completed);
            if tx.send(result).is_err() {
                tracing::debug!("task result discarded, handle was dropped");
            }
        });
    }

    /// Run several jobs concurrently and collect their results in submission order
    pub async fn execute_batch<F, T>(&self, jobs: Vec<F>) -> Vec<TaskResult<T>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let handles: Vec<_> = jobs.into_iter().map(|job| self.submit(job)).collect();
        futures::future::join_all(handles).await
    }

    /// Get current metrics
    #[must_use]
    pub fn metrics(&self) -> ExecutorMetrics {
        self.metrics.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test]
    async fn test_submit_delivers_result() {
        let executor = AsyncExecutor::default();
        let result = executor.submit(|| 21 * 2).await;
        assert_eq!(result, Ok(42));
    }

    #[tokio::test]
    async fn test_panicking_job_is_isolated() {
        let executor = AsyncExecutor::new(ExecutorConfig {
            max_concurrent_tasks: 2,
            enable_metrics: true,
        });

        let failing = executor.submit(|| -> u32 { panic!("worker blew up") });
        let healthy = executor.submit(|| 5_u32);

        assert!(matches!(failing.await, Err(TaskError::ExecutionFailed(_))));
        assert_eq!(healthy.await, Ok(5));

        let metrics = executor.metrics();
        assert_eq!(metrics.tasks_executed, 1);
        assert_eq!(metrics.tasks_failed, 1);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let executor = AsyncExecutor::new(ExecutorConfig {
            max_concurrent_tasks: 2,
            enable_metrics: false,
        });
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let jobs: Vec<_> = (0..8)
            .map(|_| {
                let active = Arc::clone(&active);
                let peak = Arc::clone(&peak);
                move || {
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    std::thread::sleep(Duration::from_millis(20));
                    active.fetch_sub(1, Ordering::SeqCst);
                }
            })
            .collect();

        let results = executor.execute_batch(jobs).await;
        assert!(results.iter().all(Result::is_ok));
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_state_reaches_completed() {
        let executor = AsyncExecutor::default();
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
        let mut handle = executor.submit(move || {
            let _ = release_rx.recv();
            "done"
        });

        assert_ne!(handle.state(), TaskState::Completed);
        release_tx.send(()).ok();
        assert_eq!((&mut handle).await, Ok("done"));
        assert_eq!(handle.state(), TaskState::Completed);
    }

    #[tokio::test]
    async fn test_dropped_handle_still_runs_job() {
        let executor = AsyncExecutor::default();
        let (done_tx, done_rx) = tokio::sync::oneshot::channel();
        drop(executor.submit(move || {
            let _ = done_tx.send(());
        }));
        assert!(done_rx.await.is_ok());
    }

    #[test]
    fn test_submit_without_runtime() {
        let executor = AsyncExecutor::default();
        let handle = executor.submit(|| 1);
        assert!(handle.is_deferred());
        assert_eq!(handle.state(), TaskState::Queued);
        assert_eq!(futures::executor::block_on(handle), Err(TaskError::NoRuntime));
    }

    #[test]
    fn test_submitted_outside_awaited_inside_runtime() {
        let executor = AsyncExecutor::new(ExecutorConfig {
            max_concurrent_tasks: 1,
            enable_metrics: true,
        });
        let handle = executor.submit(|| 6 * 7);
        assert_eq!(tokio_test::block_on(handle), Ok(42));
        assert_eq!(executor.metrics().tasks_executed, 1);
    }

    #[test]
    fn test_single_threaded_host() {
        // tokio_test::block_on drives a current-thread runtime, like a host event loop
        let executor = AsyncExecutor::default();
        let value = tokio_test::block_on(async { executor.submit(|| 3 + 4).await });
        assert_eq!(value, Ok(7));
    }
}
