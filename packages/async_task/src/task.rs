//! Task handles and the per-task state machine

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::runtime::Handle;
use tokio::sync::oneshot;

/// Error types for task execution
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    /// The job panicked or its worker thread was torn down
    #[error("Task execution failed: {0}")]
    ExecutionFailed(String),
    /// The handle was polled outside of a tokio runtime before its job started
    #[error("No tokio runtime available to schedule the task")]
    NoRuntime,
    /// The pool's permit semaphore was closed before the task could start
    #[error("Worker pool closed")]
    PoolClosed,
    /// The completion channel closed without delivering a result
    #[error("Task dropped before completion")]
    Dropped,
}

/// Result type for tasks
pub type TaskResult<T> = Result<T, TaskError>;

/// Lifecycle of an offloaded task
///
/// `Queued -> Running -> Completed`. There is no cancelled state: once a task
/// has been submitted it runs to completion even if its handle is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Waiting for a worker permit
    Queued,
    /// Executing on a worker thread
    Running,
    /// Finished, successfully or not; the outcome travels through the handle
    Completed,
}

impl TaskState {
    fn as_u8(self) -> u8 {
        match self {
            Self::Queued => 0,
            Self::Running => 1,
            Self::Completed => 2,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Queued,
            1 => Self::Running,
            _ => Self::Completed,
        }
    }
}

/// State shared between one task's worker and its handle
#[derive(Debug)]
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self(AtomicU8::new(TaskState::Queued.as_u8())))
    }

    pub(crate) fn set(&self, state: TaskState) {
        self.0.store(state.as_u8(), Ordering::Release);
    }

    pub(crate) fn get(&self) -> TaskState {
        TaskState::from_u8(self.0.load(Ordering::Acquire))
    }
}

/// Starts a deferred task on the runtime that first polls its handle
pub(crate) type Launch = Box<dyn FnOnce(&Handle) + Send>;

/// Completion handle for a submitted task
///
/// Resolves exactly once with the job's output. Dropping the handle does not
/// stop a started job; the result is discarded when it arrives. A handle
/// created outside a runtime starts its job on the runtime that first polls
/// it, or resolves to `TaskError::NoRuntime` if polled outside any runtime.
pub struct TaskHandle<T> {
    receiver: oneshot::Receiver<TaskResult<T>>,
    state: Arc<StateCell>,
    launch: Option<Launch>,
}

impl<T> fmt::Debug for TaskHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("state", &self.state())
            .field("deferred", &self.launch.is_some())
            .finish()
    }
}

impl<T> TaskHandle<T> {
    pub(crate) fn new(receiver: oneshot::Receiver<TaskResult<T>>, state: Arc<StateCell>) -> Self {
        Self {
            receiver,
            state,
            launch: None,
        }
    }

    pub(crate) fn deferred(
        receiver: oneshot::Receiver<TaskResult<T>>,
        state: Arc<StateCell>,
        launch: Launch,
    ) -> Self {
        Self {
            receiver,
            state,
            launch: Some(launch),
        }
    }

    /// Create a handle that is already completed with `result`
    #[must_use]
    pub fn ready(result: TaskResult<T>) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(result);
        let state = StateCell::new();
        state.set(TaskState::Completed);
        Self::new(rx, state)
    }

    /// Current lifecycle state of the task
    #[must_use]
    pub fn state(&self) -> TaskState {
        self.state.get()
    }

    /// Whether the job is still waiting for a runtime to start it
    #[must_use]
    pub fn is_deferred(&self) -> bool {
        self.launch.is_some()
    }
}

impl<T> Future for TaskHandle<T> {
    type Output = TaskResult<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if let Some(launch) = self.launch.take() {
            let Ok(runtime) = Handle::try_current() else {
                tracing::warn!("deferred task polled outside of a tokio runtime");
                self.state.set(TaskState::Completed);
                return Poll::Ready(Err(TaskError::NoRuntime));
            };
            launch(&runtime);
        }

        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => Poll::Ready(Err(TaskError::Dropped)),
            Poll::Pending => Poll::Pending,
        }
    }
}
