//! Async bcrypt result types over the worker pool's completion handles

use crate::{BcryptError, Result};
use async_task::{TaskHandle, TaskState};
use futures::future::FusedFuture;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Pending result of an offloaded bcrypt operation
///
/// Resolves once with the operation's outcome. Worker failures surface as
/// `BcryptError::Task`. Dropping it does not stop the computation.
#[derive(Debug)]
pub struct AsyncBcryptResult<T> {
    handle: TaskHandle<Result<T>>,
}

/// Async bcrypt result with user-defined result handler
///
/// Fused: once the handler has produced its value the future reports
/// `is_terminated()` and any further poll returns `Pending` without touching
/// the completed task.
pub struct AsyncBcryptResultWithHandler<T, F> {
    handle: TaskHandle<Result<T>>,
    handler: Option<F>,
}

impl<T> AsyncBcryptResult<T> {
    pub(crate) fn new(handle: TaskHandle<Result<T>>) -> Self {
        Self { handle }
    }

    /// Create an `AsyncBcryptResult` that's already completed
    #[must_use]
    pub fn ready(result: Result<T>) -> Self {
        Self {
            handle: TaskHandle::ready(Ok(result)),
        }
    }

    /// Create an `AsyncBcryptResult` that yields an error
    #[must_use]
    pub fn error(error: BcryptError) -> Self {
        Self::ready(Err(error))
    }

    /// Lifecycle state of the underlying task
    #[must_use]
    pub fn state(&self) -> TaskState {
        self.handle.state()
    }

    /// Add a result handler that turns the outcome into a plain value
    pub fn on_result<F, U>(self, handler: F) -> AsyncBcryptResultWithHandler<T, F>
    where
        F: FnOnce(Result<T>) -> U,
    {
        AsyncBcryptResultWithHandler {
            handle: self.handle,
            handler: Some(handler),
        }
    }
}

impl<T> Future for AsyncBcryptResult<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.handle).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(e)) => Poll::Ready(Err(BcryptError::from(e))),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T, F, U> Future for AsyncBcryptResultWithHandler<T, F>
where
    F: FnOnce(Result<T>) -> U + Unpin,
{
    type Output = U;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        if this.handler.is_none() {
            return Poll::Pending;
        }
        let outcome = match Pin::new(&mut this.handle).poll(cx) {
            Poll::Ready(Ok(result)) => result,
            Poll::Ready(Err(e)) => Err(BcryptError::from(e)),
            Poll::Pending => return Poll::Pending,
        };
        match this.handler.take() {
            Some(handler) => Poll::Ready(handler(outcome)),
            None => Poll::Pending,
        }
    }
}

impl<T, F, U> FusedFuture for AsyncBcryptResultWithHandler<T, F>
where
    F: FnOnce(Result<T>) -> U + Unpin,
{
    fn is_terminated(&self) -> bool {
        self.handler.is_none()
    }
}
