//! Queued task entries and the handles returned to callers.

use std::any::Any;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use futures::future::{self, BoxFuture, TryJoinAll};
use futures::FutureExt;

use super::TaskError;

/// Identifier assigned to each submitted task, unique per limiter.
pub type TaskId = u64;

/// How a started task ended, as seen by the slot accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Settlement {
    Fulfilled,
    Failed,
}

/// Completion callbacks bound to the future handed to the submitter.
pub(crate) struct Settle<T, E> {
    tx: oneshot::Sender<Result<T, TaskError<E>>>,
}

impl<T, E> Settle<T, E> {
    /// Create a settle pair and the receiving half for the caller's handle.
    pub(crate) fn channel() -> (Self, oneshot::Receiver<Result<T, TaskError<E>>>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    pub(crate) fn fulfill(self, value: T) -> Settlement {
        if self.tx.send(Ok(value)).is_err() {
            tracing::debug!("task result dropped: handle no longer awaited");
        }
        Settlement::Fulfilled
    }

    pub(crate) fn fail(self, reason: TaskError<E>) -> Settlement {
        if self.tx.send(Err(reason)).is_err() {
            tracing::debug!("task failure dropped: handle no longer awaited");
        }
        Settlement::Failed
    }
}

/// An admitted task that has not started yet.
///
/// The producer and its settle callbacks are erased into one closure so the
/// queue can hold tasks of any output type. Starting consumes the entry.
pub(crate) struct PendingTask {
    id: TaskId,
    start: Box<dyn FnOnce() -> BoxFuture<'static, Settlement> + Send>,
}

impl PendingTask {
    pub(crate) fn new<F, Fut, T, E>(id: TaskId, producer: F, settle: Settle<T, E>) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        let start = move || -> BoxFuture<'static, Settlement> {
            match panic::catch_unwind(AssertUnwindSafe(producer)) {
                Ok(running) => async move {
                    match AssertUnwindSafe(running).catch_unwind().await {
                        Ok(Ok(value)) => settle.fulfill(value),
                        Ok(Err(reason)) => settle.fail(TaskError::Failure(reason)),
                        Err(payload) => settle.fail(TaskError::Panicked(panic_message(&*payload))),
                    }
                }
                .boxed(),
                Err(payload) => {
                    let settled = settle.fail(TaskError::InvalidTask(format!(
                        "task must be a function returning a future: {}",
                        panic_message(&*payload)
                    )));
                    future::ready(settled).boxed()
                }
            }
        };
        Self {
            id,
            start: Box::new(start),
        }
    }

    pub(crate) const fn id(&self) -> TaskId {
        self.id
    }

    /// Invoke the producer and return a future that settles the caller's handle.
    pub(crate) fn start(self) -> BoxFuture<'static, Settlement> {
        (self.start)()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Future for one submitted task's outcome.
///
/// Holding a handle keeps its limiter alive, so queued work is not
/// abandoned while someone is still waiting on it.
#[must_use = "a task handle does nothing unless awaited or dropped"]
pub struct TaskHandle<T, E> {
    id: TaskId,
    receiver: oneshot::Receiver<Result<T, TaskError<E>>>,
    _limiter: Arc<dyn Any + Send + Sync>,
}

impl<T, E> TaskHandle<T, E> {
    pub(crate) fn new(
        id: TaskId,
        receiver: oneshot::Receiver<Result<T, TaskError<E>>>,
        limiter: Arc<dyn Any + Send + Sync>,
    ) -> Self {
        Self {
            id,
            receiver,
            _limiter: limiter,
        }
    }

    /// Identifier the limiter assigned to this task.
    pub const fn id(&self) -> TaskId {
        self.id
    }
}

impl<T, E> Future for TaskHandle<T, E> {
    type Output = Result<T, TaskError<E>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.receiver
            .poll_unpin(cx)
            .map(|outcome| outcome.unwrap_or(Err(TaskError::Abandoned)))
    }
}

impl<T, E> std::fmt::Debug for TaskHandle<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle").field("id", &self.id).finish_non_exhaustive()
    }
}

/// Future for a batch of tasks submitted together.
///
/// Resolves to every value in submission order once all fulfill, or to the
/// first failure observed. Siblings still running at that point keep their
/// slots until they finish; their outcomes are discarded.
#[must_use = "a batch handle does nothing unless awaited or dropped"]
pub struct BatchHandle<T, E> {
    ids: Vec<TaskId>,
    inner: Pin<Box<TryJoinAll<TaskHandle<T, E>>>>,
}

impl<T, E> BatchHandle<T, E> {
    pub(crate) fn new(handles: Vec<TaskHandle<T, E>>) -> Self {
        let ids = handles.iter().map(TaskHandle::id).collect();
        Self {
            ids,
            inner: Box::pin(future::try_join_all(handles)),
        }
    }

    /// Identifiers of the batched tasks, in submission order.
    pub fn ids(&self) -> &[TaskId] {
        &self.ids
    }
}

impl<T, E> Future for BatchHandle<T, E> {
    type Output = Result<Vec<T>, TaskError<E>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}

impl<T, E> std::fmt::Debug for BatchHandle<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchHandle").field("ids", &self.ids).finish_non_exhaustive()
    }
}
