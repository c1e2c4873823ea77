//! FIFO concurrency limiter: admission queue, slot accounting, and the
//! completion-driven dispatch loop.

use std::any::Any;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::core::task::{PendingTask, Settle, Settlement};
use crate::core::{BatchHandle, Limit, TaskHandle, TaskId};
use crate::signal::{self, SignalChannel, SLOT_FREED};

/// Abstraction for spawning task execution on a runtime.
pub trait Spawn {
    /// Spawn a future that runs to completion in the background.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}

/// Point-in-time view of a limiter's counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimiterStats {
    /// Configured concurrency ceiling.
    pub max_running: usize,
    /// Tasks started and not yet settled.
    pub active: usize,
    /// Tasks admitted and not yet started.
    pub pending: usize,
    /// Total tasks admitted.
    pub submitted: u64,
    /// Total tasks started.
    pub started: u64,
    /// Total tasks that fulfilled.
    pub fulfilled: u64,
    /// Total tasks that failed, panicked, or could not be invoked.
    pub failed: u64,
}

#[derive(Default)]
struct State {
    queue: VecDeque<PendingTask>,
    active: usize,
    next_id: TaskId,
    started: u64,
    fulfilled: u64,
    failed: u64,
}

struct Inner<S> {
    id: Uuid,
    limit: Limit,
    state: Mutex<State>,
    channel: Arc<dyn SignalChannel>,
    spawner: S,
}

/// Runs at most `limit` submitted tasks at a time, starting queued tasks in
/// submission order as slots free up.
///
/// Cloning is cheap; every clone admits into the same queue.
///
/// ```rust,ignore
/// let limiter = prometheus_limiter::create_limiter(2).await?;
///
/// let one = limiter.submit(|| async { Ok::<_, std::io::Error>(1) }).await?;
/// let all = limiter
///     .submit_all((0..5).map(|i| move || async move { Ok::<_, std::io::Error>(i) }))
///     .await?;
/// ```
pub struct Limiter<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for Limiter<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> Limiter<S>
where
    S: Spawn + Send + Sync + 'static,
{
    /// Build a limiter over an existing signal channel and spawner.
    ///
    /// Wires the "slot freed" signal to the dispatch loop. The subscription
    /// holds the limiter weakly, so the channel never keeps it alive.
    pub fn new(limit: Limit, channel: Arc<dyn SignalChannel>, spawner: S) -> Self {
        let inner = Arc::new(Inner {
            id: Uuid::new_v4(),
            limit,
            state: Mutex::new(State::default()),
            channel,
            spawner,
        });

        let weak: Weak<Inner<S>> = Arc::downgrade(&inner);
        inner.channel.subscribe(
            SLOT_FREED,
            signal::handler(move |_| {
                if let Some(inner) = weak.upgrade() {
                    inner.dispatch();
                }
            }),
        );
        tracing::info!(limiter = %inner.id, max_running = limit.get(), "limiter created");

        Self { inner }
    }

    /// Admit one task and return a handle to its own outcome.
    pub fn submit<F, Fut, T, E>(&self, task: F) -> TaskHandle<T, E>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        let handle = {
            let mut state = self.inner.state.lock();
            self.admit(&mut state, task)
        };
        tracing::debug!(limiter = %self.inner.id, task_id = handle.id(), "task enqueued");

        self.inner.dispatch();
        handle
    }

    /// Admit a batch of tasks at once.
    ///
    /// The whole batch joins the queue before any of it can be dispatched.
    /// The returned handle yields every value in submission order, or the
    /// first failure observed.
    pub fn submit_all<I, F, Fut, T, E>(&self, tasks: I) -> BatchHandle<T, E>
    where
        I: IntoIterator<Item = F>,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        // Drain the caller's iterator before locking; it may call back into us.
        let producers: Vec<F> = tasks.into_iter().collect();
        let handles: Vec<TaskHandle<T, E>> = {
            let mut state = self.inner.state.lock();
            producers
                .into_iter()
                .map(|producer| self.admit(&mut state, producer))
                .collect()
        };
        tracing::debug!(limiter = %self.inner.id, admitted = handles.len(), "batch enqueued");

        self.inner.dispatch();
        BatchHandle::new(handles)
    }

    /// Append one producer to the queue tail. The caller holds the lock.
    fn admit<F, Fut, T, E>(&self, state: &mut State, producer: F) -> TaskHandle<T, E>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        let id = state.next_id;
        state.next_id += 1;
        let (settle, receiver) = Settle::channel();
        state.queue.push_back(PendingTask::new(id, producer, settle));

        let keepalive: Arc<dyn Any + Send + Sync> = self.inner.clone();
        TaskHandle::new(id, receiver, keepalive)
    }

    /// Tasks started and not yet settled.
    pub fn active_count(&self) -> usize {
        self.inner.state.lock().active
    }

    /// Tasks waiting for a slot.
    pub fn pending_count(&self) -> usize {
        self.inner.state.lock().queue.len()
    }

    /// The concurrency ceiling fixed at construction.
    pub fn limit(&self) -> Limit {
        self.inner.limit
    }

    /// Identifier used to tag this limiter's log events.
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Snapshot of the limiter's counters.
    pub fn stats(&self) -> LimiterStats {
        let state = self.inner.state.lock();
        LimiterStats {
            max_running: self.inner.limit.get(),
            active: state.active,
            pending: state.queue.len(),
            submitted: state.next_id,
            started: state.started,
            fulfilled: state.fulfilled,
            failed: state.failed,
        }
    }
}

impl<S> Inner<S>
where
    S: Spawn + Send + Sync + 'static,
{
    /// Start queued tasks while slots remain.
    ///
    /// Each entry leaves the queue and takes its slot under the lock, before
    /// its producer runs, so a re-entrant call can never start it twice or
    /// overshoot the limit. Producers run with the lock released.
    fn dispatch(self: &Arc<Self>) {
        loop {
            let entry = {
                let mut state = self.state.lock();
                if state.active >= self.limit.get() {
                    break;
                }
                let Some(entry) = state.queue.pop_front() else {
                    break;
                };
                state.active += 1;
                state.started += 1;
                entry
            };

            let task_id = entry.id();
            tracing::debug!(limiter = %self.id, task_id, "starting task");
            let running = entry.start();

            let inner = Arc::clone(self);
            self.spawner.spawn(async move {
                let settlement = running.await;
                inner.release(task_id, settlement);
            });
        }
    }

    /// Give a slot back once a task has settled and wake the dispatcher.
    fn release(&self, task_id: TaskId, settlement: Settlement) {
        {
            let mut state = self.state.lock();
            state.active -= 1;
            match settlement {
                Settlement::Fulfilled => state.fulfilled += 1,
                Settlement::Failed => state.failed += 1,
            }
        }
        tracing::debug!(limiter = %self.id, task_id, ?settlement, "task settled");
        self.channel.publish(SLOT_FREED, Some(json!({ "task_id": task_id })));
    }
}

impl<S> std::fmt::Debug for Limiter<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Limiter")
            .field("id", &self.inner.id)
            .field("limit", &self.inner.limit)
            .field("active", &state.active)
            .field("pending", &state.queue.len())
            .finish_non_exhaustive()
    }
}
