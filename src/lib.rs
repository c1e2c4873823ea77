//! # Prometheus Limiter
//!
//! A FIFO concurrency limiter for asynchronous tasks.
//!
//! Give it a ceiling `N` and any number of deferred tasks; it guarantees at
//! most `N` run at once, queues the rest in submission order, and starts each
//! queued task as soon as a running one settles. It is the throttle you reach
//! for when fanning out network calls, model requests, or any other async work
//! that must not all run at the same time.
//!
//! ## How it works
//!
//! - **Admission**: `submit` and `submit_all` append to a FIFO queue and then
//!   run one dispatch pass, so tasks start immediately while slots are free.
//! - **Dispatch**: each pass pops the queue head, takes a slot, and invokes the
//!   producer, until the queue is empty or every slot is taken.
//! - **Completion**: when a task settles (fulfilled, failed, or panicked) its
//!   slot is released and a `slot_freed` signal wakes the dispatcher again.
//! - **Signals**: the wake-up travels through a small publish/subscribe
//!   channel whose backend is picked by probing the host runtime.
//!
//! ## Example
//!
//! ```rust,ignore
//! use prometheus_limiter::create_limiter;
//!
//! let limiter = create_limiter(2).await?;
//!
//! // One task: resolves to that task's own value.
//! let body = limiter.submit(|| fetch("https://example.com")).await?;
//!
//! // Many tasks: resolves to every value in submission order, or the first failure.
//! let bodies = limiter
//!     .submit_all(urls.into_iter().map(|url| move || fetch(url)))
//!     .await?;
//! ```
//!
//! For complete examples, see `tests/limiter_test.rs`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling: limit, task handles, and the limiter.
pub mod core;
/// Configuration models for limiters and signal backends.
pub mod config;
/// Builders to construct limiters from configuration.
pub mod builders;
/// Named-signal channel used to wake the dispatcher.
pub mod signal;
/// Runtime adapters and factory functions.
#[cfg(feature = "tokio-runtime")]
pub mod runtime;
/// Shared utilities.
pub mod util;

pub use crate::core::{
    BatchHandle, Limit, Limiter, LimiterError, LimiterStats, Spawn, TaskError, TaskHandle, TaskId,
};
#[cfg(feature = "tokio-runtime")]
pub use crate::runtime::{create_limiter, create_limiter_with_config, TokioLimiter, TokioSpawner};
