//! Error types for limiter construction and task outcomes.

use std::convert::Infallible;

use thiserror::Error;

/// Errors produced while constructing or configuring a limiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LimiterError {
    /// The concurrency ceiling is not an integer greater than zero.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// No compatible signal primitive or task runtime was found on the host.
    #[error("unsupported environment: {0}")]
    UnsupportedEnvironment(String),
    /// Configuration could not be parsed or failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<Infallible> for LimiterError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

/// Outcome of a single submitted task that did not fulfill.
///
/// `E` is the task's own failure type and is carried through unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError<E> {
    /// The task's future resolved to an error.
    #[error("task failed: {0}")]
    Failure(E),
    /// The producer could not be invoked to obtain a future.
    #[error("invalid task: {0}")]
    InvalidTask(String),
    /// The task's future panicked while running.
    #[error("task panicked: {0}")]
    Panicked(String),
    /// The limiter went away before the task settled.
    #[error("limiter dropped before the task settled")]
    Abandoned,
}

impl<E> TaskError<E> {
    /// Returns the task's own failure reason, if that is what this is.
    pub fn into_failure(self) -> Option<E> {
        match self {
            Self::Failure(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
