//! Core scheduling: the limit, task handles, and the limiter itself.

pub mod error;
pub mod limit;
pub mod limiter;
pub mod task;

pub use error::{AppResult, LimiterError, TaskError};
pub use limit::Limit;
pub use limiter::{Limiter, LimiterStats, Spawn};
pub use task::{BatchHandle, TaskHandle, TaskId};
