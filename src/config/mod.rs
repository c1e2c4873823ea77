//! Configuration models for limiters and their signal backends.

pub mod limiter;

pub use limiter::{LimiterConfig, SignalBackendConfig};
