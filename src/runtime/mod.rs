//! Runtime adapters and the factory entry points.

pub mod api;
pub mod tokio_spawner;

pub use api::{create_limiter, create_limiter_with_config, TokioLimiter};
pub use tokio_spawner::TokioSpawner;
