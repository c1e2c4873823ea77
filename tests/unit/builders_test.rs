//! Tests for builder modules

use std::sync::Arc;

use prometheus_limiter::builders::LimiterBuilder;
use prometheus_limiter::config::{LimiterConfig, SignalBackendConfig};
use prometheus_limiter::signal::InlineEmitter;
use prometheus_limiter::{LimiterError, TokioSpawner};

#[test]
fn test_limiter_builder_defaults() {
    let builder = LimiterBuilder::new();
    assert_eq!(builder.config(), &LimiterConfig::default());
}

#[test]
fn test_limiter_builder_setters() {
    let builder = LimiterBuilder::new()
        .max_running(3)
        .signal_backend(SignalBackendConfig::Inline);
    assert_eq!(builder.config().max_running, Some(3));
    assert_eq!(builder.config().signal, SignalBackendConfig::Inline);
}

#[tokio::test(flavor = "current_thread")]
async fn test_limiter_builder_build() {
    let limiter = LimiterBuilder::from_config(LimiterConfig::with_max_running(5))
        .build()
        .await
        .unwrap();
    assert_eq!(limiter.limit().get(), 5);
    assert_eq!(limiter.active_count(), 0);
}

#[tokio::test(flavor = "current_thread")]
async fn test_limiter_builder_build_with_parts() {
    let spawner = TokioSpawner::new(tokio::runtime::Handle::current());
    let limiter = LimiterBuilder::new()
        .max_running(2)
        .build_with(Arc::new(InlineEmitter::new()), spawner)
        .unwrap();

    let value = limiter.submit(|| async { Ok::<_, String>(9) }).await;
    assert_eq!(value, Ok(9));
}

#[test]
fn test_limiter_builder_rejects_zero() {
    let result = LimiterBuilder::new()
        .max_running(0)
        .build_with(Arc::new(InlineEmitter::new()), NullSpawner);
    assert!(matches!(result, Err(LimiterError::InvalidArgument(_))));
}

/// Drops whatever it is given; only used where nothing gets spawned.
struct NullSpawner;

impl prometheus_limiter::Spawn for NullSpawner {
    fn spawn<F>(&self, _fut: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
    }
}
