//! Tests for tokio spawner utilities

use prometheus_limiter::{LimiterError, Spawn, TokioSpawner};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tokio_spawner_spawn() {
    let spawner = TokioSpawner::new(tokio::runtime::Handle::current());

    let (tx, rx) = tokio::sync::oneshot::channel();
    spawner.spawn(async move {
        tx.send(123).unwrap();
    });

    let result = rx.await.expect("oneshot result");
    assert_eq!(result, 123);
}

#[tokio::test(flavor = "current_thread")]
async fn test_tokio_spawner_try_current() {
    let spawner = TokioSpawner::try_current().unwrap();
    assert_eq!(spawner.handle().runtime_flavor(), tokio::runtime::RuntimeFlavor::CurrentThread);
}

#[test]
fn test_tokio_spawner_outside_runtime() {
    assert!(matches!(
        TokioSpawner::try_current(),
        Err(LimiterError::UnsupportedEnvironment(_))
    ));
}
