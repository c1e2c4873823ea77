//! Tests for signal channel selection and delivery

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use prometheus_limiter::config::SignalBackendConfig;
use prometheus_limiter::signal::{self, create_signal_channel, SignalBackend, SLOT_FREED};

#[tokio::test(flavor = "current_thread")]
async fn test_auto_on_current_thread_runs_handlers_inline() {
    let channel = create_signal_channel(SignalBackendConfig::Auto).await.unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    channel.subscribe(SLOT_FREED, signal::handler(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    channel.publish(SLOT_FREED, None);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_auto_on_multi_thread_delivers_later() {
    assert_eq!(signal::probe().unwrap(), SignalBackend::Deferred);

    let channel = create_signal_channel(SignalBackendConfig::Auto).await.unwrap();
    let (tx, rx) = std::sync::mpsc::channel();
    let tx = parking_lot::Mutex::new(tx);
    channel.subscribe(SLOT_FREED, signal::handler(move |payload| {
        let _ = tx.lock().send(payload.cloned());
    }));

    channel.publish(SLOT_FREED, Some(serde_json::json!({ "task_id": 9 })));
    let received = tokio::task::spawn_blocking(move || rx.recv_timeout(Duration::from_secs(1)))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(received, Some(serde_json::json!({ "task_id": 9 })));
}

#[test]
fn test_backend_display() {
    assert_eq!(SignalBackend::Inline.to_string(), "inline");
    assert_eq!(SignalBackend::Deferred.to_string(), "deferred");
}
