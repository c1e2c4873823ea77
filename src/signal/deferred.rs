//! Signal channel delivered by a tokio listener task.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};

use super::{SignalChannel, SignalHandler};
use crate::core::LimiterError;

type Registry = Arc<RwLock<HashMap<String, Vec<SignalHandler>>>>;

struct Signal {
    event: String,
    payload: Option<Value>,
}

/// Channel that queues signals and delivers them from a listener task.
///
/// `publish` only posts to an unbounded queue, so handlers never run on the
/// publisher's stack. The listener exits once the channel is dropped and the
/// queue is drained.
pub struct DeferredChannel {
    sender: mpsc::UnboundedSender<Signal>,
    handlers: Registry,
}

impl DeferredChannel {
    /// Spawn the listener on `handle` and wait until it is receiving.
    pub async fn start(handle: &Handle) -> Result<Self, LimiterError> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let (ready_tx, ready_rx) = oneshot::channel();
        let handlers: Registry = Arc::new(RwLock::new(HashMap::new()));

        handle.spawn(listen(receiver, Arc::clone(&handlers), ready_tx));
        ready_rx.await.map_err(|_| {
            LimiterError::UnsupportedEnvironment("signal listener failed to start".into())
        })?;
        tracing::debug!("deferred signal listener running");

        Ok(Self { sender, handlers })
    }
}

async fn listen(
    mut receiver: mpsc::UnboundedReceiver<Signal>,
    handlers: Registry,
    ready: oneshot::Sender<()>,
) {
    let _ = ready.send(());
    while let Some(signal) = receiver.recv().await {
        let targets = handlers.read().get(&signal.event).cloned().unwrap_or_default();
        for handler in &targets {
            handler(signal.payload.as_ref());
        }
    }
    tracing::debug!("deferred signal listener stopped");
}

impl SignalChannel for DeferredChannel {
    fn subscribe(&self, event: &str, handler: SignalHandler) {
        self.handlers
            .write()
            .entry(event.to_owned())
            .or_default()
            .push(handler);
    }

    fn publish(&self, event: &str, payload: Option<Value>) {
        let signal = Signal {
            event: event.to_owned(),
            payload,
        };
        if self.sender.send(signal).is_err() {
            tracing::warn!(event, "signal listener gone; dropping signal");
        }
    }
}

impl std::fmt::Debug for DeferredChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeferredChannel")
            .field("closed", &self.sender.is_closed())
            .finish_non_exhaustive()
    }
}
