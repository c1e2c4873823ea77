//! Synchronous in-process emitter.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde_json::Value;

use super::{SignalChannel, SignalHandler};

/// Emitter that runs handlers on the publishing thread.
///
/// The handler list is copied out of the lock before any handler runs, so a
/// handler may itself publish or subscribe.
#[derive(Default)]
pub struct InlineEmitter {
    handlers: RwLock<HashMap<String, Vec<SignalHandler>>>,
}

impl InlineEmitter {
    /// Create an emitter with no subscriptions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of handlers registered for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.handlers.read().get(event).map_or(0, Vec::len)
    }
}

impl SignalChannel for InlineEmitter {
    fn subscribe(&self, event: &str, handler: SignalHandler) {
        self.handlers
            .write()
            .entry(event.to_owned())
            .or_default()
            .push(handler);
    }

    fn publish(&self, event: &str, payload: Option<Value>) {
        let handlers = self.handlers.read().get(event).cloned().unwrap_or_default();
        if handlers.is_empty() {
            tracing::trace!(event, "signal published with no listeners");
            return;
        }
        for handler in &handlers {
            handler(payload.as_ref());
        }
    }
}

impl std::fmt::Debug for InlineEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let events: Vec<String> = self.handlers.read().keys().cloned().collect();
        f.debug_struct("InlineEmitter").field("events", &events).finish()
    }
}
