//! Named-signal publish/subscribe used to wake the dispatcher.
//!
//! The limiter only ever sees the [`SignalChannel`] trait. Which backend sits
//! behind it is decided once, at construction, by probing the host:
//!
//! - [`InlineEmitter`]: emitter-style, handlers run synchronously on the
//!   publishing thread.
//! - [`DeferredChannel`]: event-target style, signals are queued and delivered
//!   by a listener task on a later tick of a tokio runtime.

pub mod emitter;
#[cfg(feature = "tokio-runtime")]
pub mod deferred;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::SignalBackendConfig;
use crate::core::LimiterError;

#[cfg(feature = "tokio-runtime")]
pub use deferred::DeferredChannel;
pub use emitter::InlineEmitter;

/// Published by a limiter every time a running task settles.
pub const SLOT_FREED: &str = "slot_freed";

/// Callback registered against a named signal.
pub type SignalHandler = Arc<dyn Fn(Option<&Value>) + Send + Sync>;

/// Wrap a closure as a [`SignalHandler`].
pub fn handler<F>(f: F) -> SignalHandler
where
    F: Fn(Option<&Value>) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Minimal named-event bus.
pub trait SignalChannel: Send + Sync {
    /// Register `handler` to run every time `event` is published.
    fn subscribe(&self, event: &str, handler: SignalHandler);

    /// Deliver `event` to its handlers. Never blocks on handlers and never fails.
    fn publish(&self, event: &str, payload: Option<Value>);
}

/// Concrete backend chosen for a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalBackend {
    /// Synchronous in-process emitter.
    Inline,
    /// Queue drained by a runtime listener task.
    Deferred,
}

impl fmt::Display for SignalBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline => f.write_str("inline"),
            Self::Deferred => f.write_str("deferred"),
        }
    }
}

/// Inspect the host and pick the backend that fits it.
///
/// A multi-threaded tokio runtime gets the deferred channel, a current-thread
/// runtime gets the inline emitter. Without a runtime there is nothing to
/// drive tasks or deliver signals, so probing fails.
#[cfg(feature = "tokio-runtime")]
pub fn probe() -> Result<SignalBackend, LimiterError> {
    use tokio::runtime::{Handle, RuntimeFlavor};

    let handle = Handle::try_current().map_err(|err| {
        LimiterError::UnsupportedEnvironment(format!("no compatible event system found: {err}"))
    })?;
    Ok(match handle.runtime_flavor() {
        RuntimeFlavor::CurrentThread => SignalBackend::Inline,
        _ => SignalBackend::Deferred,
    })
}

/// Inspect the host and pick the backend that fits it.
///
/// Built without an async runtime, so there is nothing to probe for.
#[cfg(not(feature = "tokio-runtime"))]
pub fn probe() -> Result<SignalBackend, LimiterError> {
    Err(LimiterError::UnsupportedEnvironment(
        "no compatible event system found: built without an async runtime".into(),
    ))
}

/// Build a signal channel, honouring an explicit preference or probing on `Auto`.
pub async fn create_signal_channel(
    preference: SignalBackendConfig,
) -> Result<Arc<dyn SignalChannel>, LimiterError> {
    let backend = match preference {
        SignalBackendConfig::Auto => probe()?,
        SignalBackendConfig::Inline => SignalBackend::Inline,
        SignalBackendConfig::Deferred => SignalBackend::Deferred,
    };
    tracing::debug!(%backend, "creating signal channel");

    match backend {
        SignalBackend::Inline => Ok(Arc::new(InlineEmitter::new())),
        #[cfg(feature = "tokio-runtime")]
        SignalBackend::Deferred => {
            let handle = tokio::runtime::Handle::try_current().map_err(|err| {
                LimiterError::UnsupportedEnvironment(format!(
                    "deferred signals need a tokio runtime: {err}"
                ))
            })?;
            Ok(Arc::new(DeferredChannel::start(&handle).await?))
        }
        #[cfg(not(feature = "tokio-runtime"))]
        SignalBackend::Deferred => Err(LimiterError::UnsupportedEnvironment(
            "deferred signals need the `tokio-runtime` feature".into(),
        )),
    }
}
