//! Builder assembling a limiter from configuration.

use std::sync::Arc;

use crate::config::{LimiterConfig, SignalBackendConfig};
use crate::core::{Limiter, LimiterError, Spawn};
use crate::signal::SignalChannel;

/// Builder for [`Limiter`] instances.
#[derive(Debug, Clone, Default)]
pub struct LimiterBuilder {
    config: LimiterConfig,
}

impl LimiterBuilder {
    /// Start from the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    pub const fn from_config(config: LimiterConfig) -> Self {
        Self { config }
    }

    /// Set the concurrency ceiling. Validated when the limiter is built.
    #[must_use]
    pub const fn max_running(mut self, max_running: i64) -> Self {
        self.config.max_running = Some(max_running);
        self
    }

    /// Choose the signal backend.
    #[must_use]
    pub const fn signal_backend(mut self, backend: SignalBackendConfig) -> Self {
        self.config.signal = backend;
        self
    }

    /// Configuration the builder will use.
    pub const fn config(&self) -> &LimiterConfig {
        &self.config
    }

    /// Build on the current tokio runtime.
    #[cfg(feature = "tokio-runtime")]
    pub async fn build(self) -> Result<crate::runtime::TokioLimiter, LimiterError> {
        crate::runtime::create_limiter_with_config(&self.config).await
    }

    /// Build over a caller-supplied channel and spawner. The configured
    /// signal backend is ignored.
    pub fn build_with<S>(
        self,
        channel: Arc<dyn SignalChannel>,
        spawner: S,
    ) -> Result<Limiter<S>, LimiterError>
    where
        S: Spawn + Send + Sync + 'static,
    {
        let limit = self.config.resolved_limit()?;
        Ok(Limiter::new(limit, channel, spawner))
    }
}
