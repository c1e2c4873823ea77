//! Factory functions that build a limiter for the host runtime.

use crate::config::LimiterConfig;
use crate::core::{Limit, Limiter, LimiterError};
use crate::runtime::TokioSpawner;
use crate::signal;

/// Limiter driven by the tokio runtime it was created on.
pub type TokioLimiter = Limiter<TokioSpawner>;

/// Create a limiter that runs at most `max_running` tasks at once.
///
/// The limit is validated before anything else is built; `0`, negative and
/// fractional values fail with [`LimiterError::InvalidArgument`]. The signal
/// channel is then picked by probing the current runtime, and construction
/// fails with [`LimiterError::UnsupportedEnvironment`] outside one.
pub async fn create_limiter<L>(max_running: L) -> Result<TokioLimiter, LimiterError>
where
    L: TryInto<Limit>,
    LimiterError: From<L::Error>,
{
    let limit = max_running.try_into()?;
    build(limit, LimiterConfig::default().signal).await
}

/// Create a limiter from configuration.
pub async fn create_limiter_with_config(config: &LimiterConfig) -> Result<TokioLimiter, LimiterError> {
    let limit = config.resolved_limit()?;
    build(limit, config.signal).await
}

async fn build(
    limit: Limit,
    preference: crate::config::SignalBackendConfig,
) -> Result<TokioLimiter, LimiterError> {
    let channel = signal::create_signal_channel(preference).await?;
    let spawner = TokioSpawner::try_current()?;
    Ok(Limiter::new(limit, channel, spawner))
}
