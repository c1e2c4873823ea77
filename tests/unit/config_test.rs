//! Tests for configuration validation

use prometheus_limiter::config::{LimiterConfig, SignalBackendConfig};
use prometheus_limiter::LimiterError;

#[test]
fn test_limiter_config_validation() {
    assert!(LimiterConfig::with_max_running(4).validate().is_ok());
    assert!(LimiterConfig::default().validate().is_ok());
}

#[test]
fn test_limiter_config_invalid_max_running() {
    for bad in [0, -1, -100] {
        let err = LimiterConfig::with_max_running(bad).validate().unwrap_err();
        assert!(matches!(err, LimiterError::InvalidArgument(_)));
    }
}

#[test]
fn test_limiter_config_default_uses_parallelism() {
    let limit = LimiterConfig::default().resolved_limit().unwrap();
    assert_eq!(limit, prometheus_limiter::Limit::available_parallelism());
    assert!(limit.get() >= 1);
}

#[test]
fn test_limiter_config_from_json() {
    let json = r#"{
        "max_running": 8,
        "signal": "deferred"
    }"#;

    let config = LimiterConfig::from_json_str(json).unwrap();
    assert_eq!(config.max_running, Some(8));
    assert_eq!(config.signal, SignalBackendConfig::Deferred);
}

#[test]
fn test_limiter_config_from_json_defaults() {
    let config = LimiterConfig::from_json_str("{}").unwrap();
    assert_eq!(config.max_running, None);
    assert_eq!(config.signal, SignalBackendConfig::Auto);
}

#[test]
fn test_limiter_config_from_json_rejects_bad_input() {
    assert!(matches!(
        LimiterConfig::from_json_str(r#"{"max_running": 0}"#),
        Err(LimiterError::InvalidArgument(_))
    ));
    assert!(matches!(
        LimiterConfig::from_json_str(r#"{"max_running": 1.5}"#),
        Err(LimiterError::InvalidConfig(_))
    ));
    assert!(matches!(
        LimiterConfig::from_json_str(r#"{"signal": "smoke"}"#),
        Err(LimiterError::InvalidConfig(_))
    ));
}

#[test]
fn test_signal_backend_from_str() {
    assert_eq!("auto".parse::<SignalBackendConfig>().unwrap(), SignalBackendConfig::Auto);
    assert_eq!(" Inline ".parse::<SignalBackendConfig>().unwrap(), SignalBackendConfig::Inline);
    assert!("bus".parse::<SignalBackendConfig>().is_err());
}
