//! Tests for error types

use prometheus_limiter::{LimiterError, TaskError};

#[test]
fn test_invalid_argument_error() {
    let err = LimiterError::InvalidArgument("max_running".to_string());
    assert_eq!(format!("{err}"), "invalid argument: max_running");
}

#[test]
fn test_unsupported_environment_error() {
    let err = LimiterError::UnsupportedEnvironment("no runtime".to_string());
    assert_eq!(format!("{err}"), "unsupported environment: no runtime");
}

#[test]
fn test_invalid_config_error() {
    let err = LimiterError::InvalidConfig("parse error".to_string());
    assert_eq!(format!("{err}"), "invalid configuration: parse error");
}

#[test]
fn test_task_errors_display() {
    assert_eq!(TaskError::Failure("timeout").to_string(), "task failed: timeout");
    assert_eq!(
        TaskError::<String>::InvalidTask("not callable".into()).to_string(),
        "invalid task: not callable"
    );
    assert_eq!(TaskError::<String>::Panicked("oops".into()).to_string(), "task panicked: oops");
    assert_eq!(
        TaskError::<String>::Abandoned.to_string(),
        "limiter dropped before the task settled"
    );
}

#[test]
fn test_into_failure_returns_original_reason() {
    assert_eq!(TaskError::Failure(42).into_failure(), Some(42));
    assert_eq!(TaskError::<i32>::Abandoned.into_failure(), None);
}
