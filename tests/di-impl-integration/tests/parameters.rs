//! 全局参数


use common::init_test_logger;
use di_impl::{Container, DependencyError};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize, PartialEq)]
struct RetryPolicy {
    attempts: u32,
    backoff_ms: u64,
}

#[test]
fn test_parameter_round_trip() {
    init_test_logger();
    let container = Container::new();
    container.set_parameter("k", json!({ "nested": [1, 2, 3] }));

    assert_eq!(
        container.get_parameter("k").unwrap(),
        json!({ "nested": [1, 2, 3] })
    );
}

#[test]
fn test_missing_parameter_strict_and_lenient() {
    init_test_logger();
    let container = Container::new();

    match container.get_parameter("missing").unwrap_err() {
        DependencyError::ParameterNotFound { key } => assert_eq!(key, "missing"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(container.find_parameter("missing").is_none());
}

#[test]
fn test_null_parameter_is_treated_as_missing() {
    init_test_logger();
    let container = Container::new();
    container.set_parameter("feature", Value::Null);

    assert!(container.get_parameter("feature").is_err());
    assert_eq!(container.find_parameter("feature"), Some(Value::Null));
}

#[test]
fn test_typed_parameter() {
    init_test_logger();
    let container = Container::new();
    container.set_parameter("retry", json!({ "attempts": 3, "backoff_ms": 200 }));

    let policy: RetryPolicy = container.get_parameter_as("retry").unwrap();
    assert_eq!(
        policy,
        RetryPolicy {
            attempts: 3,
            backoff_ms: 200
        }
    );

    let err = container.get_parameter_as::<bool>("retry").unwrap_err();
    assert!(matches!(err, DependencyError::ParameterTypeMismatch { .. }));
}

#[test]
fn test_parameters_are_independent_of_build() {
    init_test_logger();
    let container = Container::new();
    container.set_parameter("before", true);
    container.build().unwrap();
    container.set_parameter("after", 42);

    assert_eq!(container.get_parameter("before").unwrap(), json!(true));
    assert_eq!(container.get_parameter_as::<i32>("after").unwrap(), 42);
}
