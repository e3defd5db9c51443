//! Unit tests for the `VmcError` enum and its associated `Display` trait implementation.

use std::time::Duration;
use vmc_rs::error::{ErrorKind, VmcError};

/// Tests that the `Connection` variant is correctly formatted.
#[test]
fn test_connection_error() {
    let err = VmcError::Connection {
        addr: "10.0.0.5:5001".into(),
        reason: "connection refused".into(),
    };
    assert_eq!(
        err.to_string(),
        "Connection to 10.0.0.5:5001 failed: connection refused"
    );
    assert_eq!(err.kind(), ErrorKind::Connection);
}

/// Tests that the `Timeout` variant names the stage.
#[test]
fn test_timeout_error() {
    let err = VmcError::Timeout {
        addr: "10.0.0.5:5001".into(),
        stage: "read",
        after: Duration::from_secs(3),
    };
    assert_eq!(err.to_string(), "Timed out during read with 10.0.0.5:5001 after 3s");
    assert_eq!(err.kind(), ErrorKind::Timeout);
}

#[test]
fn test_protocol_and_parse_errors() {
    let err = VmcError::Protocol("device replied 'ERROR'".into());
    assert_eq!(err.to_string(), "Protocol error: device replied 'ERROR'");
    let err = VmcError::Parse("field 1 is not numeric".into());
    assert_eq!(err.to_string(), "Error parsing telegram: field 1 is not numeric");
}

#[test]
fn test_invalid_argument_error() {
    let err = VmcError::InvalidArgument("lights level 120% above 100%".into());
    assert_eq!(err.to_string(), "Invalid argument: lights level 120% above 100%");
    assert!(!err.is_communication());
}

/// Tests which kinds count as exchange failures.
#[test]
fn test_communication_classification() {
    assert!(VmcError::Protocol(String::new()).is_communication());
    assert!(VmcError::Parse(String::new()).is_communication());
    assert!(!VmcError::Config(String::new()).is_communication());
}

#[test]
fn test_json_error_maps_to_config() {
    let json_err = serde_json::from_str::<Vec<u8>>("{").unwrap_err();
    let err: VmcError = json_err.into();
    assert_eq!(err.kind(), ErrorKind::Config);
    assert!(err.to_string().starts_with("Configuration error: "));
}
