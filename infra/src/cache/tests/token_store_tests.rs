//! Unit tests for the Redis token store error mapping

use redis::{ErrorKind, RedisError};
use tk_core::errors::StoreError;

use crate::InfrastructureError;

#[test]
fn test_connection_failure_maps_to_unavailable() {
    let error = InfrastructureError::Cache(RedisError::from(std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        "Connection refused",
    )));
    assert!(matches!(StoreError::from(error), StoreError::Unavailable { .. }));
}

#[test]
fn test_type_error_maps_to_corrupt() {
    let error = InfrastructureError::Cache(RedisError::from((
        ErrorKind::TypeError,
        "WRONGTYPE",
    )));
    assert!(matches!(StoreError::from(error), StoreError::Corrupt { .. }));
}

#[test]
fn test_config_error_maps_to_unavailable() {
    let error = InfrastructureError::Config("bad url".to_string());
    match StoreError::from(error) {
        StoreError::Unavailable { message } => assert!(message.contains("bad url")),
        other => panic!("unexpected mapping: {:?}", other),
    }
}
