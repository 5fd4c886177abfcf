//! Assertion utilities for provisioning contexts and call logs.
//!
//! Each helper returns a `Result` so tests can either `?` it or `unwrap` it
//! for a readable failure message.

use onboard_core::{HandlerKind, ProvisioningContext};
use thiserror::Error;

use crate::implementations::CallRecorder;

/// Error type for context validation failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContextAssertionError {
    #[error("Missing metadata key: {0}")]
    MissingMetadataKey(String),

    #[error("Invalid metadata value for {key}: expected {expected}, got {actual}")]
    InvalidMetadataValue {
        key: String,
        expected: String,
        actual: String,
    },

    #[error("Unexpected metadata key {key} with value {value}")]
    UnexpectedMetadataKey { key: String, value: String },

    #[error("Call order mismatch: expected {expected:?}, got {actual:?}")]
    CallOrderMismatch {
        expected: Vec<HandlerKind>,
        actual: Vec<HandlerKind>,
    },
}

/// Asserts that `key` is present with `expected`
pub fn assert_metadata(
    context: &ProvisioningContext,
    key: &str,
    expected: &str,
) -> Result<(), ContextAssertionError> {
    match context.metadata_value(key) {
        None => Err(ContextAssertionError::MissingMetadataKey(key.to_string())),
        Some(actual) if actual != expected => Err(ContextAssertionError::InvalidMetadataValue {
            key: key.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }),
        Some(_) => Ok(()),
    }
}

/// Asserts that none of `keys` is present
pub fn assert_no_metadata(context: &ProvisioningContext, keys: &[&str]) -> Result<(), ContextAssertionError> {
    for key in keys {
        if let Some(value) = context.metadata_value(key) {
            return Err(ContextAssertionError::UnexpectedMetadataKey {
                key: key.to_string(),
                value: value.to_string(),
            });
        }
    }
    Ok(())
}

/// Asserts that the recorder saw exactly `expected`, in order
pub fn assert_call_order(recorder: &CallRecorder, expected: &[HandlerKind]) -> Result<(), ContextAssertionError> {
    let actual = recorder.calls();
    if actual != expected {
        return Err(ContextAssertionError::CallOrderMismatch {
            expected: expected.to_vec(),
            actual,
        });
    }
    Ok(())
}
