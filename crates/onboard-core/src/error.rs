use thiserror::Error;

use crate::domain::step::ProvisioningStep;

/// Core error type for the Onboard provisioning runtime
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Malformed input, rejected before any step runs
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Toggle store lookup or write failed
    #[error("Toggle store error: {0}")]
    ToggleStoreError(String),

    /// A step handler reported a failure
    #[error("Handler error: {0}")]
    HandlerError(String),

    /// A step handler rejected a duplicate (e.g. an email that is already registered)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The payment gateway refused the charge
    #[error("Payment declined: {0}")]
    PaymentDeclined(String),

    /// A step handler did not answer within the configured budget
    #[error("Step {step} timed out after {timeout_ms}ms")]
    StepTimeout {
        /// Step whose handler timed out
        step: ProvisioningStep,
        /// Configured timeout in milliseconds
        timeout_ms: u64,
    },

    /// External dependency error
    #[error("External dependency error: {0}")]
    ExternalDependencyError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl CoreError {
    /// Whether the error was raised by a step handler rather than by the runtime
    pub fn is_handler_error(&self) -> bool {
        matches!(
            self,
            CoreError::HandlerError(_)
                | CoreError::Conflict(_)
                | CoreError::PaymentDeclined(_)
                | CoreError::StepTimeout { .. }
                | CoreError::ExternalDependencyError(_)
        )
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::SerializationError(err.to_string())
    }
}

impl From<String> for CoreError {
    fn from(err: String) -> Self {
        CoreError::Other(err)
    }
}

impl From<&str> for CoreError {
    fn from(err: &str) -> Self {
        CoreError::Other(err.to_string())
    }
}
