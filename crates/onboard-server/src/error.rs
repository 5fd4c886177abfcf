//! Error types for the Onboard server

use onboard_core::CoreError;
use thiserror::Error;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    /// Failure raised by the orchestrator, the toggle store or a handler
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Resource not found
    #[error("{0} not found")]
    NotFound(String),

    /// Missing or wrong admin credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Internal server error
    #[error("Internal server error: {0}")]
    InternalError(String),
}

/// Result type for server operations
pub type ServerResult<T> = Result<T, ServerError>;

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::InternalError(format!("IO error: {}", err))
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(err: anyhow::Error) -> Self {
        ServerError::InternalError(format!("Error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_is_transparent() {
        let err: ServerError = CoreError::Conflict("email taken".to_string()).into();
        assert_eq!(err.to_string(), "Conflict: email taken");
    }

    #[test]
    fn test_io_error_conversion() {
        let err: ServerError = std::io::Error::new(std::io::ErrorKind::AddrInUse, "port busy").into();
        assert!(matches!(err, ServerError::InternalError(msg) if msg.contains("port busy")));
    }
}
