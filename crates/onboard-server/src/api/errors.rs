//! Error responses for the HTTP API
//!
//! Every failure is rendered as
//! `{"success": false, "error": {"code", "detail"}, "message"}`.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use onboard_core::CoreError;
use serde_json::json;
use tracing::{error, warn};

use crate::error::ServerError;

/// API error type for returning standard error responses
#[derive(Debug)]
pub enum ApiError {
    /// Malformed request body (400)
    BadRequest(String),
    /// Wrapped server error
    Server(ServerError),
}

impl From<ServerError> for ApiError {
    fn from(err: ServerError) -> Self {
        ApiError::Server(err)
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::Server(ServerError::Core(err))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::Server(err) => write!(f, "{}", err),
        }
    }
}

impl ApiError {
    /// HTTP status and stable error code for this error
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Server(ServerError::Core(err)) => core_status_and_code(err),
            ApiError::Server(ServerError::NotFound(_)) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Server(ServerError::Unauthorized(_)) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::Server(ServerError::ConfigError(_)) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
            ApiError::Server(ServerError::InternalError(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_SERVER_ERROR")
            }
        }
    }

    fn detail(&self) -> String {
        match self {
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::Server(ServerError::Core(err)) => core_detail(err),
            ApiError::Server(ServerError::NotFound(what)) => what.clone(),
            ApiError::Server(ServerError::Unauthorized(msg))
            | ApiError::Server(ServerError::ConfigError(msg))
            | ApiError::Server(ServerError::InternalError(msg)) => msg.clone(),
        }
    }
}

fn core_status_and_code(err: &CoreError) -> (StatusCode, &'static str) {
    match err {
        CoreError::ValidationError(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        CoreError::HandlerError(_) => (StatusCode::BAD_REQUEST, "HANDLER_ERROR"),
        CoreError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
        CoreError::PaymentDeclined(_) => (StatusCode::PAYMENT_REQUIRED, "PAYMENT_DECLINED"),
        CoreError::StepTimeout { .. } => (StatusCode::GATEWAY_TIMEOUT, "STEP_TIMEOUT"),
        CoreError::ToggleStoreError(_) => (StatusCode::SERVICE_UNAVAILABLE, "TOGGLE_STORE_ERROR"),
        CoreError::ExternalDependencyError(_) => (StatusCode::BAD_GATEWAY, "EXTERNAL_DEPENDENCY_ERROR"),
        CoreError::ConfigurationError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
        CoreError::SerializationError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "SERIALIZATION_ERROR"),
        CoreError::Other(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_SERVER_ERROR"),
    }
}

/// The payload of the variant, without the display prefix
fn core_detail(err: &CoreError) -> String {
    match err {
        CoreError::ValidationError(msg)
        | CoreError::ToggleStoreError(msg)
        | CoreError::HandlerError(msg)
        | CoreError::Conflict(msg)
        | CoreError::PaymentDeclined(msg)
        | CoreError::ExternalDependencyError(msg)
        | CoreError::ConfigurationError(msg)
        | CoreError::SerializationError(msg)
        | CoreError::Other(msg) => msg.clone(),
        CoreError::StepTimeout { .. } => err.to_string(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            error!(%code, error = %self, "Request failed");
        } else {
            warn!(%code, error = %self, "Request rejected");
        }

        let body = Json(json!({
            "success": false,
            "error": {
                "code": code,
                "detail": self.detail(),
            },
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}
