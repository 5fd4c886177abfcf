//! Signup endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use onboard_core::SignupCommand;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::api::errors::ApiError;
use crate::server::ProvisioningServer;

/// `POST /provisioning/signup`: run the provisioning flow for one signup
///
/// Responds `201` with the populated context. Steps that were disabled,
/// unwired or not needed leave their fields `null`.
///
/// Failures map to `4xx` when the caller can act on them (validation,
/// conflict, declined payment, handler rejection). Failures of our own
/// dependencies are reported as gateway errors instead: an unreachable
/// downstream service is `502`, a step over its time budget is `504` and an
/// unavailable toggle store is `503`.
pub async fn signup_handler(
    State(server): State<Arc<ProvisioningServer>>,
    payload: Result<Json<SignupCommand>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(command) = payload?;
    info!(source = %command.source, "Signup requested");

    let context = server.provision(command).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": context,
        })),
    ))
}
