//! Health check endpoint

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use crate::server::ProvisioningServer;

/// Health check handler
///
/// Reports the toggle store status and which handlers are wired. Any store
/// status other than `UP` turns the whole response into `503`.
pub async fn health_check(State(server): State<Arc<ProvisioningServer>>) -> impl IntoResponse {
    debug!("Health check requested");

    let toggle_store_status = match server.check_toggle_store_health().await {
        Ok(true) => "UP",
        Ok(false) => "DEGRADED",
        Err(_) => "DOWN",
    };

    let handlers: Vec<&str> = server.wired_handlers().iter().map(|kind| kind.name()).collect();

    let response = json!({
        "status": if toggle_store_status == "UP" { "UP" } else { "DOWN" },
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now().to_rfc3339(),
        "dependencies": {
            "toggleStore": { "status": toggle_store_status },
        },
        "handlers": handlers,
    });

    let status = if toggle_store_status == "UP" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}
