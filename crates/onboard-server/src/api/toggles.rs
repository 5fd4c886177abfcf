//! Admin API for flow rule toggles

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::IntoResponse,
    Json,
};
use onboard_core::FlowRuleToggle;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::api::errors::ApiError;
use crate::server::ProvisioningServer;

/// Response for listing toggles
#[derive(Debug, Serialize, Deserialize)]
pub struct ListTogglesResponse {
    pub flow_code: String,
    pub toggles: Vec<FlowRuleToggle>,
}

/// Body of `PUT /admin/toggles/:flow_code/:step_code`
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateToggleRequest {
    pub enabled: bool,
    #[serde(default)]
    pub description: Option<String>,
}

/// Handler for listing the toggles of a flow
pub async fn list_toggles_handler(
    State(server): State<Arc<ProvisioningServer>>,
    Path(flow_code): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    info!(%flow_code, "Listing toggles");
    let toggles = server.list_toggles(&flow_code).await?;

    Ok(Json(ListTogglesResponse {
        flow_code: onboard_core::normalize_code(&flow_code),
        toggles,
    }))
}

/// Handler for reading one toggle
pub async fn get_toggle_handler(
    State(server): State<Arc<ProvisioningServer>>,
    Path((flow_code, step_code)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let toggle = server.get_toggle(&flow_code, &step_code).await?;
    Ok(Json(toggle))
}

/// Handler for creating or replacing a toggle
pub async fn put_toggle_handler(
    State(server): State<Arc<ProvisioningServer>>,
    Path((flow_code, step_code)): Path<(String, String)>,
    payload: Result<Json<UpdateToggleRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let description = request.description.unwrap_or_default();

    let toggle = server
        .set_toggle(&flow_code, &step_code, request.enabled, &description)
        .await?;
    Ok(Json(toggle))
}
