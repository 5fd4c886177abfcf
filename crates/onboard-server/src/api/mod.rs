//! HTTP API for the Onboard server

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod errors;
pub mod health;
pub mod provisioning;
pub mod toggles;

use crate::error::ServerError;
use crate::server::ProvisioningServer;
use errors::ApiError;

/// Build the router for all endpoints
pub fn build_router(server: Arc<ProvisioningServer>) -> Router {
    let admin = Router::new()
        .route("/admin/toggles/:flow_code", get(toggles::list_toggles_handler))
        .route(
            "/admin/toggles/:flow_code/:step_code",
            get(toggles::get_toggle_handler).put(toggles::put_toggle_handler),
        )
        .route_layer(middleware::from_fn_with_state(server.clone(), admin_auth));

    Router::new()
        .route("/provisioning/signup", post(provisioning::signup_handler))
        .route("/health", get(health::health_check))
        .merge(admin)
        .layer(TraceLayer::new_for_http())
        .with_state(server)
}

/// Bearer token check for the admin routes
async fn admin_auth(State(server): State<Arc<ProvisioningServer>>, request: Request, next: Next) -> Response {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    if server.validate_admin_token(token) {
        return next.run(request).await;
    }

    ApiError::from(ServerError::Unauthorized(
        "Invalid or missing authentication token".to_string(),
    ))
    .into_response()
}
