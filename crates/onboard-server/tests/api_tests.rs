use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use async_trait::async_trait;
use onboard_core::{CoreError, FlowRuleToggle, FlowRuleToggleRepository, HandlerKind, ProvisioningStep};
use onboard_server::{api::build_router, create_server, create_server_with_repository, ServerConfig};
use onboard_test_utils::{HandlerScript, ScriptedHandler};

const ADMIN_KEY: &str = "test-admin-key";

struct TestContext {
    app: Router,
    handler: ScriptedHandler,
}

async fn setup_with(script: HandlerScript, kinds: &[HandlerKind]) -> TestContext {
    let config = ServerConfig {
        admin_api_key: Some(ADMIN_KEY.to_string()),
        ..Default::default()
    };

    let handler = ScriptedHandler::with_script(script);
    let server = create_server(config, handler.handlers_for(kinds))
        .await
        .expect("server should build");

    TestContext {
        app: build_router(Arc::new(server)),
        handler,
    }
}

async fn setup() -> TestContext {
    setup_with(HandlerScript::default(), &HandlerKind::ALL).await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn signup_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/provisioning/signup")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn admin_request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", ADMIN_KEY));

    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn valid_body() -> String {
    json!({"email": "new.user@example.com", "password": "correct-horse", "source": "web"}).to_string()
}

#[tokio::test]
async fn test_signup_returns_created_context() {
    let ctx = setup().await;

    let (status, body) = send(&ctx.app, signup_request(&valid_body())).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["user_id"], json!("u1"));
    assert_eq!(body["data"]["tenant_id"], json!("t1"));
    assert_eq!(body["data"]["session_id"], json!("s1"));
    assert_eq!(body["data"]["quote_id"], json!(null));
    assert_eq!(body["data"]["metadata"]["activation_status"], json!("active"));
    assert_eq!(ctx.handler.recorder().count(HandlerKind::Quote), 0);
}

#[tokio::test]
async fn test_signup_source_defaults_to_web() {
    let ctx = setup().await;

    let body = json!({"email": "new.user@example.com", "password": "correct-horse"}).to_string();
    let (status, _) = send(&ctx.app, signup_request(&body)).await;

    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_signup_validation_error() {
    let ctx = setup().await;

    let body = json!({"email": "not-an-email", "password": "correct-horse"}).to_string();
    let (status, body) = send(&ctx.app, signup_request(&body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"]["code"], json!("VALIDATION_ERROR"));
    assert!(body["message"].as_str().unwrap().contains("invalid email"));
    assert!(ctx.handler.recorder().calls().is_empty());
}

#[tokio::test]
async fn test_signup_malformed_json() {
    let ctx = setup().await;

    let (status, body) = send(&ctx.app, signup_request("{not json")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"]["code"], json!("BAD_REQUEST"));
}

#[tokio::test]
async fn test_signup_conflict_maps_to_409() {
    let ctx = setup().await;
    ctx.handler
        .fail_on(HandlerKind::Signup, CoreError::Conflict("email already registered".to_string()));

    let (status, body) = send(&ctx.app, signup_request(&valid_body())).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], json!("CONFLICT"));
    assert_eq!(body["error"]["detail"], json!("email already registered"));
}

#[tokio::test]
async fn test_signup_payment_declined_maps_to_402() {
    let ctx = setup_with(HandlerScript::paid_plan("pro"), &HandlerKind::ALL).await;
    ctx.handler
        .fail_on(HandlerKind::Charge, CoreError::PaymentDeclined("insufficient funds".to_string()));

    let (status, body) = send(&ctx.app, signup_request(&valid_body())).await;

    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body["error"]["code"], json!("PAYMENT_DECLINED"));
    assert!(!ctx.handler.recorder().was_called(HandlerKind::ActivateTenant));
}

#[tokio::test]
async fn test_signup_handler_error_maps_to_400() {
    let ctx = setup().await;
    ctx.handler
        .fail_on(HandlerKind::CreateTenant, CoreError::HandlerError("tenant quota".to_string()));

    let (status, body) = send(&ctx.app, signup_request(&valid_body())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!("HANDLER_ERROR"));
}

#[tokio::test]
async fn test_admin_requires_token() {
    let ctx = setup().await;

    let request = Request::builder()
        .uri("/admin/toggles/provisioning")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&ctx.app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], json!("UNAUTHORIZED"));

    let request = Request::builder()
        .uri("/admin/toggles/provisioning")
        .header("authorization", "Bearer wrong")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&ctx.app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_missing_toggle_is_404() {
    let ctx = setup().await;

    let (status, body) = send(&ctx.app, admin_request("GET", "/admin/toggles/provisioning/signin", None)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], json!("NOT_FOUND"));
}

#[tokio::test]
async fn test_put_toggle_disables_step() {
    let ctx = setup().await;

    let (status, body) = send(
        &ctx.app,
        admin_request(
            "PUT",
            "/admin/toggles/Provisioning/CREATE_TENANT",
            Some(json!({"enabled": false, "description": "tenancy outage"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["flow_code"], json!("provisioning"));
    assert_eq!(body["step_code"], json!(ProvisioningStep::CreateTenant.code()));
    assert_eq!(body["is_enabled"], json!(false));

    let (status, body) = send(&ctx.app, admin_request("GET", "/admin/toggles/provisioning/create_tenant", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], json!("tenancy outage"));

    let (status, body) = send(&ctx.app, admin_request("GET", "/admin/toggles/provisioning", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["toggles"].as_array().unwrap().len(), 1);

    let (status, body) = send(&ctx.app, signup_request(&valid_body())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["tenant_id"], json!(null));
    assert!(!ctx.handler.recorder().was_called(HandlerKind::CreateTenant));
    assert!(ctx.handler.recorder().was_called(HandlerKind::ActivateTenant));
}

#[tokio::test]
async fn test_put_toggle_rejects_blank_step() {
    let ctx = setup().await;

    let (status, body) = send(
        &ctx.app,
        admin_request("PUT", "/admin/toggles/provisioning/%20", Some(json!({"enabled": true}))),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!("VALIDATION_ERROR"));
}

#[tokio::test]
async fn test_health_reports_store_and_handlers() {
    let ctx = setup_with(HandlerScript::default(), &[HandlerKind::Signup, HandlerKind::Charge]).await;

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(&ctx.app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("UP"));
    assert_eq!(body["dependencies"]["toggleStore"]["status"], json!("UP"));
    assert_eq!(body["handlers"], json!(["signup", "charge"]));
}

#[tokio::test]
async fn test_unknown_toggle_store_fails_to_build() {
    let config = ServerConfig {
        toggle_store_url: "redis://localhost".to_string(),
        ..Default::default()
    };

    let result = create_server(config, ScriptedHandler::new().handlers()).await;
    assert!(result.is_err());
}

/// Toggle store whose backend cannot be reached
struct UnreachableToggleStore {
    health: Result<bool, CoreError>,
}

impl UnreachableToggleStore {
    fn app(health: Result<bool, CoreError>) -> Router {
        let config = ServerConfig {
            admin_api_key: Some(ADMIN_KEY.to_string()),
            ..Default::default()
        };
        let server =
            create_server_with_repository(config, Arc::new(Self { health }), ScriptedHandler::new().handlers())
                .expect("server should build");
        build_router(Arc::new(server))
    }

    fn error() -> CoreError {
        CoreError::ToggleStoreError("connection refused".to_string())
    }
}

#[async_trait]
impl FlowRuleToggleRepository for UnreachableToggleStore {
    async fn find(&self, _flow_code: &str, _step_code: &str) -> Result<Option<FlowRuleToggle>, CoreError> {
        Err(Self::error())
    }

    async fn upsert(&self, _toggle: FlowRuleToggle) -> Result<FlowRuleToggle, CoreError> {
        Err(Self::error())
    }

    async fn list_for_flow(&self, _flow_code: &str) -> Result<Vec<FlowRuleToggle>, CoreError> {
        Err(Self::error())
    }

    async fn health_check(&self) -> Result<bool, CoreError> {
        match &self.health {
            Ok(healthy) => Ok(*healthy),
            Err(_) => Err(Self::error()),
        }
    }
}

#[tokio::test]
async fn test_health_is_503_when_store_is_down() {
    let app = UnreachableToggleStore::app(Err(UnreachableToggleStore::error()));

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], json!("DOWN"));
    assert_eq!(body["dependencies"]["toggleStore"]["status"], json!("DOWN"));
}

#[tokio::test]
async fn test_health_is_503_when_store_is_degraded() {
    let app = UnreachableToggleStore::app(Ok(false));

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], json!("DOWN"));
    assert_eq!(body["dependencies"]["toggleStore"]["status"], json!("DEGRADED"));
}

#[tokio::test]
async fn test_signup_is_503_when_store_is_down() {
    let app = UnreachableToggleStore::app(Err(UnreachableToggleStore::error()));

    let (status, body) = send(&app, signup_request(&valid_body())).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], json!("TOGGLE_STORE_ERROR"));
}

#[tokio::test]
async fn test_server_without_metrics_still_serves() {
    let config = ServerConfig {
        metrics_enabled: false,
        ..Default::default()
    };
    let handler = ScriptedHandler::new();
    let server = create_server(config, handler.handlers()).await.expect("server should build");
    let app = build_router(Arc::new(server));

    let (status, _) = send(&app, signup_request(&valid_body())).await;
    assert_eq!(status, StatusCode::CREATED);
}
