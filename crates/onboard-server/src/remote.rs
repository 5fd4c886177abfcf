//! HTTP-backed step handlers
//!
//! A handler configured with a URL is served by a downstream service: the
//! adapter POSTs the command (signup) or the current context (every other
//! step) as JSON and decodes the step's result type from the response.

use async_trait::async_trait;
use onboard_core::{
    ActivateTenantHandler, ActivateTenantResult, AssignPlanHandler, AssignPlanResult, ChargeHandler,
    ChargePaymentResult, CoreError, CreateQuoteResult, CreateTenantHandler, CreateTenantResult, HandlerKind,
    ProvisioningContext, ProvisioningHandlers, QuoteHandler, ResolveSubscriptionHandler, ResolveSubscriptionResult,
    SigninHandler, SigninResult, SignupCommand, SignupHandler, SignupResult, VerifyEmailHandler, VerifyEmailResult,
};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};

/// A step handler served by a downstream HTTP endpoint
#[derive(Debug, Clone)]
pub struct RemoteHandler {
    kind: HandlerKind,
    url: String,
    client: Client,
}

impl RemoteHandler {
    /// Create a handler with its own HTTP client
    pub fn new(kind: HandlerKind, url: impl Into<String>, timeout: Duration) -> ServerResult<Self> {
        Ok(Self::with_client(kind, url, http_client(timeout)?))
    }

    /// Create a handler sharing an existing HTTP client
    pub fn with_client(kind: HandlerKind, url: impl Into<String>, client: Client) -> Self {
        Self {
            kind,
            url: url.into(),
            client,
        }
    }

    /// Which port this handler serves
    pub fn kind(&self) -> HandlerKind {
        self.kind
    }

    /// Endpoint the handler posts to
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call<B, R>(&self, body: &B) -> Result<R, CoreError>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        debug!(handler = %self.kind, url = %self.url, "Calling remote handler");

        let response = self.client.post(&self.url).json(body).send().await.map_err(|e| {
            warn!(handler = %self.kind, error = %e, "Remote handler unreachable");
            CoreError::ExternalDependencyError(format!("{} handler unreachable: {}", self.kind, e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = failure_message(status, &body);
            warn!(handler = %self.kind, %status, %message, "Remote handler rejected the call");
            return Err(map_failure(status, message));
        }

        response.json::<R>().await.map_err(|e| {
            CoreError::ExternalDependencyError(format!("{} handler returned an invalid body: {}", self.kind, e))
        })
    }
}

fn http_client(timeout: Duration) -> ServerResult<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ServerError::ConfigError(format!("Failed to create HTTP client: {}", e)))
}

/// 409 and 402 keep their meaning; any other non-2xx is a plain handler failure
fn map_failure(status: StatusCode, message: String) -> CoreError {
    match status {
        StatusCode::CONFLICT => CoreError::Conflict(message),
        StatusCode::PAYMENT_REQUIRED => CoreError::PaymentDeclined(message),
        _ => CoreError::HandlerError(message),
    }
}

/// Prefer a `message` or `detail` field from a JSON body, then the raw text,
/// then the status reason
fn failure_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for field in ["message", "detail", "error"] {
            if let Some(text) = value.get(field).and_then(Value::as_str) {
                return text.to_string();
            }
        }
    }

    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }

    status.canonical_reason().unwrap_or("request failed").to_string()
}

#[async_trait]
impl SignupHandler for RemoteHandler {
    async fn signup(&self, command: &SignupCommand) -> Result<SignupResult, CoreError> {
        self.call(command).await
    }
}

#[async_trait]
impl VerifyEmailHandler for RemoteHandler {
    async fn verify_email(&self, context: &ProvisioningContext) -> Result<VerifyEmailResult, CoreError> {
        self.call(context).await
    }
}

#[async_trait]
impl SigninHandler for RemoteHandler {
    async fn signin(&self, context: &ProvisioningContext) -> Result<SigninResult, CoreError> {
        self.call(context).await
    }
}

#[async_trait]
impl CreateTenantHandler for RemoteHandler {
    async fn create_tenant(&self, context: &ProvisioningContext) -> Result<CreateTenantResult, CoreError> {
        self.call(context).await
    }
}

#[async_trait]
impl ResolveSubscriptionHandler for RemoteHandler {
    async fn resolve_subscription(
        &self,
        context: &ProvisioningContext,
    ) -> Result<ResolveSubscriptionResult, CoreError> {
        self.call(context).await
    }
}

#[async_trait]
impl AssignPlanHandler for RemoteHandler {
    async fn assign_plan(&self, context: &ProvisioningContext) -> Result<AssignPlanResult, CoreError> {
        self.call(context).await
    }
}

#[async_trait]
impl QuoteHandler for RemoteHandler {
    async fn quote(&self, context: &ProvisioningContext) -> Result<CreateQuoteResult, CoreError> {
        self.call(context).await
    }
}

#[async_trait]
impl ChargeHandler for RemoteHandler {
    async fn charge(&self, context: &ProvisioningContext) -> Result<ChargePaymentResult, CoreError> {
        self.call(context).await
    }
}

#[async_trait]
impl ActivateTenantHandler for RemoteHandler {
    async fn activate_tenant(&self, context: &ProvisioningContext) -> Result<ActivateTenantResult, CoreError> {
        self.call(context).await
    }
}

/// Wire a remote handler for every handler URL in the configuration
///
/// Handlers without a URL stay unwired, so their steps are skipped.
pub fn build_remote_handlers(config: &ServerConfig) -> ServerResult<ProvisioningHandlers> {
    let client = http_client(config.handler_http_timeout())?;
    let mut handlers = ProvisioningHandlers::new();

    for kind in HandlerKind::ALL {
        let Some(url) = config.handler_url(kind) else {
            continue;
        };
        info!(handler = %kind, %url, "Wiring remote handler");

        let remote = Arc::new(RemoteHandler::with_client(kind, url, client.clone()));
        match kind {
            HandlerKind::Signup => handlers.signup = Some(remote),
            HandlerKind::VerifyEmail => handlers.verify_email = Some(remote),
            HandlerKind::Signin => handlers.signin = Some(remote),
            HandlerKind::CreateTenant => handlers.create_tenant = Some(remote),
            HandlerKind::ResolveSubscription => handlers.resolve_subscription = Some(remote),
            HandlerKind::AssignPlan => handlers.assign_plan = Some(remote),
            HandlerKind::Quote => handlers.quote = Some(remote),
            HandlerKind::Charge => handlers.charge = Some(remote),
            HandlerKind::ActivateTenant => handlers.activate_tenant = Some(remote),
        }
    }

    Ok(handlers)
}
