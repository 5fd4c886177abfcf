//! Orchestrator assembly
//!
//! Deployments wire whichever handlers they have; everything else stays
//! unwired and its step is skipped.

use std::sync::Arc;
use tracing::{error, info};

use crate::application::handlers::{
    ActivateTenantHandler, AssignPlanHandler, ChargeHandler, CreateTenantHandler, HandlerKind,
    ProvisioningHandlers, QuoteHandler, ResolveSubscriptionHandler, SigninHandler, SignupHandler,
    VerifyEmailHandler,
};
use crate::application::orchestrator::{OrchestratorConfig, ProvisioningOrchestrator};
use crate::application::toggle_service::ToggleService;
use crate::domain::events::ProvisioningEventHandler;
use crate::domain::repository::FlowRuleToggleRepository;
use crate::CoreError;

/// Fluent builder for [`ProvisioningOrchestrator`]
#[derive(Default)]
pub struct OrchestratorBuilder {
    toggles: Option<Arc<dyn ToggleService>>,
    handlers: ProvisioningHandlers,
    config: OrchestratorConfig,
    event_handler: Option<Arc<dyn ProvisioningEventHandler>>,
}

impl OrchestratorBuilder {
    /// Start with nothing wired
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle service consulted before each step (required)
    pub fn with_toggle_service(mut self, toggles: Arc<dyn ToggleService>) -> Self {
        self.toggles = Some(toggles);
        self
    }

    /// Replace the whole handler set
    pub fn with_handlers(mut self, handlers: ProvisioningHandlers) -> Self {
        self.handlers = handlers;
        self
    }

    /// Wire the signup handler
    pub fn with_signup(mut self, handler: Arc<dyn SignupHandler>) -> Self {
        self.handlers.signup = Some(handler);
        self
    }

    /// Wire the verify email handler
    pub fn with_verify_email(mut self, handler: Arc<dyn VerifyEmailHandler>) -> Self {
        self.handlers.verify_email = Some(handler);
        self
    }

    /// Wire the signin handler
    pub fn with_signin(mut self, handler: Arc<dyn SigninHandler>) -> Self {
        self.handlers.signin = Some(handler);
        self
    }

    /// Wire the create tenant handler
    pub fn with_create_tenant(mut self, handler: Arc<dyn CreateTenantHandler>) -> Self {
        self.handlers.create_tenant = Some(handler);
        self
    }

    /// Wire the resolve subscription handler
    pub fn with_resolve_subscription(mut self, handler: Arc<dyn ResolveSubscriptionHandler>) -> Self {
        self.handlers.resolve_subscription = Some(handler);
        self
    }

    /// Wire the assign plan handler
    pub fn with_assign_plan(mut self, handler: Arc<dyn AssignPlanHandler>) -> Self {
        self.handlers.assign_plan = Some(handler);
        self
    }

    /// Wire the quote handler
    pub fn with_quote(mut self, handler: Arc<dyn QuoteHandler>) -> Self {
        self.handlers.quote = Some(handler);
        self
    }

    /// Wire the charge handler
    pub fn with_charge(mut self, handler: Arc<dyn ChargeHandler>) -> Self {
        self.handlers.charge = Some(handler);
        self
    }

    /// Wire the activate tenant handler
    pub fn with_activate_tenant(mut self, handler: Arc<dyn ActivateTenantHandler>) -> Self {
        self.handlers.activate_tenant = Some(handler);
        self
    }

    /// Orchestrator settings
    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Event sink; defaults to the tracing handler
    pub fn with_event_handler(mut self, event_handler: Arc<dyn ProvisioningEventHandler>) -> Self {
        self.event_handler = Some(event_handler);
        self
    }

    /// Handler kinds wired so far
    pub fn wired_handlers(&self) -> Vec<HandlerKind> {
        self.handlers.wired()
    }

    /// Build the orchestrator
    pub fn build(self) -> Result<ProvisioningOrchestrator, CoreError> {
        let toggles = self.toggles.ok_or_else(|| {
            CoreError::ConfigurationError("A toggle service is required to build the orchestrator".to_string())
        })?;

        let wired: Vec<&str> = self.handlers.wired().iter().map(|kind| kind.name()).collect();
        info!(handlers = ?wired, step_timeout = ?self.config.step_timeout, "Building provisioning orchestrator");

        let orchestrator = ProvisioningOrchestrator::new(toggles, self.handlers).with_config(self.config);
        Ok(match self.event_handler {
            Some(event_handler) => orchestrator.with_event_handler(event_handler),
            None => orchestrator,
        })
    }
}

/// Create a toggle repository factory
///
/// The returned function picks a store from a URL. Only `memory://` is known
/// here; the server layers `postgres://` on top.
///
/// # Arguments
///
/// * `in_memory_factory` - Function creating an in-memory repository
pub fn create_toggle_repository_factory<F, R>(
    in_memory_factory: F,
) -> impl Fn(&str) -> Result<Arc<dyn FlowRuleToggleRepository>, CoreError> + Send + Sync
where
    F: Fn() -> R + Send + Sync + 'static,
    R: FlowRuleToggleRepository + 'static,
{
    move |url: &str| -> Result<Arc<dyn FlowRuleToggleRepository>, CoreError> {
        if url.starts_with("memory://") {
            info!("Creating in-memory toggle repository");
            Ok(Arc::new(in_memory_factory()))
        } else {
            error!("Unsupported toggle store URL: {}", url);
            Err(CoreError::ConfigurationError(format!(
                "Unsupported toggle store URL: {}",
                url
            )))
        }
    }
}
