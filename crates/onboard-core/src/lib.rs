//!
//! Onboard Core - provisioning orchestration for the Onboard platform
//!
//! This crate defines the provisioning step sequence, the context it builds,
//! the handler ports each service domain implements and the toggle service
//! that gates every step. The orchestrator ties them together.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Domain layer - provisioning models and ports
pub mod domain;

/// Application services - toggles, handlers and orchestration
pub mod application;

/// Error types
pub mod error;

pub use error::CoreError;

// Domain re-exports
pub use domain::command::SignupCommand;
pub use domain::context::{metadata_keys, ProvisioningContext};
pub use domain::events::{ProvisioningEvent, ProvisioningEventHandler, SkipReason, TracingEventHandler};
pub use domain::repository::FlowRuleToggleRepository;
pub use domain::results::{
    ActivateTenantResult, AssignPlanResult, ChargePaymentResult, CreateQuoteResult, CreateTenantResult,
    ResolveSubscriptionResult, SigninResult, SignupResult, VerifyEmailResult,
};
pub use domain::step::{ProvisioningStep, FLOW_CODE};
pub use domain::toggle::{normalize_code, toggle_key, FlowRuleToggle};

// Application re-exports
pub use application::handlers::{
    ActivateTenantHandler, AssignPlanHandler, ChargeHandler, CreateTenantHandler, HandlerKind,
    ProvisioningHandlers, QuoteHandler, ResolveSubscriptionHandler, SigninHandler, SignupHandler,
    VerifyEmailHandler,
};
pub use application::orchestrator::{OrchestratorConfig, ProvisioningOrchestrator};
pub use application::provider::{create_toggle_repository_factory, OrchestratorBuilder};
pub use application::toggle_service::{FlowRuleToggleService, ToggleService};
