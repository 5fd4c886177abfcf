//! Step handler ports
//!
//! Each trait is implemented by a separate bounded context (identity, tenancy,
//! subscription, pricing, billing). Any of them may be left unwired; the
//! orchestrator then treats the step exactly like a disabled one.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::domain::command::SignupCommand;
use crate::domain::context::ProvisioningContext;
use crate::domain::results::{
    ActivateTenantResult, AssignPlanResult, ChargePaymentResult, CreateQuoteResult, CreateTenantResult,
    ResolveSubscriptionResult, SigninResult, SignupResult, VerifyEmailResult,
};
use crate::CoreError;

/// Registers the account
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SignupHandler: Send + Sync {
    /// Create the user from the signup command
    async fn signup(&self, command: &SignupCommand) -> Result<SignupResult, CoreError>;
}

/// Confirms the email address
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VerifyEmailHandler: Send + Sync {
    /// Verify the user's email
    async fn verify_email(&self, context: &ProvisioningContext) -> Result<VerifyEmailResult, CoreError>;
}

/// Opens the first session
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SigninHandler: Send + Sync {
    /// Sign the user in
    async fn signin(&self, context: &ProvisioningContext) -> Result<SigninResult, CoreError>;
}

/// Creates the tenant
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CreateTenantHandler: Send + Sync {
    /// Create the tenant
    async fn create_tenant(&self, context: &ProvisioningContext) -> Result<CreateTenantResult, CoreError>;
}

/// Resolves the subscription
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResolveSubscriptionHandler: Send + Sync {
    /// Resolve the subscription
    async fn resolve_subscription(
        &self,
        context: &ProvisioningContext,
    ) -> Result<ResolveSubscriptionResult, CoreError>;
}

/// Assigns the plan
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssignPlanHandler: Send + Sync {
    /// Assign a plan
    async fn assign_plan(&self, context: &ProvisioningContext) -> Result<AssignPlanResult, CoreError>;
}

/// Prices the plan
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuoteHandler: Send + Sync {
    /// Create a quote
    async fn quote(&self, context: &ProvisioningContext) -> Result<CreateQuoteResult, CoreError>;
}

/// Charges the quote
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChargeHandler: Send + Sync {
    /// Charge the payment
    async fn charge(&self, context: &ProvisioningContext) -> Result<ChargePaymentResult, CoreError>;
}

/// Activates the tenant
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActivateTenantHandler: Send + Sync {
    /// Activate the tenant
    async fn activate_tenant(&self, context: &ProvisioningContext) -> Result<ActivateTenantResult, CoreError>;
}

/// Names of the nine handler ports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    /// [`SignupHandler`]
    Signup,
    /// [`VerifyEmailHandler`]
    VerifyEmail,
    /// [`SigninHandler`]
    Signin,
    /// [`CreateTenantHandler`]
    CreateTenant,
    /// [`ResolveSubscriptionHandler`]
    ResolveSubscription,
    /// [`AssignPlanHandler`]
    AssignPlan,
    /// [`QuoteHandler`]
    Quote,
    /// [`ChargeHandler`]
    Charge,
    /// [`ActivateTenantHandler`]
    ActivateTenant,
}

impl HandlerKind {
    /// Every handler kind in step order
    pub const ALL: [HandlerKind; 9] = [
        HandlerKind::Signup,
        HandlerKind::VerifyEmail,
        HandlerKind::Signin,
        HandlerKind::CreateTenant,
        HandlerKind::ResolveSubscription,
        HandlerKind::AssignPlan,
        HandlerKind::Quote,
        HandlerKind::Charge,
        HandlerKind::ActivateTenant,
    ];

    /// Configuration name of the handler
    pub fn name(&self) -> &'static str {
        match self {
            HandlerKind::Signup => "signup",
            HandlerKind::VerifyEmail => "verify_email",
            HandlerKind::Signin => "signin",
            HandlerKind::CreateTenant => "create_tenant",
            HandlerKind::ResolveSubscription => "resolve_subscription",
            HandlerKind::AssignPlan => "assign_plan",
            HandlerKind::Quote => "quote",
            HandlerKind::Charge => "charge",
            HandlerKind::ActivateTenant => "activate_tenant",
        }
    }
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The set of handlers wired for a deployment
#[derive(Clone, Default)]
pub struct ProvisioningHandlers {
    /// Identity: registration
    pub signup: Option<Arc<dyn SignupHandler>>,
    /// Identity: email confirmation
    pub verify_email: Option<Arc<dyn VerifyEmailHandler>>,
    /// Identity: session
    pub signin: Option<Arc<dyn SigninHandler>>,
    /// Tenancy
    pub create_tenant: Option<Arc<dyn CreateTenantHandler>>,
    /// Subscription
    pub resolve_subscription: Option<Arc<dyn ResolveSubscriptionHandler>>,
    /// Subscription: plan
    pub assign_plan: Option<Arc<dyn AssignPlanHandler>>,
    /// Pricing
    pub quote: Option<Arc<dyn QuoteHandler>>,
    /// Billing
    pub charge: Option<Arc<dyn ChargeHandler>>,
    /// Tenancy: activation
    pub activate_tenant: Option<Arc<dyn ActivateTenantHandler>>,
}

impl ProvisioningHandlers {
    /// No handlers wired
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the handler of the given kind is wired
    pub fn is_wired(&self, kind: HandlerKind) -> bool {
        match kind {
            HandlerKind::Signup => self.signup.is_some(),
            HandlerKind::VerifyEmail => self.verify_email.is_some(),
            HandlerKind::Signin => self.signin.is_some(),
            HandlerKind::CreateTenant => self.create_tenant.is_some(),
            HandlerKind::ResolveSubscription => self.resolve_subscription.is_some(),
            HandlerKind::AssignPlan => self.assign_plan.is_some(),
            HandlerKind::Quote => self.quote.is_some(),
            HandlerKind::Charge => self.charge.is_some(),
            HandlerKind::ActivateTenant => self.activate_tenant.is_some(),
        }
    }

    /// Handler kinds that are wired, in step order
    pub fn wired(&self) -> Vec<HandlerKind> {
        HandlerKind::ALL
            .iter()
            .copied()
            .filter(|kind| self.is_wired(*kind))
            .collect()
    }
}

impl fmt::Debug for ProvisioningHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let wired: Vec<&str> = self.wired().iter().map(|kind| kind.name()).collect();
        f.debug_struct("ProvisioningHandlers").field("wired", &wired).finish()
    }
}
