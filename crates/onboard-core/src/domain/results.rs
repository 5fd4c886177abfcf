//! Result shapes returned by the step handlers.
//!
//! Each carries only what the orchestrator folds into the context.

use serde::{Deserialize, Serialize};

/// Outcome of account registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupResult {
    /// New user identifier
    pub user_id: String,
    /// Whether the email must be confirmed
    pub verify_required: bool,
}

/// Outcome of email confirmation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyEmailResult {
    /// Whether the address is now verified
    pub verified: bool,
}

/// Outcome of the first sign-in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigninResult {
    /// Signed-in user
    pub user_id: String,
    /// Session opened for the user
    pub session_id: String,
}

/// Outcome of tenant creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTenantResult {
    /// New tenant identifier
    pub tenant_id: String,
    /// Tenant status reported by the tenancy service
    pub status: String,
}

/// Outcome of subscription resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveSubscriptionResult {
    /// Subscription status
    pub status: String,
    /// Trial length, when a trial was granted
    #[serde(default)]
    pub trial_days: Option<u32>,
}

/// Outcome of plan assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignPlanResult {
    /// Assigned plan
    pub plan_code: String,
    /// Whether quote and charge must run
    pub requires_payment: bool,
}

/// Outcome of pricing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateQuoteResult {
    /// Quote identifier
    pub quote_id: String,
    /// Decimal amount as rendered by the pricing service, e.g. "49.00"
    pub amount: String,
    /// ISO currency code
    pub currency: String,
}

/// Outcome of billing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargePaymentResult {
    /// Whether the charge went through
    pub success: bool,
    /// Gateway transaction, when one was created
    #[serde(default)]
    pub transaction_id: Option<String>,
}

/// Outcome of tenant activation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivateTenantResult {
    /// Activation status
    pub status: String,
}
