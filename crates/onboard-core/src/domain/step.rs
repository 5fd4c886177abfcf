//! The fixed provisioning step sequence.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::toggle::normalize_code;
use crate::CoreError;

/// Flow code under which the provisioning steps are toggled
pub const FLOW_CODE: &str = "provisioning";

/// One ordered stage of the provisioning flow.
///
/// The order is fixed at compile time by [`ProvisioningStep::ALL`]. Toggles can
/// suppress individual steps but can never reorder them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisioningStep {
    /// Register the account
    Signup,
    /// Confirm the email address
    VerifyEmail,
    /// Open a session for the new user
    Signin,
    /// Create the tenant record
    CreateTenant,
    /// Resolve the subscription (trial or paid)
    ResolveSubscription,
    /// Assign the pricing plan
    AssignPlan,
    /// Quote and charge, only when the plan requires payment
    QuotePayment,
    /// Activate the tenant
    ActivateTenant,
}

impl ProvisioningStep {
    /// Every step in execution order
    pub const ALL: [ProvisioningStep; 8] = [
        ProvisioningStep::Signup,
        ProvisioningStep::VerifyEmail,
        ProvisioningStep::Signin,
        ProvisioningStep::CreateTenant,
        ProvisioningStep::ResolveSubscription,
        ProvisioningStep::AssignPlan,
        ProvisioningStep::QuotePayment,
        ProvisioningStep::ActivateTenant,
    ];

    /// Stable step code used as the toggle key
    pub fn code(&self) -> &'static str {
        match self {
            ProvisioningStep::Signup => "signup",
            ProvisioningStep::VerifyEmail => "verify_email",
            ProvisioningStep::Signin => "signin",
            ProvisioningStep::CreateTenant => "create_tenant",
            ProvisioningStep::ResolveSubscription => "resolve_subscription",
            ProvisioningStep::AssignPlan => "assign_plan",
            ProvisioningStep::QuotePayment => "quote_payment",
            ProvisioningStep::ActivateTenant => "activate_tenant",
        }
    }

    /// Zero-based position in the sequence
    pub fn position(&self) -> usize {
        Self::ALL
            .iter()
            .position(|step| step == self)
            .unwrap_or_default()
    }
}

impl fmt::Display for ProvisioningStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ProvisioningStep {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = normalize_code(s);
        Self::ALL
            .iter()
            .copied()
            .find(|step| step.code() == code)
            .ok_or_else(|| CoreError::ValidationError(format!("Unknown provisioning step: {}", s)))
    }
}
