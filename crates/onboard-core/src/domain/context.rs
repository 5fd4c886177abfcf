//! The accumulator threaded through one provisioning run.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metadata keys, grouped by the step that owns them.
///
/// A step writes only its own keys and never removes keys written earlier.
pub mod metadata_keys {
    /// signup: whether the identity service wants the email confirmed
    pub const VERIFY_REQUIRED: &str = "verify_required";
    /// verify_email: outcome of the email confirmation
    pub const EMAIL_VERIFIED: &str = "email_verified";
    /// create_tenant: status reported by the tenancy service
    pub const TENANT_STATUS: &str = "tenant_status";
    /// resolve_subscription: trial length, only when one was granted
    pub const TRIAL_DAYS: &str = "trial_days";
    /// assign_plan: mirror of `requires_payment`
    pub const REQUIRES_PAYMENT: &str = "requires_payment";
    /// quote_payment: quoted amount
    pub const QUOTE_AMOUNT: &str = "quote_amount";
    /// quote_payment: quote currency
    pub const QUOTE_CURRENCY: &str = "quote_currency";
    /// quote_payment: charge outcome
    pub const PAYMENT_SUCCESS: &str = "payment_success";
    /// quote_payment: gateway transaction, only when reported
    pub const TRANSACTION_ID: &str = "transaction_id";
    /// activate_tenant: activation status
    pub const ACTIVATION_STATUS: &str = "activation_status";
}

/// Identifiers and scratch metadata produced by the provisioning steps.
///
/// A `None` field means the owning step did not run: it was disabled, had no
/// handler wired, or was skipped because payment was not required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisioningContext {
    /// Set by signup (and confirmed by signin)
    pub user_id: Option<String>,

    /// Set by create_tenant
    pub tenant_id: Option<String>,

    /// Set by signin
    pub session_id: Option<String>,

    /// Set by assign_plan
    pub plan_code: Option<String>,

    /// Set by resolve_subscription
    pub subscription_status: Option<String>,

    /// Set by the quote half of quote_payment
    pub quote_id: Option<String>,

    /// Set by assign_plan; gates quote_payment
    #[serde(default)]
    pub requires_payment: bool,

    /// Reserved; the provisioning flow never writes it
    pub product_id: Option<String>,

    /// Step-owned string entries, see [`metadata_keys`]
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl ProvisioningContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a metadata entry
    pub fn set_metadata(&mut self, key: &str, value: impl ToString) {
        self.metadata.insert(key.to_string(), value.to_string());
    }

    /// Read a metadata entry
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Whether tenant creation happened during this run
    pub fn has_tenant(&self) -> bool {
        self.tenant_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_context_is_empty() {
        let context = ProvisioningContext::new();
        assert!(context.user_id.is_none());
        assert!(!context.requires_payment);
        assert!(context.metadata.is_empty());
        assert!(!context.has_tenant());
    }

    #[test]
    fn test_metadata_stringifies_values() {
        let mut context = ProvisioningContext::new();
        context.set_metadata(metadata_keys::VERIFY_REQUIRED, true);
        context.set_metadata(metadata_keys::TRIAL_DAYS, 14u32);

        assert_eq!(context.metadata_value(metadata_keys::VERIFY_REQUIRED), Some("true"));
        assert_eq!(context.metadata_value(metadata_keys::TRIAL_DAYS), Some("14"));
        assert_eq!(context.metadata_value(metadata_keys::PAYMENT_SUCCESS), None);
    }

    #[test]
    fn test_serializes_projection() {
        let mut context = ProvisioningContext::new();
        context.user_id = Some("u1".to_string());
        context.set_metadata(metadata_keys::VERIFY_REQUIRED, false);

        let value = serde_json::to_value(&context).unwrap();
        assert_eq!(value["user_id"], json!("u1"));
        assert_eq!(value["tenant_id"], json!(null));
        assert_eq!(value["requires_payment"], json!(false));
        assert_eq!(value["metadata"]["verify_required"], json!("false"));
    }
}
