//! A single fake that implements all nine handler ports.

use async_trait::async_trait;
use onboard_core::{
    ActivateTenantHandler, ActivateTenantResult, AssignPlanHandler, AssignPlanResult, ChargeHandler,
    ChargePaymentResult, CoreError, CreateQuoteResult, CreateTenantHandler, CreateTenantResult, HandlerKind,
    ProvisioningContext, ProvisioningHandlers, QuoteHandler, ResolveSubscriptionHandler,
    ResolveSubscriptionResult, SigninHandler, SigninResult, SignupCommand, SignupHandler, SignupResult,
    VerifyEmailHandler, VerifyEmailResult,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::call_recorder::CallRecorder;

/// Canned answers returned by [`ScriptedHandler`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerScript {
    pub user_id: String,
    pub verify_required: bool,
    pub email_verified: bool,
    pub session_id: String,
    pub tenant_id: String,
    pub tenant_status: String,
    pub subscription_status: String,
    pub trial_days: Option<u32>,
    pub plan_code: String,
    pub requires_payment: bool,
    pub quote_id: String,
    pub quote_amount: String,
    pub quote_currency: String,
    pub payment_success: bool,
    pub transaction_id: Option<String>,
    pub activation_status: String,
}

impl Default for HandlerScript {
    fn default() -> Self {
        Self {
            user_id: "u1".to_string(),
            verify_required: true,
            email_verified: true,
            session_id: "s1".to_string(),
            tenant_id: "t1".to_string(),
            tenant_status: "created".to_string(),
            subscription_status: "trialing".to_string(),
            trial_days: Some(14),
            plan_code: "free".to_string(),
            requires_payment: false,
            quote_id: "q1".to_string(),
            quote_amount: "49.00".to_string(),
            quote_currency: "USD".to_string(),
            payment_success: true,
            transaction_id: Some("tx1".to_string()),
            activation_status: "active".to_string(),
        }
    }
}

impl HandlerScript {
    /// Assign a paid plan so quote and charge run
    pub fn paid_plan(plan_code: &str) -> Self {
        Self {
            plan_code: plan_code.to_string(),
            requires_payment: true,
            ..Self::default()
        }
    }
}

/// Handler fake answering from a [`HandlerScript`]
///
/// Clones share the recorder, the failure table and the delay table.
#[derive(Debug, Clone, Default)]
pub struct ScriptedHandler {
    script: Arc<HandlerScript>,
    recorder: CallRecorder,
    failures: Arc<Mutex<HashMap<HandlerKind, CoreError>>>,
    delays: Arc<Mutex<HashMap<HandlerKind, Duration>>>,
}

impl ScriptedHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(script: HandlerScript) -> Self {
        Self {
            script: Arc::new(script),
            ..Self::default()
        }
    }

    pub fn script(&self) -> &HandlerScript {
        &self.script
    }

    pub fn recorder(&self) -> &CallRecorder {
        &self.recorder
    }

    /// Make `kind` return `error` instead of its scripted result
    pub fn fail_on(&self, kind: HandlerKind, error: CoreError) {
        self.failures.lock().insert(kind, error);
    }

    /// Make `kind` sleep before answering
    pub fn delay(&self, kind: HandlerKind, delay: Duration) {
        self.delays.lock().insert(kind, delay);
    }

    /// Wire this fake for every handler kind
    pub fn handlers(&self) -> ProvisioningHandlers {
        self.handlers_for(&HandlerKind::ALL)
    }

    /// Wire this fake for the given kinds only
    pub fn handlers_for(&self, kinds: &[HandlerKind]) -> ProvisioningHandlers {
        let mut handlers = ProvisioningHandlers::new();
        for kind in kinds {
            let this = Arc::new(self.clone());
            match kind {
                HandlerKind::Signup => handlers.signup = Some(this),
                HandlerKind::VerifyEmail => handlers.verify_email = Some(this),
                HandlerKind::Signin => handlers.signin = Some(this),
                HandlerKind::CreateTenant => handlers.create_tenant = Some(this),
                HandlerKind::ResolveSubscription => handlers.resolve_subscription = Some(this),
                HandlerKind::AssignPlan => handlers.assign_plan = Some(this),
                HandlerKind::Quote => handlers.quote = Some(this),
                HandlerKind::Charge => handlers.charge = Some(this),
                HandlerKind::ActivateTenant => handlers.activate_tenant = Some(this),
            }
        }
        handlers
    }

    async fn enter(&self, kind: HandlerKind, context: &ProvisioningContext) -> Result<(), CoreError> {
        debug!(handler = %kind, "Scripted handler invoked");
        self.recorder.record(kind, context);

        let delay = self.delays.lock().get(&kind).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failure = self.failures.lock().get(&kind).cloned();
        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SignupHandler for ScriptedHandler {
    async fn signup(&self, _command: &SignupCommand) -> Result<SignupResult, CoreError> {
        self.enter(HandlerKind::Signup, &ProvisioningContext::new()).await?;
        Ok(SignupResult {
            user_id: self.script.user_id.clone(),
            verify_required: self.script.verify_required,
        })
    }
}

#[async_trait]
impl VerifyEmailHandler for ScriptedHandler {
    async fn verify_email(&self, context: &ProvisioningContext) -> Result<VerifyEmailResult, CoreError> {
        self.enter(HandlerKind::VerifyEmail, context).await?;
        Ok(VerifyEmailResult {
            verified: self.script.email_verified,
        })
    }
}

#[async_trait]
impl SigninHandler for ScriptedHandler {
    async fn signin(&self, context: &ProvisioningContext) -> Result<SigninResult, CoreError> {
        self.enter(HandlerKind::Signin, context).await?;
        Ok(SigninResult {
            user_id: context.user_id.clone().unwrap_or_else(|| self.script.user_id.clone()),
            session_id: self.script.session_id.clone(),
        })
    }
}

#[async_trait]
impl CreateTenantHandler for ScriptedHandler {
    async fn create_tenant(&self, context: &ProvisioningContext) -> Result<CreateTenantResult, CoreError> {
        self.enter(HandlerKind::CreateTenant, context).await?;
        Ok(CreateTenantResult {
            tenant_id: self.script.tenant_id.clone(),
            status: self.script.tenant_status.clone(),
        })
    }
}

#[async_trait]
impl ResolveSubscriptionHandler for ScriptedHandler {
    async fn resolve_subscription(
        &self,
        context: &ProvisioningContext,
    ) -> Result<ResolveSubscriptionResult, CoreError> {
        self.enter(HandlerKind::ResolveSubscription, context).await?;
        Ok(ResolveSubscriptionResult {
            status: self.script.subscription_status.clone(),
            trial_days: self.script.trial_days,
        })
    }
}

#[async_trait]
impl AssignPlanHandler for ScriptedHandler {
    async fn assign_plan(&self, context: &ProvisioningContext) -> Result<AssignPlanResult, CoreError> {
        self.enter(HandlerKind::AssignPlan, context).await?;
        Ok(AssignPlanResult {
            plan_code: self.script.plan_code.clone(),
            requires_payment: self.script.requires_payment,
        })
    }
}

#[async_trait]
impl QuoteHandler for ScriptedHandler {
    async fn quote(&self, context: &ProvisioningContext) -> Result<CreateQuoteResult, CoreError> {
        self.enter(HandlerKind::Quote, context).await?;
        Ok(CreateQuoteResult {
            quote_id: self.script.quote_id.clone(),
            amount: self.script.quote_amount.clone(),
            currency: self.script.quote_currency.clone(),
        })
    }
}

#[async_trait]
impl ChargeHandler for ScriptedHandler {
    async fn charge(&self, context: &ProvisioningContext) -> Result<ChargePaymentResult, CoreError> {
        self.enter(HandlerKind::Charge, context).await?;
        Ok(ChargePaymentResult {
            success: self.script.payment_success,
            transaction_id: self.script.transaction_id.clone(),
        })
    }
}

#[async_trait]
impl ActivateTenantHandler for ScriptedHandler {
    async fn activate_tenant(&self, context: &ProvisioningContext) -> Result<ActivateTenantResult, CoreError> {
        self.enter(HandlerKind::ActivateTenant, context).await?;
        Ok(ActivateTenantResult {
            status: self.script.activation_status.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_failure_is_returned_after_recording() {
        let handler = ScriptedHandler::new();
        handler.fail_on(HandlerKind::CreateTenant, CoreError::Conflict("slug taken".to_string()));

        let result = handler.create_tenant(&ProvisioningContext::new()).await;
        assert_eq!(result, Err(CoreError::Conflict("slug taken".to_string())));
        assert!(handler.recorder().was_called(HandlerKind::CreateTenant));
    }

    #[test]
    fn test_handlers_for_subset() {
        let handler = ScriptedHandler::new();
        let handlers = handler.handlers_for(&[HandlerKind::Signup, HandlerKind::Quote]);
        assert_eq!(handlers.wired(), vec![HandlerKind::Signup, HandlerKind::Quote]);
        assert_eq!(handler.handlers().wired().len(), 9);
    }

    #[tokio::test]
    async fn test_clones_share_recorder() {
        let handler = ScriptedHandler::with_script(HandlerScript::paid_plan("pro"));
        let clone = handler.clone();

        let plan = clone.assign_plan(&ProvisioningContext::new()).await.unwrap();
        assert!(plan.requires_payment);
        assert_eq!(plan.plan_code, "pro");
        assert_eq!(handler.recorder().calls(), vec![HandlerKind::AssignPlan]);
    }
}
