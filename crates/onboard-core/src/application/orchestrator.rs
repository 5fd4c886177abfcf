//! Provisioning orchestrator
//!
//! Walks the eight provisioning steps in their fixed order, consulting the
//! toggle service before each one and folding handler results into a single
//! [`ProvisioningContext`]. A handler error aborts the run and is returned to
//! the caller unchanged. Steps that already ran are not compensated: a created
//! user or a captured payment stays in place.

use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info_span, warn, Instrument};
use uuid::Uuid;

use crate::application::handlers::ProvisioningHandlers;
use crate::application::toggle_service::ToggleService;
use crate::domain::command::SignupCommand;
use crate::domain::context::{metadata_keys, ProvisioningContext};
use crate::domain::events::{ProvisioningEvent, ProvisioningEventHandler, SkipReason, TracingEventHandler};
use crate::domain::step::{ProvisioningStep, FLOW_CODE};
use crate::CoreError;

/// Runtime settings for the orchestrator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Upper bound for each handler call; `None` waits indefinitely
    pub step_timeout: Option<Duration>,
}

impl OrchestratorConfig {
    /// Bound every handler call by `timeout`
    pub fn with_step_timeout(timeout: Duration) -> Self {
        Self {
            step_timeout: Some(timeout),
        }
    }
}

/// What a visited step did to the context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StepOutcome {
    Applied,
    Skipped(SkipReason),
}

/// Drives a signup through the fixed provisioning sequence
pub struct ProvisioningOrchestrator {
    toggles: Arc<dyn ToggleService>,
    handlers: ProvisioningHandlers,
    config: OrchestratorConfig,
    event_handler: Arc<dyn ProvisioningEventHandler>,
}

impl ProvisioningOrchestrator {
    /// Create an orchestrator with the default configuration and a tracing event handler
    pub fn new(toggles: Arc<dyn ToggleService>, handlers: ProvisioningHandlers) -> Self {
        Self {
            toggles,
            handlers,
            config: OrchestratorConfig::default(),
            event_handler: Arc::new(TracingEventHandler),
        }
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the event handler
    pub fn with_event_handler(mut self, event_handler: Arc<dyn ProvisioningEventHandler>) -> Self {
        self.event_handler = event_handler;
        self
    }

    /// Handlers wired into this orchestrator
    pub fn handlers(&self) -> &ProvisioningHandlers {
        &self.handlers
    }

    /// Active configuration
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Run every step once, in order, and return the resulting context.
    ///
    /// There is no success flag: callers read the populated fields. The first
    /// handler or toggle store error ends the run.
    pub async fn run(&self, command: SignupCommand) -> Result<ProvisioningContext, CoreError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("provisioning_run", %run_id, source = %command.source);

        async move {
            let started = Instant::now();
            self.emit(ProvisioningEvent::RunStarted {
                run_id,
                source: command.source.clone(),
                timestamp: Utc::now(),
            })
            .await;

            let mut context = ProvisioningContext::new();
            for step in ProvisioningStep::ALL {
                self.execute_step(run_id, step, &command, &mut context).await?;
            }

            self.emit(ProvisioningEvent::RunCompleted {
                run_id,
                duration: started.elapsed(),
                timestamp: Utc::now(),
            })
            .await;

            Ok(context)
        }
        .instrument(span)
        .await
    }

    async fn execute_step(
        &self,
        run_id: Uuid,
        step: ProvisioningStep,
        command: &SignupCommand,
        context: &mut ProvisioningContext,
    ) -> Result<(), CoreError> {
        let enabled = match self.toggles.is_step_enabled(FLOW_CODE, step.code()).await {
            Ok(enabled) => enabled,
            Err(error) => {
                warn!(%step, error = %error, "Toggle lookup failed");
                self.emit_failed(run_id, step, &error).await;
                return Err(error);
            }
        };

        if !enabled {
            self.emit_skipped(run_id, step, SkipReason::Disabled).await;
            return Ok(());
        }

        let started = Instant::now();
        let outcome = match step {
            ProvisioningStep::Signup => self.signup(command, context).await,
            ProvisioningStep::VerifyEmail => self.verify_email(context).await,
            ProvisioningStep::Signin => self.signin(context).await,
            ProvisioningStep::CreateTenant => self.create_tenant(context).await,
            ProvisioningStep::ResolveSubscription => self.resolve_subscription(context).await,
            ProvisioningStep::AssignPlan => self.assign_plan(context).await,
            ProvisioningStep::QuotePayment => self.quote_payment(context).await,
            ProvisioningStep::ActivateTenant => self.activate_tenant(context).await,
        };

        match outcome {
            Ok(StepOutcome::Applied) => {
                self.emit(ProvisioningEvent::StepCompleted {
                    run_id,
                    step,
                    duration: started.elapsed(),
                    timestamp: Utc::now(),
                })
                .await;
                Ok(())
            }
            Ok(StepOutcome::Skipped(reason)) => {
                self.emit_skipped(run_id, step, reason).await;
                Ok(())
            }
            Err(error) => {
                self.emit_failed(run_id, step, &error).await;
                Err(error)
            }
        }
    }

    async fn signup(&self, command: &SignupCommand, context: &mut ProvisioningContext) -> Result<StepOutcome, CoreError> {
        let Some(handler) = &self.handlers.signup else {
            return Ok(StepOutcome::Skipped(SkipReason::Unhandled));
        };

        let result = self.invoke(ProvisioningStep::Signup, handler.signup(command)).await?;
        context.user_id = Some(result.user_id);
        context.set_metadata(metadata_keys::VERIFY_REQUIRED, result.verify_required);
        Ok(StepOutcome::Applied)
    }

    async fn verify_email(&self, context: &mut ProvisioningContext) -> Result<StepOutcome, CoreError> {
        let Some(handler) = &self.handlers.verify_email else {
            return Ok(StepOutcome::Skipped(SkipReason::Unhandled));
        };

        let result = self
            .invoke(ProvisioningStep::VerifyEmail, handler.verify_email(context))
            .await?;
        context.set_metadata(metadata_keys::EMAIL_VERIFIED, result.verified);
        Ok(StepOutcome::Applied)
    }

    async fn signin(&self, context: &mut ProvisioningContext) -> Result<StepOutcome, CoreError> {
        let Some(handler) = &self.handlers.signin else {
            return Ok(StepOutcome::Skipped(SkipReason::Unhandled));
        };

        let result = self.invoke(ProvisioningStep::Signin, handler.signin(context)).await?;
        context.user_id = Some(result.user_id);
        context.session_id = Some(result.session_id);
        Ok(StepOutcome::Applied)
    }

    async fn create_tenant(&self, context: &mut ProvisioningContext) -> Result<StepOutcome, CoreError> {
        let Some(handler) = &self.handlers.create_tenant else {
            return Ok(StepOutcome::Skipped(SkipReason::Unhandled));
        };

        let result = self
            .invoke(ProvisioningStep::CreateTenant, handler.create_tenant(context))
            .await?;
        context.tenant_id = Some(result.tenant_id);
        context.set_metadata(metadata_keys::TENANT_STATUS, result.status);
        Ok(StepOutcome::Applied)
    }

    async fn resolve_subscription(&self, context: &mut ProvisioningContext) -> Result<StepOutcome, CoreError> {
        let Some(handler) = &self.handlers.resolve_subscription else {
            return Ok(StepOutcome::Skipped(SkipReason::Unhandled));
        };

        let result = self
            .invoke(ProvisioningStep::ResolveSubscription, handler.resolve_subscription(context))
            .await?;
        context.subscription_status = Some(result.status);
        if let Some(trial_days) = result.trial_days {
            context.set_metadata(metadata_keys::TRIAL_DAYS, trial_days);
        }
        Ok(StepOutcome::Applied)
    }

    async fn assign_plan(&self, context: &mut ProvisioningContext) -> Result<StepOutcome, CoreError> {
        let Some(handler) = &self.handlers.assign_plan else {
            return Ok(StepOutcome::Skipped(SkipReason::Unhandled));
        };

        let result = self
            .invoke(ProvisioningStep::AssignPlan, handler.assign_plan(context))
            .await?;
        context.plan_code = Some(result.plan_code);
        context.requires_payment = result.requires_payment;
        context.set_metadata(metadata_keys::REQUIRES_PAYMENT, result.requires_payment);
        Ok(StepOutcome::Applied)
    }

    /// Quote then charge, only when the assigned plan requires payment.
    /// The step toggle decides whether this branch is considered at all.
    async fn quote_payment(&self, context: &mut ProvisioningContext) -> Result<StepOutcome, CoreError> {
        if !context.requires_payment {
            return Ok(StepOutcome::Skipped(SkipReason::PaymentNotRequired));
        }
        if self.handlers.quote.is_none() && self.handlers.charge.is_none() {
            return Ok(StepOutcome::Skipped(SkipReason::Unhandled));
        }

        if let Some(handler) = &self.handlers.quote {
            let quote = self
                .invoke(ProvisioningStep::QuotePayment, handler.quote(context))
                .await?;
            context.quote_id = Some(quote.quote_id);
            context.set_metadata(metadata_keys::QUOTE_AMOUNT, quote.amount);
            context.set_metadata(metadata_keys::QUOTE_CURRENCY, quote.currency);
        } else {
            debug!("No quote handler wired, charging without a quote");
        }

        if let Some(handler) = &self.handlers.charge {
            let charge = self
                .invoke(ProvisioningStep::QuotePayment, handler.charge(context))
                .await?;
            context.set_metadata(metadata_keys::PAYMENT_SUCCESS, charge.success);
            if let Some(transaction_id) = charge.transaction_id {
                context.set_metadata(metadata_keys::TRANSACTION_ID, transaction_id);
            }
        } else {
            debug!("No charge handler wired, quote left uncharged");
        }

        Ok(StepOutcome::Applied)
    }

    async fn activate_tenant(&self, context: &mut ProvisioningContext) -> Result<StepOutcome, CoreError> {
        let Some(handler) = &self.handlers.activate_tenant else {
            return Ok(StepOutcome::Skipped(SkipReason::Unhandled));
        };

        let result = self
            .invoke(ProvisioningStep::ActivateTenant, handler.activate_tenant(context))
            .await?;
        context.set_metadata(metadata_keys::ACTIVATION_STATUS, result.status);
        Ok(StepOutcome::Applied)
    }

    /// Await a handler call, bounded by the configured step timeout
    async fn invoke<T, F>(&self, step: ProvisioningStep, call: F) -> Result<T, CoreError>
    where
        F: Future<Output = Result<T, CoreError>>,
    {
        match self.config.step_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| CoreError::StepTimeout {
                    step,
                    timeout_ms: timeout_millis(limit),
                })?,
            None => call.await,
        }
    }

    async fn emit_skipped(&self, run_id: Uuid, step: ProvisioningStep, reason: SkipReason) {
        self.emit(ProvisioningEvent::StepSkipped {
            run_id,
            step,
            reason,
            timestamp: Utc::now(),
        })
        .await;
    }

    async fn emit_failed(&self, run_id: Uuid, step: ProvisioningStep, error: &CoreError) {
        self.emit(ProvisioningEvent::StepFailed {
            run_id,
            step,
            error: error.clone(),
            timestamp: Utc::now(),
        })
        .await;
    }

    async fn emit(&self, event: ProvisioningEvent) {
        if let Err(err) = self.event_handler.handle_event(&event).await {
            warn!(event_type = event.event_type(), error = %err, "Provisioning event handler failed");
        }
    }
}

/// Milliseconds of `limit`, saturating at `u64::MAX`
fn timeout_millis(limit: Duration) -> u64 {
    u64::try_from(limit.as_millis()).unwrap_or(u64::MAX)
}
