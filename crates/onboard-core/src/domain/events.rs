use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::step::ProvisioningStep;
use crate::CoreError;

/// Why a step left the context untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Toggle switched off
    Disabled,
    /// No handler wired for this deployment
    Unhandled,
    /// The assigned plan does not require payment
    PaymentNotRequired,
}

impl SkipReason {
    /// Label used in logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::Disabled => "disabled",
            SkipReason::Unhandled => "unhandled",
            SkipReason::PaymentNotRequired => "payment_not_required",
        }
    }
}

/// Something that happened during a provisioning run
#[derive(Debug, Clone, PartialEq)]
pub enum ProvisioningEvent {
    /// A run began
    RunStarted {
        /// Run identifier
        run_id: Uuid,
        /// Source tag of the command
        source: String,
        /// When it happened
        timestamp: DateTime<Utc>,
    },
    /// A step was visited but did nothing
    StepSkipped {
        /// Run identifier
        run_id: Uuid,
        /// Skipped step
        step: ProvisioningStep,
        /// Why it was skipped
        reason: SkipReason,
        /// When it happened
        timestamp: DateTime<Utc>,
    },
    /// A step's handler(s) ran and were folded into the context
    StepCompleted {
        /// Run identifier
        run_id: Uuid,
        /// Completed step
        step: ProvisioningStep,
        /// Time spent in the handler(s)
        duration: Duration,
        /// When it happened
        timestamp: DateTime<Utc>,
    },
    /// A step's handler failed; the run aborts
    StepFailed {
        /// Run identifier
        run_id: Uuid,
        /// Failed step
        step: ProvisioningStep,
        /// Error propagated to the caller
        error: CoreError,
        /// When it happened
        timestamp: DateTime<Utc>,
    },
    /// All eight steps were visited
    RunCompleted {
        /// Run identifier
        run_id: Uuid,
        /// Wall time of the run
        duration: Duration,
        /// When it happened
        timestamp: DateTime<Utc>,
    },
}

impl ProvisioningEvent {
    /// Returns the type of the event as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            ProvisioningEvent::RunStarted { .. } => "provisioning.run_started",
            ProvisioningEvent::StepSkipped { .. } => "provisioning.step_skipped",
            ProvisioningEvent::StepCompleted { .. } => "provisioning.step_completed",
            ProvisioningEvent::StepFailed { .. } => "provisioning.step_failed",
            ProvisioningEvent::RunCompleted { .. } => "provisioning.run_completed",
        }
    }

    /// Run the event belongs to
    pub fn run_id(&self) -> Uuid {
        match self {
            ProvisioningEvent::RunStarted { run_id, .. }
            | ProvisioningEvent::StepSkipped { run_id, .. }
            | ProvisioningEvent::StepCompleted { run_id, .. }
            | ProvisioningEvent::StepFailed { run_id, .. }
            | ProvisioningEvent::RunCompleted { run_id, .. } => *run_id,
        }
    }

    /// Step the event concerns, if any
    pub fn step(&self) -> Option<ProvisioningStep> {
        match self {
            ProvisioningEvent::StepSkipped { step, .. }
            | ProvisioningEvent::StepCompleted { step, .. }
            | ProvisioningEvent::StepFailed { step, .. } => Some(*step),
            _ => None,
        }
    }

    /// Returns the timestamp when the event occurred
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            ProvisioningEvent::RunStarted { timestamp, .. }
            | ProvisioningEvent::StepSkipped { timestamp, .. }
            | ProvisioningEvent::StepCompleted { timestamp, .. }
            | ProvisioningEvent::StepFailed { timestamp, .. }
            | ProvisioningEvent::RunCompleted { timestamp, .. } => *timestamp,
        }
    }
}

/// Receives provisioning events. Failures are logged by the orchestrator and
/// never change the outcome of a run.
#[async_trait]
pub trait ProvisioningEventHandler: Send + Sync {
    /// Handle a provisioning event
    async fn handle_event(&self, event: &ProvisioningEvent) -> Result<(), CoreError>;
}

/// Event handler that writes every event to the tracing log
#[derive(Debug, Default, Clone)]
pub struct TracingEventHandler;

#[async_trait]
impl ProvisioningEventHandler for TracingEventHandler {
    async fn handle_event(&self, event: &ProvisioningEvent) -> Result<(), CoreError> {
        match event {
            ProvisioningEvent::RunStarted { run_id, source, .. } => {
                info!(%run_id, %source, "Provisioning run started");
            }
            ProvisioningEvent::StepSkipped { run_id, step, reason, .. } => {
                debug!(%run_id, %step, reason = reason.as_str(), "Provisioning step skipped");
            }
            ProvisioningEvent::StepCompleted { run_id, step, duration, .. } => {
                info!(%run_id, %step, duration_ms = duration.as_millis() as u64, "Provisioning step completed");
            }
            ProvisioningEvent::StepFailed { run_id, step, error, .. } => {
                warn!(%run_id, %step, %error, "Provisioning step failed");
            }
            ProvisioningEvent::RunCompleted { run_id, duration, .. } => {
                info!(%run_id, duration_ms = duration.as_millis() as u64, "Provisioning run completed");
            }
        }
        Ok(())
    }
}
