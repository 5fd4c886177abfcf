//! Bridges provisioning events to metrics.

use async_trait::async_trait;

use onboard_core::{CoreError, ProvisioningEvent, ProvisioningEventHandler};

use crate::metrics::ProvisioningMetrics;

/// Event handler that turns provisioning events into metrics, then hands
/// the event on to an optional inner handler (usually the tracing one).
pub struct MetricsEventHandler {
    metrics: ProvisioningMetrics,
    inner: Option<std::sync::Arc<dyn ProvisioningEventHandler>>,
}

impl MetricsEventHandler {
    /// Record through `metrics` only
    pub fn new(metrics: ProvisioningMetrics) -> Self {
        Self { metrics, inner: None }
    }

    /// Also forward every event to `inner`
    pub fn with_inner(mut self, inner: std::sync::Arc<dyn ProvisioningEventHandler>) -> Self {
        self.inner = Some(inner);
        self
    }
}

#[async_trait]
impl ProvisioningEventHandler for MetricsEventHandler {
    async fn handle_event(&self, event: &ProvisioningEvent) -> Result<(), CoreError> {
        match event {
            ProvisioningEvent::RunStarted { .. } => {}
            ProvisioningEvent::StepSkipped { step, reason, .. } => {
                self.metrics.record_step(step.code(), reason.as_str());
            }
            ProvisioningEvent::StepCompleted { step, duration, .. } => {
                self.metrics.record_step(step.code(), "completed");
                self.metrics.record_step_duration(step.code(), *duration);
            }
            ProvisioningEvent::StepFailed { step, .. } => {
                self.metrics.record_step(step.code(), "failed");
                self.metrics.record_run("failed");
            }
            ProvisioningEvent::RunCompleted { .. } => {
                self.metrics.record_run("completed");
            }
        }

        match &self.inner {
            Some(inner) => inner.handle_event(event).await,
            None => Ok(()),
        }
    }
}
