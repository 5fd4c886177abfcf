//! Provisioning harness: scripted handlers plus an in-memory toggle store.

use onboard_core::{
    CoreError, FlowRuleToggleService, HandlerKind, OrchestratorBuilder, OrchestratorConfig,
    ProvisioningContext, ProvisioningEventHandler, ProvisioningOrchestrator, ProvisioningStep, SignupCommand,
    ToggleService, FLOW_CODE,
};
use onboard_state_inmemory::InMemoryFlowRuleToggleRepository;
use std::sync::Arc;
use std::time::Duration;

use crate::implementations::{CallRecorder, HandlerScript, ScriptedHandler};

/// A well-formed signup command
pub fn valid_command() -> SignupCommand {
    SignupCommand::new("new.user@example.com", "correct-horse", "web")
}

/// Test fixture owning the toggle store, the handler fake and the wiring
pub struct ProvisioningHarness {
    toggles: Arc<FlowRuleToggleService>,
    handler: ScriptedHandler,
    wired: Vec<HandlerKind>,
    config: OrchestratorConfig,
    event_handler: Option<Arc<dyn ProvisioningEventHandler>>,
}

impl Default for ProvisioningHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl ProvisioningHarness {
    /// All nine handlers wired, every toggle missing (enabled)
    pub fn new() -> Self {
        Self::with_script(HandlerScript::default())
    }

    pub fn with_script(script: HandlerScript) -> Self {
        let repository = Arc::new(InMemoryFlowRuleToggleRepository::new());
        Self {
            toggles: Arc::new(FlowRuleToggleService::new(repository)),
            handler: ScriptedHandler::with_script(script),
            wired: HandlerKind::ALL.to_vec(),
            config: OrchestratorConfig::default(),
            event_handler: None,
        }
    }

    /// Wire only the given handlers
    pub fn wire_only(mut self, kinds: &[HandlerKind]) -> Self {
        self.wired = kinds.to_vec();
        self
    }

    /// Leave one handler unwired
    pub fn unwire(mut self, kind: HandlerKind) -> Self {
        self.wired.retain(|wired| *wired != kind);
        self
    }

    pub fn with_step_timeout(mut self, timeout: Duration) -> Self {
        self.config = OrchestratorConfig::with_step_timeout(timeout);
        self
    }

    pub fn with_event_handler(mut self, event_handler: Arc<dyn ProvisioningEventHandler>) -> Self {
        self.event_handler = Some(event_handler);
        self
    }

    pub fn handler(&self) -> &ScriptedHandler {
        &self.handler
    }

    pub fn recorder(&self) -> &CallRecorder {
        self.handler.recorder()
    }

    pub fn toggles(&self) -> Arc<FlowRuleToggleService> {
        self.toggles.clone()
    }

    /// Switch a provisioning step off
    pub async fn disable(&self, step: ProvisioningStep) -> Result<(), CoreError> {
        self.toggles
            .set_step_toggle(FLOW_CODE, step.code(), false, "disabled by test")
            .await
            .map(|_| ())
    }

    /// Switch a provisioning step back on
    pub async fn enable(&self, step: ProvisioningStep) -> Result<(), CoreError> {
        self.toggles
            .set_step_toggle(FLOW_CODE, step.code(), true, "")
            .await
            .map(|_| ())
    }

    /// Build an orchestrator over the current wiring
    pub fn orchestrator(&self) -> Result<ProvisioningOrchestrator, CoreError> {
        let mut builder = OrchestratorBuilder::new()
            .with_toggle_service(self.toggles.clone())
            .with_handlers(self.handler.handlers_for(&self.wired))
            .with_config(self.config.clone());
        if let Some(event_handler) = &self.event_handler {
            builder = builder.with_event_handler(event_handler.clone());
        }
        builder.build()
    }

    /// Run the orchestrator once with `command`
    pub async fn run(&self, command: SignupCommand) -> Result<ProvisioningContext, CoreError> {
        self.orchestrator()?.run(command).await
    }

    /// Run the orchestrator once with [`valid_command`]
    pub async fn run_default(&self) -> Result<ProvisioningContext, CoreError> {
        self.run(valid_command()).await
    }
}
