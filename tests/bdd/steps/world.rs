use cucumber::World;
use onboard_core::{CoreError, HandlerKind, ProvisioningContext, ProvisioningStep};
use onboard_test_utils::{HandlerScript, ProvisioningHarness};
use std::fmt;

/// State shared by the steps of one scenario
#[derive(World)]
#[world(init = Self::new)]
pub struct ProvisioningWorld {
    pub script: HandlerScript,
    pub wired: Vec<HandlerKind>,
    pub disabled: Vec<ProvisioningStep>,
    pub failure: Option<(HandlerKind, CoreError)>,
    pub harness: Option<ProvisioningHarness>,
    pub result: Option<Result<ProvisioningContext, CoreError>>,
}

impl ProvisioningWorld {
    fn new() -> Self {
        Self {
            script: HandlerScript::default(),
            wired: HandlerKind::ALL.to_vec(),
            disabled: Vec::new(),
            failure: None,
            harness: None,
            result: None,
        }
    }

    /// Build the harness from the scenario setup and run one signup
    pub async fn run_signup(&mut self, email: &str) {
        let harness = ProvisioningHarness::with_script(self.script.clone()).wire_only(&self.wired);
        for step in &self.disabled {
            harness.disable(*step).await.expect("toggle store accepts writes");
        }
        if let Some((kind, error)) = &self.failure {
            harness.handler().fail_on(*kind, error.clone());
        }

        let command = onboard_core::SignupCommand::new(email, "correct-horse", "web");
        self.result = Some(harness.run(command).await);
        self.harness = Some(harness);
    }

    pub fn context(&self) -> &ProvisioningContext {
        match &self.result {
            Some(Ok(context)) => context,
            other => panic!("expected a successful run, got {:?}", other),
        }
    }

    pub fn error(&self) -> &CoreError {
        match &self.result {
            Some(Err(error)) => error,
            other => panic!("expected a failed run, got {:?}", other),
        }
    }

    pub fn calls(&self) -> Vec<HandlerKind> {
        self.harness
            .as_ref()
            .map(|harness| harness.recorder().calls())
            .unwrap_or_default()
    }
}

impl fmt::Debug for ProvisioningWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvisioningWorld")
            .field("wired", &self.wired)
            .field("disabled", &self.disabled)
            .field("failure", &self.failure)
            .field("result", &self.result)
            .finish()
    }
}

/// `"verify_email"` -> [`HandlerKind::VerifyEmail`]
pub fn handler_kind(name: &str) -> HandlerKind {
    HandlerKind::ALL
        .into_iter()
        .find(|kind| kind.name() == name)
        .unwrap_or_else(|| panic!("unknown handler {}", name))
}

/// `"quote_payment"` -> [`ProvisioningStep::QuotePayment`]
pub fn provisioning_step(code: &str) -> ProvisioningStep {
    ProvisioningStep::ALL
        .into_iter()
        .find(|step| step.code() == code)
        .unwrap_or_else(|| panic!("unknown step {}", code))
}
