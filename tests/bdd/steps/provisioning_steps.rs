use cucumber::{given, then, when};
use onboard_core::{CoreError, HandlerKind};

use crate::steps::world::{handler_kind, provisioning_step, ProvisioningWorld};

#[given("every handler is wired")]
async fn every_handler_wired(world: &mut ProvisioningWorld) {
    world.wired = HandlerKind::ALL.to_vec();
}

#[given(expr = "only the {string} handler is wired")]
async fn only_handler_wired(world: &mut ProvisioningWorld, name: String) {
    world.wired = vec![handler_kind(&name)];
}

#[given(expr = "the {string} handler is not wired")]
async fn handler_not_wired(world: &mut ProvisioningWorld, name: String) {
    let kind = handler_kind(&name);
    world.wired.retain(|wired| *wired != kind);
}

#[given(expr = "signup returns user {string} requiring verification")]
async fn signup_requires_verification(world: &mut ProvisioningWorld, user_id: String) {
    world.script.user_id = user_id;
    world.script.verify_required = true;
}

#[given(expr = "the assigned plan is {string} and free")]
async fn free_plan(world: &mut ProvisioningWorld, plan_code: String) {
    world.script.plan_code = plan_code;
    world.script.requires_payment = false;
}

#[given(expr = "the assigned plan is {string} and requires payment")]
async fn paid_plan(world: &mut ProvisioningWorld, plan_code: String) {
    world.script.plan_code = plan_code;
    world.script.requires_payment = true;
}

#[given(expr = "the {string} step is disabled")]
async fn step_disabled(world: &mut ProvisioningWorld, code: String) {
    world.disabled.push(provisioning_step(&code));
}

#[given(expr = "the {string} handler fails with {string}")]
async fn handler_fails(world: &mut ProvisioningWorld, name: String, message: String) {
    world.failure = Some((handler_kind(&name), CoreError::HandlerError(message)));
}

#[given(expr = "the charge is declined with {string}")]
async fn charge_declined(world: &mut ProvisioningWorld, message: String) {
    world.failure = Some((HandlerKind::Charge, CoreError::PaymentDeclined(message)));
}

#[when(expr = "{string} signs up")]
async fn user_signs_up(world: &mut ProvisioningWorld, email: String) {
    world.run_signup(&email).await;
}

#[then(expr = "the user id is {string}")]
async fn user_id_is(world: &mut ProvisioningWorld, expected: String) {
    assert_eq!(world.context().user_id.as_deref(), Some(expected.as_str()));
}

#[then("no tenant was created")]
async fn no_tenant(world: &mut ProvisioningWorld) {
    assert!(world.context().tenant_id.is_none());
}

#[then(expr = "the tenant id is {string}")]
async fn tenant_id_is(world: &mut ProvisioningWorld, expected: String) {
    assert_eq!(world.context().tenant_id.as_deref(), Some(expected.as_str()));
}

#[then(expr = "metadata {string} is {string}")]
async fn metadata_is(world: &mut ProvisioningWorld, key: String, expected: String) {
    assert_eq!(world.context().metadata_value(&key), Some(expected.as_str()));
}

#[then(expr = "metadata {string} is absent")]
async fn metadata_absent(world: &mut ProvisioningWorld, key: String) {
    assert_eq!(world.context().metadata_value(&key), None);
}

#[then("no quote was created")]
async fn no_quote(world: &mut ProvisioningWorld) {
    assert!(world.context().quote_id.is_none());
}

#[then(expr = "the quote id is {string}")]
async fn quote_id_is(world: &mut ProvisioningWorld, expected: String) {
    assert_eq!(world.context().quote_id.as_deref(), Some(expected.as_str()));
}

#[then(expr = "the {string} handler was not called")]
async fn handler_not_called(world: &mut ProvisioningWorld, name: String) {
    let kind = handler_kind(&name);
    assert!(!world.calls().contains(&kind), "{} was called: {:?}", name, world.calls());
}

#[then(expr = "the handlers were called in order {string}")]
async fn handlers_called_in_order(world: &mut ProvisioningWorld, order: String) {
    let expected: Vec<HandlerKind> = order.split(',').map(|name| handler_kind(name.trim())).collect();
    assert_eq!(world.calls(), expected);
}

#[then(expr = "the run fails with a handler error {string}")]
async fn run_fails_with_handler_error(world: &mut ProvisioningWorld, message: String) {
    assert_eq!(world.error(), &CoreError::HandlerError(message));
}

#[then("the run fails with a declined payment")]
async fn run_fails_with_declined_payment(world: &mut ProvisioningWorld) {
    assert!(matches!(world.error(), CoreError::PaymentDeclined(_)));
}
