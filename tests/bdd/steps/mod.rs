pub mod provisioning_steps;
pub mod world;
