/// Provisioning step sequence
pub mod step;

/// Provisioning context accumulator
pub mod context;

/// Signup command
pub mod command;

/// Handler result types
pub mod results;

/// Flow rule toggles
pub mod toggle;

/// Provisioning events
pub mod events;

/// Repository interfaces
pub mod repository;
