//! Testing utilities for the Onboard platform.
//!
//! Scripted handler fakes that record every call, a harness that wires them
//! to an in-memory toggle store, and assertion helpers for provisioning
//! contexts.

pub mod assertions;
pub mod builders;
pub mod implementations;

/// Re-export commonly used types for convenience
pub use mockall;

pub use assertions::{assert_call_order, assert_metadata, assert_no_metadata, ContextAssertionError};
pub use builders::{valid_command, ProvisioningHarness};
pub use implementations::{CallRecorder, HandlerScript, ScriptedHandler};
