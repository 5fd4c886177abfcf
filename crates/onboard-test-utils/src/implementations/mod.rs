//! Test implementations (fakes) of the provisioning handler ports.
//!
//! Higher fidelity than mocks: every handler answers from a shared script and
//! records what it saw, so tests can check both ordering and the context each
//! step received.

pub mod call_recorder;
pub mod scripted_handler;

pub use call_recorder::*;
pub use scripted_handler::*;
