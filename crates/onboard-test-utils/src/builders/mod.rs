//! Builders for wiring an orchestrator in tests.

mod harness;

pub use harness::*;
