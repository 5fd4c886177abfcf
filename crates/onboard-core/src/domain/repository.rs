//! Repository traits for the Onboard core
//!
//! External crates implement these traits to provide different persistence
//! mechanisms for the toggle store.

use async_trait::async_trait;

use super::toggle::FlowRuleToggle;
use crate::CoreError;

/// Persistence for flow rule toggles.
///
/// Implementations must normalize both codes (see
/// [`normalize_code`](super::toggle::normalize_code)) before storage and lookup,
/// and must be safe under concurrent access.
#[async_trait]
pub trait FlowRuleToggleRepository: Send + Sync {
    /// Find the toggle for a (flow, step) pair
    async fn find(&self, flow_code: &str, step_code: &str) -> Result<Option<FlowRuleToggle>, CoreError>;

    /// Insert or replace a toggle and return the stored value
    async fn upsert(&self, toggle: FlowRuleToggle) -> Result<FlowRuleToggle, CoreError>;

    /// All toggles of a flow, ordered by step code
    async fn list_for_flow(&self, flow_code: &str) -> Result<Vec<FlowRuleToggle>, CoreError>;

    /// Health check for the store
    async fn health_check(&self) -> Result<bool, CoreError> {
        Ok(true)
    }
}
