//! In-memory toggle store for the Onboard platform
//!
//! Implements the toggle repository defined in onboard-core without any
//! persistence. Useful for development, tests and single-node deployments
//! where toggles may reset on restart.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use onboard_core::{FlowRuleToggle, FlowRuleToggleRepository};

pub mod repositories;
pub use repositories::InMemoryFlowRuleToggleRepository;

/// Provider for in-memory toggle repositories
///
/// Repositories created from the same provider share one map, so a toggle
/// written through the admin API is seen by the orchestrator.
#[derive(Clone, Default)]
pub struct InMemoryStateStoreProvider {
    toggles: Arc<RwLock<HashMap<String, FlowRuleToggle>>>,
}

impl InMemoryStateStoreProvider {
    /// Create a new in-memory state store provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a toggle repository backed by the shared map
    pub fn create_toggle_repository(&self) -> Arc<dyn FlowRuleToggleRepository> {
        Arc::new(InMemoryFlowRuleToggleRepository::with_storage(self.toggles.clone()))
    }
}
