use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use onboard_core::{normalize_code, toggle_key, CoreError, FlowRuleToggle, FlowRuleToggleRepository};

/// In-memory implementation of the FlowRuleToggleRepository
#[derive(Clone, Default)]
pub struct InMemoryFlowRuleToggleRepository {
    toggles: Arc<RwLock<HashMap<String, FlowRuleToggle>>>,
}

impl InMemoryFlowRuleToggleRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository over existing storage
    pub fn with_storage(toggles: Arc<RwLock<HashMap<String, FlowRuleToggle>>>) -> Self {
        Self { toggles }
    }

    /// Create a repository pre-loaded with toggles
    pub fn seeded(toggles: impl IntoIterator<Item = FlowRuleToggle>) -> Self {
        let map = toggles
            .into_iter()
            .map(|toggle| {
                let toggle = FlowRuleToggle::new(
                    &toggle.flow_code,
                    &toggle.step_code,
                    toggle.is_enabled,
                    toggle.description,
                );
                (toggle.key(), toggle)
            })
            .collect();
        Self::with_storage(Arc::new(RwLock::new(map)))
    }

    /// Number of stored toggles
    pub async fn len(&self) -> usize {
        self.toggles.read().await.len()
    }

    /// Whether no toggle is stored
    pub async fn is_empty(&self) -> bool {
        self.toggles.read().await.is_empty()
    }
}

#[async_trait]
impl FlowRuleToggleRepository for InMemoryFlowRuleToggleRepository {
    async fn find(&self, flow_code: &str, step_code: &str) -> Result<Option<FlowRuleToggle>, CoreError> {
        let toggles = self.toggles.read().await;
        Ok(toggles.get(&toggle_key(flow_code, step_code)).cloned())
    }

    async fn upsert(&self, toggle: FlowRuleToggle) -> Result<FlowRuleToggle, CoreError> {
        // Rebuilt so hand-made structs are normalized and freshly stamped
        let stored = FlowRuleToggle::new(
            &toggle.flow_code,
            &toggle.step_code,
            toggle.is_enabled,
            toggle.description,
        );

        debug!(key = %stored.key(), enabled = stored.is_enabled, "Storing toggle in memory");

        let mut toggles = self.toggles.write().await;
        toggles.insert(stored.key(), stored.clone());
        Ok(stored)
    }

    async fn list_for_flow(&self, flow_code: &str) -> Result<Vec<FlowRuleToggle>, CoreError> {
        let flow = normalize_code(flow_code);
        let toggles = self.toggles.read().await;

        let mut result: Vec<FlowRuleToggle> = toggles
            .values()
            .filter(|toggle| toggle.flow_code == flow)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.step_code.cmp(&b.step_code));

        Ok(result)
    }
}
