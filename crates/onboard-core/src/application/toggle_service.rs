//! Toggle service
//!
//! Reads and writes per-step toggles through a [`FlowRuleToggleRepository`].
//! A missing toggle means "enabled" so newly added steps are live until
//! someone switches them off.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::repository::FlowRuleToggleRepository;
use crate::domain::toggle::{normalize_code, FlowRuleToggle};
use crate::CoreError;

/// Step gating consulted by the orchestrator and the admin API
#[async_trait]
pub trait ToggleService: Send + Sync {
    /// Whether a step may run; `true` when no toggle is stored
    async fn is_step_enabled(&self, flow_code: &str, step_code: &str) -> Result<bool, CoreError>;

    /// Upsert a toggle and return the persisted value
    async fn set_step_toggle(
        &self,
        flow_code: &str,
        step_code: &str,
        enabled: bool,
        description: &str,
    ) -> Result<FlowRuleToggle, CoreError>;

    /// Read a stored toggle
    async fn get_toggle(&self, flow_code: &str, step_code: &str) -> Result<Option<FlowRuleToggle>, CoreError>;

    /// All stored toggles of a flow
    async fn list_toggles(&self, flow_code: &str) -> Result<Vec<FlowRuleToggle>, CoreError>;
}

/// [`ToggleService`] backed by a toggle repository
#[derive(Clone)]
pub struct FlowRuleToggleService {
    repository: Arc<dyn FlowRuleToggleRepository>,
}

impl FlowRuleToggleService {
    /// Create a new toggle service
    pub fn new(repository: Arc<dyn FlowRuleToggleRepository>) -> Self {
        Self { repository }
    }

    /// Check the underlying store
    pub async fn health_check(&self) -> Result<bool, CoreError> {
        self.repository.health_check().await
    }
}

fn require_code(kind: &str, code: &str) -> Result<String, CoreError> {
    let normalized = normalize_code(code);
    if normalized.is_empty() {
        return Err(CoreError::ValidationError(format!("{} code must not be empty", kind)));
    }
    Ok(normalized)
}

#[async_trait]
impl ToggleService for FlowRuleToggleService {
    async fn is_step_enabled(&self, flow_code: &str, step_code: &str) -> Result<bool, CoreError> {
        let flow = normalize_code(flow_code);
        let step = normalize_code(step_code);

        let enabled = match self.repository.find(&flow, &step).await? {
            Some(toggle) => toggle.is_enabled,
            None => true,
        };

        debug!(flow_code = %flow, step_code = %step, enabled, "Resolved step toggle");
        Ok(enabled)
    }

    async fn set_step_toggle(
        &self,
        flow_code: &str,
        step_code: &str,
        enabled: bool,
        description: &str,
    ) -> Result<FlowRuleToggle, CoreError> {
        let flow = require_code("flow", flow_code)?;
        let step = require_code("step", step_code)?;

        let stored = self
            .repository
            .upsert(FlowRuleToggle::new(flow, step, enabled, description))
            .await?;

        info!(
            flow_code = %stored.flow_code,
            step_code = %stored.step_code,
            enabled = stored.is_enabled,
            "Step toggle updated"
        );
        Ok(stored)
    }

    async fn get_toggle(&self, flow_code: &str, step_code: &str) -> Result<Option<FlowRuleToggle>, CoreError> {
        self.repository
            .find(&normalize_code(flow_code), &normalize_code(step_code))
            .await
    }

    async fn list_toggles(&self, flow_code: &str) -> Result<Vec<FlowRuleToggle>, CoreError> {
        self.repository.list_for_flow(&normalize_code(flow_code)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    // Minimal store keyed by the raw codes it receives, so the tests prove the
    // service normalizes before calling it
    struct MockToggleRepository {
        store: Mutex<HashMap<(String, String), FlowRuleToggle>>,
    }

    impl MockToggleRepository {
        fn new() -> Self {
            Self {
                store: Mutex::new(HashMap::new()),
            }
        }
    }

    #[async_trait]
    impl FlowRuleToggleRepository for MockToggleRepository {
        async fn find(&self, flow_code: &str, step_code: &str) -> Result<Option<FlowRuleToggle>, CoreError> {
            let store = self.store.lock().unwrap();
            Ok(store.get(&(flow_code.to_string(), step_code.to_string())).cloned())
        }

        async fn upsert(&self, toggle: FlowRuleToggle) -> Result<FlowRuleToggle, CoreError> {
            let mut store = self.store.lock().unwrap();
            store.insert((toggle.flow_code.clone(), toggle.step_code.clone()), toggle.clone());
            Ok(toggle)
        }

        async fn list_for_flow(&self, flow_code: &str) -> Result<Vec<FlowRuleToggle>, CoreError> {
            let store = self.store.lock().unwrap();
            let mut toggles: Vec<FlowRuleToggle> = store
                .values()
                .filter(|t| t.flow_code == flow_code)
                .cloned()
                .collect();
            toggles.sort_by(|a, b| a.step_code.cmp(&b.step_code));
            Ok(toggles)
        }
    }

    struct UnavailableToggleRepository;

    #[async_trait]
    impl FlowRuleToggleRepository for UnavailableToggleRepository {
        async fn find(&self, _flow_code: &str, _step_code: &str) -> Result<Option<FlowRuleToggle>, CoreError> {
            Err(CoreError::ToggleStoreError("connection refused".to_string()))
        }

        async fn upsert(&self, _toggle: FlowRuleToggle) -> Result<FlowRuleToggle, CoreError> {
            Err(CoreError::ToggleStoreError("connection refused".to_string()))
        }

        async fn list_for_flow(&self, _flow_code: &str) -> Result<Vec<FlowRuleToggle>, CoreError> {
            Err(CoreError::ToggleStoreError("connection refused".to_string()))
        }

        async fn health_check(&self) -> Result<bool, CoreError> {
            Ok(false)
        }
    }

    fn service() -> FlowRuleToggleService {
        FlowRuleToggleService::new(Arc::new(MockToggleRepository::new()))
    }

    #[tokio::test]
    async fn test_missing_toggle_fails_open() {
        let service = service();
        for step in ["signup", "activate_tenant", "never_seen_before"] {
            assert!(service.is_step_enabled("provisioning", step).await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_set_then_read_ignores_case_and_padding() {
        let service = service();

        let stored = service
            .set_step_toggle(" Provisioning ", "Quote_Payment", false, "billing freeze")
            .await
            .unwrap();
        assert_eq!(stored.flow_code, "provisioning");
        assert_eq!(stored.step_code, "quote_payment");
        assert_eq!(stored.description, "billing freeze");

        assert!(!service.is_step_enabled("PROVISIONING", "  quote_payment").await.unwrap());
        assert!(!service.is_step_enabled("provisioning", "QUOTE_PAYMENT").await.unwrap());

        service
            .set_step_toggle("provisioning", "quote_payment", true, "")
            .await
            .unwrap();
        assert!(service.is_step_enabled("Provisioning", "Quote_Payment").await.unwrap());
    }

    #[tokio::test]
    async fn test_get_and_list_toggles() {
        let service = service();
        service.set_step_toggle("provisioning", "signin", false, "").await.unwrap();
        service.set_step_toggle("provisioning", "assign_plan", true, "").await.unwrap();
        service.set_step_toggle("billing", "charge", false, "").await.unwrap();

        let toggle = service.get_toggle("PROVISIONING", "SIGNIN").await.unwrap();
        assert_eq!(toggle.map(|t| t.is_enabled), Some(false));
        assert!(service.get_toggle("provisioning", "signup").await.unwrap().is_none());

        let toggles = service.list_toggles("provisioning").await.unwrap();
        let codes: Vec<&str> = toggles.iter().map(|t| t.step_code.as_str()).collect();
        assert_eq!(codes, vec!["assign_plan", "signin"]);
    }

    #[tokio::test]
    async fn test_rejects_empty_codes() {
        let service = service();
        let result = service.set_step_toggle("  ", "signup", false, "").await;
        assert!(matches!(result, Err(CoreError::ValidationError(_))));

        let result = service.set_step_toggle("provisioning", "", false, "").await;
        assert!(matches!(result, Err(CoreError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_store_errors_propagate() {
        let service = FlowRuleToggleService::new(Arc::new(UnavailableToggleRepository));

        let result = service.is_step_enabled("provisioning", "signup").await;
        assert!(matches!(result, Err(CoreError::ToggleStoreError(_))));

        let result = service.set_step_toggle("provisioning", "signup", true, "").await;
        assert!(matches!(result, Err(CoreError::ToggleStoreError(_))));

        assert!(!service.health_check().await.unwrap());
    }
}
