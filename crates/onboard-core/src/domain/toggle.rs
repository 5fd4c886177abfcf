//! Flow rule toggles: persisted on/off switches keyed by (flow, step).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalize a flow or step code so toggle identity ignores case and padding
pub fn normalize_code(code: &str) -> String {
    code.trim().to_lowercase()
}

/// A persisted switch controlling whether one step of one flow executes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowRuleToggle {
    /// Normalized flow code
    pub flow_code: String,

    /// Normalized step code
    pub step_code: String,

    /// Whether the step runs
    pub is_enabled: bool,

    /// Operator note explaining the switch
    #[serde(default)]
    pub description: String,

    /// Last time the toggle was written
    pub updated_at: DateTime<Utc>,
}

impl FlowRuleToggle {
    /// Create a toggle, normalizing both codes
    pub fn new(
        flow_code: impl AsRef<str>,
        step_code: impl AsRef<str>,
        is_enabled: bool,
        description: impl Into<String>,
    ) -> Self {
        Self {
            flow_code: normalize_code(flow_code.as_ref()),
            step_code: normalize_code(step_code.as_ref()),
            is_enabled,
            description: description.into(),
            updated_at: Utc::now(),
        }
    }

    /// Storage key `flow:step` built from the normalized codes
    pub fn key(&self) -> String {
        toggle_key(&self.flow_code, &self.step_code)
    }
}

/// Storage key for a (flow, step) pair, normalizing both parts
pub fn toggle_key(flow_code: &str, step_code: &str) -> String {
    format!("{}:{}", normalize_code(flow_code), normalize_code(step_code))
}
