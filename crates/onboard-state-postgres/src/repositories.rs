use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::Row;
use tracing::{debug, error};

use onboard_core::{normalize_code, CoreError, FlowRuleToggle, FlowRuleToggleRepository};

use crate::PostgresConnection;

const TOGGLE_COLUMNS: &str = "flow_code, step_code, is_enabled, description, updated_at";

/// Postgres implementation of the FlowRuleToggleRepository
#[derive(Clone)]
pub struct PostgresFlowRuleToggleRepository {
    conn: PostgresConnection,
}

impl PostgresFlowRuleToggleRepository {
    /// Create a new Postgres toggle repository
    pub fn new(conn: PostgresConnection) -> Self {
        Self { conn }
    }
}

fn row_to_toggle(row: &PgRow) -> Result<FlowRuleToggle, CoreError> {
    let read_error = |e: sqlx::Error| CoreError::ToggleStoreError(format!("Error reading toggle row: {}", e));

    Ok(FlowRuleToggle {
        flow_code: row.try_get("flow_code").map_err(read_error)?,
        step_code: row.try_get("step_code").map_err(read_error)?,
        is_enabled: row.try_get("is_enabled").map_err(read_error)?,
        description: row.try_get("description").map_err(read_error)?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at").map_err(read_error)?,
    })
}

#[async_trait]
impl FlowRuleToggleRepository for PostgresFlowRuleToggleRepository {
    async fn find(&self, flow_code: &str, step_code: &str) -> Result<Option<FlowRuleToggle>, CoreError> {
        let query = format!(
            "SELECT {} FROM flow_rule_toggles WHERE flow_code = $1 AND step_code = $2",
            TOGGLE_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(normalize_code(flow_code))
            .bind(normalize_code(step_code))
            .fetch_optional(self.conn.pool())
            .await
            .map_err(|e| {
                error!("Toggle lookup failed: {}", e);
                CoreError::ToggleStoreError(format!("Database error: {}", e))
            })?;

        row.as_ref().map(row_to_toggle).transpose()
    }

    async fn upsert(&self, toggle: FlowRuleToggle) -> Result<FlowRuleToggle, CoreError> {
        let query = format!(
            "
            INSERT INTO flow_rule_toggles ({columns})
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (flow_code, step_code) DO UPDATE SET
                is_enabled = EXCLUDED.is_enabled,
                description = EXCLUDED.description,
                updated_at = EXCLUDED.updated_at
            RETURNING {columns}
            ",
            columns = TOGGLE_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(normalize_code(&toggle.flow_code))
            .bind(normalize_code(&toggle.step_code))
            .bind(toggle.is_enabled)
            .bind(&toggle.description)
            .bind(Utc::now())
            .fetch_one(self.conn.pool())
            .await
            .map_err(|e| CoreError::ToggleStoreError(format!("Failed to save toggle: {}", e)))?;

        let stored = row_to_toggle(&row)?;
        debug!(key = %stored.key(), enabled = stored.is_enabled, "Toggle saved to PostgreSQL");
        Ok(stored)
    }

    async fn list_for_flow(&self, flow_code: &str) -> Result<Vec<FlowRuleToggle>, CoreError> {
        let query = format!(
            "SELECT {} FROM flow_rule_toggles WHERE flow_code = $1 ORDER BY step_code",
            TOGGLE_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(normalize_code(flow_code))
            .fetch_all(self.conn.pool())
            .await
            .map_err(|e| CoreError::ToggleStoreError(format!("Failed to list toggles: {}", e)))?;

        rows.iter().map(row_to_toggle).collect()
    }

    async fn health_check(&self) -> Result<bool, CoreError> {
        match sqlx::query("SELECT 1").execute(self.conn.pool()).await {
            Ok(_) => Ok(true),
            Err(e) => {
                error!("PostgreSQL health check failed: {}", e);
                Err(CoreError::ToggleStoreError(format!("PostgreSQL health check failed: {}", e)))
            }
        }
    }
}
