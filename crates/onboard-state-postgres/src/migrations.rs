/// Generate SQL migrations for the PostgreSQL toggle store
///
/// Every statement is idempotent so the list can be replayed on each start.
pub fn generate_migrations() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "20240601000000_flow_rule_toggles",
            r#"
            CREATE TABLE IF NOT EXISTS flow_rule_toggles (
                flow_code TEXT NOT NULL,
                step_code TEXT NOT NULL,
                is_enabled BOOLEAN NOT NULL DEFAULT TRUE,
                description TEXT NOT NULL DEFAULT '',
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                PRIMARY KEY (flow_code, step_code)
            );
            "#,
        ),
        (
            "20240602000000_flow_rule_toggles_flow_index",
            r#"
            CREATE INDEX IF NOT EXISTS idx_flow_rule_toggles_flow_code ON flow_rule_toggles(flow_code);
            "#,
        ),
    ]
}
