//! Provisioning metrics.
//!
//! Metric names:
//! - `onboard_provisioning_steps_total{step, outcome}` counter
//! - `onboard_provisioning_runs_total{outcome}` counter
//! - `onboard_provisioning_step_duration_ms{step}` histogram

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Counter of visited steps
pub const STEPS_TOTAL: &str = "onboard_provisioning_steps_total";
/// Counter of finished runs
pub const RUNS_TOTAL: &str = "onboard_provisioning_runs_total";
/// Histogram of handler time per step
pub const STEP_DURATION_MS: &str = "onboard_provisioning_step_duration_ms";

/// Type of metric for collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    /// Counter metrics accumulate values
    Counter,
    /// Histogram metrics observe distributions
    Histogram,
}

/// Interface for collecting metrics
#[cfg_attr(test, mockall::automock)]
pub trait MetricsCollector: Send + Sync {
    /// Record a metric with the given name, value, type, and labels
    fn record_metric(&self, name: &str, value: f64, metric_type: MetricType, labels: HashMap<String, String>);
}

/// Collector that forwards to the global `metrics` recorder
#[derive(Debug, Default, Clone)]
pub struct GlobalMetricsCollector;

impl MetricsCollector for GlobalMetricsCollector {
    fn record_metric(&self, name: &str, value: f64, metric_type: MetricType, labels: HashMap<String, String>) {
        let labels: Vec<metrics::Label> = labels
            .into_iter()
            .map(|(key, value)| metrics::Label::new(key, value))
            .collect();

        match metric_type {
            MetricType::Counter => metrics::counter!(name.to_string(), value as u64, labels),
            MetricType::Histogram => metrics::histogram!(name.to_string(), value, labels),
        }
    }
}

/// Install a Prometheus exporter serving `/metrics` on `addr`
#[cfg(feature = "prometheus")]
pub fn install_prometheus_exporter(addr: std::net::SocketAddr) -> anyhow::Result<()> {
    use anyhow::Context;

    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("Failed to install Prometheus exporter")?;

    tracing::info!(%addr, "Prometheus exporter listening");
    Ok(())
}

/// Provisioning specific metrics
#[derive(Clone)]
pub struct ProvisioningMetrics {
    collector: Arc<dyn MetricsCollector>,
}

impl Default for ProvisioningMetrics {
    fn default() -> Self {
        Self::new(Arc::new(GlobalMetricsCollector))
    }
}

impl ProvisioningMetrics {
    /// Record through the given collector
    pub fn new(collector: Arc<dyn MetricsCollector>) -> Self {
        Self { collector }
    }

    /// Count a visited step; `outcome` is `completed`, `failed` or a skip reason
    pub fn record_step(&self, step: &str, outcome: &str) {
        let labels = HashMap::from([
            ("step".to_string(), step.to_string()),
            ("outcome".to_string(), outcome.to_string()),
        ]);
        self.collector.record_metric(STEPS_TOTAL, 1.0, MetricType::Counter, labels);
    }

    /// Observe how long a step's handlers took
    pub fn record_step_duration(&self, step: &str, duration: Duration) {
        let labels = HashMap::from([("step".to_string(), step.to_string())]);
        self.collector.record_metric(
            STEP_DURATION_MS,
            duration.as_secs_f64() * 1000.0,
            MetricType::Histogram,
            labels,
        );
    }

    /// Count a finished run; `outcome` is `completed` or `failed`
    pub fn record_run(&self, outcome: &str) {
        let labels = HashMap::from([("outcome".to_string(), outcome.to_string())]);
        self.collector.record_metric(RUNS_TOTAL, 1.0, MetricType::Counter, labels);
    }
}
