//! Logging and metrics for the Onboard platform.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod events;
pub mod logging;
pub mod metrics;

/// Output format of the log layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable, for development
    #[default]
    Pretty,
    /// One JSON object per line, for log aggregation
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("Unknown log format: {}", other)),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Pretty => f.write_str("pretty"),
            LogFormat::Json => f.write_str("json"),
        }
    }
}

/// Configuration for initializing the monitoring system
#[derive(Debug, Clone)]
pub struct MonitoringConfig {
    /// Service name attached to the startup log line
    pub service_name: String,
    /// Log level filter (e.g., "info,onboard_core=debug"); `RUST_LOG` wins when set
    pub log_filter: String,
    /// Log output format
    pub log_format: LogFormat,
    /// Record provisioning metrics
    pub enable_metrics: bool,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            service_name: "onboard".to_string(),
            log_filter: "info".to_string(),
            log_format: LogFormat::Pretty,
            enable_metrics: true,
        }
    }
}


// Exported types
pub use crate::events::MetricsEventHandler;
pub use crate::logging::init_logging;
pub use crate::metrics::{GlobalMetricsCollector, MetricType, MetricsCollector, ProvisioningMetrics};
