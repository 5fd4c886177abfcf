use anyhow::{Context, Result};
use onboard_server::config::ServerConfig;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration from the config file and environment variables
    let config = ServerConfig::load().context("Failed to load configuration")?;

    onboard_monitoring::init_logging(&config.monitoring_config()).context("Failed to initialize logging")?;
    for warning in &config.warnings {
        warn!("{}", warning);
    }
    info!(
        port = config.port,
        toggle_store = %config.toggle_store_url,
        metrics = config.metrics_enabled,
        "Loaded server configuration"
    );

    if let Some(addr) = config.metrics_exporter_addr() {
        let addr = addr.parse().context("Invalid METRICS_LISTEN_ADDR")?;
        onboard_monitoring::metrics::install_prometheus_exporter(addr)?;
    }

    onboard_server::run(config).await.context("Server error")?;

    Ok(())
}
