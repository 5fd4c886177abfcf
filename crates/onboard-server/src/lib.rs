//! Onboard Server - HTTP surface of the provisioning orchestrator
//!
//! This crate wires the toggle store, the remote step handlers and the
//! monitoring event handler into a [`ProvisioningOrchestrator`] and serves it
//! over axum.

use onboard_core::{
    create_toggle_repository_factory, FlowRuleToggleRepository, FlowRuleToggleService, OrchestratorBuilder,
    OrchestratorConfig, ProvisioningEventHandler, ProvisioningHandlers, ProvisioningOrchestrator,
    TracingEventHandler,
};
use onboard_monitoring::logging::LogExt;
use onboard_monitoring::{MetricsEventHandler, ProvisioningMetrics};
use onboard_state_inmemory::InMemoryFlowRuleToggleRepository;
use std::sync::Arc;
use tracing::info;

/// API module
pub mod api;

/// Configuration module
pub mod config;

/// Error module
pub mod error;

/// Remote handler adapters
pub mod remote;

/// Server module
pub mod server;

// Re-export key types
pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use remote::{build_remote_handlers, RemoteHandler};
pub use server::ProvisioningServer;

/// Run function
pub async fn run(config: ServerConfig) -> ServerResult<()> {
    let handlers = build_remote_handlers(&config)?;
    let server = create_server(config, handlers).await?;
    server.run().await
}

/// Assemble a server around the given handlers
pub async fn create_server(config: ServerConfig, handlers: ProvisioningHandlers) -> ServerResult<ProvisioningServer> {
    info!(toggle_store = %config.toggle_store_url, "Creating provisioning server");
    let repository = create_toggle_repository(&config)
        .await
        .log_err("Failed to open toggle store")?;
    create_server_with_repository(config, repository, handlers)
}

/// Assemble a server around an already opened toggle store
pub fn create_server_with_repository(
    config: ServerConfig,
    repository: Arc<dyn FlowRuleToggleRepository>,
    handlers: ProvisioningHandlers,
) -> ServerResult<ProvisioningServer> {
    let toggles = Arc::new(FlowRuleToggleService::new(repository));

    let mut orchestrator_config = OrchestratorConfig::default();
    orchestrator_config.step_timeout = config.step_timeout();

    let event_handler: Arc<dyn ProvisioningEventHandler> = if config.monitoring_config().enable_metrics {
        Arc::new(MetricsEventHandler::new(ProvisioningMetrics::default()).with_inner(Arc::new(TracingEventHandler)))
    } else {
        Arc::new(TracingEventHandler)
    };

    let orchestrator: ProvisioningOrchestrator = OrchestratorBuilder::new()
        .with_toggle_service(toggles.clone())
        .with_handlers(handlers)
        .with_config(orchestrator_config)
        .with_event_handler(event_handler)
        .build()?;

    Ok(ProvisioningServer::new(config, Arc::new(orchestrator), toggles))
}

/// Create the toggle store named by `toggle_store_url`
pub async fn create_toggle_repository(config: &ServerConfig) -> ServerResult<Arc<dyn FlowRuleToggleRepository>> {
    let url = config.toggle_store_url.as_str();
    if is_postgres_url(url) {
        return create_postgres_repository(config).await;
    }

    let factory = create_toggle_repository_factory(InMemoryFlowRuleToggleRepository::new);
    Ok(factory(url)?)
}

fn is_postgres_url(url: &str) -> bool {
    url.starts_with("postgres://") || url.starts_with("postgresql://")
}

#[cfg(feature = "postgres")]
async fn create_postgres_repository(config: &ServerConfig) -> ServerResult<Arc<dyn FlowRuleToggleRepository>> {
    info!("Using PostgreSQL toggle store");
    let pg_config = onboard_state_postgres::PostgresConfig {
        connection_string: config.toggle_store_url.clone(),
        max_connections: config.database_max_connections,
        ..Default::default()
    };
    let provider = onboard_state_postgres::PostgresStateStoreProvider::with_config(pg_config).await?;
    Ok(provider.create_toggle_repository())
}

#[cfg(not(feature = "postgres"))]
async fn create_postgres_repository(config: &ServerConfig) -> ServerResult<Arc<dyn FlowRuleToggleRepository>> {
    Err(ServerError::ConfigError(format!(
        "{} needs the postgres feature",
        config.toggle_store_url
    )))
}
