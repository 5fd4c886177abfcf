//! Main Onboard server implementation

use onboard_core::{
    FlowRuleToggle, FlowRuleToggleService, HandlerKind, ProvisioningContext, ProvisioningOrchestrator,
    SignupCommand, ToggleService,
};
use onboard_monitoring::logging::LogExt;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};

/// Shared state behind every request
pub struct ProvisioningServer {
    /// Configuration
    pub config: ServerConfig,

    orchestrator: Arc<ProvisioningOrchestrator>,

    toggles: Arc<FlowRuleToggleService>,
}

/// Manual Debug implementation that doesn't try to debug the trait objects
impl std::fmt::Debug for ProvisioningServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvisioningServer")
            .field("config", &self.config)
            .field("wired_handlers", &self.wired_handlers())
            .finish()
    }
}

impl ProvisioningServer {
    /// Create a new server
    pub fn new(
        config: ServerConfig,
        orchestrator: Arc<ProvisioningOrchestrator>,
        toggles: Arc<FlowRuleToggleService>,
    ) -> Self {
        Self {
            config,
            orchestrator,
            toggles,
        }
    }

    /// Bind and serve until ctrl-c
    pub async fn run(self) -> ServerResult<()> {
        info!("Starting Onboard server");

        let host: std::net::IpAddr = self
            .config
            .bind_address
            .parse()
            .map_err(|e| ServerError::ConfigError(format!("Invalid bind address {}: {}", self.config.bind_address, e)))?;
        let addr = SocketAddr::new(host, self.config.port);

        let app = crate::api::build_router(Arc::new(self));
        let listener = TcpListener::bind(addr).await.log_err("Failed to bind listener")?;
        info!("Listening on {}", listener.local_addr()?);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .log_err("Server stopped with an error")?;

        info!("Onboard server stopped");
        Ok(())
    }

    /// Validate the command and run the provisioning flow
    pub async fn provision(&self, command: SignupCommand) -> ServerResult<ProvisioningContext> {
        command.validate()?;
        Ok(self.orchestrator.run(command).await?)
    }

    /// Toggles stored for a flow
    pub async fn list_toggles(&self, flow_code: &str) -> ServerResult<Vec<FlowRuleToggle>> {
        Ok(self.toggles.list_toggles(flow_code).await?)
    }

    /// One stored toggle
    pub async fn get_toggle(&self, flow_code: &str, step_code: &str) -> ServerResult<FlowRuleToggle> {
        self.toggles
            .get_toggle(flow_code, step_code)
            .await?
            .ok_or_else(|| ServerError::NotFound(format!("Toggle {}/{}", flow_code, step_code)))
    }

    /// Create or replace a toggle
    pub async fn set_toggle(
        &self,
        flow_code: &str,
        step_code: &str,
        enabled: bool,
        description: &str,
    ) -> ServerResult<FlowRuleToggle> {
        Ok(self
            .toggles
            .set_step_toggle(flow_code, step_code, enabled, description)
            .await?)
    }

    /// Whether the toggle store answers
    pub async fn check_toggle_store_health(&self) -> ServerResult<bool> {
        Ok(self.toggles.health_check().await?)
    }

    /// Handlers wired into the orchestrator, in step order
    pub fn wired_handlers(&self) -> Vec<HandlerKind> {
        self.orchestrator.handlers().wired()
    }

    /// Check a bearer token against `ADMIN_API_KEY`; everything passes when no key is set
    pub fn validate_admin_token(&self, token: Option<&str>) -> bool {
        match (&self.config.admin_api_key, token) {
            (None, _) => true,
            (Some(expected), Some(token)) => expected == token,
            (Some(_), None) => false,
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
