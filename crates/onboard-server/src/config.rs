//! Configuration for the Onboard server
//!
//! Values come from an optional configuration file (`ONBOARD_CONFIG_FILE`)
//! and are then overridden by environment variables.

use onboard_core::HandlerKind;
use onboard_monitoring::{LogFormat, MonitoringConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::time::Duration;
use crate::error::{ServerError, ServerResult};

/// Prefix and suffix of the per-handler URL variables, e.g. `ONBOARD_HANDLER_SIGNUP_URL`
const HANDLER_URL_PREFIX: &str = "ONBOARD_HANDLER_";
const HANDLER_URL_SUFFIX: &str = "_URL";

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Host to bind to
    #[serde(default = "default_host")]
    pub bind_address: String,

    /// Toggle store URL: `memory://...` or `postgres://...`
    #[serde(default = "default_toggle_store_url")]
    pub toggle_store_url: String,

    /// Pool size when the toggle store is Postgres
    #[serde(default = "default_database_max_connections")]
    pub database_max_connections: u32,

    /// Bearer token guarding the admin toggle API
    #[serde(default)]
    pub admin_api_key: Option<String>,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log output format
    #[serde(default)]
    pub log_format: LogFormat,

    /// Per-step handler budget; unset means no timeout
    #[serde(default)]
    pub step_timeout_ms: Option<u64>,

    /// Downstream URL per handler name (`signup`, `charge`, ...)
    #[serde(default)]
    pub handler_urls: HashMap<String, String>,

    /// Request timeout for remote handlers
    #[serde(default = "default_handler_http_timeout_ms")]
    pub handler_http_timeout_ms: u64,

    /// Record provisioning metrics
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,

    /// Where to serve Prometheus metrics, if anywhere
    #[serde(default)]
    pub metrics_listen_addr: Option<String>,

    /// Problems found while loading, logged once logging is up
    #[serde(skip)]
    pub warnings: Vec<String>,
}

fn default_port() -> u16 {
    8080
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_toggle_store_url() -> String {
    "memory://local".to_string()
}

fn default_database_max_connections() -> u32 {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_handler_http_timeout_ms() -> u64 {
    10_000
}

fn default_metrics_enabled() -> bool {
    true
}

impl ServerConfig {
    /// Load configuration from the optional config file and the environment
    pub fn load() -> ServerResult<Self> {
        let config = match env::var("ONBOARD_CONFIG_FILE") {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::default(),
        };

        config.apply_env(env::vars())
    }

    /// Read a configuration file (YAML, TOML or JSON, picked by extension)
    pub fn from_file(path: &str) -> ServerResult<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()
            .map_err(|e| ServerError::ConfigError(format!("Failed to read {}: {}", path, e)))?;

        config
            .try_deserialize::<ServerConfig>()
            .map_err(|e| ServerError::ConfigError(format!("Invalid configuration in {}: {}", path, e)))
    }

    /// Override fields from `(name, value)` pairs shaped like environment variables
    pub fn apply_env<I>(mut self, vars: I) -> ServerResult<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            match key.as_str() {
                "SERVER_PORT" => match value.parse::<u16>() {
                    Ok(port) => self.port = port,
                    Err(_) => self.warnings.push(format!("Invalid SERVER_PORT value: {}", value)),
                },
                "SERVER_HOST" => self.bind_address = value,
                "TOGGLE_STORE_URL" => self.toggle_store_url = value,
                "DATABASE_MAX_CONNECTIONS" => match value.parse::<u32>() {
                    Ok(max) if max > 0 => self.database_max_connections = max,
                    _ => self.warnings.push(format!("Invalid DATABASE_MAX_CONNECTIONS value: {}", value)),
                },
                "ADMIN_API_KEY" => {
                    if !value.is_empty() {
                        self.admin_api_key = Some(value);
                    }
                }
                "LOG_LEVEL" => self.log_level = value,
                "LOG_FORMAT" => match value.parse::<LogFormat>() {
                    Ok(format) => self.log_format = format,
                    Err(_) => self.warnings.push(format!("Invalid LOG_FORMAT value: {}, using {}", value, self.log_format)),
                },
                "STEP_TIMEOUT_MS" => match value.parse::<u64>() {
                    Ok(ms) if ms > 0 => self.step_timeout_ms = Some(ms),
                    _ => self.warnings.push(format!("Invalid STEP_TIMEOUT_MS value: {}", value)),
                },
                "HANDLER_HTTP_TIMEOUT_MS" => match value.parse::<u64>() {
                    Ok(ms) if ms > 0 => self.handler_http_timeout_ms = ms,
                    _ => self.warnings.push(format!("Invalid HANDLER_HTTP_TIMEOUT_MS value: {}", value)),
                },
                "METRICS_ENABLED" => match value.trim().to_lowercase().as_str() {
                    "true" | "1" => self.metrics_enabled = true,
                    "false" | "0" => self.metrics_enabled = false,
                    _ => self.warnings.push(format!("Invalid METRICS_ENABLED value: {}", value)),
                },
                "METRICS_LISTEN_ADDR" => self.metrics_listen_addr = Some(value),
                _ => {
                    if let Some(name) = handler_name_from_var(&key) {
                        self.handler_urls.insert(name, value);
                    }
                }
            }
        }

        self.validate()?;

        if self.admin_api_key.is_none() {
            self.warnings.push("No ADMIN_API_KEY provided - admin toggle API will be unsecured!".to_string());
        }
        if !self.metrics_enabled && self.metrics_listen_addr.is_some() {
            self.warnings.push("METRICS_LISTEN_ADDR is ignored while metrics are disabled".to_string());
        }

        Ok(self)
    }

    /// Reject configurations the server cannot start with
    pub fn validate(&self) -> ServerResult<()> {
        if self.toggle_store_url.is_empty() {
            return Err(ServerError::ConfigError("Toggle store URL is required".to_string()));
        }

        for name in self.handler_urls.keys() {
            if self.handler_kind(name).is_none() {
                return Err(ServerError::ConfigError(format!("Unknown handler name: {}", name)));
            }
        }

        Ok(())
    }

    /// Logging and metrics settings derived from this configuration
    pub fn monitoring_config(&self) -> MonitoringConfig {
        MonitoringConfig {
            service_name: "onboard-server".to_string(),
            log_filter: self.log_level.clone(),
            log_format: self.log_format,
            enable_metrics: self.metrics_enabled,
        }
    }

    /// Address for the Prometheus exporter, when metrics are on and an address is set
    pub fn metrics_exporter_addr(&self) -> Option<&str> {
        self.metrics_listen_addr.as_deref().filter(|_| self.metrics_enabled)
    }

    /// URL configured for a handler, if any
    pub fn handler_url(&self, kind: HandlerKind) -> Option<&str> {
        self.handler_urls.get(kind.name()).map(String::as_str)
    }

    /// Step timeout as a duration
    pub fn step_timeout(&self) -> Option<Duration> {
        self.step_timeout_ms.map(Duration::from_millis)
    }

    /// Remote handler request timeout as a duration
    pub fn handler_http_timeout(&self) -> Duration {
        Duration::from_millis(self.handler_http_timeout_ms)
    }

    fn handler_kind(&self, name: &str) -> Option<HandlerKind> {
        HandlerKind::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

/// `ONBOARD_HANDLER_VERIFY_EMAIL_URL` -> `verify_email`
fn handler_name_from_var(key: &str) -> Option<String> {
    let name = key.strip_prefix(HANDLER_URL_PREFIX)?.strip_suffix(HANDLER_URL_SUFFIX)?;
    if name.is_empty() {
        return None;
    }
    Some(name.to_lowercase())
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_address: default_host(),
            toggle_store_url: default_toggle_store_url(),
            database_max_connections: default_database_max_connections(),
            admin_api_key: None,
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            step_timeout_ms: None,
            handler_urls: HashMap::new(),
            handler_http_timeout_ms: default_handler_http_timeout_ms(),
            metrics_enabled: default_metrics_enabled(),
            metrics_listen_addr: None,
            warnings: Vec::new(),
        }
    }
}
