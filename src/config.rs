//! Configuration loading and constants.
//!
//! Loads application configuration from a TOML file, then applies the
//! environment variables used by container deployments of the service.
//! `AppConfig` is built once at startup and handed to collaborators through
//! `AppState`; nothing reads the process environment after that.

use const_format::formatcp;
use serde::Deserialize;
use std::path::Path;

// =============================================================================
// Shared Access Signature
// =============================================================================

/// Lifetime of a generated shared access token (7 days)
pub const SAS_TOKEN_TTL_SECS: i64 = 60 * 60 * 24 * 7;

/// Returned by `TokenSigner::sign` when uri, policy name or key is empty
pub const SAS_MISSING_PARAMETER: &str = "Missing required parameter";

// =============================================================================
// Document Store
// =============================================================================

/// Azure Cosmos DB (Mongo API) host suffix appended to the account name
pub const COSMOS_HOST_SUFFIX: &str = "documents.azure.com";

/// Azure Cosmos DB Mongo API port
pub const COSMOS_PORT: u16 = 10255;

/// Collection holding captured orders
pub const ORDERS_COLLECTION: &str = "orders";

/// Connect timeout for the document store, in seconds
pub const DATABASE_CONNECT_TIMEOUT_SECS: u64 = 60;

// =============================================================================
// Orders
// =============================================================================

/// Status assigned to every captured order
pub const ORDER_STATUS_OPEN: &str = "Open";

/// Swagger UI placeholder value treated as "no source given"
pub const ORDER_SOURCE_PLACEHOLDER: &str = "string";

// =============================================================================
// Telemetry
// =============================================================================

/// Default Application Insights ingestion endpoint
pub const DEFAULT_TELEMETRY_ENDPOINT: &str = "https://dc.services.visualstudio.com";

/// Path of the ingestion API below the endpoint
pub const TELEMETRY_TRACK_PATH: &str = "/v2/track";

/// Timeout for outbound HTTP calls (event hub, telemetry), in seconds
pub const OUTBOUND_HTTP_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// HTTP Response Headers
// =============================================================================

/// API responses are per-request and must never be cached upstream
pub const HTTP_CACHE_API_MAX_AGE: u32 = 0;

pub const CACHE_CONTROL_API: &str = formatcp!("no-store, max-age={}", HTTP_CACHE_API_MAX_AGE);

/// Response header carrying the request correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Grace period for in-flight requests on shutdown, in seconds
pub const SHUTDOWN_GRACE_SECS: u64 = 30;

// =============================================================================
// Default Paths and Strings
// =============================================================================

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "captureorder=debug,tower_http=debug";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

/// Hostname reported in notifications when none is configured
pub const DEFAULT_HOSTNAME: &str = "unknown";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration
    pub http: HttpServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    /// Event hub notification target
    #[serde(default)]
    pub event_hub: EventHubConfig,
    #[serde(default)]
    pub order: OrderConfig,
    #[serde(default)]
    pub instance: InstanceConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
}

/// Which `OrderStore` implementation backs the service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Mongo,
    Memory,
}

/// Document store settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Database (and Cosmos account) name
    pub name: Option<String>,
    /// Explicit host; defaults to `<name>.documents.azure.com`
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Defaults to the database name, as Cosmos DB expects
    pub username: Option<String>,
    pub password: Option<String>,
    /// Disable TLS (local MongoDB only)
    #[serde(default)]
    pub insecure: bool,
    pub connect_timeout_seconds: Option<u64>,
}

impl DatabaseConfig {
    /// Get effective host (explicit or derived from the account name)
    pub fn host(&self) -> Option<String> {
        self.host.clone().or_else(|| {
            self.name
                .as_ref()
                .map(|name| format!("{}.{}", name, COSMOS_HOST_SUFFIX))
        })
    }

    /// Get effective port (default: Cosmos DB Mongo port)
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(COSMOS_PORT)
    }

    /// Get effective username (default: database name)
    pub fn username(&self) -> Option<String> {
        self.username.clone().or_else(|| self.name.clone())
    }

    pub fn connect_timeout_seconds(&self) -> u64 {
        self.connect_timeout_seconds
            .unwrap_or(DATABASE_CONNECT_TIMEOUT_SECS)
    }
}

/// Application Insights settings. Telemetry is off without a key.
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    pub instrumentation_key: Option<String>,
    #[serde(default = "TelemetryConfig::default_endpoint")]
    pub endpoint: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            instrumentation_key: None,
            endpoint: Self::default_endpoint(),
        }
    }
}

impl TelemetryConfig {
    fn default_endpoint() -> String {
        DEFAULT_TELEMETRY_ENDPOINT.to_string()
    }

    /// Instrumentation key, if telemetry is enabled
    pub fn key(&self) -> Option<&str> {
        self.instrumentation_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
    }
}

/// Event hub settings. Notifications are off without a URL.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventHubConfig {
    pub url: Option<String>,
    #[serde(default)]
    pub policy_name: String,
    #[serde(default)]
    pub policy_key: String,
}

impl EventHubConfig {
    /// Event endpoint, if notifications are enabled
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.trim().is_empty())
    }
}

/// Order defaults
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderConfig {
    /// Source recorded on orders that don't carry one
    #[serde(default)]
    pub source: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstanceConfig {
    #[serde(default = "InstanceConfig::default_hostname")]
    pub hostname: String,
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self {
            hostname: Self::default_hostname(),
        }
    }
}

impl InstanceConfig {
    fn default_hostname() -> String {
        DEFAULT_HOSTNAME.to_string()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "text" (human-readable, default) or "json" (structured)
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_LOG_FORMAT.to_string(),
        }
    }
}

impl LoggingConfig {
    fn default_format() -> String {
        DEFAULT_LOG_FORMAT.to_string()
    }
}

impl AppConfig {
    /// Load configuration from a TOML file and the process environment.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_with_env(&contents, |key| std::env::var(key).ok())
    }

    /// Parse configuration from TOML, applying overrides looked up through `env`.
    ///
    /// The lookup is injected so overrides can be tested without touching the
    /// process environment.
    pub fn from_toml_with_env<F>(contents: &str, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config: AppConfig = toml::from_str(contents)?;
        config.apply_env(env);
        config.validate()?;
        Ok(config)
    }

    fn apply_env<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| env(key).filter(|value| !value.is_empty());

        if let Some(name) = var("DATABASE") {
            self.database.name = Some(name);
        }
        if let Some(password) = var("PASSWORD") {
            self.database.password = Some(password);
        }
        if let Some(host) = var("MONGOHOST") {
            self.database.host = Some(host);
        }
        if let Some(source) = var("SOURCE") {
            self.order.source = source;
        }
        if let Some(key) = var("INSIGHTSKEY") {
            self.telemetry.instrumentation_key = Some(key);
        }
        if let Some(url) = var("EVENTURL") {
            self.event_hub.url = Some(url);
        }
        if let Some(name) = var("EVENTPOLICYNAME") {
            self.event_hub.policy_name = name;
        }
        if let Some(key) = var("EVENTPOLICYKEY") {
            self.event_hub.policy_key = key;
        }
        if let Some(hostname) = var("HOSTNAME") {
            self.instance.hostname = hostname;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.backend == StoreBackend::Mongo {
            if self.database.name.is_none() {
                return Err(ConfigError::Validation(
                    "MongoDB backend requires a database name ([database] name or DATABASE)"
                        .to_string(),
                ));
            }
            if self.database.password.is_none() {
                return Err(ConfigError::Validation(
                    "MongoDB backend requires a password ([database] password or PASSWORD)"
                        .to_string(),
                ));
            }
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            return Err(ConfigError::Validation(format!(
                "Unknown log format '{}', expected 'text' or 'json'",
                self.logging.format
            )));
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    const MINIMAL: &str = r#"
[http]
host = "127.0.0.1"
port = 8080

[database]
backend = "memory"
"#;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = AppConfig::from_toml_with_env(MINIMAL, no_env).unwrap();
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.database.backend, StoreBackend::Memory);
        assert_eq!(config.telemetry.endpoint, DEFAULT_TELEMETRY_ENDPOINT);
        assert!(config.telemetry.key().is_none());
        assert!(config.event_hub.url().is_none());
        assert_eq!(config.instance.hostname, DEFAULT_HOSTNAME);
        assert_eq!(config.logging.format, "text");
    }

    #[test]
    fn test_env_overrides_file_values() {
        let vars: HashMap<&str, &str> = [
            ("DATABASE", "ordersdb"),
            ("PASSWORD", "hunter2"),
            ("SOURCE", "aks"),
            ("INSIGHTSKEY", "ikey"),
            ("EVENTURL", "https://ns.servicebus.windows.net/hub/messages"),
            ("EVENTPOLICYNAME", "send"),
            ("EVENTPOLICYKEY", "secret"),
            ("HOSTNAME", "pod-1"),
        ]
        .into_iter()
        .collect();

        let config = AppConfig::from_toml_with_env(MINIMAL, |key| {
            vars.get(key).map(|value| value.to_string())
        })
        .unwrap();

        assert_eq!(config.database.name.as_deref(), Some("ordersdb"));
        assert_eq!(config.database.password.as_deref(), Some("hunter2"));
        assert_eq!(config.order.source, "aks");
        assert_eq!(config.telemetry.key(), Some("ikey"));
        assert_eq!(
            config.event_hub.url(),
            Some("https://ns.servicebus.windows.net/hub/messages")
        );
        assert_eq!(config.event_hub.policy_name, "send");
        assert_eq!(config.event_hub.policy_key, "secret");
        assert_eq!(config.instance.hostname, "pod-1");
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let toml = format!("{}\n[order]\nsource = \"file\"\n", MINIMAL);
        let config =
            AppConfig::from_toml_with_env(&toml, |_| Some(String::new())).unwrap();
        assert_eq!(config.order.source, "file");
    }

    #[test]
    fn test_mongo_backend_requires_database_name() {
        let toml = r#"
[http]
host = "0.0.0.0"
port = 80
"#;
        let err = AppConfig::from_toml_with_env(toml, no_env).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_cosmos_defaults_derive_from_name() {
        let toml = r#"
[http]
host = "0.0.0.0"
port = 80

[database]
name = "contoso"
password = "pw"
"#;
        let config = AppConfig::from_toml_with_env(toml, no_env).unwrap();
        assert_eq!(
            config.database.host().as_deref(),
            Some("contoso.documents.azure.com")
        );
        assert_eq!(config.database.port(), COSMOS_PORT);
        assert_eq!(config.database.username().as_deref(), Some("contoso"));
        assert_eq!(
            config.database.connect_timeout_seconds(),
            DATABASE_CONNECT_TIMEOUT_SECS
        );
    }

    #[test]
    fn test_unknown_log_format_rejected() {
        let toml = format!("{}\n[logging]\nformat = \"xml\"\n", MINIMAL);
        assert!(AppConfig::from_toml_with_env(&toml, no_env).is_err());
    }

    #[test]
    fn test_load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();
        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.http.host, "127.0.0.1");
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = AppConfig::load("/nonexistent/captureorder.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_cache_control_api_value() {
        assert_eq!(CACHE_CONTROL_API, "no-store, max-age=0");
    }
}
