//! Configuration loading and types for the Todo API.
//!
//! Configuration is read from an optional YAML file and deserialized into
//! the [`Config`] struct, then selected fields are overridden from the
//! process environment.  The resulting struct is handed to [`crate::AppState`]
//! at construction; nothing reads the environment after startup.

use serde::Deserialize;
use std::path::Path;

/// Header carrying the shared secret on every API request.
pub const API_KEY_HEADER: &str = "X-API-Custom-Key";

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Shared-secret authentication settings.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Todo store settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Observability settings.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind host address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Graceful shutdown timeout in seconds.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            shutdown_timeout: default_shutdown_timeout(),
        }
    }
}

/// Shared-secret authentication.
#[derive(Clone, Deserialize, Default)]
pub struct AuthConfig {
    /// Value that `X-API-Custom-Key` must equal. Also accepts `API_KEY` in YAML.
    #[serde(alias = "API_KEY", default)]
    pub api_key: String,
}

// Keep the secret out of debug logs.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .finish()
    }
}

/// Todo store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Backend type: `memory` or `dynamodb`.
    #[serde(default = "default_store_backend")]
    pub backend: String,

    /// DynamoDB-specific configuration.
    #[serde(default)]
    pub dynamodb: DynamoDbStoreConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            dynamodb: DynamoDbStoreConfig::default(),
        }
    }
}

/// DynamoDB store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DynamoDbStoreConfig {
    /// Table holding todo items, partitioned on `id`.
    #[serde(default = "default_table_name")]
    pub table_name: String,

    /// AWS region; falls back to the SDK's default provider chain when unset.
    #[serde(default = "default_dynamodb_region")]
    pub region: Option<String>,

    /// Custom endpoint (e.g. DynamoDB Local).
    #[serde(default)]
    pub endpoint_url: Option<String>,
}

impl Default for DynamoDbStoreConfig {
    fn default() -> Self {
        Self {
            table_name: default_table_name(),
            region: default_dynamodb_region(),
            endpoint_url: None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: text or json.
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    /// Enable Prometheus metrics collection and the `/metrics` endpoint.
    #[serde(default = "default_true")]
    pub metrics: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self { metrics: true }
    }
}

impl Config {
    /// Build a configuration from defaults plus environment overrides.
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides(|name| std::env::var(name).ok());
        config
    }

    /// Override fields from environment-style variables.
    ///
    /// `lookup` is `std::env::var` in production; tests pass a closure over
    /// a fixed map.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("API_KEY") {
            self.auth.api_key = key;
        }
        if let Some(backend) = lookup("TODO_STORE_BACKEND") {
            self.store.backend = backend;
        }
        if let Some(table) = lookup("TODO_TABLE_NAME") {
            self.store.dynamodb.table_name = table;
        }
        if let Some(region) = lookup("AWS_REGION") {
            self.store.dynamodb.region = Some(region);
        }
        if let Some(endpoint) = lookup("DYNAMODB_ENDPOINT_URL") {
            self.store.dynamodb.endpoint_url = Some(endpoint);
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    /// Reject configurations the service cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.auth.api_key.is_empty() {
            anyhow::bail!("auth.api_key is empty; set it in the config file or via API_KEY");
        }
        match self.store.backend.as_str() {
            "memory" | "dynamodb" => {}
            other => anyhow::bail!("unknown store.backend '{other}' (expected memory or dynamodb)"),
        }
        if self.store.backend == "dynamodb" && self.store.dynamodb.table_name.is_empty() {
            anyhow::bail!("store.dynamodb.table_name must not be empty");
        }
        Ok(())
    }
}

// -- Defaults ----------------------------------------------------------------

fn default_true() -> bool {
    true
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_shutdown_timeout() -> u64 {
    30
}

fn default_store_backend() -> String {
    "dynamodb".to_string()
}

fn default_table_name() -> String {
    "Todos".to_string()
}

fn default_dynamodb_region() -> Option<String> {
    Some("ap-northeast-1".to_string())
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

// -- Loader ------------------------------------------------------------------

/// Load and parse configuration from a YAML file at `path`.
pub fn load_config<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref())?;
    let config: Config = serde_yaml::from_str(&contents)?;
    Ok(config)
}
