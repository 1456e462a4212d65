//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `homegraph.toml` in the working directory (or the file named by
//! `HOMEGRAPH_CONFIG`). Every field has a sensible default so the file is
//! optional. Environment variables take precedence over file values.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Registry dump settings.
    pub registry: RegistryConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Picker search settings.
    pub search: SearchConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// Registry dump configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Path of the JSON registry dump.
    pub path: PathBuf,
    /// Seconds between background reloads; `0` disables them.
    pub reload_interval_secs: u64,
    /// Reject dumps whose records reference unknown floors, areas or devices.
    pub strict: bool,
    /// Count config/diagnostic entities as members of areas, devices and labels.
    pub include_secondary: bool,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Picker search configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Shortest query that triggers filtering.
    pub min_term_length: usize,
}

impl Config {
    /// Load configuration from `homegraph.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("HOMEGRAPH_CONFIG").unwrap_or_else(|_| "homegraph.toml".into());
        let mut config = Self::from_file(&path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("HOMEGRAPH_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("HOMEGRAPH_PORT")
            && let Ok(port) = val.parse()
        {
            self.server.port = port;
        }
        if let Ok(val) = std::env::var("HOMEGRAPH_BIND")
            && let Some((host, port)) = val.rsplit_once(':')
        {
            self.server.host = host.to_string();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("HOMEGRAPH_REGISTRY_PATH") {
            self.registry.path = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("HOMEGRAPH_RELOAD_INTERVAL")
            && let Ok(secs) = val.parse()
        {
            self.registry.reload_interval_secs = secs;
        }
        if let Ok(val) = std::env::var("HOMEGRAPH_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.registry.path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "registry path must not be empty".to_string(),
            ));
        }
        if self.search.min_term_length == 0 {
            return Err(ConfigError::Validation(
                "search min_term_length must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the background reload period, if enabled.
    #[must_use]
    pub fn reload_interval(&self) -> Option<Duration> {
        (self.registry.reload_interval_secs > 0)
            .then(|| Duration::from_secs(self.registry.reload_interval_secs))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("registry.json"),
            reload_interval_secs: 0,
            strict: false,
            include_secondary: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "homegraphd=info,homegraph=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { min_term_length: 2 }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
