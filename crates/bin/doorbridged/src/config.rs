//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `doorbridge.toml` in the working directory. Every field has a
//! default so the file is optional, except the status-service API key,
//! which must come from the file or `DOORBRIDGE_STATUS_KEY`. Environment
//! variables take precedence over file values.

use serde::Deserialize;

use doorbridge_adapter_serial::SerialConfig;
use doorbridge_adapter_status_http::{DirectoryConfig, DoorStatusConfig};

/// Top-level configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Admin HTTP endpoint settings.
    pub server: ServerConfig,
    /// Serial link settings.
    pub serial: SerialConfig,
    /// Variable directory settings.
    pub directory: DirectoryConfig,
    /// Door status service settings.
    pub status: DoorStatusConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            serial: SerialConfig::default(),
            directory: DirectoryConfig::default(),
            status: DoorStatusConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Admin HTTP listener configuration. LAN only by convention — there is no
/// authentication on these routes.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "doorbridged=info,doorbridge=info,tower_http=debug".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from `doorbridge.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if
    /// validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("doorbridge.toml")?;
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
        if let Ok(val) = std::env::var("DOORBRIDGE_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Ok(val) = std::env::var("DOORBRIDGE_SERIAL_DEVICE") {
            self.serial.device = val;
        }
        if let Ok(val) = std::env::var("DOORBRIDGE_DIRECTORY_URL") {
            self.directory.base_url = val;
        }
        if let Ok(val) = std::env::var("DOORBRIDGE_STATUS_URL") {
            self.status.base_url = val;
        }
        if let Ok(val) = std::env::var("DOORBRIDGE_STATUS_KEY") {
            self.status.api_key = Some(val);
        }
        if let Ok(val) = std::env::var("DOORBRIDGE_LOG") {
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
        if self.serial.device.is_empty() {
            return Err(ConfigError::Validation(
                "serial device must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address for the admin endpoint.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
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
