//! Server configuration.
//!
//! Values come from three layers, later ones winning:
//!
//! 1. The TOML file (`--config`, or [`default_config_path`] if it exists)
//! 2. `AUTH_PASSWORD` and `LED_DEVICE_ADDRESS` environment variables
//! 3. Command-line flags
//!
//! The result is validated once and then injected into the session and the
//! router. Nothing reads configuration after startup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ledgate_core::{ConnectionConfig, RetryConfig, SessionOptions};
use serde::{Deserialize, Serialize};

/// Environment variable holding the shared secret.
pub const PASSWORD_ENV: &str = "AUTH_PASSWORD";

/// Environment variable holding the device address.
pub const DEVICE_ADDRESS_ENV: &str = "LED_DEVICE_ADDRESS";

/// Server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP listener settings.
    pub server: ServerConfig,
    /// Authentication settings.
    pub auth: AuthConfig,
    /// The LED controller to drive.
    pub device: DeviceConfig,
    /// Command queue and shutdown settings.
    pub session: SessionConfig,
}

impl Config {
    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = default_config_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Apply `AUTH_PASSWORD` and `LED_DEVICE_ADDRESS` from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply environment overrides from an arbitrary lookup.
    ///
    /// Empty values are ignored so an unset-but-exported variable does not
    /// wipe a value from the file.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(password) = lookup(PASSWORD_ENV).filter(|v| !v.is_empty()) {
            self.auth.password = password;
        }
        if let Some(address) = lookup(DEVICE_ADDRESS_ENV).filter(|v| !v.is_empty()) {
            self.device.address = address;
        }
    }

    /// Validate the configuration and return any errors.
    ///
    /// This checks:
    /// - Server bind address is valid (host:port format, non-zero port)
    /// - Password and device address are set
    /// - Timeouts are at least one second
    /// - Queue capacity is at least one
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        errors.extend(self.server.validate());
        errors.extend(self.auth.validate());
        errors.extend(self.device.validate());
        errors.extend(self.session.validate());

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Options for spawning the device session.
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions::default()
            .queue_capacity(self.session.queue_capacity)
            .connect_retry(RetryConfig::for_connect().max_retries(self.device.connect_retries))
            .reconnect_on_demand(self.session.reconnect_on_demand)
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:5000").
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:5000".to_string(),
        }
    }
}

impl ServerConfig {
    /// Validate server configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.bind.is_empty() {
            errors.push(ValidationError::new(
                "server.bind",
                "bind address cannot be empty",
            ));
            return errors;
        }

        let Some((_, port)) = self.bind.rsplit_once(':') else {
            errors.push(ValidationError::new(
                "server.bind",
                format!(
                    "invalid bind address '{}': expected format 'host:port'",
                    self.bind
                ),
            ));
            return errors;
        };

        match port.parse::<u16>() {
            Ok(0) => errors.push(ValidationError::new("server.bind", "port cannot be 0")),
            Err(_) => errors.push(ValidationError::new(
                "server.bind",
                format!("invalid port '{}': must be a number 1-65535", port),
            )),
            Ok(_) => {}
        }

        errors
    }
}

/// Authentication configuration.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Shared secret expected verbatim in the `Authorization` header.
    pub password: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("password", &"<redacted>")
            .finish()
    }
}

impl AuthConfig {
    /// Validate authentication configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.password.is_empty() {
            errors.push(ValidationError::new(
                "auth.password",
                format!("password cannot be empty (set it here or via {})", PASSWORD_ENV),
            ));
        }

        errors
    }
}

/// The LED controller to drive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// MAC address, or the CoreBluetooth UUID on macOS.
    pub address: String,
    /// Seconds allowed for locating and connecting to the device.
    pub connect_timeout_secs: u64,
    /// Seconds allowed for one command write.
    pub write_timeout_secs: u64,
    /// Extra attempts for the initial connect.
    pub connect_retries: u32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            connect_timeout_secs: 15,
            write_timeout_secs: 5,
            connect_retries: 3,
        }
    }
}

impl DeviceConfig {
    /// Validate device configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.address.trim().is_empty() {
            errors.push(ValidationError::new(
                "device.address",
                format!(
                    "device address cannot be empty (set it here or via {})",
                    DEVICE_ADDRESS_ENV
                ),
            ));
        }
        if self.connect_timeout_secs == 0 {
            errors.push(ValidationError::new(
                "device.connect_timeout_secs",
                "connect timeout must be at least 1 second",
            ));
        }
        if self.write_timeout_secs == 0 {
            errors.push(ValidationError::new(
                "device.write_timeout_secs",
                "write timeout must be at least 1 second",
            ));
        }

        errors
    }

    /// BLE timeouts for this device.
    pub fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig::default()
            .connection_timeout(Duration::from_secs(self.connect_timeout_secs))
            .write_timeout(Duration::from_secs(self.write_timeout_secs))
    }
}

/// Command queue and shutdown configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Commands that may wait for delivery before new ones are rejected.
    pub queue_capacity: usize,
    /// Seconds to keep delivering queued commands at shutdown.
    pub drain_timeout_secs: u64,
    /// Try to reconnect when a command arrives while disconnected.
    pub reconnect_on_demand: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            queue_capacity: ledgate_core::session::DEFAULT_QUEUE_CAPACITY,
            drain_timeout_secs: 5,
            reconnect_on_demand: false,
        }
    }
}

impl SessionConfig {
    /// Validate session configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.queue_capacity == 0 {
            errors.push(ValidationError::new(
                "session.queue_capacity",
                "queue capacity must be at least 1",
            ));
        }
        if self.drain_timeout_secs == 0 {
            errors.push(ValidationError::new(
                "session.drain_timeout_secs",
                "drain timeout must be at least 1 second",
            ));
        }

        errors
    }

    /// How long shutdown waits for queued commands.
    pub fn drain_timeout(&self) -> Duration {
        Duration::from_secs(self.drain_timeout_secs)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// A single validation error with context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The field path (e.g., `server.bind` or `device.address`).
    pub field: String,
    /// Description of the validation failure.
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ledgate")
        .join("server.toml")
}
