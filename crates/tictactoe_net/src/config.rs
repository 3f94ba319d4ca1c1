//! Server and client configuration.
//!
//! Values come from, in increasing priority: built-in defaults, an optional
//! TOML file, and command-line flags.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Lowest port an operator may choose.
pub const MIN_PORT: u16 = 1024;

/// Highest valid TCP port.
pub const MAX_PORT: u16 = u16::MAX;

/// How the server schedules connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServeMode {
    /// One connection, one move, fully handled before the next accept.
    #[default]
    Sequential,
    /// Up to two connections, one per mark, each submitting many moves.
    Concurrent,
}

/// Configuration for the game server.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_server_host")]
    host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    port: u16,

    /// Milliseconds to wait for a connected client to send its move.
    #[serde(default = "default_read_timeout_ms")]
    read_timeout_ms: u64,

    /// Connection scheduling.
    #[serde(default)]
    mode: ServeMode,
}

/// Configuration for the one-shot client.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Server address.
    #[serde(default = "default_client_host")]
    host: String,

    /// Server port.
    #[serde(default = "default_port")]
    port: u16,

    /// Milliseconds to wait for the server's reply.
    #[serde(default = "default_read_timeout_ms")]
    read_timeout_ms: u64,
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_client_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8282
}

fn default_read_timeout_ms() -> u64 {
    30_000
}

impl ServerConfig {
    /// Creates a configuration with default timeout and sequential mode.
    ///
    /// The port is not range-checked here so tests can bind port 0.
    #[instrument]
    pub fn new(host: impl Into<String> + std::fmt::Debug, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            read_timeout_ms: default_read_timeout_ms(),
            mode: ServeMode::default(),
        }
    }

    /// Loads configuration from a TOML file.
    ///
    /// The port is checked by [`Self::validate`] once command-line overrides
    /// have been applied.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading server config from file");
        let config: Self = load_toml(path.as_ref())?;
        info!(host = %config.host, port = config.port, mode = ?config.mode, "Server config loaded");
        Ok(config)
    }

    /// Replaces the bind address.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Replaces the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Replaces the scheduling mode.
    pub fn with_mode(mut self, mode: ServeMode) -> Self {
        self.mode = mode;
        self
    }

    /// Replaces the per-connection read timeout.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX).max(1);
        self
    }

    /// Read timeout as a `Duration`.
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Checks the port is one an operator may choose.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_port(self.port).map(|_| ())
    }

    /// `host:port` for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(default_server_host(), default_port())
    }
}

impl ClientConfig {
    /// Creates a configuration with the default reply timeout.
    #[instrument]
    pub fn new(host: impl Into<String> + std::fmt::Debug, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            read_timeout_ms: default_read_timeout_ms(),
        }
    }

    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        load_toml(path.as_ref())
    }

    /// Checks the port is one an operator may choose.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_port(self.port).map(|_| ())
    }

    /// Replaces the reply timeout.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX).max(1);
        self
    }

    /// Reply timeout as a `Duration`.
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// `host:port` to connect to.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn load_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
    toml::from_str(&content).map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))
}

/// Parses a port given on the command line. Only ASCII digits are accepted.
pub fn parse_port(input: &str) -> Result<u16, ConfigError> {
    if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ConfigError::new(port_range_message()));
    }
    let port: u32 = input
        .parse()
        .map_err(|_| ConfigError::new(port_range_message()))?;
    let port = u16::try_from(port).map_err(|_| ConfigError::new(port_range_message()))?;
    validate_port(port)
}

/// Checks a port is within [`MIN_PORT`, `MAX_PORT`].
pub fn validate_port(port: u16) -> Result<u16, ConfigError> {
    if port < MIN_PORT {
        return Err(ConfigError::new(port_range_message()));
    }
    Ok(port)
}

fn port_range_message() -> String {
    format!(
        "Please enter a port number between {} and {}.",
        MIN_PORT, MAX_PORT
    )
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("{}", message)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
