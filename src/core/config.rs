//! Configuration management for tracestack.
//!
//! This module provides configuration handling with:
//! - YAML file support
//! - CLI argument overrides
//! - Validation and defaults

use crate::core::{Result, TraceStackError};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Complete configuration for tracestack
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Agent-side identifier generation
    pub agent: AgentConfig,
    /// Trace stack reconstruction
    pub stack: StackConfig,
    /// Segment storage and dictionaries
    pub storage: StorageConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Debug mode
    #[serde(skip)]
    pub debug: bool,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address for the read API
    pub bind_address: IpAddr,
    /// Port for the read API
    pub port: u16,
    /// Enable permissive CORS headers
    pub enable_cors: bool,
    /// Per-request timeout
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

/// Agent configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Application instance id already assigned by the collector, if any
    pub instance_id: Option<u32>,
}

/// Trace stack configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    /// Deepest call depth walked below a root span
    pub max_depth: usize,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file of segments preloaded into the in-memory store
    pub fixture: Option<PathBuf>,
    /// Entries kept by each read-through dictionary cache
    pub dictionary_cache_size: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: LogLevel,
    /// Structured logging format
    pub structured: bool,
}

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Everything, including per-span detail
    Trace,
    /// Per-segment progress
    Debug,
    /// Lifecycle events
    Info,
    /// Absorbed failures
    Warn,
    /// Failures only
    Error,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_address: IpAddr::from([0, 0, 0, 0]),
            port: 12800,
            enable_cors: true,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl Default for StackConfig {
    fn default() -> Self {
        StackConfig { max_depth: 512 }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            fixture: None,
            dictionary_cache_size: 10_000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: LogLevel::Info,
            structured: false,
        }
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Result<Self> {
        let config = Config::default();
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a YAML configuration file
    pub async fn from_file(path: &Path) -> Result<Self> {
        ConfigBuilder::new().from_file(path).await?.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(TraceStackError::config("server port must be greater than 0"));
        }

        if self.server.request_timeout.is_zero() {
            return Err(TraceStackError::config("request_timeout must be greater than 0"));
        }

        if self.stack.max_depth == 0 {
            return Err(TraceStackError::config("stack max_depth must be greater than 0"));
        }

        if self.storage.dictionary_cache_size == 0 {
            return Err(TraceStackError::config(
                "dictionary_cache_size must be greater than 0",
            ));
        }

        Ok(())
    }
}

impl LogLevel {
    /// Convert to tracing filter string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Configuration builder for programmatic construction
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with defaults
    pub fn new() -> Self {
        ConfigBuilder {
            config: Config::default(),
        }
    }

    /// Load configuration from YAML string
    pub fn from_yaml(mut self, yaml: &str) -> Result<Self> {
        let debug = self.config.debug;
        self.config = serde_yaml::from_str(yaml)
            .map_err(|e| TraceStackError::config(format!("Failed to parse YAML config: {}", e)))?;
        self.config.debug = debug;
        Ok(self)
    }

    /// Load configuration from a YAML file
    pub async fn from_file(self, path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            TraceStackError::config(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        self.from_yaml(&content)
    }

    /// Set server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    /// Set the registered application instance id
    pub fn instance_id(mut self, id: u32) -> Self {
        self.config.agent.instance_id = Some(id);
        self
    }

    /// Set maximum traversal depth
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.stack.max_depth = depth;
        self
    }

    /// Set segment fixture file
    pub fn fixture(mut self, path: PathBuf) -> Self {
        self.config.storage.fixture = Some(path);
        self
    }

    /// Set debug mode
    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
