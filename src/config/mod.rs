//! Configuration module for Genesis
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`GENESIS_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use genesis::config::GenesisConfig;
//!
//! let config = GenesisConfig::default();
//! assert_eq!(config.server.port, 8080);
//! assert_eq!(config.providers.len(), 3);
//!
//! let toml = r#"
//! [circuit_breaker]
//! failure_threshold = 2
//! "#;
//! let config: GenesisConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.circuit_breaker.failure_threshold, 2);
//! ```

pub mod error;
pub mod logging;
pub mod provider;
pub mod server;
pub mod streaming;

pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use provider::{default_providers, ProviderConfig};
pub use server::ServerConfig;
pub use streaming::{RequestLogConfig, StreamingConfig};

// Section types owned by their modules
pub use crate::circuit_breaker::CircuitBreakerConfig;
pub use crate::recovery::RecoveryConfig;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Unified configuration for the Genesis router.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenesisConfig {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Per-provider breaker settings
    pub circuit_breaker: CircuitBreakerConfig,
    /// Recovery retries and error log
    pub recovery: RecoveryConfig,
    /// Response stream pacing and deadlines
    pub streaming: StreamingConfig,
    /// Optional REST request log
    pub request_log: RequestLogConfig,
    /// Provider table
    pub providers: Vec<ProviderConfig>,
}

impl Default for GenesisConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            circuit_breaker: CircuitBreakerConfig::default(),
            recovery: RecoveryConfig::default(),
            streaming: StreamingConfig::default(),
            request_log: RequestLogConfig::default(),
            providers: default_providers(),
        }
    }
}

impl GenesisConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supports GENESIS_* environment variables for common settings.
    /// Invalid values are silently ignored (defaults are kept).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(port) = std::env::var("GENESIS_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
        if let Ok(host) = std::env::var("GENESIS_HOST") {
            self.server.host = host;
        }

        if let Ok(level) = std::env::var("GENESIS_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("GENESIS_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation {
                field: "server.port".to_string(),
                message: "port must be non-zero".to_string(),
            });
        }

        if self.circuit_breaker.failure_threshold == 0 {
            return Err(ConfigError::Validation {
                field: "circuit_breaker.failure_threshold".to_string(),
                message: "threshold must be at least 1".to_string(),
            });
        }

        if self.recovery.max_retries == 0 {
            return Err(ConfigError::Validation {
                field: "recovery.max_retries".to_string(),
                message: "at least one attempt is required".to_string(),
            });
        }
        if self.recovery.error_log_capacity == 0 {
            return Err(ConfigError::Validation {
                field: "recovery.error_log_capacity".to_string(),
                message: "capacity must be non-zero".to_string(),
            });
        }
        if self.recovery.backoff_multiplier < 1.0 {
            return Err(ConfigError::Validation {
                field: "recovery.backoff_multiplier".to_string(),
                message: "multiplier must be >= 1.0".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for (i, provider) in self.providers.iter().enumerate() {
            if provider.id.is_empty() {
                return Err(ConfigError::Validation {
                    field: format!("providers[{}].id", i),
                    message: "id cannot be empty".to_string(),
                });
            }
            if !seen.insert(provider.id.as_str()) {
                return Err(ConfigError::Validation {
                    field: format!("providers[{}].id", i),
                    message: format!("duplicate provider id '{}'", provider.id),
                });
            }
            if provider.endpoint.is_empty() {
                return Err(ConfigError::Validation {
                    field: format!("providers[{}].endpoint", i),
                    message: "endpoint cannot be empty".to_string(),
                });
            }
        }

        Ok(())
    }
}
