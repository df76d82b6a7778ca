//! `[server]` section

use serde::{Deserialize, Serialize};

/// Where the HTTP API listens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
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

impl ServerConfig {
    /// `host:port` for the listener. IPv6 hosts are bracketed.
    pub fn bind_address(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_binds_all_interfaces() {
        assert_eq!(ServerConfig::default().bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_ipv6_host_is_bracketed() {
        let config = ServerConfig {
            host: "::1".to_string(),
            port: 9000,
        };
        assert_eq!(config.bind_address(), "[::1]:9000");
    }
}
