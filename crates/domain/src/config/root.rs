use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::dns::DnsConfig;
use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::server::ServerConfig;
use super::store::StoreConfig;
use crate::record_type::RecordType;

/// Main configuration structure for Keystone DNS.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Listener configuration (bind address, port).
    #[serde(default)]
    pub server: ServerConfig,

    /// Resolution, forwarding and cache configuration.
    #[serde(default)]
    pub dns: DnsConfig,

    /// Seed records for the in-memory store adapter.
    #[serde(default)]
    pub store: StoreConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults.
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. keystone-dns.toml in the current directory
    /// 3. /etc/keystone-dns/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if std::path::Path::new("keystone-dns.toml").exists() {
            Self::from_file("keystone-dns.toml")?
        } else if std::path::Path::new("/etc/keystone-dns/config.toml").exists() {
            Self::from_file("/etc/keystone-dns/config.toml")?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(port) = overrides.dns_port {
            self.server.dns_port = port;
        }
        if let Some(bind) = overrides.bind_address {
            self.server.bind_address = bind;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// Fatal misconfiguration check; the process refuses to start on error.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.dns_port == 0 {
            return Err(ConfigError::Validation("DNS port cannot be 0".to_string()));
        }

        for (i, forwarder) in self.dns.forwarders.iter().enumerate() {
            let trimmed = forwarder.trim();
            if i == 0 && trimmed == "!" {
                continue;
            }
            if trimmed.parse::<std::net::SocketAddr>().is_err() {
                return Err(ConfigError::Validation(format!(
                    "Invalid forwarder address '{}'",
                    forwarder
                )));
            }
        }

        for record in &self.store.records {
            if RecordType::from_str(&record.record_type).is_err() {
                return Err(ConfigError::Validation(format!(
                    "Record '{}' has unsupported type '{}'",
                    record.name, record.record_type
                )));
            }
        }

        Ok(())
    }
}

/// Command-line overrides for configuration.
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub dns_port: Option<u16>,
    pub bind_address: Option<String>,
    pub log_level: Option<String>,
}
