//! Configuration management
//!
//! Handles:
//! - Logstash endpoint settings (host, port, stats path, timeout)
//! - Zabbix-side settings (discovery key)
//! - Layering: defaults, then TOML file, then command line

use crate::fetch::DEFAULT_TIMEOUT;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable pointing to a config file
pub const CONFIG_ENV: &str = "LOGSTASH_PROBE_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub logstash: LogstashConfig,
    pub zabbix: ZabbixConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogstashConfig {
    pub host: String,
    pub port: u16,
    pub stats_path: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZabbixConfig {
    pub discovery_key: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            logstash: LogstashConfig::default(),
            zabbix: ZabbixConfig::default(),
        }
    }
}

impl Default for LogstashConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 9600,
            stats_path: "/_node/stats/".to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl Default for ZabbixConfig {
    fn default() -> Self {
        Self {
            discovery_key: "logstash.node.discovery".to_string(),
        }
    }
}

impl ProbeConfig {
    /// Loads the config file if one applies, defaults otherwise.
    ///
    /// An explicit path must exist. The env var and OS config dir paths are
    /// optional and skipped when absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::load_with(explicit, std::env::var_os(CONFIG_ENV))
    }

    /// `load` with the value of `$LOGSTASH_PROBE_CONFIG` passed in
    fn load_with(explicit: Option<&Path>, from_env: Option<OsString>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let candidate = match from_env {
            Some(path) => Some(PathBuf::from(path)),
            None => Self::config_file_path().ok(),
        };

        match candidate {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: ProbeConfig = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// OS-specific config file path
    pub fn config_file_path() -> Result<PathBuf> {
        let mut path = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;

        path.push("logstash-probe");
        path.push("config.toml");
        Ok(path)
    }

    /// Command-line values win over file values
    pub fn with_overrides(mut self, host: Option<String>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            self.logstash.host = host;
        }
        if let Some(port) = port {
            self.logstash.port = port;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.logstash.host.trim().is_empty() {
            anyhow::bail!("Logstash host must not be empty");
        }
        if self.logstash.port == 0 {
            anyhow::bail!("Logstash port must be positive");
        }
        if !self.logstash.stats_path.starts_with('/') {
            anyhow::bail!("Stats path must be absolute, got '{}'", self.logstash.stats_path);
        }
        if self.logstash.timeout_secs == 0 {
            anyhow::bail!("Timeout must be at least one second");
        }
        if self.zabbix.discovery_key.is_empty() {
            anyhow::bail!("Discovery key must not be empty");
        }
        Ok(())
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.logstash.timeout_secs)
    }
}
