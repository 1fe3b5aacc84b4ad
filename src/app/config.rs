//! Application configuration
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `FASTA_COMBINE_*` environment variables, then command-line flags.

use crate::export::{Envelope, ExportSettings, HeaderFields, PolicyKind};
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

pub const ENV_BIND: &str = "FASTA_COMBINE_BIND";
pub const ENV_PORT: &str = "FASTA_COMBINE_PORT";
pub const ENV_REQUEST_TIMEOUT: &str = "FASTA_COMBINE_REQUEST_TIMEOUT";
pub const ENV_LOG_LEVEL: &str = "FASTA_COMBINE_LOG_LEVEL";

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Contents of the TOML configuration file; every key is optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub bind: Option<IpAddr>,
    pub port: Option<u16>,
    #[serde(default, with = "humantime_serde")]
    pub request_timeout: Option<Duration>,
    pub log_level: Option<String>,
    pub default_policy: Option<PolicyKind>,
    pub default_fields: Option<Vec<String>>,
    pub sequences_envelope: Option<Envelope>,
    pub metadata_envelope: Option<Envelope>,
}

impl FileConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid configuration file")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

/// Command-line overrides, highest precedence
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub verbose: u8,
    pub bind: Option<IpAddr>,
    pub port: Option<u16>,
    pub request_timeout: Option<Duration>,
}

/// Application configuration structure
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Verbosity level for logging
    pub verbose: u8,
    pub bind: IpAddr,
    pub port: u16,
    /// Timeout applied to each upstream fetch
    pub request_timeout: Duration,
    /// Explicit log filter, used when no `-v` flag is given
    pub log_level: Option<String>,
    pub export: ExportSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            verbose: 0,
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            log_level: None,
            export: ExportSettings::default(),
        }
    }
}

impl AppConfig {
    /// Resolve the full configuration from every layer
    pub fn load(config_path: Option<&Path>, overrides: CliOverrides) -> Result<Self> {
        let mut config = Self::default();
        if let Some(path) = config_path {
            config.apply_file(FileConfig::load(path)?)?;
        }
        config.merge_env_vars()?;
        config.apply_overrides(overrides);
        Ok(config)
    }

    pub fn apply_file(&mut self, file: FileConfig) -> Result<()> {
        if let Some(bind) = file.bind {
            self.bind = bind;
        }
        if let Some(port) = file.port {
            self.port = port;
        }
        if let Some(timeout) = file.request_timeout {
            self.request_timeout = timeout;
        }
        if file.log_level.is_some() {
            self.log_level = file.log_level;
        }
        if let Some(policy) = file.default_policy {
            self.export.default_policy = policy;
        }
        if let Some(fields) = file.default_fields {
            self.export.default_fields = HeaderFields::new(fields)
                .ok_or_else(|| anyhow!("default_fields must name at least one field"))?;
        }
        if let Some(envelope) = file.sequences_envelope {
            self.export.sequences_envelope = envelope;
        }
        if let Some(envelope) = file.metadata_envelope {
            self.export.metadata_envelope = envelope;
        }
        Ok(())
    }

    pub fn merge_env_vars(&mut self) -> Result<()> {
        self.merge_env_with(|key| std::env::var(key).ok())
    }

    /// Apply environment overrides read through `lookup`
    pub fn merge_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup(ENV_BIND) {
            self.bind = bind
                .parse()
                .with_context(|| format!("{ENV_BIND} is not an IP address: {bind}"))?;
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.port = port
                .parse()
                .with_context(|| format!("{ENV_PORT} is not a port number: {port}"))?;
        }
        if let Some(timeout) = lookup(ENV_REQUEST_TIMEOUT) {
            self.request_timeout = parse_duration(&timeout)
                .with_context(|| format!("{ENV_REQUEST_TIMEOUT} is not a duration: {timeout}"))?;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.log_level = Some(level);
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: CliOverrides) {
        self.verbose = overrides.verbose;
        if let Some(bind) = overrides.bind {
            self.bind = bind;
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(timeout) = overrides.request_timeout {
            self.request_timeout = timeout;
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    /// Get the log filter: `-v` flags win over a configured level
    pub fn log_level(&self) -> String {
        match (self.verbose, &self.log_level) {
            (0, Some(level)) => level.clone(),
            (0, None) => "info".to_string(),
            (1, _) => "debug".to_string(),
            (2, _) => "trace".to_string(),
            _ => "trace,hyper=debug,tower=debug".to_string(),
        }
    }
}

/// Parse a human-readable duration such as `30s` or `2m`
pub fn parse_duration(value: &str) -> Result<Duration> {
    humantime_serde::re::humantime::parse_duration(value.trim())
        .map_err(|e| anyhow!("invalid duration '{}': {}", value, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:3000");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.log_level(), "info");
        assert_eq!(config.export.default_policy, PolicyKind::Lenient);
        assert_eq!(config.export.sequences_envelope, Envelope::Data);
    }

    #[test]
    fn test_file_config() {
        let file = FileConfig::from_toml(
            r#"
            bind = "127.0.0.1"
            port = 8080
            request_timeout = "5s"
            log_level = "warn"
            default_policy = "presence"
            default_fields = ["displayName", "country"]
            sequences_envelope = "bare"
            "#,
        )
        .unwrap();

        let mut config = AppConfig::default();
        config.apply_file(file).unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8080");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.log_level(), "warn");
        assert_eq!(config.export.default_policy, PolicyKind::Presence);
        assert_eq!(
            config.export.default_fields.as_slice(),
            ["displayName", "country"]
        );
        assert_eq!(config.export.sequences_envelope, Envelope::Bare);
        assert_eq!(config.export.metadata_envelope, Envelope::Data);
    }

    #[test]
    fn test_file_config_rejects_unknown_keys_and_empty_fields() {
        assert!(FileConfig::from_toml("colour = \"blue\"").is_err());
        assert!(FileConfig::from_toml("sequences_envelope = \"xml\"").is_err());

        let file = FileConfig::from_toml("default_fields = []").unwrap();
        assert!(AppConfig::default().apply_file(file).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_PORT, "9000"),
            (ENV_REQUEST_TIMEOUT, "1m"),
            (ENV_LOG_LEVEL, "debug"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config
            .merge_env_with(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.log_level(), "debug");
    }

    #[test]
    fn test_invalid_env_value_is_error() {
        let mut config = AppConfig::default();
        let result = config.merge_env_with(|key| (key == ENV_PORT).then(|| "http".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_overrides_win() {
        let mut config = AppConfig {
            log_level: Some("warn".to_string()),
            ..AppConfig::default()
        };
        config.apply_overrides(CliOverrides {
            verbose: 2,
            port: Some(4000),
            ..CliOverrides::default()
        });
        assert_eq!(config.port, 4000);
        assert_eq!(config.log_level(), "trace");
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert!(parse_duration("soon").is_err());
    }
}
