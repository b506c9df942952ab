use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::registry::RegistryConfig;
use super::server::{default_bind, Protocol, TlsConfig};
use super::static_records::StaticRecordConfig;

const LOCAL_CONFIG_PATH: &str = "subscriber-dns.toml";
const SYSTEM_CONFIG_PATH: &str = "/etc/subscriber-dns/config.toml";

/// Main configuration structure for Subscriber DNS
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Listen address and port
    #[serde(default = "default_bind")]
    pub bind: String,

    #[serde(default)]
    pub protocol: Protocol,

    /// Domain answered from the device registry
    #[serde(default)]
    pub domain: String,

    /// Site identifier scoping registry lookups
    #[serde(default)]
    pub site: String,

    #[serde(default)]
    pub tls: Option<TlsConfig>,

    #[serde(default, alias = "customRecords")]
    pub static_records: Vec<StaticRecordConfig>,

    #[serde(default, alias = "roc")]
    pub registry: RegistryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            protocol: Protocol::default(),
            domain: String::new(),
            site: String::new(),
            tls: None,
            static_records: Vec::new(),
            registry: RegistryConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from files, apply overrides and validate.
    ///
    /// Files are merged in order, later keys replacing earlier ones. With no
    /// explicit paths, `subscriber-dns.toml` in the working directory and then
    /// `/etc/subscriber-dns/config.toml` are tried.
    pub fn load<P: AsRef<Path>>(
        paths: &[P],
        cli_overrides: CliOverrides,
    ) -> Result<Self, ConfigError> {
        let mut config = if !paths.is_empty() {
            Self::from_files(paths)?
        } else if Path::new(LOCAL_CONFIG_PATH).exists() {
            Self::from_files(&[LOCAL_CONFIG_PATH])?
        } else if Path::new(SYSTEM_CONFIG_PATH).exists() {
            Self::from_files(&[SYSTEM_CONFIG_PATH])?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        config.validate()?;
        Ok(config)
    }

    /// Parse and merge the given files without validating the result.
    pub fn from_files<P: AsRef<Path>>(paths: &[P]) -> Result<Self, ConfigError> {
        let mut merged = toml::Table::new();
        for path in paths {
            let path = path.as_ref();
            let contents = std::fs::read_to_string(path)
                .map_err(|e| ConfigError::FileRead(path.display().to_string(), e.to_string()))?;
            let table: toml::Table = toml::from_str(&contents)
                .map_err(|e| ConfigError::Parse(format!("{}: {}", path.display(), e)))?;
            merge_tables(&mut merged, table);
        }

        toml::Value::Table(merged)
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::Parse(e.to_string()))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(bind) = overrides.bind {
            self.bind = bind;
        }
        if let Some(protocol) = overrides.protocol {
            self.protocol = protocol;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind.is_empty() {
            return Err(ConfigError::Validation(
                "missing bind address and port".to_string(),
            ));
        }

        if self.bind.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::Validation(format!(
                "invalid bind address '{}'",
                self.bind
            )));
        }

        if self.domain.trim().is_empty() {
            return Err(ConfigError::Validation(
                "missing domain to serve".to_string(),
            ));
        }

        if self.registry.url.is_empty() {
            return Err(ConfigError::Validation("missing registry URL".to_string()));
        }

        if !is_url_syntax(&self.registry.url) {
            return Err(ConfigError::Validation(format!(
                "invalid registry URL '{}'",
                self.registry.url
            )));
        }

        if self.registry.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "registry timeout must be greater than 0".to_string(),
            ));
        }

        if let Some(openidc) = &self.registry.openidc {
            if !is_url_syntax(&openidc.token_url) {
                return Err(ConfigError::Validation(format!(
                    "invalid token URL '{}'",
                    openidc.token_url
                )));
            }
        }

        if self.protocol == Protocol::TcpTls && self.tls.is_none() {
            return Err(ConfigError::Validation(
                "protocol tcp-tls requires [tls] cert_path and key_path".to_string(),
            ));
        }

        Ok(())
    }

    /// Socket address to listen on. Only meaningful after `validate`.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind
            .parse()
            .map_err(|_| ConfigError::Validation(format!("invalid bind address '{}'", self.bind)))
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub bind: Option<String>,
    pub protocol: Option<Protocol>,
    pub log_level: Option<String>,
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

fn is_url_syntax(url: &str) -> bool {
    let Some((scheme, rest)) = url.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    let scheme_ok = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));

    scheme_ok && !rest.is_empty() && !rest.starts_with('/') && !url.chars().any(char::is_whitespace)
}
