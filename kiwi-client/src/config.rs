//! Loading [`ClientConfig`] from a named JSON configuration section.
//!
//! ```json
//! {
//!   "KiwiStore": { "Host": "10.0.0.5", "Port": 5555, "ReadTimeoutMs": 2000 }
//! }
//! ```
//!
//! `Host` and `Port` default to `127.0.0.1:5555`. `<SECTION>__HOST` and
//! `<SECTION>__PORT` environment variables (section name upper-cased)
//! override the file. The endpoint is always built through
//! [`Endpoint::new`], so an out-of-range port fails here, at startup.

use std::io;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use kiwi_common::{Endpoint, InvalidArgument, DEFAULT_HOST, DEFAULT_PORT};

use crate::client::ClientConfig;

/// Section name used when the caller does not pick one.
pub const DEFAULT_SECTION: &str = "KiwiStore";

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Startup configuration failures. None of these are recoverable.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("configuration section '{0}' is missing")]
    MissingSection(String),
    #[error("invalid store endpoint: {0}")]
    InvalidEndpoint(#[from] InvalidArgument),
    #[error("environment variable {var} has invalid value '{value}'")]
    InvalidEnv { var: String, value: String },
    #[error("invalid setting {0}: must be non-zero")]
    ZeroSetting(&'static str),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StoreSection {
    host: Option<String>,
    port: Option<u32>,
    connect_timeout_ms: Option<u64>,
    write_timeout_ms: Option<u64>,
    read_timeout_ms: Option<u64>,
    max_response_bytes: Option<usize>,
}

impl ClientConfig {
    /// Loads `section` from a JSON file, applying process environment overrides.
    pub fn from_file(path: impl AsRef<Path>, section: &str) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        debug!(path = %path.as_ref().display(), section, "loading store configuration");
        Self::from_json_str(&text, section)
    }

    /// Loads `section` from JSON text, applying process environment overrides.
    pub fn from_json_str(text: &str, section: &str) -> ConfigResult<Self> {
        Self::from_json_str_with_env(text, section, |var| std::env::var(var).ok())
    }

    /// Like [`ClientConfig::from_json_str`] with an explicit variable lookup.
    pub fn from_json_str_with_env<F>(text: &str, section: &str, env: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let document: serde_json::Value = serde_json::from_str(text)?;
        let raw = document
            .get(section)
            .ok_or_else(|| ConfigError::MissingSection(section.to_string()))?;
        let mut parsed: StoreSection = serde_json::from_value(raw.clone())?;
        apply_env(&mut parsed, section, env)?;
        parsed.into_config()
    }
}

fn apply_env<F>(section: &mut StoreSection, name: &str, env: F) -> ConfigResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    let prefix = name.to_ascii_uppercase();

    let host_var = format!("{}__HOST", prefix);
    if let Some(host) = env(&host_var) {
        debug!(var = %host_var, "host overridden from environment");
        section.host = Some(host);
    }

    let port_var = format!("{}__PORT", prefix);
    if let Some(value) = env(&port_var) {
        let port = value.trim().parse::<u32>().map_err(|_| ConfigError::InvalidEnv {
            var: port_var.clone(),
            value: value.clone(),
        })?;
        debug!(var = %port_var, port, "port overridden from environment");
        section.port = Some(port);
    }

    Ok(())
}

impl StoreSection {
    fn into_config(self) -> ConfigResult<ClientConfig> {
        let endpoint = Endpoint::new(
            self.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
            self.port.unwrap_or(u32::from(DEFAULT_PORT)),
        )?;

        let mut config = ClientConfig::for_endpoint(endpoint);
        if let Some(ms) = self.connect_timeout_ms {
            config.connect_timeout = millis("ConnectTimeoutMs", ms)?;
        }
        if let Some(ms) = self.write_timeout_ms {
            config.write_timeout = millis("WriteTimeoutMs", ms)?;
        }
        if let Some(ms) = self.read_timeout_ms {
            config.read_timeout = millis("ReadTimeoutMs", ms)?;
        }
        if let Some(bytes) = self.max_response_bytes {
            if bytes == 0 {
                return Err(ConfigError::ZeroSetting("MaxResponseBytes"));
            }
            config.max_response_bytes = bytes;
        }
        Ok(config)
    }
}

fn millis(name: &'static str, ms: u64) -> ConfigResult<Duration> {
    if ms == 0 {
        return Err(ConfigError::ZeroSetting(name));
    }
    Ok(Duration::from_millis(ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn loads_named_section() {
        let json = r#"{
            "Logging": { "Level": "Info" },
            "KiwiStore": { "Host": "10.0.0.5", "Port": 6001, "ReadTimeoutMs": 250 }
        }"#;
        let config = ClientConfig::from_json_str_with_env(json, DEFAULT_SECTION, no_env).unwrap();
        assert_eq!(config.endpoint.to_string(), "10.0.0.5:6001");
        assert_eq!(config.read_timeout, Duration::from_millis(250));
        assert_eq!(config.connect_timeout, crate::client::DEFAULT_TIMEOUT);
    }

    #[test]
    fn empty_section_uses_defaults() {
        let config =
            ClientConfig::from_json_str_with_env(r#"{"KiwiStore": {}}"#, DEFAULT_SECTION, no_env)
                .unwrap();
        assert_eq!(config.endpoint, Endpoint::default());
    }

    #[test]
    fn missing_section_fails_fast() {
        let err = ClientConfig::from_json_str_with_env(r#"{"Other": {}}"#, DEFAULT_SECTION, no_env)
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingSection(ref name) if name == "KiwiStore"));
    }

    #[test]
    fn out_of_range_port_fails_fast() {
        let err = ClientConfig::from_json_str_with_env(
            r#"{"KiwiStore": {"Port": 80}}"#,
            DEFAULT_SECTION,
            no_env,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEndpoint(InvalidArgument::PortOutOfRange { port: 80 })
        ));
    }

    #[test]
    fn environment_overrides_file() {
        let env = |var: &str| match var {
            "KIWISTORE__HOST" => Some("store.prod".to_string()),
            "KIWISTORE__PORT" => Some("7001".to_string()),
            _ => None,
        };
        let config = ClientConfig::from_json_str_with_env(
            r#"{"KiwiStore": {"Host": "10.0.0.5", "Port": 6001}}"#,
            DEFAULT_SECTION,
            env,
        )
        .unwrap();
        assert_eq!(config.endpoint.to_string(), "store.prod:7001");
    }

    #[test]
    fn environment_port_is_validated() {
        let env = |var: &str| (var == "KIWISTORE__PORT").then(|| "seventy".to_string());
        let err = ClientConfig::from_json_str_with_env(r#"{"KiwiStore": {}}"#, DEFAULT_SECTION, env)
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { .. }));

        let env = |var: &str| (var == "KIWISTORE__PORT").then(|| "4000".to_string());
        let err = ClientConfig::from_json_str_with_env(r#"{"KiwiStore": {}}"#, DEFAULT_SECTION, env)
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEndpoint(_)));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = ClientConfig::from_json_str_with_env(
            r#"{"KiwiStore": {"ConnectTimeoutMs": 0}}"#,
            DEFAULT_SECTION,
            no_env,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ZeroSetting("ConnectTimeoutMs")));
    }
}
