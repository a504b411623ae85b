//! Process configuration
//!
//! Values come from an optional TOML file (path in `RELAY_CONFIG`) and are
//! overridden by environment variables. `main` loads a `.env` file first.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{RelayError, Result};
use crate::event::InputShape;
use crate::notifier::DEFAULT_DELIVERY_TIMEOUT;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";
/// Jenkins payloads with long change sets easily pass axum's 2 MB default
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Settings as they appear in the TOML file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    discord_webhook_url: Option<String>,
    jenkins_url: Option<String>,
    port: Option<u16>,
    bind_host: Option<String>,
    input_shape: Option<InputShape>,
    delivery_timeout_secs: Option<u64>,
    max_body_bytes: Option<usize>,
    log_dir: Option<PathBuf>,
}

/// Immutable configuration, built once before the listener binds
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Destination for every notification
    pub discord_webhook_url: String,
    /// Jenkins base URL; only printed in startup logs
    pub jenkins_url: Option<String>,
    pub port: u16,
    pub bind_host: String,
    pub input_shape: InputShape,
    pub delivery_timeout: Duration,
    /// Largest request body the webhook routes will buffer
    pub max_body_bytes: usize,
    pub log_dir: Option<PathBuf>,
}

impl RelayConfig {
    /// Reads the config file named by `RELAY_CONFIG` (if any) and the
    /// process environment.
    pub fn from_env() -> Result<Self> {
        let lookup = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());

        let file = match lookup("RELAY_CONFIG") {
            Some(path) => load_file(Path::new(&path))?,
            None => FileConfig::default(),
        };

        Self::resolve(file, lookup)
    }

    /// Merges file values with `lookup`, which wins when it returns a value.
    fn resolve(file: FileConfig, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let discord_webhook_url = lookup("DISCORD_WEBHOOK_URL")
            .or(file.discord_webhook_url)
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| {
                RelayError::Config("DISCORD_WEBHOOK_URL environment variable is required".into())
            })?;

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| RelayError::Config(format!("Invalid PORT value: {}", raw)))?,
            None => file.port.unwrap_or(DEFAULT_PORT),
        };

        let input_shape = match lookup("INPUT_SHAPE") {
            Some(raw) => raw.parse()?,
            None => file.input_shape.unwrap_or_default(),
        };

        let delivery_timeout = match lookup("DELIVERY_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|_| {
                    RelayError::Config(format!("Invalid DELIVERY_TIMEOUT_SECS value: {}", raw))
                })?;
                Duration::from_secs(secs)
            }
            None => file
                .delivery_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_DELIVERY_TIMEOUT),
        };
        if delivery_timeout.is_zero() {
            return Err(RelayError::Config(
                "Delivery timeout must be greater than zero".into(),
            ));
        }

        let max_body_bytes = match lookup("MAX_BODY_BYTES") {
            Some(raw) => raw.trim().parse::<usize>().map_err(|_| {
                RelayError::Config(format!("Invalid MAX_BODY_BYTES value: {}", raw))
            })?,
            None => file.max_body_bytes.unwrap_or(DEFAULT_MAX_BODY_BYTES),
        };
        if max_body_bytes == 0 {
            return Err(RelayError::Config(
                "Body limit must be greater than zero".into(),
            ));
        }

        Ok(Self {
            discord_webhook_url,
            jenkins_url: lookup("JENKINS_URL").or(file.jenkins_url),
            port,
            bind_host: lookup("BIND_HOST")
                .or(file.bind_host)
                .unwrap_or_else(|| DEFAULT_BIND_HOST.to_string()),
            input_shape,
            delivery_timeout,
            max_body_bytes,
            log_dir: lookup("LOG_DIR").map(PathBuf::from).or(file.log_dir),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }
}

/// Load and parse the configuration file
fn load_file(path: &Path) -> Result<FileConfig> {
    let config_str = fs::read_to_string(path).map_err(|e| {
        RelayError::Config(format!(
            "Failed to read config file '{}': {}",
            path.display(),
            e
        ))
    })?;

    toml::from_str(&config_str).map_err(|e| {
        RelayError::Config(format!(
            "Failed to parse config file '{}': {}",
            path.display(),
            e
        ))
    })
}
