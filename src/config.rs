use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use crate::prober::ConnType;
use crate::util::join_host_port;

pub const DEFAULT_CONN_TYPE: &str = "tcp";
pub const DEFAULT_DEST_HOST: &str = "localhost";
pub const DEFAULT_DEST_PORT: &str = "80";
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid timeout value: {0}")]
    InvalidTimeout(String),
    #[error("invalid HTTPS_VERIFY value: {0}")]
    InvalidVerify(String),
    #[error("invalid log level: {0}. Valid levels are: trace, debug, info, warn, error")]
    InvalidLogLevel(String),
    #[error("unsupported connection type: {0}")]
    UnsupportedConnType(String),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProbeConfig {
    pub conn_type: ConnType,
    pub dest_host: String,
    pub dest_port: String,
    pub timeout: Duration,
    pub https_verify: bool,
    pub log_level: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            conn_type: ConnType::Tcp,
            dest_host: DEFAULT_DEST_HOST.to_string(),
            dest_port: DEFAULT_DEST_PORT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            https_verify: true,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl ProbeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from a variable lookup. Unset variables take their
    /// default; set-but-empty ones are parsed like any other value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let timeout = match lookup("CONN_TIMEOUT") {
            Some(raw) => parse_timeout(&raw)?,
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let https_verify = match lookup("HTTPS_VERIFY") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::InvalidVerify(raw))?,
            None => true,
        };

        let log_level = get("LOG_LEVEL", DEFAULT_LOG_LEVEL);
        parse_tracing_level(&log_level)?;

        let raw_type = get("CONN_TYPE", DEFAULT_CONN_TYPE);
        let conn_type = raw_type
            .parse::<ConnType>()
            .map_err(|_| ConfigError::UnsupportedConnType(raw_type))?;

        Ok(Self {
            conn_type,
            dest_host: get("DEST_HOST", DEFAULT_DEST_HOST),
            dest_port: get("DEST_PORT", DEFAULT_DEST_PORT),
            timeout,
            https_verify,
            log_level,
        })
    }

    /// Destination as `host:port`, bracketing IPv6 literals.
    pub fn address(&self) -> String {
        join_host_port(&self.dest_host, &self.dest_port)
    }

    /// Effective deadline for the network call. Zero means wait indefinitely.
    pub fn deadline(&self) -> Option<Duration> {
        if self.timeout.is_zero() {
            None
        } else {
            Some(self.timeout)
        }
    }

    pub fn get_tracing_level(&self) -> Result<tracing::Level, ConfigError> {
        parse_tracing_level(&self.log_level)
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    raw.parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| ConfigError::InvalidTimeout(raw.to_string()))
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

fn parse_tracing_level(raw: &str) -> Result<tracing::Level, ConfigError> {
    match raw.to_lowercase().as_str() {
        "trace" => Ok(tracing::Level::TRACE),
        "debug" => Ok(tracing::Level::DEBUG),
        "info" => Ok(tracing::Level::INFO),
        "warn" | "warning" => Ok(tracing::Level::WARN),
        "error" => Ok(tracing::Level::ERROR),
        _ => Err(ConfigError::InvalidLogLevel(raw.to_string())),
    }
}
