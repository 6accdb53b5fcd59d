// SPDX-License-Identifier: MIT OR Apache-2.0
//! Configuration loading and validation for the command server.
//!
//! [`CmdsrvConfig`] is read once at startup (TOML file, then environment
//! overrides), validated, and then handed around as an immutable value.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during configuration loading or validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The requested configuration file was not found or is unreadable.
    #[error("config file not found: {path}")]
    FileNotFound {
        /// Path that was requested.
        path: String,
    },

    /// The file could not be parsed as valid TOML.
    #[error("failed to parse config: {reason}")]
    ParseError {
        /// Human-readable parse error detail.
        reason: String,
    },

    /// An environment override carried a value of the wrong shape.
    #[error("invalid value for {var}: {reason}")]
    InvalidEnv {
        /// Variable name.
        var: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Semantic validation failed (one or more problems).
    #[error("config validation failed: {reasons:?}")]
    ValidationError {
        /// Individual validation failure messages.
        reasons: Vec<String>,
    },
}

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

/// Advisory-level issues that do not prevent the server from starting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// A recommended optional field is empty.
    MissingOptionalField {
        /// Name of the missing field.
        field: String,
        /// Why it matters.
        hint: String,
    },
    /// The server listens on every interface while the API has no
    /// authentication.
    WildcardBind {
        /// Configured address.
        address: String,
    },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::MissingOptionalField { field, hint } => {
                write!(f, "missing optional field '{field}': {hint}")
            }
            ConfigWarning::WildcardBind { address } => {
                write!(
                    f,
                    "bind address '{address}' exposes unauthenticated command execution on all interfaces"
                )
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Config types
// ---------------------------------------------------------------------------

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct CmdsrvConfig {
    /// Build metadata reported by `GET /version`.
    #[serde(default)]
    pub cmdsrv: BuildInfo,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Listener settings.
    #[serde(default)]
    pub server: ServerConfig,
}

/// Build metadata, supplied by packaging.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(default)]
pub struct BuildInfo {
    /// Release identifier.
    pub version: String,
    /// Change-set (commit) identifier.
    pub change_set: String,
    /// Date of the change set.
    pub change_set_date: String,
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            change_set: String::new(),
            change_set_date: String::new(),
        }
    }
}

impl BuildInfo {
    /// The line served by `GET /version`.
    pub fn version_line(&self) -> String {
        format!(
            "version: {} changeSet:{} changeSetDate: {}",
            self.version, self.change_set, self.change_set_date
        )
    }
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum level: `error`, `warn`, `info`, `debug` or `trace`.
    pub level: String,
    /// Output formatter.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Full,
        }
    }
}

/// Log line formatter.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, one event per line with all fields.
    #[default]
    Full,
    /// Shorter human-readable lines.
    Compact,
    /// Newline-delimited JSON.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "unknown log format '{other}' (expected full, compact or json)"
            )),
        }
    }
}

/// Listener settings.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub bind_address: String,
    /// TCP port to bind.
    pub bind_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".into(),
            bind_port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// `address:port`, bracketing bare IPv6 addresses.
    pub fn socket_addr(&self) -> String {
        let addr = self.bind_address.as_str();
        if addr.contains(':') && !addr.starts_with('[') {
            format!("[{addr}]:{}", self.bind_port)
        } else {
            format!("{addr}:{}", self.bind_port)
        }
    }
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Port used when none is configured.
pub const DEFAULT_PORT: u16 = 8055;

/// Recognised log levels.
const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// Addresses that listen on every interface.
const WILDCARD_ADDRESSES: &[&str] = &["0.0.0.0", "::", "[::]"];

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load a [`CmdsrvConfig`] from an optional TOML file path.
///
/// * If `path` is `Some`, reads and parses the file.
/// * If `path` is `None`, starts from [`CmdsrvConfig::default()`].
///
/// Environment variable overrides are applied on top in both cases.
pub fn load_config(path: Option<&Path>) -> Result<CmdsrvConfig, ConfigError> {
    let mut config = match path {
        Some(p) => {
            let content = std::fs::read_to_string(p).map_err(|_| ConfigError::FileNotFound {
                path: p.display().to_string(),
            })?;
            parse_toml(&content)?
        }
        None => CmdsrvConfig::default(),
    };
    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Parse a TOML string into a [`CmdsrvConfig`].
pub fn parse_toml(content: &str) -> Result<CmdsrvConfig, ConfigError> {
    toml::from_str::<CmdsrvConfig>(content).map_err(|e| ConfigError::ParseError {
        reason: e.to_string(),
    })
}

/// JSON schema of the configuration file.
pub fn config_schema() -> serde_json::Value {
    serde_json::to_value(schemars::schema_for!(CmdsrvConfig)).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Env overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides.
///
/// Recognised variables:
/// - `CMDSRV_VERSION`
/// - `CMDSRV_CHANGE_SET`
/// - `CMDSRV_CHANGE_SET_DATE`
/// - `CMDSRV_LOG_LEVEL`
/// - `CMDSRV_LOG_FORMAT`
/// - `CMDSRV_BIND_ADDRESS`
/// - `CMDSRV_BIND_PORT`
pub fn apply_env_overrides(config: &mut CmdsrvConfig) -> Result<(), ConfigError> {
    apply_overrides_from(config, |var| std::env::var(var).ok())
}

/// Same as [`apply_env_overrides`] with a custom variable source.
pub fn apply_overrides_from<F>(config: &mut CmdsrvConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup("CMDSRV_VERSION") {
        config.cmdsrv.version = val;
    }
    if let Some(val) = lookup("CMDSRV_CHANGE_SET") {
        config.cmdsrv.change_set = val;
    }
    if let Some(val) = lookup("CMDSRV_CHANGE_SET_DATE") {
        config.cmdsrv.change_set_date = val;
    }
    if let Some(val) = lookup("CMDSRV_LOG_LEVEL") {
        config.logging.level = val;
    }
    if let Some(val) = lookup("CMDSRV_LOG_FORMAT") {
        config.logging.format = val.parse().map_err(|reason| ConfigError::InvalidEnv {
            var: "CMDSRV_LOG_FORMAT".into(),
            reason,
        })?;
    }
    if let Some(val) = lookup("CMDSRV_BIND_ADDRESS") {
        config.server.bind_address = val;
    }
    if let Some(val) = lookup("CMDSRV_BIND_PORT") {
        config.server.bind_port =
            val.trim()
                .parse()
                .map_err(|e: std::num::ParseIntError| ConfigError::InvalidEnv {
                    var: "CMDSRV_BIND_PORT".into(),
                    reason: e.to_string(),
                })?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a configuration, returning advisory warnings.
///
/// Hard errors (unknown log level, empty bind address, port 0) come back as
/// a [`ConfigError::ValidationError`]; soft issues come back as warnings.
pub fn validate_config(config: &CmdsrvConfig) -> Result<Vec<ConfigWarning>, ConfigError> {
    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<ConfigWarning> = Vec::new();

    if !VALID_LOG_LEVELS.contains(&config.logging.level.as_str()) {
        errors.push(format!("invalid log level '{}'", config.logging.level));
    }

    let address = config.server.bind_address.trim();
    if address.is_empty() {
        errors.push("bind address must not be empty".into());
    } else if WILDCARD_ADDRESSES.contains(&address) {
        warnings.push(ConfigWarning::WildcardBind {
            address: address.to_string(),
        });
    }

    if config.server.bind_port == 0 {
        errors.push("bind port must not be 0".into());
    }

    if config.cmdsrv.change_set.is_empty() {
        warnings.push(ConfigWarning::MissingOptionalField {
            field: "cmdsrv.change_set".into(),
            hint: "GET /version will report an empty change set".into(),
        });
    }
    if config.cmdsrv.change_set_date.is_empty() {
        warnings.push(ConfigWarning::MissingOptionalField {
            field: "cmdsrv.change_set_date".into(),
            hint: "GET /version will report an empty change-set date".into(),
        });
    }

    if errors.is_empty() {
        Ok(warnings)
    } else {
        Err(ConfigError::ValidationError { reasons: errors })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
