//! Configuration loading from disk, and editing of single values.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::config::schema::DaemonConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
    Serialize(toml::ser::Error),
    UnknownKey(String),
    InvalidValue { key: String, reason: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
            ConfigError::Serialize(e) => write!(f, "Serialize error: {}", e),
            ConfigError::UnknownKey(key) => write!(f, "Unknown config key '{}'", key),
            ConfigError::InvalidValue { key, reason } => {
                write!(f, "Invalid value for '{}': {}", key, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Read a TOML config file. A missing file yields the defaults so flags alone can configure the daemon.
pub fn load_config(path: &Path) -> Result<DaemonConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(DaemonConfig::default());
        }
        Err(e) => return Err(ConfigError::Io(e)),
    };

    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Write `config` to `path` as TOML, creating the parent directory if needed.
pub fn save_config(path: &Path, config: &DaemonConfig) -> Result<(), ConfigError> {
    let rendered = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(ConfigError::Io)?;
    }
    fs::write(path, rendered).map_err(ConfigError::Io)
}

/// Return a copy of `config` with the top-level field `key` set from `raw`.
///
/// The raw string is read as the field's current TOML type: strings as-is,
/// integers parsed, string lists split on commas. The result goes back through
/// deserialization, so durations and numbers get the same checks as the file.
pub fn set_value(config: &DaemonConfig, key: &str, raw: &str) -> Result<DaemonConfig, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidValue {
        key: key.to_string(),
        reason,
    };

    let mut table = match toml::Value::try_from(config).map_err(ConfigError::Serialize)? {
        toml::Value::Table(table) => table,
        _ => return Err(invalid("configuration is not a table".into())),
    };

    let value = match table.get(key) {
        None => return Err(ConfigError::UnknownKey(key.to_string())),
        Some(toml::Value::String(_)) => toml::Value::String(raw.to_string()),
        Some(toml::Value::Integer(_)) => raw
            .trim()
            .parse::<i64>()
            .map(toml::Value::Integer)
            .map_err(|e| invalid(e.to_string()))?,
        Some(toml::Value::Array(_)) if key != "keys" => toml::Value::Array(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| toml::Value::String(s.to_string()))
                .collect(),
        ),
        Some(_) => return Err(invalid("cannot be set from the command line".into())),
    };
    table.insert(key.to_string(), value);

    toml::Value::Table(table)
        .try_into()
        .map_err(|e: toml::de::Error| invalid(e.to_string()))
}

/// Validate a fully assembled configuration.
pub fn check_config(config: &DaemonConfig) -> Result<(), ConfigError> {
    validate_config(config).map_err(ConfigError::Validation)
}
