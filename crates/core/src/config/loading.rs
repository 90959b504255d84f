//! Configuration loading from files, environment variables and daemon settings

use crate::error::{Error, Result, ResultExt};
use config::{
    Config as ConfigLib, ConfigBuilder as LibConfigBuilder, Environment, File, FileFormat,
};
use std::path::Path;
use tracing::debug;

use super::defaults::*;
use super::BrokerConfig;

/// Setting names accepted for compatibility with older module definitions
const LEGACY_KEYS: &[(&str, &str)] = &[("retry_per_log", "retry_per_log_seconds")];

/// Helper to set a config default with consistent error mapping
fn set_config_default<T: Into<config::Value>>(
    builder: LibConfigBuilder<config::builder::DefaultState>,
    key: &str,
    value: T,
) -> Result<LibConfigBuilder<config::builder::DefaultState>> {
    builder
        .set_default(key, value)
        .map_err(|e| Error::config(format!("Failed to set {key} default: {e}")))
}

fn with_defaults() -> Result<LibConfigBuilder<config::builder::DefaultState>> {
    let builder = ConfigLib::builder();
    let builder = set_config_default(builder, "high_availability", default_high_availability())?;
    let builder = set_config_default(builder, "stand_alone", "")?;
    let builder = set_config_default(builder, "replica_set", "")?;
    let builder = set_config_default(builder, "database", default_database())?;
    let builder = set_config_default(builder, "username", default_username())?;
    let builder = set_config_default(builder, "password", default_password())?;
    let builder = set_config_default(builder, "url_options", "")?;
    let builder = set_config_default(
        builder,
        "retry_per_log_seconds",
        default_retry_per_log_seconds() as i64,
    )?;
    let builder = set_config_default(builder, "queue_size", default_queue_size() as i64)?;
    set_config_default(
        builder,
        "drain_timeout_secs",
        default_drain_timeout_secs() as i64,
    )
}

/// Normalize a daemon setting name to the snake_case field name
///
/// `highAvailability` becomes `high_availability`; legacy names are mapped
/// to their current field.
pub(crate) fn normalize_setting_key(key: &str) -> String {
    let mut normalized = String::with_capacity(key.len() + 4);
    for (i, c) in key.trim().chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                normalized.push('_');
            }
            normalized.push(c.to_ascii_lowercase());
        } else if c == '-' {
            normalized.push('_');
        } else {
            normalized.push(c);
        }
    }

    LEGACY_KEYS
        .iter()
        .find(|(legacy, _)| *legacy == normalized)
        .map(|(_, current)| current.to_string())
        .unwrap_or(normalized)
}

impl BrokerConfig {
    /// Loads configuration from a TOML file with environment variable overrides
    ///
    /// Environment variables are prefixed with `NOTIRELAY_`, for example
    /// `NOTIRELAY_QUEUE_SIZE=5000`.
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut builder = with_defaults()?;

        if path.exists() {
            let content = std::fs::read_to_string(path)
                .context(format!("Failed to read config file {}", path.display()))?;
            builder = builder.add_source(File::from_str(&content, FileFormat::Toml));
        } else {
            debug!(
                path = %path.display(),
                "Config file not found, using defaults and environment"
            );
        }

        builder = builder.add_source(
            Environment::with_prefix("NOTIRELAY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| Error::config(format!("Failed to deserialize config: {e}")))
    }

    /// Creates a config from a TOML string (useful for testing)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(format!("Failed to parse TOML: {e}")))
    }

    /// Creates a config from the key/value settings of a module definition
    ///
    /// Keys may be snake_case or camelCase. Unknown keys are ignored.
    pub fn from_settings<I, K, V>(settings: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut builder = with_defaults()?;

        for (key, value) in settings {
            let key = normalize_setting_key(key.as_ref());
            let value: String = value.into();
            builder = builder
                .set_override(&key, value)
                .map_err(|e| Error::config(format!("Failed to set {key}: {e}")))?;
        }

        let config = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| Error::config(format!("Failed to deserialize config: {e}")))
    }
}
