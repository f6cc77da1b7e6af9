use std::path::{Path, PathBuf};

use crate::config::schema::EngineConfig;
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../../../schema/engine-config-v1.json");

/// Default location: `<platform config dir>/scribedesk/config.json`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("scribedesk").join("config.json"))
}

/// Loads a config file, picking the parser from the extension (`.yaml`/`.yml` or JSON).
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<EngineConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    if is_yaml {
        load_config_from_yaml(&content)
    } else {
        load_config_from_str(&content)
    }
}

/// Loads the config at `path` if given, else the default path if it exists, else defaults.
pub fn load_config_or_default(path: Option<&Path>) -> Result<EngineConfig, ConfigError> {
    if let Some(path) = path {
        return load_config(path);
    }
    match default_config_path() {
        Some(default) if default.exists() => load_config(default),
        _ => Ok(EngineConfig::default()),
    }
}

pub fn load_config_from_str(content: &str) -> Result<EngineConfig, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;
    load_config_from_value(json_value)
}

pub fn load_config_from_yaml(content: &str) -> Result<EngineConfig, ConfigError> {
    let json_value: serde_json::Value = serde_yaml::from_str(content)?;
    load_config_from_value(json_value)
}

fn load_config_from_value(json_value: serde_json::Value) -> Result<EngineConfig, ConfigError> {
    validate_schema(&json_value)?;

    let config: EngineConfig = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

fn validate_config(config: &EngineConfig) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    let base_url = config.server.base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation {
            message: format!(
                "server.base_url must start with http:// or https://, got '{}'",
                config.server.base_url
            ),
        });
    }

    if config.polling.interval_ms == 0 {
        return Err(ConfigError::Validation {
            message: "polling.interval_ms must be greater than zero".to_string(),
        });
    }

    if config.polling.max_attempts == 0 {
        return Err(ConfigError::Validation {
            message: "polling.max_attempts must be greater than zero".to_string(),
        });
    }

    if config.events.capacity == 0 {
        return Err(ConfigError::Validation {
            message: "events.capacity must be greater than zero".to_string(),
        });
    }

    Ok(())
}
