use crate::services::crisis::DetectorConfig;
use crate::services::recovery::RecoveryConfig;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Config {
    #[serde(default)]
    pub recovery: RecoveryConfig,

    #[serde(default)]
    pub detector: DetectorConfig,
}

impl Config {
    /// Load configuration from a JSON file.
    ///
    /// A missing file yields the defaults; any other failure is an error.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(ConfigError::IoError(format!("{}: {e}", path.display()))),
        };

        let config: Config = serde_json::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(format!("{}: {e}", path.display())))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        self.validate()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }
        std::fs::write(path.as_ref(), contents).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.recovery.debounce_ms == 0 {
            return Err(ConfigError::ValidationError(
                "recovery.debounce_ms must be greater than 0".to_string(),
            ));
        }

        if self.recovery.history_limit == 0 {
            return Err(ConfigError::ValidationError(
                "recovery.history_limit must be greater than 0".to_string(),
            ));
        }

        if self.detector.concern_threshold == 0 {
            return Err(ConfigError::ValidationError(
                "detector.concern_threshold must be greater than 0".to_string(),
            ));
        }

        if self.detector.keywords.urgent.iter().all(|k| k.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "detector.keywords.urgent must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// JSON Schema for the configuration, for host settings editors
pub fn config_schema() -> serde_json::Value {
    let schema = schemars::schema_for!(Config);
    serde_json::to_value(&schema).unwrap_or_default()
}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(msg) => write!(f, "IO error: {msg}"),
            ConfigError::ParseError(msg) => write!(f, "Parse error: {msg}"),
            ConfigError::SerializeError(msg) => write!(f, "Serialize error: {msg}"),
            ConfigError::ValidationError(msg) => write!(f, "Validation error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}
