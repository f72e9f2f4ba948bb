// filemarks Config Engine
// Loads, saves, updates and resets the runtime configuration.
// The config is stored as a JSON file at the platform-specific config path.

use std::fs;
use std::io;
use std::path::Path;

use crate::platform;
use crate::types::config::FilemarksConfig;
use crate::types::errors::ConfigError;

/// Trait defining the config engine interface.
pub trait ConfigEngineTrait {
    fn load(&mut self) -> Result<FilemarksConfig, ConfigError>;
    fn save(&self) -> Result<(), ConfigError>;
    fn get_config(&self) -> &FilemarksConfig;
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), ConfigError>;
    fn reset(&mut self) -> Result<(), ConfigError>;
    fn get_config_path(&self) -> &str;
}

/// Config engine that persists the configuration as JSON on disk.
pub struct ConfigEngine {
    config_path: String,
    config: FilemarksConfig,
}

impl ConfigEngine {
    /// Creates a new ConfigEngine.
    ///
    /// If `path_override` is `Some`, uses that path for the config file.
    /// Otherwise, uses `config.json` in the platform config directory.
    pub fn new(path_override: Option<String>) -> Self {
        let config_path = match path_override {
            Some(p) => p,
            None => platform::get_config_dir()
                .join("config.json")
                .to_string_lossy()
                .to_string(),
        };

        Self {
            config_path,
            config: FilemarksConfig::default(),
        }
    }
}

impl ConfigEngineTrait for ConfigEngine {
    /// Loads the config file.
    ///
    /// A missing file yields the defaults. A malformed file is an error.
    /// Fields absent from the file keep their default values.
    fn load(&mut self) -> Result<FilemarksConfig, ConfigError> {
        self.config = match fs::read_to_string(&self.config_path) {
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                ConfigError::SerializationError(format!(
                    "{} is not a valid config: {}",
                    self.config_path, e
                ))
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.config_path, "no config file, using defaults");
                FilemarksConfig::default()
            }
            Err(e) => {
                return Err(ConfigError::IoError(format!(
                    "cannot read {}: {}",
                    self.config_path, e
                )))
            }
        };
        Ok(self.config.clone())
    }

    /// Writes the current config to disk, creating parent directories.
    fn save(&self) -> Result<(), ConfigError> {
        let path = Path::new(&self.config_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ConfigError::IoError(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.config)
            .map_err(|e| ConfigError::SerializationError(e.to_string()))?;
        fs::write(path, json)
            .map_err(|e| ConfigError::IoError(format!("cannot write {}: {}", self.config_path, e)))?;

        tracing::debug!(path = %self.config_path, "config saved");
        Ok(())
    }

    fn get_config(&self) -> &FilemarksConfig {
        &self.config
    }

    /// Updates a single top-level field (e.g. `"log_filter"`) and saves.
    ///
    /// The value must deserialize into the field's type.
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), ConfigError> {
        if key.is_empty() {
            return Err(ConfigError::InvalidValue("Key cannot be empty".to_string()));
        }

        let mut json_value = serde_json::to_value(&self.config).map_err(|e| {
            ConfigError::SerializationError(format!("Failed to serialize config: {}", e))
        })?;

        match json_value.as_object_mut() {
            Some(map) if map.contains_key(key) => {
                map.insert(key.to_string(), value);
            }
            _ => {
                return Err(ConfigError::InvalidValue(format!(
                    "Key '{}' not found in config",
                    key
                )))
            }
        }

        let new_config: FilemarksConfig = serde_json::from_value(json_value).map_err(|e| {
            ConfigError::InvalidValue(format!("Invalid value for key '{}': {}", key, e))
        })?;

        self.config = new_config;
        self.save()
    }

    fn reset(&mut self) -> Result<(), ConfigError> {
        self.config = FilemarksConfig::default();
        self.save()
    }

    fn get_config_path(&self) -> &str {
        &self.config_path
    }
}
