use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::error::{EstimatorError, EstimatorResult};

/// Artifact loaded when nothing else is configured.
pub const DEFAULT_MODEL_PATH: &str = "best_rf_model.json";
pub const DEFAULT_CONFIG_FILE: &str = "water-use.toml";
pub const ENV_PREFIX: &str = "WATER_USE";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub model_path: PathBuf,
    pub log_level: String,
    pub server: ServerSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            log_level: "info".to_string(),
            server: ServerSettings::default(),
        }
    }
}

impl Settings {
    /// Layers built-in defaults, an optional TOML file and `WATER_USE__*` variables.
    pub fn load(config_file: Option<&Path>) -> EstimatorResult<Self> {
        let defaults = Settings::default();
        let file = config_file.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));

        let config = Config::builder()
            .set_default("model_path", defaults.model_path.to_string_lossy().to_string())
            .and_then(|b| b.set_default("log_level", defaults.log_level))
            .and_then(|b| b.set_default("server.host", defaults.server.host))
            .and_then(|b| b.set_default("server.port", i64::from(defaults.server.port)))
            .map_err(|e| EstimatorError::Config(e.to_string()))?
            .add_source(File::from(file).required(config_file.is_some()))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .map_err(|e| EstimatorError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| EstimatorError::Config(e.to_string()))
    }

    pub fn with_model_path(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.model_path = path;
        }
        self
    }
}
