use std::path::Path;

use serde_derive::Deserialize;

pub const CONFIG_FILE_NAME: &str = "route_service.toml";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Unable to open {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Invalid configuration: {0}")]
    Parse(String),
}

/// What `Save` does while the displayed geometry no longer matches the stop selection.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StaleGeometryPolicy {
    #[default]
    Block,
    Warn,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
pub struct EditorOptions {
    #[serde(default)]
    pub stale_geometry: StaleGeometryPolicy,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub base_url: String,

    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default)]
    pub editor: EditorOptions,
}

impl ServiceConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            access_token: None,
            editor: EditorOptions::default(),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let mut config: ServiceConfig =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        if config.base_url.trim().is_empty() {
            return Err(ConfigError::Parse("base_url must not be empty".to_string()));
        }

        if !config.base_url.ends_with('/') {
            config.base_url.push('/');
        }

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        ServiceConfig::from_toml(&content)
    }

    /// Reads `route_service.toml` from the working directory.
    pub fn from_current_dir() -> Result<Self, ConfigError> {
        let dir = std::env::current_dir().map_err(|e| ConfigError::Io {
            path: ".".to_string(),
            reason: e.to_string(),
        })?;

        ServiceConfig::from_file(&dir.join(CONFIG_FILE_NAME))
    }
}
