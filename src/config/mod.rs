//! Configuration management for muck

pub mod schema;

pub use schema::{Config, FetchConfig, GeneralConfig};

use crate::error::{MuckError, MuckResult};
use crate::layout::CONFIG_NAME;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration manager
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// The config file at a project root
    pub fn for_project(root: &Path) -> Self {
        Self::with_path(root.join(CONFIG_NAME))
    }

    /// Load configuration, falling back to defaults if the file is absent
    pub fn load(&self) -> MuckResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(&self, path: &Path) -> MuckResult<Config> {
        let content = fs::read_to_string(path)
            .map_err(|e| MuckError::io(format!("reading config from {}", path.display()), e))?;

        let config: Config = toml::from_str(&content).map_err(|e| MuckError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        config.fetch.to_options().map_err(|e| MuckError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}
