//! Configuration Loader
//!
//! Finds `shipwright.toml` and applies environment overrides on top of it.

use crate::project::Configuration;
use crate::{ConfigError, ConfigResult, CONFIG_FILE_NAME};
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable overriding the output root folder name
pub const ENV_OUTPUT_FOLDER: &str = "SHIPWRIGHT_OUTPUT_FOLDER";

/// Environment variable overriding the preprocess profile id
pub const ENV_PREPROCESS_PROFILE: &str = "SHIPWRIGHT_PREPROCESS_PROFILE";

/// Configuration loader
///
/// Loads the project configuration and merges it with proper precedence:
/// 1. Project config (./shipwright.toml) - lowest priority
/// 2. Environment variables (SHIPWRIGHT_*) - overrides project
/// 3. CLI flags - highest priority (handled by caller)
#[derive(Debug, Default)]
pub struct ConfigLoader {
    /// Skip environment overrides (used by tests and `init`)
    ignore_env: bool,
}

/// Loaded configuration together with the directory it was found in
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Parsed configuration
    pub config: Configuration,
    /// Directory containing shipwright.toml
    pub project_root: PathBuf,
    /// Path of the configuration file
    pub config_path: PathBuf,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self { ignore_env: false }
    }

    /// Disable environment variable overrides
    pub fn without_env(mut self) -> Self {
        self.ignore_env = true;
        self
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree until a `shipwright.toml` is found.
    pub fn load_from_directory(&self, start_dir: &Path) -> ConfigResult<LoadedConfig> {
        let config_path = Self::find_config_file(start_dir)
            .ok_or_else(|| ConfigError::NotFound(start_dir.join(CONFIG_FILE_NAME)))?;
        self.load_from_file(&config_path)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(&self, config_path: &Path) -> ConfigResult<LoadedConfig> {
        let config = Configuration::load_from_file(config_path)?;
        let config = if self.ignore_env {
            config
        } else {
            self.apply_env_overrides(config)?
        };

        let project_root = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(LoadedConfig {
            config,
            project_root,
            config_path: config_path.to_path_buf(),
        })
    }

    /// Find `shipwright.toml` by walking up from `start_dir`
    pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
        let mut current = Some(start_dir);
        while let Some(dir) = current {
            let candidate = dir.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            current = dir.parent();
        }
        None
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&self, mut config: Configuration) -> ConfigResult<Configuration> {
        if let Ok(folder) = env::var(ENV_OUTPUT_FOLDER) {
            if folder.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: ENV_OUTPUT_FOLDER.to_string(),
                    reason: "output folder cannot be empty".to_string(),
                });
            }
            config.output_folder = folder.trim().to_string();
        }

        if let Ok(profile) = env::var(ENV_PREPROCESS_PROFILE) {
            config.preprocess.profile = profile.trim().to_string();
        }

        Ok(config)
    }
}
