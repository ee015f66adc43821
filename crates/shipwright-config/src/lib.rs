//! Shipwright configuration
//!
//! Provides the build pipeline configuration stored in `shipwright.toml`:
//! - Build profiles (platform, naming, versioning, symbols, packaging, actions)
//! - Option flags that add symbols or override profile decisions
//! - Global action bindings
//! - Preprocess settings for builds started outside the orchestrator
//!
//! # Configuration Hierarchy
//!
//! Later sources override earlier ones:
//! 1. Project config (./shipwright.toml)
//! 2. Environment variables (SHIPWRIGHT_*)
//! 3. CLI flags (handled by caller)
//!
//! # Example
//!
//! ```no_run
//! use shipwright_config::ConfigLoader;
//! use std::path::Path;
//!
//! let loader = ConfigLoader::new();
//! let loaded = loader.load_from_directory(Path::new(".")).unwrap();
//! println!("{} profiles", loaded.config.profiles.len());
//! ```

pub mod defaults;
pub mod loader;
pub mod platform;
pub mod project;

use std::path::PathBuf;
use thiserror::Error;

/// File name of the project configuration
pub const CONFIG_FILE_NAME: &str = "shipwright.toml";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Failed to serialize configuration: {0}")]
    SerializeError(String),

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

// Re-export main types
pub use loader::{ConfigLoader, LoadedConfig};
pub use platform::{Platform, SymbolGroup};
pub use project::{
    ActionBinding, Configuration, Flag, FlagOverrides, PreprocessConfig, Profile, Stage,
    VersionMode, DEFAULT_NAME_TEMPLATE, DEFAULT_OUTPUT_FOLDER,
};
