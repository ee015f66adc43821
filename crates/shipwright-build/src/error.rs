/// Build pipeline error types
use std::path::PathBuf;
use thiserror::Error;

pub type BuildResult<T> = Result<T, BuildError>;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Build profile not found: '{0}'")]
    ProfileNotFound(String),

    #[error("Invalid configuration:\n{0}")]
    InvalidConfiguration(String),

    #[error("No enabled scenes found in the scene list")]
    NoScenes,

    #[error("Build failed: {result}. Errors: {errors}, Warnings: {warnings}")]
    CompileFailed {
        result: String,
        errors: usize,
        warnings: usize,
    },

    #[error("Compile step could not run: {0}")]
    CompilerUnavailable(String),

    #[error("Action '{action}' failed: {message}")]
    ActionFailed { action: String, message: String },

    #[error("Failed to register action: {0}")]
    Registration(String),

    #[error("Settings store error: {0}")]
    Settings(String),

    #[error("Build directory not found: {0}")]
    BuildDirectoryNotFound(PathBuf),

    #[error("I/O error at {path}: {error}")]
    IoError {
        path: PathBuf,
        error: std::io::Error,
    },

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

impl BuildError {
    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, error: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            error,
        }
    }

    /// Create an action failure
    pub fn action(action: impl Into<String>, message: impl ToString) -> Self {
        Self::ActionFailed {
            action: action.into(),
            message: message.to_string(),
        }
    }

    /// Create a settings store error
    pub fn settings(message: impl ToString) -> Self {
        Self::Settings(message.to_string())
    }
}
