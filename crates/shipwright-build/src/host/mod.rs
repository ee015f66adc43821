//! Collaborators owned by the host project
//!
//! The engine never touches project settings, symbol storage, the compile
//! step or the wall clock directly; it goes through these traits. Stores take
//! `&self` and use interior mutability, so one adapter may serve several
//! roles in the same [`BuildEnvironment`].

pub mod command;
pub mod memory;
pub mod project_file;

use crate::error::BuildResult;
use crate::version::Version;
use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use shipwright_config::{Platform, SymbolGroup};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

pub use command::CommandCompiler;
pub use memory::{FixedClock, InMemorySettings, InMemorySymbols, ScriptedCompiler, StaticScenes};
pub use project_file::ProjectSettingsFile;

/// Product name used when the settings store has none
pub const DEFAULT_PRODUCT_NAME: &str = "Game";

/// Version string and product name storage
pub trait SettingsStore {
    /// Current version string as stored (may be blank or malformed)
    fn version(&self) -> String;

    /// Store a normalized version string
    fn set_version(&self, version: &str) -> BuildResult<()>;

    /// Platform build numbers derived from the version; best-effort
    fn set_build_numbers(&self, _version: &Version) -> BuildResult<()> {
        Ok(())
    }

    /// Product name as stored (may be blank)
    fn product_name(&self) -> String;
}

/// Per-group compile-time symbol storage
pub trait SymbolStore {
    /// Raw `;`-delimited symbols of a group
    fn symbols_raw(&self, group: SymbolGroup) -> String;

    /// Replace the symbols of a group
    fn set_symbols(&self, group: SymbolGroup, symbols: &BTreeSet<String>) -> BuildResult<()>;
}

/// Ordered list of enabled scenes
pub trait SceneProvider {
    fn enabled_scenes(&self) -> Vec<String>;
}

/// Source of the current instant used for build names
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// The opaque compile/package step
pub trait Compiler {
    fn compile(&self, request: &CompileRequest) -> BuildResult<CompileReport>;
}

/// Everything the compile step is given
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompileRequest {
    /// Enabled scenes, in order
    pub scenes: Vec<String>,
    /// Target platform
    pub platform: Platform,
    /// Executable path, or the build directory for directory exports
    pub output_path: PathBuf,
    /// Profile compile options
    pub options: Vec<String>,
    /// Symbols in effect for this build
    pub symbols: Vec<String>,
}

/// Result reported by the compile step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompileOutcome {
    Succeeded,
    Failed,
    Cancelled,
}

impl fmt::Display for CompileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Compile step report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompileReport {
    pub outcome: CompileOutcome,
    pub errors: usize,
    pub warnings: usize,
}

impl CompileReport {
    pub fn succeeded(warnings: usize) -> Self {
        Self {
            outcome: CompileOutcome::Succeeded,
            errors: 0,
            warnings,
        }
    }

    pub fn failed(errors: usize, warnings: usize) -> Self {
        Self {
            outcome: CompileOutcome::Failed,
            errors,
            warnings,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == CompileOutcome::Succeeded
    }
}

/// Local wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Collaborators for one engine invocation
#[derive(Clone, Copy)]
pub struct BuildEnvironment<'a> {
    /// Project root; the output folder is resolved against it
    pub project_root: &'a Path,
    pub settings: &'a dyn SettingsStore,
    pub symbols: &'a dyn SymbolStore,
    pub scenes: &'a dyn SceneProvider,
    pub compiler: &'a dyn Compiler,
    pub clock: &'a dyn Clock,
}

impl fmt::Debug for BuildEnvironment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildEnvironment")
            .field("project_root", &self.project_root)
            .finish_non_exhaustive()
    }
}

impl<'a> BuildEnvironment<'a> {
    /// Trimmed product name, or the default when blank
    pub fn product_name(&self) -> String {
        let name = self.settings.product_name();
        let name = name.trim();
        if name.is_empty() {
            DEFAULT_PRODUCT_NAME.to_string()
        } else {
            name.to_string()
        }
    }

    /// Trimmed stored version, or the default when blank
    pub fn current_version(&self) -> String {
        let version = self.settings.version();
        let version = version.trim();
        if version.is_empty() {
            crate::version::DEFAULT_VERSION.to_string()
        } else {
            version.to_string()
        }
    }
}
